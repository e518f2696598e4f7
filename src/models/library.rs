//! Library and librarian models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::book::Book;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Library {
    pub id: i32,
    pub name: String,
}

/// The one librarian running a library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Librarian {
    pub id: i32,
    pub name: String,
    pub library_id: i32,
}

/// Library detail page: the library, its books and its librarian
#[derive(Debug, Serialize, ToSchema)]
pub struct LibraryDetail {
    pub library: Library,
    pub books: Vec<Book>,
    pub librarian: Option<Librarian>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLibrary {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
}

/// Add a book to a library's collection
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddLibraryBook {
    pub book_id: i32,
}

/// Assign (or replace) the librarian of a library
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignLibrarian {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
}

/// Reference to an author or library, by id or by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    Id(i32),
    Name(String),
}

/// Query parameters naming an entity: `?id=3` or `?name=Main`
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LookupQuery {
    pub id: Option<i32>,
    pub name: Option<String>,
}

impl LookupQuery {
    /// Resolve to a reference; the id wins when both are given
    pub fn into_ref(self) -> Option<EntityRef> {
        match (self.id, self.name) {
            (Some(id), _) => Some(EntityRef::Id(id)),
            (None, Some(name)) if !name.trim().is_empty() => Some(EntityRef::Name(name.trim().to_string())),
            _ => None,
        }
    }
}
