//! Read-only relationship queries.
//!
//! Unknown authors and libraries are not errors here: they read as an
//! empty book list or no librarian. Only storage failures propagate.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        author::Author,
        book::Book,
        library::{EntityRef, Librarian, Library},
    },
};

/// Relationship lookups the query service is built on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn find_author(&self, by: &EntityRef) -> AppResult<Option<Author>>;
    async fn books_for_author(&self, author_id: i32) -> AppResult<Vec<Book>>;
    async fn find_library(&self, by: &EntityRef) -> AppResult<Option<Library>>;
    async fn books_for_library(&self, library_id: i32) -> AppResult<Vec<Book>>;
    async fn librarian_for(&self, library_id: i32) -> AppResult<Option<Librarian>>;
}

#[derive(Clone)]
pub struct QueryService {
    reader: Arc<dyn CatalogReader>,
}

impl QueryService {
    pub fn new(reader: Arc<dyn CatalogReader>) -> Self {
        Self { reader }
    }

    /// All books written by an author, in insertion order
    pub async fn books_by_author(&self, author: &EntityRef) -> AppResult<Vec<Book>> {
        match self.reader.find_author(author).await? {
            Some(author) => self.reader.books_for_author(author.id).await,
            None => {
                tracing::debug!("No author matching {:?}", author);
                Ok(Vec::new())
            }
        }
    }

    /// All books held by a library
    pub async fn books_in_library(&self, library: &EntityRef) -> AppResult<Vec<Book>> {
        match self.reader.find_library(library).await? {
            Some(library) => self.reader.books_for_library(library.id).await,
            None => {
                tracing::debug!("No library matching {:?}", library);
                Ok(Vec::new())
            }
        }
    }

    /// The librarian of a library; `None` for an unknown library or one without a librarian
    pub async fn librarian_for_library(&self, library: &EntityRef) -> AppResult<Option<Librarian>> {
        match self.reader.find_library(library).await? {
            Some(library) => self.reader.librarian_for(library.id).await,
            None => Ok(None),
        }
    }
}
