//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod libraries;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        author::Author,
        book::Book,
        library::{EntityRef, Librarian, Library},
    },
    services::queries::CatalogReader,
};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Round-trip to the database (readiness probe)
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogReader for Repository {
    async fn find_author(&self, by: &EntityRef) -> AppResult<Option<Author>> {
        self.authors_find(by).await
    }

    async fn books_for_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        self.books_by_author(author_id).await
    }

    async fn find_library(&self, by: &EntityRef) -> AppResult<Option<Library>> {
        self.libraries_find(by).await
    }

    async fn books_for_library(&self, library_id: i32) -> AppResult<Vec<Book>> {
        self.libraries_books(library_id).await
    }

    async fn librarian_for(&self, library_id: i32) -> AppResult<Option<Librarian>> {
        self.librarians_for_library(library_id).await
    }
}
