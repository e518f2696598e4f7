//! Library and librarian domain methods on Repository

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        library::{EntityRef, Librarian, Library},
    },
};

impl Repository {
    pub async fn libraries_list(&self) -> AppResult<Vec<Library>> {
        let rows = sqlx::query_as::<_, Library>("SELECT id, name FROM libraries ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn libraries_get_by_id(&self, id: i32) -> AppResult<Option<Library>> {
        let row = sqlx::query_as::<_, Library>("SELECT id, name FROM libraries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Find a library by id, or the oldest library with the given name
    pub async fn libraries_find(&self, by: &EntityRef) -> AppResult<Option<Library>> {
        match by {
            EntityRef::Id(id) => self.libraries_get_by_id(*id).await,
            EntityRef::Name(name) => {
                let row = sqlx::query_as::<_, Library>(
                    "SELECT id, name FROM libraries WHERE name = $1 ORDER BY id LIMIT 1",
                )
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }
        }
    }

    pub async fn libraries_create(&self, name: &str) -> AppResult<Library> {
        let row = sqlx::query_as::<_, Library>(
            "INSERT INTO libraries (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Delete a library; its librarian and book links go with it
    pub async fn libraries_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM libraries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Library {} not found", id)));
        }
        Ok(())
    }

    /// Books held by a library, in insertion order
    pub async fn libraries_books(&self, library_id: i32) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.title, b.author_id, b.publication_year
            FROM books b
            JOIN library_books lb ON lb.book_id = b.id
            WHERE lb.library_id = $1
            ORDER BY b.id
            "#,
        )
        .bind(library_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Link a book to a library; linking twice is a no-op
    pub async fn libraries_add_book(&self, library_id: i32, book_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO library_books (library_id, book_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(library_id)
        .bind(book_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn librarians_for_library(&self, library_id: i32) -> AppResult<Option<Librarian>> {
        let row = sqlx::query_as::<_, Librarian>(
            "SELECT id, name, library_id FROM librarians WHERE library_id = $1",
        )
        .bind(library_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Set the librarian of a library, renaming the existing one if any
    pub async fn librarians_assign(&self, library_id: i32, name: &str) -> AppResult<Librarian> {
        let row = sqlx::query_as::<_, Librarian>(
            r#"
            INSERT INTO librarians (name, library_id)
            VALUES ($1, $2)
            ON CONFLICT (library_id) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, library_id
            "#,
        )
        .bind(name)
        .bind(library_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
