//! Author domain methods on Repository

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{author::Author, library::EntityRef},
};

impl Repository {
    /// List all authors, oldest first
    pub async fn authors_list(&self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>("SELECT id, name FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get author by ID
    pub async fn authors_get_by_id(&self, id: i32) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, Author>("SELECT id, name FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Find an author by id, or the oldest author with the given name
    pub async fn authors_find(&self, by: &EntityRef) -> AppResult<Option<Author>> {
        match by {
            EntityRef::Id(id) => self.authors_get_by_id(*id).await,
            EntityRef::Name(name) => {
                let row = sqlx::query_as::<_, Author>(
                    "SELECT id, name FROM authors WHERE name = $1 ORDER BY id LIMIT 1",
                )
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }
        }
    }

    pub async fn authors_create(&self, name: &str) -> AppResult<Author> {
        let row = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn authors_rename(&self, id: i32, name: &str) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("UPDATE authors SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Delete an author; its books go with it (ON DELETE CASCADE)
    pub async fn authors_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }
}
