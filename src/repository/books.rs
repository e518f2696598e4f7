//! Book domain methods on Repository

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookListing, CleanBook, AUTHOR_NOT_FOUND},
};

/// An author removed between form validation and the write
fn author_reference(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
            AppError::Validation(AUTHOR_NOT_FOUND.to_string())
        }
        other => AppError::Database(other),
    }
}

impl Repository {
    /// List every book with its author's name, in insertion order
    pub async fn books_list(&self) -> AppResult<Vec<BookListing>> {
        let rows = sqlx::query_as::<_, BookListing>(
            r#"
            SELECT b.id, b.title, b.author_id, a.name AS author_name, b.publication_year
            FROM books b
            JOIN authors a ON a.id = b.author_id
            ORDER BY b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn books_get_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, publication_year FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Books written by an author, in insertion order
    pub async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author_id, publication_year
            FROM books
            WHERE author_id = $1
            ORDER BY id
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn books_create(&self, data: &CleanBook) -> AppResult<Book> {
        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, publication_year)
            VALUES ($1, $2, $3)
            RETURNING id, title, author_id, publication_year
            "#,
        )
        .bind(&data.title)
        .bind(data.author_id)
        .bind(data.publication_year)
        .fetch_one(&self.pool)
        .await
        .map_err(author_reference)?;
        Ok(row)
    }

    /// Overwrite title, author and year; `None` when the book is gone
    pub async fn books_update(&self, id: i32, data: &CleanBook) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, author_id = $3, publication_year = $4
            WHERE id = $1
            RETURNING id, title, author_id, publication_year
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(data.author_id)
        .bind(data.publication_year)
        .fetch_optional(&self.pool)
        .await
        .map_err(author_reference)?;
        Ok(row)
    }

    /// Delete a book; returns whether a row was removed
    pub async fn books_delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::error::{DatabaseError, ErrorKind};

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("constraint violated")]
    struct Violation(ErrorKind);

    impl DatabaseError for Violation {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    #[test]
    fn vanished_author_is_a_form_error() {
        let err = author_reference(sqlx::Error::Database(Box::new(Violation(ErrorKind::ForeignKeyViolation))));
        assert!(matches!(err, AppError::Validation(msg) if msg == AUTHOR_NOT_FOUND));
    }

    #[test]
    fn other_failures_stay_database_errors() {
        let err = author_reference(sqlx::Error::Database(Box::new(Violation(ErrorKind::Other))));
        assert!(matches!(err, AppError::Database(_)));
        assert!(matches!(author_reference(sqlx::Error::RowNotFound), AppError::Database(_)));
    }
}
