//! Catalog management service: books, authors, libraries and librarians

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor},
        book::{Book, BookForm, BookListing, CleanBook, AUTHOR_NOT_FOUND},
        library::{AssignLibrarian, CreateLibrary, Librarian, Library, LibraryDetail},
    },
    repository::Repository,
};

fn required_name(data: &CreateAuthor) -> AppResult<&str> {
    data.validate()?;
    let name = data.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    Ok(name)
}

/// Message used when a gated book operation targets a missing book
pub const BOOK_NOT_FOUND: &str = "Book not found";

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_books(&self) -> AppResult<Vec<BookListing>> {
        self.repository.books_list().await
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors_list().await
    }

    /// Book targeted by an edit or delete; a missing book is forbidden
    pub async fn gated_book(&self, id: i32) -> AppResult<Book> {
        self.repository
            .books_get_by_id(id)
            .await?
            .ok_or_else(|| AppError::Authorization(BOOK_NOT_FOUND.to_string()))
    }

    /// Validate a book form against the stored authors.
    ///
    /// Form problems come back as `AppError::Validation` carrying the
    /// message to show on the re-rendered form.
    async fn clean_book_form(&self, form: &BookForm) -> AppResult<CleanBook> {
        let clean = form.clean().map_err(AppError::Validation)?;
        if self.repository.authors_get_by_id(clean.author_id).await?.is_none() {
            return Err(AppError::Validation(AUTHOR_NOT_FOUND.to_string()));
        }
        Ok(clean)
    }

    pub async fn add_book(&self, form: &BookForm) -> AppResult<Book> {
        let clean = self.clean_book_form(form).await?;
        let book = self.repository.books_create(&clean).await?;
        tracing::info!("Added book {} ({})", book.id, book.title);
        Ok(book)
    }

    pub async fn edit_book(&self, id: i32, form: &BookForm) -> AppResult<Book> {
        let clean = self.clean_book_form(form).await?;
        let book = self
            .repository
            .books_update(id, &clean)
            .await?
            .ok_or_else(|| AppError::Authorization(BOOK_NOT_FOUND.to_string()))?;
        tracing::info!("Edited book {} ({})", book.id, book.title);
        Ok(book)
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        if !self.repository.books_delete(id).await? {
            return Err(AppError::Authorization(BOOK_NOT_FOUND.to_string()));
        }
        tracing::info!("Deleted book {}", id);
        Ok(())
    }

    pub async fn create_author(&self, data: &CreateAuthor) -> AppResult<Author> {
        let name = required_name(data)?;
        self.repository.authors_create(name).await
    }

    pub async fn rename_author(&self, id: i32, data: &CreateAuthor) -> AppResult<Author> {
        let name = required_name(data)?;
        let author = self.repository.authors_rename(id, name).await?;
        tracing::info!("Renamed author {} to {}", author.id, author.name);
        Ok(author)
    }

    /// Delete an author together with all of its books
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors_delete(id).await?;
        tracing::info!("Deleted author {} and its books", id);
        Ok(())
    }

    pub async fn list_libraries(&self) -> AppResult<Vec<Library>> {
        self.repository.libraries_list().await
    }

    pub async fn create_library(&self, data: &CreateLibrary) -> AppResult<Library> {
        data.validate()?;
        let name = data.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        self.repository.libraries_create(name).await
    }

    /// Delete a library together with its librarian
    pub async fn delete_library(&self, id: i32) -> AppResult<()> {
        self.repository.libraries_delete(id).await?;
        tracing::info!("Deleted library {} and its librarian", id);
        Ok(())
    }

    async fn existing_library(&self, id: i32) -> AppResult<Library> {
        self.repository
            .libraries_get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Library {} not found", id)))
    }

    /// Library page: the library, its books and its librarian
    pub async fn library_detail(&self, id: i32) -> AppResult<LibraryDetail> {
        let library = self.existing_library(id).await?;
        let books = self.repository.libraries_books(library.id).await?;
        let librarian = self.repository.librarians_for_library(library.id).await?;
        Ok(LibraryDetail {
            library,
            books,
            librarian,
        })
    }

    pub async fn add_book_to_library(&self, library_id: i32, book_id: i32) -> AppResult<LibraryDetail> {
        let library = self.existing_library(library_id).await?;
        if self.repository.books_get_by_id(book_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Book {} not found", book_id)));
        }
        self.repository.libraries_add_book(library.id, book_id).await?;
        self.library_detail(library.id).await
    }

    pub async fn assign_librarian(&self, library_id: i32, data: &AssignLibrarian) -> AppResult<Librarian> {
        data.validate()?;
        let name = data.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        let library = self.existing_library(library_id).await?;
        let librarian = self.repository.librarians_assign(library.id, name).await?;
        tracing::info!("{} now runs library {}", librarian.name, library.name);
        Ok(librarian)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> CreateAuthor {
        CreateAuthor { name: name.to_string() }
    }

    #[test]
    fn author_names_are_trimmed() {
        assert_eq!(required_name(&named("  Ursula Le Guin ")).unwrap(), "Ursula Le Guin");
    }

    #[test]
    fn blank_author_names_are_rejected() {
        assert!(matches!(required_name(&named("   ")), Err(AppError::Validation(_))));
        assert!(required_name(&named("")).is_err());
    }
}
