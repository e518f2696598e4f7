//! Book list and the permission-gated add/edit/delete endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{
        access::policies,
        book::{Book, BookForm, BookFormPage, BookListing, DeleteBookPage},
    },
    services::catalog::BOOK_NOT_FOUND,
    AppState,
};

use super::CurrentUser;

/// List page every successful mutation redirects to
pub const BOOK_LIST: &str = "/books/";

/// Re-render a book form with an error and no mutation applied
async fn rerender(state: &AppState, book: Option<Book>, error: String) -> AppResult<Response> {
    let authors = state.services.catalog.list_authors().await?;
    let page = BookFormPage {
        book,
        authors,
        error: Some(error),
    };
    Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(page)).into_response())
}

/// A book id that does not parse names no book
fn book_id(id: Result<Path<i32>, PathRejection>) -> AppResult<i32> {
    id.map(|Path(id)| id)
        .map_err(|_| AppError::Authorization(BOOK_NOT_FOUND.to_string()))
}

/// List all books
#[utoipa::path(
    get,
    path = "/books/",
    tag = "books",
    responses((status = 200, description = "All books", body = Vec<BookListing>))
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<BookListing>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Add-book form
#[utoipa::path(
    get,
    path = "/add-book/",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Form context", body = BookFormPage),
        (status = 303, description = "Not logged in; redirect to login"),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn add_book_page(State(state): State<AppState>, current: CurrentUser) -> AppResult<Json<BookFormPage>> {
    current.require(&policies::ADD_BOOK)?;
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(BookFormPage {
        book: None,
        authors,
        error: None,
    }))
}

/// Submit the add-book form
#[utoipa::path(
    post,
    path = "/add-book/",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookForm,
    responses(
        (status = 303, description = "Book created; redirect to the book list, or to login"),
        (status = 403, description = "Missing permission"),
        (status = 422, description = "Invalid form, re-rendered with an error", body = BookFormPage)
    )
)]
pub async fn add_book(
    State(state): State<AppState>,
    current: CurrentUser,
    form: Result<Json<BookForm>, JsonRejection>,
) -> AppResult<Response> {
    let claims = current.require(&policies::ADD_BOOK)?;
    let form = match form {
        Ok(Json(form)) => form,
        Err(rejection) => return rerender(&state, None, rejection.body_text()).await,
    };

    match state.services.catalog.add_book(&form).await {
        Ok(book) => {
            tracing::debug!("{} added book {}", claims.sub, book.id);
            Ok(Redirect::to(BOOK_LIST).into_response())
        }
        Err(AppError::Validation(error)) => rerender(&state, None, error).await,
        Err(e) => Err(e),
    }
}

/// Edit-book form
#[utoipa::path(
    get,
    path = "/edit-book/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Form context", body = BookFormPage),
        (status = 303, description = "Not logged in; redirect to login"),
        (status = 403, description = "Missing permission, or book not found")
    )
)]
pub async fn edit_book_page(
    State(state): State<AppState>,
    current: CurrentUser,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<BookFormPage>> {
    current.require(&policies::EDIT_BOOK)?;
    let book = state.services.catalog.gated_book(book_id(id)?).await?;
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(BookFormPage {
        book: Some(book),
        authors,
        error: None,
    }))
}

/// Submit the edit-book form
#[utoipa::path(
    post,
    path = "/edit-book/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookForm,
    responses(
        (status = 303, description = "Book updated; redirect to the book list, or to login"),
        (status = 403, description = "Missing permission, or book not found"),
        (status = 422, description = "Invalid form, re-rendered with an error", body = BookFormPage)
    )
)]
pub async fn edit_book(
    State(state): State<AppState>,
    current: CurrentUser,
    id: Result<Path<i32>, PathRejection>,
    form: Result<Json<BookForm>, JsonRejection>,
) -> AppResult<Response> {
    current.require(&policies::EDIT_BOOK)?;
    let book = state.services.catalog.gated_book(book_id(id)?).await?;
    let form = match form {
        Ok(Json(form)) => form,
        Err(rejection) => return rerender(&state, Some(book), rejection.body_text()).await,
    };

    match state.services.catalog.edit_book(book.id, &form).await {
        Ok(_) => Ok(Redirect::to(BOOK_LIST).into_response()),
        Err(AppError::Validation(error)) => rerender(&state, Some(book), error).await,
        Err(e) => Err(e),
    }
}

/// Delete confirmation page
#[utoipa::path(
    get,
    path = "/delete-book/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book to confirm", body = DeleteBookPage),
        (status = 303, description = "Not logged in; redirect to login"),
        (status = 403, description = "Missing permission, or book not found")
    )
)]
pub async fn delete_book_page(
    State(state): State<AppState>,
    current: CurrentUser,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<DeleteBookPage>> {
    current.require(&policies::DELETE_BOOK)?;
    let book = state.services.catalog.gated_book(book_id(id)?).await?;
    Ok(Json(DeleteBookPage { book }))
}

/// Confirm deletion
#[utoipa::path(
    post,
    path = "/delete-book/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 303, description = "Book deleted; redirect to the book list, or to login"),
        (status = 403, description = "Missing permission, or book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    current: CurrentUser,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Redirect> {
    current.require(&policies::DELETE_BOOK)?;
    state.services.catalog.delete_book(book_id(id)?).await?;
    Ok(Redirect::to(BOOK_LIST))
}
