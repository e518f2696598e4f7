//! Author endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        access::policies,
        author::{Author, CreateAuthor},
        book::Book,
        library::EntityRef,
    },
    AppState,
};

use super::{guarded_body, guarded_path, CurrentUser};

/// List all authors
#[utoipa::path(
    get,
    path = "/authors/",
    tag = "authors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All authors", body = Vec<Author>),
        (status = 303, description = "Not logged in; redirect to login"),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn list_authors(State(state): State<AppState>, current: CurrentUser) -> AppResult<Json<Vec<Author>>> {
    current.require(&policies::AUTHOR_DIRECTORY)?;
    Ok(Json(state.services.catalog.list_authors().await?))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors/",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid name"),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    current: CurrentUser,
    data: Result<Json<CreateAuthor>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Author>)> {
    current.require(&policies::CREATE_AUTHOR)?;
    let author = state.services.catalog.create_author(&guarded_body(data)?).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Rename an author
#[utoipa::path(
    put,
    path = "/authors/{id}/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = CreateAuthor,
    responses(
        (status = 200, description = "Author renamed", body = Author),
        (status = 400, description = "Invalid name"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn rename_author(
    State(state): State<AppState>,
    current: CurrentUser,
    id: Result<Path<i32>, PathRejection>,
    data: Result<Json<CreateAuthor>, JsonRejection>,
) -> AppResult<Json<Author>> {
    current.require(&policies::EDIT_AUTHOR)?;
    let id = guarded_path(id)?;
    let author = state.services.catalog.rename_author(id, &guarded_body(data)?).await?;
    Ok(Json(author))
}

/// Delete an author and all of its books
#[utoipa::path(
    delete,
    path = "/authors/{id}/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author and books deleted"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    current: CurrentUser,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<StatusCode> {
    current.require(&policies::DELETE_AUTHOR)?;
    state.services.catalog.delete_author(guarded_path(id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Books written by an author (empty for an unknown author)
#[utoipa::path(
    get,
    path = "/authors/{id}/books/",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses((status = 200, description = "The author's books", body = Vec<Book>))
)]
pub async fn author_books(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.queries.books_by_author(&EntityRef::Id(id)).await?;
    Ok(Json(books))
}
