//! Library, collection and librarian endpoints

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
        library::{AddLibraryBook, AssignLibrarian, CreateLibrary, Librarian, Library, LibraryDetail},
    },
    AppState,
};

use super::{guarded_body, guarded_path, CurrentUser};

/// Library detail with its books and librarian
#[utoipa::path(
    get,
    path = "/library/{id}/",
    tag = "libraries",
    params(("id" = i32, Path, description = "Library ID")),
    responses(
        (status = 200, description = "Library detail", body = LibraryDetail),
        (status = 404, description = "Library not found")
    )
)]
pub async fn library_detail(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<LibraryDetail>> {
    Ok(Json(state.services.catalog.library_detail(id).await?))
}

#[utoipa::path(
    get,
    path = "/libraries/",
    tag = "libraries",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All libraries", body = Vec<Library>),
        (status = 303, description = "Not logged in; redirect to login"),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn list_libraries(State(state): State<AppState>, current: CurrentUser) -> AppResult<Json<Vec<Library>>> {
    current.require(&policies::LIBRARY_DIRECTORY)?;
    Ok(Json(state.services.catalog.list_libraries().await?))
}

#[utoipa::path(
    post,
    path = "/libraries/",
    tag = "libraries",
    security(("bearer_auth" = [])),
    request_body = CreateLibrary,
    responses(
        (status = 201, description = "Library created", body = Library),
        (status = 400, description = "Invalid name"),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn create_library(
    State(state): State<AppState>,
    current: CurrentUser,
    data: Result<Json<CreateLibrary>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Library>)> {
    current.require(&policies::CREATE_LIBRARY)?;
    let library = state.services.catalog.create_library(&guarded_body(data)?).await?;
    Ok((StatusCode::CREATED, Json(library)))
}

/// Delete a library and its librarian
#[utoipa::path(
    delete,
    path = "/libraries/{id}/",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Library ID")),
    responses(
        (status = 204, description = "Library and librarian deleted"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn delete_library(
    State(state): State<AppState>,
    current: CurrentUser,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<StatusCode> {
    current.require(&policies::DELETE_LIBRARY)?;
    state.services.catalog.delete_library(guarded_path(id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a book to a library's collection
#[utoipa::path(
    post,
    path = "/libraries/{id}/books/",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Library ID")),
    request_body = AddLibraryBook,
    responses(
        (status = 200, description = "Updated library", body = LibraryDetail),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Library or book not found")
    )
)]
pub async fn add_library_book(
    State(state): State<AppState>,
    current: CurrentUser,
    id: Result<Path<i32>, PathRejection>,
    data: Result<Json<AddLibraryBook>, JsonRejection>,
) -> AppResult<Json<LibraryDetail>> {
    current.require(&policies::EDIT_LIBRARY)?;
    let id = guarded_path(id)?;
    let data = guarded_body(data)?;
    let detail = state.services.catalog.add_book_to_library(id, data.book_id).await?;
    Ok(Json(detail))
}

/// Assign or rename the librarian of a library
#[utoipa::path(
    put,
    path = "/libraries/{id}/librarian/",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Library ID")),
    request_body = AssignLibrarian,
    responses(
        (status = 200, description = "Librarian assigned", body = Librarian),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn assign_librarian(
    State(state): State<AppState>,
    current: CurrentUser,
    id: Result<Path<i32>, PathRejection>,
    data: Result<Json<AssignLibrarian>, JsonRejection>,
) -> AppResult<Json<Librarian>> {
    current.require(&policies::EDIT_LIBRARY)?;
    let id = guarded_path(id)?;
    let librarian = state.services.catalog.assign_librarian(id, &guarded_body(data)?).await?;
    Ok(Json(librarian))
}
