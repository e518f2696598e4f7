//! Relationship query endpoints, by id or by name

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        library::{EntityRef, Librarian, LookupQuery},
    },
    AppState,
};

fn entity(query: LookupQuery) -> AppResult<EntityRef> {
    query
        .into_ref()
        .ok_or_else(|| AppError::BadRequest("Either id or name is required".to_string()))
}

/// Books by an author
#[utoipa::path(
    get,
    path = "/queries/books-by-author",
    tag = "queries",
    params(LookupQuery),
    responses(
        (status = 200, description = "Books of the author; empty if unknown", body = Vec<Book>),
        (status = 400, description = "Neither id nor name given")
    )
)]
pub async fn books_by_author(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let author = entity(query)?;
    Ok(Json(state.services.queries.books_by_author(&author).await?))
}

/// Books in a library
#[utoipa::path(
    get,
    path = "/queries/books-in-library",
    tag = "queries",
    params(LookupQuery),
    responses(
        (status = 200, description = "Books of the library; empty if unknown", body = Vec<Book>),
        (status = 400, description = "Neither id nor name given")
    )
)]
pub async fn books_in_library(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let library = entity(query)?;
    Ok(Json(state.services.queries.books_in_library(&library).await?))
}

/// Librarian of a library
#[utoipa::path(
    get,
    path = "/queries/librarian",
    tag = "queries",
    params(LookupQuery),
    responses(
        (status = 200, description = "The librarian, or null when none", body = Option<Librarian>),
        (status = 400, description = "Neither id nor name given")
    )
)]
pub async fn librarian_for_library(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> AppResult<Json<Option<Librarian>>> {
    let library = entity(query)?;
    Ok(Json(state.services.queries.librarian_for_library(&library).await?))
}
