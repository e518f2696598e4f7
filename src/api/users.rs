//! User role and permission administration (Admin role only)

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        access::policies,
        user::{GrantPermission, UpdateRole, UserProfile},
    },
    AppState,
};

use super::{guarded_body, guarded_path, CurrentUser};

#[derive(Serialize, ToSchema)]
pub struct GrantResponse {
    pub user_id: i32,
    pub permission: String,
}

/// Change a user's role; applies from the user's next request
#[utoipa::path(
    put,
    path = "/users/{id}/role/",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateRole,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    current: CurrentUser,
    id: Result<Path<i32>, PathRejection>,
    request: Result<Json<UpdateRole>, JsonRejection>,
) -> AppResult<Json<UserProfile>> {
    current.require(&policies::MANAGE_USERS)?;
    let id = guarded_path(id)?;
    let request = guarded_body(request)?;
    let profile = state.services.users.set_role(id, request.role).await?;
    Ok(Json(profile))
}

/// Grant a named permission
#[utoipa::path(
    post,
    path = "/users/{id}/permissions/",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = GrantPermission,
    responses(
        (status = 201, description = "Permission granted", body = GrantResponse),
        (status = 400, description = "Unknown permission"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn grant_permission(
    State(state): State<AppState>,
    current: CurrentUser,
    id: Result<Path<i32>, PathRejection>,
    request: Result<Json<GrantPermission>, JsonRejection>,
) -> AppResult<(StatusCode, Json<GrantResponse>)> {
    current.require(&policies::MANAGE_USERS)?;
    let id = guarded_path(id)?;
    let request = guarded_body(request)?;
    let permission = state.services.users.grant_permission(id, &request.permission).await?;
    Ok((
        StatusCode::CREATED,
        Json(GrantResponse {
            user_id: id,
            permission: permission.qualified(),
        }),
    ))
}

/// Revoke a named permission
#[utoipa::path(
    delete,
    path = "/users/{id}/permissions/{codename}/",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID"),
        ("codename" = String, Path, description = "Permission codename, e.g. catalog.can_add_book")
    ),
    responses(
        (status = 204, description = "Permission revoked"),
        (status = 400, description = "Unknown permission"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Grant not found")
    )
)]
pub async fn revoke_permission(
    State(state): State<AppState>,
    current: CurrentUser,
    path: Result<Path<(i32, String)>, PathRejection>,
) -> AppResult<StatusCode> {
    current.require(&policies::MANAGE_USERS)?;
    let (id, codename) = guarded_path(path)?;
    state.services.users.revoke_permission(id, &codename).await?;
    Ok(StatusCode::NO_CONTENT)
}
