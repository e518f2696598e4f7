//! Role dashboards

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        access::policies,
        book::BookListing,
        library::Library,
        user::UserWithRole,
    },
    AppState,
};

use super::CurrentUser;

#[derive(Serialize, ToSchema)]
pub struct AdminDashboard {
    pub page_title: String,
    pub users: Vec<UserWithRole>,
}

#[derive(Serialize, ToSchema)]
pub struct LibrarianDashboard {
    pub page_title: String,
    pub libraries: Vec<Library>,
    pub books: Vec<BookListing>,
}

#[derive(Serialize, ToSchema)]
pub struct MemberDashboard {
    pub page_title: String,
    pub books: Vec<BookListing>,
}

/// Admin dashboard: every user and their role
#[utoipa::path(
    get,
    path = "/admin/",
    tag = "dashboards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users and roles", body = AdminDashboard),
        (status = 303, description = "Not logged in; redirect to login"),
        (status = 403, description = "Not an Admin")
    )
)]
pub async fn admin_dashboard(State(state): State<AppState>, current: CurrentUser) -> AppResult<Json<AdminDashboard>> {
    current.require(&policies::ADMIN_DASHBOARD)?;
    Ok(Json(AdminDashboard {
        page_title: "Admin Dashboard".to_string(),
        users: state.services.users.list_with_roles().await?,
    }))
}

/// Librarian dashboard: libraries and books
#[utoipa::path(
    get,
    path = "/librarian/",
    tag = "dashboards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Libraries and books", body = LibrarianDashboard),
        (status = 303, description = "Not logged in; redirect to login"),
        (status = 403, description = "Not a Librarian")
    )
)]
pub async fn librarian_dashboard(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<LibrarianDashboard>> {
    current.require(&policies::LIBRARIAN_DASHBOARD)?;
    Ok(Json(LibrarianDashboard {
        page_title: "Librarian Dashboard".to_string(),
        libraries: state.services.catalog.list_libraries().await?,
        books: state.services.catalog.list_books().await?,
    }))
}

/// Member dashboard: the catalog
#[utoipa::path(
    get,
    path = "/member/",
    tag = "dashboards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Books", body = MemberDashboard),
        (status = 303, description = "Not logged in; redirect to login"),
        (status = 403, description = "Not a Member")
    )
)]
pub async fn member_dashboard(State(state): State<AppState>, current: CurrentUser) -> AppResult<Json<MemberDashboard>> {
    current.require(&policies::MEMBER_DASHBOARD)?;
    Ok(Json(MemberDashboard {
        page_title: "Member Dashboard".to_string(),
        books: state.services.catalog.list_books().await?,
    }))
}
