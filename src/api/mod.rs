//! API handlers for Athenaeum HTTP endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod dashboards;
pub mod health;
pub mod libraries;
pub mod openapi;
pub mod queries;
pub mod users;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequestParts, Path,
    },
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post, put},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        access::{AccessPolicy, Decision, Principal},
        user::UserClaims,
    },
    AppState,
};

/// Description of a form page: the fields a client should submit
#[derive(Serialize, ToSchema)]
pub struct FormPage {
    pub fields: Vec<String>,
}

impl FormPage {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// All application routes
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Sessions
        .route("/login/", get(auth::login_page).post(auth::login))
        .route("/register/", get(auth::register_page).post(auth::register))
        .route("/logout/", post(auth::logout))
        .route("/me/", get(auth::me))
        // Books
        .route("/books/", get(books::list_books))
        .route("/add-book/", get(books::add_book_page).post(books::add_book))
        .route("/edit-book/:id/", get(books::edit_book_page).post(books::edit_book))
        .route("/delete-book/:id/", get(books::delete_book_page).post(books::delete_book))
        // Authors
        .route("/authors/", get(authors::list_authors).post(authors::create_author))
        .route("/authors/:id/", put(authors::rename_author).delete(authors::delete_author))
        .route("/authors/:id/books/", get(authors::author_books))
        // Libraries
        .route("/library/:id/", get(libraries::library_detail))
        .route("/libraries/", get(libraries::list_libraries).post(libraries::create_library))
        .route("/libraries/:id/", delete(libraries::delete_library))
        .route("/libraries/:id/books/", post(libraries::add_library_book))
        .route("/libraries/:id/librarian/", put(libraries::assign_librarian))
        // Relationship queries
        .route("/queries/books-by-author", get(queries::books_by_author))
        .route("/queries/books-in-library", get(queries::books_in_library))
        .route("/queries/librarian", get(queries::librarian_for_library))
        // Dashboards
        .route("/admin/", get(dashboards::admin_dashboard))
        .route("/librarian/", get(dashboards::librarian_dashboard))
        .route("/member/", get(dashboards::member_dashboard))
        // User administration
        .route("/users/:id/role/", put(users::update_role))
        .route("/users/:id/permissions/", post(users::grant_permission))
        .route("/users/:id/permissions/:codename/", delete(users::revoke_permission))
        .with_state(state)
}

/// JSON body of a guarded request, read once the guard has passed
pub fn guarded_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Path parameters of a guarded request; unparseable ones name nothing
pub fn guarded_path<T>(path: Result<Path<T>, PathRejection>) -> AppResult<T> {
    path.map(|Path(value)| value)
        .map_err(|rejection| AppError::NotFound(rejection.body_text()))
}

/// Identity behind the request, resolved from a bearer token or the
/// session cookie. Missing, invalid, expired and logged-out tokens all
/// resolve to an anonymous principal.
pub struct CurrentUser {
    pub principal: Principal,
    path: String,
    login_url: String,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).or_else(|| {
            CookieJar::from_headers(&parts.headers)
                .get(&state.config.auth.session_cookie)
                .map(|cookie| cookie.value().to_string())
        });

        let principal = match token {
            None => Principal::Anonymous,
            Some(token) => match state.services.users.session_claims(&token).await {
                Ok(claims) => Principal::User(claims),
                Err(AppError::Authentication(reason)) => {
                    tracing::debug!("Treating request as anonymous: {}", reason);
                    Principal::Anonymous
                }
                Err(e) => return Err(e),
            },
        };

        Ok(CurrentUser {
            principal,
            path: parts.uri.path().to_string(),
            login_url: state.config.auth.login_url.clone(),
        })
    }
}

impl CurrentUser {
    /// Run the guard chain of `policy`; the session claims on success
    pub fn require(&self, policy: &AccessPolicy) -> Result<&UserClaims, AppError> {
        match policy.evaluate(&self.principal) {
            Decision::Allow => self
                .principal
                .claims()
                .ok_or_else(|| AppError::Internal("Allowed request without a session".to_string())),
            Decision::RedirectToLogin => Err(AppError::LoginRequired {
                location: format!("{}?next={}", self.login_url, self.path),
            }),
            Decision::Forbidden(reason) => {
                tracing::info!("Forbidden {}: {}", self.path, reason);
                Err(AppError::Authorization(reason))
            }
        }
    }
}
