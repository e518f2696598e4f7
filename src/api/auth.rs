//! Session lifecycle endpoints: login, registration, logout

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        access::policies,
        user::{LoginRequest, RegisterUser, UserClaims, UserInfo},
    },
    AppState,
};

use super::{CurrentUser, FormPage};

/// Where a freshly logged-in client goes next
pub const AFTER_LOGIN: &str = "/books/";

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Expiry as a Unix timestamp
    pub expires_at: i64,
    pub user: UserInfo,
    pub redirect: String,
}

#[derive(Serialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((state.config.auth.session_cookie.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn login_response(token: String, claims: &UserClaims) -> LoginResponse {
    LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_at: claims.exp,
        user: UserInfo::from(claims),
        redirect: AFTER_LOGIN.to_string(),
    }
}

/// Login form
#[utoipa::path(
    get,
    path = "/login/",
    tag = "auth",
    responses((status = 200, description = "Login form fields", body = FormPage))
)]
pub async fn login_page() -> Json<FormPage> {
    Json(FormPage::new(&["username", "password"]))
}

/// Log in with the configured identifier (email by default) and password
#[utoipa::path(
    post,
    path = "/login/",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let (token, claims) = state
        .services
        .users
        .authenticate(&request.username, &request.password)
        .await?;

    let jar = jar.add(session_cookie(&state, token.clone()));
    Ok((jar, Json(login_response(token, &claims))))
}

/// Registration form
#[utoipa::path(
    get,
    path = "/register/",
    tag = "auth",
    responses((status = 200, description = "Registration form fields", body = FormPage))
)]
pub async fn register_page() -> Json<FormPage> {
    Json(FormPage::new(&[
        "username",
        "email",
        "password1",
        "password2",
        "first_name",
        "last_name",
        "date_of_birth",
        "profile_photo",
    ]))
}

/// Create an account (with a Member profile) and log it in
#[utoipa::path(
    post,
    path = "/register/",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Registered and logged in", body = LoginResponse),
        (status = 400, description = "Invalid form"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<RegisterUser>,
) -> AppResult<(StatusCode, CookieJar, Json<LoginResponse>)> {
    let user = state.services.users.register(form).await?;
    let (token, claims) = state.services.users.issue_token(&user).await?;

    let jar = jar.add(session_cookie(&state, token.clone()));
    Ok((StatusCode::CREATED, jar, Json(login_response(token, &claims))))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/logout/",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = LogoutResponse),
        (status = 303, description = "Not logged in; redirect to login")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<LogoutResponse>)> {
    let claims = current.require(&policies::LOGIN)?;
    state.services.users.logout(claims).await?;

    let jar = jar.remove(Cookie::build(state.config.auth.session_cookie.clone()).path("/"));
    Ok((
        jar,
        Json(LogoutResponse {
            message: "Logged out".to_string(),
        }),
    ))
}

/// Current session's user
#[utoipa::path(
    get,
    path = "/me/",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 303, description = "Not logged in; redirect to login")
    )
)]
pub async fn me(current: CurrentUser) -> AppResult<Json<UserInfo>> {
    let claims = current.require(&policies::LOGIN)?;
    Ok(Json(UserInfo::from(claims)))
}
