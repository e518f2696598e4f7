//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, dashboards, health, libraries, queries, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Athenaeum API",
        version = "0.1.0",
        description = "Library catalog with role and permission based access control"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login_page,
        auth::login,
        auth::register_page,
        auth::register,
        auth::logout,
        auth::me,
        // Books
        books::list_books,
        books::add_book_page,
        books::add_book,
        books::edit_book_page,
        books::edit_book,
        books::delete_book_page,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::create_author,
        authors::rename_author,
        authors::delete_author,
        authors::author_books,
        // Libraries
        libraries::library_detail,
        libraries::list_libraries,
        libraries::create_library,
        libraries::delete_library,
        libraries::add_library_book,
        libraries::assign_librarian,
        // Queries
        queries::books_by_author,
        queries::books_in_library,
        queries::librarian_for_library,
        // Dashboards
        dashboards::admin_dashboard,
        dashboards::librarian_dashboard,
        dashboards::member_dashboard,
        // Users
        users::update_role,
        users::grant_permission,
        users::revoke_permission,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::LoginRequest,
            crate::models::user::RegisterUser,
            crate::models::user::UserInfo,
            crate::models::user::Role,
            auth::LoginResponse,
            auth::LogoutResponse,
            super::FormPage,
            // Catalog
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::book::Book,
            crate::models::book::BookListing,
            crate::models::book::BookForm,
            crate::models::book::BookFormPage,
            crate::models::book::DeleteBookPage,
            crate::models::library::Library,
            crate::models::library::Librarian,
            crate::models::library::LibraryDetail,
            crate::models::library::CreateLibrary,
            crate::models::library::AddLibraryBook,
            crate::models::library::AssignLibrarian,
            // Dashboards
            dashboards::AdminDashboard,
            dashboards::LibrarianDashboard,
            dashboards::MemberDashboard,
            // Users
            crate::models::user::User,
            crate::models::user::UserProfile,
            crate::models::user::UserWithRole,
            crate::models::user::UpdateRole,
            crate::models::user::GrantPermission,
            users::GrantResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Login, registration and sessions"),
        (name = "books", description = "Book catalog and gated book forms"),
        (name = "authors", description = "Author management"),
        (name = "libraries", description = "Libraries, collections and librarians"),
        (name = "queries", description = "Relationship lookups by id or name"),
        (name = "dashboards", description = "Role dashboards"),
        (name = "users", description = "Role and permission administration")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_guarded_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/add-book/", "/edit-book/{id}/", "/delete-book/{id}/", "/library/{id}/", "/queries/librarian"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let author = &doc.paths.paths["/authors/{id}/"];
        assert!(author.operations.contains_key(&utoipa::openapi::PathItemType::Put));
        assert!(author.operations.contains_key(&utoipa::openapi::PathItemType::Delete));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
