//! API integration tests
//!
//! Run against a live server with a bootstrap admin configured:
//! `cargo test --test api_tests -- --ignored`

use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};

fn base_url() -> String {
    std::env::var("ATHENAEUM_TEST_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

fn url(path: &str) -> String {
    format!("{}{}", base_url(), path)
}

/// Redirects are asserted on, never followed
fn client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, uuid::Uuid::new_v4().simple())
}

async fn login(client: &Client, identifier: &str, password: &str) -> String {
    let response = client
        .post(url("/login/"))
        .json(&json!({ "username": identifier, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Token for the bootstrap superuser
async fn admin_token(client: &Client) -> String {
    let email = std::env::var("ATHENAEUM_TEST_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.org".to_string());
    let password = std::env::var("ATHENAEUM_TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "change-me-now".to_string());
    login(client, &email, &password).await
}

/// Register a fresh member account and return its token
async fn register_member(client: &Client) -> (String, Value) {
    let username = format!("member_{}", uuid::Uuid::new_v4().simple());
    let response = client
        .post(url("/register/"))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password1": "correct-horse",
            "password2": "correct-horse"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().expect("No token").to_string();
    (token, body["user"].clone())
}

async fn create_author(client: &Client, token: &str, name: &str) -> i64 {
    let response = client
        .post(url("/authors/"))
        .bearer_auth(token)
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No author id")
}

async fn create_library(client: &Client, token: &str, name: &str) -> i64 {
    let response = client
        .post(url("/libraries/"))
        .bearer_auth(token)
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No library id")
}

async fn get_json(client: &Client, path: &str) -> Value {
    let response = client.get(url(path)).send().await.expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK, "GET {}", path);
    response.json().await.expect("Failed to parse response")
}

fn titles(books: &Value) -> Vec<String> {
    books
        .as_array()
        .expect("Expected an array")
        .iter()
        .map(|b| b["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let body = get_json(&client(), "/health").await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let response = client()
        .post(url("/login/"))
        .json(&json!({ "username": "nobody@example.com", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_registration_creates_member_profile() {
    let client = client();
    let (token, user) = register_member(&client).await;
    assert_eq!(user["role"], "Member");

    let response = client
        .get(url("/me/"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let me: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(me["role"], "Member");
    assert_eq!(me["permissions"], json!([]));
}

#[tokio::test]
#[ignore]
async fn test_registration_password_mismatch() {
    let response = client()
        .post(url("/register/"))
        .json(&json!({
            "username": "mismatch",
            "email": "mismatch@example.com",
            "password1": "correct-horse",
            "password2": "battery-staple"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "The two password fields didn't match");
}

#[tokio::test]
#[ignore]
async fn test_anonymous_add_book_redirects_to_login() {
    let response = client()
        .get(url("/add-book/"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()["location"].to_str().expect("location");
    assert_eq!(location, "/login/?next=/add-book/");
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_add_books_or_open_admin() {
    let client = client();
    let (token, _) = register_member(&client).await;

    let response = client
        .post(url("/add-book/"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Nope", "author": "1" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .get(url("/member/"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(url("/admin/"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_granted_permission_opens_add_book_in_the_open_session() {
    let client = client();
    let admin = admin_token(&client).await;
    let (token, user) = register_member(&client).await;
    let user_id = user["id"].as_i64().expect("user id");

    let response = client
        .get(url("/add-book/"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .post(url(&format!("/users/{}/permissions/", user_id)))
        .bearer_auth(&admin)
        .json(&json!({ "permission": "catalog.can_add_book" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .get(url("/add-book/"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_demoted_librarian_loses_access_without_relogin() {
    let client = client();
    let admin = admin_token(&client).await;
    let (token, user) = register_member(&client).await;
    let user_id = user["id"].as_i64().expect("user id");

    for (role, expected) in [("Librarian", StatusCode::OK), ("Member", StatusCode::FORBIDDEN)] {
        let response = client
            .put(url(&format!("/users/{}/role/", user_id)))
            .bearer_auth(&admin)
            .json(&json!({ "role": role }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::OK);

        let response = client
            .get(url("/librarian/"))
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), expected, "as {role}");
    }
}

#[tokio::test]
#[ignore]
async fn test_add_book_missing_title_rerenders_form() {
    let client = client();
    let admin = admin_token(&client).await;
    let author_id = create_author(&client, &admin, &unique("Author")).await;

    let response = client
        .post(url("/add-book/"))
        .bearer_auth(&admin)
        .json(&json!({ "title": "", "author": author_id.to_string() }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Title is required");
    assert!(body["authors"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_add_book_accepts_a_numeric_author() {
    let client = client();
    let admin = admin_token(&client).await;
    let author_id = create_author(&client, &admin, &unique("Author")).await;

    let response = client
        .post(url("/add-book/"))
        .bearer_auth(&admin)
        .json(&json!({ "title": unique("Book"), "author": author_id, "publication_year": 2001 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = client
        .post(url("/add-book/"))
        .bearer_auth(&admin)
        .json(&json!({ "title": ["not", "a", "title"] }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());
    assert!(body["authors"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_edit_missing_book_is_forbidden() {
    let client = client();
    let admin = admin_token(&client).await;

    let response = client
        .get(url("/edit-book/2147483647/"))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book not found");
}

#[tokio::test]
#[ignore]
async fn test_catalog_queries_by_name() {
    let client = client();
    let admin = admin_token(&client).await;
    let author = unique("A. Author");
    let library = unique("Main");

    let author_id = create_author(&client, &admin, &author).await;
    let response = client
        .post(url("/add-book/"))
        .bearer_auth(&admin)
        .json(&json!({ "title": "Sample", "author": author_id.to_string(), "publication_year": "1999" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/books/");

    let books = get_json(&client, &format!("/authors/{}/books/", author_id)).await;
    assert_eq!(titles(&books), vec!["Sample".to_string()]);
    let book_id = books[0]["id"].as_i64().expect("book id");

    let library_id = create_library(&client, &admin, &library).await;
    let response = client
        .post(url(&format!("/libraries/{}/books/", library_id)))
        .bearer_auth(&admin)
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .put(url(&format!("/libraries/{}/librarian/", library_id)))
        .bearer_auth(&admin)
        .json(&json!({ "name": "L. One" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let by_author = client
        .get(url("/queries/books-by-author"))
        .query(&[("name", author.as_str())])
        .send()
        .await
        .expect("Failed to send request");
    let by_author: Value = by_author.json().await.expect("Failed to parse response");
    assert_eq!(titles(&by_author), vec!["Sample".to_string()]);

    let in_library = client
        .get(url("/queries/books-in-library"))
        .query(&[("name", library.as_str())])
        .send()
        .await
        .expect("Failed to send request");
    let in_library: Value = in_library.json().await.expect("Failed to parse response");
    assert_eq!(titles(&in_library), vec!["Sample".to_string()]);

    let librarian = client
        .get(url("/queries/librarian"))
        .query(&[("name", library.as_str())])
        .send()
        .await
        .expect("Failed to send request");
    let librarian: Value = librarian.json().await.expect("Failed to parse response");
    assert_eq!(librarian["name"], "L. One");

    let detail = get_json(&client, &format!("/library/{}/", library_id)).await;
    assert_eq!(detail["librarian"]["name"], "L. One");
    assert_eq!(titles(&detail["books"]), vec!["Sample".to_string()]);
}

#[tokio::test]
#[ignore]
async fn test_unknown_library_queries_are_empty() {
    let client = client();
    let name = unique("Nowhere");

    let books = client
        .get(url("/queries/books-in-library"))
        .query(&[("name", name.as_str())])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(books.status(), StatusCode::OK);
    let books: Value = books.json().await.expect("Failed to parse response");
    assert_eq!(books, json!([]));

    let librarian = client
        .get(url("/queries/librarian"))
        .query(&[("name", name.as_str())])
        .send()
        .await
        .expect("Failed to send request");
    let librarian: Value = librarian.json().await.expect("Failed to parse response");
    assert!(librarian.is_null());
}

#[tokio::test]
#[ignore]
async fn test_deleting_author_cascades_to_books() {
    let client = client();
    let admin = admin_token(&client).await;
    let author_id = create_author(&client, &admin, &unique("Doomed")).await;

    let response = client
        .post(url("/add-book/"))
        .bearer_auth(&admin)
        .json(&json!({ "title": "Ephemeral", "author": author_id.to_string() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = client
        .delete(url(&format!("/authors/{}/", author_id)))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let books = get_json(&client, &format!("/authors/{}/books/", author_id)).await;
    assert_eq!(books, json!([]));
}

#[tokio::test]
#[ignore]
async fn test_deleting_library_removes_librarian() {
    let client = client();
    let admin = admin_token(&client).await;
    let library_id = create_library(&client, &admin, &unique("Closing")).await;

    let response = client
        .put(url(&format!("/libraries/{}/librarian/", library_id)))
        .bearer_auth(&admin)
        .json(&json!({ "name": "Last Keeper" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .delete(url(&format!("/libraries/{}/", library_id)))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let librarian = get_json(&client, &format!("/queries/librarian?id={}", library_id)).await;
    assert!(librarian.is_null());
}

#[tokio::test]
#[ignore]
async fn test_logout_revokes_session() {
    let client = client();
    let (token, _) = register_member(&client).await;

    let response = client
        .post(url("/logout/"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(url("/me/"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
