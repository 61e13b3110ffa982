//! Integration tests for the REST API
//!
//! Each test builds the full router over a fresh in-memory database and
//! drives it with `tower::ServiceExt::oneshot`, covering the auth
//! lifecycle, role gates, and the rating rules end to end.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use ratehub_backend::api::{create_router, AppState};
use ratehub_backend::auth::password::hash_password;
use ratehub_backend::auth::TokenService;
use ratehub_backend::config::Config;
use ratehub_backend::db::Database;
use ratehub_backend::models::{Role, Store, User};

fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        database_path: ":memory:".to_string(),
        jwt_secret: "test-access-secret".to_string(),
        jwt_refresh_secret: "test-refresh-secret".to_string(),
        access_token_ttl_hours: 1,
        refresh_token_ttl_days: 7,
        cookie_secure: false,
        admin_email: "admin@example.com".to_string(),
        admin_password: "Admin@123".to_string(),
    }
}

fn test_app() -> (Router, AppState) {
    let config = test_config();
    let db = Database::open_in_memory().unwrap();
    let tokens = Arc::new(TokenService::new(
        &config.jwt_secret,
        &config.jwt_refresh_secret,
        config.access_token_ttl_hours,
        config.refresh_token_ttl_days,
    ));

    let state = AppState {
        db,
        tokens,
        config: Arc::new(config),
    };

    (create_router(state.clone()), state)
}

/// Insert a user directly and mint a token for it, skipping the login round
/// trip (and its bcrypt cost) where the test is not about logging in
fn seed_user(state: &AppState, name: &str, email: &str, role: Role) -> (User, String) {
    let hash = hash_password("Seeded@123").unwrap();
    let user = state.db.create_user(name, email, &hash, role, None).unwrap();
    let token = state.tokens.issue_access_token(&user.id, user.role).unwrap();
    (user, token)
}

fn seed_store(state: &AppState, name: &str, owner: &User) -> Store {
    state
        .db
        .create_store(name, None, Some("1 Test Lane"), &owner.id)
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn auth_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            "/api/auth/register",
            None,
            json!({ "name": name, "email": email, "password": password }),
        ),
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": email, "password": password }),
        ),
    )
    .await
}

#[tokio::test]
async fn test_root_and_health() {
    let (app, _) = test_app();

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"RateHub API is running");

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_register_returns_public_profile() {
    let (app, _) = test_app();

    let (status, body) = register(&app, "Alice Example", "alice@example.com", "Valid@123").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Registration successful");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["role"], "USER");
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let (app, _) = test_app();

    let (status, _) = register(&app, "Alice Example", "dup@example.com", "Valid@123").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = register(&app, "Another Name", "dup@example.com", "Valid@123").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let (app, _) = test_app();

    // Weak password: no uppercase, no special character
    let (status, body) = register(&app, "Alice Example", "alice@example.com", "weakpass1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation Error");
    let errors = body["errors"].as_array().unwrap();
    assert!(errors.iter().any(|e| e["field"] == "password"));

    // Name too short
    let (status, body) = register(&app, "A", "short@example.com", "Valid@123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_array().unwrap();
    assert!(errors.iter().any(|e| e["field"] == "name"));

    // Malformed body still comes back in the error envelope
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_login_sets_cookie_and_returns_tokens() {
    let (app, _) = test_app();
    register(&app, "Alice Example", "alice@example.com", "Valid@123").await;

    let request = json_request(
        Method::POST,
        "/api/auth/login",
        None,
        json!({ "email": "alice@example.com", "password": "Valid@123" }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");
    assert!(body["data"]["accessToken"].is_string());
    assert!(body["data"]["refreshToken"].is_string());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (app, _) = test_app();
    register(&app, "Alice Example", "alice@example.com", "Valid@123").await;

    let (unknown_status, unknown_body) = login(&app, "ghost@example.com", "Valid@123").await;
    let (wrong_status, wrong_body) = login(&app, "alice@example.com", "Wrong@123").await;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_body, wrong_body);
    assert_eq!(unknown_body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_cookie_authenticates_without_header() {
    let (app, state) = test_app();
    let (_, token) = seed_user(&state, "Cookie User Example", "cookie@example.com", Role::User);

    let request = Request::builder()
        .uri("/api/ratings/my")
        .header(header::COOKIE, format!("token={}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "My ratings retrieved successfully");
}

#[tokio::test]
async fn test_refresh_rotates_token_pair() {
    let (app, _) = test_app();
    register(&app, "Alice Example", "alice@example.com", "Valid@123").await;
    let (_, login_body) = login(&app, "alice@example.com", "Valid@123").await;
    let refresh_token = login_body["data"]["refreshToken"].as_str().unwrap();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/refresh",
            None,
            json!({ "refreshToken": refresh_token }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Token refresh successful");
    assert!(body["data"]["accessToken"].is_string());
    assert!(body["data"]["refreshToken"].is_string());

    // Garbage refresh token is rejected
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/refresh",
            None,
            json!({ "refreshToken": "not.a.token" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid refresh token");

    // An access token is not accepted as a refresh token
    let access_token = login_body["data"]["accessToken"].as_str().unwrap();
    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/refresh",
            None,
            json!({ "refreshToken": access_token }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_for_missing_user_rejected() {
    let (app, state) = test_app();

    // Validly signed, but the subject never made it into storage; a token
    // whose account has vanished must not mint a fresh pair
    let refresh_token = state
        .tokens
        .issue_refresh_token(&uuid::Uuid::new_v4())
        .unwrap();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/refresh",
            None,
            json!({ "refreshToken": refresh_token }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid refresh token");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (app, _) = test_app();

    let (status, body) = send(&app, get("/api/ratings/my")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized to access this route");

    let (status, _) = send(&app, auth_get("/api/ratings/my", "garbage.token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_missing_user_rejected() {
    let (app, state) = test_app();

    // Valid signature, but the subject does not exist in storage
    let token = state
        .tokens
        .issue_access_token(&uuid::Uuid::new_v4(), Role::User)
        .unwrap();

    let (status, body) = send(&app, auth_get("/api/ratings/my", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_role_gates() {
    let (app, state) = test_app();
    let (_, user_token) = seed_user(&state, "Normal User Example", "user@example.com", Role::User);
    let (_, admin_token) = seed_user(&state, "Admin Example", "admin@example.com", Role::Admin);
    let (_, owner_token) = seed_user(
        &state,
        "Owner Example",
        "owner@example.com",
        Role::StoreOwner,
    );

    // Normal users are kept out of the admin surface
    let (status, body) = send(&app, auth_get("/api/users", &user_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "User role USER is not authorized to access this route"
    );

    let (status, _) = send(&app, auth_get("/api/stores/my/store", &user_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins are not store owners
    let (status, _) = send(&app, auth_get("/api/stores/my/store", &admin_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The right role gets through
    let (status, _) = send(&app, auth_get("/api/users", &admin_token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, auth_get("/api/admin/dashboard", &admin_token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, auth_get("/api/stores/my/store", &owner_token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_creates_users_and_stores() {
    let (app, state) = test_app();
    let (_, admin_token) = seed_user(&state, "Admin Example", "admin@example.com", Role::Admin);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/users",
            Some(&admin_token),
            json!({
                "name": "New Owner Example",
                "email": "newowner@example.com",
                "password": "Valid@123",
                "role": "STORE_OWNER"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["data"]["role"], "STORE_OWNER");
    let owner_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/stores",
            Some(&admin_token),
            json!({
                "name": "Corner Coffee",
                "address": "12 Main St",
                "ownerId": owner_id
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Store created successfully");
    assert_eq!(body["data"]["name"], "Corner Coffee");

    // Unknown owner id is rejected before anything is written
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/stores",
            Some(&admin_token),
            json!({
                "name": "Orphan Store",
                "ownerId": uuid::Uuid::new_v4().to_string()
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Owner not found");

    // Non-admins may not create stores
    let (_, user_token) = seed_user(&state, "Normal User Example", "user@example.com", Role::User);
    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/stores",
            Some(&user_token),
            json!({ "name": "Nope", "ownerId": uuid::Uuid::new_v4().to_string() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rating_lifecycle() {
    let (app, state) = test_app();
    let (owner, _) = seed_user(&state, "Owner Example", "owner@example.com", Role::StoreOwner);
    let store = seed_store(&state, "Corner Coffee", &owner);

    let (status, _) = register(&app, "Rater Example", "rater@example.com", "Valid@123").await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, login_body) = login(&app, "rater@example.com", "Valid@123").await;
    let token = login_body["data"]["accessToken"].as_str().unwrap().to_string();

    // Submit a 5-star rating
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/ratings",
            Some(&token),
            json!({ "storeId": store.id.to_string(), "rating": 5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Rating submitted successfully");
    assert_eq!(body["data"]["rating"], 5);
    assert_eq!(body["data"]["store"]["name"], "Corner Coffee");
    let rating_id = body["data"]["id"].as_str().unwrap().to_string();

    // A second submission conflicts instead of overwriting
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/ratings",
            Some(&token),
            json!({ "storeId": store.id.to_string(), "rating": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "You have already rated this store. Please update your existing rating."
    );

    // Update through the dedicated endpoint
    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/ratings/{}", rating_id),
            Some(&token),
            json!({ "rating": 3 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Rating updated successfully");
    assert_eq!(body["data"]["rating"], 3);

    // The public store view reflects the updated value
    let (status, body) = send(&app, get(&format!("/api/stores/{}", store.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["averageRating"], 3.0);
    assert_eq!(body["data"]["ratings"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["ratings"][0]["user"]["name"], "Rater Example");

    // My ratings history carries the store reference
    let (status, body) = send(&app, auth_get("/api/ratings/my", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let mine = body["data"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["rating"], 3);
    assert_eq!(mine[0]["store"]["name"], "Corner Coffee");

    // Lookup by store returns the single rating
    let (status, body) = send(
        &app,
        auth_get(&format!("/api/ratings/store/{}", store.id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Rating for store retrieved successfully");
    assert_eq!(body["data"]["rating"], 3);
}

#[tokio::test]
async fn test_rating_rules() {
    let (app, state) = test_app();
    let (owner, _) = seed_user(&state, "Owner Example", "owner@example.com", Role::StoreOwner);
    let store = seed_store(&state, "Corner Coffee", &owner);
    let (_, alice_token) = seed_user(&state, "Alice Example", "alice@example.com", Role::User);
    let (_, bob_token) = seed_user(&state, "Bob Example", "bob@example.com", Role::User);

    // Out-of-range values never reach storage
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/ratings",
            Some(&alice_token),
            json!({ "storeId": store.id.to_string(), "rating": 6 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation Error");

    // Rating an unknown store fails cleanly
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/ratings",
            Some(&alice_token),
            json!({ "storeId": uuid::Uuid::new_v4().to_string(), "rating": 4 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Store not found");

    // Alice rates; Bob cannot touch her rating
    let (_, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/ratings",
            Some(&alice_token),
            json!({ "storeId": store.id.to_string(), "rating": 4 }),
        ),
    )
    .await;
    let rating_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/ratings/{}", rating_id),
            Some(&bob_token),
            json!({ "rating": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to update this rating");

    // Unknown and malformed rating ids read as missing
    for id in [uuid::Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let (status, body) = send(
            &app,
            json_request(
                Method::PUT,
                &format!("/api/ratings/{}", id),
                Some(&alice_token),
                json!({ "rating": 2 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Rating not found");
    }
}

#[tokio::test]
async fn test_unrated_store_reads_as_zero() {
    let (app, state) = test_app();
    let (owner, _) = seed_user(&state, "Owner Example", "owner@example.com", Role::StoreOwner);
    let store = seed_store(&state, "Quiet Store", &owner);
    let (_, token) = seed_user(&state, "Alice Example", "alice@example.com", Role::User);

    let (status, body) = send(&app, get(&format!("/api/stores/{}", store.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["averageRating"], 0.0);
    assert!(body["data"]["ratings"].as_array().unwrap().is_empty());

    // No rating yet: data is null, not an error
    let (status, body) = send(
        &app,
        auth_get(&format!("/api/ratings/store/{}", store.id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_store_listing_pagination_and_filters() {
    let (app, state) = test_app();
    let (owner, _) = seed_user(&state, "Owner Example", "owner@example.com", Role::StoreOwner);
    seed_store(&state, "Corner Coffee", &owner);
    seed_store(&state, "Corner Books", &owner);
    seed_store(&state, "Main Street Bakery", &owner);

    // Public, no token required
    let (status, body) = send(&app, get("/api/stores?limit=2&page=2&sortBy=name&sortOrder=asc")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Stores retrieved successfully");
    let stores = body["data"]["stores"].as_array().unwrap();
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0]["name"], "Main Street Bakery");
    assert_eq!(body["data"]["pagination"]["total"], 3);
    assert_eq!(body["data"]["pagination"]["totalPages"], 2);

    // Substring filter on name
    let (_, body) = send(&app, get("/api/stores?name=corner")).await;
    let stores = body["data"]["stores"].as_array().unwrap();
    assert_eq!(stores.len(), 2);
    assert_eq!(body["data"]["pagination"]["total"], 2);
    assert_eq!(stores[0]["owner"]["email"], "owner@example.com");

    // Past the end: empty page, totals intact
    let (_, body) = send(&app, get("/api/stores?page=9")).await;
    assert!(body["data"]["stores"].as_array().unwrap().is_empty());
    assert_eq!(body["data"]["pagination"]["total"], 3);
}

#[tokio::test]
async fn test_malformed_query_keeps_error_envelope() {
    let (app, state) = test_app();

    // A non-numeric page must not fall through to a plain-text rejection
    let (status, body) = send(&app, get("/api/stores?page=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("query string"));

    // The admin user listing goes through the same extractor
    let (_, admin_token) = seed_user(&state, "Admin Example", "admin@example.com", Role::Admin);
    let (status, body) = send(&app, auth_get("/api/users?limit=nope", &admin_token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_user_listing_and_detail() {
    let (app, state) = test_app();
    let (_, admin_token) = seed_user(&state, "Admin Example", "admin@example.com", Role::Admin);
    let (owner, _) = seed_user(&state, "Owner Example", "owner@example.com", Role::StoreOwner);
    let store = seed_store(&state, "Corner Coffee", &owner);
    let (alice, _) = seed_user(&state, "Alice Example", "alice@example.com", Role::User);
    state.db.insert_rating(&alice.id, &store.id, 4).unwrap();

    let (status, body) = send(
        &app,
        auth_get("/api/users?role=USER&sortBy=email&sortOrder=asc", &admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let users = body["data"]["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "alice@example.com");
    assert_eq!(users[0]["_count"]["ratings"], 1);
    assert!(users[0].get("passwordHash").is_none());

    // Invalid role filter is a clean 400
    let (status, body) = send(&app, auth_get("/api/users?role=WIZARD", &admin_token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid role: WIZARD");

    // Detail view carries owned stores and submitted ratings
    let (status, body) = send(
        &app,
        auth_get(&format!("/api/users/{}", owner.id), &admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User retrieved successfully");
    assert_eq!(body["data"]["stores"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["stores"][0]["name"], "Corner Coffee");

    // Unknown and malformed ids both read as missing
    for id in [uuid::Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let (status, body) = send(
            &app,
            auth_get(&format!("/api/users/{}", id), &admin_token),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }
}

#[tokio::test]
async fn test_owner_store_dashboard() {
    let (app, state) = test_app();
    let (owner, owner_token) = seed_user(&state, "Owner Example", "owner@example.com", Role::StoreOwner);
    let store = seed_store(&state, "Corner Coffee", &owner);
    let (alice, _) = seed_user(&state, "Alice Example", "alice@example.com", Role::User);
    let (bob, _) = seed_user(&state, "Bob Example", "bob@example.com", Role::User);
    state.db.insert_rating(&alice.id, &store.id, 5).unwrap();
    state.db.insert_rating(&bob.id, &store.id, 4).unwrap();

    let (status, body) = send(&app, auth_get("/api/stores/my/store", &owner_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "My store retrieved successfully");

    let stores = body["data"].as_array().unwrap();
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0]["name"], "Corner Coffee");
    assert_eq!(stores[0]["averageRating"], 4.5);
    assert_eq!(stores[0]["ratings"].as_array().unwrap().len(), 2);
    // The owner view omits the redundant owner block
    assert!(stores[0].get("owner").is_none());

    // An owner with no stores sees an empty list, not an error
    let (_, empty_token) = seed_user(
        &state,
        "Storeless Owner Example",
        "empty@example.com",
        Role::StoreOwner,
    );
    let (status, body) = send(&app, auth_get("/api/stores/my/store", &empty_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_password_change_flow() {
    let (app, _) = test_app();
    register(&app, "Alice Example", "alice@example.com", "Valid@123").await;
    let (_, login_body) = login(&app, "alice@example.com", "Valid@123").await;
    let token = login_body["data"]["accessToken"].as_str().unwrap().to_string();

    // Wrong current password is rejected
    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/auth/password",
            Some(&token),
            json!({ "currentPassword": "Wrong@123", "newPassword": "Fresh@456" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Incorrect current password");

    // Weak replacement is rejected before any service logic runs
    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/auth/password",
            Some(&token),
            json!({ "currentPassword": "Valid@123", "newPassword": "weak" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation Error");

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/auth/password",
            Some(&token),
            json!({ "currentPassword": "Valid@123", "newPassword": "Fresh@456" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password updated successfully");
    assert!(body["data"].is_null());

    // Old credential is dead, the new one works
    let (status, _) = login(&app, "alice@example.com", "Valid@123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, "alice@example.com", "Fresh@456").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_bootstrap_admin_reaches_dashboard() {
    let (app, state) = test_app();
    state
        .db
        .ensure_default_admin("admin@example.com", "Admin@123")
        .unwrap();

    let (status, body) = login(&app, "admin@example.com", "Admin@123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["role"], "ADMIN");
    let token = body["data"]["accessToken"].as_str().unwrap().to_string();

    let (status, body) = send(&app, auth_get("/api/admin/dashboard", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalUsers"], 1);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let (app, state) = test_app();
    let (_, admin_token) = seed_user(&state, "Admin Example", "admin@example.com", Role::Admin);
    let (owner, _) = seed_user(&state, "Owner Example", "owner@example.com", Role::StoreOwner);
    let store = seed_store(&state, "Corner Coffee", &owner);
    let (alice, _) = seed_user(&state, "Alice Example", "alice@example.com", Role::User);
    state.db.insert_rating(&alice.id, &store.id, 5).unwrap();

    let (status, body) = send(&app, auth_get("/api/admin/dashboard", &admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dashboard stats retrieved");
    assert_eq!(body["data"]["totalUsers"], 3);
    assert_eq!(body["data"]["totalStores"], 1);
    assert_eq!(body["data"]["totalRatings"], 1);
    assert_eq!(body["data"]["userRoleDistribution"]["ADMIN"], 1);
    assert_eq!(body["data"]["userRoleDistribution"]["STORE_OWNER"], 1);
    assert_eq!(body["data"]["userRoleDistribution"]["USER"], 1);
}
