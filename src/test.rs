use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{
    book::{Book, BookPatch, NewBook},
    config::{MongoConfig, ServerConfig, StorageConfig},
    error::ErrorVerbosity,
    extractor::validated::ValidationPolicy,
    repository::{BookRepository, InMemoryBookRepository, RepositoryError},
    route,
    server::{self, Server},
    state::ApiState,
};

#[tokio::test]
async fn example_config_is_valid() {
    ServerConfig::from_config_file("config.example.yaml")
        .await
        .expect("Example config is not parsable");
}

/// Fails every operation the way an unreachable database would.
struct UnavailableBookRepository;

fn unavailable() -> RepositoryError {
    RepositoryError::Other("database is down".to_string())
}

#[async_trait]
impl BookRepository for UnavailableBookRepository {
    async fn insert(&self, _: NewBook) -> Result<Book, RepositoryError> {
        Err(unavailable())
    }

    async fn list_all(&self) -> Result<Vec<Book>, RepositoryError> {
        Err(unavailable())
    }

    async fn get_by_id(&self, _: &str) -> Result<Book, RepositoryError> {
        Err(unavailable())
    }

    async fn update_by_id(&self, _: &str, _: BookPatch) -> Result<Book, RepositoryError> {
        Err(unavailable())
    }

    async fn delete_by_id(&self, _: &str) -> Result<(), RepositoryError> {
        Err(unavailable())
    }

    async fn find_by_title_pattern(&self, _: &str) -> Result<Vec<Book>, RepositoryError> {
        Err(unavailable())
    }
}

fn app_with(
    verbosity: ErrorVerbosity,
    policy: ValidationPolicy,
    books: impl BookRepository + 'static,
) -> Router {
    route::app(ApiState::new(verbosity, policy, Box::new(books)))
}

fn app() -> Router {
    app_with(
        ErrorVerbosity::Full,
        ValidationPolicy::Lenient,
        InMemoryBookRepository::new(),
    )
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);

    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let body = match bytes.is_empty() {
        true => Value::Null,
        false => serde_json::from_slice(&bytes).unwrap(),
    };

    (status, body)
}

async fn create(app: &Router, book: Value) -> Value {
    let (status, created) = send(app, Method::POST, "/books", Some(book)).await;
    assert_eq!(status, StatusCode::CREATED);

    created
}

fn id_of(book: &Value) -> &str {
    book["id"].as_str().expect("book has no id")
}

#[tokio::test]
async fn health_check_reports_running() {
    let (status, body) = send(&app(), Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "message": "Server is running successfully.",
            "activeStatus": true,
            "error": false,
        })
    );
}

#[tokio::test]
async fn book_lifecycle() {
    let app = app();

    let created = create(
        &app,
        json!({ "title": "Dune", "author": "Herbert", "publisherYear": 1965 }),
    )
    .await;
    let id = id_of(&created).to_string();
    assert!(!id.is_empty());
    assert_eq!(created["title"], "Dune");
    assert_eq!(created["author"], "Herbert");
    assert_eq!(created["publisherYear"], 1965);

    let (status, fetched) = send(&app, Method::GET, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/books/{id}"),
        Some(json!({ "publisherYear": 1966 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["publisherYear"], 1966);
    assert_eq!(updated["title"], "Dune");
    assert_eq!(updated["author"], "Herbert");

    let (status, deleted) = send(&app, Method::DELETE, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({ "message": "Book is deleted successfully" }));

    let (status, missing) = send(&app, Method::GET, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["message"], "Book not found");
}

#[tokio::test]
async fn listing_returns_every_created_book() {
    let app = app();

    let mut created = Vec::new();
    for title in ["Dune", "Emma", "Ulysses"] {
        created.push(create(&app, json!({ "title": title })).await);
    }

    let (status, listed) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);

    let listed = listed.as_array().unwrap();
    assert!(listed.len() >= created.len());
    for book in &created {
        assert!(listed.contains(book));
    }
}

#[tokio::test]
async fn listing_an_empty_store_is_an_empty_array() {
    let (status, listed) = send(&app(), Method::GET, "/books", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn malformed_and_unknown_ids_are_not_found() {
    let app = app();

    for uri in ["/books/not-an-id", "/books/65f1c0a2b3d4e5f601234567"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Book not found");
        assert!(body["error"].is_string());
    }

    let (status, _) = send(
        &app,
        Method::PUT,
        "/books/not-an-id",
        Some(json!({ "title": "Dune" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_twice_is_not_found() {
    let app = app();
    let created = create(&app, json!({ "title": "Dune" })).await;
    let uri = format!("/books/{}", id_of(&created));

    let (first, _) = send(&app, Method::DELETE, &uri, None).await;
    let (second, body) = send(&app, Method::DELETE, &uri, None).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Book not found");
}

#[tokio::test]
async fn empty_update_returns_the_book_unchanged() {
    let app = app();
    let created = create(&app, json!({ "title": "Dune", "author": "Herbert" })).await;

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id_of(&created)),
        Some(json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated, created);
}

#[tokio::test]
async fn search_matches_title_substrings_ignoring_case() {
    let app = app();
    let departure = create(&app, json!({ "title": "Departure" })).await;
    create(&app, json!({ "title": "Dune" })).await;

    let (status, found) = send(&app, Method::GET, "/search?query=part", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, json!([departure]));

    let (status, found) = send(&app, Method::GET, "/search?query=PART", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, json!([departure]));

    let (status, found) = send(&app, Method::GET, "/search?query=zebra", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, json!([]));
}

#[tokio::test]
async fn search_treats_the_query_as_literal_text() {
    let app = app();
    create(&app, json!({ "title": "Dune" })).await;
    let question = create(&app, json!({ "title": "Who? (Revised)" })).await;

    let (status, found) = send(&app, Method::GET, "/search?query=.%2A", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, json!([]));

    let (status, found) = send(&app, Method::GET, "/search?query=%3F%20%28", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, json!([question]));
}

#[tokio::test]
async fn search_without_query_is_bad_request() {
    let app = app();
    create(&app, json!({ "title": "Dune" })).await;

    for uri in ["/search", "/search?query=", "/search?other=Dune"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Search query is required" }));
    }
}

#[tokio::test]
async fn storage_failures_are_internal_server_errors() {
    let app = app_with(
        ErrorVerbosity::Full,
        ValidationPolicy::Lenient,
        UnavailableBookRepository,
    );
    let id = "65f1c0a2b3d4e5f601234567";

    let cases = [
        (Method::POST, "/books".to_string(), Some(json!({})), "Failed to create book"),
        (Method::GET, "/books".to_string(), None, "Failed to fetch books"),
        (Method::GET, format!("/books/{id}"), None, "Failed to fetch book"),
        (Method::PUT, format!("/books/{id}"), Some(json!({})), "Failed to update book"),
        (Method::DELETE, format!("/books/{id}"), None, "Failed to delete book"),
        (Method::GET, "/search?query=Dune".to_string(), None, "Search failed"),
    ];

    for (method, uri, body, message) in cases {
        let (status, body) = send(&app, method, &uri, body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body, json!({ "message": message, "error": "database is down" }));
    }
}

#[tokio::test]
async fn message_verbosity_hides_the_underlying_error() {
    let app = app_with(
        ErrorVerbosity::Message,
        ValidationPolicy::Lenient,
        UnavailableBookRepository,
    );

    let (status, body) = send(&app, Method::GET, "/books", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Failed to fetch books" }));
}

#[tokio::test]
async fn status_code_verbosity_sends_no_body() {
    let app = app_with(
        ErrorVerbosity::StatusCode,
        ValidationPolicy::Lenient,
        InMemoryBookRepository::new(),
    );

    let (status, body) = send(&app, Method::GET, "/books/not-an-id", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn lenient_policy_accepts_any_fields() {
    let app = app();

    let created = create(&app, json!({ "publisherYear": 123456 })).await;

    assert!(created.get("title").is_none());
    assert_eq!(created["publisherYear"], 123456);
}

#[tokio::test]
async fn publisher_year_accepts_any_number() {
    let app = app();

    let whole = create(&app, json!({ "title": "Dune", "publisherYear": 1965.0 })).await;
    assert_eq!(whole["publisherYear"], json!(1965));

    let fractional = create(&app, json!({ "title": "Dune", "publisherYear": 1965.5 })).await;
    assert_eq!(fractional["publisherYear"], json!(1965.5));

    let (status, fetched) = send(
        &app,
        Method::GET,
        &format!("/books/{}", id_of(&fractional)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["publisherYear"], json!(1965.5));
}

#[tokio::test]
async fn strict_policy_rejects_incomplete_books() {
    let app = app_with(
        ErrorVerbosity::Full,
        ValidationPolicy::Strict,
        InMemoryBookRepository::new(),
    );

    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "author": "Herbert" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid book fields");
    assert!(body["error"].as_str().unwrap().contains("title"));

    let created = create(&app, json!({ "title": "Dune", "author": "Herbert" })).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id_of(&created)),
        Some(json!({ "publisherYear": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Failed to parse request body");
    assert!(body["error"].is_string());

    let expected_schema = body["expected_schema"].as_str().unwrap();
    assert!(expected_schema.contains("publisherYear"));
    assert!(!expected_schema.contains("required"));
}

#[tokio::test]
async fn unknown_routes_and_methods_are_rejected() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/authors", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "message": "The requested resource was not found" })
    );

    let (status, body) = send(&app, Method::PATCH, "/books", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "message": "Method not allowed" }));
}

#[tokio::test]
async fn cors_allows_only_the_configured_origin() {
    let origin = "https://books.example.com";

    for (allowed_origin, expected) in [
        (Some(format!("{origin}/")), Some(origin)),
        (None, None),
    ] {
        let config = ServerConfig {
            allowed_origin,
            ..Default::default()
        };
        let state = ApiState::new(
            config.error_verbosity,
            config.validation_policy,
            Box::new(InMemoryBookRepository::new()),
        );
        let app = server::router(state, &config).unwrap();

        let request = Request::builder()
            .uri("/")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let allowed = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|value| value.to_str().unwrap());
        assert_eq!(allowed, expected);
    }
}

#[tokio::test]
async fn cors_preflight_lists_only_served_methods() {
    let origin = "https://books.example.com";
    let config = ServerConfig {
        allowed_origin: Some(origin.to_string()),
        ..Default::default()
    };
    let state = ApiState::new(
        config.error_verbosity,
        config.validation_policy,
        Box::new(InMemoryBookRepository::new()),
    );
    let app = server::router(state, &config).unwrap();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/books")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let methods = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap();
    for method in ["GET", "PUT", "POST", "DELETE"] {
        assert!(methods.contains(method), "{method} missing from {methods}");
    }
    assert!(!methods.contains("PATCH"));
}

#[tokio::test]
async fn unreachable_database_stops_startup_before_binding() {
    // Holding the port makes a bind attempt fail with a different error.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    let config = ServerConfig {
        host: address.ip(),
        port: address.port(),
        storage: StorageConfig::Mongo(MongoConfig::from_uri(
            "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200".to_string(),
        )),
        ..Default::default()
    };

    let err = Server::new(config).run().await.unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("Failed to connect to the database"));
    assert!(!message.contains("Bind failed"));
}
