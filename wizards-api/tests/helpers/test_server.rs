//! Router wrapper for integration tests
//!
//! Each TestServer owns a fresh database (in memory unless a test supplies
//! its own pool), so tests never share state.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt;
use wizards_api::{build_router, AppState};
use wizards_common::db::init_in_memory;

#[derive(Clone)]
pub struct TestServer {
    router: Router,
    pub pool: SqlitePool,
}

impl TestServer {
    pub async fn start() -> Self {
        let pool = init_in_memory().await.expect("in-memory database");
        Self::with_pool(pool)
    }

    /// Serve an existing pool, e.g. a file-backed one with several connections
    pub fn with_pool(pool: SqlitePool) -> Self {
        let router = build_router(AppState::new(pool.clone()));
        Self { router, pool }
    }

    /// Send a request; non-JSON bodies come back as `Value::Null`
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    /// POST and insist on 201, returning the new id
    pub async fn create(&self, uri: &str, body: Value) -> i64 {
        let (status, value) = self.post(uri, body).await;
        assert_eq!(status, StatusCode::CREATED, "POST {} failed: {}", uri, value);
        value["id"].as_i64().expect("id in create response")
    }

    pub async fn review_count(&self) -> i64 {
        self.row_count("review").await
    }

    pub async fn row_count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

/// Cal Poly / CSC with CSC101, CSC202, CSC365.
/// Prof. Smith teaches CSC101 and CSC202; Prof. Jones teaches CSC202;
/// nobody teaches CSC365.
pub async fn seed_catalog(server: &TestServer) {
    let school_id = server
        .create(
            "/schools",
            json!({"name": "Cal Poly", "city": "San Luis Obispo", "state": "CA", "country": "USA"}),
        )
        .await;
    server
        .create(
            "/departments",
            json!({"name": "Computer Science", "abbrev": "CSC", "school_id": school_id}),
        )
        .await;

    for (code, name) in [
        ("CSC101", "Fundamentals of Computer Science"),
        ("CSC202", "Data Structures"),
        ("CSC365", "Introduction to Databases"),
    ] {
        server
            .create("/courses", json!({"course_code": code, "name": name, "department": "CSC"}))
            .await;
    }

    for name in ["Prof. Smith", "Prof. Jones"] {
        server
            .create("/professors", json!({"name": name, "department": "CSC"}))
            .await;
    }

    let (status, body) = server
        .post("/professors/Prof.%20Smith/courses", json!(["CSC101", "CSC202"]))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let (status, body) = server
        .post("/professors/Prof.%20Jones/courses", json!(["CSC202"]))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
}

/// A valid review body with the given scores
pub fn review_body(
    course_code: &str,
    professor: &str,
    difficulty: i64,
    rating: i64,
    workload: i64,
    tags: &[&str],
) -> Value {
    json!({
        "course_code": course_code,
        "professor_name": professor,
        "term": "Spring 2025",
        "difficulty_rating": difficulty,
        "overall_rating": rating,
        "workload_estimate": workload,
        "tags": tags,
        "comments": "Solid course with clear lectures and fair exams."
    })
}
