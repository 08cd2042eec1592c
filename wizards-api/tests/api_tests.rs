//! Integration tests for the catalog endpoints
//!
//! Schools, departments, courses and professors: creation, lookups, and the
//! error statuses each one promises.

mod helpers;

use axum::http::StatusCode;
use helpers::{review_body, seed_catalog, TestServer};
use serde_json::json;

async fn seeded() -> TestServer {
    let server = TestServer::start().await;
    seed_catalog(&server).await;
    server
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "wizards-api");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime_seconds"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_duplicate_school_conflicts() {
    let server = TestServer::start().await;
    let school = json!({"name": "Cal Poly", "city": "San Luis Obispo", "state": "CA", "country": "USA"});

    let (status, body) = server.post("/schools", school.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "School created successfully");

    let (status, body) = server.post("/schools", school).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    // Same name in another state is a different school
    server
        .create(
            "/schools",
            json!({"name": "Cal Poly", "city": "Pomona", "state": "NV", "country": "USA"}),
        )
        .await;
}

#[tokio::test]
async fn test_blank_school_field_rejected() {
    let server = TestServer::start().await;

    let (status, body) = server
        .post("/schools", json!({"name": "  ", "city": "X", "state": "CA", "country": "USA"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_department_requires_existing_school() {
    let server = TestServer::start().await;

    let (status, body) = server
        .post("/departments", json!({"name": "Physics", "abbrev": "PHYS", "school_id": 7}))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_department_conflicts() {
    let server = seeded().await;

    let (status, _) = server
        .post("/departments", json!({"name": "Computing", "abbrev": "csc", "school_id": 1}))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_departments_paginates() {
    let server = seeded().await;
    server
        .create("/departments", json!({"name": "Mathematics", "abbrev": "MATH", "school_id": 1}))
        .await;

    let (status, page) = server.get("/departments?school_id=1&limit=1&offset=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["departments"].as_array().unwrap().len(), 1);
    assert_eq!(page["departments"][0]["abbrev"], "MATH");

    let (status, page) = server.get("/departments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);

    let (status, _) = server.get("/departments?school_id=99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_department_statistics() {
    let server = seeded().await;
    server
        .create("/reviews", review_body("CSC101", "Prof. Smith", 2, 4, 6, &["fun"]))
        .await;
    server
        .create("/reviews", review_body("CSC202", "Prof. Jones", 4, 3, 10, &["fun", "hard"]))
        .await;

    let (status, stats) = server.get("/departments/csc/statistics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["department"]["abbrev"], "CSC");
    assert_eq!(stats["course_count"], 3);
    assert_eq!(stats["professor_count"], 2);
    assert_eq!(stats["total_reviews"], 2);
    // CSC365 has no reviews and is left out of the means
    assert_eq!(stats["avg_rating"], 3.5);
    assert_eq!(stats["avg_workload"], 8.0);
    assert_eq!(stats["top_tags"][0], json!({"name": "fun", "count": 2}));

    let (status, _) = server.get("/departments/EE/statistics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_department_abbrev_shared_across_schools() {
    let server = seeded().await;
    let other = server
        .create(
            "/schools",
            json!({"name": "State U", "city": "Fresno", "state": "CA", "country": "USA"}),
        )
        .await;
    server
        .create("/departments", json!({"name": "Computer Science", "abbrev": "CSC", "school_id": other}))
        .await;

    let (status, _) = server.get("/departments/CSC/statistics").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, stats) = server
        .get(&format!("/departments/CSC/statistics?school_id={}", other))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["course_count"], 0);
}

#[tokio::test]
async fn test_create_course_errors() {
    let server = seeded().await;

    let (status, _) = server
        .post("/courses", json!({"course_code": "CSC-365", "name": "Databases", "department": "CSC"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .post("/courses", json!({"course_code": "EE101", "name": "Circuits", "department": "EE"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server
        .post("/courses", json!({"course_code": "csc 365", "name": "Databases", "department": "CSC"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_course_with_professors() {
    let server = seeded().await;

    let (status, course) = server.get("/courses/csc202").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["course_code"], "CSC202");
    assert_eq!(course["department"], "CSC");
    let names: Vec<&str> = course["professors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Prof. Jones", "Prof. Smith"]);

    let (status, _) = server.get("/courses/CSC999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.get("/courses/not-a-code").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_course_professors() {
    let server = seeded().await;

    let (status, professors) = server.get("/courses/CSC101/professors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(professors.as_array().unwrap().len(), 1);
    assert_eq!(professors[0]["name"], "Prof. Smith");

    let (status, professors) = server.get("/courses/CSC365/professors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(professors, json!([]));
}

#[tokio::test]
async fn test_list_courses_sorted() {
    let server = seeded().await;
    server
        .create("/reviews", review_body("CSC101", "Prof. Smith", 2, 2, 20, &[]))
        .await;
    server
        .create("/reviews", review_body("CSC202", "Prof. Jones", 2, 5, 5, &[]))
        .await;

    let (status, courses) = server.get("/courses?sort_by=rating&order=desc").await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = courses
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["course_code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["CSC202", "CSC101", "CSC365"]);

    // Default: workload, highest first
    let (_, courses) = server.get("/courses?department=csc").await;
    assert_eq!(courses[0]["course_code"], "CSC101");
    assert_eq!(courses[0]["avg_workload"], 20.0);
    assert_eq!(courses[1]["professors"].as_array().unwrap().len(), 2);

    let (_, courses) = server.get("/courses?department=MATH").await;
    assert_eq!(courses, json!([]));
}

#[tokio::test]
async fn test_list_courses_rejects_bad_sort() {
    let server = seeded().await;

    let (status, _) = server.get("/courses?sort_by=difficulty").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server.get("/courses?order=sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_professor_errors() {
    let server = seeded().await;

    let (status, _) = server
        .post("/professors", json!({"name": "Prof. Smith", "department": "CSC"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = server
        .post("/professors", json!({"name": "Prof. Volt", "department": "EE"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_professor_details() {
    let server = seeded().await;
    server
        .create("/reviews", review_body("CSC101", "Prof. Smith", 2, 4, 6, &["fun", "fair"]))
        .await;

    let (status, prof) = server.get("/professors/Prof.%20Smith").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(prof["name"], "Prof. Smith");
    assert_eq!(prof["department"], "CSC");
    assert_eq!(prof["courses"][0]["course_code"], "CSC101");
    assert_eq!(prof["reviews"][0]["course_code"], "CSC101");
    assert_eq!(prof["reviews"][0]["term"], "Spring 2025");
    assert_eq!(prof["reviews"][0]["tags"], json!(["fair", "fun"]));

    let (status, _) = server.get("/professors/Prof.%20Nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_attach_courses_is_all_or_nothing() {
    let server = seeded().await;

    let (status, _) = server
        .post("/professors/Prof.%20Jones/courses", json!(["CSC365", "CSC999"]))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, professors) = server.get("/courses/CSC365/professors").await;
    assert_eq!(professors, json!([]));

    let (status, _) = server
        .post("/professors/Prof.%20Nobody/courses", json!(["CSC365"]))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.post("/professors/Prof.%20Jones/courses", json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
