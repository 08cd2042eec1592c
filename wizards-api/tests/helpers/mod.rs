//! Test helper modules for wizards-api integration tests
//!
//! - TestServer: router over a private in-memory store
//! - seed_catalog: one school, one department, three courses, two professors

#![allow(dead_code)]

pub mod test_server;

pub use test_server::{review_body, seed_catalog, TestServer};
