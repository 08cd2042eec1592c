//! # Schedule Wizards Common Library
//!
//! Shared code for the Schedule Wizards course review service:
//! - Database initialization and schema
//! - Persisted row models
//! - Configuration loading
//! - Aggregate statistics engine (course and professor averages)

pub mod config;
pub mod db;
pub mod error;
pub mod stats;

pub use error::{Error, Result};
