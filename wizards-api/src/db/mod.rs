//! Store queries behind the HTTP handlers
//!
//! Functions that may run inside a caller's transaction take a
//! `&mut SqliteConnection`; the rest take the pool.

pub mod courses;
pub mod departments;
pub mod professors;
pub mod reviews;
pub mod schools;
pub mod tags;

use wizards_common::Error;

/// Report a unique-constraint failure as a Conflict carrying `message`
pub(crate) fn conflict_on_duplicate(err: sqlx::Error, message: impl FnOnce() -> String) -> Error {
    let err = Error::from(err);
    if err.is_unique_violation() {
        Error::Conflict(message())
    } else {
        err
    }
}
