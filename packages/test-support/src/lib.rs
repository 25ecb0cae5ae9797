//! Test support utilities for the seeder crates.
//!
//! Unique test data via ULIDs, so rows written by one test are easy to tell
//! apart from rows written by another, plus a shared logging initializer.

use ulid::Ulid;

pub mod logging;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use test_support::unique_str;
///
/// let id1 = unique_str("student");
/// let id2 = unique_str("student");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("student-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique student name, e.g. `Jane Roe 01HF...`.
pub fn unique_student_name(given: &str) -> String {
    format!("{} Roe {}", given, Ulid::new())
}
