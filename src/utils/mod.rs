//! Utility functions and helpers.

pub mod http;
pub mod url;

pub use self::url::{is_absolute_http, normalize_link};
