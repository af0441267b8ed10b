//! Common types used across the application.

pub mod codes;
pub mod document;

pub use codes::{codes_equivalent, normalize_code};
pub use document::Document;
