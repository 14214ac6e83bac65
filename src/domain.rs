//! Domain module - value objects with no I/O
//!
//! Responses, documents and the delimiter-based extractor.

pub mod response;
pub mod document;
pub mod extractor;

pub use response::{HttpResponse, ResponseStatus, status_message};
pub use document::{Document, FieldMatch};
pub use extractor::{find_between, find_between_raw};
