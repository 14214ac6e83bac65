//! WebBot - sequential batch page fetcher
//!
//! Fetches a fixed set of pages over HTTP, wraps each response in a typed
//! `HttpResponse`/`Document`, and pulls fields out of the bodies with literal
//! start/end markers. Extracted values can be written to a data directory.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;

// Re-export the types most callers need
pub use application::{BotError, RunState, RunSummary, WebBot};
pub use domain::{Document, FieldMatch, HttpResponse, ResponseStatus};
pub use infrastructure::{BotConfig, FileStore, HttpClient, PageFetcher, StorageError};
