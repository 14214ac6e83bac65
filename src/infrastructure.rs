//! Infrastructure layer for HTTP transport, storage, configuration and logging

pub mod http_client;
pub mod storage;
pub mod config;  // Configuration values and file persistence
pub mod logging;  // Logging infrastructure

// Re-export commonly used items
pub use http_client::{HttpClient, HttpClientConfig, PageFetcher, effective_timeout, parse_header_lines};
pub use storage::{FileStore, StorageError, url_filename};
pub use config::{AppConfig, BotConfig, ConfigManager, LoggingConfig};
pub use logging::init_logging_with_config;
