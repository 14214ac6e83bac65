//! Application layer - run orchestration

pub mod web_bot;
pub mod errors;

pub use web_bot::{RunState, RunSummary, WebBot, fingerprint, format_url};
pub use errors::BotError;
