//! Error taxonomy for bot runs
//!
//! None of these are returned from `WebBot::execute`; they are rendered into
//! the bot's `last_error` and trace log so a run always processes every target.

use thiserror::Error;

use crate::infrastructure::storage::StorageError;

#[derive(Error, Debug)]
pub enum BotError {
    /// Bot constructed without any targets
    #[error("Invalid number of URLs (zero URLs)")]
    NoTargets,

    /// One target had an empty URL and was skipped
    #[error("Invalid URL detected (empty URL with ID \"{id}\")")]
    EmptyUrl { id: String },

    /// Transport failure for one target, carried on its document
    #[error("Fetch failed for \"{url}\": {reason}")]
    Fetch { url: String, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
