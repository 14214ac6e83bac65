//! Batch fetch orchestrator
//!
//! `WebBot` takes a list of `(identifier, url)` targets and fetches each
//! distinct normalized URL exactly once, one request at a time, in target
//! order. Failures are recorded in the bot's state and trace log; a run
//! always visits every target.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::errors::BotError;
use crate::domain::document::Document;
use crate::infrastructure::config::BotConfig;
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig, PageFetcher};
use crate::infrastructure::storage::FileStore;

const HTTP_SCHEME: &str = "http://";
const HTTPS_SCHEME: &str = "https://";

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    Running,
    Completed,
}

/// Counters and outcome of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_distinct: usize,
    pub total_succeeded: usize,
    pub total_failed: usize,
    pub success: bool,
}

/// Ensure a URL carries a scheme.
///
/// URLs already starting with `http://` or `https://` (any case) are only
/// trimmed; everything else gets `https://` when `force_https` is set and
/// `http://` otherwise.
pub fn format_url(url: &str, force_https: bool) -> String {
    let url = url.trim();
    if has_http_scheme(url) {
        return url.to_string();
    }

    let scheme = if force_https { HTTPS_SCHEME } else { HTTP_SCHEME };
    format!("{scheme}{url}")
}

fn has_http_scheme(url: &str) -> bool {
    [HTTP_SCHEME, HTTPS_SCHEME].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Deduplication key for a normalized URL (blake3, hex encoded)
pub fn fingerprint(normalized_url: &str) -> String {
    blake3::hash(normalized_url.as_bytes()).to_hex().to_string()
}

/// Sequential batch fetcher
pub struct WebBot<F = HttpClient> {
    run_id: Uuid,
    config: BotConfig,
    fetcher: F,
    targets: Vec<(String, String)>,
    /// Fingerprint and document, in first-seen order
    documents: Vec<(String, Document)>,
    document_index: HashMap<String, usize>,
    total_distinct: usize,
    total_succeeded: usize,
    total_failed: usize,
    log: Vec<String>,
    last_error: Option<String>,
    success: bool,
    state: RunState,
}

impl WebBot<HttpClient> {
    /// Bot backed by a reqwest client using the configured user agent.
    ///
    /// Zero targets is not an error here: it is recorded in `last_error`.
    pub fn new<I, K, V>(targets: I, config: BotConfig) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let client = HttpClient::with_config(HttpClientConfig {
            user_agent: config.user_agent.clone(),
            ..HttpClientConfig::default()
        })?;

        Ok(Self::with_fetcher(targets, config, client))
    }
}

impl<F: PageFetcher> WebBot<F> {
    pub fn with_fetcher<I, K, V>(targets: I, config: BotConfig, fetcher: F) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        const OPERATION: &str = "WebBot::new";

        let targets: Vec<(String, String)> = targets
            .into_iter()
            .map(|(id, url)| (id.into(), url.into()))
            .collect();

        let mut bot = Self {
            run_id: Uuid::new_v4(),
            config,
            fetcher,
            targets,
            documents: Vec::new(),
            document_index: HashMap::new(),
            total_distinct: 0,
            total_succeeded: 0,
            total_failed: 0,
            log: Vec::new(),
            last_error: None,
            success: false,
            state: RunState::Idle,
        };

        if bot.targets.is_empty() {
            bot.record_error(&BotError::NoTargets, OPERATION);
        } else {
            bot.log(format!("{} URL(s) initialized", bot.targets.len()), OPERATION);
        }

        bot
    }

    /// Fetch every target once.
    ///
    /// Calling this again after completion is a no-op that returns the
    /// cached summary.
    pub async fn execute(&mut self) -> RunSummary {
        const OPERATION: &str = "WebBot::execute";

        if self.state == RunState::Completed {
            self.log("Run already completed, returning cached results", OPERATION);
            return self.summary();
        }

        self.state = RunState::Running;
        self.log("Executing bot URL fetches", OPERATION);

        let targets = self.targets.clone();
        for (i, (id, raw_url)) in targets.into_iter().enumerate() {
            if i > 0 {
                self.pause_between_fetches(OPERATION).await;
            }

            if raw_url.trim().is_empty() {
                self.record_error(&BotError::EmptyUrl { id }, OPERATION);
                continue;
            }

            let url = format_url(&raw_url, self.config.force_https);
            let key = fingerprint(&url);

            if self.document_index.contains_key(&key) {
                debug!(run_id = %self.run_id, "Skipping {} ({}): already fetched this run", id, url);
                continue;
            }

            self.total_distinct += 1;

            let response = self
                .fetcher
                .get(&url, self.config.default_timeout_seconds)
                .await;

            if let Some(reason) = response.failure_reason() {
                let error = BotError::Fetch {
                    url: url.clone(),
                    reason: reason.to_string(),
                };
                warn!(run_id = %self.run_id, "{}", error);
            }

            let document =
                Document::new(response, id).with_raw_values(self.config.include_raw_field_values);

            if document.success() {
                self.total_succeeded += 1;
            } else {
                self.total_failed += 1;
            }

            self.document_index.insert(key.clone(), self.documents.len());
            self.documents.push((key, document));
        }

        self.log(format!("{} total documents", self.total_distinct), OPERATION);
        self.log(
            format!("{} documents fetched successfully", self.total_succeeded),
            OPERATION,
        );
        self.log(
            format!("{} documents failed to fetch", self.total_failed),
            OPERATION,
        );

        self.success = self.last_error.is_none();
        self.state = RunState::Completed;

        self.summary()
    }

    /// Write extracted data through the storage sink.
    ///
    /// A failure is also recorded as the bot's `last_error`.
    pub async fn store(&mut self, filename: &str, data: &[u8]) -> Result<PathBuf, BotError> {
        let store = FileStore::new(&self.config.storage_directory);

        match store.store(filename, data).await {
            Ok(path) => Ok(path),
            Err(e) => {
                let error = BotError::from(e);
                self.record_error(&error, "WebBot::store");
                Err(error)
            }
        }
    }

    async fn pause_between_fetches(&mut self, operation: &str) {
        let delay = self.config.delay_between_fetches_seconds;
        if delay.is_nan() || delay <= 0.0 {
            return;
        }

        let Ok(duration) = Duration::try_from_secs_f64(delay) else {
            warn!("Ignoring unusable fetch delay {}", delay);
            return;
        };

        self.log(format!("Waiting {delay}s before next fetch"), operation);
        tokio::time::sleep(duration).await;
    }

    fn log(&mut self, message: impl Into<String>, operation: &str) {
        let message = message.into();
        info!(run_id = %self.run_id, "{} ({})", message, operation);
        self.log.push(format!("{message} ({operation})"));
    }

    fn record_error(&mut self, error: &BotError, operation: &str) {
        let message = error.to_string();
        warn!(run_id = %self.run_id, "{} ({})", message, operation);
        self.log.push(format!("{message} ({operation})"));
        self.last_error = Some(message);
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total_distinct: self.total_distinct,
            total_succeeded: self.total_succeeded,
            total_failed: self.total_failed,
            success: self.success,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn targets(&self) -> &[(String, String)] {
        &self.targets
    }

    /// Documents keyed by fingerprint, in first-seen order
    pub fn documents(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.documents
            .iter()
            .map(|(key, document)| (key.as_str(), document))
    }

    pub fn document(&self, fingerprint: &str) -> Option<&Document> {
        self.document_index
            .get(fingerprint)
            .map(|&index| &self.documents[index].1)
    }

    pub fn document_by_id(&self, id: &str) -> Option<&Document> {
        self.documents
            .iter()
            .map(|(_, document)| document)
            .find(|document| document.id() == id)
    }

    pub fn total_distinct(&self) -> usize {
        self.total_distinct
    }

    pub fn total_succeeded(&self) -> usize {
        self.total_succeeded
    }

    pub fn total_failed(&self) -> usize {
        self.total_failed
    }

    /// Trace log entries, oldest first
    pub fn log_entries(&self) -> &[String] {
        &self.log
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// `true` once a run has completed without any recorded error
    pub fn success(&self) -> bool {
        self.success
    }
}
