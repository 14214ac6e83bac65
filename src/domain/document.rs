//! Fetched document
//!
//! Pairs one `HttpResponse` with the caller's identifier and offers
//! delimiter-based field extraction over the body.

use serde::Serialize;

use crate::domain::extractor;
use crate::domain::response::HttpResponse;

/// Value extracted from a document body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    /// Text between the markers
    pub value: String,
    /// Matched span including the markers, only when raw values are enabled
    pub raw: Option<String>,
}

/// Fetch result for one distinct target
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    id: String,
    url: String,
    success: bool,
    response: HttpResponse,
    include_raw_values: bool,
}

impl Document {
    pub fn new(response: HttpResponse, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: response.url().to_string(),
            success: response.success(),
            response,
            include_raw_values: false,
        }
    }

    /// Also return the raw matched span from [`Document::find`]
    pub fn with_raw_values(mut self, include: bool) -> Self {
        self.include_raw_values = include;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    /// Text between the first `start` marker and the next `end` marker
    pub fn find_between(&self, start: &str, end: &str) -> Option<String> {
        let body = self.response.body_text();
        extractor::find_between(&body, start, end).map(str::to_string)
    }

    pub fn find(&self, start: &str, end: &str) -> Option<FieldMatch> {
        let body = self.response.body_text();
        let value = extractor::find_between(&body, start, end)?;
        let raw = if self.include_raw_values {
            extractor::find_between_raw(&body, start, end).map(str::to_string)
        } else {
            None
        };

        Some(FieldMatch {
            value: value.to_string(),
            raw,
        })
    }
}
