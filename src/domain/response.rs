//! HTTP response value object
//!
//! `HttpResponse` is the immutable result of one GET/HEAD request. A request
//! that never produced a status line is modelled as `ResponseStatus::Failed`
//! and reports status code `0`, so callers can keep checking `success()` /
//! `status_code()` without handling errors per target.

use serde::Serialize;

/// MIME type used when no usable `Content-Type` header was received
pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// Charset used when the `Content-Type` header carries no `charset` parameter
pub const DEFAULT_CHARSET: &str = "UTF-8";

const CONTENT_TYPE_PREFIX: &str = "content-type:";

/// Outcome of a request at the transport level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResponseStatus {
    /// A status line was received
    Delivered { code: u16 },
    /// Nothing usable came back (unreachable host, timeout, malformed response)
    Failed { reason: String },
}

impl ResponseStatus {
    /// Numeric status code, `0` when the request never completed
    pub fn code(&self) -> u16 {
        match self {
            Self::Delivered { code } => *code,
            Self::Failed { .. } => 0,
        }
    }
}

/// Human readable message for a status code.
///
/// Codes outside the table resolve to the entry for `0`.
pub fn status_message(code: u16) -> &'static str {
    match code {
        // info
        100 => "Continue",
        101 => "Switching Protocols",
        // success
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        // redirection
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        307 => "Temporary Redirect",
        // client error
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Requested Range Not Satisfiable",
        417 => "Expectation Failed",
        // server error
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        // internal (0) and everything unknown
        _ => "Initialization Error",
    }
}

/// Split a `Content-Type` value into MIME type and charset.
///
/// Accepts either the bare value (`text/html; charset=utf-8`) or the whole
/// header line (`Content-Type: text/html; charset=utf-8`). Missing parts come
/// back as `None`.
pub fn parse_content_type(value: &str) -> (Option<String>, Option<String>) {
    let value = value.trim();
    let value = match value.get(..CONTENT_TYPE_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(CONTENT_TYPE_PREFIX) => {
            &value[CONTENT_TYPE_PREFIX.len()..]
        }
        _ => value,
    };

    let mut parts = value.split(';');

    let mime = parts
        .next()
        .map(str::trim)
        .filter(|mime| !mime.is_empty())
        .map(str::to_string);

    let charset = parts.find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"').trim();
        (!value.is_empty()).then(|| value.to_string())
    });

    (mime, charset)
}

/// Parsed HTTP response. Read-only once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct HttpResponse {
    status: ResponseStatus,
    status_message: &'static str,
    mime_type: String,
    charset: String,
    raw_headers: Vec<String>,
    #[serde(skip)]
    body: Vec<u8>,
    url: String,
}

impl HttpResponse {
    /// Build a response from its raw parts.
    ///
    /// A status code of `0` means no status line was found and yields a
    /// `Failed` response. Construction never fails: an empty or unparsable
    /// `content_type` keeps the MIME type and charset defaults.
    pub fn new(
        status_code: u16,
        content_type: &str,
        body: Vec<u8>,
        raw_headers: Vec<String>,
        url: impl Into<String>,
    ) -> Self {
        let status = if status_code == 0 {
            ResponseStatus::Failed {
                reason: "no HTTP status line received".to_string(),
            }
        } else {
            ResponseStatus::Delivered { code: status_code }
        };

        let (mime, charset) = parse_content_type(content_type);

        Self {
            status_message: status_message(status.code()),
            status,
            mime_type: mime.unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            charset: charset.unwrap_or_else(|| DEFAULT_CHARSET.to_string()),
            raw_headers,
            body,
            url: url.into(),
        }
    }

    /// Response for a request that never completed
    pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failed {
                reason: reason.into(),
            },
            status_message: status_message(0),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            charset: DEFAULT_CHARSET.to_string(),
            raw_headers: Vec::new(),
            body: Vec::new(),
            url: url.into(),
        }
    }

    pub fn status(&self) -> &ResponseStatus {
        &self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.code()
    }

    pub fn status_message(&self) -> &'static str {
        self.status_message
    }

    /// `true` iff the status code is exactly 200
    pub fn success(&self) -> bool {
        self.status_code() == 200
    }

    /// Reason recorded for a request that never completed
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.status {
            ResponseStatus::Failed { reason } => Some(reason),
            ResponseStatus::Delivered { .. } => None,
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    pub fn raw_headers(&self) -> &[String] {
        &self.raw_headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "Initialization Error")]
    #[case(200, "OK")]
    #[case(206, "Partial Content")]
    #[case(307, "Temporary Redirect")]
    #[case(404, "Not Found")]
    #[case(417, "Expectation Failed")]
    #[case(505, "HTTP Version Not Supported")]
    fn test_status_message_table(#[case] code: u16, #[case] expected: &str) {
        assert_eq!(status_message(code), expected);
    }

    #[rstest]
    #[case(999)]
    #[case(306)]
    #[case(418)]
    #[case(102)]
    fn test_unknown_status_falls_back_to_initialization_error(#[case] code: u16) {
        assert_eq!(status_message(code), status_message(0));
    }

    #[test]
    fn test_success_derived_from_status_code() {
        let ok = HttpResponse::new(200, "", Vec::new(), Vec::new(), "http://a");
        let created = HttpResponse::new(201, "", Vec::new(), Vec::new(), "http://a");
        let missing = HttpResponse::new(404, "", Vec::new(), Vec::new(), "http://a");

        assert!(ok.success());
        assert!(!created.success());
        assert!(!missing.success());
        assert_eq!(missing.status_message(), "Not Found");
    }

    #[test]
    fn test_zero_status_is_failed() {
        let response = HttpResponse::new(0, "text/html", b"x".to_vec(), Vec::new(), "http://a");
        assert_eq!(response.status_code(), 0);
        assert!(!response.success());
        assert!(response.failure_reason().is_some());
        assert_eq!(response.status_message(), "Initialization Error");
    }

    #[test]
    fn test_failed_response_defaults() {
        let response = HttpResponse::failed("http://nowhere", "connection refused");
        assert_eq!(response.status_code(), 0);
        assert!(!response.success());
        assert!(response.body().is_empty());
        assert!(response.raw_headers().is_empty());
        assert_eq!(response.mime_type(), DEFAULT_MIME_TYPE);
        assert_eq!(response.charset(), DEFAULT_CHARSET);
        assert_eq!(response.failure_reason(), Some("connection refused"));
        assert_eq!(response.url(), "http://nowhere");
    }

    #[rstest]
    #[case("text/html; charset=ISO-8859-1", "text/html", "ISO-8859-1")]
    #[case("Content-Type: application/json;charset=utf-8", "application/json", "utf-8")]
    #[case("CONTENT-TYPE: text/xml", "text/xml", DEFAULT_CHARSET)]
    #[case("text/html; charset=\"koi8-r\"", "text/html", "koi8-r")]
    #[case("multipart/form-data; boundary=xyz", "multipart/form-data", DEFAULT_CHARSET)]
    #[case("", DEFAULT_MIME_TYPE, DEFAULT_CHARSET)]
    #[case(";;;", DEFAULT_MIME_TYPE, DEFAULT_CHARSET)]
    #[case("text/plain; charset=", "text/plain", DEFAULT_CHARSET)]
    fn test_content_type_parsing(#[case] header: &str, #[case] mime: &str, #[case] charset: &str) {
        let response = HttpResponse::new(200, header, Vec::new(), Vec::new(), "http://a");
        assert_eq!(response.mime_type(), mime);
        assert_eq!(response.charset(), charset);
    }

    #[test]
    fn test_body_text_is_lossy() {
        let response = HttpResponse::new(200, "", vec![b'h', b'i', 0xff], Vec::new(), "http://a");
        assert_eq!(response.body_text(), "hi\u{fffd}");
    }
}
