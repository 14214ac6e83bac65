//! Delimiter-based text extraction
//!
//! No HTML parsing happens here: a field is whatever sits between the first
//! occurrence of a start marker and the next occurrence of an end marker.

/// Text strictly between `start` and the first `end` that follows it.
///
/// Returns `None` when either marker is empty or missing, or when `end`
/// only appears before `start`.
pub fn find_between<'a>(haystack: &'a str, start: &str, end: &str) -> Option<&'a str> {
    find_span(haystack, start, end).map(|span| &haystack[span.value_start..span.value_end])
}

/// Like [`find_between`] but returns the matched span including both markers.
pub fn find_between_raw<'a>(haystack: &'a str, start: &str, end: &str) -> Option<&'a str> {
    find_span(haystack, start, end).map(|span| &haystack[span.raw_start..span.raw_end])
}

struct Span {
    raw_start: usize,
    value_start: usize,
    value_end: usize,
    raw_end: usize,
}

fn find_span(haystack: &str, start: &str, end: &str) -> Option<Span> {
    if start.is_empty() || end.is_empty() {
        return None;
    }

    let raw_start = haystack.find(start)?;
    let value_start = raw_start + start.len();
    let value_end = value_start + haystack[value_start..].find(end)?;

    Some(Span {
        raw_start,
        value_start,
        value_end,
        raw_end: value_end + end.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("<title>Hi</title>", "<title>", "</title>", Some("Hi"))]
    #[case("<title></title>", "<title>", "</title>", Some(""))]
    #[case("a<b>1</b><b>2</b>", "<b>", "</b>", Some("1"))]
    #[case("</title>x<title>Hi</title>", "<title>", "</title>", Some("Hi"))]
    #[case("</title><title>Hi", "<title>", "</title>", None)]
    #[case("no markers here", "<title>", "</title>", None)]
    #[case("<title>Hi</title>", "", "</title>", None)]
    #[case("<title>Hi</title>", "<title>", "", None)]
    #[case("[[x]]", "[", "]", Some("[x"))]
    fn test_find_between(
        #[case] haystack: &str,
        #[case] start: &str,
        #[case] end: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(find_between(haystack, start, end), expected);
    }

    #[test]
    fn test_find_between_raw_includes_markers() {
        let html = "<head><h2>heading</h2></head>";
        assert_eq!(find_between_raw(html, "<h2>", "</h2>"), Some("<h2>heading</h2>"));
        assert_eq!(find_between_raw(html, "<h3>", "</h3>"), None);
    }

    #[test]
    fn test_multibyte_text() {
        let html = "<p>크롤링 데이터</p>";
        assert_eq!(find_between(html, "<p>", "</p>"), Some("크롤링 데이터"));
    }
}
