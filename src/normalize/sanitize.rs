//! Text cleanup for receipt lines and `#tag` handling for todo notes.
//!
//! Every text line a normalizer emits goes through [`sanitize_body`] or
//! [`sanitize_line`], so no line carries control characters (other than
//! `\n` in bodies) or exceeds [`BODY_LIMIT`] plus the marker.

/// Maximum text line length in characters before truncation.
pub const BODY_LIMIT: usize = 500;

/// Appended when a line is cut at [`BODY_LIMIT`].
pub const TRUNCATION_MARKER: &str = "...(생략됨)";

/// Full body cleanup: markup, control characters, blank-line runs, trailing
/// newlines, then the length cap.
pub fn sanitize_body(raw: &str) -> String {
    truncate(&collapse_newlines(&clean(raw)), BODY_LIMIT)
}

/// Cleanup for a single-line field: markup and control characters
/// stripped, newlines folded into spaces, outer whitespace trimmed. No cap.
pub fn single_line(raw: &str) -> String {
    clean(raw)
        .split('\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A complete label line: [`single_line`] plus the length cap.
pub fn sanitize_line(raw: &str) -> String {
    truncate(&single_line(raw), BODY_LIMIT)
}

/// Strip markup and control characters (newlines survive, CRLF becomes LF).
pub fn clean(raw: &str) -> String {
    strip_control(&strip_markup(raw))
}

/// Remove everything between `<` and the next `>`. A `<` with no closing
/// `>` is kept as text.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn strip_control(text: &str) -> String {
    text.chars().filter(|&c| c == '\n' || !c.is_control()).collect()
}

/// Collapse runs of three or more newlines to two and drop trailing newlines.
pub fn collapse_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0;

    for ch in text.chars() {
        if ch == '\n' {
            run += 1;
            if run > 2 {
                continue;
            }
        } else {
            run = 0;
        }
        out.push(ch);
    }

    out.truncate(out.trim_end_matches('\n').len());
    out
}

/// Cap `text` at `limit` characters, appending [`TRUNCATION_MARKER`] when cut.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ('가'..='힣').contains(&c)
}

/// Byte ranges of every `#tag` token: `#` followed by one or more ASCII
/// alphanumerics or Hangul syllables.
fn tag_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch != '#' {
            continue;
        }
        let mut end = start + 1;
        while let Some(&(idx, c)) = chars.peek() {
            if !is_tag_char(c) {
                break;
            }
            end = idx + c.len_utf8();
            chars.next();
        }
        if end > start + 1 {
            spans.push((start, end));
        }
    }

    spans
}

/// All `#tag` tokens in order of appearance, duplicates kept.
pub fn extract_tags(text: &str) -> Vec<String> {
    tag_spans(text)
        .into_iter()
        .map(|(start, end)| text[start..end].to_string())
        .collect()
}

/// `text` with every `#tag` token removed.
pub fn remove_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in tag_spans(text) {
        out.push_str(&text[last..start]);
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("<p>Crash</p>"), "Crash");
        assert_eq!(strip_markup("a <b>bold</b> move"), "a bold move");
        assert_eq!(strip_markup("1 < 2"), "1 < 2");
        assert_eq!(strip_markup("<img\nsrc=x>after"), "after");
    }

    #[test]
    fn test_control_characters_removed() {
        assert_eq!(clean("a\tb\r\nc\u{7}"), "ab\nc");
    }

    #[test]
    fn test_collapse_newlines() {
        assert_eq!(collapse_newlines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_newlines("a\n\nb"), "a\n\nb");
        assert_eq!(collapse_newlines("a\nb\n\n"), "a\nb");
    }

    #[test]
    fn test_sanitize_body() {
        assert_eq!(sanitize_body("<p>Crash</p>\r\n\r\n\r\n<p>again</p>\n"), "Crash\n\nagain");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("  a\n\n b <i>c</i>\r\n"), "a b c");
        assert_eq!(single_line("x\u{1d}VAy\0"), "xVAy");
        assert_eq!(single_line("\u{1b}\n\t"), "");
    }

    #[test]
    fn test_sanitize_line_caps_length() {
        let line = sanitize_line(&format!("제  목: {}", "t".repeat(900)));
        assert!(line.ends_with(TRUNCATION_MARKER));
        assert_eq!(line.chars().count(), BODY_LIMIT + TRUNCATION_MARKER.chars().count());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 3), "abc");
        assert_eq!(truncate("abcd", 3), "abc...(생략됨)");
        assert_eq!(truncate("가나다라", 2), "가나...(생략됨)");
    }

    #[test]
    fn test_body_limit_counts_characters() {
        let body = "가".repeat(BODY_LIMIT);
        assert_eq!(sanitize_body(&body), body);

        let long = "가".repeat(BODY_LIMIT + 1);
        let out = sanitize_body(&long);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(out.chars().count(), BODY_LIMIT + TRUNCATION_MARKER.chars().count());
    }

    #[test]
    fn test_extract_tags() {
        assert_eq!(
            extract_tags("#project1 buy milk #urgent"),
            vec!["#project1", "#urgent"]
        );
        assert_eq!(extract_tags("#한글태그 and #a #a"), vec!["#한글태그", "#a", "#a"]);
        assert!(extract_tags("no tags # here ##").is_empty());
    }

    #[test]
    fn test_remove_tags() {
        assert_eq!(remove_tags("#project1 buy milk #urgent").trim(), "buy milk");
        assert_eq!(remove_tags("##a!"), "#!");
    }

    proptest! {
        #[test]
        fn prop_truncation_bound(s in "\\PC{0,800}") {
            let out = sanitize_body(&s);
            prop_assert!(out.chars().count() <= BODY_LIMIT + TRUNCATION_MARKER.chars().count());
        }

        #[test]
        fn prop_sanitized_line_is_one_clean_line(s in "[\\x00-\\x7f가-힣]{0,900}") {
            let out = sanitize_line(&s);
            prop_assert!(out.chars().count() <= BODY_LIMIT + TRUNCATION_MARKER.chars().count());
            prop_assert!(!out.chars().any(char::is_control));
        }

        #[test]
        fn prop_short_clean_text_passes_through(s in "[a-z가-힣 ]{0,500}") {
            prop_assert_eq!(sanitize_body(&s), s);
        }

        #[test]
        fn prop_tag_removal_is_idempotent(s in "[#a-z가-힣 !\n]{0,200}") {
            let stripped = remove_tags(&s);
            prop_assert!(extract_tags(&stripped).is_empty());
        }
    }
}
