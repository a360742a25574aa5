//! The three extraction grammars as named, centrally compiled patterns.
//!
//! Keeping every strategy pattern in one place keeps the priority and
//! claim-marking semantics of the pipeline testable: anchor links shadow
//! direct URLs shadow free text, and all three agree on what a
//! timestamp-shaped substring is.

use std::sync::LazyLock;

use regex::Regex;

use super::Candidate;

/// Hyperlink whose target is a watch URL carrying a `t=` seconds parameter.
pub static ANCHOR_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href="([^"]*youtube\.com/watch\?[^"]*&t=(\d+)[^"]*)""#)
        .expect("ANCHOR_LINK regex")
});

/// Any complete anchor element, for stripping markup out of caption text.
pub static ANCHOR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a[^>]*>.*?</a>").expect("ANCHOR_TAG regex"));

/// Bare watch or short-link URL with a `t=` seconds parameter, outside
/// anchor markup.
pub static DIRECT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:https?://)?(?:www\.)?youtube\.com/watch\?v=[A-Za-z0-9_-]+(?:&[^&\s]*)*&t=(\d+)s?(?:&[^&\s]*)*|(?:https?://)?youtu\.be/[A-Za-z0-9_-]+\?t=(\d+)s?",
    )
    .expect("DIRECT_URL regex")
});

/// Bare `H:MM:SS` / `HH:MM:SS` / `MM:SS` shape: one to three digits for the
/// leading unit, exactly two for the rest.
pub static BARE_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3}):(\d{2})(?::(\d{2}))?").expect("BARE_TIMESTAMP regex"));

/// An anchor-link capture: the target URL, its seconds parameter, and the
/// visible link text when recoverable.
#[derive(Debug, Clone)]
pub struct AnchorMatch {
    pub url: String,
    pub seconds: u32,
    pub link_text: Option<String>,
}

/// A bare-URL capture.
#[derive(Debug, Clone)]
pub struct UrlMatch {
    pub matched: String,
    pub seconds: u32,
}

/// Scan for hyperlinks targeting a watch URL with a `t=` parameter.
pub fn scan_anchor_links(text: &str) -> Vec<AnchorMatch> {
    let mut matches = Vec::new();

    for caps in ANCHOR_LINK.captures_iter(text) {
        let (Some(url), Some(secs)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let Ok(seconds) = secs.as_str().parse::<u32>() else {
            continue;
        };

        matches.push(AnchorMatch {
            url: url.as_str().to_string(),
            seconds,
            link_text: anchor_text_for(text, url.as_str()),
        });
    }

    matches
}

/// Recover the visible text between `<a>` tags for a specific target URL.
fn anchor_text_for(text: &str, url: &str) -> Option<String> {
    let pattern = format!(r#"(?i)<a href="{}"[^>]*>([^<]+)</a>"#, regex::escape(url));
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Remove every complete anchor element from `text`.
pub fn strip_anchor_tags(text: &str) -> String {
    ANCHOR_TAG.replace_all(text, "").trim().to_string()
}

/// Scan for bare watch / short-link URLs carrying a `t=` parameter.
pub fn scan_direct_urls(text: &str) -> Vec<UrlMatch> {
    let mut matches = Vec::new();

    for caps in DIRECT_URL.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        // seconds comes from whichever alternative matched
        let Some(secs) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        let Ok(seconds) = secs.as_str().parse::<u32>() else {
            continue;
        };

        matches.push(UrlMatch {
            matched: whole.as_str().to_string(),
            seconds,
        });
    }

    matches
}

/// Scan for bare timestamp shapes and parse them positionally: a
/// three-part match is hours:minutes:seconds, a two-part match is
/// minutes:seconds.
pub fn scan_bare_timestamps(text: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for caps in BARE_TIMESTAMP.captures_iter(text) {
        let (Some(whole), Some(first), Some(second)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };

        let (Ok(first), Ok(second)) = (first.as_str().parse(), second.as_str().parse()) else {
            continue;
        };

        let candidate = match caps.get(3).and_then(|m| m.as_str().parse().ok()) {
            Some(third) => Candidate {
                matched: whole.as_str().to_string(),
                start: whole.start(),
                hours: Some(first),
                minutes: second,
                seconds: third,
            },
            None => Candidate {
                matched: whole.as_str().to_string(),
                start: whole.start(),
                hours: None,
                minutes: first,
                seconds: second,
            },
        };

        candidates.push(candidate);
    }

    candidates
}

/// Count timestamp-shaped substrings in `text` (list-mode detection).
pub fn count_timestamp_shapes(text: &str) -> usize {
    BARE_TIMESTAMP.find_iter(text).count()
}

/// Replace timestamp-shaped substrings with a space.
pub fn strip_timestamp_shapes(text: &str) -> String {
    BARE_TIMESTAMP.replace_all(text, " ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_link_scan() {
        let text = r#"intro <a href="https://www.youtube.com/watch?v=abc123&t=90">1:30</a> is great"#;
        let matches = scan_anchor_links(text);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].seconds, 90);
        assert_eq!(matches[0].link_text.as_deref(), Some("1:30"));

        let residue = strip_anchor_tags(text);
        assert_eq!(residue, "intro  is great");
    }

    #[test]
    fn test_anchor_requires_t_parameter() {
        let text = r#"<a href="https://www.youtube.com/watch?v=abc123">no time</a>"#;
        assert!(scan_anchor_links(text).is_empty());
    }

    #[test]
    fn test_direct_url_watch_form() {
        let matches = scan_direct_urls("see https://www.youtube.com/watch?v=abc123&t=120s nice");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].seconds, 120);
        assert!(matches[0].matched.contains("watch?v=abc123"));
    }

    #[test]
    fn test_direct_url_short_form() {
        let matches = scan_direct_urls("youtu.be/abc123?t=45s wow");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].seconds, 45);
    }

    #[test]
    fn test_bare_timestamp_positional_parse() {
        let candidates = scan_bare_timestamps("at 1:02:03 then 12:30");
        assert_eq!(candidates.len(), 2);

        assert_eq!(candidates[0].matched, "1:02:03");
        assert_eq!(candidates[0].hours, Some(1));
        assert_eq!(candidates[0].minutes, 2);
        assert_eq!(candidates[0].seconds, 3);
        assert_eq!(candidates[0].total_seconds(), 3723);

        assert_eq!(candidates[1].matched, "12:30");
        assert_eq!(candidates[1].hours, None);
        assert_eq!(candidates[1].total_seconds(), 750);
    }

    #[test]
    fn test_bare_timestamp_requires_two_digit_tail() {
        // "1:5" is not a timestamp shape; "1:50" is
        assert!(scan_bare_timestamps("score was 1:5 today").is_empty());
        assert_eq!(scan_bare_timestamps("highlight 1:50").len(), 1);
    }

    #[test]
    fn test_shape_counting_and_stripping() {
        let text = "0:10 a 0:20 b 0:30";
        assert_eq!(count_timestamp_shapes(text), 3);
        assert_eq!(strip_timestamp_shapes(text), "  a   b  ");
    }
}
