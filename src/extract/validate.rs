//! Candidate validation: the fixed rejection battery that separates real
//! timestamps from prices, ratios, dates, resolutions, and URL fragments
//! using only local context.

use std::sync::LazyLock;

use regex::Regex;

use super::{format_timestamp, window_after, window_before, Candidate};

/// Characters of context taken on each side of a match for the URL / date
/// checks.
const CONTEXT_CHARS: usize = 20;

/// Upper bound on any timestamp: one day, exclusive.
pub const MAX_SECONDS: u32 = 86_400;

static URL_CONTEXT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"https?://\S*",
        r"www\.\S*",
        r"youtube\.com\S*",
        r"t=\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("URL_CONTEXT regex"))
    .collect()
});

static DATE_CONTEXT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\d{4}[-/]\d{1,2}[-/]\d{1,2}",
        r"\d{1,2}[-/]\d{1,2}[-/]\d{4}",
        r"(?i)\b(?:am|pm)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("DATE_CONTEXT regex"))
    .collect()
});

/// Phrases marking a `D:D` pattern as a ratio, score, or spec rather than a
/// position in the video.
static RATIO_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"price|cost|ratio|score|resolution").expect("RATIO_PHRASE regex")
});

static DIGIT_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+:\d+").expect("DIGIT_PAIR regex"));

/// Outcome of judging one candidate. Pure data, no ownership implications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: String,
}

impl Verdict {
    fn accept(reason: String) -> Self {
        Self {
            accepted: true,
            reason,
        }
    }

    fn reject(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: reason.into(),
        }
    }
}

/// Bounds-only validation for URL-derived candidates. A link target is
/// authoritative evidence, so the textual heuristics do not apply.
pub fn check_bounds(total_seconds: u32, duration: Option<u32>) -> Verdict {
    if total_seconds == 0 || total_seconds >= MAX_SECONDS {
        return Verdict::reject(format!("total outside (0, 86400): {}s", total_seconds));
    }
    if let Some(limit) = duration {
        if total_seconds > limit {
            return Verdict::reject(format!(
                "beyond video duration: {} > {}",
                format_timestamp(total_seconds),
                format_timestamp(limit)
            ));
        }
    }
    Verdict::accept(format!("within bounds: {}", format_timestamp(total_seconds)))
}

/// Run the full rejection battery on a free-text candidate, stopping at the
/// first failure.
pub fn validate(candidate: &Candidate, text: &str, duration: Option<u32>) -> Verdict {
    // 1. seconds is always a sub-minute field
    if candidate.seconds >= 60 {
        return Verdict::reject(format!("seconds field out of range: {}", candidate.seconds));
    }

    // 2. minutes is always a sub-hour field; the presence of an hours part
    //    never relaxes this
    if candidate.minutes >= 60 {
        return Verdict::reject(format!("minutes field out of range: {}", candidate.minutes));
    }
    if let Some(hours) = candidate.hours {
        if hours >= 100 {
            return Verdict::reject(format!("hours field out of range: {}", hours));
        }
    }

    // 3–4. total bounds and the optional duration ceiling
    let total = candidate.total_seconds();
    let bounds = check_bounds(total, duration);
    if !bounds.accepted {
        return bounds;
    }

    // 5–6. context window: URL and date/clock surroundings
    let window = format!(
        "{}{}{}",
        window_before(text, candidate.start, CONTEXT_CHARS),
        candidate.matched,
        window_after(text, candidate.end(), CONTEXT_CHARS)
    );
    if URL_CONTEXT.iter().any(|re| re.is_match(&window)) {
        return Verdict::reject("inside URL context");
    }
    if DATE_CONTEXT.iter().any(|re| re.is_match(&window)) {
        return Verdict::reject("inside date or clock context");
    }

    // 7. a digit on either side means the match is a fragment of a longer
    //    number
    let before = text[..candidate.start].chars().next_back();
    let after = text[candidate.end()..].chars().next();
    if before.is_some_and(|c| c.is_ascii_digit()) || after.is_some_and(|c| c.is_ascii_digit()) {
        return Verdict::reject("adjacent to digits");
    }

    // 8. ratio phrases next to a D:D pattern
    let lowered = window.to_lowercase();
    if RATIO_PHRASE.is_match(&lowered) && DIGIT_PAIR.is_match(&lowered) {
        return Verdict::reject("non-temporal ratio phrase nearby");
    }

    Verdict::accept(format!(
        "valid {} -> {}",
        candidate.format_label(),
        format_timestamp(total)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::scan::scan_bare_timestamps;

    fn only_candidate(text: &str) -> Candidate {
        let mut candidates = scan_bare_timestamps(text);
        assert_eq!(candidates.len(), 1, "expected one candidate in {:?}", text);
        candidates.remove(0)
    }

    #[test]
    fn test_accepts_plain_timestamp() {
        let text = "Great moment at 12:30!";
        let verdict = validate(&only_candidate(text), text, None);
        assert!(verdict.accepted, "{}", verdict.reason);
        assert!(verdict.reason.contains("MM:SS"));
    }

    #[test]
    fn test_rejects_seconds_field() {
        let text = "then 2:60 happened";
        let verdict = validate(&only_candidate(text), text, None);
        assert!(!verdict.accepted);
        assert!(verdict.reason.contains("seconds field"));
    }

    #[test]
    fn test_rejects_minutes_field_without_hours() {
        let text = "around 99:59 maybe";
        let verdict = validate(&only_candidate(text), text, None);
        assert!(!verdict.accepted);
        assert!(verdict.reason.contains("minutes field"));
    }

    #[test]
    fn test_rejects_minutes_field_with_hours() {
        // MM is a sub-hour field even in a three-part match
        let text = "at 1:75:30 somewhere";
        let verdict = validate(&only_candidate(text), text, None);
        assert!(!verdict.accepted);
        assert!(verdict.reason.contains("minutes field"));
    }

    #[test]
    fn test_rejects_beyond_duration() {
        let text = "ending at 50:00 roughly";
        let verdict = validate(&only_candidate(text), text, Some(1200));
        assert!(!verdict.accepted);
        assert!(verdict.reason.contains("beyond video duration"));

        let verdict = validate(&only_candidate(text), text, None);
        assert!(verdict.accepted);
    }

    #[test]
    fn test_rejects_url_context() {
        let text = "see http://ex.co/12:30 here";
        let candidates = scan_bare_timestamps(text);
        let verdict = validate(&candidates[0], text, None);
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, "inside URL context");
    }

    #[test]
    fn test_rejects_t_parameter_context() {
        let text = "clip?t=123 near 12:30";
        let verdict = validate(&only_candidate(text), text, None);
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, "inside URL context");
    }

    #[test]
    fn test_rejects_date_context() {
        let text = "posted 2023-12-30 at 12:30";
        let verdict = validate(&only_candidate(text), text, None);
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, "inside date or clock context");
    }

    #[test]
    fn test_rejects_clock_marker() {
        let text = "see you at 12:30 PM";
        let verdict = validate(&only_candidate(text), text, None);
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, "inside date or clock context");
    }

    #[test]
    fn test_rejects_digit_adjacent_fragment() {
        let text = "serial 12:34:56789 end";
        let candidates = scan_bare_timestamps(text);
        assert_eq!(candidates[0].matched, "12:34:56");
        let verdict = validate(&candidates[0], text, None);
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, "adjacent to digits");
    }

    #[test]
    fn test_rejects_ratio_phrases() {
        let text = "price is 12:30 vs 45:00 ratio";
        for candidate in scan_bare_timestamps(text) {
            let verdict = validate(&candidate, text, None);
            assert!(!verdict.accepted, "{} should be rejected", candidate.matched);
        }
    }

    #[test]
    fn test_bounds_only_check() {
        assert!(check_bounds(90, None).accepted);
        assert!(!check_bounds(0, None).accepted);
        assert!(!check_bounds(86_400, None).accepted);
        assert!(!check_bounds(901, Some(900)).accepted);
        assert!(check_bounds(900, Some(900)).accepted);
    }
}
