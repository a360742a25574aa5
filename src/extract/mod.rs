//! The timestamp extraction engine.
//!
//! A comment flows through entity normalization, then the three strategy
//! scanners in priority order (anchor links shadow direct URLs shadow free
//! text), then validation and caption derivation, and finally into a
//! per-run session that sorts and gap-deduplicates the accepted entries.

pub mod caption;
pub mod engine;
pub mod manual;
pub mod normalize;
pub mod scan;
pub mod session;
pub mod validate;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::trace::ExtractionTrace;

/// Which scanner produced a candidate. Priority is the declaration order:
/// a seconds value already claimed by an earlier strategy is never
/// re-derived by a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    AnchorLink,
    DirectUrl,
    FreeText,
    Manual,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::AnchorLink => "anchor-link",
            Strategy::DirectUrl => "direct-url",
            Strategy::FreeText => "free-text",
            Strategy::Manual => "manual",
        };
        write!(f, "{}", name)
    }
}

/// A bare `H:MM:SS` / `MM:SS` match before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The matched substring, e.g. `"12:30"`.
    pub matched: String,
    /// Byte offset of the match in the scanned text.
    pub start: usize,
    /// Hours field when the match had three parts.
    pub hours: Option<u32>,
    pub minutes: u32,
    pub seconds: u32,
}

impl Candidate {
    pub fn total_seconds(&self) -> u32 {
        self.hours.unwrap_or(0) * 3600 + self.minutes * 60 + self.seconds
    }

    /// Byte offset one past the matched substring.
    pub fn end(&self) -> usize {
        self.start + self.matched.len()
    }

    /// Human-readable detected-format label.
    pub fn format_label(&self) -> &'static str {
        if self.hours.is_some() {
            "H:MM:SS"
        } else {
            "MM:SS"
        }
    }
}

/// One chapter marker: a position in the video and a short caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampEntry {
    pub seconds: u32,
    pub caption: String,
}

/// The ordered, deduplicated outcome of one extraction run.
///
/// `entries` is strictly increasing in seconds with no two entries closer
/// than the dedup gap that was active for the run. Empty is a valid
/// "no timestamps found" outcome, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub entries: Vec<TimestampEntry>,
    pub comments_scanned: usize,
    pub trace: ExtractionTrace,
}

impl ExtractionResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Format total seconds as `M:SS` or `H:MM:SS`.
pub fn format_timestamp(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Up to `max_chars` characters of `text` ending at byte offset `at`.
///
/// Offsets produced by the scanners are always char boundaries; the window
/// edges are clamped to boundaries as well, so arbitrary Unicode comment
/// text is safe.
pub(crate) fn window_before(text: &str, at: usize, max_chars: usize) -> &str {
    if max_chars == 0 || at == 0 {
        return "";
    }
    let mut start = at;
    for (count, (idx, _)) in text[..at].char_indices().rev().enumerate() {
        start = idx;
        if count + 1 == max_chars {
            break;
        }
    }
    &text[start..at]
}

/// Up to `max_chars` characters of `text` starting at byte offset `from`.
pub(crate) fn window_after(text: &str, from: usize, max_chars: usize) -> &str {
    let tail = &text[from..];
    match tail.char_indices().nth(max_chars) {
        Some((idx, _)) => &tail[..idx],
        None => tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "0:00");
        assert_eq!(format_timestamp(61), "1:01");
        assert_eq!(format_timestamp(750), "12:30");
        assert_eq!(format_timestamp(3723), "1:02:03");
        assert_eq!(format_timestamp(36_000), "10:00:00");
    }

    #[test]
    fn test_minute_second_roundtrip() {
        // every MM:SS below one hour formats back to the same string
        for minutes in [0u32, 5, 19, 59] {
            for seconds in [0u32, 9, 30, 59] {
                let total = minutes * 60 + seconds;
                if total == 0 {
                    continue;
                }
                assert_eq!(format_timestamp(total), format!("{}:{:02}", minutes, seconds));
            }
        }
    }

    #[test]
    fn test_candidate_total_seconds() {
        let with_hours = Candidate {
            matched: "1:02:03".to_string(),
            start: 0,
            hours: Some(1),
            minutes: 2,
            seconds: 3,
        };
        assert_eq!(with_hours.total_seconds(), 3723);
        assert_eq!(with_hours.format_label(), "H:MM:SS");

        let bare = Candidate {
            matched: "12:30".to_string(),
            start: 0,
            hours: None,
            minutes: 12,
            seconds: 30,
        };
        assert_eq!(bare.total_seconds(), 750);
        assert_eq!(bare.format_label(), "MM:SS");
    }

    #[test]
    fn test_windows_respect_char_boundaries() {
        let text = "héllo 12:30 wörld";
        let at = text.find("12:30").unwrap();
        assert_eq!(window_before(text, at, 3), "lo ");
        assert_eq!(window_after(text, at + "12:30".len(), 3), " wö");
        assert_eq!(window_before(text, at, 100), "héllo ");
        assert_eq!(window_after(text, at + "12:30".len(), 100), " wörld");
        assert_eq!(window_before(text, 0, 10), "");
        assert_eq!(window_after(text, text.len(), 10), "");
    }
}
