//! Caption derivation: turn the text around an accepted match into a short
//! human-readable chapter title.

use std::sync::LazyLock;

use regex::Regex;

use super::{normalize, scan, window_after, window_before};

/// Characters of surrounding text taken on each side of a match.
const WINDOW_CHARS: usize = 80;

/// A comment with more timestamp shapes than this is treated as a list.
const LIST_THRESHOLD: usize = 3;

/// Link targets, watch fragments, and markup that never belong in a caption.
static CAPTION_NOISE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"https?://\S+",
        r"www\.\S+",
        r"youtube\.com\S*",
        r"youtu\.be\S*",
        r"watch\?v=\S*",
        r"&t=\d+s?",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("CAPTION_NOISE regex"))
    .collect()
});

/// Derives captions from comment text. One instance per engine; the
/// truncation limit comes from configuration.
#[derive(Debug, Clone)]
pub struct CaptionDeriver {
    max_len: usize,
}

impl CaptionDeriver {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Caption for an accepted match at byte offset `at` in `text`.
    ///
    /// A comment holding many timestamps is a list: the shared leading (or
    /// trailing) prose captions every entry. Otherwise the text surrounding
    /// this particular match is used, falling back to the head of the
    /// comment when the surroundings are too thin.
    pub fn derive(&self, text: &str, matched: &str, at: usize) -> String {
        let shapes: Vec<_> = scan::BARE_TIMESTAMP.find_iter(text).collect();

        let raw = if shapes.len() > LIST_THRESHOLD {
            self.list_caption(text, &shapes)
        } else {
            self.window_caption(text, matched, at)
        };

        let cleaned = self.clean(&raw);
        if cleaned.is_empty() {
            "Timestamp".to_string()
        } else {
            cleaned
        }
    }

    fn list_caption(&self, text: &str, shapes: &[regex::Match<'_>]) -> String {
        let before_first = text[..shapes[0].start()].trim();
        if before_first.chars().count() > 3 {
            return before_first.to_string();
        }

        let after_last = text[shapes[shapes.len() - 1].end()..].trim();
        if after_last.chars().count() > 3 {
            return after_last.to_string();
        }

        format!("Timestamp from list of {} timestamps", shapes.len())
    }

    fn window_caption(&self, text: &str, matched: &str, at: usize) -> String {
        let before = window_before(text, at, WINDOW_CHARS).trim();
        let after = window_after(text, at + matched.len(), WINDOW_CHARS).trim();

        // other timestamps in the window are noise, not caption text
        let surrounding = scan::strip_timestamp_shapes(&format!("{} {}", before, after));
        let surrounding = surrounding.trim();
        if surrounding.chars().count() > 5 {
            return surrounding.to_string();
        }

        let head: String = text.chars().take(150).collect();
        scan::strip_timestamp_shapes(&head).trim().to_string()
    }

    /// The post-processing every caption goes through: entity decoding,
    /// URL/markup removal, whitespace collapsing, punctuation trimming, and
    /// truncation. An empty result is returned as-is so callers can apply
    /// their own fallback.
    pub fn clean(&self, text: &str) -> String {
        let mut cleaned = normalize::decode_entities(text);
        for re in CAPTION_NOISE.iter() {
            cleaned = re.replace_all(&cleaned, "").to_string();
        }
        cleaned = normalize::strip_tags(&cleaned);
        cleaned = cleaned.replace(['<', '>'], "");

        let cleaned = normalize::collapse_whitespace(&cleaned);
        let cleaned = cleaned.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_'));
        cleaned.chars().take(self.max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deriver() -> CaptionDeriver {
        CaptionDeriver::new(150)
    }

    fn derive_at(text: &str, needle: &str) -> String {
        let at = text.find(needle).unwrap();
        deriver().derive(text, needle, at)
    }

    #[test]
    fn test_surrounding_text_caption() {
        assert_eq!(derive_at("Great moment at 12:30!", "12:30"), "Great moment at");
    }

    #[test]
    fn test_other_timestamps_stripped_from_window() {
        let caption = derive_at("intro 0:10 then the big reveal 5:00 happens", "5:00");
        assert_eq!(caption, "intro then the big reveal happens");
    }

    #[test]
    fn test_thin_surroundings_fall_back_to_head() {
        // two chars of context is too thin; the comment head is used instead
        let caption = derive_at("ok 1:23", "1:23");
        assert_eq!(caption, "ok");
    }

    #[test]
    fn test_list_mode_prefers_leading_text() {
        let text = "Full chapter list: 0:10 intro 2:30 theme 4:50 outro 9:00 credits";
        let caption = derive_at(text, "4:50");
        assert_eq!(caption, "Full chapter list");
    }

    #[test]
    fn test_list_mode_falls_back_to_trailing_text() {
        let text = "0:10 0:20 0:30 0:40 all timestamps by request";
        let caption = derive_at(text, "0:30");
        assert_eq!(caption, "all timestamps by request");
    }

    #[test]
    fn test_list_mode_synthesizes_when_bare() {
        let text = "0:10 0:20 0:30 0:40 0:50";
        let caption = derive_at(text, "0:30");
        assert_eq!(caption, "Timestamp from list of 5 timestamps");
    }

    #[test]
    fn test_clean_removes_urls_and_markup() {
        let cleaned = deriver().clean("see https://youtu.be/abc?t=90 <b>now</b> &amp; later");
        assert_eq!(cleaned, "see now & later");
    }

    #[test]
    fn test_clean_truncates() {
        let deriver = CaptionDeriver::new(10);
        assert_eq!(deriver.clean("a very long caption indeed"), "a very lon");
    }

    #[test]
    fn test_empty_caption_defaults() {
        assert_eq!(derive_at("!! 12:30 !!", "12:30"), "Timestamp");
    }
}
