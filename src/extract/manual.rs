//! Simplified pipeline for manually pasted timestamp text.
//!
//! Pasted text is trusted input: no HTML, no URL strategies, and none of
//! the free-text context heuristics. Each line is scanned on its own and
//! captions come from that line only. The dedup gap is wider than for
//! comment-sourced extraction.

use tracing::debug;

use super::caption::CaptionDeriver;
use super::session::ExtractionSession;
use super::{format_timestamp, scan, validate, ExtractionResult, Strategy};
use crate::trace::TraceEvent;

pub struct ManualParser {
    captions: CaptionDeriver,
    gap_seconds: u32,
}

impl ManualParser {
    pub fn new(gap_seconds: u32, max_caption_length: usize) -> Self {
        Self {
            captions: CaptionDeriver::new(max_caption_length),
            gap_seconds,
        }
    }

    pub fn parse(&self, text: &str, duration: Option<u32>) -> ExtractionResult {
        let mut session = ExtractionSession::new(duration);

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            session.note_comment();

            for candidate in scan::scan_bare_timestamps(line) {
                let total = candidate.total_seconds();
                session.record(TraceEvent::CandidateFound {
                    strategy: Strategy::Manual,
                    matched: candidate.matched.clone(),
                    seconds: total,
                });

                // trusted input: positive total and duration ceiling only
                let verdict = validate::check_bounds(total, duration);
                if !verdict.accepted {
                    debug!("❌ Skipping manual {}: {}", candidate.matched, verdict.reason);
                    session.record(TraceEvent::CandidateRejected {
                        strategy: Strategy::Manual,
                        matched: candidate.matched,
                        reason: verdict.reason,
                    });
                    continue;
                }

                if session.is_claimed(total) {
                    session.record(TraceEvent::DuplicateSkipped {
                        strategy: Strategy::Manual,
                        seconds: total,
                    });
                    continue;
                }

                let caption = self
                    .captions
                    .derive(line, &candidate.matched, candidate.start);
                debug!(
                    "✅ Manual timestamp {} - {:?}",
                    format_timestamp(total),
                    caption
                );
                session.claim(total, Strategy::Manual, caption);
                session.record(TraceEvent::CandidateAccepted {
                    strategy: Strategy::Manual,
                    seconds: total,
                    format: candidate.format_label().to_string(),
                });
            }
        }

        session.finish(self.gap_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ManualParser {
        ManualParser::new(5, 150)
    }

    #[test]
    fn test_near_entries_collapse_under_manual_gap() {
        let result = parser().parse("intro 0:10\noutro 0:12", None);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].seconds, 10);
        assert_eq!(result.entries[0].caption, "intro");
    }

    #[test]
    fn test_no_context_heuristics_for_manual_text() {
        // a comment-sourced candidate would fail the ratio-phrase check
        let result = parser().parse("price breakdown 12:30", None);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].seconds, 750);
    }

    #[test]
    fn test_duration_ceiling_still_applies() {
        let result = parser().parse("intro 0:10\nway past the end 50:00", Some(1200));
        let seconds: Vec<u32> = result.entries.iter().map(|e| e.seconds).collect();
        assert_eq!(seconds, vec![10]);
        assert_eq!(result.trace.rejection_reasons().len(), 1);
    }

    #[test]
    fn test_hour_form_parses_positionally() {
        let result = parser().parse("finale 1:02:03", None);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].seconds, 3723);
    }

    #[test]
    fn test_zero_offset_dropped() {
        let result = parser().parse("start 0:00\nreal start 0:30", None);
        let seconds: Vec<u32> = result.entries.iter().map(|e| e.seconds).collect();
        assert_eq!(seconds, vec![30]);
    }

    #[test]
    fn test_empty_input_is_valid() {
        let result = parser().parse("", None);
        assert!(result.is_empty());
        assert_eq!(result.comments_scanned, 0);
    }
}
