//! Structured extraction trace.
//!
//! Every strategy hit, validation verdict, and dedup decision is recorded as
//! a typed event so diagnostic behavior is part of the tested contract
//! rather than incidental log output. `tracing` narration mirrors the same
//! facts for interactive use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extract::Strategy;

/// A single trace event with the moment it was recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceRecord {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: TraceEvent,
}

/// What happened during an extraction run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A comment page was fetched from the source.
    PageFetched { page: usize, comments: usize },
    /// A scanner produced a candidate.
    CandidateFound {
        strategy: Strategy,
        matched: String,
        seconds: u32,
    },
    /// A candidate failed validation and was dropped.
    CandidateRejected {
        strategy: Strategy,
        matched: String,
        reason: String,
    },
    /// A candidate survived validation and claimed its seconds key.
    CandidateAccepted {
        strategy: Strategy,
        seconds: u32,
        format: String,
    },
    /// The seconds key was already claimed by a higher-priority strategy.
    DuplicateSkipped { strategy: Strategy, seconds: u32 },
    /// An entry fell inside the dedup gap of an already-kept entry.
    EntryDropped { seconds: u32, kept: u32 },
}

/// Ordered stream of events for one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionTrace {
    records: Vec<TraceRecord>,
}

impl ExtractionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: TraceEvent) {
        self.records.push(TraceRecord {
            at: Utc::now(),
            event,
        });
    }

    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn events(&self) -> impl Iterator<Item = &TraceEvent> {
        self.records.iter().map(|r| &r.event)
    }

    /// Reasons of every rejected candidate, in order.
    pub fn rejection_reasons(&self) -> Vec<&str> {
        self.events()
            .filter_map(|e| match e {
                TraceEvent::CandidateRejected { reason, .. } => Some(reason.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn accepted_count(&self) -> usize {
        self.events()
            .filter(|e| matches!(e, TraceEvent::CandidateAccepted { .. }))
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_records_in_order() {
        let mut trace = ExtractionTrace::new();
        trace.record(TraceEvent::PageFetched {
            page: 1,
            comments: 3,
        });
        trace.record(TraceEvent::CandidateRejected {
            strategy: Strategy::FreeText,
            matched: "2:60".to_string(),
            reason: "seconds field out of range: 60".to_string(),
        });

        assert_eq!(trace.len(), 2);
        assert_eq!(
            trace.rejection_reasons(),
            vec!["seconds field out of range: 60"]
        );
        assert_eq!(trace.accepted_count(), 0);
    }

    #[test]
    fn test_trace_serializes_tagged_events() {
        let mut trace = ExtractionTrace::new();
        trace.record(TraceEvent::CandidateAccepted {
            strategy: Strategy::AnchorLink,
            seconds: 90,
            format: "MM:SS".to_string(),
        });

        let json = serde_json::to_string(&trace).unwrap();
        assert!(json.contains("\"event\":\"candidate_accepted\""));
        assert!(json.contains("\"seconds\":90"));
    }
}
