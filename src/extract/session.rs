//! Per-run extraction session.
//!
//! All mutable state of one extraction run lives here and is discarded when
//! the run finishes, so the engine itself stays reusable across videos. The
//! session owns the seconds-keyed claim map (first strategy to claim a key
//! wins, never overwritten) and the trace stream.

use std::collections::BTreeMap;

use crate::extract::{ExtractionResult, Strategy, TimestampEntry};
use crate::trace::{ExtractionTrace, TraceEvent};

#[derive(Debug, Clone)]
struct ClaimedEntry {
    strategy: Strategy,
    caption: String,
}

/// Accumulating state for one extraction run.
#[derive(Debug)]
pub struct ExtractionSession {
    duration: Option<u32>,
    claims: BTreeMap<u32, ClaimedEntry>,
    trace: ExtractionTrace,
    comments_scanned: usize,
}

impl ExtractionSession {
    pub fn new(duration: Option<u32>) -> Self {
        Self {
            duration,
            claims: BTreeMap::new(),
            trace: ExtractionTrace::new(),
            comments_scanned: 0,
        }
    }

    /// The duration ceiling for this run, when one is known.
    pub fn duration(&self) -> Option<u32> {
        self.duration
    }

    pub fn comments_scanned(&self) -> usize {
        self.comments_scanned
    }

    pub fn note_comment(&mut self) {
        self.comments_scanned += 1;
    }

    pub fn record(&mut self, event: TraceEvent) {
        self.trace.record(event);
    }

    pub fn is_claimed(&self, seconds: u32) -> bool {
        self.claims.contains_key(&seconds)
    }

    /// Claim a seconds key for a strategy. Returns false when the key was
    /// already claimed; an earlier claim is never overwritten.
    pub fn claim(&mut self, seconds: u32, strategy: Strategy, caption: String) -> bool {
        match self.claims.entry(seconds) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(ClaimedEntry { strategy, caption });
                true
            }
        }
    }

    pub fn claimed_count(&self) -> usize {
        self.claims.len()
    }

    /// Which strategy claimed a seconds key, if any.
    pub fn strategy_of(&self, seconds: u32) -> Option<Strategy> {
        self.claims.get(&seconds).map(|c| c.strategy)
    }

    /// Sort and gap-deduplicate the claimed entries into the final result.
    ///
    /// Greedy left-to-right merge: an entry is kept iff it is the first or
    /// lies at least `gap_seconds` past the previously kept entry. A later
    /// near-duplicate inside the gap is dropped even if it is farther from
    /// the entry after it.
    pub fn finish(mut self, gap_seconds: u32) -> ExtractionResult {
        let mut entries: Vec<TimestampEntry> = Vec::with_capacity(self.claims.len());
        let mut last_kept: Option<u32> = None;

        for (seconds, claimed) in &self.claims {
            match last_kept {
                Some(kept) if seconds - kept < gap_seconds => {
                    self.trace.record(TraceEvent::EntryDropped {
                        seconds: *seconds,
                        kept,
                    });
                }
                _ => {
                    entries.push(TimestampEntry {
                        seconds: *seconds,
                        caption: claimed.caption.clone(),
                    });
                    last_kept = Some(*seconds);
                }
            }
        }

        ExtractionResult {
            entries,
            comments_scanned: self.comments_scanned,
            trace: self.trace,
        }
    }
}
