//! Timestamp extraction engine for building chapter markers from video
//! comments.
//!
//! Scans noisy user-authored text for time references in several textual
//! encodings (hyperlinked watch URLs, bare URLs, `H:MM:SS` prose patterns),
//! classifies each candidate as genuine or spurious using only local
//! context, assigns a human-readable caption, and merges everything into
//! one ordered, deduplicated list of chapter markers.

pub mod config;
pub mod error;
pub mod extract;
pub mod source;
pub mod trace;

// Re-export main types for easy access
pub use crate::config::{Config, ExtractionConfig, SourceConfig};
pub use crate::error::{ExtractError, Result};
pub use crate::extract::caption::CaptionDeriver;
pub use crate::extract::engine::{CancelHandle, TimestampExtractor};
pub use crate::extract::manual::ManualParser;
pub use crate::extract::{format_timestamp, Candidate, ExtractionResult, Strategy, TimestampEntry};
pub use crate::source::{
    parse_video_id, CommentPage, CommentSource, RawComment, VideoInfo, VideoInfoProvider,
    YouTubeDataApi,
};
pub use crate::trace::{ExtractionTrace, TraceEvent};
