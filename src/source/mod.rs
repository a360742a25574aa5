//! External collaborators of the extraction engine.
//!
//! The engine consumes a paginated comment source and an optional video
//! info provider; both are traits so tests can drive the pipeline with
//! in-memory fixtures.

pub mod youtube;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

pub use youtube::YouTubeDataApi;

/// One comment as delivered by the source. Owned transiently by the
/// pipeline and discarded after scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawComment {
    pub author: String,
    pub text: String,
}

/// One page of comments plus the token for the next page, if any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentPage {
    pub comments: Vec<RawComment>,
    pub next_page_token: Option<String>,
}

/// Metadata about the video being extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    /// Duration in seconds, when the source reports one.
    pub duration_seconds: Option<u32>,
    pub views: u64,
}

/// Paginated comment source. Any fetch failure is fatal for the whole
/// extraction run; the engine does not retry.
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn fetch_page(&self, video_id: &str, page_token: Option<&str>) -> Result<CommentPage>;
}

/// Optional provider of video metadata. A lookup failure only disables the
/// duration-ceiling checks, never the run.
#[async_trait]
pub trait VideoInfoProvider: Send + Sync {
    async fn video_info(&self, video_id: &str) -> Result<Option<VideoInfo>>;
}

/// Extract the video id from a watch URL, short link, embed URL, or a bare
/// 11-character id.
pub fn parse_video_id(input: &str) -> Result<String> {
    let trimmed = input.trim();

    if let Ok(re) = Regex::new(r"^[A-Za-z0-9_-]{11}$") {
        if re.is_match(trimmed) {
            return Ok(trimmed.to_string());
        }
    }

    if let Ok(re) = Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([A-Za-z0-9_-]+)") {
        if let Some(caps) = re.captures(trimmed) {
            return Ok(caps[1].to_string());
        }
    }

    Err(ExtractError::InvalidVideoUrl(input.to_string()))
}
