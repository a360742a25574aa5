//! YouTube Data API v3 comment source and video info provider.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{CommentPage, CommentSource, RawComment, VideoInfo, VideoInfoProvider};
use crate::config::SourceConfig;
use crate::error::{ExtractError, Result};

/// Base URL of the Data API.
pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3";

/// ISO-8601 duration as the Data API reports it, e.g. `PT1H2M10S`.
static ISO8601_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("ISO8601_DURATION regex")
});

/// Client for the commentThreads and videos endpoints.
#[derive(Clone)]
pub struct YouTubeDataApi {
    client: Client,
    endpoint: String,
    api_key: String,
    page_size: u32,
}

impl YouTubeDataApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_config(&SourceConfig::default(), api_key.into())
    }

    pub fn from_config(config: &SourceConfig, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            page_size: config.page_size,
        }
    }
}

#[async_trait]
impl CommentSource for YouTubeDataApi {
    async fn fetch_page(&self, video_id: &str, page_token: Option<&str>) -> Result<CommentPage> {
        let mut url = format!(
            "{}/commentThreads?part=snippet&videoId={}&maxResults={}&key={}",
            self.endpoint,
            urlencoding::encode(video_id),
            self.page_size,
            urlencoding::encode(&self.api_key)
        );
        if let Some(token) = page_token {
            url.push_str("&pageToken=");
            url.push_str(&urlencoding::encode(token));
        }

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Source {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        // A payload missing expected fields is zero comments for this page,
        // not a failed run.
        let payload: CommentThreadsResponse = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("⚠️ Malformed comment page, treating as empty: {}", e);
                return Ok(CommentPage::default());
            }
        };

        let comments: Vec<RawComment> = payload
            .items
            .into_iter()
            .filter_map(raw_comment)
            .collect();
        debug!("📄 Fetched page with {} comments", comments.len());

        Ok(CommentPage {
            comments,
            next_page_token: payload.next_page_token,
        })
    }
}

#[async_trait]
impl VideoInfoProvider for YouTubeDataApi {
    async fn video_info(&self, video_id: &str) -> Result<Option<VideoInfo>> {
        if self.api_key.is_empty() {
            warn!("⚠️ No API key, skipping video info lookup");
            return Ok(None);
        }

        let url = format!(
            "{}/videos?part=snippet,contentDetails,statistics&id={}&key={}",
            self.endpoint,
            urlencoding::encode(video_id),
            urlencoding::encode(&self.api_key)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Source {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let payload: VideosResponse = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("⚠️ Malformed video info response: {}", e);
                return Ok(None);
            }
        };

        Ok(payload.items.into_iter().next().map(|item| VideoInfo {
            title: item
                .snippet
                .and_then(|s| s.title)
                .unwrap_or_default(),
            duration_seconds: item
                .content_details
                .and_then(|c| c.duration)
                .as_deref()
                .and_then(parse_iso8601_duration),
            views: item
                .statistics
                .and_then(|s| s.view_count)
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }))
    }
}

/// Parse an ISO-8601 `PT#H#M#S` duration into seconds.
pub fn parse_iso8601_duration(duration: &str) -> Option<u32> {
    let caps = ISO8601_DURATION.captures(duration)?;
    let part = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    };
    Some(part(1) * 3600 + part(2) * 60 + part(3))
}

fn raw_comment(item: ThreadItem) -> Option<RawComment> {
    let snippet = item.snippet?.top_level_comment?.snippet?;
    Some(RawComment {
        author: snippet.author_display_name.unwrap_or_default(),
        text: snippet.text_display?,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadsResponse {
    #[serde(default)]
    items: Vec<ThreadItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThreadItem {
    snippet: Option<ThreadSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: Option<CommentResource>,
}

#[derive(Debug, Deserialize)]
struct CommentResource {
    snippet: Option<CommentSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    author_display_name: Option<String>,
    text_display: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    snippet: Option<VideoSnippet>,
    content_details: Option<ContentDetails>,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
}
