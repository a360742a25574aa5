//! The extraction orchestrator: paginates the comment source, runs every
//! comment through the strategy scanners in priority order, and finishes
//! the session into the sorted, deduplicated result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::caption::CaptionDeriver;
use super::manual::ManualParser;
use super::session::ExtractionSession;
use super::{format_timestamp, normalize, scan, validate, ExtractionResult, Strategy};
use crate::config::ExtractionConfig;
use crate::error::{ExtractError, Result};
use crate::source::{CommentSource, VideoInfoProvider};
use crate::trace::TraceEvent;

/// Cooperative cancellation for a running extraction.
///
/// The source data is unbounded and externally controlled; cancelling
/// between pages or comments bounds worst-case latency. Cloning shares the
/// flag.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The timestamp extraction engine.
///
/// Holds no per-video state: every call builds its own session, so one
/// engine can serve many videos in sequence.
pub struct TimestampExtractor {
    source: Arc<dyn CommentSource>,
    video_info: Option<Arc<dyn VideoInfoProvider>>,
    captions: CaptionDeriver,
    manual: ManualParser,
    config: ExtractionConfig,
    cancel: CancelHandle,
}

impl TimestampExtractor {
    pub fn new(source: Arc<dyn CommentSource>, config: ExtractionConfig) -> Self {
        Self {
            source,
            video_info: None,
            captions: CaptionDeriver::new(config.max_caption_length),
            manual: ManualParser::new(
                config.manual_dedup_gap_seconds,
                config.max_caption_length,
            ),
            config,
            cancel: CancelHandle::new(),
        }
    }

    /// Attach a provider for the duration-ceiling checks.
    pub fn with_video_info(mut self, provider: Arc<dyn VideoInfoProvider>) -> Self {
        self.video_info = Some(provider);
        self
    }

    /// Handle for cancelling a run in progress.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Extract timestamps from the comments of `video_id`.
    ///
    /// Pagination is strictly sequential with a short pause between pages,
    /// and stops at the comment cap or when the source runs out of pages.
    /// The first page-fetch error aborts the whole run.
    pub async fn extract(&self, video_id: &str) -> Result<ExtractionResult> {
        let duration = self.resolve_duration(video_id).await;
        let mut session = ExtractionSession::new(duration);

        info!("🔍 Starting timestamp extraction for video {}", video_id);

        let mut page_token: Option<String> = None;
        let mut page_index = 0usize;
        loop {
            if self.cancel.is_cancelled() {
                return Err(ExtractError::Cancelled);
            }

            let page = self
                .source
                .fetch_page(video_id, page_token.as_deref())
                .await?;
            page_index += 1;
            session.record(TraceEvent::PageFetched {
                page: page_index,
                comments: page.comments.len(),
            });

            for comment in &page.comments {
                if self.cancel.is_cancelled() {
                    return Err(ExtractError::Cancelled);
                }
                session.note_comment();
                debug!("🔍 Scanning comment by {}", comment.author);
                self.scan_comment(&comment.text, &mut session);
            }

            page_token = page.next_page_token;
            if page_token.is_none() || session.comments_scanned() >= self.config.max_comments {
                break;
            }

            // self-imposed rate limit against the comment source
            tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
        }

        let result = session.finish(self.config.comment_dedup_gap_seconds);
        info!(
            "🎉 Extraction completed: {} timestamps from {} comments",
            result.entries.len(),
            result.comments_scanned
        );
        Ok(result)
    }

    /// Parse manually pasted plaintext. Trusted input: only the positive
    /// total and the optional duration ceiling apply, with a wider dedup
    /// gap.
    pub fn parse_manual(&self, text: &str, duration: Option<u32>) -> ExtractionResult {
        self.manual.parse(text, duration)
    }

    async fn resolve_duration(&self, video_id: &str) -> Option<u32> {
        let provider = self.video_info.as_ref()?;
        match provider.video_info(video_id).await {
            Ok(Some(info)) => {
                let duration = info.duration_seconds.filter(|d| *d > 0);
                match duration {
                    Some(d) => info!(
                        "📺 Video duration {}, title {:?}",
                        format_timestamp(d),
                        info.title
                    ),
                    None => debug!("📺 Video info carries no duration"),
                }
                duration
            }
            Ok(None) => None,
            Err(e) => {
                warn!(
                    "⚠️ Video info lookup failed, continuing without duration ceiling: {}",
                    e
                );
                None
            }
        }
    }

    /// Run one comment through all three strategies in priority order.
    fn scan_comment(&self, raw_text: &str, session: &mut ExtractionSession) {
        let text = normalize::normalize_comment(raw_text);
        if text.is_empty() {
            return;
        }

        self.scan_anchor_links(&text, session);
        self.scan_direct_urls(&text, session);
        self.scan_free_text(&text, session);
    }

    fn scan_anchor_links(&self, text: &str, session: &mut ExtractionSession) {
        for link in scan::scan_anchor_links(text) {
            session.record(TraceEvent::CandidateFound {
                strategy: Strategy::AnchorLink,
                matched: link.url.clone(),
                seconds: link.seconds,
            });

            if session.is_claimed(link.seconds) {
                session.record(TraceEvent::DuplicateSkipped {
                    strategy: Strategy::AnchorLink,
                    seconds: link.seconds,
                });
                continue;
            }

            // a link target is authoritative evidence: bounds only
            let verdict = validate::check_bounds(link.seconds, session.duration());
            if !verdict.accepted {
                debug!("❌ Rejected anchor link {}: {}", link.url, verdict.reason);
                session.record(TraceEvent::CandidateRejected {
                    strategy: Strategy::AnchorLink,
                    matched: link.url,
                    reason: verdict.reason,
                });
                continue;
            }

            let residue = scan::strip_anchor_tags(text);
            let mut caption = self.captions.clean(&residue);
            if caption.is_empty() {
                let label = link
                    .link_text
                    .unwrap_or_else(|| format_timestamp(link.seconds));
                caption = format!("Link to {}", label);
            }

            debug!(
                "✅ Anchor link timestamp {} - {:?}",
                format_timestamp(link.seconds),
                caption
            );
            session.claim(link.seconds, Strategy::AnchorLink, caption);
            session.record(TraceEvent::CandidateAccepted {
                strategy: Strategy::AnchorLink,
                seconds: link.seconds,
                format: "url".to_string(),
            });
        }
    }

    fn scan_direct_urls(&self, text: &str, session: &mut ExtractionSession) {
        for url in scan::scan_direct_urls(text) {
            session.record(TraceEvent::CandidateFound {
                strategy: Strategy::DirectUrl,
                matched: url.matched.clone(),
                seconds: url.seconds,
            });

            if session.is_claimed(url.seconds) {
                session.record(TraceEvent::DuplicateSkipped {
                    strategy: Strategy::DirectUrl,
                    seconds: url.seconds,
                });
                continue;
            }

            let verdict = validate::check_bounds(url.seconds, session.duration());
            if !verdict.accepted {
                debug!("❌ Rejected direct URL {}: {}", url.matched, verdict.reason);
                session.record(TraceEvent::CandidateRejected {
                    strategy: Strategy::DirectUrl,
                    matched: url.matched,
                    reason: verdict.reason,
                });
                continue;
            }

            let without_url = text.replace(&url.matched, " ");
            let mut caption = self.captions.clean(&without_url);
            if caption.is_empty() {
                caption = format!("URL timestamp {}", format_timestamp(url.seconds));
            }

            debug!(
                "✅ Direct URL timestamp {} - {:?}",
                format_timestamp(url.seconds),
                caption
            );
            session.claim(url.seconds, Strategy::DirectUrl, caption);
            session.record(TraceEvent::CandidateAccepted {
                strategy: Strategy::DirectUrl,
                seconds: url.seconds,
                format: "url".to_string(),
            });
        }
    }

    fn scan_free_text(&self, text: &str, session: &mut ExtractionSession) {
        for candidate in scan::scan_bare_timestamps(text) {
            let total = candidate.total_seconds();
            session.record(TraceEvent::CandidateFound {
                strategy: Strategy::FreeText,
                matched: candidate.matched.clone(),
                seconds: total,
            });

            if session.is_claimed(total) {
                session.record(TraceEvent::DuplicateSkipped {
                    strategy: Strategy::FreeText,
                    seconds: total,
                });
                continue;
            }

            let verdict = validate::validate(&candidate, text, session.duration());
            if !verdict.accepted {
                debug!("❌ Rejected {}: {}", candidate.matched, verdict.reason);
                session.record(TraceEvent::CandidateRejected {
                    strategy: Strategy::FreeText,
                    matched: candidate.matched,
                    reason: verdict.reason,
                });
                continue;
            }

            let caption = self
                .captions
                .derive(text, &candidate.matched, candidate.start);
            debug!(
                "✅ Free-text timestamp {} - {:?}",
                format_timestamp(total),
                caption
            );
            session.claim(total, Strategy::FreeText, caption);
            session.record(TraceEvent::CandidateAccepted {
                strategy: Strategy::FreeText,
                seconds: total,
                format: candidate.format_label().to_string(),
            });
        }
    }
}
