use crate::core::channel::{ChannelSource, ListingEntry, resolve_channel_url};
use crate::core::history::HistoryStore;
use crate::core::storage::{Storage, VideoRecord};
use crate::core::transcript::TranscriptSource;
use crate::error::Result;
use tracing::{info, warn};

/// Outcome of one fetch run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FetchReport {
    pub scanned: usize,
    pub fetched: Vec<String>,
    pub skipped: Vec<String>,
}

pub struct FetchPipeline<'a> {
    channels: &'a dyn ChannelSource,
    transcripts: &'a dyn TranscriptSource,
    storage: &'a Storage,
    history: &'a mut HistoryStore,
    padding: usize,
}

impl<'a> FetchPipeline<'a> {
    pub fn new(
        channels: &'a dyn ChannelSource,
        transcripts: &'a dyn TranscriptSource,
        storage: &'a Storage,
        history: &'a mut HistoryStore,
        padding: usize,
    ) -> Self {
        Self {
            channels,
            transcripts,
            storage,
            history,
            padding,
        }
    }

    /// Ingests up to `limit` videos from `channel` that are not in history yet.
    /// Listing failures abort the run; per-video failures only skip that video.
    pub async fn run(&mut self, channel: &str, limit: usize) -> Result<FetchReport> {
        let url = resolve_channel_url(channel);
        info!("Fetching recent videos from: {url}");

        let entries = self
            .channels
            .list_recent(&url, limit.saturating_add(self.padding))
            .await?;
        let mut report = FetchReport::default();

        if entries.is_empty() {
            info!("No videos found.");
            return Ok(report);
        }

        info!(
            "Scanning recent videos for {limit} new ones ({} already in history)...",
            self.history.len()
        );
        for entry in entries {
            if report.fetched.len() >= limit {
                break;
            }
            report.scanned += 1;

            if self.history.contains(&entry.id) {
                continue;
            }

            let video_id = entry.id.clone();
            if self.ingest(entry).await? {
                report.fetched.push(video_id);
            } else {
                report.skipped.push(video_id);
            }
        }

        info!(
            "Fetched {} new videos ({} skipped, {} scanned)",
            report.fetched.len(),
            report.skipped.len(),
            report.scanned
        );
        Ok(report)
    }

    /// Returns `false` when the video was skipped for lack of a transcript.
    async fn ingest(&mut self, entry: ListingEntry) -> Result<bool> {
        let ListingEntry {
            id,
            mut title,
            mut upload_date,
        } = entry;

        if upload_date.as_deref().is_none_or(str::is_empty) {
            info!("  Fetching detailed metadata for {id} to get upload_date...");
            match self.channels.video_metadata(&id).await {
                Ok(meta) => {
                    upload_date = meta.upload_date;
                    title = meta.title.or(title);
                }
                Err(e) => warn!("  Could not fetch detailed info: {e}"),
            }
        }

        info!("- {} (ID: {id})", title.as_deref().unwrap_or("Unknown Title"));
        info!("  Fetching transcript for {id}...");

        let transcript = match self.transcripts.fetch(&id).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("  Empty transcript for {id}");
                return Ok(false);
            }
            Err(e) => {
                warn!("  Could not fetch transcript for {id}: {e}");
                return Ok(false);
            }
        };

        let record = VideoRecord {
            id,
            title,
            upload_date,
            transcript,
        };
        let path = self.storage.save_record(&record).await?;
        info!("  Saved transcript to {}", path.display());

        self.history.record(&record.id)?;
        info!("  Added {} to history", record.id);

        Ok(true)
    }
}
