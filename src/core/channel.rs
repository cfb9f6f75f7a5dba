use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

const CHANNEL_BASE_URL: &str = "https://www.youtube.com/channel";
const WATCH_BASE_URL: &str = "https://www.youtube.com/watch?v=";

/// One item of a channel listing. Only `id` is guaranteed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListingEntry {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
}

#[async_trait]
pub trait ChannelSource: Send + Sync {
    /// Newest-first listing of at most `limit` entries from `channel_url`.
    async fn list_recent(&self, channel_url: &str, limit: usize) -> Result<Vec<ListingEntry>>;

    async fn video_metadata(&self, video_id: &str) -> Result<VideoMetadata>;
}

/// Accepts a full URL or a channel ID. Anything else is treated as a channel ID path.
pub fn resolve_channel_url(channel: &str) -> String {
    let channel = channel.trim();
    if channel.starts_with("http") {
        channel.to_string()
    } else {
        format!("{CHANNEL_BASE_URL}/{channel}/videos")
    }
}

/// Listing and metadata lookups backed by the `yt-dlp` executable.
#[derive(Clone)]
pub struct YtDlpChannelSource {
    program: String,
    proxy: Option<String>,
}

impl YtDlpChannelSource {
    pub fn new(config: &Config) -> Self {
        if let Some(proxy) = config.proxy.as_ref() {
            tracing::info!("Using Webshare proxy with user {}-rotate", proxy.username);
        }
        Self {
            program: config.ytdlp.clone(),
            proxy: config.proxy_url(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--dump-single-json")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg("--ignore-errors");
        if let Some(proxy) = self.proxy.as_deref() {
            cmd.arg("--proxy").arg(proxy);
        }
        cmd
    }

    async fn run(&self, mut cmd: Command, target: &str) -> Result<serde_json::Value> {
        let output = cmd.output().await.map_err(|e| {
            Error::custom(format!("Failed to run {}: {e}", self.program))
        })?;

        // With --ignore-errors a partially resolvable listing still exits non-zero,
        // so judge by whether any JSON came back.
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Err(Error::custom(format!(
                "{} returned nothing for {target}: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(serde_json::from_str(stdout.trim())?)
    }
}

#[async_trait]
impl ChannelSource for YtDlpChannelSource {
    async fn list_recent(&self, channel_url: &str, limit: usize) -> Result<Vec<ListingEntry>> {
        let mut cmd = self.command();
        cmd.arg("--flat-playlist")
            .arg("--playlist-end")
            .arg(limit.to_string())
            .arg(channel_url);

        let info = self.run(cmd, channel_url).await?;
        Ok(parse_listing(&info))
    }

    async fn video_metadata(&self, video_id: &str) -> Result<VideoMetadata> {
        let mut cmd = self.command();
        cmd.arg("--skip-download")
            .arg(format!("{WATCH_BASE_URL}{video_id}"));

        let info = self.run(cmd, video_id).await?;
        Ok(serde_json::from_value(info)?)
    }
}

/// Pulls entries out of a flat playlist dump, dropping null or id-less ones.
pub fn parse_listing(info: &serde_json::Value) -> Vec<ListingEntry> {
    let Some(entries) = info.get("entries").and_then(|e| e.as_array()) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| !entry.is_null())
        .filter_map(|entry| serde_json::from_value::<ListingEntry>(entry.clone()).ok())
        .filter(|entry| !entry.id.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_url_passes_through() {
        let url = "https://www.youtube.com/@starterstory/videos";
        assert_eq!(resolve_channel_url(url), url);
    }

    #[test]
    fn channel_id_becomes_videos_url() {
        assert_eq!(
            resolve_channel_url("UChhw6DlKKTQ9mYSpTfXUYqA"),
            "https://www.youtube.com/channel/UChhw6DlKKTQ9mYSpTfXUYqA/videos"
        );
    }

    #[test]
    fn other_strings_fall_back_to_channel_path() {
        assert_eq!(
            resolve_channel_url("somehandle"),
            "https://www.youtube.com/channel/somehandle/videos"
        );
    }

    #[test]
    fn listing_skips_unresolvable_entries() {
        let info = json!({
            "entries": [
                {"id": "a1", "title": "First", "upload_date": "20240301"},
                null,
                {"title": "no id"},
                {"id": "b2", "title": null},
            ]
        });

        let entries = parse_listing(&info);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].upload_date.as_deref(), Some("20240301"));
        assert_eq!(entries[1].id, "b2");
        assert_eq!(entries[1].title, None);
    }

    #[test]
    fn listing_without_entries_is_empty() {
        assert!(parse_listing(&json!({"id": "UC123"})).is_empty());
    }
}
