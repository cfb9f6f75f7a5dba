use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs as std_fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

const TRANSCRIPTS_DIR: &str = "transcripts";
const SUMMARIES_DIR: &str = "summaries";
const RECORD_SUFFIX: &str = ".json";
const SUMMARY_SUFFIX: &str = "_summary.md";
const MAX_VIDEO_ID_LEN: usize = 128;

/// One fetched video as persisted under `transcripts/{video_id}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    #[serde(rename = "video_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub transcript: String,
}

/// Flat-file store for video records and their summaries.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn transcripts_dir(&self) -> PathBuf {
        self.root.join(TRANSCRIPTS_DIR)
    }

    fn summaries_dir(&self) -> PathBuf {
        self.root.join(SUMMARIES_DIR)
    }

    fn ensure_directories(&self) -> Result<()> {
        ensure_directory(&self.transcripts_dir())?;
        ensure_directory(&self.summaries_dir())?;
        Ok(())
    }

    fn record_path(&self, video_id: &str) -> Result<PathBuf> {
        let sanitized = sanitize_video_id(video_id)?;
        Ok(self
            .transcripts_dir()
            .join(format!("{sanitized}{RECORD_SUFFIX}")))
    }

    fn summary_path(&self, video_id: &str) -> Result<PathBuf> {
        let sanitized = sanitize_video_id(video_id)?;
        Ok(self
            .summaries_dir()
            .join(format!("{sanitized}{SUMMARY_SUFFIX}")))
    }

    pub fn summary_exists(&self, video_id: &str) -> bool {
        self.summary_path(video_id)
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    pub async fn save_record(&self, record: &VideoRecord) -> Result<PathBuf> {
        self.ensure_directories()?;
        let path = self.record_path(&record.id)?;

        let content = serde_json::to_string_pretty(record)?;
        fs::write(&path, content).await?;
        tracing::debug!("Record saved to: {}", path.display());

        Ok(path)
    }

    pub async fn save_summary(&self, video_id: &str, content: &str) -> Result<PathBuf> {
        self.ensure_directories()?;
        let path = self.summary_path(video_id)?;

        fs::write(&path, content).await?;
        tracing::debug!("Summary saved to: {}", path.display());

        Ok(path)
    }

    /// Returns `None` when no record exists for `video_id` or the identifier is not a valid one.
    pub async fn load_record(&self, video_id: &str) -> Result<Option<VideoRecord>> {
        let Ok(path) = self.record_path(video_id) else {
            return Ok(None);
        };
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn load_summary(&self, video_id: &str) -> Result<Option<String>> {
        let path = self.summary_path(video_id)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Every readable record in the transcripts directory, in directory order.
    /// Files that fail to parse are logged and skipped.
    pub async fn list_records(&self) -> Result<Vec<VideoRecord>> {
        let mut records = Vec::new();

        let mut entries = match fs::read_dir(self.transcripts_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(records),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_record = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.ends_with(RECORD_SUFFIX));
            if !is_record {
                continue;
            }

            match read_record(&path).await {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping unreadable record {}: {e}", path.display()),
            }
        }

        Ok(records)
    }
}

/// Identifiers name files on disk, so only ASCII letters, digits, `-` and `_` pass.
pub fn sanitize_video_id(raw: &str) -> Result<String> {
    let id = raw.trim();

    if id.is_empty() {
        return Err(Error::custom("Video ID cannot be empty"));
    }
    if id.len() > MAX_VIDEO_ID_LEN {
        return Err(Error::custom(format!(
            "Video ID is longer than {MAX_VIDEO_ID_LEN} characters"
        )));
    }
    if let Some(bad) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_')))
    {
        return Err(Error::custom(format!(
            "Video ID {id:?} contains unsupported character {bad:?}"
        )));
    }

    Ok(id.to_string())
}

async fn read_record(path: &Path) -> Result<VideoRecord> {
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

fn ensure_directory(path: &Path) -> Result<()> {
    std_fs::create_dir_all(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let metadata = std_fs::metadata(path)?;
        let mut permissions = metadata.permissions();
        if permissions.mode() & 0o777 != 0o700 {
            permissions.set_mode(0o700);
            std_fs::set_permissions(path, permissions)?;
        }
    }

    Ok(())
}
