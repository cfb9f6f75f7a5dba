use crate::error::Result;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const HISTORY_FILE: &str = "fetched_videos.json";

/// Identifiers of videos already ingested, persisted as a JSON array in insertion order.
pub struct HistoryStore {
    path: PathBuf,
    ids: Vec<String>,
    seen: HashSet<String>,
}

impl HistoryStore {
    /// Loads the store under `data_dir`. A missing or corrupt file yields an empty history.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(HISTORY_FILE);
        let ids = read_ids(&path);
        let mut seen = HashSet::with_capacity(ids.len());
        let ids = ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        Self { path, ids, seen }
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.seen.contains(video_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds `video_id` if absent and rewrites the file. Returns whether it was new.
    pub fn record(&mut self, video_id: &str) -> Result<bool> {
        if !self.seen.insert(video_id.to_string()) {
            return Ok(false);
        }
        self.ids.push(video_id.to_string());
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.ids)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn read_ids(path: &Path) -> Vec<String> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<String>>(&content) {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!("History file {} is unreadable ({e}); starting empty", path.display());
            Vec::new()
        }
    }
}
