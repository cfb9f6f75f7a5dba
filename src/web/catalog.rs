use crate::core::{ParsedSummary, Storage, VideoRecord};
use crate::error::Result;

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_DATE: &str = "Unknown Date";
const MISSING_DATE_SORT_KEY: &str = "0";

/// A video prepared for display. Built per request, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoEntry {
    pub id: String,
    pub title: String,
    pub date: String,
    pub raw_date: Option<String>,
    pub transcript: String,
    pub summary: ParsedSummary,
}

impl VideoEntry {
    fn sort_key(&self) -> &str {
        match self.raw_date.as_deref() {
            Some(date) if !date.is_empty() => date,
            _ => MISSING_DATE_SORT_KEY,
        }
    }
}

/// `YYYYMMDD` becomes `YYYY-MM-DD`; anything else is returned unchanged.
pub fn format_date(raw: &str) -> String {
    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &raw[..4], &raw[4..6], &raw[6..])
    } else {
        raw.to_string()
    }
}

async fn build_entry(storage: &Storage, record: VideoRecord) -> Result<VideoEntry> {
    let summary = match storage.load_summary(&record.id).await {
        Ok(Some(text)) => ParsedSummary::parse(&text),
        Ok(None) => ParsedSummary::missing(),
        Err(e) => {
            tracing::warn!("Could not read summary for {}: {e}", record.id);
            ParsedSummary::missing()
        }
    };

    let date = format_date(record.upload_date.as_deref().unwrap_or(UNKNOWN_DATE));

    Ok(VideoEntry {
        title: record.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        date,
        raw_date: record.upload_date,
        transcript: record.transcript,
        summary,
        id: record.id,
    })
}

/// All stored videos, newest upload date first. Undated videos go last.
pub async fn list_videos(storage: &Storage) -> Result<Vec<VideoEntry>> {
    let records = storage.list_records().await?;
    let mut videos = Vec::with_capacity(records.len());
    for record in records {
        videos.push(build_entry(storage, record).await?);
    }

    videos.sort_by(|a, b| b.sort_key().cmp(a.sort_key()));
    Ok(videos)
}

pub async fn get_video(storage: &Storage, video_id: &str) -> Result<Option<VideoEntry>> {
    match storage.load_record(video_id).await? {
        Some(record) => Ok(Some(build_entry(storage, record).await?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store(storage: &Storage, id: &str, date: Option<&str>) {
        storage
            .save_record(&VideoRecord {
                id: id.to_string(),
                title: Some(format!("Title {id}")),
                upload_date: date.map(String::from),
                transcript: format!("words from {id}"),
            })
            .await
            .unwrap();
    }

    #[test]
    fn formats_eight_digit_dates() {
        assert_eq!(format_date("20230415"), "2023-04-15");
    }

    #[test]
    fn other_dates_pass_through() {
        assert_eq!(format_date("2023-04-15"), "2023-04-15");
        assert_eq!(format_date("2023041"), "2023041");
        assert_eq!(format_date("2023O415"), "2023O415");
        assert_eq!(format_date("Unknown Date"), "Unknown Date");
        assert_eq!(format_date(""), "");
    }

    #[tokio::test]
    async fn list_sorts_newest_first_with_undated_last() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        store(&storage, "old", Some("20220101")).await;
        store(&storage, "undated", None).await;
        store(&storage, "new", Some("20240620")).await;
        store(&storage, "blank", Some("")).await;

        let videos = list_videos(&storage).await.unwrap();
        let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(&ids[..2], ["new", "old"]);
        assert!(ids[2..].contains(&"undated") && ids[2..].contains(&"blank"));

        assert_eq!(videos[0].date, "2024-06-20");
        let undated = videos.iter().find(|v| v.id == "undated").unwrap();
        assert_eq!(undated.date, "Unknown Date");
        assert_eq!(undated.raw_date, None);
    }

    #[tokio::test]
    async fn unsummarized_videos_get_placeholder_subject() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        store(&storage, "bare", Some("20240101")).await;
        store(&storage, "done", Some("20240102")).await;
        storage
            .save_summary("done", "Question 1.\nA founder.\nQuestion 2.\nA tool.")
            .await
            .unwrap();

        let videos = list_videos(&storage).await.unwrap();
        let bare = videos.iter().find(|v| v.id == "bare").unwrap();
        assert_eq!(bare.summary.subject, "<em>No summary</em>");
        assert!(bare.summary.built.is_empty());
        assert!(bare.summary.advice.is_empty());

        let done = videos.iter().find(|v| v.id == "done").unwrap();
        assert_eq!(done.summary.subject, "<p>A founder.</p>");
        assert_eq!(done.summary.built, "<p>A tool.</p>");
    }

    #[tokio::test]
    async fn detail_lookup() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        store(&storage, "known", Some("20240101")).await;

        let video = get_video(&storage, "known").await.unwrap().unwrap();
        assert_eq!(video.title, "Title known");
        assert_eq!(video.transcript, "words from known");
        assert!(get_video(&storage, "unknown").await.unwrap().is_none());
        assert!(get_video(&storage, "../known").await.unwrap().is_none());
    }
}
