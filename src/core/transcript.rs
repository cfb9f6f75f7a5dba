use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use yt_transcript_rs::{FetchedTranscript, api::YouTubeTranscriptApi, proxies::WebshareProxyConfig};

const LANGUAGES: &[&str] = &["en"];

/// Given a video identifier, returns the captioned text in order.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct TranscriptService {
    api: Option<YouTubeTranscriptApi>,
}

impl TranscriptService {
    /// Without proxy credentials the service is built but refuses every fetch.
    pub fn new(config: &Config) -> Result<Self> {
        let Some(proxy) = config.proxy.as_ref() else {
            return Ok(Self { api: None });
        };

        tracing::info!("Using Proxy Username: {}", proxy.username);
        let proxy_config = WebshareProxyConfig::new(
            proxy.username.clone(),
            proxy.password.clone(),
            3,
            None,
            None,
        );
        let api = YouTubeTranscriptApi::new(None, Some(Box::new(proxy_config)), None)?;

        Ok(Self { api: Some(api) })
    }

    pub fn join_snippets(transcript: &FetchedTranscript) -> String {
        transcript
            .snippets
            .iter()
            .map(|snippet| snippet.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl TranscriptSource for TranscriptService {
    async fn fetch(&self, video_id: &str) -> Result<String> {
        let Some(api) = self.api.as_ref() else {
            tracing::error!("PROXY_USERNAME or PROXY_PASSWORD not set; cannot fetch transcripts");
            return Err(Error::custom("Proxy credentials are not configured"));
        };

        let transcript = api.fetch_transcript(video_id, LANGUAGES, false).await?;
        Ok(Self::join_snippets(&transcript))
    }
}
