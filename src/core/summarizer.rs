use crate::config::Config;
use crate::core::storage::{Storage, sanitize_video_id};
use crate::error::{Error, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{
        CreateResponseArgs, EasyInputMessageArgs, InputItem, InputParam, OutputItem,
        OutputMessageContent, Role,
    },
};
use async_trait::async_trait;
use tracing::{info, warn};

pub const FAILURE_SENTINEL: &str = "Failed to generate valid summary after multiple retries.";

/// Markers a reply must carry before it is accepted.
const REQUIRED_MARKERS: [&str; 3] = ["Question 1.", "Question 2.", "Question 3."];

const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Given a prompt, returns the model's text reply.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct OpenAiCompletion {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiCompletion {
    pub fn new(config: &Config) -> Self {
        let client = config.api_key.as_ref().map(|key| {
            Client::with_config(
                OpenAIConfig::new()
                    .with_api_key(key)
                    .with_api_base(&config.api_base),
            )
        });
        Self {
            client,
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let client = self.client.as_ref().ok_or(Error::MissingApiKey {
            env_var: "OPENROUTER_KEY",
        })?;

        let request = CreateResponseArgs::default()
            .max_output_tokens(MAX_OUTPUT_TOKENS)
            .model(&self.model)
            .input(InputParam::Items(vec![InputItem::EasyMessage(
                EasyInputMessageArgs::default()
                    .role(Role::User)
                    .content(prompt)
                    .build()?,
            )]))
            .build()?;

        let response = client.responses().create(request).await?;

        let mut content = String::new();
        for output in response.output {
            if let OutputItem::Message(out) = output {
                for c in out.content {
                    match c {
                        OutputMessageContent::OutputText(text) => content.push_str(&text.text),
                        _ => {
                            warn!("Unexpected content type: {c:?}");
                            continue;
                        }
                    }
                }
            }
        }

        Ok(content)
    }
}

/// The fixed instruction text. Spelling and indentation are kept as the prompt was tuned.
pub fn build_prompt(transcript: &str) -> String {
    format!(
        r#"
    You are a helpful concise assistant that answers questions about YouTube videos by Pat Walls at Starter Story.
    Pat Walls interviews entreprenuers building products. We don't care about pat walls so do not talk much about him.
    Focus on the person being interviewed, which we well refer to as the subject from now on.
    Here is the YouTube video transcript.
    Transcript:
    """
    {transcript}
    """
    Please answer the following questions, read the questions carefully and make sure you do not duplicate too much information between answers:
    1. Explain briefly who the subject is.
    2. Explain in detail what the subject built.
    3. Explain in one sentence the main strategy used by the subject.
    4. Explain the playbook used by the subject. You should go into some detail here and assume the reader is a complete beginner so you should explain concepts.
    5. Explain the tech stack used by the subject.
    6. What is the advice given by the subject at the end.
    
    you should return the answers in the following template, do not add any extra words or include the question itself in the response:
    
    Question 1.
    Question 2.
    Question 3.
    Question 4.
    Question 5.
    Question 6.
    "#
    )
}

pub fn has_required_markers(reply: &str) -> bool {
    REQUIRED_MARKERS.iter().all(|marker| reply.contains(marker))
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SummarizeReport {
    pub summarized: Vec<String>,
    pub failed: Vec<String>,
    pub already_done: usize,
    pub empty: usize,
    pub rejected: usize,
}

pub struct SummaryGenerator<'a> {
    completion: &'a dyn CompletionService,
    storage: &'a Storage,
    max_attempts: usize,
}

impl<'a> SummaryGenerator<'a> {
    pub fn new(
        completion: &'a dyn CompletionService,
        storage: &'a Storage,
        max_attempts: usize,
    ) -> Self {
        Self {
            completion,
            storage,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Asks for a summary until a reply passes validation or attempts run out.
    /// Exhaustion yields [`FAILURE_SENTINEL`] instead of an error.
    pub async fn summarize(&self, transcript: &str) -> String {
        let prompt = build_prompt(transcript);

        for attempt in 1..=self.max_attempts {
            match self.completion.complete(&prompt).await {
                Ok(reply) if has_required_markers(&reply) => return reply,
                Ok(_) => warn!(
                    "Attempt {attempt} failed validation (missing 'Question X.' format). Retrying..."
                ),
                Err(e) => warn!("An error occurred during summarization (Attempt {attempt}): {e}"),
            }
        }

        FAILURE_SENTINEL.to_string()
    }

    /// Summarizes every stored record that has a transcript and no summary yet, one at a time.
    pub async fn run(&self) -> Result<SummarizeReport> {
        let mut report = SummarizeReport::default();

        let records = self.storage.list_records().await?;
        if records.is_empty() {
            info!("No stored transcripts found.");
            return Ok(report);
        }

        for record in records {
            if let Err(e) = sanitize_video_id(&record.id) {
                warn!("Skipping record with unusable id {:?}: {e}", record.id);
                report.rejected += 1;
                continue;
            }

            if self.storage.summary_exists(&record.id) {
                info!("Summary for {} already exists. Skipping.", record.id);
                report.already_done += 1;
                continue;
            }

            if record.transcript.trim().is_empty() {
                info!("No transcript found for {}. Skipping.", record.id);
                report.empty += 1;
                continue;
            }

            info!("Summarizing {}...", record.id);
            let summary = self.summarize(&record.transcript).await;
            let path = self.storage.save_summary(&record.id, &summary).await?;
            info!("Saved summary to {}", path.display());

            if summary == FAILURE_SENTINEL {
                report.failed.push(record.id);
            } else {
                report.summarized.push(record.id);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::VideoRecord;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const VALID: &str = "Question 1.\nA founder.\nQuestion 2.\nAn app.\nQuestion 3.\nSEO.\n\
                         Question 4.\nSteps.\nQuestion 5.\nRails.\nQuestion 6.\nShip it.";
    const MISSING_TWO: &str = "Question 1.\nA founder.\nQuestion 3.\nSEO.";

    struct ScriptedCompletion {
        replies: Mutex<VecDeque<Result<String>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedCompletion {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedCompletion {
        async fn complete(&self, prompt: &str) -> Result<String> {
            assert!(prompt.contains("Question 6."));
            *self.calls.lock().unwrap() += 1;
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::custom("script exhausted")))
        }
    }

    async fn store_record(storage: &Storage, id: &str, transcript: &str) {
        storage
            .save_record(&VideoRecord {
                id: id.to_string(),
                title: Some(id.to_string()),
                upload_date: Some("20240101".to_string()),
                transcript: transcript.to_string(),
            })
            .await
            .unwrap();
    }

    #[test]
    fn prompt_embeds_transcript_and_template() {
        let prompt = build_prompt("we hit 20k MRR");
        assert!(prompt.contains("    \"\"\"\n    we hit 20k MRR\n    \"\"\""));
        assert!(prompt.starts_with("\n    You are a helpful concise assistant"));
        assert!(prompt.contains("Pat Walls interviews entreprenuers building products."));
        for n in 1..=6 {
            assert!(prompt.contains(&format!("Question {n}.")));
        }
    }

    #[test]
    fn validation_needs_first_three_markers() {
        assert!(has_required_markers(VALID));
        assert!(!has_required_markers(MISSING_TWO));
        assert!(has_required_markers("Question 1. Question 2. Question 3."));
    }

    #[tokio::test]
    async fn third_attempt_success_is_kept() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        store_record(&storage, "vid", "some words").await;

        let completion = ScriptedCompletion::new(vec![
            Ok(MISSING_TWO.to_string()),
            Ok(MISSING_TWO.to_string()),
            Ok(VALID.to_string()),
            Ok(VALID.to_string()),
        ]);
        let report = SummaryGenerator::new(&completion, &storage, 3)
            .run()
            .await
            .unwrap();

        assert_eq!(completion.calls(), 3);
        assert_eq!(report.summarized, vec!["vid"]);
        assert_eq!(storage.load_summary("vid").await.unwrap().as_deref(), Some(VALID));
    }

    #[tokio::test]
    async fn exhausted_attempts_persist_sentinel() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        store_record(&storage, "vid", "some words").await;

        let completion = ScriptedCompletion::new(vec![
            Err(Error::custom("503")),
            Ok(MISSING_TWO.to_string()),
            Err(Error::custom("timeout")),
        ]);
        let report = SummaryGenerator::new(&completion, &storage, 3)
            .run()
            .await
            .unwrap();

        assert_eq!(completion.calls(), 3);
        assert_eq!(report.failed, vec!["vid"]);
        assert_eq!(
            storage.load_summary("vid").await.unwrap().as_deref(),
            Some(FAILURE_SENTINEL)
        );
    }

    #[tokio::test]
    async fn existing_summaries_and_empty_transcripts_are_skipped() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        store_record(&storage, "done", "words").await;
        store_record(&storage, "blank", "   ").await;
        storage.save_summary("done", "old reply").await.unwrap();

        let completion = ScriptedCompletion::new(Vec::new());
        let report = SummaryGenerator::new(&completion, &storage, 3)
            .run()
            .await
            .unwrap();

        assert_eq!(completion.calls(), 0);
        assert_eq!(report.already_done, 1);
        assert_eq!(report.empty, 1);
        assert!(!storage.summary_exists("blank"));
        assert_eq!(
            storage.load_summary("done").await.unwrap().as_deref(),
            Some("old reply")
        );
    }

    #[tokio::test]
    async fn bad_record_id_does_not_stop_the_pass() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        store_record(&storage, "good", "some words").await;
        std::fs::write(
            dir.path().join("transcripts").join("a.json"),
            r#"{"video_id": "bad id", "title": "x", "upload_date": null, "transcript": "words"}"#,
        )
        .unwrap();

        let completion = ScriptedCompletion::new(vec![Ok(VALID.to_string())]);
        let report = SummaryGenerator::new(&completion, &storage, 3)
            .run()
            .await
            .unwrap();

        assert_eq!(completion.calls(), 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.summarized, vec!["good"]);
        assert!(storage.summary_exists("good"));
    }

    #[tokio::test]
    async fn missing_api_key_fails_each_attempt() {
        let dir = TempDir::new().unwrap();
        let args = crate::cli::ServiceArgs {
            proxy_username: None,
            proxy_password: None,
            api_key: None,
            api_base: "http://127.0.0.1:9/v1".to_string(),
            model: "test".to_string(),
            ytdlp: "yt-dlp".to_string(),
        };
        let config = Config::from_args(dir.path().to_path_buf(), args);
        let completion = OpenAiCompletion::new(&config);

        let err = completion.complete("hi").await.unwrap_err();
        assert!(matches!(err, Error::MissingApiKey { .. }));
    }
}
