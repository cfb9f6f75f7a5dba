use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "channel-digest")]
#[command(about = "Channel transcript fetcher, summarizer and viewer")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the history file, transcripts and summaries
    #[arg(long, global = true, env = "DIGEST_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    #[command(flatten)]
    pub services: ServiceArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch transcripts for the newest videos of a channel not yet in history
    Fetch {
        /// Channel URL or channel ID
        #[arg(default_value = "UChhw6DlKKTQ9mYSpTfXUYqA")]
        channel: String,

        /// Number of new videos to ingest
        #[arg(default_value_t = 2)]
        limit: usize,
    },

    /// Summarize every stored transcript that has no summary yet
    Summarize,

    /// Serve the web viewer
    Serve {
        /// Address to bind the HTTP server to (host:port)
        #[arg(long, env = "DIGEST_BIND", default_value = "127.0.0.1:5000")]
        bind: String,
    },
}

#[derive(Args, Clone)]
pub struct ServiceArgs {
    /// Rotating proxy username
    #[arg(long, global = true, env = "PROXY_USERNAME", hide_env_values = true)]
    pub proxy_username: Option<String>,

    /// Rotating proxy password
    #[arg(long, global = true, env = "PROXY_PASSWORD", hide_env_values = true)]
    pub proxy_password: Option<String>,

    /// API key for the completion service
    #[arg(long, global = true, env = "OPENROUTER_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible completion service
    #[arg(
        long,
        global = true,
        env = "DIGEST_API_BASE",
        default_value = "https://openrouter.ai/api/v1"
    )]
    pub api_base: String,

    /// Completion model identifier
    #[arg(
        long,
        global = true,
        env = "DIGEST_MODEL",
        default_value = "xiaomi/mimo-v2-flash:free"
    )]
    pub model: String,

    /// yt-dlp executable used for channel listings and metadata lookups
    #[arg(long, global = true, env = "DIGEST_YTDLP", default_value = "yt-dlp")]
    pub ytdlp: String,
}
