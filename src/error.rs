use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, From)]
#[display("{self:?}")]
pub enum Error {
    #[from(String, &String, &str)]
    Custom(String),

    MissingApiKey {
        env_var: &'static str,
    },

    // -- Externals
    #[from]
    Io(std::io::Error),
    #[from]
    Json(serde_json::Error),
    #[from]
    OpenAi(async_openai::error::OpenAIError),
    #[from]
    Transcript(yt_transcript_rs::errors::CouldNotRetrieveTranscript),
    #[from]
    Cookie(yt_transcript_rs::errors::CookieError),
    #[from]
    AddrParse(std::net::AddrParseError),
}

impl Error {
    pub fn custom(val: impl std::fmt::Display) -> Self {
        Self::Custom(val.to_string())
    }
}

impl std::error::Error for Error {}
