use thiserror::Error;

#[derive(Error, Debug)]
pub enum FundScoutError {
    #[error("Source unreachable: {0}")]
    SourceUnreachable(String),

    #[error("Bot defense detected: {0}")]
    BotDefense(String),

    #[error("Malformed AI response: {0}")]
    MalformedAiResponse(String),

    #[error("Invalid candidate: {0}")]
    InvalidCandidate(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
