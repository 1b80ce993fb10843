use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Parsing errors
    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    #[error("Config parsing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // State errors
    #[error("State file error: {0}")]
    State(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Notification errors
    #[error("Telegram error: {0}")]
    Telegram(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<telegram::TelegramError> for RelayError {
    fn from(err: telegram::TelegramError) -> Self {
        RelayError::Telegram(err.to_string())
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
