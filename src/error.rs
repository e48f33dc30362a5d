use thiserror::Error;

pub type Result<T> = std::result::Result<T, JumperError>;

#[derive(Error, Debug)]
pub enum JumperError {
    /// A field the classifier cannot work without is absent from the host snapshot.
    #[error("Missing upstream data: {0}")]
    MissingUpstream(&'static str),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(#[from] serde_json::Error),

    #[error("Store error for {key}: {message}")]
    Store { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl JumperError {
    pub fn store(key: &str, message: impl Into<String>) -> Self {
        Self::Store {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Upstream data problems abort the indexing pass; everything else is local to one unit of work.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::MissingUpstream(_) | Self::MalformedSnapshot(_))
    }
}
