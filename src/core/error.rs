use thiserror::Error;

/// Failure kinds surfaced by the session, the extractor and the engines.
///
/// `Transient`, `Parse` and `Unrecoverable` end the current activity (a
/// pairing, a sweep cell, a battle). The loops built on top decide whether
/// to continue; nothing here ever stops the process.
#[derive(Error, Debug)]
pub enum PilotError {
    #[error("Transient error: {0}")]
    Transient(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unrecoverable: {0}")]
    Unrecoverable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl PilotError {
    pub fn parse(what: impl Into<String>) -> Self {
        Self::Parse(what.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<reqwest::Error> for PilotError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transient(e.to_string())
    }
}

impl From<toml::de::Error> for PilotError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PilotError>;
