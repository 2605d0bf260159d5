use std::time::Duration;

pub type FfgraphResult<T> = Result<T, FfgraphError>;

#[derive(thiserror::Error, Debug)]
pub enum FfgraphError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("process error: {0}")]
    Process(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FfgraphError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn process(msg: impl Into<String>) -> Self {
        Self::Process(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<serde_json::Error> for FfgraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}
