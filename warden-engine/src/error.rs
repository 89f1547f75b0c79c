use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
