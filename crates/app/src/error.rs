use ingest::IngestError;
use progress_core::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("authorization error: {0}")]
    Authorization(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("render error: {0}")]
    Render(#[from] progress_chart::RenderError),
    #[error("store error: {0}")]
    Store(#[from] progress_store::StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    InvalidInput(String),
    #[error("publish error: {0}")]
    Publish(String),
}

impl AppError {
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Authorization(message) => Self::Authorization(message),
            SourceError::Network(message) => Self::Network(message),
            SourceError::Io(err) => Self::Io(err),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Source(err) => err.into(),
            IngestError::Io(err) => Self::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_errors_keep_their_kind() {
        let err = AppError::from(IngestError::Source(SourceError::Authorization(
            "bad credentials".to_string(),
        )));
        assert!(err.is_authorization());
        assert_eq!(err.to_string(), "authorization error: bad credentials");

        let err = AppError::from(SourceError::Network("timed out".to_string()));
        assert!(matches!(err, AppError::Network(_)));
    }
}
