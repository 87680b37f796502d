use serde::Serialize;
use std::io;

use progress_core::{RepositorySnapshot, SourceError};

/// Summary of one counting pass across every repository.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectStats {
    pub repositories_scanned: usize,
    pub repositories_skipped: usize,
    pub files_matched: usize,
    pub bytes_read: u64,
    pub total_words: u64,
    pub snapshots: Vec<RepositorySnapshot>,
}

/// Errors emitted while counting.
#[derive(Debug)]
pub enum IngestError {
    Source(SourceError),
    Io(io::Error),
}

impl IngestError {
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Source(err) if err.is_authorization())
    }
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for IngestError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<SourceError> for IngestError {
    fn from(err: SourceError) -> Self {
        Self::Source(err)
    }
}

impl From<walkdir::Error> for IngestError {
    fn from(err: walkdir::Error) -> Self {
        Self::Io(err.into())
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
