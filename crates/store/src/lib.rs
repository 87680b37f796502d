mod artifacts;
mod error;
mod history;

pub use artifacts::{
    Artifact, WriteOutcome, content_digest, file_digest, write_artifacts,
};
pub use error::{Result, StoreError};
pub use history::{encode_series, load_series};
