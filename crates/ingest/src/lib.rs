mod local;
mod pipeline;
mod totals;
mod types;
mod words;

pub use local::{LocalSource, count_local_tree};
pub use pipeline::{CollectOptions, collect_snapshots};
pub use totals::{total_words, words_from_reader};
pub use types::{CollectStats, IngestError, Result};
pub use words::{count_words, count_words_bytes, strip_latex};
