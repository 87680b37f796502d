use std::io::{self, BufRead};

use progress_core::RepositorySnapshot;

use crate::words::count_words;

pub fn total_words<'a, I>(snapshots: I) -> u64
where
    I: IntoIterator<Item = &'a RepositorySnapshot>,
{
    snapshots
        .into_iter()
        .fold(0u64, |sum, snapshot| sum.saturating_add(snapshot.words))
}

/// Reads the whole document before counting; math and environments may span lines.
pub fn words_from_reader<R: BufRead>(mut reader: R) -> io::Result<u64> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(count_words(&String::from_utf8_lossy(&buf)))
}
