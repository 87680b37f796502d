use std::time::Instant;

use progress_core::{DocumentPattern, RepoRef, RepositorySnapshot, RepositorySource};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::totals::total_words;
use crate::types::{CollectStats, Result};
use crate::words::count_words_bytes;

#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    pub pattern: DocumentPattern,
    pub include_forks: bool,
}

struct RepoCount {
    snapshot: RepositorySnapshot,
    bytes_read: u64,
}

/// Counts every repository the source exposes. The first error aborts the
/// whole pass, so callers never see a partial total.
pub async fn collect_snapshots(
    source: &dyn RepositorySource,
    options: &CollectOptions,
) -> Result<CollectStats> {
    let started = Instant::now();
    let mut stats = CollectStats::default();
    let repos = source.list_repositories().await?;
    info!(repositories = repos.len(), "listed repositories");

    for repo in repos {
        if repo.fork && !options.include_forks {
            debug!(repository = %repo.full_name(), "skipping fork");
            stats.repositories_skipped += 1;
            continue;
        }
        let counted = count_repository(source, &repo, &options.pattern).await?;
        stats.repositories_scanned += 1;
        stats.files_matched += counted.snapshot.files;
        stats.bytes_read = stats.bytes_read.saturating_add(counted.bytes_read);
        stats.snapshots.push(counted.snapshot);
    }

    stats.total_words = total_words(&stats.snapshots);
    info!(
        scanned = stats.repositories_scanned,
        skipped = stats.repositories_skipped,
        files = stats.files_matched,
        words = stats.total_words,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "counted document sources"
    );
    Ok(stats)
}

async fn count_repository(
    source: &dyn RepositorySource,
    repo: &RepoRef,
    pattern: &DocumentPattern,
) -> Result<RepoCount> {
    let full_name = repo.full_name();
    let matched = source
        .list_files(repo)
        .await?
        .into_iter()
        .filter(|file| pattern.matches(&file.path))
        .collect::<Vec<_>>();

    let mut contents = Vec::with_capacity(matched.len());
    for file in &matched {
        contents.push(source.fetch_file(repo, file).await?);
    }

    let bytes_read = contents.iter().map(|content| content.len() as u64).sum();
    let words = contents
        .par_iter()
        .map(|content| count_words_bytes(content))
        .sum::<u64>();

    debug!(
        repository = %full_name,
        files = matched.len(),
        words,
        "counted repository"
    );
    Ok(RepoCount {
        snapshot: RepositorySnapshot {
            repository: full_name,
            files: matched.len(),
            words,
        },
        bytes_read,
    })
}
