use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use progress_core::{
    DocumentPattern, RepoFile, RepoRef, RepositorySnapshot, RepositorySource, SourceError,
};
use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

use crate::types::Result;
use crate::words::count_words_bytes;

/// Repositories checked out under one directory, one per subdirectory.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
    owner: String,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>, owner: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            owner: owner.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn relative_path(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn walk_files(base: &Path) -> io::Result<Vec<RepoFile>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(base)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        files.push(RepoFile {
            path: relative_path(base, entry.path()),
            handle: entry.path().to_string_lossy().to_string(),
        });
    }
    Ok(files)
}

#[async_trait]
impl RepositorySource for LocalSource {
    async fn list_repositories(&self) -> std::result::Result<Vec<RepoRef>, SourceError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            names.push(name);
        }
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| RepoRef {
                owner: self.owner.clone(),
                name,
                default_branch: None,
                fork: false,
            })
            .collect())
    }

    async fn list_files(&self, repo: &RepoRef) -> std::result::Result<Vec<RepoFile>, SourceError> {
        Ok(walk_files(&self.root.join(&repo.name))?)
    }

    async fn fetch_file(
        &self,
        _repo: &RepoRef,
        file: &RepoFile,
    ) -> std::result::Result<Vec<u8>, SourceError> {
        Ok(fs::read(&file.handle)?)
    }
}

/// Counts one directory tree without going through a [`RepositorySource`].
pub fn count_local_tree(path: &Path, pattern: &DocumentPattern) -> Result<RepositorySnapshot> {
    let files = walk_files(path)?
        .into_iter()
        .filter(|file| pattern.matches(&file.path))
        .collect::<Vec<_>>();
    let words = files
        .par_iter()
        .map(|file| fs::read(&file.handle).map(|content| count_words_bytes(&content)))
        .collect::<io::Result<Vec<_>>>()?
        .into_iter()
        .sum();
    Ok(RepositorySnapshot {
        repository: path.to_string_lossy().to_string(),
        files: files.len(),
        words,
    })
}
