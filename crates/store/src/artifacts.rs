use std::fmt::Write as _;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Result, StoreError};

/// Bytes destined for a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut out, "{:02x}", byte);
    }
    out
}

pub fn content_digest(bytes: &[u8]) -> String {
    hex_digest(&Sha256::digest(bytes))
}

/// Digest of the file on disk, `None` when it does not exist.
pub fn file_digest(path: &Path) -> Result<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(content_digest(&bytes))),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StoreError::io(path, err)),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{}.tmp-{}", name, std::process::id()))
}

fn stage(artifact: &Artifact) -> Result<PathBuf> {
    if let Some(parent) = artifact.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
    }
    let temp = temp_path(&artifact.path);
    let mut file = fs::File::create(&temp).map_err(|err| StoreError::io(&temp, err))?;
    file.write_all(&artifact.bytes)
        .and_then(|_| file.sync_all())
        .map_err(|err| StoreError::io(&temp, err))?;
    Ok(temp)
}

/// Writes a group of artifacts. Files whose content would not change are left
/// untouched.
///
/// Every changed artifact is first written to a sibling temp file; only when
/// all of them staged successfully are they renamed into place. A staging
/// failure replaces nothing. A failed rename leaves the files renamed before
/// it in place and removes the remaining temp files.
pub fn write_artifacts(artifacts: &[Artifact]) -> Result<Vec<WriteOutcome>> {
    let mut outcomes = Vec::with_capacity(artifacts.len());
    let mut pending = Vec::new();
    for artifact in artifacts {
        let current = file_digest(&artifact.path)?;
        if current.as_deref() == Some(content_digest(&artifact.bytes).as_str()) {
            debug!(path = %artifact.path.display(), "artifact unchanged");
            outcomes.push(WriteOutcome::Unchanged);
            continue;
        }
        outcomes.push(WriteOutcome::Written);
        pending.push(artifact);
    }

    let mut staged = Vec::with_capacity(pending.len());
    for artifact in &pending {
        match stage(artifact) {
            Ok(temp) => staged.push(temp),
            Err(err) => {
                discard(&staged);
                return Err(err);
            }
        }
    }

    let targets = pending
        .iter()
        .map(|artifact| artifact.path.as_path())
        .collect::<Vec<_>>();
    commit_staged(&targets, &staged)?;
    for artifact in &pending {
        info!(
            path = %artifact.path.display(),
            bytes = artifact.bytes.len(),
            "artifact written"
        );
    }
    Ok(outcomes)
}

fn commit_staged(targets: &[&Path], staged: &[PathBuf]) -> Result<()> {
    for (index, (target, temp)) in targets.iter().zip(staged).enumerate() {
        if let Err(err) = fs::rename(temp, target) {
            discard(&staged[index..]);
            return Err(StoreError::io(*target, err));
        }
    }
    Ok(())
}

fn discard(staged: &[PathBuf]) {
    for temp in staged {
        let _ = fs::remove_file(temp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            content_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn unchanged_content_is_not_rewritten() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("assets/chart.svg");
        let artifact = Artifact::new(&path, b"<svg/>".to_vec());

        let first = write_artifacts(std::slice::from_ref(&artifact)).expect("write");
        assert_eq!(first, vec![WriteOutcome::Written]);
        let modified = fs::metadata(&path).and_then(|meta| meta.modified()).expect("mtime");

        let second = write_artifacts(std::slice::from_ref(&artifact)).expect("write");
        assert_eq!(second, vec![WriteOutcome::Unchanged]);
        let after = fs::metadata(&path).and_then(|meta| meta.modified()).expect("mtime");
        assert_eq!(modified, after);
    }

    #[test]
    fn failed_rename_removes_remaining_temp_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = dir.path().join("history.json");
        fs::write(&first, "old").expect("seed");
        // A non-empty directory cannot be replaced by a file.
        let second = dir.path().join("chart.svg");
        fs::create_dir_all(second.join("inner")).expect("dir");

        let staged = vec![
            stage(&Artifact::new(&first, "new")).expect("stage"),
            stage(&Artifact::new(&second, "<svg/>")).expect("stage"),
        ];
        let err = commit_staged(&[first.as_path(), second.as_path()], &staged);

        assert!(err.is_err());
        assert_eq!(fs::read_to_string(&first).expect("read"), "new");
        assert!(staged.iter().all(|temp| !temp.exists()));
    }

    #[test]
    fn failed_staging_leaves_every_file_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = dir.path().join("history.json");
        fs::write(&good, "old").expect("seed");
        // A regular file where a parent directory is needed makes the group fail.
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "file").expect("blocker");
        let bad = blocker.join("chart.svg");

        let err = write_artifacts(&[Artifact::new(&good, "new"), Artifact::new(&bad, "<svg/>")]);
        assert!(err.is_err());
        assert_eq!(fs::read_to_string(&good).expect("read"), "old");
        let leftovers = fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp-"))
            .count();
        assert_eq!(leftovers, 0);
    }
}
