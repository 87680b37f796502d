use progress_core::{RepoFile, RepoRef};
use serde::Deserialize;

/// `GET /user`
#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct OwnerPayload {
    pub login: String,
}

/// One element of `GET /user/repos` and `GET /users/{account}/repos`.
#[derive(Debug, Deserialize)]
pub struct RepoPayload {
    pub name: String,
    pub owner: OwnerPayload,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub fork: bool,
}

impl From<RepoPayload> for RepoRef {
    fn from(payload: RepoPayload) -> Self {
        Self {
            owner: payload.owner.login,
            name: payload.name,
            default_branch: payload.default_branch,
            fork: payload.fork,
        }
    }
}

/// `GET /repos/{owner}/{repo}/git/trees/{ref}?recursive=1`
#[derive(Debug, Deserialize)]
pub struct TreePayload {
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

impl TreePayload {
    /// Blob entries only; trees and submodule commits carry no content.
    pub fn into_files(self) -> Vec<RepoFile> {
        self.tree
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .map(|entry| RepoFile {
                path: entry.path,
                handle: entry.sha,
            })
            .collect()
    }
}
