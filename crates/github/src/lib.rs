//! GitHub REST client used by the progress collector.
//!
//! Wraps the handful of v3 endpoints needed to enumerate an account's
//! repositories and read document sources out of their git trees.

mod client;
mod payloads;

pub use client::{DEFAULT_API_URL, GitHubClient, classify_status};
pub use payloads::{RepoPayload, TreeEntry, TreePayload, UserPayload};
