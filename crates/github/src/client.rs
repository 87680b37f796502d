use std::time::Duration;

use async_trait::async_trait;
use progress_core::{Credential, RepoFile, RepoRef, RepositorySource, SourceError};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::payloads::{RepoPayload, TreePayload, UserPayload};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";
const API_VERSION: &str = "2022-11-28";
const DEFAULT_PAGE_SIZE: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CLIENT_USER_AGENT: &str = concat!("texprogress/", env!("CARGO_PKG_VERSION"));

/// Read-only client for one account's repositories.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    credential: Credential,
    account: Option<String>,
    page_size: u32,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("account", &self.account)
            .field("credential", &self.credential)
            .finish()
    }
}

impl GitHubClient {
    pub fn new(credential: Credential) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(network)?;
        Ok(Self::with_client(client, DEFAULT_API_URL, credential))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            credential,
            account: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Count another account's public repositories instead of the token owner's.
    pub fn with_account(mut self, account: Option<String>) -> Self {
        self.account = account.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }

    /// `GET /user`. Also the cheapest way to validate the credential up front.
    pub async fn authenticated_login(&self) -> Result<String, SourceError> {
        let url = self.endpoint(&["user"])?;
        let user: UserPayload = self.get_json(url, "authenticated user").await?;
        Ok(user.login)
    }

    async fn list_repository_page(
        &self,
        login: &str,
        page: u32,
    ) -> Result<Vec<RepoPayload>, SourceError> {
        let mut url = match self.account.as_deref() {
            Some(account) if !account.eq_ignore_ascii_case(login) => {
                let mut url = self.endpoint(&["users", account, "repos"])?;
                url.query_pairs_mut().append_pair("type", "owner");
                url
            }
            _ => {
                let mut url = self.endpoint(&["user", "repos"])?;
                url.query_pairs_mut().append_pair("affiliation", "owner");
                url
            }
        };
        url.query_pairs_mut()
            .append_pair("per_page", &self.page_size.to_string())
            .append_pair("page", &page.to_string());
        self.get_json(url, "repository list").await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.api_url).map_err(|err| {
            SourceError::Network(format!("invalid api url {}: {}", self.api_url, err))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                SourceError::Network(format!("api url {} cannot be a base", self.api_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn headers(&self, accept: &'static str) -> Result<HeaderMap, SourceError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.credential.expose()))
            .map_err(|_| {
                SourceError::Authorization("credential contains invalid characters".to_string())
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        Ok(headers)
    }

    async fn execute(
        &self,
        url: Url,
        accept: &'static str,
    ) -> Result<reqwest::Response, SourceError> {
        debug!(%url, "github request");
        self.client
            .get(url)
            .headers(self.headers(accept)?)
            .send()
            .await
            .map_err(network)
    }

    async fn send(
        &self,
        url: Url,
        accept: &'static str,
        context: &str,
    ) -> Result<reqwest::Response, SourceError> {
        let response = self.execute(url, accept).await?;
        ensure_success(response, context).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, SourceError> {
        let response = self.send(url, JSON_MEDIA_TYPE, context).await?;
        decode_json(response, context).await
    }
}

async fn ensure_success(
    response: reqwest::Response,
    context: &str,
) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(classify_status(status, context, &body))
}

async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<T, SourceError> {
    response
        .json::<T>()
        .await
        .map_err(|err| SourceError::Network(format!("decode {}: {}", context, err)))
}

/// Maps a non-success status to the collector's error taxonomy.
pub fn classify_status(status: StatusCode, context: &str, body: &str) -> SourceError {
    match status {
        StatusCode::UNAUTHORIZED => {
            SourceError::Authorization(format!("{}: credential missing or invalid", context))
        }
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
            if body.to_ascii_lowercase().contains("rate limit") =>
        {
            SourceError::Network(format!("{}: rate limited ({})", context, status))
        }
        StatusCode::FORBIDDEN => {
            SourceError::Authorization(format!("{}: credential lacks read access", context))
        }
        StatusCode::NOT_FOUND => SourceError::Authorization(format!(
            "{}: not found or not readable with this credential",
            context
        )),
        _ => SourceError::Network(format!("{}: unexpected status {}", context, status)),
    }
}

fn network(err: reqwest::Error) -> SourceError {
    SourceError::Network(err.to_string())
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn list_repositories(&self) -> Result<Vec<RepoRef>, SourceError> {
        let login = self.authenticated_login().await?;
        let mut repos = Vec::new();
        let mut page = 1u32;
        loop {
            let batch = self.list_repository_page(&login, page).await?;
            let fetched = batch.len();
            repos.extend(batch.into_iter().map(RepoRef::from));
            if fetched < self.page_size as usize {
                break;
            }
            page += 1;
        }
        debug!(login = %login, repositories = repos.len(), pages = page, "listed repositories");
        Ok(repos)
    }

    async fn list_files(&self, repo: &RepoRef) -> Result<Vec<RepoFile>, SourceError> {
        let Some(branch) = repo.default_branch.as_deref() else {
            return Ok(Vec::new());
        };
        let mut url = self.endpoint(&["repos", &repo.owner, &repo.name, "git", "trees", branch])?;
        url.query_pairs_mut().append_pair("recursive", "1");
        let context = format!("tree of {}", repo.full_name());
        let response = self.execute(url, JSON_MEDIA_TYPE).await?;
        // The tree endpoint answers 409 for repositories without commits.
        if response.status() == StatusCode::CONFLICT {
            debug!(repository = %repo.full_name(), "empty repository");
            return Ok(Vec::new());
        }
        let response = ensure_success(response, &context).await?;
        let tree: TreePayload = decode_json(response, &context).await?;
        // A truncated listing would record a partial total as the full day.
        if tree.truncated {
            warn!(repository = %repo.full_name(), "git tree truncated by the api");
            return Err(SourceError::Network(format!(
                "{}: listing truncated by the api",
                context
            )));
        }
        Ok(tree.into_files())
    }

    async fn fetch_file(&self, repo: &RepoRef, file: &RepoFile) -> Result<Vec<u8>, SourceError> {
        let url = self.endpoint(&["repos", &repo.owner, &repo.name, "git", "blobs", &file.handle])?;
        let context = format!("{} in {}", file.path, repo.full_name());
        let response = self.send(url, RAW_MEDIA_TYPE, &context).await?;
        let bytes = response.bytes().await.map_err(network)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> GitHubClient {
        let credential = Credential::new("s3cret").expect("credential");
        GitHubClient::with_client(reqwest::Client::new(), api_url, credential)
    }

    #[test]
    fn endpoint_encodes_segments() {
        let client = client("https://api.github.com");
        let url = client
            .endpoint(&["repos", "me", "thesis", "git", "trees", "feature/draft"])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/me/thesis/git/trees/feature%2Fdraft"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = client("https://ghe.example.com/api/v3/");
        let url = client.endpoint(&["user"]).expect("url");
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/user");
    }

    #[test]
    fn classify_status_maps_authorization_failures() {
        assert!(classify_status(StatusCode::UNAUTHORIZED, "user", "").is_authorization());
        assert!(
            classify_status(StatusCode::FORBIDDEN, "user", "Resource not accessible")
                .is_authorization()
        );
        assert!(classify_status(StatusCode::NOT_FOUND, "tree", "").is_authorization());
    }

    #[test]
    fn classify_status_treats_rate_limit_as_network() {
        let err = classify_status(StatusCode::FORBIDDEN, "user", "API rate limit exceeded");
        assert!(matches!(err, SourceError::Network(_)));
        let err = classify_status(StatusCode::BAD_GATEWAY, "user", "");
        assert!(matches!(err, SourceError::Network(_)));
    }

    #[test]
    fn debug_output_hides_token() {
        let client = client("https://api.github.com");
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("Credential(***)"));
    }
}
