//! GitHub repository contents API client.
//!
//! Reads and writes files in a repository via the contents endpoint, which
//! is how articles are published and the content plan is persisted. Writes
//! against an existing file carry the revision (blob sha) read earlier, so
//! a concurrent change surfaces as a conflict instead of a lost update.

pub mod plan;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use contentpilot_shared::{ContentPilotError, Result, Revision};

pub use plan::{fetch_plan, write_plan};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Default timeout in seconds for contents API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for GitHub requests.
const USER_AGENT: &str = concat!("ContentPilot/", env!("CARGO_PKG_VERSION"));

/// Media type pinning the v3 REST representation.
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for the contents API client.
#[derive(Debug, Clone)]
pub struct GithubOptions {
    /// API base, e.g. `https://api.github.com`.
    pub api_base: String,
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch commits are written to.
    pub branch: String,
    /// Personal access token.
    pub token: String,
    /// Timeout for requests in seconds.
    pub timeout_secs: u64,
}

impl GithubOptions {
    /// Options for the given repository against the public API.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            api_base: "https://api.github.com".into(),
            owner: owner.into(),
            repo: repo.into(),
            branch: "main".into(),
            token: token.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    /// Base64-encoded file content, wrapped with newlines by the API.
    content: String,
    /// Blob sha of the file at read time.
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A file read from the repository.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// Decoded UTF-8 content.
    pub text: String,
    /// Revision backing a later conditional write.
    pub revision: Revision,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Async client for one repository's contents endpoint.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    api_base: String,
    owner: String,
    repo: String,
    branch: String,
    token: String,
}

impl GithubClient {
    /// Build a client from options.
    pub fn new(opts: GithubOptions) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(std::time::Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| {
                ContentPilotError::RemoteRead(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            api_base: opts.api_base,
            owner: opts.owner,
            repo: opts.repo,
            branch: opts.branch,
            token: opts.token,
        })
    }

    /// The branch this client commits to.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    /// Fetch a file's decoded content and current revision.
    #[instrument(skip_all, fields(path = %path))]
    pub async fn get_file(&self, path: &str) -> Result<RemoteFile> {
        let url = self.contents_url(path);
        debug!(%url, "fetching file");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, format!("token {}", self.token))
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .send()
            .await
            .map_err(|e| ContentPilotError::RemoteRead(format!("{url}: {e}")))?;

        let status = response.status();
        let raw = response.text().await.map_err(|e| {
            ContentPilotError::RemoteRead(format!("{url}: failed to read body: {e}"))
        })?;

        if !status.is_success() {
            return Err(ContentPilotError::RemoteRead(read_failure(
                &url, status, &raw,
            )));
        }

        let payload: ContentsResponse = serde_json::from_str(&raw).map_err(|e| {
            ContentPilotError::RemoteRead(format!("{url}: unexpected response shape: {e}"))
        })?;

        // The API wraps base64 at 60 columns; strip the whitespace first.
        let compact: String = payload
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ContentPilotError::parse(format!("{path}: invalid base64 content: {e}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| ContentPilotError::parse(format!("{path}: content is not UTF-8: {e}")))?;

        Ok(RemoteFile {
            text,
            revision: Revision(payload.sha),
        })
    }

    /// Create or update a file with a commit.
    ///
    /// Pass the revision from a prior [`get_file`](Self::get_file) when
    /// updating; omit it when creating. A revision mismatch on the remote
    /// side returns [`ContentPilotError::Conflict`].
    #[instrument(skip_all, fields(path = %path))]
    pub async fn put_file(
        &self,
        path: &str,
        text: &str,
        message: &str,
        revision: Option<&Revision>,
    ) -> Result<()> {
        let url = self.contents_url(path);
        debug!(%url, message, "committing file");

        let payload = PutContentsRequest {
            message,
            content: STANDARD.encode(text.as_bytes()),
            branch: &self.branch,
            sha: revision.map(Revision::as_str),
        };

        let response = self
            .http
            .put(&url)
            .header(reqwest::header::AUTHORIZATION, format!("token {}", self.token))
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ContentPilotError::RemoteWrite(format!("{url}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "file committed");
            return Ok(());
        }

        let raw = response.text().await.unwrap_or_default();
        let detail = error_detail(status, &raw);

        // A stale sha comes back as 409, or as 422 naming the sha field.
        let conflict = status == reqwest::StatusCode::CONFLICT
            || (status == reqwest::StatusCode::UNPROCESSABLE_ENTITY && detail.contains("sha"));
        if conflict {
            return Err(ContentPilotError::Conflict(format!("{path}: {detail}")));
        }

        Err(ContentPilotError::RemoteWrite(format!("{url}: {detail}")))
    }
}

fn read_failure(url: &str, status: reqwest::StatusCode, raw: &str) -> String {
    format!("{url}: {}", error_detail(status, raw))
}

/// Render `HTTP {status}` plus the API's message field when present.
fn error_detail(status: reqwest::StatusCode, raw: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(raw) {
        Ok(body) => format!("HTTP {status}: {}", body.message),
        Err(_) => format!("HTTP {status}"),
    }
}
