//! Typed endpoints of the repository-hosting REST API.
//!
//! Every method enforces the status code its operation requires and
//! decodes the body into a model from [`crate::models`]. A wrong status is
//! reported as [`ForgeError::UnexpectedStatus`]; nothing is retried here.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{ForgeError, Result};
use crate::http::Session;
use crate::models::{
    Branch, Commit, ContentFile, ContentUpdate, FileCommit, GitRef, NewPullRequest, NewRef,
    NewRepository, PullRequest, Repository, User,
};

/// Default API root of the public host.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Hosting API bound to one authenticated session.
#[derive(Debug)]
pub struct ForgeApi {
    session: Session,
    base_url: String,
}

impl ForgeApi {
    /// Bind `session` to the API rooted at `base_url` (trailing slashes ignored).
    pub fn new(session: Session, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { session, base_url }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Login of the authenticated user.
    pub fn user(&self) -> &str {
        self.session.user()
    }

    /// Canonical API URL of a repository, as the host echoes it back.
    ///
    /// # Examples
    /// ```
    /// use forge_api::{Credentials, ForgeApi, Session};
    ///
    /// let session = Session::new(Credentials::new("alice", "token")).unwrap();
    /// let api = ForgeApi::new(session, "https://api.example.com/");
    /// assert_eq!(
    ///     api.repository_url("alice", "git_flow_feature_repo"),
    ///     "https://api.example.com/repos/alice/git_flow_feature_repo"
    /// );
    /// ```
    pub fn repository_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{owner}/{repo}", self.base_url)
    }

    /// `GET /users/{login}`
    pub async fn get_user(&self, login: &str) -> Result<User> {
        let url = format!("{}/users/{login}", self.base_url);
        self.send_json("get user", self.session.get(&url), StatusCode::OK)
            .await
    }

    /// `POST /user/repos` with `auto_init` so the default branch exists.
    pub async fn create_repository(&self, name: &str) -> Result<Repository> {
        let url = format!("{}/user/repos", self.base_url);
        let body = NewRepository {
            name,
            auto_init: true,
        };
        self.send_json(
            "create repository",
            self.session.post(&url).json(&body),
            StatusCode::CREATED,
        )
        .await
    }

    /// `GET /repos/{owner}/{repo}`
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        let url = self.repository_url(owner, repo);
        self.send_json("get repository", self.session.get(&url), StatusCode::OK)
            .await
    }

    /// `GET /repos/{owner}/{repo}/git/refs/heads`
    pub async fn list_head_refs(&self, owner: &str, repo: &str) -> Result<Vec<GitRef>> {
        let url = format!("{}/git/refs/heads", self.repository_url(owner, repo));
        self.send_json("list head refs", self.session.get(&url), StatusCode::OK)
            .await
    }

    /// `POST /repos/{owner}/{repo}/git/refs` creating `refs/heads/{branch}` at `sha`.
    pub async fn create_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> Result<GitRef> {
        let url = format!("{}/git/refs", self.repository_url(owner, repo));
        let body = NewRef {
            reference: format!("refs/heads/{branch}"),
            sha,
        };
        self.send_json(
            "create ref",
            self.session.post(&url).json(&body),
            StatusCode::CREATED,
        )
        .await
    }

    /// `GET /repos/{owner}/{repo}/branches`
    pub async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<Branch>> {
        let url = format!("{}/branches", self.repository_url(owner, repo));
        self.send_json("list branches", self.session.get(&url), StatusCode::OK)
            .await
    }

    /// `PUT /repos/{owner}/{repo}/contents/{path}` creating a new file.
    pub async fn put_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        commit: &FileCommit<'_>,
    ) -> Result<ContentUpdate> {
        let url = format!("{}/contents/{path}", self.repository_url(owner, repo));
        self.send_json(
            "put contents",
            self.session.put(&url).json(commit),
            StatusCode::CREATED,
        )
        .await
    }

    /// `GET` on a content URL returned by the host.
    pub async fn get_content(&self, url: &str) -> Result<ContentFile> {
        self.send_json("get content", self.session.get(url), StatusCode::OK)
            .await
    }

    /// `POST /repos/{owner}/{repo}/pulls`
    pub async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        request: &NewPullRequest<'_>,
    ) -> Result<PullRequest> {
        let url = format!("{}/pulls", self.repository_url(owner, repo));
        self.send_json(
            "create pull request",
            self.session.post(&url).json(request),
            StatusCode::CREATED,
        )
        .await
    }

    /// `GET /repos/{owner}/{repo}/pulls/{number}`
    pub async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequest> {
        let url = format!("{}/pulls/{number}", self.repository_url(owner, repo));
        self.send_json("get pull request", self.session.get(&url), StatusCode::OK)
            .await
    }

    /// `GET` on a commit URL taken from a branch listing.
    pub async fn get_commit(&self, url: &str) -> Result<Commit> {
        self.send_json("get commit", self.session.get(url), StatusCode::OK)
            .await
    }

    /// `DELETE /repos/{owner}/{repo}`
    pub async fn delete_repository(&self, owner: &str, repo: &str) -> Result<()> {
        let url = self.repository_url(owner, repo);
        let response = self.session.delete(&url).send().await?;
        check_status("delete repository", response, StatusCode::NO_CONTENT)
            .await
            .map(|_| ())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        expected: StatusCode,
    ) -> Result<T> {
        let response = request.send().await?;
        tracing::debug!(
            operation,
            status = response.status().as_u16(),
            url = %response.url(),
            "API response"
        );
        let response = check_status(operation, response, expected).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ForgeError::contract(operation, format!("undecodable response body: {e}")))
    }
}

async fn check_status(
    operation: &'static str,
    response: reqwest::Response,
    expected: StatusCode,
) -> Result<reqwest::Response> {
    let actual = response.status();
    if actual == expected {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ForgeError::UnexpectedStatus {
        operation,
        expected: expected.as_u16(),
        actual: actual.as_u16(),
        body,
    })
}
