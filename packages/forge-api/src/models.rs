//! Request and response payloads for the hosting API.
//!
//! Only the fields the flow reads are modelled; everything else in the
//! host's responses is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// Profile returned by `GET /users/{user}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
}

/// Repository returned by `POST /user/repos` and `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Git object a ref points at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitObject {
    pub sha: String,
}

/// Entry of `GET /repos/{owner}/{repo}/git/refs/heads`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub reference: String,
    pub object: GitObject,
}

/// Commit pointer embedded in a branch listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchCommit {
    pub sha: String,
    pub url: String,
}

/// Entry of `GET /repos/{owner}/{repo}/branches`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: BranchCommit,
}

/// Content metadata (`content` of a PUT response, or a direct GET).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentFile {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub url: String,
}

/// Response to `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentUpdate {
    pub content: ContentFile,
}

/// Pull request returned by create and get.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
}

/// Inner commit data of `GET` on a commit URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitData {
    pub message: String,
}

/// Response of `GET` on a branch's commit URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub commit: CommitData,
}

/// Body of `POST /user/repos`.
#[derive(Debug, Clone, Serialize)]
pub struct NewRepository<'a> {
    pub name: &'a str,
    pub auto_init: bool,
}

/// Body of `POST /repos/{owner}/{repo}/git/refs`.
#[derive(Debug, Clone, Serialize)]
pub struct NewRef<'a> {
    #[serde(rename = "ref")]
    pub reference: String,
    pub sha: &'a str,
}

/// Commit author identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Serialize)]
pub struct FileCommit<'a> {
    pub message: &'a str,
    pub author: &'a Author,
    /// Base64 encoded file bytes.
    pub content: &'a str,
    pub branch: &'a str,
}

/// Body of `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPullRequest<'a> {
    pub title: &'a str,
    /// `owner:branch`
    pub head: String,
    pub base: &'a str,
}
