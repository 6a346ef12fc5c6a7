//! Records produced by each step and the per-scenario state holding them.

use std::fmt;
use std::path::PathBuf;

use forge_api::models::User;

use crate::audit::CommitAudit;
use crate::error::{FlowError, Result};
use crate::scratch::ScratchFile;

/// Repository created by the scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRepository {
    pub owner: String,
    pub name: String,
    /// API URL echoed by the host.
    pub url: String,
}

/// Branch created from the last listed head ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBranch {
    pub name: String,
    /// Commit the branch was created at.
    pub base_sha: String,
}

/// File committed to the branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedFile {
    pub name: String,
    pub message: String,
    /// Local scratch file the content came from.
    pub local_path: PathBuf,
    /// Content URL returned by the host.
    pub url: String,
}

/// Pull request opened from the branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedPullRequest {
    pub number: u64,
    pub title: String,
}

/// Furthest point a scenario has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Unauthenticated,
    Authenticated,
    RepositoryCreated,
    BranchCreated,
    FileCommitted,
    PullRequestCreated,
    Verified,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated => "authenticated",
            Self::RepositoryCreated => "repository created",
            Self::BranchCreated => "branch created",
            Self::FileCommitted => "file committed",
            Self::PullRequestCreated => "pull request created",
            Self::Verified => "verified",
        };
        f.write_str(s)
    }
}

/// State threaded through one scenario.
///
/// Each field is written by exactly one step. Reading a field before its
/// step ran yields [`FlowError::MissingState`].
#[derive(Debug, Clone, Default)]
pub struct ScenarioState {
    pub user: Option<User>,
    pub repository: Option<CreatedRepository>,
    pub branch: Option<CreatedBranch>,
    /// Local file materialised for the commit, recorded before the upload.
    pub scratch: Option<ScratchFile>,
    pub file: Option<CommittedFile>,
    pub pull_request: Option<OpenedPullRequest>,
    pub audit: Option<CommitAudit>,
}

fn required<'a, T>(value: Option<&'a T>, key: &'static str) -> Result<&'a T> {
    value.ok_or(FlowError::MissingState(key))
}

impl ScenarioState {
    pub fn user(&self) -> Result<&User> {
        required(self.user.as_ref(), "user")
    }

    pub fn repository(&self) -> Result<&CreatedRepository> {
        required(self.repository.as_ref(), "repository")
    }

    pub fn branch(&self) -> Result<&CreatedBranch> {
        required(self.branch.as_ref(), "branch")
    }

    pub fn file(&self) -> Result<&CommittedFile> {
        required(self.file.as_ref(), "file")
    }

    pub fn pull_request(&self) -> Result<&OpenedPullRequest> {
        required(self.pull_request.as_ref(), "pull_request")
    }

    pub fn audit(&self) -> Result<&CommitAudit> {
        required(self.audit.as_ref(), "audit")
    }

    /// Furthest stage whose record is present.
    pub fn stage(&self) -> Stage {
        if self.audit.as_ref().is_some_and(CommitAudit::passed) {
            Stage::Verified
        } else if self.pull_request.is_some() {
            Stage::PullRequestCreated
        } else if self.file.is_some() {
            Stage::FileCommitted
        } else if self.branch.is_some() {
            Stage::BranchCreated
        } else if self.repository.is_some() {
            Stage::RepositoryCreated
        } else if self.user.is_some() {
            Stage::Authenticated
        } else {
            Stage::Unauthenticated
        }
    }
}
