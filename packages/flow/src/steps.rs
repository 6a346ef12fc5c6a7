//! Step library for the git hosting flow.
//!
//! Each step performs one externally visible action against the host,
//! checks the response contract and returns a typed record. A step takes
//! the records of earlier steps as arguments, so the order
//! authenticate -> repository -> branch -> file -> pull request -> audit
//! is enforced by the signatures.

use std::time::Duration;

use forge_api::models::{Author, FileCommit, GitRef, NewPullRequest, User};
use forge_api::{poll_until, ForgeApi, ForgeError, RetryPolicy};

use crate::audit::{audit_messages, CommitAudit, CommitRules};
use crate::config::AccountInfo;
use crate::error::{FlowError, Result};
use crate::scratch::{encode_file_base64, ScratchFile};
use crate::state::{CommittedFile, CreatedBranch, CreatedRepository, OpenedPullRequest};

/// Wait for the head refs of a fresh repository: 20 attempts, 100 ms apart.
pub const REF_POLL: RetryPolicy = RetryPolicy::fixed(20, Duration::from_millis(100));

/// Ticket tag prefixed to generated commits.
pub const COMMIT_TAG: &str = "[AAA-0001]";

/// Message used when committing the scratch file.
pub fn commit_message(file_name: &str) -> String {
    format!("{COMMIT_TAG} Add automatically generated file: {file_name}")
}

fn check_profile_field(
    field: &'static str,
    expected: Option<&str>,
    actual: Option<&str>,
) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(FlowError::Identity {
            field,
            expected: expected.map(str::to_string),
            actual: actual.map(str::to_string),
        })
    }
}

/// Fetch the session user's profile and compare it with the configured identity.
pub async fn authenticate(api: &ForgeApi, expected: &AccountInfo) -> Result<User> {
    let user = api.get_user(api.user()).await?;

    check_profile_field("login", Some(api.user()), Some(user.login.as_str()))?;
    check_profile_field("name", expected.name.as_deref(), user.name.as_deref())?;
    check_profile_field("bio", expected.bio.as_deref(), user.bio.as_deref())?;

    tracing::info!(login = %user.login, "Authenticated");
    Ok(user)
}

/// Create an initialised repository and confirm it can be fetched.
pub async fn create_repository(api: &ForgeApi, name: &str) -> Result<CreatedRepository> {
    let owner = api.user().to_string();
    let created = api.create_repository(name).await?;

    let expected_url = api.repository_url(&owner, name);
    if created.url != expected_url {
        return Err(ForgeError::contract(
            "create repository",
            format!("echoed url {} does not match {expected_url}", created.url),
        )
        .into());
    }

    api.get_repository(&owner, name).await?;

    tracing::info!(owner = %owner, repo = name, "Repository created");
    Ok(CreatedRepository {
        owner,
        name: name.to_string(),
        url: created.url,
    })
}

/// Branch off the last listed head ref and confirm the branch is listed.
///
/// Head refs of a just-initialised repository can take a moment to appear,
/// so they are polled under `policy`. Running out of attempts fails the
/// step instead of branching from nothing.
pub async fn create_branch(
    api: &ForgeApi,
    repo: &CreatedRepository,
    branch: &str,
    policy: &RetryPolicy,
) -> Result<CreatedBranch> {
    let refs = poll_until(
        policy,
        "list head refs",
        || api.list_head_refs(&repo.owner, &repo.name),
        |refs: &Vec<GitRef>| !refs.is_empty(),
    )
    .await?;

    let base_sha = refs
        .last()
        .map(|r| r.object.sha.clone())
        .ok_or_else(|| ForgeError::contract("list head refs", "no refs listed"))?;

    api.create_ref(&repo.owner, &repo.name, branch, &base_sha)
        .await?;

    let branches = api.list_branches(&repo.owner, &repo.name).await?;
    let first = branches.first().map(|b| b.name.as_str());
    let matching = branches.iter().filter(|b| b.name == branch).count();
    if first != Some(branch) || matching != 1 {
        return Err(ForgeError::contract(
            "list branches",
            format!(
                "expected '{branch}' listed first and once, got first {first:?} and {matching} match(es)"
            ),
        )
        .into());
    }

    tracing::info!(branch, base_sha = %base_sha, "Branch created");
    Ok(CreatedBranch {
        name: branch.to_string(),
        base_sha,
    })
}

/// Commit `scratch` to `branch` and confirm the file metadata can be fetched.
pub async fn commit_file(
    api: &ForgeApi,
    repo: &CreatedRepository,
    branch: &str,
    scratch: &ScratchFile,
    author: &Author,
) -> Result<CommittedFile> {
    let content = encode_file_base64(&scratch.path)?;
    let message = commit_message(&scratch.name);

    let update = api
        .put_contents(
            &repo.owner,
            &repo.name,
            &scratch.name,
            &FileCommit {
                message: &message,
                author,
                content: &content,
                branch,
            },
        )
        .await?;

    let fetched = api.get_content(&update.content.url).await?;
    if fetched.name != update.content.name {
        return Err(ForgeError::contract(
            "get content",
            format!(
                "fetched '{}' but committed '{}'",
                fetched.name, update.content.name
            ),
        )
        .into());
    }

    tracing::info!(file = %scratch.name, branch, "File committed");
    Ok(CommittedFile {
        name: update.content.name,
        message,
        local_path: scratch.path.clone(),
        url: update.content.url,
    })
}

/// Open a pull request from `branch` into `base` and confirm its title.
pub async fn create_pull_request(
    api: &ForgeApi,
    repo: &CreatedRepository,
    branch: &str,
    base: &str,
    title: &str,
) -> Result<OpenedPullRequest> {
    let request = NewPullRequest {
        title,
        head: format!("{}:{branch}", repo.owner),
        base,
    };
    let created = api
        .create_pull_request(&repo.owner, &repo.name, &request)
        .await?;

    let fetched = api
        .get_pull_request(&repo.owner, &repo.name, created.number)
        .await?;
    if fetched.title != title {
        return Err(ForgeError::contract(
            "get pull request",
            format!("title '{}' does not match '{title}'", fetched.title),
        )
        .into());
    }

    tracing::info!(number = created.number, "Pull request created");
    Ok(OpenedPullRequest {
        number: created.number,
        title: fetched.title,
    })
}

/// Fetch every branch head commit and audit its message.
///
/// The returned audit is not enforced here; see [`CommitAudit::ensure_passed`].
pub async fn verify_commit_messages(
    api: &ForgeApi,
    repo: &CreatedRepository,
    rules: &CommitRules,
) -> Result<CommitAudit> {
    let branches = api.list_branches(&repo.owner, &repo.name).await?;

    let mut messages = Vec::with_capacity(branches.len());
    for branch in &branches {
        let commit = api.get_commit(&branch.commit.url).await?;
        tracing::debug!(branch = %branch.name, sha = %commit.sha, "Fetched head commit");
        messages.push(commit.commit.message);
    }

    let audit = audit_messages(messages, rules);
    tracing::info!(
        branches = branches.len(),
        initial_commits = audit.initial_commits,
        passed = audit.passed(),
        "Commit messages audited"
    );
    Ok(audit)
}
