//! Scenario driver threading state through the step library.

use forge_api::models::User;
use forge_api::{ForgeApi, RetryPolicy, Session};

use crate::audit::{CommitAudit, CommitRules};
use crate::config::FlowConfig;
use crate::error::Result;
use crate::scratch::create_scratch_file;
use crate::state::{
    CommittedFile, CreatedBranch, CreatedRepository, OpenedPullRequest, ScenarioState, Stage,
};
use crate::steps::{self, REF_POLL};
use crate::teardown::teardown;

/// One run of the flow: configuration, API binding and accumulated state.
///
/// Each method runs one step and records its result. Teardown runs at
/// most once; later calls are no-ops.
#[derive(Debug)]
pub struct Scenario {
    config: FlowConfig,
    api: ForgeApi,
    state: ScenarioState,
    ref_poll: RetryPolicy,
    torn_down: bool,
}

/// Build the authenticated API binding described by `config`.
pub fn connect(config: &FlowConfig) -> Result<ForgeApi> {
    let session = Session::builder(config.credentials())
        .auth_scheme(config.auth_scheme)
        .build()?;
    Ok(ForgeApi::new(session, &config.base_api_url))
}

impl Scenario {
    pub fn new(config: FlowConfig) -> Result<Self> {
        let api = connect(&config)?;
        Ok(Self::with_api(config, api))
    }

    pub fn with_api(config: FlowConfig, api: ForgeApi) -> Self {
        Self {
            config,
            api,
            state: ScenarioState::default(),
            ref_poll: REF_POLL,
            torn_down: false,
        }
    }

    /// Override how long branch creation waits for head refs.
    pub fn with_ref_poll(mut self, policy: RetryPolicy) -> Self {
        self.ref_poll = policy;
        self
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn api(&self) -> &ForgeApi {
        &self.api
    }

    pub fn state(&self) -> &ScenarioState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub async fn authenticate(&mut self) -> Result<&User> {
        let user = steps::authenticate(&self.api, &self.config.account_info).await?;
        self.state.user = Some(user);
        self.state.user()
    }

    pub async fn create_repository(&mut self, name: &str) -> Result<&CreatedRepository> {
        self.state.user()?;
        let repo = steps::create_repository(&self.api, name).await?;
        self.state.repository = Some(repo);
        self.state.repository()
    }

    pub async fn create_branch(&mut self, name: &str) -> Result<&CreatedBranch> {
        let repo = self.state.repository()?;
        let branch = steps::create_branch(&self.api, repo, name, &self.ref_poll).await?;
        self.state.branch = Some(branch);
        self.state.branch()
    }

    /// Materialise the scratch file and commit it to `branch`.
    pub async fn commit_file(&mut self, branch: &str) -> Result<&CommittedFile> {
        self.state.branch()?;
        let scratch = create_scratch_file(&self.config.resources_dir)?;
        self.state.scratch = Some(scratch.clone());

        let repo = self.state.repository()?;
        let file = steps::commit_file(
            &self.api,
            repo,
            branch,
            &scratch,
            &self.config.commit_author,
        )
        .await?;
        self.state.file = Some(file);
        self.state.file()
    }

    /// Open a pull request from the created branch into the configured base.
    pub async fn create_pull_request(&mut self) -> Result<&OpenedPullRequest> {
        self.state.file()?;
        let repo = self.state.repository()?;
        let branch = self.state.branch()?;
        let pr = steps::create_pull_request(
            &self.api,
            repo,
            &branch.name,
            &self.config.base_branch,
            &self.config.pull_request_title,
        )
        .await?;
        self.state.pull_request = Some(pr);
        self.state.pull_request()
    }

    /// Audit all branch head messages; fails unless the audit passes.
    ///
    /// Requires an opened pull request. Use [`steps::verify_commit_messages`]
    /// to audit a repository outside a scenario.
    pub async fn verify_commit_messages(&mut self, rules: &CommitRules) -> Result<&CommitAudit> {
        self.state.pull_request()?;
        let repo = self.state.repository()?;
        let audit = steps::verify_commit_messages(&self.api, repo, rules).await?;
        let passed = audit.ensure_passed();
        self.state.audit = Some(audit);
        passed?;
        self.state.audit()
    }

    /// Run every step with the configured names and limits.
    pub async fn run(&mut self) -> Result<()> {
        let repo_name = self.config.repo_name.clone();
        let branch_name = self.config.branch_name.clone();
        let rules = CommitRules::new(self.config.char_limit);

        self.authenticate().await?;
        self.create_repository(&repo_name).await?;
        self.create_branch(&branch_name).await?;
        self.commit_file(&branch_name).await?;
        self.create_pull_request().await?;
        self.verify_commit_messages(&rules).await?;
        Ok(())
    }

    /// Delete the created repository and scratch file, once.
    pub async fn teardown(&mut self) -> Result<()> {
        if self.torn_down {
            tracing::debug!("Scenario already torn down");
            return Ok(());
        }
        self.torn_down = true;
        tracing::info!(stage = %self.stage(), "Tearing down scenario");
        teardown(&self.api, &self.state).await
    }
}
