//! Configuration loading for the flow.
//!
//! The configuration is a YAML document. Only `github_user` is strictly
//! required in the file; the token may instead come from the
//! `FORGEFLOW_TOKEN` environment variable, which takes precedence.

use std::fs;
use std::path::{Path, PathBuf};

use forge_api::models::Author;
use forge_api::{AuthScheme, Credentials, DEFAULT_API_URL};
use serde::{Deserialize, Deserializer};

use crate::error::{ConfigError, Result};

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Environment variable overriding `github_token`.
pub const TOKEN_ENV_VAR: &str = "FORGEFLOW_TOKEN";

pub const DEFAULT_REPO_NAME: &str = "git_flow_feature_repo";
pub const DEFAULT_BRANCH_NAME: &str = "feature-x";
pub const DEFAULT_BASE_BRANCH: &str = "main";
pub const DEFAULT_PULL_REQUEST_TITLE: &str = "git_flow_feature";
pub const DEFAULT_RESOURCES_DIR: &str = "resources";

/// Minimum commit message length when the config does not set one.
pub const DEFAULT_CHAR_LIMIT: usize = 10;

/// Expected profile of the authenticated account.
///
/// Fields are compared as-is with the host's answer, so `None` expects the
/// profile field to be null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Typed view of the configuration document.
#[derive(Clone, Deserialize)]
pub struct FlowConfig {
    pub github_user: String,
    #[serde(default)]
    pub github_token: String,
    #[serde(default = "default_api_url")]
    pub base_api_url: String,
    #[serde(default)]
    pub account_info: AccountInfo,
    #[serde(default = "default_repo_name")]
    pub repo_name: String,
    #[serde(default = "default_branch_name")]
    pub branch_name: String,
    #[serde(default = "default_base_branch")]
    pub base_branch: String,
    #[serde(default = "default_pull_request_title")]
    pub pull_request_title: String,
    #[serde(
        default = "default_char_limit",
        deserialize_with = "deserialize_char_limit"
    )]
    pub char_limit: usize,
    #[serde(default = "default_resources_dir")]
    pub resources_dir: PathBuf,
    #[serde(default = "default_author")]
    pub commit_author: Author,
    #[serde(default)]
    pub auth_scheme: AuthScheme,
}

impl std::fmt::Debug for FlowConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowConfig")
            .field("github_user", &self.github_user)
            .field("github_token", &"<redacted>")
            .field("base_api_url", &self.base_api_url)
            .field("account_info", &self.account_info)
            .field("repo_name", &self.repo_name)
            .field("branch_name", &self.branch_name)
            .field("base_branch", &self.base_branch)
            .field("char_limit", &self.char_limit)
            .field("resources_dir", &self.resources_dir)
            .field("auth_scheme", &self.auth_scheme)
            .finish_non_exhaustive()
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_repo_name() -> String {
    DEFAULT_REPO_NAME.to_string()
}

fn default_branch_name() -> String {
    DEFAULT_BRANCH_NAME.to_string()
}

fn default_base_branch() -> String {
    DEFAULT_BASE_BRANCH.to_string()
}

fn default_pull_request_title() -> String {
    DEFAULT_PULL_REQUEST_TITLE.to_string()
}

fn default_char_limit() -> usize {
    DEFAULT_CHAR_LIMIT
}

fn default_resources_dir() -> PathBuf {
    PathBuf::from(DEFAULT_RESOURCES_DIR)
}

fn default_author() -> Author {
    Author {
        name: "forgeflow".to_string(),
        email: "forgeflow@users.noreply.github.com".to_string(),
    }
}

/// Accept `char_limit: 10` as well as `char_limit: "10"`.
fn deserialize_char_limit<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(usize),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("char_limit must be a whole number, got {s:?}"))
        }),
    }
}

/// Read a configuration document into a generic key/value mapping.
pub fn load_document(path: &Path) -> Result<serde_yaml_ng::Mapping> {
    let text = read(path)?;
    let mapping = serde_yaml_ng::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(mapping)
}

fn read(path: &Path) -> std::result::Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

impl FlowConfig {
    /// Load and validate the configuration at `path`, applying the token
    /// override from the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let text = read(path)?;
        let token_override = std::env::var(TOKEN_ENV_VAR).ok();
        Ok(Self::from_yaml(&text, path, token_override)?)
    }

    /// Parse a configuration document. `source` only labels errors.
    pub fn from_yaml(
        text: &str,
        source: &Path,
        token_override: Option<String>,
    ) -> std::result::Result<Self, ConfigError> {
        let mut config: Self = serde_yaml_ng::from_str(text).map_err(|e| ConfigError::Parse {
            path: source.to_path_buf(),
            source: e,
        })?;

        if let Some(token) = token_override.filter(|t| !t.is_empty()) {
            config.github_token = token;
        }
        config.base_api_url = config.base_api_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.github_user.trim().is_empty() {
            return Err(ConfigError::Invalid("github_user must not be empty".into()));
        }
        if self.github_token.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "github_token is empty and {TOKEN_ENV_VAR} is not set"
            )));
        }
        if self.repo_name.trim().is_empty() || self.branch_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "repo_name and branch_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.github_user, &self.github_token)
    }
}
