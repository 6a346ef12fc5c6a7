//! Forgeflow - end-to-end git hosting flow against a repository-hosting API.
//!
//! Drives one scenario through authentication, repository creation,
//! branching, a file commit, a pull request and a commit-message audit,
//! then deletes what it created.
//!
//! # Example
//!
//! ```
//! use forgeflow::audit::CommitRules;
//! use forgeflow::steps::commit_message;
//!
//! let rules = CommitRules::new(10);
//! assert!(rules.accepts(&commit_message("file.txt")));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: YAML configuration loading
//! - [`scratch`]: scratch file creation, encoding and removal
//! - [`state`]: typed records produced by the steps
//! - [`steps`]: one function per scenario step
//! - [`audit`]: commit message rules
//! - [`teardown`]: cleanup of remote and local side effects
//! - [`scenario`]: driver threading state through the steps
//! - [`cli`]: command-line interface

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod scenario;
pub mod scratch;
pub mod state;
pub mod steps;
pub mod teardown;

pub use config::{load_document, AccountInfo, FlowConfig};
pub use error::{ConfigError, FlowError, Result};
pub use scenario::{connect, Scenario};
pub use state::{ScenarioState, Stage};
