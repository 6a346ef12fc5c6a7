//! Commit message rules.
//!
//! Every branch head must carry either the host's `Initial commit` (exactly
//! once across all branches) or a message that starts with a ticket tag
//! such as `[AAA-0001] ` and is at least `min_length` characters long.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{FlowError, Result};

/// Message the host writes for an `auto_init` repository.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit";

/// Ticket tag at the start of a message: three capitals, dash, four digits, space.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[A-Z]{3}-\d{4}\] ").expect("valid regex"));

/// Tag anywhere in a text, used to check example patterns.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TAG_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[A-Z]{3}-\d{4}\]\s").expect("valid regex"));

/// Rules applied to non-initial commit messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitRules {
    pub min_length: usize,
}

impl CommitRules {
    pub const fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Whether `message` carries a tag and is long enough.
    ///
    /// # Examples
    /// ```
    /// use forgeflow::audit::CommitRules;
    ///
    /// let rules = CommitRules::new(10);
    /// assert!(rules.accepts("[AAA-0001] Add file"));
    /// assert!(!rules.accepts("Add file"));
    /// assert!(!rules.accepts("[AAA-0001] "));
    /// ```
    pub fn accepts(&self, message: &str) -> bool {
        TAG_PATTERN.is_match(message) && message.chars().count() >= self.min_length
    }
}

/// Check that a pattern given by a scenario step carries a valid tag.
pub fn validate_example_pattern(pattern: &str) -> Result<()> {
    if TAG_ANYWHERE.is_match(pattern) {
        Ok(())
    } else {
        Err(FlowError::InvalidPattern(pattern.to_string()))
    }
}

/// Outcome for one non-initial message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageVerdict {
    pub message: String,
    pub accepted: bool,
}

/// Result of auditing all branch head messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitAudit {
    pub initial_commits: usize,
    pub verdicts: Vec<MessageVerdict>,
}

impl CommitAudit {
    pub fn passed(&self) -> bool {
        self.initial_commits == 1 && self.verdicts.iter().all(|v| v.accepted)
    }

    pub fn rejected(&self) -> impl Iterator<Item = &str> {
        self.verdicts
            .iter()
            .filter(|v| !v.accepted)
            .map(|v| v.message.as_str())
    }

    /// All-or-nothing check: one initial commit and no rejected message.
    pub fn ensure_passed(&self) -> Result<()> {
        if self.passed() {
            Ok(())
        } else {
            Err(FlowError::CommitAudit {
                initial_commits: self.initial_commits,
                rejected: self.rejected().map(str::to_string).collect(),
            })
        }
    }
}

/// Split messages into the initial-commit count and verdicts for the rest.
pub fn audit_messages<I, S>(messages: I, rules: &CommitRules) -> CommitAudit
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut initial_commits = 0;
    let mut verdicts = Vec::new();

    for message in messages {
        let message = message.into();
        if message == INITIAL_COMMIT_MESSAGE {
            initial_commits += 1;
            continue;
        }
        let accepted = rules.accepts(&message);
        if !accepted {
            tracing::warn!(message = %message, "Commit message rejected");
        }
        verdicts.push(MessageVerdict { message, accepted });
    }

    CommitAudit {
        initial_commits,
        verdicts,
    }
}
