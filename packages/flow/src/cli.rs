//! Command-line interface for running the flow against a live host.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::audit::{CommitAudit, CommitRules};
use crate::config::{FlowConfig, DEFAULT_CONFIG_PATH};
use crate::error::Result;
use crate::scenario::{connect, Scenario};
use crate::scratch::delete_file;
use crate::state::CreatedRepository;
use crate::steps;

/// Forgeflow - exercise a git hosting API end to end.
#[derive(Parser)]
#[command(name = "forgeflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the whole flow, then delete the repository and scratch file.
    Run {
        /// Repository to create (default: repo_name from the config)
        #[arg(long)]
        repo: Option<String>,

        /// Branch to create and commit to (default: branch_name from the config)
        #[arg(long)]
        branch: Option<String>,

        /// Minimum commit message length (default: char_limit from the config)
        #[arg(long)]
        min_length: Option<usize>,

        /// Leave the repository and scratch file in place
        #[arg(long)]
        keep: bool,
    },

    /// Check the configured identity against the host.
    Whoami,

    /// Audit branch head commit messages of an existing repository.
    Audit {
        /// Repository to audit (default: repo_name from the config)
        #[arg(long)]
        repo: Option<String>,

        /// Minimum commit message length (default: char_limit from the config)
        #[arg(long)]
        min_length: Option<usize>,
    },
}

/// Run the CLI.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = FlowConfig::load(&cli.config)?;

    match cli.command {
        Commands::Run {
            repo,
            branch,
            min_length,
            keep,
        } => run_command(config, repo, branch, min_length, keep).await,
        Commands::Whoami => whoami_command(config).await,
        Commands::Audit { repo, min_length } => audit_command(config, repo, min_length).await,
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    let spinner_style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .expect("valid template");
    pb.set_style(spinner_style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Execute the full flow.
async fn run_command(
    mut config: FlowConfig,
    repo: Option<String>,
    branch: Option<String>,
    min_length: Option<usize>,
    keep: bool,
) -> Result<()> {
    if let Some(repo) = repo {
        config.repo_name = repo;
    }
    if let Some(branch) = branch {
        config.branch_name = branch;
    }
    if let Some(min_length) = min_length {
        config.char_limit = min_length;
    }

    println!(
        "{} {}/{} on {}",
        style("Running flow for").bold(),
        style(&config.github_user).cyan(),
        style(&config.repo_name).cyan(),
        style(&config.base_api_url).green()
    );
    println!();

    let mut scenario = Scenario::new(config)?;
    let pb = spinner();
    pb.set_message("Running scenario steps...");
    let outcome = scenario.run().await;
    pb.finish_and_clear();

    println!("  Reached: {}", style(scenario.stage()).green());
    if let Ok(pr) = scenario.state().pull_request() {
        println!("  Pull request: #{} {}", pr.number, pr.title);
    }
    if let Some(audit) = &scenario.state().audit {
        print_audit(audit);
    }

    let cleanup = if keep {
        println!("  {}", style("Keeping repository and scratch file").yellow());
        Ok(())
    } else if scenario.state().repository.is_none() {
        // Nothing remote to delete; only local leftovers.
        match &scenario.state().scratch {
            Some(scratch) => delete_file(&scratch.path),
            None => Ok(()),
        }
    } else {
        scenario.teardown().await
    };

    outcome?;
    cleanup?;

    println!();
    println!("{}", style("Flow completed").green().bold());
    Ok(())
}

/// Execute the authenticate step only.
async fn whoami_command(config: FlowConfig) -> Result<()> {
    let api = connect(&config)?;
    let user = steps::authenticate(&api, &config.account_info).await?;

    println!("{} {}", style("Authenticated as").bold(), style(&user.login).cyan());
    if let Some(name) = &user.name {
        println!("  Name: {name}");
    }
    if let Some(bio) = &user.bio {
        println!("  Bio: {bio}");
    }
    Ok(())
}

/// Execute the commit message audit against an existing repository.
async fn audit_command(
    config: FlowConfig,
    repo: Option<String>,
    min_length: Option<usize>,
) -> Result<()> {
    let api = connect(&config)?;
    let repo = CreatedRepository {
        owner: config.github_user.clone(),
        url: api.repository_url(&config.github_user, repo.as_deref().unwrap_or(&config.repo_name)),
        name: repo.unwrap_or_else(|| config.repo_name.clone()),
    };
    let rules = CommitRules::new(min_length.unwrap_or(config.char_limit));

    let pb = spinner();
    pb.set_message(format!("Auditing {}/{}...", repo.owner, repo.name));
    let audit = steps::verify_commit_messages(&api, &repo, &rules).await;
    pb.finish_and_clear();

    let audit = audit?;
    print_audit(&audit);
    audit.ensure_passed()
}

fn print_audit(audit: &CommitAudit) {
    println!("  Initial commits: {}", audit.initial_commits);
    for verdict in &audit.verdicts {
        let mark = if verdict.accepted {
            style("ok").green()
        } else {
            style("rejected").red().bold()
        };
        println!("  [{mark}] {}", verdict.message);
    }
}
