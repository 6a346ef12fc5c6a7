//! BDD test runner for the git hosting flow
//!
//! Runs the Gherkin scenarios in `features/` against an in-process fake of
//! the hosting API.
//!
//! # Usage
//!
//! ```bash
//! cargo test --test bdd -- --nocapture
//! ```

// Allow panic/expect in test code - these are appropriate for test setup
#![allow(clippy::expect_used, clippy::panic, clippy::unwrap_used)]

#[path = "../common/mod.rs"]
mod common;

use cucumber::World;
use std::path::Path;

#[tokio::main]
async fn main() {
    // Initialize tracing subscriber (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .init();

    // Find the features directory relative to the package
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let features_dir = Path::new(manifest_dir)
        .parent() // packages/
        .and_then(|p| p.parent()) // project root
        .map(|p| p.join("features"))
        .expect("Could not find features directory");

    if !features_dir.exists() {
        panic!("Features directory not found: {}", features_dir.display());
    }

    world::FlowWorld::cucumber()
        .max_concurrent_scenarios(1) // Scenarios share nothing, but keep output readable
        .after(|_feature, _rule, scenario, _finished, world| {
            Box::pin(async move {
                let Some(world) = world else {
                    return;
                };
                let expects_repository = !scenario
                    .tags
                    .iter()
                    .any(|tag| tag == world::NO_REPOSITORY_TAG);
                // A panicking after hook fails the scenario.
                if let Err(e) = world.teardown(expects_repository).await {
                    panic!("Teardown failed: {e}");
                }
            })
        })
        .with_default_cli()
        .run(features_dir)
        .await;
}
