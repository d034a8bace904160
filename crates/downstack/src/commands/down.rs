use crate::signals;
use crate::utils;
use crate::TargetArgs;
use colored::Colorize;
use downstack_cloud_aws::{AwsControlPlane, ConnectOptions};
use downstack_core::RunConfig;
use downstack_engine::{CancelToken, Coordinator, Registry, SystemClock};
use std::sync::Arc;

/// Run the teardown. Returns whether the run succeeded (only ordered-phase
/// failures count; sweep failures are logged in the report).
pub async fn handle(target: TargetArgs, dry_run: bool, force: bool, json: bool) -> anyhow::Result<bool> {
    let registry = Registry::layered(&target.env, &target.services);
    tracing::info!(env = %target.env, dry_run, force, "teardown requested");

    if dry_run {
        println!(
            "{}",
            "Dry run: no mutating call will be issued.".yellow().bold()
        );
    } else if !force {
        utils::confirm_environment(&target.env)?;
    }

    println!(
        "{}",
        format!(
            "Tearing down '{}' ({} stacks, {} sweep patterns)...",
            target.env,
            registry.stacks().len(),
            registry.sweeps().len()
        )
        .bold()
    );
    for entry in registry.stacks() {
        println!("  {} {} ({})", "•".cyan(), entry.name, entry.layer.dimmed());
    }

    let provider = AwsControlPlane::connect(ConnectOptions {
        profile: target.profile.clone(),
        region: target.region.clone(),
        artifact_bucket: target.bucket.clone(),
    })
    .await;

    let config = RunConfig {
        dry_run,
        force,
        ..RunConfig::default()
    };

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if signals::wait_for_shutdown_signal().await.is_ok() {
                eprintln!(
                    "{}",
                    "Shutdown signal received; finishing the current check, then stopping."
                        .yellow()
                );
                cancel.cancel();
            }
        });
    }

    let coordinator = Coordinator::new(Arc::new(provider), Arc::new(SystemClock), config, cancel);
    let report = coordinator.run(&registry).await;

    utils::print_report(&report, json)?;
    Ok(report.is_success())
}
