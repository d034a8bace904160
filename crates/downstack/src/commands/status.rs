use crate::TargetArgs;
use colored::Colorize;
use downstack_cloud_aws::{AwsControlPlane, ConnectOptions};
use downstack_core::{ControlPlane, LifecycleStatus};
use downstack_engine::Registry;

/// Read-only view of everything a teardown would touch. Never mutates.
pub async fn handle(target: TargetArgs) -> anyhow::Result<()> {
    let registry = Registry::layered(&target.env, &target.services);
    let provider = AwsControlPlane::connect(ConnectOptions {
        profile: target.profile.clone(),
        region: target.region.clone(),
        artifact_bucket: target.bucket.clone(),
    })
    .await;

    println!("{}", format!("Environment '{}':", target.env).bold());
    for entry in registry.stacks() {
        match provider.status(&entry.handle()).await {
            Ok(status) => {
                let label = match status {
                    LifecycleStatus::Absent => status.to_string().dimmed(),
                    LifecycleStatus::Active => status.to_string().green(),
                    LifecycleStatus::DeleteFailed => status.to_string().red().bold(),
                    _ => status.to_string().yellow(),
                };
                println!("  {} {} — {}", "•".cyan(), entry.name, label);
            }
            Err(e) => {
                println!("  {} {} — {}", "•".cyan(), entry.name, format!("error: {e}").red());
            }
        }
    }

    println!();
    println!("{}", "Sweep patterns:".bold());
    for sweep in registry.sweeps() {
        match provider.list(sweep.kind, &sweep.prefix).await {
            Ok(names) if names.is_empty() => {
                println!(
                    "  {} {} {} — {}",
                    "•".cyan(),
                    sweep.kind,
                    sweep.prefix,
                    "no matches".dimmed()
                );
            }
            Ok(names) => {
                println!(
                    "  {} {} {} — {} match(es)",
                    "•".cyan(),
                    sweep.kind,
                    sweep.prefix,
                    names.len()
                );
                for name in names {
                    println!("      {name}");
                }
            }
            Err(e) => {
                println!(
                    "  {} {} {} — {}",
                    "•".cyan(),
                    sweep.kind,
                    sweep.prefix,
                    format!("error: {e}").red()
                );
            }
        }
    }

    Ok(())
}
