mod commands;
mod signals;
mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "downstack", version)]
#[command(about = "Tear down layered cloud environments, verifiably", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct TargetArgs {
    /// Environment name (e.g. stg, prod)
    #[arg(short, long, env = "DOWNSTACK_ENV")]
    env: String,

    /// AWS credentials profile
    #[arg(short, long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// AWS region override
    #[arg(short, long)]
    region: Option<String>,

    /// Per-service compute stacks, comma separated (e.g. api,worker)
    #[arg(long, value_delimiter = ',')]
    services: Vec<String>,

    /// Bucket holding the environment's blob-store objects
    #[arg(long)]
    bucket: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Tear down an environment: ordered stacks first, sweep after
    Down {
        #[command(flatten)]
        target: TargetArgs,

        /// Preview every action without issuing a single mutating call
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,

        /// Print the final summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current lifecycle status of an environment's resources
    Status {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Down {
            target,
            dry_run,
            force,
            json,
        } => {
            let ok = commands::down::handle(target, dry_run, force, json).await?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Status { target } => {
            commands::status::handle(target).await?;
        }
        Commands::Version => {
            println!("downstack {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
