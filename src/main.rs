use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use ghsearch::{Config, Error, GitHubClient, QueryError};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

/// Explore GitHub organizations and user activity.
#[derive(Parser)]
#[command(name = "ghsearch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print the report as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    /// Per-request timeout in seconds (overrides GITHUB_TIMEOUT_SECS)
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// List the public members of an organization
    Org {
        /// Organization login
        name: String,
    },
    /// List the repositories a user committed to
    User {
        /// User login
        name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ghsearch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Configuration(message)) => {
            eprintln!(
                "{message}\nPlease set the environment variable 'GITHUB_TOKEN' to a personal \
                 access token generated at https://github.com/settings/tokens."
            );
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let mut config = Config::from_env()?;
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    tracing::debug!(?config, "configuration loaded");

    let client = GitHubClient::new(&config.token, Some(&config.api_url), Some(config.timeout))?;

    match cli.command {
        Command::Org { name } => {
            let report = client.orgs().list_members(&name).await.map_err(|err| {
                eprintln!("Could not obtain members for organization '{name}'");
                err
            })?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", render::members(&name, &report));
                print!("{}", render::errors(&report.errors));
            }
        }
        Command::User { name } => {
            let fatal = |err: QueryError| {
                eprintln!("Could not obtain repositories for user '{name}'");
                err
            };
            let profile = client.users().resolve(&name).await.map_err(fatal)?;
            let report = client
                .contributions()
                .list_repo_contributions(&name)
                .await
                .map_err(fatal)?;

            if cli.json {
                let output = json!({ "user": profile, "repositories": report });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", render::contributions(&profile, &report));
                print!("{}", render::errors(&report.errors));
            }
        }
    }

    Ok(())
}
