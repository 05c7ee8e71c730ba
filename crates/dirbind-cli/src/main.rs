//! dirbind - directory connection and authentication manager
//!
//! Authenticates a user against an LDAP/Active Directory server.

use clap::{Parser, Subcommand};
use dirbind_auth::ConnectionManager;
use dirbind_core::config::DirbindConfig;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "dirbind")]
#[command(author = "Dirbind Team")]
#[command(version = dirbind_core::VERSION)]
#[command(about = "Directory connection and authentication manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory server host
    #[arg(long, global = true, env = "DIRBIND_HOST")]
    host: Option<String>,

    /// Directory server port
    #[arg(short, long, global = true, env = "DIRBIND_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "DIRBIND_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate a user
    Auth {
        /// Username to bind as
        #[arg(short, long)]
        username: String,

        /// Password for the user
        #[arg(long, env = "DIRBIND_PASSWORD", hide_env_values = true)]
        password: String,

        /// Stay bound as the user instead of rebinding as the administrator
        #[arg(long)]
        stay_bound: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration
    CheckConfig,

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Load or create config
    let mut config = if let Some(config_path) = &cli.config {
        DirbindConfig::from_file(config_path)?
    } else {
        DirbindConfig::from_env()
    };

    // Override with CLI args
    if let Some(host) = cli.host {
        config.directory.host = host;
    }
    if let Some(port) = cli.port {
        config.directory.port = Some(port);
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config);

    match cli.command {
        Commands::Auth {
            username,
            password,
            stay_bound,
            json,
        } => run_auth(config, &username, &password, stay_bound, json),
        Commands::CheckConfig => {
            config.directory.validate()?;
            println!("Configuration OK: {}", config.directory.server_url()?);
            Ok(())
        }
        Commands::Version => {
            println!("dirbind {}", dirbind_core::VERSION);
            Ok(())
        }
    }
}

fn init_logging(config: &DirbindConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

fn run_auth(
    config: DirbindConfig,
    username: &str,
    password: &str,
    stay_bound: bool,
    json: bool,
) -> anyhow::Result<()> {
    info!("Authenticating against {}", config.directory.server_url()?);

    let mut manager = ConnectionManager::ldap(config.directory)?;
    let outcome = manager.auth().attempt(username, password, stay_bound)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if outcome.authenticated {
        println!("Authenticated {}", username);
        if outcome.rebind_failed() {
            println!("Warning: administrator rebind failed");
        }
    } else {
        println!(
            "Authentication failed for {}: {}",
            username,
            outcome.last_error.as_deref().unwrap_or("unknown error")
        );
    }

    if !outcome.authenticated {
        drop(manager);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_auth() {
        let cli = Cli::try_parse_from([
            "dirbind",
            "--host",
            "dc01.corp.local",
            "auth",
            "-u",
            "jdoe",
            "--password",
            "hunter2",
            "--stay-bound",
        ])
        .unwrap();

        assert_eq!(cli.host.as_deref(), Some("dc01.corp.local"));
        match cli.command {
            Commands::Auth {
                username,
                stay_bound,
                json,
                ..
            } => {
                assert_eq!(username, "jdoe");
                assert!(stay_bound);
                assert!(!json);
            }
            _ => panic!("expected auth command"),
        }
    }
}
