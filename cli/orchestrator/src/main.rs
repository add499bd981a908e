//! idlbridge command line tool
//!
//! This binary checks method metadata files and dry-runs calls against the
//! schemas they declare.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;
use std::process::ExitCode;

use adapters::Bridge;
use clap::{Parser, Subcommand};
use cli::{check_files, dry_run, CliError, DryRun};
use config::Config;
use types::Platform;

/// Command-line interface configuration for idlbridge.
#[derive(Parser, Debug)]
#[command(name = "idlbridge", about = "Check and dry-run bridge method declarations", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

/// Available idlbridge commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate metadata files and report every declaration problem
    Check {
        /// Metadata files written by the stub generator
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Validate and default a payload without invoking anything
    Call {
        /// Metadata file declaring the method
        #[arg(long)]
        metadata: PathBuf,
        /// Method name (defaults to the one declared in the metadata)
        #[arg(long)]
        method: Option<String>,
        /// Platform tag of the call: web or lynx
        #[arg(long, default_value = "web")]
        platform: Platform,
        /// Parameters as JSON
        #[arg(long, default_value = "{}")]
        payload: String,
    },
    /// Write the default configuration file
    InitConfig {
        /// Destination (defaults to the user config directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = Config::load_or_default(cli.config.as_deref())?;
    logging::init(&config.logging)?;

    match cli.cmd {
        Commands::Check { files } => {
            let reports = check_files(&files);
            let mut failed = false;
            for report in &reports {
                let name = report.method.as_deref().unwrap_or("<unreadable>");
                if report.is_ok() {
                    println!("ok    {} ({})", report.path.display(), name);
                } else {
                    failed = true;
                    println!("FAIL  {} ({})", report.path.display(), name);
                    for problem in &report.problems {
                        println!("      - {}", problem);
                    }
                }
            }
            Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }
        Commands::Call { metadata, method, platform, payload } => {
            let bridge = Bridge::from_config(&config);
            let tree = dry_run(&bridge, &DryRun { metadata, method, platform, payload }).await?;
            println!("{}", serde_json::to_string_pretty(&tree).map_err(CliError::Payload)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::InitConfig { out } => {
            let path = match out {
                Some(path) => path,
                None => Config::default_path()?,
            };
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(config::ConfigError::FileRead)?;
            }
            Config::default().save(&path)?;
            println!("Wrote {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}
