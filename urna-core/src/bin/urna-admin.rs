//! urna-admin - offline inspection of an election ledger.

use clap::{Parser, Subcommand};
use log::error;
use serde::Serialize;
use std::path::PathBuf;
use urna_core::domain::Origin;
use urna_core::foundation::{AdminId, ElectionId, ReceiptToken, UrnaError};
use urna_core::infrastructure::config::{load_app_config, load_app_config_from_path};
use urna_core::infrastructure::logging::init_logger;
use urna_core::ElectionCore;

#[derive(Parser, Debug)]
#[command(name = "urna-admin")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the TOML config (otherwise URNA_CONFIG_PATH or <data dir>/urna-config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Profile to apply from `[profiles.<name>]`
    #[arg(long, requires = "config")]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show seal state and whether the election can be sealed
    SealStatus {
        election_id: u64,
    },

    /// Recompute the seal hash and compare it to the stored one
    ValidateSeal {
        election_id: u64,
    },

    /// Full integrity check: seal hash, archived seal and vote bindings
    VerifyIntegrity {
        election_id: u64,
    },

    /// Produce a counting report for a sealed election
    Count {
        election_id: u64,

        /// Administrator the report is generated on behalf of
        #[arg(long)]
        admin: u64,
    },

    /// Look up a receipt by token
    Receipt {
        token: String,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        let context = err.context();
        eprintln!("error: code={:?} category={:?} {}", context.code, context.category, context.message);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), UrnaError> {
    let config = match cli.config.as_deref() {
        Some(path) => load_app_config_from_path(path, cli.profile.as_deref())?,
        None => load_app_config()?,
    };
    init_logger(config.logging.log_dir.as_deref(), &config.logging.filters)?;
    let core = ElectionCore::from_config(&config)?;

    match cli.command {
        Commands::SealStatus { election_id } => print_json(&core.get_seal_status(ElectionId::new(election_id))?),
        Commands::ValidateSeal { election_id } => print_json(&core.validate_seal(ElectionId::new(election_id))?),
        Commands::VerifyIntegrity { election_id } => {
            let report = core.verify_integrity(ElectionId::new(election_id))?;
            print_json(&report)?;
            if let Err(err) = report.ensure_intact() {
                error!("integrity check failed code={:?} error={}", err.code(), err);
                std::process::exit(2);
            }
            Ok(())
        }
        Commands::Count { election_id, admin } => {
            print_json(&core.generate_counting_report(ElectionId::new(election_id), AdminId::new(admin), &Origin::default())?)
        }
        Commands::Receipt { token } => print_json(&core.get_receipt(&ReceiptToken::new(token))?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), UrnaError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
