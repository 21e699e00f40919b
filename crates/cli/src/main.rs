//! Salary Prediction Engine CLI
//!
//! A command-line tool for training the salary model, running ad-hoc
//! predictions, and inspecting the heuristic weight record.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Salary Prediction Engine CLI
#[derive(Parser)]
#[command(name = "srp")]
#[command(author, version, about = "CLI for the salary prediction engine", long_about = None)]
pub struct Cli {
    /// Directory holding the model artifact and weight files
    #[arg(long, env = "SRP_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train both model tiers and persist them
    Train {
        /// JSON file holding an array of job records
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Generate a synthetic corpus of this size instead
        #[arg(long, default_value_t = 200)]
        synthetic: usize,

        /// Seed for the synthetic corpus
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Predict a salary for a partially specified job description
    Predict {
        #[arg(long)]
        job_title: Option<String>,
        #[arg(long)]
        experience: Option<String>,
        #[arg(long)]
        education: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        company_type: Option<String>,
        #[arg(long)]
        company_size: Option<String>,
        #[arg(long)]
        industry: Option<String>,
    },

    /// Show the current heuristic weight record
    Weights,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Train {
            corpus,
            synthetic,
            seed,
        } => commands::train::run(&cli.data_dir, corpus.as_deref(), synthetic, seed),
        Commands::Predict {
            job_title,
            experience,
            education,
            location,
            company_type,
            company_size,
            industry,
        } => commands::predict::run(
            &cli.data_dir,
            salary_lib::JobQuery {
                job_title,
                experience,
                education,
                location,
                company_type,
                company_size,
                industry,
            },
        ),
        Commands::Weights => commands::weights::run(&cli.data_dir),
    }
}
