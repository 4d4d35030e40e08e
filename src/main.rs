use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use minion_basecaller::defaults::CONFIG_ENV_VAR;
use minion_basecaller::validation::ReportFormat;

mod commands;

use commands::{RunArgs, check_command, inspect_command, run_command, validate_command};

#[derive(Parser)]
#[command(
    name = "minion-basecaller",
    about = "Validates MinION sample sheets and runs basecalling, demultiplexing and archiving",
    version,
    author,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pipeline configuration file (YAML). Built-in defaults are used when omitted
    #[arg(short, long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a sample sheet and report every problem found
    Validate {
        /// Sample sheet (.xlsx)
        samplesheet: PathBuf,

        /// Output format for the report
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Validate the sample sheet, then basecall, demultiplex and archive a run
    Run(RunArgs),

    /// Check that the configured external tools are installed
    Check,

    /// Show the parsed records of a sample sheet
    Inspect {
        /// Sample sheet (.xlsx)
        samplesheet: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Validate {
            samplesheet,
            format,
        } => validate_command(&samplesheet, format)?,
        Commands::Run(args) => run_command(cli.config.as_deref(), args)?,
        Commands::Check => check_command(cli.config.as_deref())?,
        Commands::Inspect { samplesheet } => inspect_command(&samplesheet)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::new("minion_basecaller=warn"),
        1 => EnvFilter::new("minion_basecaller=info"),
        _ => EnvFilter::new("minion_basecaller=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
