use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use minion_basecaller::loader::ConfigLoader;
use minion_basecaller::models::PipelineConfig;
use minion_basecaller::pipeline::{
    ExternalToolError, Pipeline, PipelineOptions, SystemRunner, print_install_hint,
};
use minion_basecaller::validation::SampleSheetValidator;

/// Arguments for the `run` subcommand.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// MinION output folder containing FAST5 files (e.g. /var/lib/MinKNOW/data/<run>/fast5)
    #[arg(short = 'i', long = "input-dir")]
    pub input_dir: PathBuf,

    /// Directory for basecalled and demultiplexed files
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: PathBuf,

    /// Sample sheet (.xlsx). Copied into the output directory and renamed to
    /// SampleSheet.xlsx once the run completes
    #[arg(short = 's', long = "samplesheet")]
    pub samplesheet: PathBuf,

    /// Flowcell type; defaults to Flowcell_Type of the first sample
    #[arg(short = 'f', long = "flowcell")]
    pub flowcell: Option<String>,

    /// Sequencing kit; defaults to Sequencing_Kit of the first sample
    #[arg(short = 'k', long = "kit")]
    pub kit: Option<String>,

    /// Keep the basecalling output and the combined FASTQ
    #[arg(long = "keep-intermediary-files", alias = "keep_intermediary_files")]
    pub keep_intermediary_files: bool,

    /// Validate and print the tool command lines without running anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

pub fn run_command(config_path: Option<&Path>, args: RunArgs) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;

    let sheet = match SampleSheetValidator::load(&args.samplesheet) {
        Ok(sheet) => sheet,
        Err(invalid) => {
            eprintln!("{:?}", miette::Report::new(invalid));
            bail!("Sample sheet validation failed");
        }
    };
    println!(
        "{} {} ({} samples)",
        "✓".green(),
        args.samplesheet.display(),
        sheet.len()
    );

    let options = PipelineOptions {
        input_dir: args.input_dir,
        output_dir: args.output_dir,
        samplesheet: args.samplesheet,
        flowcell: args.flowcell,
        kit: args.kit,
        keep_intermediary_files: args.keep_intermediary_files,
    };
    let runner = SystemRunner;
    let pipeline = Pipeline::new(&config, &runner, &options)?;

    if args.dry_run {
        for invocation in pipeline.plan(&sheet)? {
            println!("{invocation}");
        }
        return Ok(());
    }

    println!("Started basecalling workflow");
    let outcome = match pipeline.run(&sheet) {
        Ok(outcome) => outcome,
        Err(err) => {
            hint_missing_tool(&config, &err);
            return Err(err);
        }
    };

    if !outcome.mapping.missing.is_empty() {
        println!(
            "{} no reads for: {}",
            "!".yellow().bold(),
            outcome.mapping.missing.join(", ")
        );
    }
    println!(
        "\n✅ Done! Output available in {}",
        pipeline.layout().output_dir.display()
    );
    println!("   Archive: {}", outcome.archive.display());
    println!("   Sample sheet: {}", outcome.samplesheet.display());
    Ok(())
}

fn hint_missing_tool(config: &PipelineConfig, err: &anyhow::Error) {
    for cause in err.chain() {
        if let Some(ExternalToolError::NotFound { program, .. }) =
            cause.downcast_ref::<ExternalToolError>()
        {
            let role = config
                .programs()
                .into_iter()
                .find(|(_, p)| *p == program.as_str())
                .map(|(role, _)| role)
                .unwrap_or("tool");
            print_install_hint(role, program);
        }
    }
}
