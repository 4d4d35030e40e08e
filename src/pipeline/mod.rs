//! Basecalling, demultiplexing and archiving of one MinION run

mod files;
mod tools;


use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::defaults;
use crate::models::{PipelineConfig, SampleSheet};

pub use files::{MappingOutcome, sanitize_file_name};
pub use tools::{ExternalToolError, Invocation, SystemRunner, ToolRunner, print_install_hint};

const STEP_COUNT: usize = 8;

/// What the operator asked for on the command line.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory holding the raw FAST5 signal files.
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub samplesheet: PathBuf,
    /// Overrides the flowcell type from the sample sheet.
    pub flowcell: Option<String>,
    /// Overrides the sequencing kit from the sample sheet.
    pub kit: Option<String>,
    pub keep_intermediary_files: bool,
}

/// Paths the pipeline reads and writes, derived from the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineLayout {
    pub output_dir: PathBuf,
    pub basecalling_dir: PathBuf,
    pub combined_fastq: PathBuf,
    pub demultiplexing_dir: PathBuf,
    pub demultiplexer_log: PathBuf,
    pub barcode_mapping: PathBuf,
    pub samplesheet_copy: PathBuf,
    pub archive: PathBuf,
}

impl PipelineLayout {
    pub fn new(output_dir: &Path) -> Result<Self> {
        let output_dir = std::path::absolute(output_dir)
            .with_context(|| format!("Failed to resolve {}", output_dir.display()))?;
        let Some(name) = output_dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            bail!(
                "Output directory {} must have a name; it is used for the combined FASTQ and the archive",
                output_dir.display()
            );
        };
        let parent = output_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| output_dir.clone());
        let demultiplexing_dir = output_dir.join(defaults::DEMULTIPLEXING_DIR);

        Ok(Self {
            basecalling_dir: output_dir.join(defaults::BASECALLING_DIR),
            combined_fastq: output_dir.join(format!("{name}{}", defaults::COMBINED_FASTQ_SUFFIX)),
            demultiplexer_log: demultiplexing_dir.join(defaults::DEMULTIPLEXER_LOG),
            barcode_mapping: demultiplexing_dir.join(defaults::BARCODE_MAPPING_FILE),
            demultiplexing_dir,
            samplesheet_copy: output_dir.join(defaults::CANONICAL_SAMPLESHEET_NAME),
            archive: parent.join(format!("{name}.{}", defaults::ARCHIVE_EXTENSION)),
            output_dir,
        })
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub archive: PathBuf,
    pub demultiplexing_dir: PathBuf,
    pub samplesheet: PathBuf,
    pub mapping: MappingOutcome,
}

pub struct Pipeline<'a, R: ToolRunner> {
    config: &'a PipelineConfig,
    runner: &'a R,
    options: &'a PipelineOptions,
    layout: PipelineLayout,
}

impl<'a, R: ToolRunner> Pipeline<'a, R> {
    pub fn new(config: &'a PipelineConfig, runner: &'a R, options: &'a PipelineOptions) -> Result<Self> {
        Ok(Self {
            config,
            runner,
            options,
            layout: PipelineLayout::new(&options.output_dir)?,
        })
    }

    pub fn layout(&self) -> &PipelineLayout {
        &self.layout
    }

    /// Flowcell and kit for the basecaller: command-line overrides first, then the first
    /// record of the sheet. A sheet without samples needs both overrides.
    pub fn basecalling_profile(&self, sheet: &SampleSheet) -> Result<(String, String)> {
        if let (Some(flowcell), Some(kit)) = (&self.options.flowcell, &self.options.kit) {
            return Ok((flowcell.clone(), kit.clone()));
        }

        let (sheet_flowcell, sheet_kit) = sheet.basecalling_profile().context(
            "The sample sheet has no samples to take the flowcell and kit from; pass --flowcell and --kit",
        )?;
        for record in sheet.profile_mismatches() {
            warn!(
                "Row {} uses {} / {}, but the run is basecalled with {} / {} from row 1",
                record.row, record.flowcell_type, record.sequencing_kit, sheet_flowcell, sheet_kit
            );
        }

        let flowcell = self
            .options
            .flowcell
            .clone()
            .unwrap_or_else(|| sheet_flowcell.to_string());
        let kit = self
            .options
            .kit
            .clone()
            .unwrap_or_else(|| sheet_kit.to_string());
        Ok((flowcell, kit))
    }

    /// Checks that must pass before anything is written or any tool is started.
    pub fn preflight(&self) -> Result<()> {
        let input_dir = &self.options.input_dir;
        if !input_dir.is_dir() {
            bail!("Input directory {} does not exist", input_dir.display());
        }
        let fast5_count = files::count_files_with_extension(input_dir, "fast5");
        if fast5_count == 0 {
            warn!("No .fast5 files found below {}", input_dir.display());
        } else {
            info!("Found {fast5_count} .fast5 file(s) below {}", input_dir.display());
        }

        for (role, program) in self.config.programs() {
            let resolved = self
                .runner
                .ensure_available(program)
                .with_context(|| format!("The {role} is not available"))?;
            debug!("{role}: {}", resolved.display());
        }

        files::check_rename_target(&self.options.samplesheet, &self.layout.samplesheet_copy)
    }

    pub fn basecall_invocation(&self, flowcell: &str, kit: &str) -> Invocation {
        let cfg = &self.config.basecaller;
        Invocation::new(&cfg.program)
            .arg("-i")
            .arg(&self.options.input_dir)
            .arg("-s")
            .arg(&self.layout.basecalling_dir)
            .args(["--device", cfg.device.as_str()])
            .args(["--flowcell", flowcell, "--kit", kit])
            .flag_if(cfg.trim_barcodes, "--trim_barcodes")
            .flag_if(cfg.recursive, "--recursive")
            .arg("--chunk_size")
            .arg(cfg.chunk_size.to_string())
            .arg("--gpu_runners_per_device")
            .arg(cfg.gpu_runners_per_device.to_string())
            .args(&cfg.extra_args)
    }

    pub fn demultiplex_invocation(&self) -> Invocation {
        let cfg = &self.config.demultiplexer;
        Invocation::new(&cfg.program)
            .arg("-f")
            .arg(&self.layout.combined_fastq)
            .arg("-b")
            .arg(&self.layout.demultiplexing_dir)
            .flag_if(cfg.trim, "--trim")
            .flag_if(cfg.tsv, "--tsv")
            .args(["--kit", cfg.kit.as_str()])
            .args(&cfg.extra_args)
            .stdout_to(&self.layout.demultiplexer_log)
    }

    pub fn compress_invocation(&self, fastq_files: &[PathBuf]) -> Invocation {
        let cfg = &self.config.compressor;
        Invocation::new(&cfg.program)
            .args(&cfg.extra_args)
            .args(fastq_files)
    }

    pub fn archive_invocation(&self, entries: &[PathBuf]) -> Invocation {
        let cfg = &self.config.archiver;
        Invocation::new(&cfg.program)
            .arg("a")
            .args(&cfg.extra_args)
            .arg(&self.layout.archive)
            .args(entries)
    }

    /// The external command lines a run would execute. File lists that only exist once
    /// earlier steps have run are shown as globs.
    pub fn plan(&self, sheet: &SampleSheet) -> Result<Vec<Invocation>> {
        let (flowcell, kit) = self.basecalling_profile(sheet)?;
        Ok(vec![
            self.basecall_invocation(&flowcell, &kit),
            self.demultiplex_invocation(),
            self.compress_invocation(&[self.layout.demultiplexing_dir.join("*.fastq")]),
            self.archive_invocation(&[self.layout.output_dir.join("*")]),
        ])
    }

    /// Run every step against a validated sample sheet. Any failure stops the run.
    pub fn run(&self, sheet: &SampleSheet) -> Result<PipelineOutcome> {
        let (flowcell, kit) = self.basecalling_profile(sheet)?;
        let assignments = sheet.barcode_assignments();
        files::check_barcode_names(&assignments)?;
        self.preflight()?;
        let layout = &self.layout;

        step(1, "Preparing output directory");
        fs::create_dir_all(&layout.output_dir)
            .with_context(|| format!("Failed to create {}", layout.output_dir.display()))?;
        files::copy_samplesheet(&self.options.samplesheet, &layout.samplesheet_copy)?;

        step(2, "Basecalling");
        info!("Flowcell: {flowcell}");
        info!("Kit: {kit}");
        fs::create_dir_all(&layout.basecalling_dir)
            .with_context(|| format!("Failed to create {}", layout.basecalling_dir.display()))?;
        self.runner
            .run(&self.basecall_invocation(&flowcell, &kit))
            .context("Basecalling failed")?;

        step(3, "Combining basecalled reads");
        let fastq_files = files::list_fastq(&layout.basecalling_dir)?;
        if fastq_files.is_empty() {
            bail!(
                "The basecaller produced no FASTQ files in {}",
                layout.basecalling_dir.display()
            );
        }
        info!(
            "Detected {} FASTQ file(s) in {}",
            fastq_files.len(),
            layout.basecalling_dir.display()
        );
        let bytes = files::concatenate(&fastq_files, &layout.combined_fastq)?;
        debug!("Wrote {bytes} bytes to {}", layout.combined_fastq.display());

        step(4, "Demultiplexing");
        fs::create_dir_all(&layout.demultiplexing_dir).with_context(|| {
            format!("Failed to create {}", layout.demultiplexing_dir.display())
        })?;
        self.runner
            .run(&self.demultiplex_invocation())
            .context("Demultiplexing failed")?;

        step(5, "Naming outputs after their samples");
        files::write_barcode_mapping(&layout.barcode_mapping, &assignments)?;
        let mapping = files::apply_barcode_mapping(&layout.demultiplexing_dir, &assignments)?;
        info!(
            "Assigned {} of {} barcode(s) to samples",
            mapping.renamed.len(),
            assignments.len()
        );

        step(6, "Compressing demultiplexed reads");
        let demultiplexed = files::list_fastq(&layout.demultiplexing_dir)?;
        if demultiplexed.is_empty() {
            warn!(
                "No FASTQ files to compress in {}",
                layout.demultiplexing_dir.display()
            );
        } else {
            self.runner
                .run(&self.compress_invocation(&demultiplexed))
                .context("Compression failed")?;
        }

        if self.options.keep_intermediary_files {
            info!("Keeping basecalling output and the combined FASTQ");
        } else {
            files::remove_intermediates(&layout.basecalling_dir, &layout.combined_fastq)?;
        }

        step(7, "Archiving");
        let entries = files::directory_entries(&layout.output_dir)?;
        self.runner
            .run(&self.archive_invocation(&entries))
            .context("Archiving failed")?;

        step(8, "Finalising sample sheet");
        let samplesheet = files::finalize_samplesheet(&self.options.samplesheet)?;

        Ok(PipelineOutcome {
            archive: layout.archive.clone(),
            demultiplexing_dir: layout.demultiplexing_dir.clone(),
            samplesheet,
            mapping,
        })
    }
}

fn step(number: usize, title: &str) {
    println!(
        "{} {}",
        format!("[{number}/{STEP_COUNT}]").cyan().bold(),
        title.bold()
    );
}
