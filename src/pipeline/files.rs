//! File-system steps the pipeline performs itself

use anyhow::{Context, Result, bail};
use globwalk::{FileType, GlobWalkerBuilder};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::defaults::CANONICAL_SAMPLESHEET_NAME;
use crate::models::BarcodeAssignment;

/// Count files below `dir` (recursively) with the given extension.
pub fn count_files_with_extension(dir: &Path, extension: &str) -> usize {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == extension))
        .count()
}

/// Top-level `*.fastq` files in `dir`, sorted by name.
pub fn list_fastq(dir: &Path) -> Result<Vec<PathBuf>> {
    let walker = GlobWalkerBuilder::from_patterns(dir, &["*.fastq"])
        .max_depth(1)
        .file_type(FileType::FILE)
        .follow_links(false)
        .build()
        .with_context(|| format!("Failed to list FASTQ files in {}", dir.display()))?;

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.path().to_path_buf())
        .collect();
    files.sort();
    Ok(files)
}

/// Append every input, in order, to a freshly created `output`. Returns bytes written.
pub fn concatenate(inputs: &[PathBuf], output: &Path) -> Result<u64> {
    let out = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(out);
    let mut total = 0;

    for input in inputs {
        let mut reader =
            File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
        total += io::copy(&mut reader, &mut writer)
            .with_context(|| format!("Failed to append {}", input.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(total)
}

/// Replace anything that is awkward in a file name with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    // Leading dots would hide the file
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Write the barcode assignments as a tab-separated table with a header row.
pub fn write_barcode_mapping(path: &Path, assignments: &[BarcodeAssignment]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for assignment in assignments {
        writer.serialize(assignment)?;
    }
    writer.flush()?;
    Ok(())
}

/// What happened when per-barcode outputs were renamed after their samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingOutcome {
    pub renamed: Vec<(String, PathBuf)>,
    pub missing: Vec<String>,
}

/// Barcodes name files in the demultiplexing directory, so each must be a single plain
/// file name component.
pub fn check_barcode_names(assignments: &[BarcodeAssignment]) -> Result<()> {
    let rejected: Vec<&str> = assignments
        .iter()
        .map(|a| a.barcode.trim())
        .filter(|barcode| !is_plain_file_name(barcode))
        .collect();
    if !rejected.is_empty() {
        bail!(
            "Barcode(s) cannot be used as file names: {}",
            rejected
                .iter()
                .map(|b| format!("'{b}'"))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Rename `<barcode>.fastq` in `dir` to `<Sample_Name>.fastq` for every assignment.
pub fn apply_barcode_mapping(dir: &Path, assignments: &[BarcodeAssignment]) -> Result<MappingOutcome> {
    check_barcode_names(assignments)?;
    let mut outcome = MappingOutcome::default();

    for assignment in assignments {
        let barcode = assignment.barcode.trim();
        let source = dir.join(format!("{barcode}.fastq"));
        if !source.is_file() {
            warn!(
                "No reads were demultiplexed for {} ({}); expected {}",
                assignment.barcode,
                assignment.sample_id,
                source.display()
            );
            outcome.missing.push(assignment.barcode.clone());
            continue;
        }

        let target = free_target(dir, &source, &sanitize_file_name(&assignment.sample_name), barcode);
        if target != source {
            fs::rename(&source, &target).with_context(|| {
                format!(
                    "Failed to rename {} to {}",
                    source.display(),
                    target.display()
                )
            })?;
            debug!("{} -> {}", source.display(), target.display());
        }
        outcome.renamed.push((assignment.barcode.clone(), target));
    }

    Ok(outcome)
}

/// `<stem>.fastq`, or `<stem>_<barcode>[_N].fastq` when that name is taken. Never an
/// existing file other than `source`.
fn free_target(dir: &Path, source: &Path, stem: &str, barcode: &str) -> PathBuf {
    let preferred = dir.join(format!("{stem}.fastq"));
    if preferred == source || !preferred.exists() {
        return preferred;
    }

    let barcode = sanitize_file_name(barcode);
    let mut target = dir.join(format!("{stem}_{barcode}.fastq"));
    let mut counter = 2;
    while target.exists() && target != source {
        target = dir.join(format!("{stem}_{barcode}_{counter}.fastq"));
        counter += 1;
    }
    warn!(
        "{} already exists, writing {} instead",
        preferred.display(),
        target.display()
    );
    target
}

/// Entries directly inside `dir`, sorted by name.
pub fn directory_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

pub fn remove_intermediates(basecalling_dir: &Path, combined_fastq: &Path) -> Result<()> {
    if basecalling_dir.exists() {
        fs::remove_dir_all(basecalling_dir)
            .with_context(|| format!("Failed to remove {}", basecalling_dir.display()))?;
        info!("Removed {}", basecalling_dir.display());
    }
    if combined_fastq.exists() {
        fs::remove_file(combined_fastq)
            .with_context(|| format!("Failed to remove {}", combined_fastq.display()))?;
        info!("Removed {}", combined_fastq.display());
    }
    Ok(())
}

/// Where the sample sheet ends up once the run has finished.
pub fn canonical_samplesheet_path(samplesheet: &Path) -> PathBuf {
    samplesheet.with_file_name(CANONICAL_SAMPLESHEET_NAME)
}

/// True when both paths exist and resolve to the same file.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Refuse to run when the final rename would replace an unrelated file.
pub fn check_rename_target(samplesheet: &Path, copy_in_output: &Path) -> Result<()> {
    let target = canonical_samplesheet_path(samplesheet);
    if !target.exists() || same_file(&target, samplesheet) || same_file(&target, copy_in_output) {
        return Ok(());
    }
    bail!(
        "{} already exists; move it away so {} can be renamed when the run completes",
        target.display(),
        samplesheet.display()
    );
}

/// Copy the sample sheet next to the run outputs under its canonical name.
pub fn copy_samplesheet(samplesheet: &Path, destination: &Path) -> Result<()> {
    if same_file(samplesheet, destination) {
        return Ok(());
    }
    fs::copy(samplesheet, destination).with_context(|| {
        format!(
            "Failed to copy {} to {}",
            samplesheet.display(),
            destination.display()
        )
    })?;
    Ok(())
}

/// Rename the input sample sheet to its canonical name in place.
pub fn finalize_samplesheet(samplesheet: &Path) -> Result<PathBuf> {
    let target = canonical_samplesheet_path(samplesheet);
    if samplesheet == target || same_file(samplesheet, &target) {
        return Ok(target);
    }
    fs::rename(samplesheet, &target).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            samplesheet.display(),
            target.display()
        )
    })?;
    Ok(target)
}
