use anyhow::Result;
use std::path::Path;

use minion_basecaller::loader::SampleSheetLoader;
use minion_basecaller::validation::{SampleSheetValidator, render_plain};

pub fn inspect_command(samplesheet: &Path) -> Result<()> {
    let sheet = SampleSheetLoader::parse(samplesheet)?;
    println!("Sample sheet: {}\n", samplesheet.display());
    sheet.pretty_print();

    println!("\nBarcode mapping:");
    for assignment in sheet.barcode_assignments() {
        println!(
            "  {} -> {} ({})",
            assignment.barcode, assignment.sample_name, assignment.sample_id
        );
    }

    let result = SampleSheetValidator::validate(&sheet);
    println!("\nValidation:");
    for line in render_plain(&result).lines() {
        println!("  {line}");
    }
    Ok(())
}
