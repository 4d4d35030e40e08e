use anyhow::{Result, bail};
use std::path::Path;

use minion_basecaller::validation::{
    ReportFormat, SampleSheetValidator, render_json, summary_line,
};

pub fn validate_command(samplesheet: &Path, format: ReportFormat) -> Result<()> {
    let result = SampleSheetValidator::run(samplesheet);

    match format {
        ReportFormat::Json => println!("{}", render_json(&result)?),
        ReportFormat::Text => {
            println!("{}", summary_line(samplesheet, &result));
            if let Err(invalid) = result.clone().into_report(samplesheet) {
                eprintln!("{:?}", miette::Report::new(invalid));
            }
        }
    }

    if !result.success {
        bail!("Sample sheet validation failed");
    }
    Ok(())
}
