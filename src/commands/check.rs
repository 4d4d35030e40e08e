use anyhow::{Result, bail};
use colored::Colorize;
use std::path::Path;

use minion_basecaller::loader::ConfigLoader;
use minion_basecaller::pipeline::{SystemRunner, ToolRunner, print_install_hint};

pub fn check_command(config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;
    let mut missing = 0;

    for (role, program) in config.programs() {
        match SystemRunner.ensure_available(program) {
            Ok(path) => println!("{} {role:<14} {}", "✓".green(), path.display()),
            Err(_) => {
                println!("{} {role:<14} {program} not found", "✗".red());
                print_install_hint(role, program);
                missing += 1;
            }
        }
    }

    if missing > 0 {
        bail!("{missing} required tool(s) missing");
    }
    println!("\n✅ All tools available");
    Ok(())
}
