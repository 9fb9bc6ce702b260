//! `modhost boot`

use colored::Colorize;

use crate::error::Result;
use crate::host::Host;

pub fn run_boot(host: &Host) -> Result<()> {
    let report = host.boot()?;

    println!(
        "{} {} module(s), {} extension(s) installed",
        "=>".blue().bold(),
        host.runtime().len(),
        host.extensions().installed().len()
    );
    for app in &report.started {
        println!("   {} {}", "started".green(), app);
    }
    for app in &report.failed {
        println!("   {} {}", "failed".red(), app);
    }
    Ok(())
}
