//! `modhost load <locator>... [--remove <locator> [--recursive]]`

use colored::Colorize;

use crate::error::Result;
use crate::host::Host;

pub fn run_load(
    host: &Host,
    locators: &[String],
    remove: Option<&str>,
    recursive: bool,
) -> Result<()> {
    host.boot()?;

    for raw in locators {
        host.extensions().load(&host.locator(raw))?;
    }
    if let Some(raw) = remove {
        host.extensions().remove(&host.locator(raw), recursive)?;
    }

    let installed = host.extensions().installed();
    println!("{} {} extension(s) installed", "=>".blue().bold(), installed.len());
    for locator in &installed {
        if let Some(ext) = host.extensions().get(locator) {
            println!("   {} {} {}", ext.name.cyan(), ext.version, locator.to_string().dimmed());
        }
    }

    let modules = host.runtime().modules();
    println!("{} {} module(s) installed", "=>".blue().bold(), modules.len());
    for module in &modules {
        println!(
            "   {} {} {}",
            module.handle,
            module.kind.label().yellow(),
            module.locator
        );
    }
    Ok(())
}
