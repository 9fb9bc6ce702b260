//! `modhost inspect <locator>`

use colored::Colorize;
use modhost_extensions::read_descriptor;
use modhost_resolver::Resolve;

use crate::error::Result;
use crate::host::Host;

pub fn run_inspect(host: &Host, locator: &str, json: bool) -> Result<()> {
    let artifact = host.resolver().resolve(&host.locator(locator))?;
    let extension = read_descriptor(&artifact)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&extension)?);
        return Ok(());
    }

    println!(
        "{} Extension '{}' v{}",
        "=>".blue().bold(),
        extension.name.cyan(),
        extension.version
    );
    println!("   {} {}", "Path:".dimmed(), artifact.path.display());

    if !extension.extensions.is_empty() {
        println!("   {}", "Extensions:".dimmed());
        for inner in &extension.extensions {
            println!("     - {inner}");
        }
    }
    if !extension.modules.is_empty() {
        println!("   {}", "Modules:".dimmed());
        for module in &extension.modules {
            match &module.type_hint {
                Some(hint) => println!("     - {} ({})", module.location, hint.yellow()),
                None => println!("     - {}", module.location),
            }
        }
    }
    Ok(())
}
