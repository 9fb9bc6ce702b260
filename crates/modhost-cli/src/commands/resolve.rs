//! `modhost resolve <locator>`

use modhost_resolver::Resolve;

use crate::error::Result;
use crate::host::Host;

/// Print the local path of a resolved locator, nothing else.
pub fn run_resolve(host: &Host, locator: &str) -> Result<()> {
    let artifact = host.resolver().resolve(&host.locator(locator))?;
    println!("{}", artifact.path.display());
    Ok(())
}
