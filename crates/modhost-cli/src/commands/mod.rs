//! Command implementations for modhost-cli

pub mod boot;
pub mod inspect;
pub mod load;
pub mod resolve;

pub use boot::run_boot;
pub use inspect::run_inspect;
pub use load::run_load;
pub use resolve::run_resolve;
