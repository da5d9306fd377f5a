//! Command implementations.

mod run;
mod validate;

pub use run::run_routing;
pub use validate::run_validate;
