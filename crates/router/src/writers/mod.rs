//! Bundled writer implementations

mod console;
mod file;

pub use console::ConsoleWriter;
pub use file::FileWriter;

/// Default field delimiter shared by the bundled writers
pub(crate) const DEFAULT_DELIMITER: &str = "> ";
