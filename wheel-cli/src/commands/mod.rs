//! CLI command implementations

pub mod generate;
pub mod new;

pub use generate::GenerateCommand;
pub use new::NewCommand;
