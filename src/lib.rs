pub mod cli;
pub mod discovery;
pub mod error;
pub mod fix;
pub mod handlers;
pub mod patterns;
pub mod platform;
pub mod reporter;
pub mod rules;
pub mod scanner;

pub use cli::{Cli, OutputFormat};
pub use error::{FortifyError, Result};
pub use reporter::{
    Reporter, html::HtmlReporter, json::JsonReporter, sarif::SarifReporter,
    terminal::TerminalReporter,
};
pub use rules::{Finding, ScanResult, Severity, Summary};
pub use scanner::{ScanOptions, exit_code, scan};
