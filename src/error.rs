use crate::rules::custom::CustomRuleError;
use thiserror::Error;

/// Errors surfaced by the fallible outer layers (platform lookup, hook
/// installation, report writing). Recoverable read failures inside the scan
/// pipeline are swallowed at the point of occurrence and never reach here.
#[derive(Error, Debug)]
pub enum FortifyError {
    #[error("Could not determine home directory")]
    HomeDirNotFound,

    #[error("Failed to read file: {path}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse file: {path} - {message}")]
    ParseError { path: String, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Secrets-guard hook already installed: {0}")]
    HookAlreadyInstalled(String),

    #[error("Custom rule error: {0}")]
    CustomRule(#[from] CustomRuleError),
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FortifyError>;
