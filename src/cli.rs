use crate::rules::Severity;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Sarif,
    Html,
}

#[derive(Parser, Debug)]
#[command(
    name = "mcp-fortify",
    version,
    about = "Security scanner for MCP (Model Context Protocol) configurations",
    long_about = "mcp-fortify scans MCP server configurations, Claude Code settings, and agent \
instruction files for hardcoded secrets, injection risks, and unsafe defaults."
)]
pub struct Cli {
    /// Project directory to scan in addition to the standard locations
    pub path: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,

    /// Minimum severity to report
    #[arg(short, long, value_enum)]
    pub severity: Option<Severity>,

    /// Comma-separated rule IDs to run (default: all built-in rules)
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub rules: Vec<String>,

    /// YAML file with additional custom rules
    #[arg(long, value_name = "FILE")]
    pub custom_rules: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Show all scanned files
    #[arg(short, long)]
    pub verbose: bool,

    /// CI mode: exit 1 when critical or high findings are present
    #[arg(long)]
    pub ci: bool,

    /// Apply automatic fixes for fixable findings
    #[arg(long)]
    pub fix: bool,

    /// Show fixes without applying them
    #[arg(long)]
    pub fix_dry_run: bool,

    /// Install the PreToolUse secrets guard hook and exit
    #[arg(long)]
    pub init_hook: bool,
}
