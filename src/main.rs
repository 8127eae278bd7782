use clap::Parser;
use mcp_fortify::{
    Cli,
    handlers::{handle_fix, handle_init_hook, handle_scan},
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Handle hook installation
    if cli.init_hook {
        return handle_init_hook(&cli).into();
    }

    // Handle --fix or --fix-dry-run
    if cli.fix || cli.fix_dry_run {
        return handle_fix(&cli).into();
    }

    // Normal scan mode
    handle_scan(&cli).into()
}
