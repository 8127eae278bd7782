//! CLI command handlers
//!
//! Handler functions for each top-level command flag, separated from main.rs
//! so each can be unit tested.

use crate::cli::Cli;
use crate::error::{FortifyError, Result};
use crate::fix::PermissionFixer;
use crate::platform::{home_dir, ConfigPaths, Platform};
use crate::reporter;
use crate::scanner::{self, ScanOptions};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Result type for handler functions that can be tested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResult {
    Success,
    Error(u8),
}

impl From<HandlerResult> for ExitCode {
    fn from(result: HandlerResult) -> Self {
        match result {
            HandlerResult::Success => ExitCode::SUCCESS,
            HandlerResult::Error(code) => ExitCode::from(code),
        }
    }
}

fn scan_options(cli: &Cli) -> ScanOptions {
    ScanOptions {
        path: cli.path.clone(),
        rules: cli.rules.clone(),
        custom_rules: cli.custom_rules.clone(),
        min_severity: cli.severity,
    }
}

/// Handle a plain scan, the default when no command flag is given
pub fn handle_scan(cli: &Cli) -> HandlerResult {
    let result = scanner::scan(&scan_options(cli));
    let output = reporter::for_format(cli.format, cli.verbose).report(&result);
    println!("{}", output);

    match scanner::exit_code(&result, cli.ci) {
        0 => HandlerResult::Success,
        code => HandlerResult::Error(code),
    }
}

/// Handle --fix and --fix-dry-run commands
pub fn handle_fix(cli: &Cli) -> HandlerResult {
    let result = scanner::scan(&scan_options(cli));
    let fixer = PermissionFixer::new(cli.fix_dry_run);
    println!("{}", fixer.run(&result));
    HandlerResult::Success
}

/// Handle --init-hook command
pub fn handle_init_hook(cli: &Cli) -> HandlerResult {
    match install_hook(cli.path.as_deref()) {
        Ok(installed) => {
            println!("Secrets guard installed at {}", installed.script.display());
            println!(
                "Registered as a PreToolUse hook in {}",
                installed.settings.display()
            );
            HandlerResult::Success
        }
        Err(e) => {
            eprintln!("Failed to install hook: {}", e);
            HandlerResult::Error(2)
        }
    }
}

const GUARD_SCRIPT_NAME: &str = "secrets-guard.sh";

/// Shell script installed into the hooks directory. Claude Code pipes the
/// PreToolUse payload to its stdin; a non-zero exit blocks the tool call.
const GUARD_SCRIPT: &str = r#"#!/bin/sh
# Secrets guard installed by mcp-fortify --init-hook.
# Blocks tool input that looks like a credential.
input=$(cat)
if printf '%s' "$input" | grep -qE 'sk-[a-zA-Z0-9_-]{20,}|AKIA[0-9A-Z]{16}|gh[po]_[a-zA-Z0-9]{36}|github_pat_[a-zA-Z0-9_]{20,}|AIza[0-9A-Za-z_-]{35}|xox[bpras]-[0-9a-zA-Z]{10,}|npm_[a-zA-Z0-9]{36}|BEGIN.*PRIVATE KEY'; then
    echo "mcp-fortify: blocked tool input that looks like a credential" >&2
    exit 2
fi
exit 0
"#;

/// Paths touched by a successful hook installation.
#[derive(Debug)]
struct InstalledHook {
    script: PathBuf,
    settings: PathBuf,
}

/// Writes the guard script and registers it in Claude Code settings under
/// `home_override` (a home-shaped directory), or the real home directory.
/// Settings are mutated in memory first so nothing lands on disk when the
/// existing file has an unexpected shape.
fn install_hook(home_override: Option<&Path>) -> Result<InstalledHook> {
    let paths = match home_override {
        Some(dir) => ConfigPaths::for_home(Platform::current(), dir),
        None => ConfigPaths::for_home(Platform::current(), &home_dir()?),
    };
    let script = paths.hooks_dir.join(GUARD_SCRIPT_NAME);

    let mut settings = read_settings(&paths.settings)?;
    if guard_registered(&settings, &script) {
        return Err(FortifyError::HookAlreadyInstalled(
            script.display().to_string(),
        ));
    }
    register_guard(&mut settings, &paths.settings, &script)?;

    write_guard_script(&script)?;
    write_settings(&paths.settings, &settings)?;

    Ok(InstalledHook {
        script,
        settings: paths.settings,
    })
}

/// Loads settings.json, treating a missing file as an empty object.
fn read_settings(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(json!({}));
    }
    let content = fs::read_to_string(path).map_err(|e| FortifyError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| FortifyError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Whether any PreToolUse group already runs the guard script.
fn guard_registered(settings: &Value, script: &Path) -> bool {
    let script = script.to_string_lossy();
    let Some(groups) = settings
        .pointer("/hooks/PreToolUse")
        .and_then(Value::as_array)
    else {
        return false;
    };

    groups.iter().any(|group| {
        group
            .get("hooks")
            .and_then(Value::as_array)
            .is_some_and(|hooks| {
                hooks
                    .iter()
                    .any(|h| h.get("command").and_then(Value::as_str) == Some(script.as_ref()))
            })
    })
}

/// Appends the guard's PreToolUse group, preserving every other key in the
/// settings document.
fn register_guard(settings: &mut Value, settings_path: &Path, script: &Path) -> Result<()> {
    let path = settings_path.display().to_string();

    let root = settings
        .as_object_mut()
        .ok_or_else(|| FortifyError::ParseError {
            path: path.clone(),
            message: "settings root is not a JSON object".to_string(),
        })?;

    let hooks = root.entry("hooks").or_insert_with(|| json!({}));
    let hooks = hooks
        .as_object_mut()
        .ok_or_else(|| FortifyError::ParseError {
            path: path.clone(),
            message: "\"hooks\" is not a JSON object".to_string(),
        })?;

    let groups = hooks.entry("PreToolUse").or_insert_with(|| json!([]));
    let groups = groups
        .as_array_mut()
        .ok_or_else(|| FortifyError::ParseError {
            path,
            message: "\"hooks.PreToolUse\" is not a JSON array".to_string(),
        })?;

    groups.push(json!({
        "matcher": "Write|Edit|Bash",
        "hooks": [{
            "type": "command",
            "command": script.to_string_lossy(),
        }]
    }));
    Ok(())
}

/// Writes the guard script with owner-only permissions.
fn write_guard_script(script: &Path) -> Result<()> {
    if let Some(dir) = script.parent() {
        fs::create_dir_all(dir).map_err(|e| FortifyError::WriteError {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    fs::write(script, GUARD_SCRIPT).map_err(|e| FortifyError::WriteError {
        path: script.display().to_string(),
        source: e,
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(script, fs::Permissions::from_mode(0o700)).map_err(|e| {
            FortifyError::WriteError {
                path: script.display().to_string(),
                source: e,
            }
        })?;
    }

    Ok(())
}

fn write_settings(path: &Path, settings: &Value) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| FortifyError::WriteError {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    fs::write(path, content + "\n").map_err(|e| FortifyError::WriteError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Severity;
    use clap::Parser;
    use tempfile::TempDir;

    fn create_test_cli(args: &[&str]) -> Cli {
        let mut full_args = vec!["mcp-fortify"];
        full_args.extend(args);
        Cli::parse_from(full_args)
    }

    #[test]
    fn test_handler_result_into_exit_code() {
        let _: ExitCode = HandlerResult::Success.into();
        let _: ExitCode = HandlerResult::Error(2).into();
    }

    #[test]
    fn test_scan_options_built_from_cli() {
        let cli = create_test_cli(&[
            "--severity",
            "high",
            "--rules",
            "hardcoded-secrets,transport-security",
            "/tmp/project",
        ]);
        let options = scan_options(&cli);
        assert_eq!(options.path, Some(PathBuf::from("/tmp/project")));
        assert_eq!(
            options.rules,
            vec!["hardcoded-secrets", "transport-security"]
        );
        assert!(options.custom_rules.is_none());
        assert_eq!(options.min_severity, Some(Severity::High));
    }

    #[test]
    fn test_handle_scan_succeeds_outside_ci() {
        // Outside CI a scan exits 0 even when findings are present.
        let tmp = TempDir::new().unwrap();
        let cli = create_test_cli(&[tmp.path().to_str().unwrap()]);
        assert_eq!(handle_scan(&cli), HandlerResult::Success);
    }

    #[test]
    fn test_handle_fix_dry_run_succeeds() {
        let tmp = TempDir::new().unwrap();
        let cli = create_test_cli(&["--fix-dry-run", tmp.path().to_str().unwrap()]);
        assert_eq!(handle_fix(&cli), HandlerResult::Success);
    }

    #[test]
    fn test_install_hook_writes_script_and_settings() {
        let tmp = TempDir::new().unwrap();
        let installed = install_hook(Some(tmp.path())).unwrap();

        assert!(installed.script.exists());
        let script = fs::read_to_string(&installed.script).unwrap();
        assert!(script.starts_with("#!/bin/sh"));
        assert!(script.contains("grep -qE"));
        assert!(script.contains("exit 2"));

        let settings: Value =
            serde_json::from_str(&fs::read_to_string(&installed.settings).unwrap()).unwrap();
        let group = &settings["hooks"]["PreToolUse"][0];
        assert_eq!(group["matcher"], "Write|Edit|Bash");
        assert_eq!(group["hooks"][0]["type"], "command");

        let cmd = installed.script.to_string_lossy().into_owned();
        assert_eq!(group["hooks"][0]["command"].as_str(), Some(cmd.as_str()));
    }

    #[cfg(unix)]
    #[test]
    fn test_guard_script_mode_700() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let installed = install_hook(Some(tmp.path())).unwrap();
        let mode = fs::metadata(&installed.script)
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn test_install_hook_preserves_existing_settings() {
        let tmp = TempDir::new().unwrap();
        let claude = tmp.path().join(".claude");
        fs::create_dir_all(&claude).unwrap();
        fs::write(
            claude.join("settings.json"),
            r#"{"model": "opus", "hooks": {"PostToolUse": []}}"#,
        )
        .unwrap();

        let installed = install_hook(Some(tmp.path())).unwrap();
        let settings: Value =
            serde_json::from_str(&fs::read_to_string(&installed.settings).unwrap()).unwrap();

        assert_eq!(settings["model"], "opus");
        assert!(settings["hooks"]["PostToolUse"].is_array());
        assert_eq!(settings["hooks"]["PreToolUse"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_install_hook_appends_to_existing_groups() {
        let tmp = TempDir::new().unwrap();
        let claude = tmp.path().join(".claude");
        fs::create_dir_all(&claude).unwrap();
        fs::write(
            claude.join("settings.json"),
            r#"{"hooks": {"PreToolUse": [{"matcher": "Bash", "hooks": [{"type": "command", "command": "existing.sh"}]}]}}"#,
        )
        .unwrap();

        let installed = install_hook(Some(tmp.path())).unwrap();
        let settings: Value =
            serde_json::from_str(&fs::read_to_string(&installed.settings).unwrap()).unwrap();

        let groups = settings["hooks"]["PreToolUse"].as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["hooks"][0]["command"], "existing.sh");
    }

    #[test]
    fn test_install_hook_twice_already_installed() {
        let tmp = TempDir::new().unwrap();
        install_hook(Some(tmp.path())).unwrap();
        let err = install_hook(Some(tmp.path())).unwrap_err();
        assert!(matches!(err, FortifyError::HookAlreadyInstalled(_)));
    }

    #[test]
    fn test_install_hook_malformed_settings() {
        let tmp = TempDir::new().unwrap();
        let claude = tmp.path().join(".claude");
        fs::create_dir_all(&claude).unwrap();
        fs::write(claude.join("settings.json"), "not json {").unwrap();

        let err = install_hook(Some(tmp.path())).unwrap_err();
        assert!(matches!(err, FortifyError::ParseError { .. }));
    }

    #[test]
    fn test_install_hook_settings_root_not_object() {
        let tmp = TempDir::new().unwrap();
        let claude = tmp.path().join(".claude");
        fs::create_dir_all(&claude).unwrap();
        fs::write(claude.join("settings.json"), "[]").unwrap();

        let err = install_hook(Some(tmp.path())).unwrap_err();
        assert!(matches!(err, FortifyError::ParseError { .. }));

        // Nothing was written for the failed install.
        assert!(!tmp.path().join(".claude/hooks").exists());
    }

    #[test]
    fn test_handle_init_hook_success_then_already_installed() {
        let tmp = TempDir::new().unwrap();
        let cli = create_test_cli(&["--init-hook", tmp.path().to_str().unwrap()]);
        assert_eq!(handle_init_hook(&cli), HandlerResult::Success);
        assert_eq!(handle_init_hook(&cli), HandlerResult::Error(2));
    }
}
