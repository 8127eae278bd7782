use crate::rules::{Finding, ScanResult};
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Outcome of one chmod attempt.
#[derive(Debug)]
pub struct FixOutcome {
    pub fixed: bool,
    pub action: String,
    pub error: Option<String>,
}

/// Applies chmod-based remediation for file-permissions findings. Everything
/// else is surfaced as a manual fix; no other rule has a safe automatic edit.
pub struct PermissionFixer {
    dry_run: bool,
}

impl PermissionFixer {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Applies fixes (unless dry-run) and returns the rendered report.
    pub fn run(&self, result: &ScanResult) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push(String::new());
        lines.push("  MCP Fortify — Auto-Fix".bold().to_string());
        lines.push(String::new());

        let (fixable, non_fixable): (Vec<&Finding>, Vec<&Finding>) = result
            .findings
            .iter()
            .partition(|f| f.rule_id == "file-permissions");

        if fixable.is_empty() {
            lines.push("  No auto-fixable issues found.".green().to_string());
            if !non_fixable.is_empty() {
                lines.push(
                    format!(
                        "  {} finding(s) require manual remediation.",
                        non_fixable.len()
                    )
                    .bright_black()
                    .to_string(),
                );
            }
            lines.push(String::new());
            return lines.join("\n");
        }

        if self.dry_run {
            lines.push(
                "  DRY RUN — no changes will be made:"
                    .yellow()
                    .to_string(),
            );
            lines.push(String::new());
            for finding in &fixable {
                let octal = if finding.file_path.ends_with(".sh") {
                    "700"
                } else {
                    "600"
                };
                lines.push(
                    format!("  chmod {octal} \"{}\"", finding.file_path)
                        .bright_black()
                        .to_string(),
                );
            }
            lines.push(String::new());
            return lines.join("\n");
        }

        let outcomes: Vec<FixOutcome> = fixable.iter().map(|f| fix_permissions(f)).collect();
        let (fixed, failed): (Vec<&FixOutcome>, Vec<&FixOutcome>) =
            outcomes.iter().partition(|o| o.fixed);

        for outcome in &fixed {
            lines.push(format!("{}{}", "  + Fixed: ".green(), outcome.action));
        }
        for outcome in &failed {
            lines.push(format!(
                "{}{} — {}",
                "  x Failed: ".red(),
                outcome.action,
                outcome.error.as_deref().unwrap_or("unknown error")
            ));
        }

        lines.push(String::new());
        let mut summary = format!("  {} fixed", fixed.len()).bold().to_string();
        if !failed.is_empty() {
            summary.push_str(&format!(", {} failed", failed.len()).red().to_string());
        }
        if !non_fixable.is_empty() {
            summary.push_str(
                &format!(", {} require manual fix", non_fixable.len())
                    .bright_black()
                    .to_string(),
            );
        }
        lines.push(summary);

        if !non_fixable.is_empty() {
            lines.push(String::new());
            lines.push("  Manual fixes needed:".bright_black().to_string());
            for finding in &non_fixable {
                lines.push(
                    format!("  - [{}] {}", finding.severity, finding.title)
                        .bright_black()
                        .to_string(),
                );
                lines.push(
                    format!("    {}", finding.recommendation)
                        .bright_black()
                        .to_string(),
                );
            }
        }

        lines.push(String::new());
        lines.join("\n")
    }
}

/// Scripts get 700 so they stay executable for the owner; everything else
/// drops to 600. The mode is re-read afterwards to confirm the change stuck.
#[cfg(unix)]
fn fix_permissions(finding: &Finding) -> FixOutcome {
    use std::os::unix::fs::PermissionsExt;

    let is_script = finding.file_path.ends_with(".sh");
    let target_mode = if is_script { 0o700 } else { 0o600 };
    let target_octal = if is_script { "700" } else { "600" };
    let action = format!("chmod {target_octal} \"{}\"", finding.file_path);

    let path = Path::new(&finding.file_path);
    let attempt = fs::set_permissions(path, fs::Permissions::from_mode(target_mode))
        .and_then(|()| fs::metadata(path));

    match attempt {
        Ok(metadata) => {
            let actual = metadata.permissions().mode() & 0o777;
            if actual == target_mode {
                FixOutcome {
                    fixed: true,
                    action,
                    error: None,
                }
            } else {
                FixOutcome {
                    fixed: false,
                    action,
                    error: Some(format!("Permissions still {actual:03o} after fix attempt")),
                }
            }
        }
        Err(e) => FixOutcome {
            fixed: false,
            action: format!("chmod on \"{}\"", finding.file_path),
            error: Some(e.to_string()),
        },
    }
}

#[cfg(not(unix))]
fn fix_permissions(finding: &Finding) -> FixOutcome {
    FixOutcome {
        fixed: false,
        action: format!("chmod on \"{}\"", finding.file_path),
        error: Some("POSIX permissions are not supported on this platform".to_string()),
    }
}
