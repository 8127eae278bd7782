use crate::discovery::{ScanTarget, TargetKind};
use crate::platform::Platform;
use crate::rules::types::{Finding, Rule, Severity};
use std::fs;
use std::path::Path;

/// Flags config files and launch scripts readable or writable by anyone
/// other than their owner. A no-op on platforms without POSIX permission
/// bits.
pub struct FilePermissions;

#[cfg(unix)]
fn mode_bits(path: &Path) -> Option<u32> {
    use std::os::unix::fs::MetadataExt;
    fs::metadata(path).ok().map(|m| m.mode() & 0o777)
}

#[cfg(not(unix))]
fn mode_bits(_path: &Path) -> Option<u32> {
    None
}

impl Rule for FilePermissions {
    fn id(&self) -> &str {
        "file-permissions"
    }

    fn name(&self) -> &str {
        "Insecure File Permissions"
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn description(&self) -> &str {
        "Detects MCP config and credential files with overly permissive file permissions"
    }

    fn run(&self, targets: &[ScanTarget]) -> Vec<Finding> {
        if !Platform::current().supports_posix_permissions() {
            return Vec::new();
        }

        let mut findings = Vec::new();

        for target in targets {
            // inaccessible files are skipped, not reported
            let Some(mode) = mode_bits(&target.path) else {
                continue;
            };

            let group_accessible = mode & 0o040 != 0 || mode & 0o020 != 0;
            let world_accessible = mode & 0o004 != 0 || mode & 0o002 != 0;
            if !group_accessible && !world_accessible {
                continue;
            }

            let octal = format!("{mode:03o}");
            let is_script = target.kind == TargetKind::LaunchScript
                || target.path.to_string_lossy().ends_with(".sh");
            let expected = if is_script { "700" } else { "600" };

            // Scripts need the owner execute bit, so 700 is acceptable
            if is_script && mode == 0o700 {
                continue;
            }

            let severity = if world_accessible {
                Severity::High
            } else {
                Severity::Medium
            };
            let access = if world_accessible {
                "Other users on this system can read this file."
            } else {
                "Group members can access this file."
            };
            let file_kind = if is_script {
                "launch script"
            } else {
                "config file"
            };
            let kind_plural = if is_script {
                "Launch scripts"
            } else {
                "Config files"
            };

            findings.push(
                self.finding(
                    format!("Insecure permissions ({octal}) on {file_kind}"),
                    format!(
                        "{} has permissions {octal}. {access} {kind_plural} should be restricted to owner-only access.",
                        target.path.display()
                    ),
                    &target.path,
                    format!("Run: chmod {expected} \"{}\"", target.path.display()),
                )
                .with_severity(severity)
                .with_evidence(format!("Current: {octal}, Expected: {expected}")),
            );
        }

        findings
    }
}
