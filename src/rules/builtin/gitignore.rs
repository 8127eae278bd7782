use crate::discovery::{ScanTarget, TargetKind};
use crate::rules::types::{Finding, Rule, Severity};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Gitignore lookups walk at most this many directories, starting at the
/// directory holding the sensitive file.
const MAX_GITIGNORE_DEPTH: usize = 4;

/// Checks that directories holding env files are covered by a `.gitignore`
/// somewhere in their ancestry, and that the gitignore actually excludes
/// `.env` files.
pub struct MissingGitignore;

impl Rule for MissingGitignore {
    fn id(&self) -> &str {
        "missing-gitignore"
    }

    fn name(&self) -> &str {
        "Missing .gitignore Protection"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn description(&self) -> &str {
        "Checks if MCP server directories with sensitive files have proper .gitignore coverage"
    }

    fn run(&self, targets: &[ScanTarget]) -> Vec<Finding> {
        let mut findings = Vec::new();

        let mut by_dir: BTreeMap<PathBuf, Vec<&ScanTarget>> = BTreeMap::new();
        for target in targets {
            let dir = target
                .path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .to_path_buf();
            by_dir.entry(dir).or_default().push(target);
        }

        for (dir, dir_targets) in &by_dir {
            let has_sensitive = dir_targets.iter().any(|t| {
                t.kind == TargetKind::EnvFile || t.path.to_string_lossy().ends_with(".env")
            });
            if !has_sensitive {
                continue;
            }

            match find_gitignore(dir) {
                None => {
                    findings.push(self.finding(
                        "No .gitignore protecting sensitive files",
                        format!(
                            "Directory {} contains sensitive files (.env) but no .gitignore was found in the directory tree. If this directory is ever version-controlled, secrets could be committed.",
                            dir.display()
                        ),
                        dir,
                        format!(
                            "Create a .gitignore in {} with at least: .env, *.key, *.pem",
                            dir.display()
                        ),
                    ));
                }
                Some((gitignore_path, content)) => {
                    if !covers_env_files(&content) {
                        findings.push(
                            self.finding(
                                ".gitignore does not cover .env files",
                                format!(
                                    "A .gitignore exists at {} but does not include .env patterns. The .env file in {} could be accidentally committed.",
                                    gitignore_path.display(),
                                    dir.display()
                                ),
                                &gitignore_path,
                                "Add \".env\" and \".env*\" to your .gitignore file.",
                            )
                            .with_severity(Severity::Low),
                        );
                    }
                }
            }
        }

        findings
    }
}

/// Walks up from `dir` looking for a readable `.gitignore`. The first
/// existing candidate ends the search even if it turns out to be unreadable.
fn find_gitignore(dir: &Path) -> Option<(PathBuf, String)> {
    let mut search_dir = dir.to_path_buf();

    for _ in 0..MAX_GITIGNORE_DEPTH {
        let candidate = search_dir.join(".gitignore");
        if candidate.exists() {
            return fs::read_to_string(&candidate)
                .ok()
                .map(|content| (candidate, content));
        }
        match search_dir.parent() {
            Some(parent) => search_dir = parent.to_path_buf(),
            None => break,
        }
    }

    None
}

fn covers_env_files(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .any(|line| matches!(line, ".env" | ".env*" | "*.env" | ".env.*"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env_target(dir: &Path) -> ScanTarget {
        let path = dir.join(".env");
        fs::write(&path, "API_KEY=placeholder").unwrap();
        ScanTarget {
            path,
            kind: TargetKind::EnvFile,
            content: Some("API_KEY=placeholder".to_string()),
        }
    }

    #[test]
    fn test_missing_gitignore_flagged() {
        let tmp = TempDir::new().unwrap();
        let targets = vec![env_target(tmp.path())];
        let findings = MissingGitignore.run(&targets);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
        assert_eq!(findings[0].title, "No .gitignore protecting sensitive files");
        assert_eq!(findings[0].file_path, tmp.path().display().to_string());
    }

    #[test]
    fn test_covering_gitignore_passes() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".gitignore"), ".env\nnode_modules/\n").unwrap();
        let targets = vec![env_target(tmp.path())];
        assert!(MissingGitignore.run(&targets).is_empty());
    }

    #[test]
    fn test_gitignore_without_env_pattern_is_low() {
        let tmp = TempDir::new().unwrap();
        let gitignore = tmp.path().join(".gitignore");
        fs::write(&gitignore, "node_modules/\ndist/\n").unwrap();
        let targets = vec![env_target(tmp.path())];
        let findings = MissingGitignore.run(&targets);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Low);
        assert_eq!(findings[0].title, ".gitignore does not cover .env files");
        assert_eq!(findings[0].file_path, gitignore.display().to_string());
    }

    #[test]
    fn test_gitignore_found_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".gitignore"), ".env*\n").unwrap();
        let nested = tmp.path().join("servers/github");
        fs::create_dir_all(&nested).unwrap();
        let targets = vec![env_target(&nested)];
        assert!(MissingGitignore.run(&targets).is_empty());
    }

    #[test]
    fn test_gitignore_beyond_search_depth_not_found() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".gitignore"), ".env\n").unwrap();
        let nested = tmp.path().join("a/b/c/d");
        fs::create_dir_all(&nested).unwrap();
        let targets = vec![env_target(&nested)];
        let findings = MissingGitignore.run(&targets);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "No .gitignore protecting sensitive files");
    }

    #[test]
    fn test_directories_without_env_files_ignored() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{}").unwrap();
        let targets = vec![ScanTarget {
            path,
            kind: TargetKind::McpServerConfig,
            content: Some("{}".to_string()),
        }];
        assert!(MissingGitignore.run(&targets).is_empty());
    }

    #[test]
    fn test_one_finding_per_directory() {
        let tmp = TempDir::new().unwrap();
        let env = env_target(tmp.path());
        let prod = tmp.path().join("prod.env");
        fs::write(&prod, "").unwrap();
        let targets = vec![
            env,
            ScanTarget {
                path: prod,
                kind: TargetKind::EnvFile,
                content: Some(String::new()),
            },
        ];
        let findings = MissingGitignore.run(&targets);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_env_pattern_variants_cover() {
        for pattern in [".env", ".env*", "*.env", ".env.*"] {
            assert!(covers_env_files(pattern), "pattern {pattern} should cover");
        }
        assert!(!covers_env_files("env\n.environment\n"));
    }
}
