use crate::discovery::{ScanTarget, TargetKind};
use crate::rules::types::{truncate_evidence, Finding, Rule, Severity};
use regex::Regex;
use std::sync::LazyLock;

struct InjectionPattern {
    regex: Regex,
    name: &'static str,
}

fn injection_pattern(name: &'static str, pattern: &str) -> InjectionPattern {
    let regex = Regex::new(pattern).unwrap_or_else(|e| panic!("{name}: invalid regex: {e}"));
    InjectionPattern { regex, name }
}

/// Unsanitized shell execution, checked in launch scripts and Python servers.
static DANGEROUS_PATTERNS: LazyLock<Vec<InjectionPattern>> = LazyLock::new(|| {
    vec![
        injection_pattern("Variable piped to shell command", r"\$\{?\w*\}?\s*[|;&]"),
        injection_pattern(
            "Variable interpolation in backtick execution",
            r"`[^`]*\$\{?\w+\}?[^`]*`",
        ),
        injection_pattern("eval() usage", r"eval\s*\("),
        injection_pattern(
            "Direct child process execution",
            r"child_process|execSync|exec\(|spawn\(",
        ),
        injection_pattern("Python os.system()", r"os\.system\s*\("),
        injection_pattern(
            "Python subprocess with string (not list)",
            r#"subprocess\.(call|run|Popen)\s*\(\s*(f"|f'|[^\[])"#,
        ),
        injection_pattern("Shell mode enabled", r"shell\s*[:=]\s*true"),
    ]
});

/// Injection shapes that show up inside JSON configs.
static CONFIG_INJECTION_PATTERNS: LazyLock<Vec<InjectionPattern>> = LazyLock::new(|| {
    vec![
        injection_pattern("Unquoted variable expansion in config", r#""\$\{[^}]+\}""#),
        injection_pattern(
            "Chained dangerous command in config",
            r";\s*(rm|curl|wget|chmod|chown)\b",
        ),
    ]
});

/// Flags lines that could let attacker-controlled input reach a shell.
/// Launch scripts and `.py` files get the full shell pattern table; config
/// files get the config-specific one.
pub struct CommandInjection;

impl Rule for CommandInjection {
    fn id(&self) -> &str {
        "command-injection"
    }

    fn name(&self) -> &str {
        "Command Injection Risk"
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn description(&self) -> &str {
        "Detects potential command injection vectors in MCP server configs and launch scripts"
    }

    fn run(&self, targets: &[ScanTarget]) -> Vec<Finding> {
        let mut findings = Vec::new();

        for target in targets {
            let Some(content) = &target.content else {
                continue;
            };

            let script_like = target.kind == TargetKind::LaunchScript
                || target.path.to_string_lossy().ends_with(".py");
            let patterns: &[InjectionPattern] = if script_like {
                &DANGEROUS_PATTERNS
            } else {
                &CONFIG_INJECTION_PATTERNS
            };

            for (idx, raw_line) in content.lines().enumerate() {
                let line = raw_line.trim();
                if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                    continue;
                }

                // one finding per line, first matching pattern wins
                for pattern in patterns {
                    if pattern.regex.is_match(line) {
                        findings.push(
                            self.finding(
                                format!("Potential command injection: {}", pattern.name),
                                format!(
                                    "{} detected in {}. This pattern can allow an attacker to inject arbitrary commands if input is not properly sanitized.",
                                    pattern.name,
                                    target.path.display()
                                ),
                                &target.path,
                                "Use parameterized commands (arrays instead of strings), avoid shell=true, and validate/sanitize all input before passing to shell commands.",
                            )
                            .with_line(idx + 1)
                            .with_evidence(truncate_evidence(line)),
                        );
                        break;
                    }
                }
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn target(path: &str, kind: TargetKind, content: &str) -> ScanTarget {
        ScanTarget {
            path: PathBuf::from(path),
            kind,
            content: Some(content.to_string()),
        }
    }

    #[test]
    fn test_detects_eval_in_launch_script() {
        let targets = vec![target(
            "/srv/run.sh",
            TargetKind::LaunchScript,
            "#!/bin/bash\neval(\"$USER_INPUT\")",
        )];
        let findings = CommandInjection.run(&targets);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Critical);
        assert_eq!(findings[0].title, "Potential command injection: eval() usage");
        assert_eq!(findings[0].line, Some(2));
    }

    #[test]
    fn test_python_file_uses_shell_pattern_table() {
        let targets = vec![target(
            "/tmp/server.py",
            TargetKind::McpServerConfig,
            "import subprocess\nsubprocess.run(cmd, shell=True)",
        )];
        let findings = CommandInjection.run(&targets);

        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].title,
            "Potential command injection: Python subprocess with string (not list)"
        );
    }

    #[test]
    fn test_subprocess_with_list_is_clean() {
        let targets = vec![target(
            "/tmp/server.py",
            TargetKind::McpServerConfig,
            "subprocess.run([\"ls\", \"-la\"])",
        )];
        assert!(CommandInjection.run(&targets).is_empty());
    }

    #[test]
    fn test_comments_are_skipped() {
        let targets = vec![target(
            "/srv/run.sh",
            TargetKind::LaunchScript,
            "# eval() is dangerous\n// exec( too",
        )];
        assert!(CommandInjection.run(&targets).is_empty());
    }

    #[test]
    fn test_variable_piped_to_shell() {
        let targets = vec![target(
            "/srv/run.sh",
            TargetKind::LaunchScript,
            "echo $QUERY | sh",
        )];
        let findings = CommandInjection.run(&targets);

        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].title,
            "Potential command injection: Variable piped to shell command"
        );
    }

    #[test]
    fn test_config_expansion_pattern() {
        let targets = vec![target(
            "/tmp/config.json",
            TargetKind::McpServerConfig,
            r#"{"args": ["${USER_INPUT}"]}"#,
        )];
        let findings = CommandInjection.run(&targets);

        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].title,
            "Potential command injection: Unquoted variable expansion in config"
        );
    }

    #[test]
    fn test_chained_command_in_config() {
        let targets = vec![target(
            "/tmp/config.json",
            TargetKind::McpServerConfig,
            r#"{"command": "node server.js; rm -rf /tmp/cache"}"#,
        )];
        let findings = CommandInjection.run(&targets);

        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].title,
            "Potential command injection: Chained dangerous command in config"
        );
    }

    #[test]
    fn test_config_files_skip_shell_table() {
        // eval() in a JSON config is not flagged; only the config table runs
        let targets = vec![target(
            "/tmp/config.json",
            TargetKind::McpServerConfig,
            r#"{"note": "eval(x) is used by the server"}"#,
        )];
        assert!(CommandInjection.run(&targets).is_empty());
    }

    #[test]
    fn test_one_finding_per_line() {
        let targets = vec![target(
            "/srv/run.sh",
            TargetKind::LaunchScript,
            "eval($CMD) | sh",
        )];
        let findings = CommandInjection.run(&targets);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_long_evidence_is_truncated() {
        let long_arg = "x".repeat(150);
        let content = format!("eval(\"{long_arg}\")");
        let targets = vec![target("/srv/run.sh", TargetKind::LaunchScript, &content)];
        let findings = CommandInjection.run(&targets);

        let evidence = findings[0].evidence.as_deref().unwrap();
        assert_eq!(evidence.chars().count(), 103);
        assert!(evidence.ends_with("..."));
    }

    #[test]
    fn test_clean_launch_script() {
        let targets = vec![target(
            "/srv/run.sh",
            TargetKind::LaunchScript,
            "#!/bin/bash\nnode server.js --port 3000",
        )];
        assert!(CommandInjection.run(&targets).is_empty());
    }
}
