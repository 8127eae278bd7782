use crate::discovery::{ScanTarget, TargetKind};
use crate::rules::types::{Finding, Rule, Severity};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static SECRET_HOOK_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)secret|credential|key|token|block").expect("secret hook hint: invalid regex")
});

/// Checks Claude Code settings for PreToolUse hooks that guard against
/// secret leakage. Escalates from "no hooks at all" down to a heuristic
/// warning when hooks exist but none look like a secret blocker.
pub struct MissingHooks;

impl Rule for MissingHooks {
    fn id(&self) -> &str {
        "missing-hooks"
    }

    fn name(&self) -> &str {
        "Missing Security Hooks"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn description(&self) -> &str {
        "Checks if Claude Code settings include PreToolUse hooks for secret blocking"
    }

    fn run(&self, targets: &[ScanTarget]) -> Vec<Finding> {
        let mut findings = Vec::new();

        for target in targets {
            if target.kind != TargetKind::ClaudeSettings {
                continue;
            }
            let Some(content) = &target.content else {
                continue;
            };
            let Ok(settings) = serde_json::from_str::<Value>(content) else {
                continue;
            };

            let pre_tool_use = match settings.get("hooks") {
                Some(Value::Object(hooks)) => hooks.get("PreToolUse"),
                Some(Value::Array(_)) => None,
                _ => {
                    findings.push(self.finding(
                        "No security hooks configured",
                        "Claude Code settings.json has no hooks defined. Without PreToolUse hooks, there is no automated guardrail to prevent secrets from being written to files or executed in commands.",
                        &target.path,
                        "Add a PreToolUse hook that blocks file writes containing secrets. See: https://docs.anthropic.com/en/docs/claude-code/hooks",
                    ));
                    continue;
                }
            };

            let entries = match pre_tool_use {
                Some(Value::Array(entries)) if !entries.is_empty() => entries,
                _ => {
                    findings.push(self.finding(
                        "No PreToolUse hooks configured",
                        "Hooks are defined but no PreToolUse hooks exist. PreToolUse hooks run before tool execution and can block dangerous operations like writing secrets to files.",
                        &target.path,
                        "Add a PreToolUse hook that scans for secret patterns before file writes. Example: a shell script that greps for API key patterns in tool input.",
                    ));
                    continue;
                }
            };

            if !has_secret_blocker(entries) {
                findings.push(
                    self.finding(
                        "PreToolUse hooks may not block secrets",
                        "PreToolUse hooks exist but none appear to check for secret/credential patterns. This is a heuristic check — if your hooks do block secrets with a non-obvious command name, this may be a false positive.",
                        &target.path,
                        "Ensure at least one PreToolUse hook scans for API key and credential patterns in file write operations.",
                    )
                    .with_severity(Severity::Low),
                );
            }
        }

        findings
    }
}

/// Claude Code hooks come in two shapes: flat `{ "command": ... }` entries
/// and nested `{ "matcher": ..., "hooks": [{ "command": ... }] }` groups.
/// Both are searched for commands that look like secret blockers.
fn has_secret_blocker(entries: &[Value]) -> bool {
    entries.iter().any(|group| {
        let Value::Object(group) = group else {
            return false;
        };

        let mut commands: Vec<&str> = Vec::new();
        if let Some(Value::String(cmd)) = group.get("command") {
            commands.push(cmd);
        }
        if let Some(Value::Array(hooks)) = group.get("hooks") {
            for hook in hooks {
                if let Some(Value::String(cmd)) = hook.get("command") {
                    commands.push(cmd);
                }
            }
        }

        commands.iter().any(|cmd| SECRET_HOOK_HINT.is_match(cmd))
    })
}
