//! Scan target discovery: enumerates the MCP configuration files worth
//! scanning, loading each file's content up front so rules never touch the
//! filesystem themselves.

use crate::platform::ConfigPaths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files larger than this are listed but never read into memory.
pub const MAX_FILE_SIZE: u64 = 1_048_576;

/// Filenames probed inside each MCP server directory.
const SERVER_DIR_CANDIDATES: [&str; 6] = [
    "config.json",
    ".env",
    "run.sh",
    "server.py",
    "index.js",
    "index.ts",
];

/// Provenance of a scan target. Rules use the kind to pick which heuristics
/// apply to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// Claude Code settings.json
    ClaudeSettings,
    /// Claude Desktop configuration file
    ClaudeDesktop,
    /// Per-server MCP configuration (config.json and friends)
    McpServerConfig,
    /// Dotenv-style environment file
    EnvFile,
    /// Shell script that launches a server
    LaunchScript,
    /// Project-local .mcp.json manifest
    ProjectConfig,
}

impl TargetKind {
    /// Classifies a path by its filename. `settings.json` is Claude settings,
    /// `*.env` is an env file, `*.sh` is a launch script, and everything else
    /// is treated as MCP server configuration.
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        if file_name == "settings.json" {
            Self::ClaudeSettings
        } else if file_name.ends_with(".env") {
            Self::EnvFile
        } else if file_name.ends_with(".sh") {
            Self::LaunchScript
        } else {
            Self::McpServerConfig
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClaudeSettings => "claude-settings",
            Self::ClaudeDesktop => "claude-desktop",
            Self::McpServerConfig => "mcp-server-config",
            Self::EnvFile => "env-file",
            Self::LaunchScript => "launch-script",
            Self::ProjectConfig => "project-config",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file selected for scanning. `content` is `None` when the file was
/// oversized or unreadable; such targets still appear in the scanned-file
/// list, and content-based rules skip them.
#[derive(Debug, Clone)]
pub struct ScanTarget {
    pub path: PathBuf,
    pub kind: TargetKind,
    pub content: Option<String>,
}

impl ScanTarget {
    /// Creates a target with explicit kind, reading content through the size
    /// cap.
    pub fn load(path: PathBuf, kind: TargetKind) -> Self {
        let content = read_capped(&path);
        Self {
            path,
            kind,
            content,
        }
    }

    /// Creates a target, classifying the kind from the filename.
    pub fn from_path(path: PathBuf) -> Self {
        let kind = TargetKind::from_path(&path);
        Self::load(path, kind)
    }
}

/// Reads a file into memory, refusing files over [`MAX_FILE_SIZE`]. Any
/// read or metadata error yields `None` rather than failing the scan.
pub fn read_capped(path: &Path) -> Option<String> {
    let metadata = fs::metadata(path).ok()?;
    if metadata.len() > MAX_FILE_SIZE {
        debug!(path = %path.display(), size = metadata.len(), "skipping oversized file");
        return None;
    }
    fs::read_to_string(path).ok()
}

/// Enumerates scan targets from the well-known locations plus the optional
/// user-supplied path. Sources are probed in a fixed order so output is
/// deterministic; nonexistent files are silently skipped.
pub fn discover_targets(custom_path: Option<&Path>) -> Vec<ScanTarget> {
    let mut targets = Vec::new();

    if let Ok(paths) = ConfigPaths::resolve() {
        collect_home_targets(&paths, &mut targets);
    }

    collect_project_targets(custom_path, &mut targets);
    targets
}

/// Home-directory sources: Claude Code settings, Claude Desktop config, and
/// per-server directories under `~/.claude/mcp-servers`.
pub fn collect_home_targets(paths: &ConfigPaths, targets: &mut Vec<ScanTarget>) {
    if paths.settings.exists() {
        targets.push(ScanTarget::load(
            paths.settings.clone(),
            TargetKind::ClaudeSettings,
        ));
    }

    if paths.desktop_config.exists() {
        targets.push(ScanTarget::load(
            paths.desktop_config.clone(),
            TargetKind::ClaudeDesktop,
        ));
    }

    collect_server_dirs(&paths.servers_dir, targets);
}

/// Probes each subdirectory of the servers dir for well-known filenames.
/// Subdirectories are visited in name order; listing errors are swallowed.
fn collect_server_dirs(servers_dir: &Path, targets: &mut Vec<ScanTarget>) {
    let Ok(entries) = fs::read_dir(servers_dir) else {
        return;
    };

    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    for dir in dirs {
        for candidate in SERVER_DIR_CANDIDATES {
            let path = dir.join(candidate);
            if path.exists() {
                targets.push(ScanTarget::from_path(path));
            }
        }
    }
}

/// Project-level sources: `.mcp.json` under the custom path (or the current
/// directory), and `claude_desktop_config.json` under the custom path.
fn collect_project_targets(custom_path: Option<&Path>, targets: &mut Vec<ScanTarget>) {
    let base = match custom_path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let mcp_json = base.join(".mcp.json");
    if mcp_json.exists() {
        targets.push(ScanTarget::load(mcp_json, TargetKind::ProjectConfig));
    }

    if let Some(custom) = custom_path {
        let desktop = custom.join("claude_desktop_config.json");
        if desktop.exists() {
            targets.push(ScanTarget::load(desktop, TargetKind::ClaudeDesktop));
        }
    }
}
