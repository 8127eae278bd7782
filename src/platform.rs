//! Host platform detection and well-known configuration locations.

use crate::error::{FortifyError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Host operating system, as far as path layout is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    /// Detects the platform this binary was built for. Anything that is
    /// neither macOS nor Windows is treated as Linux.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Whether POSIX permission bits are meaningful on this platform.
    pub fn supports_posix_permissions(self) -> bool {
        !matches!(self, Platform::Windows)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Linux => "linux",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Well-known locations probed during target discovery.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Claude Code settings: `~/.claude/settings.json` on every platform.
    pub settings: PathBuf,
    /// Claude Desktop config; location varies per platform.
    pub desktop_config: PathBuf,
    /// Directory of per-server MCP subdirectories.
    pub servers_dir: PathBuf,
    /// Directory holding hook scripts.
    pub hooks_dir: PathBuf,
}

impl ConfigPaths {
    /// Computes all well-known paths under `home`. Pure so path layout is
    /// testable on any host.
    pub fn for_home(platform: Platform, home: &Path) -> Self {
        let claude = home.join(".claude");
        let desktop_config = match platform {
            Platform::MacOs => home
                .join("Library")
                .join("Application Support")
                .join("Claude")
                .join("claude_desktop_config.json"),
            Platform::Windows => home
                .join("AppData")
                .join("Roaming")
                .join("Claude")
                .join("claude_desktop_config.json"),
            Platform::Linux => home
                .join(".config")
                .join("Claude")
                .join("claude_desktop_config.json"),
        };

        ConfigPaths {
            settings: claude.join("settings.json"),
            desktop_config,
            servers_dir: claude.join("mcp-servers"),
            hooks_dir: claude.join("hooks"),
        }
    }

    /// Resolves paths for the current user's home directory.
    pub fn resolve() -> Result<Self> {
        let home = home_dir()?;
        Ok(Self::for_home(Platform::current(), &home))
    }
}

/// The current user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(FortifyError::HomeDirNotFound)
}
