//! Platform detection utilities

use std::fs;

/// Where speechpad is running, as far as backend choice is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux under Windows Subsystem for Linux
    Wsl,
    Linux,
    MacOs,
    Other,
}

impl Platform {
    /// Detect the current platform
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "linux" if is_wsl() => Platform::Wsl,
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            _ => Platform::Other,
        }
    }
}

/// Detect if running in WSL (Windows Subsystem for Linux)
///
/// Checks /proc/version for a Microsoft kernel and the WSL_DISTRO_NAME
/// environment variable.
pub fn is_wsl() -> bool {
    if let Ok(contents) = fs::read_to_string("/proc/version") {
        let lower = contents.to_lowercase();
        if lower.contains("microsoft") || lower.contains("wsl") {
            return true;
        }
    }

    std::env::var("WSL_DISTRO_NAME").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_matches_os() {
        let platform = Platform::detect();
        match std::env::consts::OS {
            "linux" => assert!(matches!(platform, Platform::Linux | Platform::Wsl)),
            "macos" => assert_eq!(platform, Platform::MacOs),
            _ => assert_eq!(platform, Platform::Other),
        }
    }
}
