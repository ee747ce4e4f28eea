//! Host platform buckets for speech defaults

use std::fmt;

pub const DEFAULT_WINDOWS_VOICE: &str = "Microsoft David Desktop - English (United States)";
pub const DEFAULT_MAC_OS_VOICE: &str = "Samantha";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Other,
}

impl Platform {
    /// Platform this binary was built for
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn from_os_name(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            _ => Platform::Other,
        }
    }

    /// Voice used when the configuration names none
    pub fn default_voice(&self) -> Option<&'static str> {
        match self {
            Platform::Windows => Some(DEFAULT_WINDOWS_VOICE),
            Platform::MacOs => Some(DEFAULT_MAC_OS_VOICE),
            Platform::Other => None,
        }
    }

    /// Whether the native `say` command exists here
    pub fn supports_native_speech(&self) -> bool {
        matches!(self, Platform::MacOs)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => write!(f, "Windows"),
            Platform::MacOs => write!(f, "macOS"),
            Platform::Other => write!(f, "Unix"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_buckets() {
        assert_eq!(Platform::from_os_name("windows"), Platform::Windows);
        assert_eq!(Platform::from_os_name("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os_name("linux"), Platform::Other);
        assert_eq!(Platform::from_os_name("freebsd"), Platform::Other);
    }

    #[test]
    fn test_default_voices() {
        assert_eq!(Platform::MacOs.default_voice(), Some("Samantha"));
        assert!(Platform::Windows
            .default_voice()
            .is_some_and(|v| v.starts_with("Microsoft David")));
        assert_eq!(Platform::Other.default_voice(), None);
    }
}
