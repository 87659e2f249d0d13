//! Configuration-file flags.
//!
//! Flags load from a global config file and a local override, merged in
//! that order; command-line flags win over both. The format is plain
//! `key value` lines, `#` comments allowed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::ui::Theme;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Blue,
    Dark,
    Light,
}

impl From<ThemeMode> for Theme {
    fn from(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Blue => Theme::Blue,
            ThemeMode::Dark => Theme::Dark,
            ThemeMode::Light => Theme::Light,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConfigFlags {
    pub theme: Option<ThemeMode>,
}

impl ConfigFlags {
    /// Merge, with `other` (the more local source) winning.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            theme: other.theme.or(self.theme),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("rulepad").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("rulepad")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("rulepad").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("rulepad")
                .join("config");
        }
    }

    PathBuf::from(".rulepadrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".rulepadrc")
}

/// Load flags from a config file; a missing file is an empty set of flags.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    Ok(parse_config_flags(&content))
}

fn parse_config_flags(content: &str) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("theme"), Some("blue")) => flags.theme = Some(ThemeMode::Blue),
            (Some("theme"), Some("dark")) => flags.theme = Some(ThemeMode::Dark),
            (Some("theme"), Some("light")) => flags.theme = Some(ThemeMode::Light),
            _ => {}
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_has_no_flags() {
        assert_eq!(parse_config_flags(""), ConfigFlags::default());
    }

    #[test]
    fn test_theme_flag_parses() {
        let flags = parse_config_flags("theme dark\n");
        assert_eq!(flags.theme, Some(ThemeMode::Dark));
    }

    #[test]
    fn test_comments_and_unknown_keys_ignored() {
        let flags = parse_config_flags("# a comment\nwhatever else\ntheme light\n");
        assert_eq!(flags.theme, Some(ThemeMode::Light));
    }

    #[test]
    fn test_union_prefers_local() {
        let global = parse_config_flags("theme dark");
        let local = parse_config_flags("theme light");
        assert_eq!(global.union(&local).theme, Some(ThemeMode::Light));
        assert_eq!(global.union(&ConfigFlags::default()).theme, Some(ThemeMode::Dark));
    }

    #[test]
    fn test_missing_file_is_default() {
        let flags = load_config_flags(Path::new("/no/such/rulepad/config")).unwrap();
        assert_eq!(flags, ConfigFlags::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "theme blue\n").unwrap();
        let flags = load_config_flags(&path).unwrap();
        assert_eq!(flags.theme, Some(ThemeMode::Blue));
    }
}
