//! User defaults read from a TOML file.

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{MAX_PIECE_LENGTH_EXP, SETTINGS_FILE};

/// Defaults applied when the matching command-line flag is absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub announce: Option<String>,
    pub source: Option<String>,
    /// Piece length exponent (2^N bytes)
    pub piece_length: Option<u32>,
    pub threads: Option<usize>,
    /// Directory for created torrents; `~` is expanded
    pub output_dir: Option<String>,
}

impl Settings {
    /// `<config dir>/piecewright/config.toml` for the current user
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "piecewright").map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Load settings from `explicit`, or from the default location if it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };
        debug!(path = %path.display(), "loading settings");
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        if let Some(exp) = settings.piece_length {
            if exp > MAX_PIECE_LENGTH_EXP {
                bail!("piece_length exponent {} exceeds {}", exp, MAX_PIECE_LENGTH_EXP);
            }
        }
        Ok(settings)
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        self.output_dir
            .as_deref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings() {
        let settings = Settings::from_toml(
            r#"
            announce = "https://tracker.example/announce"
            source = "EX"
            piece_length = 20
            threads = 3
            "#,
        )
        .unwrap();
        assert_eq!(settings.announce.as_deref(), Some("https://tracker.example/announce"));
        assert_eq!(settings.source.as_deref(), Some("EX"));
        assert_eq!(settings.piece_length, Some(20));
        assert_eq!(settings.threads, Some(3));
        assert_eq!(settings.output_dir(), None);
    }

    #[test]
    fn test_empty_settings_are_defaults() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_exponent() {
        assert!(Settings::from_toml("comment = \"x\"").is_err());
        assert!(Settings::from_toml("piece_length = 41").is_err());
    }

    #[test]
    fn test_output_dir_expands_tilde() {
        let settings = Settings {
            output_dir: Some("~/torrents".to_string()),
            ..Settings::default()
        };
        let dir = settings.output_dir().unwrap();
        assert!(dir.ends_with("torrents"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "source = \"FILE\"\n").unwrap();
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.source.as_deref(), Some("FILE"));

        assert!(Settings::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
