//! Persisted client-side state: the highest transfer rates ever observed and
//! the user's filesystem path mappings, kept as a TOML file in the user
//! config dir. Read on startup, written on update.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Toml(String),
    #[error("no usable config directory")]
    NoConfigDir,
    #[error("invalid mapping: {0}")]
    InvalidMapping(String),
}

impl From<toml::de::Error> for SettingsError {
    fn from(value: toml::de::Error) -> Self {
        SettingsError::Toml(value.to_string())
    }
}

impl From<toml::ser::Error> for SettingsError {
    fn from(value: toml::ser::Error) -> Self {
        SettingsError::Toml(value.to_string())
    }
}

/// Maps a daemon-side base path onto a local protocol path, e.g.
/// `/downloads` onto `smb://nas/downloads`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathMapping {
    pub base: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub download_max: i64,
    pub upload_max: i64,
    pub path_mappings: Vec<PathMapping>,
}

impl Settings {
    fn file_path() -> Result<PathBuf, SettingsError> {
        ProjectDirs::from("", "", "shoal")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .ok_or(SettingsError::NoConfigDir)
    }

    /// Read the settings file, falling back to defaults when it is missing
    /// or unreadable.
    pub fn load() -> Self {
        match Self::file_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Self::default(),
        }
    }

    fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, path = %path.display(), "ignoring unreadable settings");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::file_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Track the highest rates seen; returns whether anything changed.
    pub fn record_rates(&mut self, download: i64, upload: i64) -> bool {
        let mut changed = false;
        if download > self.download_max {
            self.download_max = download;
            changed = true;
        }
        if upload > self.upload_max {
            self.upload_max = upload;
            changed = true;
        }
        changed
    }

    /// Apply the longest matching mapping to a daemon-side path.
    pub fn map_path(&self, path: &str) -> String {
        let mut best: Option<&PathMapping> = None;
        for mapping in &self.path_mappings {
            if path.starts_with(&mapping.base)
                && best.map_or(true, |current| mapping.base.len() > current.base.len())
            {
                best = Some(mapping);
            }
        }
        match best {
            Some(mapping) => format!("{}{}", mapping.path, &path[mapping.base.len()..]),
            None => path.to_string(),
        }
    }

    /// Add or replace the mapping for `base`.
    pub fn add_mapping(&mut self, base: String, path: String) -> Result<(), SettingsError> {
        if !base.starts_with('/') {
            return Err(SettingsError::InvalidMapping(
                "base must start with '/'".into(),
            ));
        }
        if !has_protocol_prefix(&path) {
            return Err(SettingsError::InvalidMapping(
                "path must start with a protocol (e.g. 'file:')".into(),
            ));
        }
        self.path_mappings.retain(|mapping| mapping.base != base);
        self.path_mappings.push(PathMapping { base, path });
        Ok(())
    }

    /// Drop the mapping for `base`; returns whether one existed.
    pub fn remove_mapping(&mut self, base: &str) -> bool {
        let before = self.path_mappings.len();
        self.path_mappings.retain(|mapping| mapping.base != base);
        self.path_mappings.len() != before
    }
}

fn has_protocol_prefix(path: &str) -> bool {
    match path.find(':') {
        Some(0) | None => false,
        Some(end) => path[..end]
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_roundtrip_through_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.record_rates(1_000_000, 250_000);
        settings
            .add_mapping("/downloads".into(), "smb://nas/downloads".into())
            .expect("add mapping");
        settings.save_to(&path).expect("save");

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.download_max, 1_000_000);
        assert_eq!(loaded.upload_max, 250_000);
        assert_eq!(loaded.path_mappings, settings.path_mappings);
    }

    #[test]
    fn missing_or_garbled_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = Settings::load_from(&dir.path().join("absent.toml"));
        assert_eq!(missing.download_max, 0);

        let garbled = dir.path().join("bad.toml");
        fs::write(&garbled, "not [valid").expect("write");
        let loaded = Settings::load_from(&garbled);
        assert!(loaded.path_mappings.is_empty());
    }

    #[test]
    fn rates_only_move_upward() {
        let mut settings = Settings::default();
        assert!(settings.record_rates(100, 50));
        assert!(!settings.record_rates(80, 40));
        assert!(settings.record_rates(80, 60));
        assert_eq!(settings.download_max, 100);
        assert_eq!(settings.upload_max, 60);
    }

    #[test]
    fn the_longest_base_wins() {
        let mut settings = Settings::default();
        settings
            .add_mapping("/data".into(), "file:/mnt/data".into())
            .expect("add");
        settings
            .add_mapping("/data/tv".into(), "smb://nas/tv".into())
            .expect("add");

        assert_eq!(settings.map_path("/data/tv/show"), "smb://nas/tv/show");
        assert_eq!(settings.map_path("/data/movies"), "file:/mnt/data/movies");
        assert_eq!(settings.map_path("/other"), "/other");
    }

    #[test]
    fn mappings_are_validated() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.add_mapping("downloads".into(), "file:/x".into()),
            Err(SettingsError::InvalidMapping(_))
        ));
        assert!(matches!(
            settings.add_mapping("/downloads".into(), "/no/protocol".into()),
            Err(SettingsError::InvalidMapping(_))
        ));
        assert!(settings
            .add_mapping("/downloads".into(), "nfs4:/srv".into())
            .is_ok());
    }

    #[test]
    fn adding_the_same_base_replaces_the_mapping() {
        let mut settings = Settings::default();
        settings
            .add_mapping("/d".into(), "file:/one".into())
            .expect("add");
        settings
            .add_mapping("/d".into(), "file:/two".into())
            .expect("replace");
        assert_eq!(settings.path_mappings.len(), 1);
        assert_eq!(settings.path_mappings[0].path, "file:/two");

        assert!(settings.remove_mapping("/d"));
        assert!(!settings.remove_mapping("/d"));
    }
}
