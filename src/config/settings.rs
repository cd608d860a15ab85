//! Tool settings.
//!
//! Loaded from ~/.config/code-arena/code-arena.yml or ./code-arena.yml

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of run directories, relative to the repository root.
pub const DEFAULT_RUNS_DIR: &str = ".arena/runs";

/// Default git executable.
pub const DEFAULT_GIT_PROGRAM: &str = "git";

/// Settings that apply to every invocation of the tool.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Log level used when neither the command line nor RUST_LOG sets one.
    pub log_level: Option<String>,

    /// Where run directories live when --runs-dir is not given.
    pub runs_dir: PathBuf,

    /// Git executable invoked by the repository wrapper.
    pub git_program: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: None,
            runs_dir: PathBuf::from(DEFAULT_RUNS_DIR),
            git_program: DEFAULT_GIT_PROGRAM.to_string(),
        }
    }
}

impl Settings {
    /// Load settings with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. ~/.config/code-arena/code-arena.yml
    /// 3. ./code-arena.yml
    /// 4. Defaults
    pub fn load(settings_path: Option<&PathBuf>) -> Result<Self> {
        // Explicit path takes precedence
        if let Some(path) = settings_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load settings from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        if let Some(config_dir) = dirs::config_dir() {
            let user_settings = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if let Some(settings) = Self::try_load(&user_settings) {
                return Ok(settings);
            }
        }

        let local_settings = PathBuf::from(format!("{}.yml", project_name));
        if let Some(settings) = Self::try_load(&local_settings) {
            return Ok(settings);
        }

        log::debug!("No settings file found, using defaults");
        Ok(Self::default())
    }

    fn try_load(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("Failed to load settings from {}: {:#}", path.display(), e);
                None
            }
        }
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read settings file")?;
        let settings: Self = serde_yaml::from_str(&content).context("Failed to parse settings file")?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, None);
        assert_eq!(settings.runs_dir, PathBuf::from(".arena/runs"));
        assert_eq!(settings.git_program, "git");
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.yml");
        fs::write(&path, "log_level: debug\nruns_dir: /srv/arena\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.log_level.as_deref(), Some("debug"));
        assert_eq!(settings.runs_dir, PathBuf::from("/srv/arena"));
        // Unset fields keep their defaults
        assert_eq!(settings.git_program, "git");
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");
        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load settings"));
    }

    #[test]
    fn test_load_explicit_invalid_yaml_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.yml");
        fs::write(&path, "runs_dir: [unclosed").unwrap();
        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn test_try_load_missing_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(Settings::try_load(&temp.path().join("nope.yml")).is_none());
    }

    #[test]
    fn test_try_load_invalid_is_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("code-arena.yml");
        fs::write(&path, "git_program: [1, 2").unwrap();
        assert!(Settings::try_load(&path).is_none());
    }
}
