//! Launcher settings with env-var overrides.
//!
//! The parameter file drives the analytics run; these settings only drive the
//! launcher itself. Values come from `ORE_LAUNCHER_LOG_LEVEL` and
//! `ORE_LAUNCHER_LOG_FILE` (a `.env` file is loaded first by `main`).

use std::{
    env::{self, VarError},
    path::{Path, PathBuf},
};

use crate::error::AppError;

/// Diagnostic log level used when nothing else is configured.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Fully-resolved launcher settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_level: String,
    /// Diagnostic log destination; `None` means stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self { log_level: DEFAULT_LOG_LEVEL.to_string(), log_file: None }
    }
}

/// Resolve settings from the process environment.
pub fn load() -> Result<Settings, AppError> {
    let log_level = read_var("ORE_LAUNCHER_LOG_LEVEL")?;
    let log_file = read_var("ORE_LAUNCHER_LOG_FILE")?;
    load_from(log_level.as_deref(), log_file.as_deref())
}

/// Unset is `None`; a value that is not valid Unicode is an error.
fn read_var(name: &str) -> Result<Option<String>, AppError> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(AppError::Settings(format!(
            "{name} is not valid unicode: {}",
            raw.to_string_lossy()
        ))),
    }
}

/// Internal resolver. Tests pass overrides directly instead of mutating env vars.
pub fn load_from(log_level: Option<&str>, log_file: Option<&str>) -> Result<Settings, AppError> {
    let log_level = match log_level.map(str::trim) {
        None => DEFAULT_LOG_LEVEL.to_string(),
        Some("") => {
            return Err(AppError::Settings("ORE_LAUNCHER_LOG_LEVEL is set but empty".into()));
        }
        Some(level) => level.to_string(),
    };

    let log_file = match log_file.map(str::trim) {
        None | Some("") => None,
        Some(path) => {
            let path = expand_home(path);
            if path.is_dir() {
                return Err(AppError::Settings(format!(
                    "ORE_LAUNCHER_LOG_FILE points at a directory: {}",
                    path.display()
                )));
            }
            Some(path)
        }
    };

    Ok(Settings { log_level, log_file })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Join `name` onto `base` unless `name` is already absolute.
pub fn resolve_against(base: &Path, name: &str) -> PathBuf {
    let candidate = expand_home(name);
    if candidate.is_absolute() { candidate } else { base.join(candidate) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_unset() {
        let s = load_from(None, None).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn log_level_override() {
        let s = load_from(Some("debug"), None).unwrap();
        assert_eq!(s.log_level, "debug");
    }

    #[test]
    fn empty_log_level_errors() {
        let err = load_from(Some("  "), None).unwrap_err();
        assert!(err.to_string().contains("settings error"));
    }

    #[test]
    fn empty_log_file_means_stderr() {
        let s = load_from(None, Some("")).unwrap();
        assert!(s.log_file.is_none());
    }

    #[test]
    fn log_file_directory_rejected() {
        let tmp = TempDir::new().unwrap();
        let err = load_from(None, Some(tmp.path().to_str().unwrap())).unwrap_err();
        assert!(err.to_string().contains("directory"));
    }

    #[test]
    fn unset_var_reads_as_none() {
        assert_eq!(read_var("ORE_LAUNCHER_TEST_NEVER_SET").unwrap(), None);
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/ore/Output");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with("ore/Output"));
    }

    #[test]
    fn relative_path_unchanged() {
        assert_eq!(expand_home("Input"), PathBuf::from("Input"));
    }

    #[test]
    fn resolve_keeps_absolute_names() {
        let base = Path::new("/data/Input");
        assert_eq!(resolve_against(base, "/etc/market.txt"), PathBuf::from("/etc/market.txt"));
        assert_eq!(resolve_against(base, "market.txt"), PathBuf::from("/data/Input/market.txt"));
    }
}
