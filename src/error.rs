//! Application-wide error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a parameter file into [`crate::engine::Parameters`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read parameter file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed xml in {origin}")]
    Xml {
        origin: String,
        #[source]
        source: roxmltree::Error,
    },

    #[error("invalid parameter file {origin}: {reason}")]
    Structure { origin: String, reason: String },
}

/// Failure to build an [`crate::engine::Application`] from loaded parameters.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("parameter group '{group}' missing")]
    MissingGroup { group: String },

    #[error("parameter '{name}' not found in group '{group}'")]
    MissingParameter { group: String, name: String },

    #[error("invalid value '{value}' for {group}.{name}: {reason}")]
    InvalidValue {
        group: String,
        name: String,
        value: String,
        reason: String,
    },

    #[error("output path '{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("cannot create output path '{}'", path.display())]
    OutputPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open log file '{}'", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConstructionError {
    pub(crate) fn missing(group: &str, name: &str) -> Self {
        Self::MissingParameter { group: group.to_string(), name: name.to_string() }
    }

    pub(crate) fn invalid(group: &str, name: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            group: group.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Short tag used in failure reports.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Load(_) => "load",
            AppError::Construction(_) => "construction",
            AppError::Settings(_) => "settings",
            AppError::Logger(_) => "logger",
            AppError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn missing_parameter_display() {
        let e = ConstructionError::missing("setup", "asofDate");
        assert_eq!(e.to_string(), "parameter 'asofDate' not found in group 'setup'");
    }

    #[test]
    fn invalid_value_display() {
        let e = ConstructionError::invalid("setup", "nThreads", "four", "not an integer");
        let msg = e.to_string();
        assert!(msg.contains("'four'"));
        assert!(msg.contains("setup.nThreads"));
        assert!(msg.contains("not an integer"));
    }

    #[test]
    fn load_error_keeps_io_source() {
        let e = LoadError::Io {
            path: PathBuf::from("/nonexistent/ore.xml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file missing"),
        };
        assert!(e.to_string().contains("/nonexistent/ore.xml"));
        assert_eq!(e.source().unwrap().to_string(), "file missing");
    }

    #[test]
    fn app_error_is_transparent_over_load() {
        let e: AppError = LoadError::Structure {
            origin: "ore.xml".into(),
            reason: "root element must be ORE".into(),
        }
        .into();
        assert_eq!(e.kind(), "load");
        assert!(e.to_string().starts_with("invalid parameter file ore.xml"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        assert_eq!(e.kind(), "io");
        let _: &dyn Error = &e;
    }
}
