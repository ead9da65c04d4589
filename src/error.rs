//! Crate-wide error type for the command-line and file-loading paths.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::submission::FormError;

/// Errors raised while loading inputs or writing outputs.
#[derive(Debug, Error)]
pub enum DssError {
    #[error("cannot read \"{path}\": {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid form file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("form has {} invalid field(s)", .0.len())]
    InvalidForm(Vec<FormError>),
}

pub type Result<T> = std::result::Result<T, DssError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_form_reports_count() {
        let form = crate::submission::AnalysisForm::default();
        let err = DssError::InvalidForm(form.validate(&[]));
        assert_eq!(err.to_string(), "form has 1 invalid field(s)");
    }

    #[test]
    fn read_error_names_path() {
        let err = DssError::Read {
            path: PathBuf::from("zones.geojson"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "cannot read \"zones.geojson\": missing");
    }
}
