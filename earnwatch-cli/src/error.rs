//! CLI-specific error types and exit code mapping

use earnwatch_core::error::EarnwatchError;
use earnwatch_ingest::IngestError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from earnwatch-core.
    #[error("{0}")]
    Core(#[from] EarnwatchError),

    /// Ingestion engine failure (state directory, pattern setup).
    #[error("ingest error: {0}")]
    Ingest(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                   |
    /// |------|---------------------------|
    /// | 0    | Success                   |
    /// | 1    | General / command error   |
    /// | 2    | Configuration error       |
    /// | 4    | Ingestion engine error    |
    /// | 10   | IO error                  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(EarnwatchError::Config(_)) => 2,
            Self::Ingest(_) => 4,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<IngestError> for CliError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::InvalidKey(_) => Self::Command(e.to_string()),
            IngestError::Config { .. } => Self::Config(e.to_string()),
            other => Self::Ingest(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use earnwatch_core::error::ConfigError;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("bad".to_owned());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err = CliError::from(EarnwatchError::Config(ConfigError::FileNotFound {
            path: "earnwatch.toml".to_owned(),
        }));
        assert_eq!(err.exit_code(), 2, "core config errors keep exit code 2");
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        assert_eq!(CliError::Io(io_err).exit_code(), 10);
    }

    #[test]
    fn test_invalid_key_maps_to_command_error() {
        let err = CliError::from(IngestError::InvalidKey("<b></b>".to_owned()));
        assert!(matches!(err, CliError::Command(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_state_error_maps_to_ingest_error() {
        let err = CliError::from(IngestError::State {
            path: "/var/lib/earnwatch/cache.json".to_owned(),
            reason: "permission denied".to_owned(),
        });
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("permission denied"));
    }
}
