//! Domain error types.

/// Top-level error type for tickbars.
#[derive(Debug, thiserror::Error)]
pub enum TickbarsError {
    #[error("invalid {name}: {reason}")]
    InvalidWindow { name: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("tick feed error: {reason}")]
    Feed { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TickbarsError {
    pub(crate) fn invalid_window(name: &str, reason: impl Into<String>) -> Self {
        TickbarsError::InvalidWindow {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TickbarsError> for std::process::ExitCode {
    fn from(err: &TickbarsError) -> Self {
        let code: u8 = match err {
            TickbarsError::Io(_) => 1,
            TickbarsError::InvalidWindow { .. }
            | TickbarsError::ConfigParse { .. }
            | TickbarsError::ConfigInvalid { .. } => 2,
            TickbarsError::Feed { .. } => 3,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_window_message() {
        let err = TickbarsError::invalid_window("window_volume", "must be positive");
        assert_eq!(err.to_string(), "invalid window_volume: must be positive");
    }

    #[test]
    fn config_invalid_message() {
        let err = TickbarsError::ConfigInvalid {
            section: "vwap".into(),
            key: "window_volume".into(),
            reason: "not a number".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [vwap] window_volume: not a number"
        );
    }
}
