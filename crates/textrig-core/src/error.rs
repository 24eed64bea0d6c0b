//! Error types for Textrig

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TextrigError>;

/// Main error type for Textrig
#[derive(Debug, Error)]
pub enum TextrigError {
    #[error("Invalid font: {0}")]
    FontLoad(String),

    #[error("No font loaded, call set_font first")]
    FontNotSet,

    #[error("Shaping failed: {0}")]
    Shaping(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Browser error ({engine}): {message}")]
    Browser { engine: String, message: String },

    #[error("{engine} session not started, call start_web first")]
    SessionNotStarted { engine: String },

    #[error("Invalid render mode: {0}")]
    InvalidMode(String),

    #[error("Missing resource: {0}")]
    MissingResource(String),

    #[error("No foreground pixels to crop")]
    EmptyForeground,

    #[error("Path operation failed: {0}")]
    PathOp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TextrigError {
    /// Browser-backend failure tagged with the engine it came from.
    pub fn browser(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Browser {
            engine: engine.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_failing_input() {
        let err = TextrigError::FontLoad("fonts/missing.ttf".into());
        assert_eq!(err.to_string(), "Invalid font: fonts/missing.ttf");

        let err = TextrigError::InvalidMode("svg".into());
        assert_eq!(err.to_string(), "Invalid render mode: svg");

        let err = TextrigError::SessionNotStarted {
            engine: "chromium".into(),
        };
        assert!(err.to_string().contains("chromium"));
        assert!(err.to_string().contains("start_web"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TextrigError = io.into();
        assert!(matches!(err, TextrigError::Io(_)));
    }
}
