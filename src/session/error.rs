use super::TabId;
use crate::engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("a file named {0} is already open")]
    DuplicateFilename(String),

    #[error("no open file named {0}")]
    UnknownFile(String),

    #[error("tab {0} is not open")]
    UnknownTab(TabId),

    #[error("no tab at position {0}")]
    NoTabAt(usize),

    #[error("no active tab")]
    NoActiveTab,

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Convenience type alias for Results with SessionError
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SessionError = EngineError::from(io_err).into();
        assert!(matches!(err, SessionError::Engine(EngineError::Io(_))));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_display() {
        let err = SessionError::DuplicateFilename("bus1.dbc".to_string());
        assert_eq!(err.to_string(), "a file named bus1.dbc is already open");

        let err = SessionError::UnknownTab(TabId::from_raw(7));
        assert_eq!(err.to_string(), "tab 7 is not open");

        assert_eq!(SessionError::NoActiveTab.to_string(), "no active tab");
    }
}
