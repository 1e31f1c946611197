use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorySlidesError {
    /// Required request fields were missing or blank.
    #[error("{0}")]
    Validation(String),

    /// The upstream content stream could not be opened.
    #[error("{0}")]
    Setup(String),

    /// The upstream content stream failed after it started.
    #[error("{0}")]
    Stream(String),

    /// A wire line was not a valid record.
    #[error("{0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorySlidesError>;

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_taxonomy_messages_are_bare() {
        let error = StorySlidesError::Validation("Message and animal are required".to_string());
        assert_eq!(error.to_string(), "Message and animal are required");

        let error = StorySlidesError::Stream("connection reset".to_string());
        assert_eq!(error.to_string(), "connection reset");
    }

    #[test]
    fn test_ambient_errors_are_prefixed() {
        let error = StorySlidesError::Config("missing api key".to_string());
        assert!(error.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err: StorySlidesError = io_err.into();
        assert!(matches!(err, StorySlidesError::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: StorySlidesError = json_err.into();
        assert!(matches!(err, StorySlidesError::Serialization(_)));
    }
}
