// error.rs

use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;

use crate::constants::{JSON_KEY_ERROR_ARGUMENT, JSON_KEY_ERROR_CODE};

/// Main error type for Swimlane SDK operations
#[derive(Debug)]
pub enum SwimlaneError {
    /// Parse URL failed
    InvalidUrl(String),
    /// HTTP request failed with status code and message (any 4xx/5xx except 400)
    RequestFailed { status: StatusCode, message: String },
    /// HTTP 400 with the server's error code decoded
    BadRequest { code: i64, name: &'static str, argument: Option<String> },
    /// Login rejected
    AuthenticationFailed(String),
    /// Invalid configuration
    ConfigurationError(String),
    /// Resource or field not found
    NotFound(String),
    /// Argument rejected before any request was sent
    Validation(String),
    /// Server build version outside the range an operation supports
    InvalidVersion { version: String, min: Option<String>, max: Option<String> },
    /// Network/connection error (e.g., timeout, DNS failure)
    ConnectionError(String),
    /// JSON or data serialization/deserialization error
    SerializationError(String),
    /// Generic IO error wrapper
    IoError(String),
    /// Generic error (use sparingly)
    Other(String),
}

impl SwimlaneError {
    /// Build a `BadRequest` from the body of a 400 response.
    ///
    /// The server answers with `{"ErrorCode": "<n>", "Argument": ...}`; anything
    /// unparseable is reported as code -1.
    pub fn bad_request(body: &[u8]) -> Self {
        let content: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

        let code = match &content[JSON_KEY_ERROR_CODE] {
            Value::Number(n) => n.as_i64().unwrap_or(-1),
            Value::String(s) => s.trim().parse().unwrap_or(-1),
            _ => -1,
        };
        let argument = match &content[JSON_KEY_ERROR_ARGUMENT] {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        };

        Self::BadRequest { code, name: error_code_name(code), argument }
    }

    /// HTTP status carried by this error, if it came from a response
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::BadRequest { .. } => Some(StatusCode::BAD_REQUEST),
            _ => None,
        }
    }
}

/// Known server error codes returned with HTTP 400
fn error_code_name(code: i64) -> &'static str {
    match code {
        1000 => "PasswordExpired",
        1001 => "DuplicateUserName",
        1002 => "InvalidUserNameOrPassword",
        1003 => "ConfirmPasswordDoesNotMatch",
        1004 => "PasswordDoesNotMeetComplexityRequirements",
        1005 => "PasswordResetRequired",
        1006 => "NewPasswordCannotMatchCurrent",
        1007 => "InvalidUser",
        1051 => "DuplicateGroupName",
        1061 => "DuplicateRoleName",
        2000 => "DuplicateFieldName",
        2001 => "FieldNameEmpty",
        2002 => "DuplicateApplicationName",
        2003 => "ApplicationNotFound",
        3000 => "DuplicateFieldValue",
        3001 => "InvalidDateField",
        3002 => "RecordNotFound",
        4000 => "BadStatsGroup",
        5000 => "DuplicateReportName",
        5001 => "DuplicateDashboardName",
        _ => "Unknown",
    }
}

impl fmt::Display for SwimlaneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            Self::RequestFailed { status, message } => {
                write!(f, "HTTP request failed with status {}: {}", status, message)
            }
            Self::BadRequest { code, name, argument } => match argument {
                Some(arg) => write!(f, "Bad request {}:{}: {}", name, code, arg),
                None => write!(f, "Bad request {}:{}", name, code),
            },
            Self::AuthenticationFailed(msg) => write!(f, "Authentication failed: {}", msg),
            Self::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::Validation(msg) => write!(f, "Invalid argument: {}", msg),
            Self::InvalidVersion { version, min, max } => write!(
                f,
                "Swimlane server build version {} is outside the supported range {} - {}",
                version,
                min.as_deref().unwrap_or("*"),
                max.as_deref().unwrap_or("*")
            ),
            Self::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Self::IoError(msg) => write!(f, "IO error: {}", msg),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SwimlaneError {}

// Conversion implementations
impl From<url::ParseError> for SwimlaneError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e.to_string())
    }
}

impl From<reqwest::Error> for SwimlaneError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            Self::ConnectionError(err.to_string())
        } else if let Some(status) = err.status() {
            Self::RequestFailed { status, message: err.to_string() }
        } else {
            Self::Other(err.to_string())
        }
    }
}

impl From<std::io::Error> for SwimlaneError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::ConfigurationError(err.to_string()),
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::TimedOut => Self::ConnectionError(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for SwimlaneError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_known_code() {
        let err = SwimlaneError::bad_request(br#"{"ErrorCode": "1051", "Argument": "Admins"}"#);
        match &err {
            SwimlaneError::BadRequest { code, name, argument } => {
                assert_eq!(*code, 1051);
                assert_eq!(*name, "DuplicateGroupName");
                assert_eq!(argument.as_deref(), Some("Admins"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string(), "Bad request DuplicateGroupName:1051: Admins");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_bad_request_numeric_code_without_argument() {
        let err = SwimlaneError::bad_request(br#"{"ErrorCode": 3002}"#);
        assert_eq!(err.to_string(), "Bad request RecordNotFound:3002");
    }

    #[test]
    fn test_bad_request_unparseable_body() {
        let err = SwimlaneError::bad_request(b"<html>oops</html>");
        match err {
            SwimlaneError::BadRequest { code, name, argument } => {
                assert_eq!(code, -1);
                assert_eq!(name, "Unknown");
                assert!(argument.is_none());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_version_display() {
        let err = SwimlaneError::InvalidVersion {
            version: "2.14.1".to_string(),
            min: Some("2.15".to_string()),
            max: None,
        };
        assert_eq!(
            err.to_string(),
            "Swimlane server build version 2.14.1 is outside the supported range 2.15 - *"
        );
    }
}
