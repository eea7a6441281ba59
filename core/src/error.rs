//! Error types for the ORCRIM client.
//!
//! # Design
//! A small closed set of variants. Transport failures, non-2xx statuses and
//! undecodable bodies stay distinguishable so callers pick their own retry or
//! logging policy. A 404 is an ordinary `HttpStatus`; `is_not_found` covers
//! the common check.

use thiserror::Error;

/// Errors returned by the token manager, the resource client and sessions.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a status outside the 2xx range.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body could not be decoded into the expected shape.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The request payload could not be encoded.
    #[error("encode failed: {0}")]
    Encode(String),

    /// A caller-supplied value (date, identifier) was malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::HttpStatus { status: 404, .. })
    }

    /// Status code for `HttpStatus`, `None` for every other variant.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_detected_from_status() {
        let err = ApiError::HttpStatus {
            status: 404,
            body: String::new(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn other_variants_carry_no_status() {
        let err = ApiError::Transport("connection refused".to_string());
        assert!(!err.is_not_found());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "transport failure: connection refused");
    }
}
