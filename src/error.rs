//! Typed error hierarchy for the ws1-uem crate.
//!
//! `UemError` is the single result contract shared by the certificate
//! loader, the `CMSURL` signer and the request dispatcher. Every variant maps
//! to a real failure boundary:
//!
//! - `Config` — rejected at construction time (empty tenant code, malformed
//!   base URL, missing certificate credentials). Never produced mid-request.
//! - `Certificate` — the PKCS#12 bundle could not be read or decrypted.
//!   Retrying with the same credentials will fail the same way.
//! - `Signing` — the bundle loaded but the CMS signature could not be
//!   produced (unsupported key type, encoder failure, URL without a path).
//! - `Request` — the UEM API answered with a non-success status, or the
//!   transport failed before any status was received.
//! - `Parse` — a success response carried a body that is not valid JSON.
//!
//! Certificate and signing failures always abort the pending call before
//! anything is written to the network.

use reqwest::StatusCode;

/// Unified error type for all ws1-uem library operations.
#[derive(Debug, thiserror::Error)]
pub enum UemError {
    /// Invalid or missing configuration detected at construction time.
    #[error("configuration error: {message}")]
    Config {
        /// What was missing or malformed.
        message: String,
    },

    /// The PKCS#12 bundle could not be loaded.
    ///
    /// Covers a missing or unreadable file, corrupt DER, a wrong password,
    /// and bundles that lack either the private key or the certificate.
    #[error("certificate error: {message}")]
    Certificate {
        /// Description of the load failure. Never contains the password.
        message: String,
        /// The underlying I/O or OpenSSL error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The certificate loaded but producing the `CMSURL` signature failed.
    #[error("signing error: {message}")]
    Signing {
        /// Description of the signing failure.
        message: String,
        /// The underlying cryptographic error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The HTTP request failed.
    ///
    /// `status` is `Some` when the server answered with a non-success code
    /// (after any transport-level retries were exhausted) and `None` when
    /// the request never completed (DNS, TLS, connect, timeout).
    #[error("request to {url} failed{}: {message}", format_status(.status))]
    Request {
        /// HTTP status returned by the API, when one was received.
        status: Option<StatusCode>,
        /// Full URL of the failed request.
        url: String,
        /// Response body text, or the transport error description.
        message: String,
        /// The underlying transport error, if any.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// A success response body could not be parsed as JSON.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

fn format_status(status: &Option<StatusCode>) -> String {
    match status {
        Some(code) => format!(" ({code})"),
        None => String::new(),
    }
}

impl UemError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        UemError::Config {
            message: message.into(),
        }
    }

    pub(crate) fn certificate<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        UemError::Certificate {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn signing(message: impl Into<String>) -> Self {
        UemError::Signing {
            message: message.into(),
            source: None,
        }
    }

    /// Returns the HTTP status code carried by a `Request` error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UemError::Request { status, .. } => *status,
            _ => None,
        }
    }
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, UemError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_displays_message() {
        let err = UemError::config("tenant code must not be empty");
        assert_eq!(
            err.to_string(),
            "configuration error: tenant code must not be empty"
        );
    }

    #[test]
    fn certificate_error_chains_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = UemError::certificate("cannot read /tmp/missing.p12", io);
        assert!(err.to_string().contains("/tmp/missing.p12"));
        assert!(
            err.source().is_some(),
            "certificate error should expose the I/O cause"
        );
    }

    #[test]
    fn request_error_includes_status_and_body() {
        let err = UemError::Request {
            status: Some(StatusCode::NOT_FOUND),
            url: "https://uem.example.com/API/mdm/devices/42".to_string(),
            message: r#"{"errorCode":1001,"message":"Device not found"}"#.to_string(),
            source: None,
        };
        let msg = err.to_string();
        assert!(msg.contains("404"), "display should include status code");
        assert!(msg.contains("Device not found"));
        assert!(msg.contains("/mdm/devices/42"));
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn request_error_without_status_omits_code() {
        let err = UemError::Request {
            status: None,
            url: "https://uem.example.com/API/system/info".to_string(),
            message: "operation timed out".to_string(),
            source: None,
        };
        assert_eq!(
            err.to_string(),
            "request to https://uem.example.com/API/system/info failed: operation timed out"
        );
        assert!(err.status().is_none());
    }

    #[test]
    fn non_request_errors_have_no_status() {
        assert!(UemError::signing("unsupported key type").status().is_none());
    }

    #[test]
    fn parse_error_wraps_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let err = UemError::Parse(json_err);
        assert!(err.to_string().starts_with("failed to parse response"));
        assert!(err.source().is_some());
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<UemError>();
    }
}
