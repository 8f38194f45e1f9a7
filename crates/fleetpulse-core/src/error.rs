// ── Core error types ──
//
// User-facing errors from fleetpulse-core. Consumers never match on
// reqwest or serde errors directly; the `From<fleetpulse_api::Error>`
// impl translates transport-layer failures into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
///
/// Cloneable so a failed refresh can travel through an action channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Server errors ────────────────────────────────────────────────
    /// The API answered with a non-2xx status.
    #[error("Request failed with HTTP {status}: {url}")]
    Request { status: u16, url: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach device API: {reason}")]
    Unreachable { reason: String },

    #[error("Device API timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unexpected response from device API: {message}")]
    Decode { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// HTTP status for [`Request`](Self::Request) errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fleetpulse_api::Error> for CoreError {
    fn from(err: fleetpulse_api::Error) -> Self {
        match err {
            fleetpulse_api::Error::Request { status, url } => Self::Request { status, url },
            fleetpulse_api::Error::Transport(ref e) if e.is_timeout() => Self::Timeout,
            fleetpulse_api::Error::Transport(e) => match e.status() {
                Some(status) => Self::Request {
                    status: status.as_u16(),
                    url: e.url().map(ToString::to_string).unwrap_or_default(),
                },
                None => Self::Unreachable {
                    reason: e.to_string(),
                },
            },
            fleetpulse_api::Error::Deserialization { message, .. } => Self::Decode { message },
            fleetpulse_api::Error::InvalidUrl(e) => Self::Config {
                message: e.to_string(),
            },
            fleetpulse_api::Error::InvalidBaseUrl(message)
            | fleetpulse_api::Error::ClientBuild(message) => Self::Config { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_keeps_status() {
        let err = CoreError::from(fleetpulse_api::Error::Request {
            status: 500,
            url: "http://localhost:5000/api/companies/".into(),
        });
        assert_eq!(err.status(), Some(500));
        assert_eq!(
            err.to_string(),
            "Request failed with HTTP 500: http://localhost:5000/api/companies/"
        );
    }

    #[test]
    fn decode_error_drops_body() {
        let err = CoreError::from(fleetpulse_api::Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        });
        assert_eq!(
            err,
            CoreError::Decode {
                message: "expected value".into()
            }
        );
        assert_eq!(err.status(), None);
    }
}
