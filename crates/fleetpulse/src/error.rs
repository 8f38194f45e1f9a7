//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and distinct exit codes.

use miette::Diagnostic;
use thiserror::Error;

use fleetpulse_config::ConfigError;
use fleetpulse_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const UNHEALTHY: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the device API")]
    #[diagnostic(
        code(fleetpulse::connection_failed),
        help(
            "Check that the API is running and reachable.\n\
             Reason: {reason}\n\
             Verify the address with: fleetpulse config show"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(fleetpulse::timeout),
        help("Increase the timeout with --timeout or check API responsiveness.")
    )]
    Timeout,

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(fleetpulse::not_found),
        help("Run: fleetpulse {list_command} to see available {resource_type} IDs")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API returned HTTP {status} for {url}")]
    #[diagnostic(code(fleetpulse::api_error))]
    ApiError { status: u16, url: String },

    #[error("Unexpected response from the API: {message}")]
    #[diagnostic(
        code(fleetpulse::decode),
        help("The server may be running an incompatible version.")
    )]
    Decode { message: String },

    #[error("API reports status '{status}'")]
    #[diagnostic(code(fleetpulse::unhealthy))]
    Unhealthy { status: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fleetpulse::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file not found")]
    #[diagnostic(
        code(fleetpulse::no_config),
        help(
            "Expected at: {path}\n\
             Omit --config to use the default location, or create the file."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(fleetpulse::config))]
    Config { message: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {message}")]
    #[diagnostic(code(fleetpulse::render))]
    Render { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Unhealthy { .. } => exit_code::UNHEALTHY,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Turn a 404 into a [`NotFound`](Self::NotFound) for the named resource.
    pub fn not_found_as(self, resource_type: &str, identifier: &str, list_command: &str) -> Self {
        match self {
            Self::ApiError { status: 404, .. } => Self::NotFound {
                resource_type: resource_type.into(),
                identifier: identifier.into(),
                list_command: list_command.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Request { status, url } => Self::ApiError { status, url },
            CoreError::Unreachable { reason } => Self::ConnectionFailed { reason },
            CoreError::Timeout => Self::Timeout,
            CoreError::Decode { message } => Self::Decode { message },
            CoreError::Config { message } => Self::Config { message },
        }
    }
}

impl From<fleetpulse_api::Error> for CliError {
    fn from(err: fleetpulse_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Missing { path } => Self::NoConfig {
                path: path.display().to_string(),
            },
            other @ (ConfigError::Serialization(_) | ConfigError::Figment(_)) => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
