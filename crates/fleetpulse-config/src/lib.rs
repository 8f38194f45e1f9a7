//! Shared configuration for the fleetpulse CLI and TUI.
//!
//! A TOML file in the platform config directory, `FLEETPULSE_*` environment
//! overrides, and translation to the runtime types of `fleetpulse-api` and
//! `fleetpulse-core`. Both binaries layer their command-line flags on top
//! through [`Overrides`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use fleetpulse_api::TransportConfig;
use fleetpulse_core::DashboardSettings;

/// Prefix of environment overrides. The first `_` after it separates the
/// section from the key: `FLEETPULSE_DASHBOARD_POLL_INTERVAL_MS`.
pub const ENV_PREFIX: &str = "FLEETPULSE_";

const MIN_POLL_INTERVAL_MS: u64 = 100;
const MAX_SKELETON_COUNT: usize = 24;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub dashboard: DashboardSection,
}

/// Where the device API lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiSection {
    /// Hostname, optionally with a scheme (`https://devices.example.com`).
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Path every endpoint hangs off.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            prefix: default_prefix(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "localhost".into()
}
fn default_port() -> u16 {
    5000
}
fn default_prefix() -> String {
    "/api".into()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DashboardSection {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,

    #[serde(default = "default_skeleton_count")]
    pub skeleton_count: usize,

    #[serde(default = "default_auto_refresh")]
    pub auto_refresh: bool,
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            toast_duration_ms: default_toast_duration_ms(),
            skeleton_count: default_skeleton_count(),
            auto_refresh: default_auto_refresh(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    10_000
}
fn default_toast_duration_ms() -> u64 {
    3_500
}
fn default_skeleton_count() -> usize {
    6
}
fn default_auto_refresh() -> bool {
    true
}

// ── Command-line overrides ──────────────────────────────────────────

/// Flag values that outrank file and environment. `None` leaves the
/// lower layers untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    pub api: ApiOverrides,
    pub dashboard: DashboardOverrides,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_refresh: Option<bool>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "fleetpulse", "fleetpulse").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fleetpulse");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_layered(&config_path(), &Overrides::default())
}

/// Load config from `path` + environment. The file may be absent.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    load_layered(path, &Overrides::default())
}

/// Resolve the effective config for a binary.
///
/// An explicit `path` must exist; the default path may be absent.
/// Precedence: `overrides` > environment > file > defaults.
pub fn load_config_with(
    path: Option<&Path>,
    overrides: &Overrides,
) -> Result<Config, ConfigError> {
    match path {
        Some(path) if !path.exists() => Err(ConfigError::Missing {
            path: path.to_path_buf(),
        }),
        Some(path) => load_layered(path, overrides),
        None => load_layered(&config_path(), overrides),
    }
}

fn load_layered(path: &Path, overrides: &Overrides) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().replacen('_', ".", 1).into()))
        .merge(Serialized::defaults(overrides));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

// ── Validation & translation ────────────────────────────────────────

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.host.trim().is_empty() {
            return Err(invalid("api.host", "must not be empty"));
        }
        if self.api.port == 0 {
            return Err(invalid("api.port", "must be between 1 and 65535"));
        }
        if self.api.timeout_secs == 0 {
            return Err(invalid("api.timeout_secs", "must be at least 1"));
        }
        if self.dashboard.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(invalid(
                "dashboard.poll_interval_ms",
                format!(
                    "must be at least {MIN_POLL_INTERVAL_MS}, got {}",
                    self.dashboard.poll_interval_ms
                ),
            ));
        }
        if self.dashboard.skeleton_count > MAX_SKELETON_COUNT {
            return Err(invalid(
                "dashboard.skeleton_count",
                format!(
                    "must be at most {MAX_SKELETON_COUNT}, got {}",
                    self.dashboard.skeleton_count
                ),
            ));
        }
        Ok(())
    }

    /// `http://{host}:{port}{prefix}`, or the host's own scheme if it has one.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        let host = self.api.host.trim().trim_end_matches('/');
        let origin = if host.contains("://") {
            host.to_owned()
        } else {
            format!("http://{host}")
        };
        let prefix = self.api.prefix.trim().trim_matches('/');
        let raw = format!("{origin}:{}/{prefix}", self.api.port);

        Url::parse(&raw).map_err(|e| invalid("api.host", format!("{raw}: {e}")))
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig::with_timeout(Duration::from_secs(self.api.timeout_secs))
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            poll_interval: Duration::from_millis(self.dashboard.poll_interval_ms),
            toast_duration: Duration::from_millis(self.dashboard.toast_duration_ms),
            skeleton_count: self.dashboard.skeleton_count,
            auto_refresh: self.dashboard.auto_refresh,
        }
    }

    /// Render as TOML, the way it would be written to disk.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    // Everything that reads `FLEETPULSE_*` runs inside a `Jail`, which
    // serializes environment access across tests.

    #[test]
    fn defaults_match_dashboard_defaults() {
        let config = Config::default();
        assert_eq!(config.dashboard_settings(), DashboardSettings::default());
        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "http://localhost:5000/api"
        );
    }

    #[test]
    fn file_values_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [api]
                host = "devices.internal"
                port = 8080

                [dashboard]
                poll_interval_ms = 2500
                auto_refresh = false
                "#,
            )?;

            let config = load_config_from(&jail.directory().join("config.toml")).unwrap();

            assert_eq!(config.api.host, "devices.internal");
            assert_eq!(config.api.prefix, "/api");
            assert_eq!(config.dashboard.skeleton_count, 6);
            let settings = config.dashboard_settings();
            assert_eq!(settings.poll_interval, Duration::from_millis(2500));
            assert!(!settings.auto_refresh);
            Ok(())
        });
    }

    #[test]
    fn missing_default_file_is_fine() {
        Jail::expect_with(|jail| {
            let config = load_config_from(&jail.directory().join("absent.toml")).unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load_config_with(Some(&path), &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }), "got: {err:?}");
    }

    #[test]
    fn env_beats_file_and_flags_beat_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [api]
                port = 7000
                host = "from-file"
                "#,
            )?;
            jail.set_env("FLEETPULSE_API_PORT", "7100");
            jail.set_env("FLEETPULSE_DASHBOARD_POLL_INTERVAL_MS", "500");

            let path = jail.directory().join("config.toml");
            let from_env = load_config_from(&path).unwrap();
            assert_eq!(from_env.api.port, 7100);
            assert_eq!(from_env.api.host, "from-file");
            assert_eq!(from_env.dashboard.poll_interval_ms, 500);

            let overrides = Overrides {
                api: ApiOverrides {
                    port: Some(7200),
                    ..ApiOverrides::default()
                },
                ..Overrides::default()
            };
            let from_flags = load_config_with(Some(&path), &overrides).unwrap();
            assert_eq!(from_flags.api.port, 7200);
            assert_eq!(from_flags.dashboard.poll_interval_ms, 500);
            Ok(())
        });
    }

    #[test]
    fn zero_port_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[api]\nport = 0\n")?;
            let err = load_config_from(&jail.directory().join("config.toml")).unwrap_err();
            assert!(
                matches!(err, ConfigError::Validation { ref field, .. } if field == "api.port"),
                "got: {err:?}"
            );
            Ok(())
        });
    }

    #[test]
    fn tiny_poll_interval_is_rejected() {
        let mut config = Config::default();
        config.dashboard.poll_interval_ms = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn too_many_skeletons_are_rejected() {
        let mut config = Config::default();
        config.dashboard.skeleton_count = 25;
        assert!(config.validate().is_err());
    }

    #[test]
    fn base_url_variants() {
        let mut config = Config::default();
        config.api.host = "https://devices.example.com/".into();
        config.api.port = 8443;
        config.api.prefix = "v1/".into();
        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "https://devices.example.com:8443/v1"
        );

        config.api.prefix = String::new();
        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "https://devices.example.com:8443/"
        );
    }

    #[test]
    fn toml_rendering_is_loadable() {
        Jail::expect_with(|jail| {
            let rendered = Config::default().to_toml().unwrap();
            jail.create_file("config.toml", &rendered)?;
            let loaded = load_config_from(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(loaded, Config::default());
            Ok(())
        });
    }
}
