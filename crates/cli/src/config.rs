//! Runtime configuration for `slotlove`.
//!
//! Settings are layered, lowest precedence first: built-in defaults, an
//! optional TOML file given with `--config`, `SLOTLOVE_*` environment
//! variables, then command-line flags.
//!
//! # Example
//!
//! ```toml
//! [server]
//! port = 8000
//! static_dir = "."
//!
//! [data]
//! dir = "data"
//!
//! [sheets]
//! enabled = true
//! url = "https://script.google.com/macros/s/<deployment-id>/exec"
//! timeout_secs = 10
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use slotlove_core::{DisabledSink, NotificationSink};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_STATIC_DIR: &str = ".";
pub const DEFAULT_SHEETS_TIMEOUT_SECS: u64 = 10;

// ── File format ──────────────────────────────────────────────────────────────

/// Contents of a `--config` TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub data: DataSection,
    pub sheets: SheetsSection,
}

/// `[server]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub port: Option<u16>,
    pub static_dir: Option<PathBuf>,
}

/// `[data]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataSection {
    pub dir: Option<PathBuf>,
}

/// `[sheets]` section: the spreadsheet notification endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetsSection {
    pub enabled: Option<bool>,
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Read and parse a config TOML file from `path`.
pub fn read_config(path: &Path) -> Result<FileConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

// ── Resolved settings ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsSettings {
    pub enabled: bool,
    pub url: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub sheets: SheetsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            sheets: SheetsSettings {
                enabled: false,
                url: None,
                timeout: Duration::from_secs(DEFAULT_SHEETS_TIMEOUT_SECS),
            },
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
}

impl Settings {
    /// Resolve all layers, reading the process environment.
    pub fn load(config_path: Option<&Path>, overrides: Overrides) -> Result<Self, String> {
        let mut settings = Settings::default();
        if let Some(path) = config_path {
            settings.apply_file(read_config(path)?);
            log::debug!("loaded config from {}", path.display());
        }
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.apply_overrides(overrides);
        Ok(settings)
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(port) = file.server.port {
            self.port = port;
        }
        if let Some(dir) = file.server.static_dir {
            self.static_dir = dir;
        }
        if let Some(dir) = file.data.dir {
            self.data_dir = dir;
        }
        if let Some(enabled) = file.sheets.enabled {
            self.sheets.enabled = enabled;
        }
        if let Some(url) = file.sheets.url {
            self.sheets.url = Some(url);
        }
        if let Some(secs) = file.sheets.timeout_secs {
            self.sheets.timeout = Duration::from_secs(secs);
        }
    }

    /// Apply `SLOTLOVE_*` variables obtained through `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = var("SLOTLOVE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("SLOTLOVE_STATIC_DIR") {
            self.static_dir = PathBuf::from(dir);
        }
        if let Some(port) = var("SLOTLOVE_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| format!("SLOTLOVE_PORT: invalid port '{}'", port))?;
        }
        if let Some(flag) = var("SLOTLOVE_SHEETS_ENABLED") {
            self.sheets.enabled = parse_bool(&flag)
                .ok_or_else(|| format!("SLOTLOVE_SHEETS_ENABLED: expected a boolean, got '{}'", flag))?;
        }
        if let Some(url) = var("SLOTLOVE_SHEETS_URL") {
            self.sheets.url = Some(url);
        }
        if let Some(secs) = var("SLOTLOVE_SHEETS_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| format!("SLOTLOVE_SHEETS_TIMEOUT_SECS: invalid number '{}'", secs))?;
            self.sheets.timeout = Duration::from_secs(secs);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(dir) = overrides.data_dir {
            self.data_dir = dir;
        }
        if let Some(dir) = overrides.static_dir {
            self.static_dir = dir;
        }
    }

    /// Build the notification sink these settings describe.
    pub fn notification_sink(&self) -> Result<Arc<dyn NotificationSink>, String> {
        if !self.sheets.enabled {
            return Ok(Arc::new(DisabledSink));
        }
        let url = match self.sheets.url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => return Err("sheets notifications are enabled but no url is configured".to_string()),
        };
        sheets_sink(url, self.sheets.timeout)
    }
}

#[cfg(feature = "sheets")]
fn sheets_sink(url: &str, timeout: Duration) -> Result<Arc<dyn NotificationSink>, String> {
    Ok(Arc::new(slotlove_core::SheetsSink::new(url, timeout)))
}

#[cfg(not(feature = "sheets"))]
fn sheets_sink(_url: &str, _timeout: Duration) -> Result<Arc<dyn NotificationSink>, String> {
    Err("sheets notifications are enabled but this build lacks the `sheets` feature".to_string())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.data_dir, PathBuf::from("data"));
        assert_eq!(settings.static_dir, PathBuf::from("."));
        assert!(!settings.sheets.enabled);
        assert_eq!(settings.sheets.timeout, Duration::from_secs(10));
    }

    #[test]
    fn partial_file_only_touches_given_keys() {
        let file: FileConfig = toml::from_str(
            r#"
            [data]
            dir = "/srv/slotlove"

            [sheets]
            timeout_secs = 3
            "#,
        )
        .unwrap();
        let mut settings = Settings::default();
        settings.apply_file(file);

        assert_eq!(settings.data_dir, PathBuf::from("/srv/slotlove"));
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.sheets.timeout, Duration::from_secs(3));
        assert!(!settings.sheets.enabled);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("[server]\nprot = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_file_and_flags_override_env() {
        let mut settings = Settings::default();
        settings.apply_file(toml::from_str("[server]\nport = 9000\n").unwrap());
        settings
            .apply_env(env(&[
                ("SLOTLOVE_PORT", "9100"),
                ("SLOTLOVE_DATA_DIR", "/tmp/env-data"),
                ("SLOTLOVE_SHEETS_ENABLED", "yes"),
                ("SLOTLOVE_SHEETS_URL", "http://127.0.0.1:1/exec"),
            ]))
            .unwrap();
        assert_eq!(settings.port, 9100);
        assert!(settings.sheets.enabled);

        settings.apply_overrides(Overrides {
            port: Some(9200),
            ..Overrides::default()
        });
        assert_eq!(settings.port, 9200);
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/env-data"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut settings = Settings::default();
        settings.apply_env(env(&[("SLOTLOVE_PORT", "")])).unwrap();
        assert_eq!(settings.port, 8000);
    }

    #[test]
    fn malformed_env_values_are_errors() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env(env(&[("SLOTLOVE_PORT", "eighty")]))
            .unwrap_err();
        assert!(err.contains("SLOTLOVE_PORT"));

        let err = settings
            .apply_env(env(&[("SLOTLOVE_SHEETS_ENABLED", "maybe")]))
            .unwrap_err();
        assert!(err.contains("SLOTLOVE_SHEETS_ENABLED"));
    }

    #[test]
    fn enabled_sheets_without_url_is_an_error() {
        let mut settings = Settings::default();
        assert!(settings.notification_sink().is_ok());

        settings.sheets.enabled = true;
        assert!(settings.notification_sink().is_err());
    }

    #[test]
    fn read_config_reports_missing_file() {
        let err = read_config(Path::new("/nonexistent/slotlove.toml")).unwrap_err();
        assert!(err.contains("could not read"));
    }
}
