//! Bot settings loaded from `config.toml`.
//!
//! Every field has a default, so the file is optional. `CONFIG_PATH` overrides the
//! location of the file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level structure of `config.toml`
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    bot: Settings,
}

/// Presentation and alerting settings used by the handlers
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Currency symbol appended to every amount
    pub currency: String,
    /// How many transactions the category detail view lists
    pub recent_transactions: u64,
    /// Remaining-budget percentage at or below which a near-limit warning is shown
    pub budget_alert_percent: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "₽".to_string(),
            recent_transactions: 10,
            budget_alert_percent: 20.0,
        }
    }
}

impl Settings {
    /// Formats an amount with two decimals and the configured currency symbol.
    #[must_use]
    pub fn money(&self, amount: f64) -> String {
        format!("{amount:.2} {}", self.currency)
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if !file.bot.budget_alert_percent.is_finite()
        || !(0.0..=100.0).contains(&file.bot.budget_alert_percent)
    {
        return Err(Error::Config {
            message: format!(
                "budget_alert_percent must be between 0 and 100, got {}",
                file.bot.budget_alert_percent
            ),
        });
    }

    Ok(file.bot)
}

/// Loads settings from a TOML file. A missing file yields the defaults.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Attempting to load settings from: {:?}", path_ref);

    if !path_ref.exists() {
        warn!("No settings file at {:?}, using defaults", path_ref);
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;
    parse_settings(&contents)
}

/// Loads settings from `CONFIG_PATH`, or `./config.toml` when unset.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_settings(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            [bot]
            currency = "$"
            recent_transactions = 5
            budget_alert_percent = 10.0
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.currency, "$");
        assert_eq!(settings.recent_transactions, 5);
        assert_eq!(settings.budget_alert_percent, 10.0);
    }

    #[test]
    fn test_parse_partial_settings_uses_defaults() {
        let settings = parse_settings("[bot]\ncurrency = \"€\"\n").unwrap();
        assert_eq!(settings.currency, "€");
        assert_eq!(settings.recent_transactions, 10);
        assert_eq!(settings.budget_alert_percent, 20.0);

        let empty = parse_settings("").unwrap();
        assert_eq!(empty, Settings::default());
    }

    #[test]
    fn test_parse_rejects_out_of_range_alert_percent() {
        let result = parse_settings("[bot]\nbudget_alert_percent = 150.0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_parse_rejects_malformed_toml() {
        let result = parse_settings("[bot\ncurrency = ");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = load_settings("definitely/not/here/config.toml").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_money_formatting() {
        let settings = Settings::default();
        assert_eq!(settings.money(150.0), "150.00 ₽");
        assert_eq!(settings.money(0.5), "0.50 ₽");
    }
}
