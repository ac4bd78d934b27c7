//! Persisted application settings.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::symbol::Exchange;

/// Default cap on the number of symbols a list may hold.
pub const DEFAULT_MAX_SYMBOLS_PER_LIST: usize = 1000;

/// Colour scheme of the list views.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[value(rename_all = "lower")]
pub enum Theme {
    /// Dark background.
    #[default]
    Dark,
    /// Light background.
    Light,
}

/// Settings stored under the `settings` key.
///
/// Missing fields fall back to their defaults when loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Exchange assumed for symbols that come without one.
    pub default_exchange: Exchange,
    /// UI theme.
    pub theme: Theme,
    /// Largest list `add_symbols` will produce.
    pub max_symbols_per_list: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_exchange: Exchange::NSE,
            theme: Theme::Dark,
            max_symbols_per_list: DEFAULT_MAX_SYMBOLS_PER_LIST,
        }
    }
}

/// Partial update applied by `ListService::update_settings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    /// New default exchange.
    pub default_exchange: Option<Exchange>,
    /// New theme.
    pub theme: Option<Theme>,
    /// New symbol cap.
    pub max_symbols_per_list: Option<usize>,
}

impl AppSettings {
    /// Copy of these settings with `update` applied.
    pub fn merged(&self, update: &SettingsUpdate) -> Self {
        Self {
            default_exchange: update.default_exchange.unwrap_or(self.default_exchange),
            theme: update.theme.unwrap_or(self.theme),
            max_symbols_per_list: update
                .max_symbols_per_list
                .unwrap_or(self.max_symbols_per_list),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stored_shape() {
        let json = serde_json::to_value(AppSettings::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "defaultExchange": "NSE",
                "theme": "dark",
                "maxSymbolsPerList": 1000
            })
        );
    }

    #[test]
    fn partial_document_fills_defaults() {
        let settings: AppSettings = serde_json::from_value(serde_json::json!({"theme": "light"})).unwrap();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.default_exchange, Exchange::NSE);
        assert_eq!(settings.max_symbols_per_list, 1000);
    }

    #[test]
    fn merge_only_touches_given_fields() {
        let merged = AppSettings::default().merged(&SettingsUpdate {
            max_symbols_per_list: Some(50),
            ..Default::default()
        });
        assert_eq!(merged.max_symbols_per_list, 50);
        assert_eq!(merged.theme, Theme::Dark);
    }
}
