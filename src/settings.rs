//! # Stored Preferences
//!
//! Thin typed layer over the `settings` key/value table: API key, theme,
//! onboarding completion flag and preferred music languages. Every setter is
//! a plain overwrite.

use crate::db;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use log::{info, warn};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const KEY_API_KEY: &str = "api_key";
pub const KEY_THEME: &str = "theme";
pub const KEY_ONBOARDING_COMPLETE: &str = "onboarding_complete";
pub const KEY_LANGUAGES: &str = "languages";

/// Colour scheme of the terminal output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => bail!("Unknown theme '{other}'. Use light, dark or system."),
        }
    }
}

/// Everything stored, loaded at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub theme: Theme,
    pub onboarding_complete: bool,
    pub languages: Vec<String>,
}

impl Settings {
    /// Key with all but the last four characters hidden.
    #[must_use]
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(mask_key)
    }
}

/// Load all settings, falling back to defaults for missing or corrupt values.
pub fn load(conn: &Connection) -> Result<Settings> {
    let api_key = db::get_setting(conn, KEY_API_KEY)?.filter(|k| !k.trim().is_empty());

    let theme = match db::get_setting(conn, KEY_THEME)? {
        Some(raw) => raw.parse().unwrap_or_else(|err| {
            warn!("Ignoring stored theme: {err}");
            Theme::default()
        }),
        None => Theme::default(),
    };

    let onboarding_complete = db::get_setting(conn, KEY_ONBOARDING_COMPLETE)?
        .is_some_and(|v| v == "true");

    let languages = match db::get_setting(conn, KEY_LANGUAGES)? {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("Ignoring stored language list: {err}");
            Vec::new()
        }),
        None => Vec::new(),
    };

    Ok(Settings {
        api_key,
        theme,
        onboarding_complete,
        languages,
    })
}

/// Store the API key. Blank keys are rejected.
pub fn save_api_key(conn: &Connection, key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        bail!("API Key cannot be empty.");
    }
    db::set_setting(conn, KEY_API_KEY, key)?;
    info!("Saved API key {}", mask_key(key));
    Ok(())
}

/// Forget the stored API key.
pub fn clear_api_key(conn: &Connection) -> Result<bool> {
    db::delete_setting(conn, KEY_API_KEY)
}

pub fn save_theme(conn: &Connection, theme: Theme) -> Result<()> {
    db::set_setting(conn, KEY_THEME, theme.as_str())
}

pub fn set_onboarding_complete(conn: &Connection, complete: bool) -> Result<()> {
    db::set_setting(
        conn,
        KEY_ONBOARDING_COMPLETE,
        if complete { "true" } else { "false" },
    )
}

pub fn save_languages(conn: &Connection, languages: &[String]) -> Result<()> {
    let raw = serde_json::to_string(languages).context("Failed to encode language list")?;
    db::set_setting(conn, KEY_LANGUAGES, &raw)
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let visible = chars.len().min(4);
    let hidden = chars.len() - visible;
    let tail: String = chars[hidden..].iter().collect();
    format!("{}{tail}", "*".repeat(hidden))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_on_empty_db() {
        let conn = db::open_in_memory().expect("db");
        assert_eq!(load(&conn).unwrap(), Settings::default());
    }

    #[test]
    fn test_round_trip_all_settings() {
        let conn = db::open_in_memory().expect("db");
        save_api_key(&conn, "  AIzaSyExample1234 ").unwrap();
        save_theme(&conn, Theme::Dark).unwrap();
        set_onboarding_complete(&conn, true).unwrap();
        save_languages(&conn, &["Bollywood - Hindi".to_string()]).unwrap();

        let settings = load(&conn).unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("AIzaSyExample1234"));
        assert_eq!(settings.theme, Theme::Dark);
        assert!(settings.onboarding_complete);
        assert_eq!(settings.languages, ["Bollywood - Hindi"]);
        assert_eq!(settings.masked_api_key().unwrap(), "*************1234");
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let conn = db::open_in_memory().expect("db");
        let err = save_api_key(&conn, "   ").expect_err("blank key");
        assert_eq!(err.to_string(), "API Key cannot be empty.");
        assert!(load(&conn).unwrap().api_key.is_none());
    }

    #[test]
    fn test_clear_api_key() {
        let conn = db::open_in_memory().expect("db");
        save_api_key(&conn, "abc").unwrap();
        assert!(clear_api_key(&conn).unwrap());
        assert!(load(&conn).unwrap().api_key.is_none());
    }

    #[test]
    fn test_corrupt_values_fall_back() {
        let conn = db::open_in_memory().expect("db");
        db::set_setting(&conn, KEY_THEME, "neon").unwrap();
        db::set_setting(&conn, KEY_LANGUAGES, "not json").unwrap();
        let settings = load(&conn).unwrap();
        assert_eq!(settings.theme, Theme::System);
        assert!(settings.languages.is_empty());
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn test_mask_short_key() {
        assert_eq!(mask_key("abc"), "abc");
    }
}
