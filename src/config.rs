use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

use awsnav_logs::{DEFAULT_LOOKBACK_MINUTES, DEFAULT_TAIL};

/// Optional settings read from the user's config file. Every field has
/// a fallback, so a missing or partial file is fine.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_profile: Option<String>,
    pub region: Option<String>,
    pub default_tail: Option<usize>,
    pub lookback_minutes: Option<i64>,
}

impl Settings {
    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("awsnav").join("config.toml"))
    }

    /// Load settings, falling back to defaults when the file is missing
    /// or malformed. A broken config file never aborts startup.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        let Ok(text) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&text) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                Self::default()
            }
        }
    }

    pub fn tail(&self) -> usize {
        self.default_tail.unwrap_or(DEFAULT_TAIL)
    }

    pub fn lookback(&self) -> i64 {
        self.lookback_minutes.unwrap_or(DEFAULT_LOOKBACK_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parses() {
        let settings: Settings = toml::from_str(
            r#"
            default_profile = "dev"
            region = "eu-west-1"
            default_tail = 100
            lookback_minutes = 30
            "#,
        )
        .unwrap();
        assert_eq!(settings.default_profile.as_deref(), Some("dev"));
        assert_eq!(settings.tail(), 100);
        assert_eq!(settings.lookback(), 30);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.default_profile, None);
        assert_eq!(settings.tail(), DEFAULT_TAIL);
        assert_eq!(settings.lookback(), DEFAULT_LOOKBACK_MINUTES);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let settings: Settings = toml::from_str("some_future_key = 1").unwrap();
        assert_eq!(settings.default_profile, None);
    }
}
