// Light/dark theme preference

use crate::kv::KeyValueStore;
use eyre::{Context, Result};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Key holding the saved theme
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {} (expected light or dark)", other)),
        }
    }
}

/// Reads and writes the theme preference
pub struct ThemeStore<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> ThemeStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// The saved preference, if there is a valid one
    pub fn saved(&self) -> Result<Option<Theme>> {
        let Some(raw) = self.kv.get(THEME_KEY).context("Failed to read theme")? else {
            return Ok(None);
        };

        match raw.parse::<Theme>() {
            Ok(theme) => Ok(Some(theme)),
            Err(e) => {
                warn!(value = %raw.trim(), error = %e, "Ignoring saved theme");
                Ok(None)
            }
        }
    }

    /// Theme to use: the saved one, otherwise whatever the system prefers
    pub fn resolve(&self, prefers_dark: bool) -> Result<Theme> {
        let theme = match self.saved()? {
            Some(theme) => theme,
            None if prefers_dark => Theme::Dark,
            None => Theme::Light,
        };
        debug!(%theme, prefers_dark, "Resolved theme");
        Ok(theme)
    }

    pub fn set(&mut self, theme: Theme) -> Result<()> {
        self.kv
            .set(THEME_KEY, &theme.to_string())
            .context("Failed to save theme")?;
        debug!(%theme, "Saved theme");
        Ok(())
    }

    /// Flip the current theme and save it
    pub fn toggle(&mut self, prefers_dark: bool) -> Result<Theme> {
        let theme = self.resolve(prefers_dark)?.toggled();
        self.set(theme)?;
        Ok(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[test]
    fn test_theme_display_and_parse() {
        assert_eq!(Theme::Dark.to_string(), "dark");
        assert_eq!(" Light ".parse::<Theme>().unwrap(), Theme::Light);
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }

    #[test]
    fn test_resolve_without_saved_preference() {
        let themes = ThemeStore::new(MemoryStore::new());
        assert_eq!(themes.resolve(false).unwrap(), Theme::Light);
        assert_eq!(themes.resolve(true).unwrap(), Theme::Dark);
    }

    #[test]
    fn test_saved_preference_wins() {
        let mut themes = ThemeStore::new(MemoryStore::new());
        themes.set(Theme::Light).unwrap();
        assert_eq!(themes.resolve(true).unwrap(), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let mut kv = MemoryStore::new();
        {
            let mut themes = ThemeStore::new(&mut kv);
            assert_eq!(themes.toggle(false).unwrap(), Theme::Dark);
            assert_eq!(themes.toggle(false).unwrap(), Theme::Light);
            assert_eq!(themes.toggle(false).unwrap(), Theme::Dark);
        }
        assert_eq!(kv.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_invalid_saved_theme_is_ignored() {
        let mut kv = MemoryStore::new();
        kv.set(THEME_KEY, "neon").unwrap();
        let themes = ThemeStore::new(kv);
        assert_eq!(themes.saved().unwrap(), None);
        assert_eq!(themes.resolve(true).unwrap(), Theme::Dark);
    }
}
