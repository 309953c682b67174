//! Light/dark theme preference
//!
//! The browser keeps the reader's choice in local storage under
//! [`STORAGE_KEY`]; `assets/theme.js` applies the same rules as
//! [`initial_theme`] on every page load. [`ThemeStorage`] abstracts the
//! storage so the toggle-and-restore cycle can run outside a browser.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Local storage key holding the persisted theme
pub const STORAGE_KEY: &str = "theme";

/// UI color theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Returned when a stored value is neither `light` nor `dark`
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown theme: {0:?}")]
pub struct UnknownTheme(pub String);

impl Theme {
    /// Value written to storage and to the `data-theme` attribute
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// The opposite theme
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Toggle button caption: names the theme a click switches to
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "Dark",
            Theme::Dark => "Light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

/// Key/value storage surviving page reloads
pub trait ThemeStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory [`ThemeStorage`]
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThemeStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Theme applied on page load
///
/// A valid stored preference wins, then the system color scheme.
pub fn initial_theme(stored: Option<&str>, prefers_dark: bool) -> Theme {
    match stored.map(str::parse::<Theme>) {
        Some(Ok(theme)) => theme,
        Some(Err(e)) => {
            tracing::debug!("Ignoring stored theme: {}", e);
            fallback(prefers_dark)
        }
        None => fallback(prefers_dark),
    }
}

fn fallback(prefers_dark: bool) -> Theme {
    if prefers_dark {
        Theme::Dark
    } else {
        Theme::Light
    }
}

/// Resolve the theme from storage as a fresh page load would
pub fn load_theme<S: ThemeStorage>(storage: &S, prefers_dark: bool) -> Theme {
    initial_theme(storage.get(STORAGE_KEY).as_deref(), prefers_dark)
}

/// Flip `current` and persist the result
pub fn toggle_and_persist<S: ThemeStorage>(storage: &mut S, current: Theme) -> Theme {
    let next = current.toggle();
    storage.set(STORAGE_KEY, next.as_str());
    next
}
