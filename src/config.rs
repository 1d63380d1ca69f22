//! Configuration: XDG-style directories, user settings, and the persisted
//! theme preference.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::storage::{PersistentStore, keys};

/// Resolve an XDG base directory from environment or default to `$HOME`
/// plus the given segments.
fn xdg_base_dir(var: &str, home_default: &[&str]) -> PathBuf {
    if let Ok(p) = env::var(var)
        && !p.trim().is_empty()
    {
        return PathBuf::from(p);
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let mut base = PathBuf::from(home);
    for seg in home_default {
        base = base.join(seg);
    }
    base
}

/// Config directory `~/.config/cinesea` (ensured to exist).
pub fn config_dir() -> PathBuf {
    if let Ok(home) = env::var("HOME") {
        let dir = Path::new(&home).join(".config").join("cinesea");
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir;
        }
    }
    let dir = xdg_base_dir("XDG_CONFIG_HOME", &[".config"]).join("cinesea");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// State directory `$XDG_STATE_HOME/cinesea` for the persistent store
/// (ensured to exist).
pub fn state_dir() -> PathBuf {
    let dir = xdg_base_dir("XDG_STATE_HOME", &[".local", "state"]).join("cinesea");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Logs directory under config (ensured to exist).
pub fn logs_dir() -> PathBuf {
    let dir = config_dir().join("logs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// User settings from `settings.toml` in the config dir. Missing file or
/// fields fall back to defaults; a malformed file is logged and ignored.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// TMDB API key. The `--api-key` flag and `CINESEA_API_KEY` override.
    pub api_key: Option<String>,
    /// Catalog response language.
    pub language: String,
    /// Quiet period for search input, in milliseconds.
    pub debounce_ms: u64,
    /// Notification lifetime, in seconds.
    pub notification_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            language: "en-US".to_owned(),
            debounce_ms: crate::search::DEBOUNCE.as_millis() as u64,
            notification_ttl_secs: crate::notify::DEFAULT_TTL.as_secs(),
        }
    }
}

impl Settings {
    /// Load from the config dir, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_dir().join("settings.toml"))
    }

    fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "settings file malformed; using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Notification lifetime as a [`Duration`].
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }
}

/// UI color theme preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light palette.
    Light,
    /// Dark palette (default).
    #[default]
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Persisted theme preference; unknown or absent stored values fall back
/// to the default.
pub fn load_theme(store: &PersistentStore) -> Theme {
    store.get(keys::THEME).unwrap_or_default()
}

/// Persist the theme preference. Best effort.
pub fn save_theme(store: &PersistentStore, theme: Theme) {
    if let Err(e) = store.set(keys::THEME, &theme, None) {
        tracing::warn!(error = %e, "theme preference not persisted");
    }
}
