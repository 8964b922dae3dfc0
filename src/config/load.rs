use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `VIDSHELF__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("VIDSHELF")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.playback.rates.is_empty() {
            return Err("playback.rates must not be empty".to_string());
        }
        if let Some(r) = self
            .playback
            .rates
            .iter()
            .find(|r| !r.is_finite() || **r <= 0.0)
        {
            return Err(format!("playback.rates contains invalid rate {r}"));
        }
        if self.player.command.trim().is_empty() {
            return Err("player.command must not be empty".to_string());
        }
        Ok(())
    }

    /// Resolved location of the preference store, if any.
    pub fn prefs_path(&self) -> Option<PathBuf> {
        self.storage
            .prefs_path
            .clone()
            .or_else(|| state_dir().map(|d| d.join("prefs.toml")))
    }

    /// Resolved location of the log file, if any.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.logging
            .file
            .clone()
            .or_else(|| state_dir().map(|d| d.join("vidshelf.log")))
    }
}

/// Resolve the config path from `VIDSHELF_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("VIDSHELF_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/vidshelf/config.toml`
/// or `~/.config/vidshelf/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("vidshelf").join("config.toml"))
}

/// `$XDG_STATE_HOME/vidshelf` or `~/.local/state/vidshelf`.
pub fn state_dir() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("vidshelf"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
