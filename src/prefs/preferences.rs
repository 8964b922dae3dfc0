use tracing::{debug, warn};

use super::store::KeyValueStore;

pub const RATE_KEY: &str = "playback_rate";
pub const AUTOPLAY_KEY: &str = "autoplay_enabled";

const DEFAULT_RATE: f64 = 1.0;

/// The one playback rate shared by every video, and the autoplay switch.
///
/// All reads and writes of persisted preferences go through here.
pub struct PlaybackPreferences {
    rate: f64,
    autoplay: bool,
    store: Box<dyn KeyValueStore>,
}

impl PlaybackPreferences {
    /// Defaults, backed by `store`. Call [`load`](Self::load) to pick up
    /// persisted values.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            rate: DEFAULT_RATE,
            autoplay: false,
            store,
        }
    }

    /// Read persisted values. Missing or malformed entries fall back to the
    /// defaults.
    pub fn load(&mut self) {
        self.rate = match self.store.get(RATE_KEY) {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(r) if r.is_finite() && r > 0.0 => r,
                _ => {
                    warn!(value = %raw, "ignoring stored playback rate");
                    DEFAULT_RATE
                }
            },
            None => DEFAULT_RATE,
        };

        self.autoplay = match self.store.get(AUTOPLAY_KEY).as_deref().map(str::trim) {
            Some("true") => true,
            Some("false") | None => false,
            Some(other) => {
                warn!(value = %other, "ignoring stored autoplay flag");
                false
            }
        };
        debug!(rate = self.rate, autoplay = self.autoplay, "loaded playback preferences");
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    /// Change the shared rate. Only non-default rates are written out, so a
    /// previously stored rate survives a return to 1.0.
    pub fn set_rate(&mut self, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            warn!(rate, "rejecting invalid playback rate");
            return;
        }
        self.rate = rate;
        if rate != DEFAULT_RATE {
            self.persist(RATE_KEY, &rate.to_string());
        }
    }

    pub fn set_autoplay(&mut self, enabled: bool) {
        self.autoplay = enabled;
        self.persist(AUTOPLAY_KEY, if enabled { "true" } else { "false" });
    }

    fn persist(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key, error = %e, "failed to save preference");
        }
    }
}
