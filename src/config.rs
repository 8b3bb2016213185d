use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use std::{env, fmt};

use tracing::warn;

use crate::poi::{OverlayConfig, DEFAULT_ENDPOINT};

/// Runtime configuration, read once at startup from the environment.
pub struct Config {
    /// Zoom below which fetched POIs are cleared.
    pub clear_zoom: f64,
    /// Zoom at which POI fetching becomes active.
    pub active_zoom: f64,
    /// Quiet interval before a viewport change triggers a fetch.
    pub debounce_ms: u64,
    /// Overpass-compatible endpoint for POI queries.
    pub endpoint: String,
    /// Directory holding basemap GeoJSON and the local places file.
    pub data_dir: PathBuf,
    /// Log file path (stdout belongs to the terminal UI).
    pub log_file: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self {
            clear_zoom: try_load("POI_CLEAR_ZOOM", 12.0),
            active_zoom: try_load("POI_ACTIVE_ZOOM", 15.0),
            debounce_ms: try_load("POI_DEBOUNCE_MS", 250),
            endpoint: load_string("POI_ENDPOINT", DEFAULT_ENDPOINT),
            data_dir: PathBuf::from(load_string("PLACES_DATA_DIR", "data")),
            log_file: PathBuf::from(load_string("PLACES_LOG", "tui-places.log")),
        }
    }

    pub fn overlay(&self) -> OverlayConfig {
        OverlayConfig {
            clear_zoom: self.clear_zoom,
            active_zoom: self.active_zoom,
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }
}

fn load_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(e) => {
                warn!("invalid {key} value {raw:?}: {e}, using default {default}");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_thresholds() {
        let config = Config::load();
        assert_eq!(config.clear_zoom, 12.0);
        assert_eq!(config.active_zoom, 15.0);
        assert!(config.clear_zoom < config.active_zoom);
        assert_eq!(config.overlay().debounce, Duration::from_millis(250));
    }

    #[test]
    fn unparsable_values_fall_back() {
        assert_eq!(try_load("POI_TEST_KEY_THAT_DOES_NOT_EXIST", 17.0), 17.0);
    }
}
