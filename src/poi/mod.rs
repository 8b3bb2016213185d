//! Zoom-gated, debounced overlay of nearby points of interest.
//!
//! The overlay never blocks the UI loop: viewport changes arm a trailing-edge
//! debounce timer, `poll` turns an expired timer into a fetch request for the
//! worker thread, and completed fetches land back through `apply`. Every
//! dispatched fetch carries a generation number so a late response for an old
//! viewport can never clobber a newer result.

mod fetch;
mod overpass;

pub use fetch::{FetchHandle, FetchResult};
pub use overpass::{FetchError, OverpassProvider, PoiProvider, DEFAULT_ENDPOINT};

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::map::LatLngBounds;

/// A fetched point of interest (shop, landmark, ...), distinct from the
/// locally stored places layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Poi {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub lat: f64,
    pub lon: f64,
}

/// Zoom classification driving fetch and render behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomBand {
    /// Below the clear threshold: nothing fetched, nothing shown.
    Cleared,
    /// Between the thresholds: no new fetches, last result stays visible.
    Held,
    /// At or above the active threshold: fetching and rendering permitted.
    Active,
}

/// Overlay tunables. Both thresholds are inclusive lower bounds.
#[derive(Debug, Clone, Copy)]
pub struct OverlayConfig {
    pub clear_zoom: f64,
    pub active_zoom: f64,
    pub debounce: Duration,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            clear_zoom: 12.0,
            active_zoom: 15.0,
            debounce: Duration::from_millis(250),
        }
    }
}

impl OverlayConfig {
    /// Classify a zoom level. Pure; called on every settled viewport change.
    pub fn band(&self, zoom: f64) -> ZoomBand {
        if zoom < self.clear_zoom {
            ZoomBand::Cleared
        } else if zoom < self.active_zoom {
            ZoomBand::Held
        } else {
            ZoomBand::Active
        }
    }
}

/// A fetch the controller has decided to dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchRequest {
    pub generation: u64,
    pub bounds: LatLngBounds,
}

/// Armed debounce timer: the newest bounds and when they become fetchable.
struct PendingFetch {
    bounds: LatLngBounds,
    deadline: Instant,
}

/// The overlay controller. One instance per map view; all state is owned
/// here and mutated only from the UI loop.
pub struct PoiOverlay {
    config: OverlayConfig,
    enabled: bool,
    zoom: f64,
    /// Single cache slot, replaced wholesale on each applied fetch.
    pois: Vec<Poi>,
    pending: Option<PendingFetch>,
    /// Generation handed to the next dispatched fetch.
    next_generation: u64,
    /// Highest generation applied or invalidated; results at or below
    /// this are stale and dropped.
    applied_generation: u64,
}

impl PoiOverlay {
    /// Build the controller; the band for `initial_zoom` takes effect
    /// immediately, but no fetch is armed until the first viewport event.
    pub fn new(config: OverlayConfig, initial_zoom: f64) -> Self {
        Self {
            config,
            enabled: true,
            zoom: initial_zoom,
            pois: Vec::new(),
            pending: None,
            next_generation: 1,
            applied_generation: 0,
        }
    }

    /// Handle a settled viewport change (move or zoom finished).
    ///
    /// In the active band this restarts the debounce timer with the newest
    /// bounds; in the held band it disarms the timer without touching the
    /// cache; in the cleared band it empties the cache as well.
    pub fn viewport_changed(&mut self, zoom: f64, bounds: LatLngBounds, now: Instant) {
        self.zoom = zoom;
        if !self.enabled {
            return;
        }
        match self.config.band(zoom) {
            ZoomBand::Active => {
                self.pending = Some(PendingFetch {
                    bounds,
                    deadline: now + self.config.debounce,
                });
            }
            ZoomBand::Held => {
                self.pending = None;
            }
            ZoomBand::Cleared => {
                self.clear();
            }
        }
    }

    /// Tick the debounce timer. Returns a request to hand to the fetch
    /// worker once the quiet interval has elapsed, at most once per armed
    /// timer.
    pub fn poll(&mut self, now: Instant) -> Option<FetchRequest> {
        match &self.pending {
            Some(p) if now >= p.deadline => {}
            _ => return None,
        }
        let pending = self.pending.take()?;
        let generation = self.next_generation;
        self.next_generation += 1;
        debug!(generation, "poi fetch due");
        Some(FetchRequest {
            generation,
            bounds: pending.bounds,
        })
    }

    /// Apply a completed fetch. Stale generations are dropped; failures are
    /// logged and leave the cache slot untouched.
    pub fn apply(&mut self, generation: u64, result: Result<Vec<Poi>, FetchError>) {
        if generation <= self.applied_generation {
            debug!(generation, "dropping stale poi result");
            return;
        }
        match result {
            Ok(pois) => {
                debug!(generation, count = pois.len(), "poi fetch applied");
                self.applied_generation = generation;
                self.pois = pois;
            }
            Err(err) => {
                warn!(generation, error = %err, "poi fetch failed");
            }
        }
    }

    /// The POIs the render surface should paint right now. Empty in the
    /// cleared band (and while disabled) regardless of cache contents.
    pub fn visible(&self) -> &[Poi] {
        if !self.enabled || self.config.band(self.zoom) == ZoomBand::Cleared {
            &[]
        } else {
            &self.pois
        }
    }

    /// Toggle the overlay. Disabling empties the cache and cancels any
    /// pending fetch; enabling re-evaluates the current viewport.
    pub fn set_enabled(&mut self, enabled: bool, bounds: LatLngBounds, now: Instant) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.viewport_changed(self.zoom, bounds, now);
        } else {
            self.clear();
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Current band, from the last settled zoom.
    pub fn band(&self) -> ZoomBand {
        self.config.band(self.zoom)
    }

    /// Empty the cache slot, disarm the timer, and invalidate every fetch
    /// dispatched so far.
    fn clear(&mut self) {
        self.pois.clear();
        self.pending = None;
        self.applied_generation = self.next_generation - 1;
    }
}
