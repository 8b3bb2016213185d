use std::time::Instant;

use crate::map::{MapRenderer, Viewport};
use crate::poi::{FetchHandle, OverlayConfig, Poi, PoiOverlay, ZoomBand};

/// Squared pixel distance within which a click selects a POI marker.
const PICK_RADIUS_SQ: i32 = 36;

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    pub overlay: PoiOverlay,
    fetcher: FetchHandle,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Identity of the selected POI, surfaced in the status bar
    selected_poi: Option<i64>,
}

impl App {
    pub fn new(config: OverlayConfig, fetcher: FetchHandle, width: usize, height: usize) -> Self {
        // Braille gives 2x4 resolution per character.
        // Account for border (2 chars horizontal, 2 for border + 1 status bar vertical).
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);
        let viewport = Viewport::world(inner_width * 2, inner_height * 4);

        let mut overlay = PoiOverlay::new(config, viewport.zoom);
        // Initial band is evaluated once at mount, same as the first settled event.
        overlay.viewport_changed(viewport.zoom, viewport.bounds(), Instant::now());

        Self {
            viewport,
            map_renderer: MapRenderer::new(),
            overlay,
            fetcher,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            selected_poi: None,
        }
    }

    /// Update viewport size when the terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);
        self.viewport.width = inner_width * 2;
        self.viewport.height = inner_height * 4;
        self.view_settled();
    }

    /// Notify the overlay that a pan or zoom gesture has settled
    fn view_settled(&mut self) {
        self.overlay
            .viewport_changed(self.viewport.zoom, self.viewport.bounds(), Instant::now());
    }

    /// Pan the map by a braille-pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
        self.view_settled();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.view_settled();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.view_settled();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
        self.view_settled();
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
        self.view_settled();
    }

    /// Advance timers and drain completed fetches; called once per frame
    pub fn tick(&mut self) {
        let now = Instant::now();
        if let Some(request) = self.overlay.poll(now) {
            self.fetcher.dispatch(request);
        }
        while let Some(done) = self.fetcher.try_recv() {
            self.overlay.apply(done.generation, done.result);
        }
        // Drop a selection whose POI is no longer on screen
        if let Some(id) = self.selected_poi {
            if !self.overlay.visible().iter().any(|p| p.id == id) {
                self.selected_poi = None;
            }
        }
    }

    /// Toggle the fetched-POI overlay on or off
    pub fn toggle_pois(&mut self) {
        let enabled = !self.overlay.enabled();
        self.overlay
            .set_enabled(enabled, self.viewport.bounds(), Instant::now());
        if !enabled {
            self.selected_poi = None;
        }
    }

    /// Select the next visible POI (wraps around)
    pub fn select_next(&mut self) {
        self.cycle_selection(1);
    }

    /// Select the previous visible POI (wraps around)
    pub fn select_prev(&mut self) {
        self.cycle_selection(-1);
    }

    fn cycle_selection(&mut self, step: isize) {
        let visible = self.overlay.visible();
        if visible.is_empty() {
            self.selected_poi = None;
            return;
        }
        let len = visible.len() as isize;
        let current = self
            .selected_poi
            .and_then(|id| visible.iter().position(|p| p.id == id))
            .map(|i| i as isize);
        let next = match current {
            Some(i) => (i + step).rem_euclid(len),
            None => {
                if step >= 0 {
                    0
                } else {
                    len - 1
                }
            }
        };
        self.selected_poi = Some(visible[next as usize].id);
    }

    /// Select the POI marker nearest to a click, if close enough
    pub fn select_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        let mut best: Option<(i32, i64)> = None;
        for poi in self.overlay.visible() {
            let (mx, my) = self.viewport.project(poi.lon, poi.lat);
            let d = (mx - px).pow(2) + (my - py).pow(2);
            if d <= PICK_RADIUS_SQ && best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, poi.id));
            }
        }
        if let Some((_, id)) = best {
            self.selected_poi = Some(id);
        }
    }

    pub fn selected_poi(&self) -> Option<&Poi> {
        let id = self.selected_poi?;
        self.overlay.visible().iter().find(|p| p.id == id)
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("z{:.1}", self.viewport.zoom)
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        format!(
            "{:.2}°{}, {:.2}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Overlay status for the status bar
    pub fn overlay_label(&self) -> &'static str {
        if !self.overlay.enabled() {
            return "off";
        }
        match self.overlay.band() {
            ZoomBand::Cleared => "cleared",
            ZoomBand::Held => "held",
            ZoomBand::Active => "active",
        }
    }

    /// Handle mouse drag panning
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (last_y as i32 - y as i32) * 4;
            self.pan(dx, dy);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when the mouse button is released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Get mouse position in braille pixel coordinates (for rendering marker)
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| cell_to_pixel(col, row))
    }
}

/// Convert a terminal cell to braille pixel coordinates.
/// Each cell is 2 pixels wide and 4 tall; the map border is 1 cell.
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    let px = ((col.saturating_sub(1)) as i32) * 2;
    let py = ((row.saturating_sub(1)) as i32) * 4;
    (px, py)
}
