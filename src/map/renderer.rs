use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_circle, draw_line};
use crate::map::projection::Viewport;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Level of detail for basemap data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - continental
    High,   // 10m - regional
}

impl Lod {
    /// Select LOD from a tile-style zoom level
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 5.0 {
            Lod::Low
        } else if zoom < 8.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }
}

/// A locally saved place, always rendered regardless of zoom band
#[derive(Clone)]
pub struct Place {
    pub lon: f64,
    pub lat: f64,
    pub name: String,
    pub category: String,
}

/// Display toggles for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_coastlines: bool,
    pub show_places: bool,
    pub show_labels: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_coastlines: true,
            show_places: true,
            show_labels: true,
        }
    }
}

/// Basemap renderer: multi-resolution coastlines plus the local places layer
pub struct MapRenderer {
    coastlines_low: Vec<LineString>,
    coastlines_medium: Vec<LineString>,
    coastlines_high: Vec<LineString>,
    places: Vec<Place>,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            coastlines_low: Vec::new(),
            coastlines_medium: Vec::new(),
            coastlines_high: Vec::new(),
            places: Vec::new(),
            settings: DisplaySettings::default(),
        }
    }

    /// Get coastlines for the given LOD, falling back to coarser data
    fn coastlines(&self, lod: Lod) -> &Vec<LineString> {
        match lod {
            Lod::High if !self.coastlines_high.is_empty() => &self.coastlines_high,
            Lod::High | Lod::Medium if !self.coastlines_medium.is_empty() => {
                &self.coastlines_medium
            }
            _ => &self.coastlines_low,
        }
    }

    /// Render the basemap into the canvas; returns place labels as
    /// (char_x, char_y, text) for the widget to overlay.
    pub fn render(&self, canvas: &mut BrailleCanvas, viewport: &Viewport) -> Vec<(u16, u16, String)> {
        let lod = Lod::from_zoom(viewport.zoom);
        let mut labels = Vec::new();

        if self.settings.show_coastlines {
            for line in self.coastlines(lod) {
                self.draw_linestring(canvas, line, viewport);
            }
        }

        if self.settings.show_places {
            let radius = if viewport.zoom >= 13.0 { 2 } else { 1 };
            for place in &self.places {
                let (px, py) = viewport.project(place.lon, place.lat);
                if !viewport.is_visible(px, py) {
                    continue;
                }
                draw_circle(canvas, px, py, radius);
                if self.settings.show_labels && viewport.zoom >= 11.0 && px >= 0 && py >= 0 {
                    let char_x = (px / 2) as u16;
                    let char_y = (py / 4) as u16;
                    if let Some(label_x) = char_x.checked_add(2) {
                        labels.push((label_x, char_y, place.name.clone()));
                    }
                }
            }
        }

        labels
    }

    /// Draw a linestring with viewport culling
    fn draw_linestring(&self, canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
        if line.len() < 2 {
            return;
        }
        let mut prev: Option<(i32, i32)> = None;
        for &(lon, lat) in line {
            let (px, py) = viewport.project(lon, lat);
            if let Some((prev_x, prev_y)) = prev {
                let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
                if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                    draw_line(canvas, prev_x, prev_y, px, py);
                }
            }
            prev = Some((px, py));
        }
    }

    /// Add coastline data at a specific LOD
    pub fn add_coastline(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::Low => self.coastlines_low.push(line),
            Lod::Medium => self.coastlines_medium.push(line),
            Lod::High => self.coastlines_high.push(line),
        }
    }

    /// Add a locally saved place
    pub fn add_place(&mut self, lon: f64, lat: f64, name: String, category: String) {
        self.places.push(Place {
            lon,
            lat,
            name,
            category,
        });
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Check if any basemap data is loaded
    pub fn has_data(&self) -> bool {
        !self.coastlines_low.is_empty()
            || !self.coastlines_medium.is_empty()
            || !self.coastlines_high.is_empty()
    }

    pub fn toggle_labels(&mut self) {
        self.settings.show_labels = !self.settings.show_labels;
    }

    pub fn toggle_places(&mut self) {
        self.settings.show_places = !self.settings.show_places;
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lod_tracks_zoom() {
        assert_eq!(Lod::from_zoom(2.0), Lod::Low);
        assert_eq!(Lod::from_zoom(6.0), Lod::Medium);
        assert_eq!(Lod::from_zoom(15.0), Lod::High);
    }

    #[test]
    fn coastline_lod_falls_back_to_coarser() {
        let mut renderer = MapRenderer::new();
        renderer.add_coastline(vec![(0.0, 0.0), (1.0, 1.0)], Lod::Low);
        assert_eq!(renderer.coastlines(Lod::High).len(), 1);
        renderer.add_coastline(vec![(0.0, 0.0), (2.0, 2.0)], Lod::High);
        assert_eq!(renderer.coastlines(Lod::High).len(), 1);
        assert!(renderer.coastlines(Lod::High)[0][1] == (2.0, 2.0));
    }

    #[test]
    fn render_collects_place_labels_at_high_zoom() {
        let mut renderer = MapRenderer::new();
        renderer.add_place(13.4, 52.5, "Spot".into(), "other".into());
        let viewport = Viewport::new(13.4, 52.5, 15.0, 100, 100);
        let mut canvas = BrailleCanvas::new(50, 25);
        let labels = renderer.render(&mut canvas, &viewport);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].2, "Spot");
    }

    #[test]
    fn hidden_places_produce_no_labels() {
        let mut renderer = MapRenderer::new();
        renderer.add_place(13.4, 52.5, "Spot".into(), "other".into());
        renderer.toggle_places();
        let viewport = Viewport::new(13.4, 52.5, 15.0, 100, 100);
        let mut canvas = BrailleCanvas::new(50, 25);
        assert!(renderer.render(&mut canvas, &viewport).is_empty());
    }
}
