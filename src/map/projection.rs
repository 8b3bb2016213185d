use std::f64::consts::PI;

/// Lowest zoom level (whole world in a few tiles).
pub const MIN_ZOOM: f64 = 1.0;
/// Highest zoom level (street scale).
pub const MAX_ZOOM: f64 = 19.0;

/// Pixels per tile-space unit at zoom 0.
const TILE_SIZE: f64 = 256.0;
/// Web Mercator latitude limit.
const MAX_LAT: f64 = 85.0511;

/// Geographic rectangle currently visible on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Viewport over a Web Mercator world, using tile-style zoom levels
/// (zoom z means the world is `256 * 2^z` pixels wide).
#[derive(Clone)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Zoom level (MIN_ZOOM..=MAX_ZOOM, fractional allowed)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

/// Normalized Mercator y (0 at the north limit, 1 at the south limit).
fn mercator_y(lat: f64) -> f64 {
    let rad = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    (1.0 - (rad.tan() + 1.0 / rad.cos()).ln() / PI) / 2.0
}

/// Inverse of `mercator_y`, returning latitude in degrees.
fn inv_mercator_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    /// World view centered on the mid-latitudes.
    pub fn world(width: usize, height: usize) -> Self {
        Self::new(0.0, 20.0, 2.0, width, height)
    }

    /// World width in pixels at the current zoom.
    fn world_px(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    /// Project a geographic coordinate (lon, lat) to canvas pixel coordinates.
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let scale = self.world_px();
        let cx = (self.center_lon + 180.0) / 360.0 * scale;
        let cy = mercator_y(self.center_lat) * scale;
        let px = (lon + 180.0) / 360.0 * scale - cx + self.width as f64 / 2.0;
        let py = mercator_y(lat) * scale - cy + self.height as f64 / 2.0;
        (px.round() as i32, py.round() as i32)
    }

    /// Unproject canvas pixel coordinates back to (lon, lat).
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.world_px();
        let cx = (self.center_lon + 180.0) / 360.0 * scale;
        let cy = mercator_y(self.center_lat) * scale;
        let x = (cx + px as f64 - self.width as f64 / 2.0) / scale;
        let y = (cy + py as f64 - self.height as f64 / 2.0) / scale;
        (x * 360.0 - 180.0, inv_mercator_y(y))
    }

    /// Geographic bounds of the visible area, clamped to legal ranges.
    pub fn bounds(&self) -> LatLngBounds {
        let (west, north) = self.unproject(0, 0);
        let (east, south) = self.unproject(self.width as i32, self.height as i32);
        LatLngBounds {
            north: north.clamp(-MAX_LAT, MAX_LAT),
            south: south.clamp(-MAX_LAT, MAX_LAT),
            east: east.clamp(-180.0, 180.0),
            west: west.clamp(-180.0, 180.0),
        }
    }

    /// Pan the viewport by a pixel delta.
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.world_px();
        self.center_lon += dx as f64 / scale * 360.0;
        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }
        let y = mercator_y(self.center_lat) + dy as f64 / scale;
        self.center_lat = inv_mercator_y(y).clamp(-MAX_LAT, MAX_LAT);
    }

    /// Zoom in one level.
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1.0).min(MAX_ZOOM);
    }

    /// Zoom out one level.
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - 1.0).max(MIN_ZOOM);
    }

    /// Zoom in one level towards a specific pixel location.
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0);
    }

    /// Zoom out one level away from a specific pixel location.
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, -1.0);
    }

    /// Change zoom while keeping the geographic point under (px, py) fixed.
    fn zoom_at(&mut self, px: i32, py: i32, delta: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Check if a projected point is within the viewport (small margin).
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }

    /// Rough bounding-box visibility check for a line segment.
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);
        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_projects_to_middle() {
        let vp = Viewport::new(0.0, 0.0, 3.0, 100, 100);
        assert_eq!(vp.project(0.0, 0.0), (50, 50));
    }

    #[test]
    fn project_unproject_roundtrip() {
        let vp = Viewport::new(13.4, 52.5, 15.0, 200, 120);
        let (px, py) = vp.project(13.41, 52.51);
        let (lon, lat) = vp.unproject(px, py);
        assert!((lon - 13.41).abs() < 1e-4);
        assert!((lat - 52.51).abs() < 1e-4);
    }

    #[test]
    fn bounds_contain_center() {
        let vp = Viewport::new(13.4, 52.5, 15.0, 200, 120);
        let b = vp.bounds();
        assert!(b.west < 13.4 && 13.4 < b.east);
        assert!(b.south < 52.5 && 52.5 < b.north);
        assert!(b.north > b.south);
    }

    #[test]
    fn zooming_in_shrinks_bounds() {
        let mut vp = Viewport::new(13.4, 52.5, 10.0, 200, 120);
        let wide = vp.bounds();
        vp.zoom_in();
        let narrow = vp.bounds();
        assert!(narrow.east - narrow.west < wide.east - wide.west);
        assert!(narrow.north - narrow.south < wide.north - wide.south);
    }

    #[test]
    fn pan_east_moves_center() {
        let mut vp = Viewport::new(0.0, 0.0, 5.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
    }

    #[test]
    fn zoom_at_keeps_anchor_fixed() {
        let mut vp = Viewport::new(0.0, 20.0, 8.0, 200, 120);
        let (lon, lat) = vp.unproject(30, 40);
        vp.zoom_in_at(30, 40);
        let (lon2, lat2) = vp.unproject(30, 40);
        assert!((lon - lon2).abs() < 0.05);
        assert!((lat - lat2).abs() < 0.05);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = Viewport::new(0.0, 0.0, MAX_ZOOM, 100, 100);
        vp.zoom_in();
        assert_eq!(vp.zoom, MAX_ZOOM);
        vp.zoom = MIN_ZOOM;
        vp.zoom_out();
        assert_eq!(vp.zoom, MIN_ZOOM);
    }
}
