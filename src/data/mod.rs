use std::fs;
use std::path::Path;

use anyhow::Result;
use geojson::{GeoJson, Geometry, Value};
use tracing::{info, warn};

use crate::map::{Lod, MapRenderer};

/// Load basemap coastlines and the local places layer from `data_dir`.
/// Missing files are skipped; a parse failure skips that file with a log.
pub fn load_all(renderer: &mut MapRenderer, data_dir: &Path) -> Result<()> {
    let coastline_files = [
        ("ne_110m_coastline.json", Lod::Low),
        ("ne_50m_coastline.json", Lod::Medium),
        ("ne_10m_coastline.json", Lod::High),
    ];

    for (filename, lod) in coastline_files {
        let path = data_dir.join(filename);
        if !path.exists() {
            continue;
        }
        match load_coastlines(renderer, &path, lod) {
            Ok(()) => info!(file = filename, "coastlines loaded"),
            Err(e) => warn!(file = filename, error = %e, "failed to load coastlines"),
        }
    }

    let places_path = data_dir.join("places.json");
    if places_path.exists() {
        match load_places(renderer, &places_path) {
            Ok(count) => info!(count, "local places loaded"),
            Err(e) => warn!(error = %e, "failed to load places"),
        }
    }

    Ok(())
}

fn load_coastlines(renderer: &mut MapRenderer, path: &Path, lod: Lod) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;
    collect_lines(&geojson, &mut |line| renderer.add_coastline(line, lod));
    Ok(())
}

/// Load the locally saved places layer (GeoJSON points with `name` and
/// `category` properties).
fn load_places(renderer: &mut MapRenderer, path: &Path) -> Result<usize> {
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;
    let mut count = 0;

    if let GeoJson::FeatureCollection(fc) = geojson {
        for feature in fc.features {
            let props = feature.properties.as_ref();
            let name = props
                .and_then(|p| p.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or("Unnamed")
                .to_string();
            let category = props
                .and_then(|p| p.get("category"))
                .and_then(|v| v.as_str())
                .unwrap_or("other")
                .to_string();

            if let Some(geometry) = feature.geometry {
                if let Value::Point(coords) = geometry.value {
                    if coords.len() >= 2 {
                        renderer.add_place(coords[0], coords[1], name, category);
                        count += 1;
                    }
                }
            }
        }
    }

    Ok(count)
}

/// Extract line features from any GeoJSON shape (polygon exteriors included).
fn collect_lines(geojson: &GeoJson, add_line: &mut impl FnMut(Vec<(f64, f64)>)) {
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    collect_geometry_lines(geometry, add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                collect_geometry_lines(geometry, add_line);
            }
        }
        GeoJson::Geometry(geometry) => collect_geometry_lines(geometry, add_line),
    }
}

fn collect_geometry_lines(geometry: &Geometry, add_line: &mut impl FnMut(Vec<(f64, f64)>)) {
    let to_line = |coords: &Vec<Vec<f64>>| coords.iter().map(|c| (c[0], c[1])).collect::<Vec<_>>();
    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => {
            for coords in lines {
                add_line(to_line(coords));
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    add_line(to_line(exterior));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

/// Coarse continent outlines used when no GeoJSON data directory is present.
/// Enough to orient panning and zooming; real data replaces it when available.
pub fn generate_fallback_world(renderer: &mut MapRenderer) {
    // Americas
    renderer.add_coastline(
        vec![
            (-165.0, 64.0), (-140.0, 60.0), (-124.0, 48.0), (-117.0, 33.0),
            (-97.0, 26.0), (-82.0, 24.0), (-75.0, 36.0), (-66.0, 45.0),
            (-55.0, 50.0), (-68.0, 59.0), (-95.0, 62.0), (-128.0, 69.0),
            (-165.0, 64.0),
        ],
        Lod::Low,
    );
    renderer.add_coastline(
        vec![
            (-81.0, 9.0), (-61.0, 5.0), (-35.0, -7.0), (-41.0, -22.0),
            (-57.0, -36.0), (-68.0, -52.0), (-72.0, -37.0), (-70.0, -18.0),
            (-79.0, -3.0), (-81.0, 9.0),
        ],
        Lod::Low,
    );
    // Europe and Asia
    renderer.add_coastline(
        vec![
            (-9.0, 37.0), (3.0, 43.0), (18.0, 40.0), (27.0, 41.0),
            (41.0, 47.0), (60.0, 55.0), (90.0, 50.0), (120.0, 40.0),
            (135.0, 35.0), (142.0, 46.0), (135.0, 56.0), (100.0, 60.0),
            (60.0, 67.0), (28.0, 65.0), (11.0, 64.0), (5.0, 58.0),
            (-9.0, 50.0), (-9.0, 37.0),
        ],
        Lod::Low,
    );
    // Africa
    renderer.add_coastline(
        vec![
            (-16.0, 22.0), (-5.0, 35.0), (11.0, 37.0), (32.0, 31.0),
            (43.0, 11.0), (40.0, -15.0), (27.0, -33.0), (18.0, -34.0),
            (12.0, -17.0), (9.0, 4.0), (-8.0, 4.0), (-17.0, 14.0),
            (-16.0, 22.0),
        ],
        Lod::Low,
    );
    // Australia
    renderer.add_coastline(
        vec![
            (114.0, -22.0), (131.0, -12.0), (143.0, -11.0), (153.0, -27.0),
            (147.0, -38.0), (130.0, -32.0), (115.0, -34.0), (114.0, -22.0),
        ],
        Lod::Low,
    );

    // A few seed places so the local layer renders without a data file.
    renderer.add_place(13.404, 52.520, "Alexanderplatz Market".into(), "grocery".into());
    renderer.add_place(2.349, 48.853, "Marais Bistro".into(), "restaurant-bar".into());
    renderer.add_place(-0.128, 51.507, "Trafalgar Corner".into(), "other".into());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_world_populates_renderer() {
        let mut renderer = MapRenderer::new();
        generate_fallback_world(&mut renderer);
        assert!(renderer.has_data());
        assert_eq!(renderer.places().len(), 3);
    }

    #[test]
    fn collect_lines_handles_polygons() {
        let geojson: GeoJson = r#"{
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        }"#
        .parse()
        .unwrap();
        let mut lines = Vec::new();
        collect_lines(&geojson, &mut |line| lines.push(line));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 4);
    }
}
