use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tui_places::map::{LatLngBounds, Viewport};
use tui_places::poi::{OverlayConfig, PoiOverlay};

fn bench_projection(c: &mut Criterion) {
    let viewport = Viewport::new(13.4, 52.5, 15.0, 400, 200);
    c.bench_function("project_1k_points", |b| {
        b.iter(|| {
            for i in 0..1000 {
                let lon = 13.3 + (i as f64) * 1e-4;
                let lat = 52.4 + (i as f64) * 1e-4;
                black_box(viewport.project(black_box(lon), black_box(lat)));
            }
        })
    });
}

fn bench_band_classification(c: &mut Criterion) {
    let config = OverlayConfig::default();
    c.bench_function("zoom_band_classify", |b| {
        b.iter(|| {
            for z in 0..200 {
                black_box(config.band(black_box(z as f64 * 0.1)));
            }
        })
    });
}

fn bench_debounce_storm(c: &mut Criterion) {
    let bounds = LatLngBounds {
        north: 52.6,
        south: 52.4,
        east: 13.6,
        west: 13.2,
    };
    c.bench_function("viewport_event_storm", |b| {
        b.iter(|| {
            let mut overlay = PoiOverlay::new(OverlayConfig::default(), 16.0);
            let start = Instant::now();
            for i in 0..1000u64 {
                let t = start + Duration::from_millis(i);
                overlay.viewport_changed(16.0, black_box(bounds), t);
                black_box(overlay.poll(t));
            }
        })
    });
}

criterion_group!(benches, bench_projection, bench_band_classification, bench_debounce_storm);
criterion_main!(benches);
