use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geo::{LineString, Polygon};
use landmark_editor::geometry::{area_m2, overlaps, Extent};
use landmark_editor::wkt::{format_polygon, parse_polygon};

/// A grid of small square landmarks around Thiruvananthapuram
fn landmark_grid(side: usize) -> Vec<(i64, Polygon<f64>)> {
    let mut landmarks = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            let lon = 76.80 + col as f64 * 0.01;
            let lat = 8.40 + row as f64 * 0.01;
            let block = Extent::from_corners((lon, lat), (lon + 0.008, lat + 0.008)).to_polygon();
            landmarks.push(((row * side + col) as i64, block));
        }
    }
    landmarks
}

fn bench_overlap(c: &mut Criterion) {
    let landmarks = landmark_grid(20);
    // Sits in the gap between grid cells
    let clear = Extent::from_corners((76.9081, 8.5081), (76.9099, 8.5099)).to_polygon();
    // Straddles four cells
    let straddling = Extent::from_corners((76.905, 8.505), (76.915, 8.515)).to_polygon();

    c.bench_function("overlaps_400_clear", |b| {
        b.iter(|| overlaps(black_box(&clear), black_box(&landmarks), None))
    });
    c.bench_function("overlaps_400_hit", |b| {
        b.iter(|| overlaps(black_box(&straddling), black_box(&landmarks), None))
    });
}

fn bench_wkt(c: &mut Criterion) {
    // 64-vertex ring, the size of a hand-traced boundary
    let ring: LineString<f64> = (0..64)
        .map(|i| {
            let t = i as f64 / 64.0 * std::f64::consts::TAU;
            (76.9366 + 0.004 * t.cos(), 8.5241 + 0.004 * t.sin())
        })
        .collect();
    let wkt = format_polygon(&ring);
    let boundary = Polygon::new(ring, vec![]);

    c.bench_function("parse_polygon_64", |b| b.iter(|| parse_polygon(black_box(&wkt))));
    c.bench_function("ring_area_64", |b| b.iter(|| area_m2(black_box(&boundary))));
}

criterion_group!(benches, bench_overlap, bench_wkt);
criterion_main!(benches);
