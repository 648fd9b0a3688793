use crate::map::MapRenderer;
use anyhow::Result;
use geo::LineString;
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

const COASTLINE_FILE: &str = "coastline.geojson";
const ROADS_FILE: &str = "roads.geojson";
const PLACES_FILE: &str = "places.geojson";

/// Load whatever basemap GeoJSON is present in `data_dir`.
/// Missing files are skipped; unreadable ones are logged and skipped.
/// Returns the number of features loaded.
pub fn load_basemap(renderer: &mut MapRenderer, data_dir: &Path) -> Result<usize> {
    let mut loaded = 0;

    for (filename, kind) in [
        (COASTLINE_FILE, LineKind::Coastline),
        (ROADS_FILE, LineKind::Road),
    ] {
        let path = data_dir.join(filename);
        if !path.exists() {
            continue;
        }
        match read_geojson(&path) {
            Ok(geojson) => {
                let count = add_lines(renderer, &geojson, kind);
                log::info!("loaded {count} lines from {}", path.display());
                loaded += count;
            }
            Err(e) => log::warn!("failed to load {}: {e}", path.display()),
        }
    }

    let places_path = data_dir.join(PLACES_FILE);
    if places_path.exists() {
        match read_geojson(&places_path) {
            Ok(geojson) => {
                let count = add_places(renderer, &geojson);
                log::info!("loaded {count} places from {}", places_path.display());
                loaded += count;
            }
            Err(e) => log::warn!("failed to load {}: {e}", places_path.display()),
        }
    }

    if renderer.has_data() {
        renderer.build_index();
    } else {
        log::info!("no basemap data in {}, drawing graticule", data_dir.display());
    }

    Ok(loaded)
}

#[derive(Clone, Copy)]
enum LineKind {
    Coastline,
    Road,
}

fn read_geojson(path: &Path) -> Result<GeoJson> {
    let content = fs::read_to_string(path)?;
    Ok(content.parse()?)
}

fn add_lines(renderer: &mut MapRenderer, geojson: &GeoJson, kind: LineKind) -> usize {
    let mut count = 0;
    process_geojson_lines(geojson, |line| {
        count += 1;
        match kind {
            LineKind::Coastline => renderer.add_coastline(line),
            LineKind::Road => renderer.add_road(line),
        }
    });
    count
}

/// Named Point features become place labels
fn add_places(renderer: &mut MapRenderer, geojson: &GeoJson) -> usize {
    let GeoJson::FeatureCollection(fc) = geojson else {
        return 0;
    };

    let mut count = 0;
    for feature in &fc.features {
        let Some(name) = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
        else {
            continue;
        };

        if let Some(Value::Point(coords)) = feature.geometry.as_ref().map(|g| &g.value) {
            if coords.len() >= 2 {
                renderer.add_place(coords[0], coords[1], name);
                count += 1;
            }
        }
    }
    count
}

/// Walk a GeoJSON document and hand every line (or polygon exterior) to `add_line`
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(LineString<f64>),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            process_geometry_lines(geometry, &mut add_line);
        }
    }
}

fn to_line(coords: &[Vec<f64>]) -> LineString<f64> {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(LineString<f64>),
{
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
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROADS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {},
             "geometry": {"type": "LineString", "coordinates": [[76.90, 8.50], [76.91, 8.51]]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "MultiLineString", "coordinates": [
                 [[76.92, 8.52], [76.93, 8.53]],
                 [[76.94, 8.54], [76.95, 8.55]]
             ]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Point", "coordinates": [76.9, 8.5]}}
        ]
    }"#;

    const PLACES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "Thampanoor"},
             "geometry": {"type": "Point", "coordinates": [76.9525, 8.4875]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Point", "coordinates": [76.95, 8.48]}}
        ]
    }"#;

    #[test]
    fn test_lines_from_feature_collection() {
        let geojson: GeoJson = ROADS.parse().unwrap();
        let mut renderer = MapRenderer::new();
        assert_eq!(add_lines(&mut renderer, &geojson, LineKind::Road), 3);
        assert_eq!(renderer.roads.len(), 3);
        assert!(renderer.coastlines.is_empty());
        assert_eq!(renderer.roads[0], LineString::from(vec![(76.90, 8.50), (76.91, 8.51)]));
    }

    #[test]
    fn test_places_need_a_name() {
        let geojson: GeoJson = PLACES.parse().unwrap();
        let mut renderer = MapRenderer::new();
        assert_eq!(add_places(&mut renderer, &geojson), 1);
        assert_eq!(renderer.places[0].name, "Thampanoor");
    }

    #[test]
    fn test_missing_directory_loads_nothing() {
        let mut renderer = MapRenderer::new();
        let missing = Path::new("/nonexistent/landmark-editor");
        let loaded = load_basemap(&mut renderer, missing).unwrap();
        assert_eq!(loaded, 0);
        assert!(!renderer.has_data());
    }
}
