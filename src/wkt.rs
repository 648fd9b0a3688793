//! Well-known-text codec for the two shapes the backend speaks:
//! `POINT(lon lat)` and `POLYGON((lon lat, ...))`.
//!
//! Coordinates are always (longitude, latitude). Parsers return `None`
//! on malformed input so callers can skip drawing instead of failing.

use geo::{Coord, LineString};

/// Parse `POINT(lon lat)` into `(lon, lat)`
pub fn parse_point(text: &str) -> Option<(f64, f64)> {
    let body = strip_tag(text, "POINT")?;
    let inner = body.strip_prefix('(')?.strip_suffix(')')?;
    parse_pair(inner)
}

/// Parse `POLYGON((lon lat, ...))` into its exterior ring, as written.
/// Polygons with holes are rejected.
pub fn parse_polygon(text: &str) -> Option<LineString<f64>> {
    let body = strip_tag(text, "POLYGON")?;
    let inner = body.strip_prefix('(')?.strip_suffix(')')?.trim();
    let inner = inner.strip_prefix('(')?.strip_suffix(')')?;
    if inner.contains(['(', ')']) {
        return None;
    }

    let coords = inner
        .split(',')
        .map(|pair| parse_pair(pair).map(Coord::from))
        .collect::<Option<Vec<_>>>()?;

    if coords.is_empty() {
        None
    } else {
        Some(LineString::new(coords))
    }
}

/// Format a point as `POINT(lon lat)`
pub fn format_point(lon: f64, lat: f64) -> String {
    format!("POINT({lon} {lat})")
}

/// Format a ring as `POLYGON((lon1 lat1, lon2 lat2, ...))`.
/// The ring is written as given; closing it is the caller's job.
pub fn format_polygon(ring: &LineString<f64>) -> String {
    let pairs: Vec<String> = ring
        .coords()
        .map(|c| format!("{} {}", c.x, c.y))
        .collect();
    format!("POLYGON(({}))", pairs.join(", "))
}

/// Strip a case-insensitive geometry tag, returning the parenthesised body
fn strip_tag<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    let text = text.trim();
    let head = text.get(..tag.len())?;
    if !head.eq_ignore_ascii_case(tag) {
        return None;
    }
    Some(text[tag.len()..].trim())
}

/// Parse "lon lat" separated by whitespace, rejecting extra fields
fn parse_pair(pair: &str) -> Option<(f64, f64)> {
    let mut fields = pair.split_whitespace();
    let lon = fields.next()?.parse::<f64>().ok()?;
    let lat = fields.next()?.parse::<f64>().ok()?;
    if fields.next().is_some() || !lon.is_finite() || !lat.is_finite() {
        return None;
    }
    Some((lon, lat))
}
