use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::ApiError;

/// First match of a free-text location search
#[derive(Clone, Debug, PartialEq)]
pub struct Located {
    pub lon: f64,
    pub lat: f64,
    pub name: String,
}

/// Nominatim returns coordinates as decimal strings
#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

fn parse_coordinate(text: &str) -> Result<f64, ApiError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ApiError::BadCoordinate(text.to_string()))
}

/// Decode a geocoder response; only the first candidate matters
pub fn parse_places(mut body: Vec<u8>) -> Result<Option<Located>, ApiError> {
    let places: Vec<Place> = simd_json::serde::from_slice(&mut body)?;
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };
    Ok(Some(Located {
        lon: parse_coordinate(&place.lon)?,
        lat: parse_coordinate(&place.lat)?,
        name: place.display_name,
    }))
}

/// Forward geocoding against a Nominatim-compatible search endpoint
pub struct Geocoder {
    http: Client,
    url: String,
}

impl Geocoder {
    pub fn new(url: &str) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    pub fn search(&self, query: &str) -> Result<Option<Located>, ApiError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("format", "json"), ("limit", "1"), ("q", query)])
            .send()?;
        let status = response.status();
        let body = response.bytes()?.to_vec();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let found = parse_places(body)?;
        match &found {
            Some(place) => log::info!("'{query}' -> {} ({}, {})", place.name, place.lon, place.lat),
            None => log::info!("'{query}' -> no match"),
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_result_wins() {
        let body = br#"[
            {"place_id":1,"lat":"8.4875","lon":"76.9525","display_name":"Thampanoor, Thiruvananthapuram"},
            {"place_id":2,"lat":"9.9312","lon":"76.2673","display_name":"Kochi"}
        ]"#
        .to_vec();
        let place = parse_places(body).unwrap().unwrap();
        assert_eq!(place.lon, 76.9525);
        assert_eq!(place.lat, 8.4875);
        assert!(place.name.starts_with("Thampanoor"));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(parse_places(b"[]".to_vec()).unwrap(), None);
    }

    #[test]
    fn test_bad_coordinate() {
        let body = br#"[{"lat":"north","lon":"76.95"}]"#.to_vec();
        assert!(matches!(parse_places(body), Err(ApiError::BadCoordinate(s)) if s == "north"));
    }
}
