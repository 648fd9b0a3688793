//! Error types surfaced to the operator as status-line messages.

use thiserror::Error;

/// Why a candidate boundary was refused by the admission check
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    /// Fewer than three distinct corners
    #[error("boundary needs at least three distinct corners")]
    Degenerate,
    #[error("boundary too small: {area_m2:.1} m² (minimum {min_m2} m²)")]
    TooSmall { area_m2: f64, min_m2: f64 },
    #[error("boundary too large: {:.2} km² (maximum {:.1} km²)", km2(.area_m2), km2(.max_m2))]
    TooLarge { area_m2: f64, max_m2: f64 },
    #[error("boundary overlaps landmark '{name}' (#{id})")]
    Overlaps { id: i64, name: String },
}

fn km2(m2: &f64) -> f64 {
    m2 / 1e6
}

/// Why a bus stop location was refused
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("bus stop must be inside landmark '{0}'")]
    OutsideBoundary(String),
    #[error("landmark '{0}' has no readable boundary")]
    NoBoundary(String),
}

/// Failure talking to the backend or the geocoder
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] simd_json::Error),
    #[error("landmark #{0} not found")]
    NotFound(i64),
    #[error("geocoder returned an unreadable coordinate '{0}'")]
    BadCoordinate(String),
}
