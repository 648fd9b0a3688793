//! Back office records the editor reads and writes.
//!
//! Enums travel as small integers on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Verification state of a landmark or bus stop
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum LandmarkStatus {
    #[default]
    Validating,
    Verified,
}

impl From<LandmarkStatus> for u8 {
    fn from(status: LandmarkStatus) -> Self {
        match status {
            LandmarkStatus::Validating => 1,
            LandmarkStatus::Verified => 2,
        }
    }
}

impl TryFrom<u8> for LandmarkStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(LandmarkStatus::Validating),
            2 => Ok(LandmarkStatus::Verified),
            other => Err(format!("unknown status code {other}")),
        }
    }
}

impl fmt::Display for LandmarkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LandmarkStatus::Validating => "validating",
            LandmarkStatus::Verified => "verified",
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Importance {
    Low,
    #[default]
    Medium,
    High,
}

impl From<Importance> for u8 {
    fn from(importance: Importance) -> Self {
        match importance {
            Importance::Low => 1,
            Importance::Medium => 2,
            Importance::High => 3,
        }
    }
}

impl TryFrom<u8> for Importance {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Importance::Low),
            2 => Ok(Importance::Medium),
            3 => Ok(Importance::High),
            other => Err(format!("unknown importance code {other}")),
        }
    }
}

impl FromStr for Importance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Importance::Low),
            "medium" => Ok(Importance::Medium),
            "high" => Ok(Importance::High),
            other => Err(format!("expected low, medium or high, got '{other}'")),
        }
    }
}

/// A named area of interest bus stops belong to
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Landmark {
    pub id: i64,
    pub name: String,
    /// WKT polygon
    pub boundary: String,
    pub status: LandmarkStatus,
    pub importance: Importance,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BusStop {
    pub id: i64,
    pub name: String,
    pub landmark_id: i64,
    /// WKT point
    pub location: String,
    pub status: LandmarkStatus,
}

/// Form body for creating a landmark
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewLandmark {
    pub name: String,
    pub boundary: String,
    pub importance: Importance,
    pub status: LandmarkStatus,
}

/// Form body for creating a bus stop
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewBusStop {
    pub name: String,
    pub landmark_id: i64,
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_landmark() {
        let mut body = br#"{"id":5,"name":"East Fort","boundary":"POLYGON((1 2, 3 4, 1 2))","status":2,"importance":3,"created_on":"2024-01-01"}"#.to_vec();
        let landmark: Landmark = simd_json::serde::from_slice(&mut body).unwrap();
        assert_eq!(landmark.id, 5);
        assert_eq!(landmark.status, LandmarkStatus::Verified);
        assert_eq!(landmark.importance, Importance::High);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let mut body = br#"{"id":5,"name":"x","boundary":"","status":9,"importance":1}"#.to_vec();
        assert!(simd_json::serde::from_slice::<Landmark>(&mut body).is_err());
    }

    #[test]
    fn test_importance_from_str() {
        assert_eq!("HIGH".parse::<Importance>(), Ok(Importance::High));
        assert!("urgent".parse::<Importance>().is_err());
    }
}
