//! Command line and environment configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::map::Basemap;
use crate::model::Importance;

/// Terminal editor for landmark boundaries and bus stop placement
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Back office REST API base URL
    #[arg(long, env = "LANDMARK_API_URL", default_value = "http://localhost:8080/api")]
    pub api_url: String,

    /// Bearer token sent with every backend request
    #[arg(long, env = "LANDMARK_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Nominatim-compatible search endpoint used by `/`
    #[arg(
        long,
        env = "LANDMARK_GEOCODER_URL",
        default_value = "https://nominatim.openstreetmap.org/search"
    )]
    pub geocoder_url: String,

    /// Directory holding coastline.geojson, roads.geojson and places.geojson
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Where log output goes; the terminal belongs to the map
    #[arg(long, env = "LANDMARK_LOG_FILE", default_value = "landmark-editor.log")]
    pub log_file: PathBuf,

    /// Initial map centre as "lon,lat"
    #[arg(long, value_parser = parse_center, default_value = "76.9366,8.5241")]
    pub center: (f64, f64),

    /// Initial zoom level
    #[arg(long, default_value_t = 13.0)]
    pub zoom: f64,

    /// Initial basemap: map, satellite or hybrid
    #[arg(long, default_value = "map")]
    pub basemap: Basemap,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Redraw the boundary of an existing landmark
    Edit {
        /// Landmark id
        id: i64,
    },
    /// Draw and create a new landmark
    Create {
        #[arg(long)]
        name: String,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        importance: Importance,
    },
    /// Place a new bus stop inside a landmark
    PlaceStop {
        landmark_id: i64,
        #[arg(long)]
        name: String,
    },
}

/// Parse "lon,lat"
fn parse_center(s: &str) -> Result<(f64, f64), String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected 'lon,lat', got '{s}'"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {e}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {e}"))?;
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(format!("'{s}' is not a valid lon,lat"));
    }
    Ok((lon, lat))
}
