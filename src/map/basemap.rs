use std::fmt;
use std::str::FromStr;

/// Background the overlays are drawn on. Switching never touches the
/// viewport or the overlays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Basemap {
    /// Plain vector map with labels
    #[default]
    Streets,
    /// Imagery without labels
    Satellite,
    /// Imagery with labels on top
    Hybrid,
}

impl Basemap {
    pub fn next(self) -> Self {
        match self {
            Basemap::Streets => Basemap::Satellite,
            Basemap::Satellite => Basemap::Hybrid,
            Basemap::Hybrid => Basemap::Streets,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Basemap::Streets => "map",
            Basemap::Satellite => "satellite",
            Basemap::Hybrid => "satellite+labels",
        }
    }

    pub fn shows_labels(self) -> bool {
        !matches!(self, Basemap::Satellite)
    }

    pub fn is_imagery(self) -> bool {
        !matches!(self, Basemap::Streets)
    }
}

impl fmt::Display for Basemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Basemap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "map" | "streets" => Ok(Basemap::Streets),
            "satellite" => Ok(Basemap::Satellite),
            "hybrid" | "satellite+labels" => Ok(Basemap::Hybrid),
            other => Err(format!("unknown basemap '{other}'")),
        }
    }
}
