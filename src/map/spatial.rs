use std::collections::HashMap;

use crate::geometry::Extent;

/// Spatial index for basemap lines using conservative approximation.
/// Each line's extent is indexed into every cell it overlaps, so a query
/// never misses a line but may return some that turn out to be off screen
/// (dropped later by the per-segment visibility check).
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from feature extents; `None` entries (empty lines) are skipped
    pub fn build(extents: impl Iterator<Item = Option<Extent>>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, extent) in extents.enumerate() {
            let Some(extent) = extent else { continue };
            let min_cell = grid.to_cell(extent.min_lon, extent.min_lat);
            let max_cell = grid.to_cell(extent.max_lon, extent.max_lat);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Sorted, de-duplicated indices of features whose cells touch `extent`
    pub fn query(&self, extent: &Extent) -> Vec<usize> {
        let min_cell = self.to_cell(extent.min_lon, extent.min_lat);
        let max_cell = self.to_cell(extent.max_lon, extent.max_lat);
        let mut results = Vec::new();
        for y in min_cell.1..=max_cell.1 {
            for x in min_cell.0..=max_cell.0 {
                if let Some(indices) = self.cells.get(&(x, y)) {
                    results.extend_from_slice(indices);
                }
            }
        }
        results.sort_unstable();
        results.dedup();
        results
    }
}
