//! Dense 2-D numeric grids and the sub-regions the encoder summarises.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A row-major grid of `f64` cells centred on the creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl Grid {
    /// Create a grid from row-major cells.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the cell count does not match
    /// `rows * cols` or either dimension is zero.
    pub fn new(rows: usize, cols: usize, cells: Vec<f64>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidConfiguration {
                message: format!("grid dimensions must be non-zero, got {rows}x{cols}"),
            });
        }
        if cells.len() != rows * cols {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "grid {rows}x{cols} needs {} cells, got {}",
                    rows * cols,
                    cells.len()
                ),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    /// Create a grid from nested rows, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|row| row.len() != width) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "row {bad} has {} cells, expected {width}",
                    rows[bad].len()
                ),
            });
        }
        Self::new(height, width, rows.into_iter().flatten().collect())
    }

    /// A grid with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            cells: vec![value; rows * cols],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = value;
        }
    }

    /// Value of the centre cell, i.e. the creature's own position.
    ///
    /// `None` for a grid with a zero dimension.
    pub fn center(&self) -> Option<f64> {
        self.get(self.rows / 2, self.cols / 2)
    }

    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Mean over the cells selected by `region`.
    ///
    /// The region must fit the grid; the encoder checks this before sampling.
    pub fn mean(&self, region: &Region) -> f64 {
        let mut total = 0.0;
        let mut count = 0usize;
        for (row, col) in region.cells() {
            total += self.cells[row * self.cols + col];
            count += 1;
        }
        if count == 0 { 0.0 } else { total / count as f64 }
    }

    /// Whether any cell selected by `region` equals `sentinel` exactly.
    pub fn contains(&self, region: &Region, sentinel: f64) -> bool {
        region
            .cells()
            .any(|(row, col)| self.cells[row * self.cols + col] == sentinel)
    }
}

/// Cartesian product of row and column indices, like an open mesh index.
///
/// Regions may be contiguous spans or arbitrary picks, and may overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    rows: Vec<usize>,
    cols: Vec<usize>,
}

impl Region {
    /// Every cell in the inclusive row and column spans.
    pub fn span(rows: RangeInclusive<usize>, cols: RangeInclusive<usize>) -> Self {
        Self {
            rows: rows.collect(),
            cols: cols.collect(),
        }
    }

    /// Only the listed rows and columns.
    pub fn picks(rows: &[usize], cols: &[usize]) -> Self {
        Self {
            rows: rows.to_vec(),
            cols: cols.to_vec(),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .flat_map(move |&row| self.cols.iter().map(move |&col| (row, col)))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    /// Whether every selected cell lies inside a grid of the given shape.
    pub fn fits(&self, (rows, cols): (usize, usize)) -> bool {
        self.rows.iter().all(|&r| r < rows) && self.cols.iter().all(|&c| c < cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Grid {
        Grid::from_rows(vec![
            vec![0.0, 1.0, 2.0],
            vec![3.0, 4.0, 5.0],
            vec![6.0, 7.0, 8.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_grid_rejects_wrong_cell_count() {
        assert!(Grid::new(2, 2, vec![1.0; 3]).is_err());
        assert!(Grid::new(0, 2, vec![]).is_err());
    }

    #[test]
    fn test_grid_rejects_ragged_rows() {
        let result = Grid::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_center_and_get() {
        let grid = ramp();
        assert_eq!(grid.center(), Some(4.0));
        assert_eq!(grid.get(2, 1), Some(7.0));
        assert_eq!(grid.get(3, 0), None);
    }

    #[test]
    fn test_empty_grid_has_no_center() {
        assert_eq!(Grid::filled(0, 3, 1.0).center(), None);
        assert_eq!(Grid::filled(3, 0, 1.0).center(), None);
        assert_eq!(Grid::filled(4, 4, 1.0).center(), Some(1.0));
    }

    #[test]
    fn test_mean_over_overlapping_spans() {
        let grid = ramp();
        assert_eq!(grid.mean(&Region::span(0..=1, 0..=1)), 2.0);
        assert_eq!(grid.mean(&Region::span(1..=2, 1..=2)), 6.0);
    }

    #[test]
    fn test_picks_select_only_listed_indices() {
        let grid = ramp();
        // corners only: 0, 2, 6, 8
        assert_eq!(grid.mean(&Region::picks(&[0, 2], &[0, 2])), 4.0);
        assert_eq!(Region::picks(&[0, 2], &[0, 2]).cells().count(), 4);
    }

    #[test]
    fn test_contains_sentinel() {
        let mut grid = Grid::filled(5, 5, 0.0);
        grid.set(4, 4, 255.0);
        assert!(grid.contains(&Region::span(2..=4, 2..=4), 255.0));
        assert!(!grid.contains(&Region::span(0..=2, 0..=2), 255.0));
    }

    #[test]
    fn test_region_fits() {
        assert!(Region::span(0..=4, 0..=4).fits((5, 5)));
        assert!(!Region::span(0..=5, 0..=4).fits((5, 5)));
    }
}
