//! Binary planning mask derived from the categorical grid.
//!
//! `Filled` cells become 1.0, everything else 0.0. The field is blurred with a Gaussian and
//! thresholded back to 0/1, which dilates every obstacle by a few cells so that the planner
//! keeps clear of walls and does not squeeze through one-cell gaps.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;
use statrs::distribution::{Continuous, Normal};

use crate::error::MapError;
use crate::map_representation::map::Map;
use crate::map_representation::occupancy_grid::CellState;
use crate::Cell;

/// Standard deviation of the dilation blur, in cells
pub const BLUR_SIGMA: f64 = 1.0;

/// Kernel is truncated at this many standard deviations
pub const BLUR_TRUNCATE: f64 = 4.0;

/// Blurred values strictly above this are blocked
pub const MASK_THRESHOLD: f32 = 0.001;

const BLOCKED: u8 = 1;
const FREE: u8 = 0;

/// Normalised 1-D Gaussian kernel covering `BLUR_TRUNCATE` standard deviations either side.
pub fn gaussian_kernel(sigma: f64) -> Result<Vec<f32>, MapError> {
    let normal = Normal::new(0f64, sigma).map_err(|e| MapError::Kernel(e.to_string()))?;
    let radius = (BLUR_TRUNCATE * sigma + 0.5) as i64;
    let weights: Vec<f64> = (-radius..=radius).map(|i| normal.pdf(i as f64)).collect();
    let total: f64 = weights.iter().sum();
    Ok(weights.iter().map(|w| (w / total) as f32).collect())
}

/// A 0/1 obstacle map. Pixel `(x, y)` of the backing image is cell `(x, y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ObstacleMask {
    image: GrayImage,
}

impl ObstacleMask {
    /// Blur and threshold the `Filled` cells of a row major `size` x `size` grid.
    pub(crate) fn from_states(states: &[CellState], size: usize, kernel: &[f32]) -> Self {
        let side = size as u32;
        let field: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_fn(side, side, |x, y| {
            match states[y as usize * size + x as usize] {
                CellState::Filled => Luma([1f32]),
                _ => Luma([0f32]),
            }
        });
        let blurred = separable_filter_equal(&field, kernel);
        let image = GrayImage::from_fn(side, side, |x, y| {
            if blurred.get_pixel(x, y).0[0] > MASK_THRESHOLD {
                Luma([BLOCKED])
            } else {
                Luma([FREE])
            }
        });
        Self { image }
    }

    /// Build a mask from row major rows, `rows[y][x]`. Any non-zero value is blocked and
    /// missing entries of short rows are free.
    pub fn from_rows(rows: &[Vec<u8>]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let image = GrayImage::from_fn(width, height, |x, y| {
            match rows[y as usize].get(x as usize) {
                Some(v) if *v != 0 => Luma([BLOCKED]),
                _ => Luma([FREE]),
            }
        });
        Self { image }
    }

    /// A `width` x `height` mask with only the given cells blocked. Cells off the mask are
    /// ignored.
    pub fn from_blocked<I: IntoIterator<Item = Cell>>(width: u32, height: u32, cells: I) -> Self {
        let mut mask = Self {
            image: GrayImage::new(width, height),
        };
        for cell in cells {
            if mask.in_bounds(cell) {
                mask.image
                    .put_pixel(cell.x as u32, cell.y as u32, Luma([BLOCKED]));
            }
        }
        mask
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && cell.x < self.image.width() as i64
            && cell.y < self.image.height() as i64
    }

    /// Off-mask cells count as blocked
    pub fn is_blocked(&self, cell: Cell) -> bool {
        if !self.in_bounds(cell) {
            return true;
        }
        self.image.get_pixel(cell.x as u32, cell.y as u32).0[0] != FREE
    }

    pub fn blocked_count(&self) -> usize {
        self.image.pixels().filter(|p| p.0[0] != FREE).count()
    }

    /// The backing 0/1 image
    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}

impl Map for ObstacleMask {
    fn get_occupancy(&self, cell: Cell) -> Option<bool> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some(self.is_blocked(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with_filled(size: usize, filled: &[Cell]) -> ObstacleMask {
        let mut states = vec![CellState::Unknown; size * size];
        for c in filled {
            states[c.y as usize * size + c.x as usize] = CellState::Filled;
        }
        let kernel = gaussian_kernel(BLUR_SIGMA).unwrap();
        ObstacleMask::from_states(&states, size, &kernel)
    }

    #[test]
    fn test_kernel_is_normalised() {
        let kernel = gaussian_kernel(1f64).unwrap();
        assert_eq!(kernel.len(), 9);
        let total: f32 = kernel.iter().sum();
        assert!((total - 1f32).abs() < 1e-5f32);
        assert!(kernel[4] > kernel[3]);
        assert!((kernel[3] - kernel[5]).abs() < 1e-9f32);
    }

    #[test]
    fn test_bad_sigma_is_an_error() {
        assert!(gaussian_kernel(-1f64).is_err());
    }

    #[test]
    fn test_no_obstacles_no_mask() {
        let mask = mask_with_filled(12, &[]);
        assert_eq!(mask.blocked_count(), 0);
    }

    #[test]
    fn test_single_obstacle_dilation_footprint() {
        let centre = Cell::new(8, 8);
        let mask = mask_with_filled(17, &[centre]);
        assert!(mask.is_blocked(centre));
        assert!(mask.is_blocked(Cell::new(11, 8)));
        assert!(mask.is_blocked(Cell::new(8, 5)));
        assert!(mask.is_blocked(Cell::new(10, 10)));
        assert!(mask.is_blocked(Cell::new(11, 9)));
        assert!(!mask.is_blocked(Cell::new(12, 8)));
        assert!(!mask.is_blocked(Cell::new(11, 10)));
        assert!(!mask.is_blocked(Cell::new(8, 13)));
    }

    #[test]
    fn test_dilation_never_removes_obstacles() {
        let filled = vec![Cell::new(0, 0), Cell::new(5, 3), Cell::new(9, 9), Cell::new(2, 7)];
        let mask = mask_with_filled(10, &filled);
        for c in &filled {
            assert!(mask.is_blocked(*c));
        }
    }

    #[test]
    fn test_from_rows() {
        let mask = ObstacleMask::from_rows(&[vec![0, 0, 0], vec![1, 0, 2]]);
        assert_eq!(mask.width(), 3);
        assert_eq!(mask.height(), 2);
        assert!(mask.is_blocked(Cell::new(0, 1)));
        assert!(mask.is_blocked(Cell::new(2, 1)));
        assert!(!mask.is_blocked(Cell::new(0, 0)));
        assert!(mask.is_blocked(Cell::new(3, 0)));
        assert_eq!(mask.get_occupancy(Cell::new(3, 0)), None);
        assert_eq!(mask.get_occupancy(Cell::new(1, 0)), Some(false));
    }
}
