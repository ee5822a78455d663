use log::{debug, trace, warn};

use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::MapperConfig;
use crate::error::{MapError, Result};
use crate::geometry::rasterize::{segment_cells, triangle_cells};
use crate::highlevel_planners::astar::find_path;
use crate::highlevel_planners::path::Path;
use crate::map_representation::map::Map;
use crate::map_representation::obstacle_mask::{gaussian_kernel, ObstacleMask, BLUR_SIGMA};
use crate::{Cell, Point, Ray};

/// Source of [`OccupancyGrid::id`]
static NEXT_GRID_ID: AtomicU64 = AtomicU64::new(0);

/// Categorical state of a single grid cell. Updates are last-write-wins, there is no fusion
/// of repeated observations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    /// Observed to be free
    Empty,
    /// Never observed
    #[default]
    Unknown,
    /// Observed to be occupied
    Filled,
}

/// A square occupancy grid built incrementally from consecutive rays of a sweeping range
/// sensor.
///
/// Each new ray is paired with the one before it. The fan between the two beams is cleared and,
/// when both beams are short and their endpoints close together, the endpoints are joined by a
/// wall.
pub struct OccupancyGrid {
    /// Unique per constructed grid
    id: u64,
    size: usize,
    dist_cutoff: f64,
    connect_cutoff: f64,
    /// Row major, `y * size + x`
    data: Vec<CellState>,
    /// Every ray added so far, oldest first
    rays: Vec<Ray>,
    /// Separable blur kernel used when deriving the obstacle mask
    blur_kernel: Vec<f32>,
}

impl OccupancyGrid {
    /// Creates an all-`Unknown` grid of `size` x `size` cells.
    /// # Arguments
    /// * `size` - Number of cells along each side
    /// * `dist_cutoff` - Rays at least this long are never joined by a wall
    /// * `connect_cutoff` - Endpoints closer than this are treated as the same surface
    pub fn new(size: usize, dist_cutoff: f64, connect_cutoff: f64) -> Result<Self> {
        Self::from_config(&MapperConfig::new(size, dist_cutoff, connect_cutoff))
    }

    pub fn from_config(config: &MapperConfig) -> Result<Self> {
        config.validate().map_err(MapError::from)?;
        let blur_kernel = gaussian_kernel(BLUR_SIGMA)?;

        debug!(
            "Creating {}x{} occupancy grid (dist_cutoff={}, connect_cutoff={})",
            config.size, config.size, config.dist_cutoff, config.connect_cutoff
        );

        Ok(Self {
            id: NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed),
            size: config.size,
            dist_cutoff: config.dist_cutoff,
            connect_cutoff: config.connect_cutoff,
            data: vec![CellState::Unknown; config.size * config.size],
            rays: vec![],
            blur_kernel,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dist_cutoff(&self) -> f64 {
        self.dist_cutoff
    }

    pub fn connect_cutoff(&self) -> f64 {
        self.connect_cutoff
    }

    /// Row major cell states, `y * size + x`
    pub fn states(&self) -> &[CellState] {
        &self.data
    }

    /// State of a cell, `None` if it is off the grid
    pub fn state(&self, cell: Cell) -> Option<CellState> {
        self.index(cell).map(|idx| self.data[idx])
    }

    /// History of rays, oldest first
    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    /// Identifies this grid among every grid created in the process. Together with
    /// [`revision`](Self::revision) it names one exact state of one map.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of rays integrated so far. Changes every time the grid may have changed.
    pub fn revision(&self) -> u64 {
        self.rays.len() as u64
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        if x >= self.size || y >= self.size {
            return None;
        }
        Some(y * self.size + x)
    }

    fn clamp(&self, cell: Cell) -> Cell {
        let limit = self.size as i64 - 1;
        Cell::new(cell.x.clamp(0, limit), cell.y.clamp(0, limit))
    }

    fn set(&mut self, cell: Cell, state: CellState) {
        if let Some(idx) = self.index(cell) {
            self.data[idx] = state;
        }
    }

    /// Incorporate one range reading.
    ///
    /// The sensor's own cell is always cleared. From the second ray on, the two triangles
    /// spanned by the previous and current origins and each beam's endpoint are cleared. If the
    /// two endpoints are closer than `connect_cutoff` the wedge between them is cleared too, and
    /// if both rays are also shorter than `dist_cutoff` a wall is drawn between the endpoints.
    pub fn add_ray(&mut self, ray: Ray) {
        let footprint = self.clamp(ray.origin);
        if footprint != ray.origin {
            warn!(
                "Ray origin ({}, {}) is outside the {}x{} grid, clamping to ({}, {})",
                ray.origin.x, ray.origin.y, self.size, self.size, footprint.x, footprint.y
            );
        }
        self.set(footprint, CellState::Empty);

        if let Some(prev) = self.rays.last().copied() {
            let prev_origin = prev.origin.center();
            let this_origin = ray.origin.center();
            let prev_end = prev.endpoint();
            let this_end = ray.endpoint();

            self.shade_triangle(prev_origin, this_origin, prev_end);
            self.shade_triangle(prev_origin, this_origin, this_end);

            let gap = (prev_end - this_end).norm();
            if gap < self.connect_cutoff {
                self.shade_triangle(prev_origin, this_end, prev_end);
                if (ray.dist.max(prev.dist) as f64) < self.dist_cutoff {
                    self.draw_line(this_end, prev_end);
                }
            }
            trace!(
                "Ray #{} angle={:.3} dist={} endpoint gap={:.2}",
                self.rays.len(),
                ray.angle,
                ray.dist,
                gap
            );
        }

        self.rays.push(ray);
    }

    /// Clear every cell inside the triangle
    fn shade_triangle(&mut self, p1: Point, p2: Point, p3: Point) {
        for cell in triangle_cells(p1, p2, p3, self.size) {
            self.set(cell, CellState::Empty);
        }
    }

    /// Mark every cell on the segment as occupied
    fn draw_line(&mut self, p1: Point, p2: Point) {
        for cell in segment_cells(p1, p2, self.size) {
            self.set(cell, CellState::Filled);
        }
    }

    /// Binary planning mask: `Filled` cells dilated by a Gaussian blur and thresholded.
    pub fn obstacle_mask(&self) -> ObstacleMask {
        ObstacleMask::from_states(&self.data, self.size, &self.blur_kernel)
    }

    /// Shortest path on the current obstacle mask.
    pub fn route(&self, start: Cell, goal: Cell) -> Option<Path> {
        debug!(
            "Routing ({}, {}) -> ({}, {}) after {} rays",
            start.x,
            start.y,
            goal.x,
            goal.y,
            self.rays.len()
        );
        find_path(&self.obstacle_mask(), start, goal)
    }
}

impl Map for OccupancyGrid {
    fn get_occupancy(&self, cell: Cell) -> Option<bool> {
        match self.state(cell)? {
            CellState::Empty => Some(false),
            CellState::Filled => Some(true),
            CellState::Unknown => None,
        }
    }
}
