pub extern crate nalgebra as na;
use na::Vector2;

pub mod config;
pub mod error;
pub mod geometry;
pub mod highlevel_planners;
pub mod map_representation;
pub mod route;
pub mod session;

pub use crate::config::{MapperConfig, NavConfig, PlannerConfig};
pub use crate::error::{ConfigError, MapError, PlanError, SessionError};
pub use crate::highlevel_planners::astar::{find_path, GridPathfinder};
pub use crate::highlevel_planners::highlevel_planners::HighLevelPlanner;
pub use crate::highlevel_planners::path::Path;
pub use crate::map_representation::map::Map;
pub use crate::map_representation::obstacle_mask::ObstacleMask;
pub use crate::map_representation::occupancy_grid::{CellState, OccupancyGrid};
pub use crate::route::RoutePlanner;
pub use crate::session::{MappingSession, RaySender};

/// Point
pub type Point = Vector2<f64>;

/// 2-vector
pub type Vec2f = Vector2<f64>;

/// Integer grid coordinate. `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
}

impl Cell {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Position the cell is sampled at by the rasterizers.
    pub fn center(&self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    /// Euclidean distance between two cells
    pub fn distance(&self, other: &Cell) -> f64 {
        (self.center() - other.center()).norm()
    }

    /// 4-connected neighbours in expansion order.
    pub fn neighbors_4(&self) -> [Cell; 4] {
        [
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x, self.y - 1),
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x - 1, self.y),
        ]
    }
}

impl From<(i64, i64)> for Cell {
    fn from((x, y): (i64, i64)) -> Self {
        Cell::new(x, y)
    }
}

/// A single range reading from the sweeping sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Sensor position in grid cells
    pub origin: Cell,
    /// Beam bearing in radians, map frame
    pub angle: f64,
    /// Measured range in grid cells (or the sensor's max-range sentinel)
    pub dist: u32,
}

impl Ray {
    pub fn new(origin: Cell, angle: f64, dist: u32) -> Self {
        Self {
            origin,
            angle,
            dist,
        }
    }

    /// Unrounded position where the beam hit something.
    pub fn endpoint(&self) -> Point {
        self.origin.center() + Vec2f::new(self.angle.cos(), self.angle.sin()) * self.dist as f64
    }
}
