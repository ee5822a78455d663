use log::debug;

use std::collections::HashMap;

use crate::error::PlanError;
use crate::highlevel_planners::highlevel_planners::HighLevelPlanner;
use crate::highlevel_planners::path::Path;
use crate::map_representation::occupancy_grid::OccupancyGrid;
use crate::Cell;

////////////////////////////////////////////////////////////////////////////////
/// A route as planned against one revision of one grid
#[derive(Clone, Debug)]
struct CachedRoute {
    grid_id: u64,
    revision: u64,
    path: Option<Path>,
}

////////////////////////////////////////////////////////////////////////////////
/// Plans routes on an [`OccupancyGrid`] and remembers them until the grid changes.
///
/// Repeated requests for the same start and goal on the same grid while no new ray has been
/// added are served from the cache, including "no path" answers. Planning on a different grid
/// drops every route cached for the previous one. Aborted searches are never cached.
pub struct RoutePlanner<P: HighLevelPlanner> {
    planner: P,
    /// Routes by (start, goal)
    route_plans_by_location: HashMap<(Cell, Cell), CachedRoute>,
    /// Grid the cached routes were planned on
    grid_id: Option<u64>,
}

impl<P: HighLevelPlanner> RoutePlanner<P> {
    pub fn new(planner: P) -> Self {
        Self {
            planner,
            route_plans_by_location: HashMap::default(),
            grid_id: None,
        }
    }

    pub fn planner(&self) -> &P {
        &self.planner
    }

    pub fn plan(
        &mut self,
        grid: &OccupancyGrid,
        start: Cell,
        goal: Cell,
    ) -> Result<Option<Path>, PlanError> {
        let grid_id = grid.id();
        let revision = grid.revision();
        if self.grid_id != Some(grid_id) {
            if !self.route_plans_by_location.is_empty() {
                debug!("Grid {} replaced the planned-on grid, dropping cached routes", grid_id);
            }
            self.route_plans_by_location.clear();
            self.grid_id = Some(grid_id);
        }
        if let Some(cached) = self.route_plans_by_location.get(&(start, goal)) {
            if cached.grid_id == grid_id && cached.revision == revision {
                debug!(
                    "Reusing route ({}, {}) -> ({}, {}) from revision {}",
                    start.x, start.y, goal.x, goal.y, revision
                );
                return Ok(cached.path.clone());
            }
        }

        let path = self.planner.plan(&grid.obstacle_mask(), start, goal)?;
        if path.is_none() {
            debug!(
                "Failed to find contiguous path between ({}, {}) and ({}, {})",
                start.x, start.y, goal.x, goal.y
            );
        }
        self.route_plans_by_location.insert(
            (start, goal),
            CachedRoute {
                grid_id,
                revision,
                path: path.clone(),
            },
        );
        Ok(path)
    }

    /// Forget every cached route
    pub fn invalidate(&mut self) {
        self.route_plans_by_location.clear();
    }

    /// Number of cached routes, stale ones included
    pub fn cached_routes(&self) -> usize {
        self.route_plans_by_location.len()
    }
}
