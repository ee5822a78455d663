use crate::error::PlanError;
use crate::highlevel_planners::path::Path;
use crate::map_representation::obstacle_mask::ObstacleMask;
use crate::Cell;

pub trait HighLevelPlanner {
    /// Plan a route over `mask`.
    ///
    /// `Ok(None)` means the goal is unreachable. An `Err` means the planner gave up before it
    /// could tell.
    fn plan(&self, mask: &ObstacleMask, start: Cell, goal: Cell) -> Result<Option<Path>, PlanError>;
}
