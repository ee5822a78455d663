//! A* over a binary obstacle mask.
//!
//! 4-connected moves with Euclidean step cost and a straight-line heuristic. Open set ties on
//! `f` are popped in insertion order. A node is pushed again whenever a strictly cheaper way to
//! reach it is found, even if it has already been expanded.

use log::{debug, trace};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::highlevel_planners::highlevel_planners::HighLevelPlanner;
use crate::highlevel_planners::path::Path;
use crate::map_representation::obstacle_mask::ObstacleMask;
use crate::Cell;

/// Open set entry
#[derive(Clone, Debug)]
struct Node {
    cell: Cell,
    g_cost: f64,
    f_cost: f64,
    /// Insertion order, breaks ties on `f_cost`
    seq: u64,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both keys so BinaryHeap pops the smallest f, then the oldest entry
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(cell: Cell, goal: Cell) -> f64 {
    cell.distance(&goal)
}

fn reconstruct_path(came_from: &HashMap<Cell, Cell>, goal: Cell) -> Path {
    let mut cells = vec![goal];
    let mut current = goal;
    while let Some(prev) = came_from.get(&current) {
        cells.push(*prev);
        current = *prev;
    }
    cells.reverse();
    Path::new(cells)
}

fn search(
    mask: &ObstacleMask,
    start: Cell,
    goal: Cell,
    max_expansions: Option<usize>,
) -> Result<Option<Path>, PlanError> {
    if !mask.in_bounds(start) || !mask.in_bounds(goal) {
        debug!(
            "Start ({}, {}) or goal ({}, {}) is outside the {}x{} mask",
            start.x,
            start.y,
            goal.x,
            goal.y,
            mask.width(),
            mask.height()
        );
        return Ok(None);
    }

    let mut open_set = BinaryHeap::new();
    let mut closed_set = HashSet::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut g_scores: HashMap<Cell, f64> = HashMap::new();
    let mut seq = 0u64;
    let mut expansions = 0usize;
    let mut reopened = 0usize;

    g_scores.insert(start, 0f64);
    open_set.push(Node {
        cell: start,
        g_cost: 0f64,
        f_cost: heuristic(start, goal),
        seq,
    });

    while let Some(current) = open_set.pop() {
        // A cheaper entry for this cell was pushed after this one
        if current.g_cost > g_scores[&current.cell] {
            continue;
        }

        if current.cell == goal {
            let path = reconstruct_path(&came_from, goal);
            trace!(
                "Found path of {} cells, cost {:.2}, after {} expansions ({} reopened)",
                path.len(),
                current.g_cost,
                expansions,
                reopened
            );
            return Ok(Some(path));
        }

        if let Some(max) = max_expansions {
            if expansions >= max {
                debug!("Search aborted after {} expansions", expansions);
                return Err(PlanError::SearchAborted { expansions });
            }
        }
        expansions += 1;
        closed_set.insert(current.cell);

        for neighbor in current.cell.neighbors_4() {
            if mask.is_blocked(neighbor) {
                continue;
            }

            let tentative_g = current.g_cost + current.cell.distance(&neighbor);
            let known_g = g_scores.get(&neighbor).copied().unwrap_or(f64::INFINITY);
            if tentative_g >= known_g {
                continue;
            }
            if closed_set.contains(&neighbor) {
                reopened += 1;
            }

            came_from.insert(neighbor, current.cell);
            g_scores.insert(neighbor, tentative_g);
            seq += 1;
            open_set.push(Node {
                cell: neighbor,
                g_cost: tentative_g,
                f_cost: tentative_g + heuristic(neighbor, goal),
                seq,
            });
        }
    }

    trace!("No path after {} expansions", expansions);
    Ok(None)
}

/// Shortest 4-connected path from `start` to `goal`, or `None` if the goal cannot be reached.
///
/// Cells off the mask or with mask value 1 are never entered. The start cell itself is not
/// checked against the mask.
pub fn find_path(mask: &ObstacleMask, start: Cell, goal: Cell) -> Option<Path> {
    search(mask, start, goal, None).unwrap_or(None)
}

/// A* grid planner with an optional expansion budget.
#[derive(Clone, Debug, Default)]
pub struct GridPathfinder {
    config: PlannerConfig,
}

impl GridPathfinder {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Unbounded search, see [`find_path`]
    pub fn find_path(&self, mask: &ObstacleMask, start: Cell, goal: Cell) -> Option<Path> {
        find_path(mask, start, goal)
    }

    /// Search that gives up with [`PlanError::SearchAborted`] once `max_expansions` nodes have
    /// been expanded without reaching the goal.
    pub fn find_path_bounded(
        &self,
        mask: &ObstacleMask,
        start: Cell,
        goal: Cell,
    ) -> Result<Option<Path>, PlanError> {
        search(mask, start, goal, self.config.max_expansions)
    }
}

impl HighLevelPlanner for GridPathfinder {
    fn plan(&self, mask: &ObstacleMask, start: Cell, goal: Cell) -> Result<Option<Path>, PlanError> {
        self.find_path_bounded(mask, start, goal)
    }
}
