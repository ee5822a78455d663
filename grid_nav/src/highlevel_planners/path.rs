use crate::Cell;

/// An ordered sequence of 4-connected cells from start to goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    cells: Vec<Cell>,
}

impl Path {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn start(&self) -> Option<Cell> {
        self.cells.first().copied()
    }

    pub fn goal(&self) -> Option<Cell> {
        self.cells.last().copied()
    }

    /// Sum of the Euclidean step lengths
    pub fn cost(&self) -> f64 {
        self.cells.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    /// Start, every cell where the direction of travel changes, and the goal.
    /// Straight runs collapse into their last cell.
    pub fn waypoints(&self) -> Vec<Cell> {
        let mut waypoints = vec![];
        let first = match self.cells.first() {
            Some(first) => *first,
            None => return waypoints,
        };
        waypoints.push(first);

        let mut i = 0;
        while i + 1 < self.cells.len() {
            let delta = step(self.cells[i], self.cells[i + 1]);
            let mut j = i + 1;
            while j + 1 < self.cells.len() && step(self.cells[j], self.cells[j + 1]) == delta {
                j += 1;
            }
            waypoints.push(self.cells[j]);
            i = j;
        }
        waypoints
    }
}

fn step(from: Cell, to: Cell) -> (i64, i64) {
    (to.x - from.x, to.y - from.y)
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}
