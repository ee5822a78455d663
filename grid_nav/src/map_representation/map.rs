use crate::Cell;
/// Abstract read-only interface for map representation.
/// `Some(true)` is blocked, `Some(false)` is free and `None` is unknown or off the map.
pub trait Map {
    fn get_occupancy(&self, cell: Cell) -> Option<bool>;
}
