pub mod map;
pub mod obstacle_mask;
pub mod occupancy_grid;
