pub mod astar;
pub mod highlevel_planners;
pub mod path;
