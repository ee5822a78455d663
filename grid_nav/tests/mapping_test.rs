use grid_nav::geometry::rasterize::{is_inside_triangle, is_on_line};
use grid_nav::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

fn random_sweep(seed: u64, size: i64, count: usize) -> Vec<Ray> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut origin = Cell::new(size / 2, size / 4);
    let mut rays = vec![];
    for _ in 0..count {
        if rng.gen_bool(0.3f64) {
            origin.y = (origin.y + 1).min(size - 1);
        }
        let angle = rng.gen_range(0f64..PI);
        let dist = rng.gen_range(1u32..(size as u32 / 2));
        rays.push(Ray::new(origin, angle, dist));
    }
    rays
}

fn build(rays: &[Ray], size: usize) -> OccupancyGrid {
    let mut grid = OccupancyGrid::new(size, 8f64, 5f64).unwrap();
    for ray in rays {
        grid.add_ray(*ray);
    }
    grid
}

#[test]
fn test_same_rays_same_grid() {
    env_logger::try_init().ok();
    let rays = random_sweep(17, 60, 200);
    let first = build(&rays, 60);
    let second = build(&rays, 60);
    assert_eq!(first.states(), second.states());
    assert_eq!(first.obstacle_mask(), second.obstacle_mask());
    assert_eq!(first.rays(), &rays[..]);
}

#[test]
fn test_mask_covers_every_filled_cell() {
    env_logger::try_init().ok();
    for seed in 0..5 {
        let grid = build(&random_sweep(seed, 40, 150), 40);
        let mask = grid.obstacle_mask();
        let mut filled = 0;
        for y in 0..40 {
            for x in 0..40 {
                let cell = Cell::new(x, y);
                if grid.state(cell) == Some(CellState::Filled) {
                    filled += 1;
                    assert!(mask.is_blocked(cell));
                }
            }
        }
        assert!(mask.blocked_count() >= filled);
    }
}

#[test]
fn test_triangle_fill_invariant() {
    let mut grid = OccupancyGrid::new(30, 8f64, 5f64).unwrap();
    let first = Ray::new(Cell::new(5, 5), 0f64, 8);
    let second = Ray::new(Cell::new(5, 12), 0f64, 8);
    grid.add_ray(first);
    grid.add_ray(second);

    // Endpoints (13, 5) and (13, 12) are 7 apart, so only the two sweep triangles are cleared
    let a = first.origin.center();
    let b = second.origin.center();
    let triangles = [(a, b, first.endpoint()), (a, b, second.endpoint())];
    for y in 0..30 {
        for x in 0..30 {
            let cell = Cell::new(x, y);
            let inside = triangles
                .iter()
                .any(|(p1, p2, p3)| is_inside_triangle(*p1, *p2, *p3, cell.center()));
            let in_box = (5..=13).contains(&x) && (5..=12).contains(&y);
            match grid.state(cell).unwrap() {
                CellState::Empty => assert!(in_box),
                CellState::Filled => panic!("no wall expected at ({}, {})", x, y),
                CellState::Unknown => assert!(!inside),
            }
            if inside {
                assert_eq!(grid.state(cell), Some(CellState::Empty));
            }
        }
    }
}

#[test]
fn test_close_endpoints_form_wall() {
    let origin = Cell::new(10, 10);
    // Chord of 3 cells between two 6 cell beams
    let spread = 2f64 * (3f64 / 12f64).asin();
    let first = Ray::new(origin, 0f64, 6);
    let second = Ray::new(origin, spread, 6);
    assert!(((first.endpoint() - second.endpoint()).norm() - 3f64).abs() < 1e-9f64);

    let mut grid = OccupancyGrid::new(30, 8f64, 5f64).unwrap();
    grid.add_ray(first);
    grid.add_ray(second);

    let filled: Vec<Cell> = (0..30)
        .flat_map(|y| (0..30).map(move |x| Cell::new(x, y)))
        .filter(|c| grid.state(*c) == Some(CellState::Filled))
        .collect();
    assert!(!filled.is_empty());
    for cell in filled {
        assert!(is_on_line(first.endpoint(), second.endpoint(), cell.center()));
    }
}

#[test]
fn test_distant_endpoints_form_no_wall() {
    let origin = Cell::new(10, 10);
    // Chord of 10 cells between two 6 cell beams
    let spread = 2f64 * (10f64 / 12f64).asin();
    let mut grid = OccupancyGrid::new(30, 8f64, 5f64).unwrap();
    grid.add_ray(Ray::new(origin, 0f64, 6));
    grid.add_ray(Ray::new(origin, spread, 6));
    assert!(grid.states().iter().all(|s| *s != CellState::Filled));
}

#[test]
fn test_endpoints_off_grid_are_clipped() {
    let mut grid = OccupancyGrid::new(10, 50f64, 50f64).unwrap();
    grid.add_ray(Ray::new(Cell::new(5, 5), 0f64, 40));
    grid.add_ray(Ray::new(Cell::new(5, 5), 0.2f64, 40));
    grid.add_ray(Ray::new(Cell::new(9, 9), PI, 40));
    assert_eq!(grid.states().len(), 100);
    assert_eq!(grid.rays().len(), 3);
}
