//! Triangle and segment rasterization over a square grid.
//!
//! Cells are sampled at their integer coordinates. Only the integer bounding box of the shape,
//! clipped to the grid, is visited, so the cost is proportional to the area (or length) of the
//! shape and not to the size of the grid.

use std::ops::RangeInclusive;

use crate::{Cell, Point};

/// Perpendicular distance below which a cell is considered to lie on a segment.
pub const LINE_TOLERANCE: f64 = 0.5;

/// Inclusive cell range covering `points`, clipped to a `size` x `size` grid.
fn bounding_box(points: &[Point], size: usize) -> Option<(RangeInclusive<i64>, RangeInclusive<i64>)> {
    if size == 0 || points.is_empty() {
        return None;
    }
    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        if !p.x.is_finite() || !p.y.is_finite() {
            return None;
        }
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    let limit = size as i64 - 1;
    let min_x = (min.x.floor() as i64).max(0);
    let min_y = (min.y.floor() as i64).max(0);
    let max_x = (max.x.ceil() as i64).min(limit);
    let max_y = (max.y.ceil() as i64).min(limit);
    if min_x > max_x || min_y > max_y {
        return None;
    }
    Some((min_x..=max_x, min_y..=max_y))
}

/// Barycentric containment test.
///
/// `u` weighs the `p1 -> p3` edge and `v` the `p1 -> p2` edge. The test is closed on those two
/// edges and open on the `p2 -> p3` edge. A triangle with zero area contains nothing.
pub fn is_inside_triangle(p1: Point, p2: Point, p3: Point, p: Point) -> bool {
    let v0 = p3 - p1;
    let v1 = p2 - p1;
    let v2 = p - p1;

    let dot00 = v0.dot(&v0);
    let dot01 = v0.dot(&v1);
    let dot02 = v0.dot(&v2);
    let dot11 = v1.dot(&v1);
    let dot12 = v1.dot(&v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom == 0f64 {
        return false;
    }
    let inv_denom = 1f64 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv_denom;
    let v = (dot00 * dot12 - dot01 * dot02) * inv_denom;

    u >= 0f64 && v >= 0f64 && u + v < 1f64
}

/// True if `p` is within [`LINE_TOLERANCE`] of the infinite line through `p1` and `p2`.
/// Coincident endpoints define no line.
pub fn is_on_line(p1: Point, p2: Point, p: Point) -> bool {
    let dir = p2 - p1;
    let len = dir.norm();
    if len == 0f64 {
        return false;
    }
    let offset = p1 - p;
    let cross = dir.x * offset.y - dir.y * offset.x;
    cross.abs() / len < LINE_TOLERANCE
}

/// Cells of a `size` x `size` grid whose sample point lies inside the triangle.
pub fn triangle_cells(p1: Point, p2: Point, p3: Point, size: usize) -> Vec<Cell> {
    let mut cells = vec![];
    if let Some((xs, ys)) = bounding_box(&[p1, p2, p3], size) {
        for x in xs {
            for y in ys.clone() {
                let cell = Cell::new(x, y);
                if is_inside_triangle(p1, p2, p3, cell.center()) {
                    cells.push(cell);
                }
            }
        }
    }
    cells
}

/// Cells of a `size` x `size` grid that lie on the segment `p1 -> p2`.
///
/// This is a distance test inside the segment's bounding box rather than a Bresenham walk, so
/// the result can be one or two cells thick depending on the slope.
pub fn segment_cells(p1: Point, p2: Point, size: usize) -> Vec<Cell> {
    let mut cells = vec![];
    if p1 == p2 {
        return cells;
    }
    if let Some((xs, ys)) = bounding_box(&[p1, p2], size) {
        for x in xs {
            for y in ys.clone() {
                let cell = Cell::new(x, y);
                if is_on_line(p1, p2, cell.center()) {
                    cells.push(cell);
                }
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_edges_are_asymmetric() {
        let p1 = Point::new(0f64, 0f64);
        let p2 = Point::new(0f64, 4f64);
        let p3 = Point::new(4f64, 0f64);

        // Vertex p1 and points on the p1 edges are inside
        assert!(is_inside_triangle(p1, p2, p3, Point::new(0f64, 0f64)));
        assert!(is_inside_triangle(p1, p2, p3, Point::new(0f64, 2f64)));
        assert!(is_inside_triangle(p1, p2, p3, Point::new(2f64, 0f64)));
        // The hypotenuse is open
        assert!(!is_inside_triangle(p1, p2, p3, Point::new(2f64, 2f64)));
        assert!(!is_inside_triangle(p1, p2, p3, Point::new(4f64, 0f64)));
        assert!(is_inside_triangle(p1, p2, p3, Point::new(1f64, 1f64)));
        assert!(!is_inside_triangle(p1, p2, p3, Point::new(-1f64, 1f64)));
    }

    #[test]
    fn test_degenerate_triangle() {
        let p = Point::new(1f64, 1f64);
        let q = Point::new(3f64, 3f64);
        assert!(!is_inside_triangle(p, p, q, Point::new(2f64, 2f64)));
        assert!(triangle_cells(p, q, Point::new(5f64, 5f64), 10).is_empty());
    }

    #[test]
    fn test_triangle_cells_right_triangle() {
        let cells = triangle_cells(
            Point::new(0f64, 0f64),
            Point::new(0f64, 4f64),
            Point::new(4f64, 0f64),
            10,
        );
        // x + y < 4 with x, y >= 0
        assert_eq!(cells.len(), 10);
        assert!(cells.iter().all(|c| c.x + c.y < 4));
    }

    #[test]
    fn test_triangle_clipped_to_grid() {
        let cells = triangle_cells(
            Point::new(-5f64, -5f64),
            Point::new(-5f64, 20f64),
            Point::new(20f64, -5f64),
            6,
        );
        assert!(!cells.is_empty());
        assert!(cells
            .iter()
            .all(|c| c.x >= 0 && c.y >= 0 && c.x < 6 && c.y < 6));
    }

    #[test]
    fn test_segment_cells_horizontal() {
        let cells = segment_cells(Point::new(1f64, 2f64), Point::new(5f64, 2f64), 10);
        assert_eq!(cells.len(), 5);
        assert!(cells.iter().all(|c| c.y == 2));
    }

    #[test]
    fn test_segment_cells_diagonal_stays_in_box() {
        let p1 = Point::new(1.2f64, 1.7f64);
        let p2 = Point::new(6.4f64, 4.1f64);
        let cells = segment_cells(p1, p2, 10);
        assert!(!cells.is_empty());
        for c in cells {
            assert!(c.x >= 1 && c.x <= 7 && c.y >= 1 && c.y <= 5);
            assert!(is_on_line(p1, p2, c.center()));
        }
    }

    #[test]
    fn test_segment_degenerate() {
        let p = Point::new(3f64, 3f64);
        assert!(segment_cells(p, p, 10).is_empty());
        assert!(!is_on_line(p, p, p));
    }
}
