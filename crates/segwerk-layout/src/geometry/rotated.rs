// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal-area oriented rectangles over integer outlines (convex hull plus
// rotating calipers).

use imageproc::point::Point;

/// A minimal-area rectangle enclosing a point set, at an arbitrary angle.
#[derive(Debug, Clone, PartialEq)]
pub struct RotatedRect {
    /// Centre in pixel coordinates.
    pub center: (f64, f64),
    /// Extent along the hull edge the rectangle was fitted to.
    pub width: f64,
    /// Extent perpendicular to that edge.
    pub height: f64,
    /// Direction of the `width` edge in degrees, `atan2(dy, dx)` with the
    /// image's y axis pointing down.
    pub angle: f64,
}

impl RotatedRect {
    /// Fit the minimal-area rectangle around `points`.
    ///
    /// Fewer than three distinct hull points yield the axis-aligned extent at
    /// angle zero.
    pub fn from_points(points: &[Point<i32>]) -> RotatedRect {
        let hull = convex_hull(points);
        if hull.len() < 3 {
            return axis_aligned(points);
        }

        let mut best_area = f64::MAX;
        let mut best = axis_aligned(points);

        let n = hull.len();
        for i in 0..n {
            let (ax, ay) = (hull[i].x as f64, hull[i].y as f64);
            let (bx, by) = (hull[(i + 1) % n].x as f64, hull[(i + 1) % n].y as f64);
            let (ex, ey) = (bx - ax, by - ay);
            let len = (ex * ex + ey * ey).sqrt();
            if len < f64::EPSILON {
                continue;
            }
            let (nx, ny) = (ex / len, ey / len);
            let (px, py) = (-ny, nx);

            let mut min_n = f64::MAX;
            let mut max_n = f64::MIN;
            let mut min_p = f64::MAX;
            let mut max_p = f64::MIN;
            for q in &hull {
                let (dx, dy) = (q.x as f64 - ax, q.y as f64 - ay);
                let proj_n = nx * dx + ny * dy;
                let proj_p = px * dx + py * dy;
                min_n = min_n.min(proj_n);
                max_n = max_n.max(proj_n);
                min_p = min_p.min(proj_p);
                max_p = max_p.max(proj_p);
            }

            let width = max_n - min_n;
            let height = max_p - min_p;
            let area = width * height;
            if area < best_area {
                best_area = area;
                let cn = (min_n + max_n) / 2.0;
                let cp = (min_p + max_p) / 2.0;
                best = RotatedRect {
                    center: (ax + cn * nx + cp * px, ay + cn * ny + cp * py),
                    width,
                    height,
                    angle: ny.atan2(nx).to_degrees(),
                };
            }
        }

        best
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Short side over long side, in [0, 1].
    pub fn eccentricity(&self) -> f64 {
        let long = self.width.max(self.height);
        if long <= 0.0 {
            return 1.0;
        }
        self.width.min(self.height) / long
    }

    /// Direction of the longer edge in degrees, normalised into (-90, 90].
    pub fn long_edge_angle(&self) -> f64 {
        let angle = if self.width >= self.height {
            self.angle
        } else {
            self.angle + 90.0
        };
        normalize_half_turn(angle)
    }
}

/// Map an angle in degrees into (-90, 90] by adding or subtracting 180.
pub fn normalize_half_turn(mut degrees: f64) -> f64 {
    while degrees > 90.0 {
        degrees -= 180.0;
    }
    while degrees <= -90.0 {
        degrees += 180.0;
    }
    degrees
}

/// Map an angle in degrees into [-45, 45] by adding or subtracting 90.
pub fn normalize_quarter_turn(mut degrees: f64) -> f64 {
    while degrees > 45.0 {
        degrees -= 90.0;
    }
    while degrees < -45.0 {
        degrees += 90.0;
    }
    degrees
}

fn axis_aligned(points: &[Point<i32>]) -> RotatedRect {
    if points.is_empty() {
        return RotatedRect {
            center: (0.0, 0.0),
            width: 0.0,
            height: 0.0,
            angle: 0.0,
        };
    }
    let min_x = points.iter().map(|p| p.x).min().unwrap_or(0) as f64;
    let max_x = points.iter().map(|p| p.x).max().unwrap_or(0) as f64;
    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0) as f64;
    let max_y = points.iter().map(|p| p.y).max().unwrap_or(0) as f64;
    RotatedRect {
        center: ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0),
        width: max_x - min_x,
        height: max_y - min_y,
        angle: 0.0,
    }
}

/// Convex hull by Andrew's monotone chain, counter-clockwise in a y-up frame,
/// without collinear points.
pub fn convex_hull(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut pts: Vec<Point<i32>> = points.to_vec();
    pts.sort_by(|a, b| a.x.cmp(&b.x).then(a.y.cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: Point<i32>, a: Point<i32>, b: Point<i32>) -> i64 {
        (a.x as i64 - o.x as i64) * (b.y as i64 - o.y as i64)
            - (a.y as i64 - o.y as i64) * (b.x as i64 - o.x as i64)
    }

    let mut lower: Vec<Point<i32>> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point<i32>> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_points(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point<i32>> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
            Point::new((x0 + x1) / 2, (y0 + y1) / 2),
        ]
    }

    #[test]
    fn hull_drops_interior_and_collinear_points() {
        let mut pts = rect_points(0, 0, 10, 4);
        pts.push(Point::new(5, 0));
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
    }

    #[test]
    fn axis_aligned_rectangle_fits_exactly() {
        let rect = RotatedRect::from_points(&rect_points(0, 0, 100, 10));
        assert!((rect.area() - 1000.0).abs() < 1e-6);
        assert!(rect.long_edge_angle().abs() < 1e-9);
        assert!((rect.eccentricity() - 0.1).abs() < 1e-9);
        let (cx, cy) = rect.center;
        assert!((cx - 50.0).abs() < 1e-9 && (cy - 5.0).abs() < 1e-9);
    }

    #[test]
    fn tilted_bar_reports_its_angle() {
        // A 200 x 10 bar rotated by atan(0.05) ~ 2.86 degrees.
        let (dx, dy) = (200.0f64, 10.0f64);
        let pts: Vec<Point<i32>> = [(0.0, 0.0), (dx, dy), (dx - 0.5, dy + 10.0), (-0.5, 10.0)]
            .iter()
            .map(|&(x, y): &(f64, f64)| Point::new(x.round() as i32, y.round() as i32))
            .collect();
        let rect = RotatedRect::from_points(&pts);
        let expected = (dy / dx).atan().to_degrees();
        assert!(
            (rect.long_edge_angle() - expected).abs() < 0.5,
            "angle {} expected ~{expected}",
            rect.long_edge_angle()
        );
    }

    #[test]
    fn vertical_bar_long_edge_is_ninety() {
        let rect = RotatedRect::from_points(&rect_points(0, 0, 4, 80));
        assert!((rect.long_edge_angle().abs() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_inputs() {
        let empty = RotatedRect::from_points(&[]);
        assert_eq!(empty.area(), 0.0);
        let line = RotatedRect::from_points(&[Point::new(0, 0), Point::new(10, 0)]);
        assert_eq!(line.width, 10.0);
        assert_eq!(line.height, 0.0);
    }

    #[test]
    fn normalisation_ranges() {
        assert_eq!(normalize_half_turn(135.0), -45.0);
        assert_eq!(normalize_half_turn(-90.0), 90.0);
        assert_eq!(normalize_quarter_turn(88.5), -1.5);
        assert_eq!(normalize_quarter_turn(-89.0), 1.0);
    }
}
