use geo_types::{Coord, LineString, Polygon};

/// Closed Douglas-Peucker simplification using geo crate's implementation.
///
/// The ring is rotated to start at the point farthest from its first point,
/// so both initial anchors land on extreme vertices instead of wherever the
/// border tracer happened to start. The closing duplicate is dropped.
pub fn approximate_closed(points: &[[f64; 2]], epsilon: f64) -> Vec<[f64; 2]> {
    use geo::Simplify;

    let mut unique: Vec<[f64; 2]> = Vec::with_capacity(points.len());
    for &p in points {
        if unique.last() != Some(&p) {
            unique.push(p);
        }
    }
    while unique.len() > 1 && unique.first() == unique.last() {
        unique.pop();
    }
    if unique.len() < 3 {
        return unique;
    }

    let first = unique[0];
    let start = unique
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            distance_sq(first, **a)
                .partial_cmp(&distance_sq(first, **b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    let mut ring: Vec<Coord<f64>> = unique[start..]
        .iter()
        .chain(&unique[..start])
        .map(|&[x, y]| Coord { x, y })
        .collect();
    ring.push(ring[0]);

    let simplified = LineString::new(ring).simplify(&epsilon);
    let mut out: Vec<[f64; 2]> = simplified.coords().map(|c| [c.x, c.y]).collect();
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Length of the closed polyline through `points`.
pub fn closed_perimeter(points: &[[f64; 2]]) -> f64 {
    use geo::EuclideanLength;

    if points.len() < 2 {
        return 0.0;
    }
    let mut coords: Vec<Coord<f64>> = points.iter().map(|&[x, y]| Coord { x, y }).collect();
    coords.push(coords[0]);
    LineString::new(coords).euclidean_length()
}

/// Area enclosed by the polygon, independent of winding.
pub fn polygon_area(points: &[[f64; 2]]) -> f64 {
    use geo::Area;

    let coords: Vec<Coord<f64>> = points.iter().map(|&[x, y]| Coord { x, y }).collect();
    Polygon::new(LineString::new(coords), vec![]).unsigned_area()
}

/// True when every turn has the same, non-zero orientation.
pub fn is_convex(points: &[[f64; 2]]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = (b[0] - a[0]) * (c[1] - b[1]) - (b[1] - a[1]) * (c[0] - b[0]);
        if cross == 0.0 {
            return false;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

/// Cosine of the angle at `pt0` between the rays towards `pt1` and `pt2`.
pub fn corner_cosine(pt1: [f64; 2], pt2: [f64; 2], pt0: [f64; 2]) -> f64 {
    let dx1 = pt1[0] - pt0[0];
    let dy1 = pt1[1] - pt0[1];
    let dx2 = pt2[0] - pt0[0];
    let dy2 = pt2[1] - pt0[1];
    (dx1 * dx2 + dy1 * dy2) / ((dx1 * dx1 + dy1 * dy1) * (dx2 * dx2 + dy2 * dy2) + 1e-10).sqrt()
}

/// Largest |cosine| over all corners of a closed polygon.
pub fn max_corner_cosine(points: &[[f64; 2]]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            corner_cosine(prev, next, points[i]).abs()
        })
        .fold(0.0, f64::max)
}

fn distance_sq(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dense outline of an axis-aligned rectangle, starting mid-way along the top.
    fn outline(x0: f64, y0: f64, w: f64, h: f64) -> Vec<[f64; 2]> {
        let mut pts = Vec::new();
        let mid = (w / 2.0) as i32;
        for x in mid..=w as i32 {
            pts.push([x0 + x as f64, y0]);
        }
        for y in 1..=h as i32 {
            pts.push([x0 + w, y0 + y as f64]);
        }
        for x in (0..w as i32).rev() {
            pts.push([x0 + x as f64, y0 + h]);
        }
        for y in (0..h as i32).rev() {
            pts.push([x0, y0 + y as f64]);
        }
        for x in 1..mid {
            pts.push([x0 + x as f64, y0]);
        }
        pts
    }

    #[test]
    fn rectangle_outline_reduces_to_its_corners() {
        let pts = outline(10.0, 20.0, 30.0, 16.0);
        let eps = closed_perimeter(&pts) * 0.02;
        let mut corners = approximate_closed(&pts, eps);
        assert_eq!(corners.len(), 4, "{corners:?}");
        corners.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(corners, vec![[10.0, 20.0], [10.0, 36.0], [40.0, 20.0], [40.0, 36.0]]);
    }

    #[test]
    fn out_and_back_trace_reduces_to_two_points() {
        let mut pts: Vec<[f64; 2]> = (0..=50).map(|x| [x as f64, 5.0]).collect();
        pts.extend((1..50).rev().map(|x| [x as f64, 5.0]));
        let eps = closed_perimeter(&pts) * 0.02;
        let approx = approximate_closed(&pts, eps);
        assert_eq!(approx.len(), 2, "{approx:?}");
    }

    #[test]
    fn square_metrics() {
        let square = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
        assert_eq!(polygon_area(&square), 100.0);
        assert_eq!(closed_perimeter(&square), 40.0);
        assert!(is_convex(&square));
        assert!(max_corner_cosine(&square) < 1e-6);
    }

    #[test]
    fn area_ignores_winding() {
        let cw = [[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]];
        assert_eq!(polygon_area(&cw), 100.0);
    }

    #[test]
    fn dart_is_not_convex() {
        let dart = [[0.0, 0.0], [10.0, 5.0], [0.0, 10.0], [3.0, 5.0]];
        assert!(!is_convex(&dart));
    }

    #[test]
    fn skewed_quad_has_large_cosine() {
        let rhombus = [[0.0, 0.0], [10.0, 0.0], [15.0, 8.0], [5.0, 8.0]];
        assert!(max_corner_cosine(&rhombus) > 0.3);
    }
}
