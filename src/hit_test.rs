//! Point-in-shape tests on flattened outlines.

use ahash::HashMap;
use lyon::math::Point;
use lyon::tessellation::FillRule;

use crate::path::Path;
use crate::tessellator::{flatten_path, MAX_SUBDIVISION_DEPTH};
use crate::{FillStyleId, ShapeDef};

/// Flattening tolerance used for hit testing, in content units.
pub const HIT_TEST_TOLERANCE: f32 = 0.5;

/// True if `point` lies inside a filled region or within half the stroke width of a
/// stroked path.
///
/// Filled regions follow the shape's fill rule the same way tessellation does: a
/// closed path adds its winding number to its left fill and subtracts it from its
/// right fill.
pub fn shape_contains(shape: &ShapeDef, point: Point) -> bool {
    if shape.paths().is_empty() {
        return false;
    }
    let bound = shape.bound();
    let max_half_width = shape
        .line_styles()
        .iter()
        .map(|style| style.half_width())
        .fold(HIT_TEST_TOLERANCE, f32::max);
    if point.x < bound.min.x - max_half_width
        || point.x > bound.max.x + max_half_width
        || point.y < bound.min.y - max_half_width
        || point.y > bound.max.y + max_half_width
    {
        return false;
    }

    let mut windings: HashMap<FillStyleId, i32> = HashMap::default();
    let mut outline = Vec::new();
    for path in shape.paths() {
        if path.is_empty() {
            continue;
        }
        flatten_path(path, HIT_TEST_TOLERANCE, MAX_SUBDIVISION_DEPTH, &mut outline);
        if stroke_contains(shape, path, &outline, point) {
            return true;
        }
        if !path.is_closed() {
            continue;
        }
        let winding = winding_number(&outline, point);
        if winding == 0 {
            continue;
        }
        if let Some(left) = path.left_fill {
            *windings.entry(left).or_default() += winding;
        }
        if let Some(right) = path.right_fill {
            *windings.entry(right).or_default() -= winding;
        }
    }

    let fill_rule = shape.options().fill_rule;
    windings.values().any(|&winding| match fill_rule {
        FillRule::EvenOdd => winding % 2 != 0,
        FillRule::NonZero => winding != 0,
    })
}

/// Winding number of `polygon`, implicitly closed from last to first point, around
/// `point`.
pub fn winding_number(polygon: &[Point], point: Point) -> i32 {
    let Some(&last) = polygon.last() else {
        return 0;
    };
    let mut winding = 0;
    let mut previous = last;
    for &current in polygon {
        let side = (current - previous).cross(point - previous);
        if previous.y <= point.y {
            if current.y > point.y && side > 0.0 {
                winding += 1;
            }
        } else if current.y <= point.y && side < 0.0 {
            winding -= 1;
        }
        previous = current;
    }
    winding
}

/// Even-odd containment for a single polygon.
pub fn polygon_contains(polygon: &[Point], point: Point) -> bool {
    winding_number(polygon, point) % 2 != 0
}

fn stroke_contains(shape: &ShapeDef, path: &Path, outline: &[Point], point: Point) -> bool {
    let Some(style) = path
        .line_style
        .and_then(|id| shape.styles().line_style(id))
    else {
        return false;
    };
    // Hairlines still get a small pick radius.
    let radius = style.half_width().max(HIT_TEST_TOLERANCE);
    let closing = if path.is_closed() {
        outline.last().zip(outline.first())
    } else {
        None
    };
    outline
        .windows(2)
        .map(|pair| (&pair[0], &pair[1]))
        .chain(closing)
        .any(|(a, b)| distance_to_segment(point, *a, *b) <= radius)
}

fn distance_to_segment(point: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let length_squared = ab.square_length();
    if length_squared == 0.0 {
        return (point - a).length();
    }
    let t = ((point - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    (point - (a + ab * t)).length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, FillStyle, LineStyle, TessellationOptions};
    use lyon::math::point;

    fn ring_shape() -> ShapeDef {
        let mut shape = ShapeDef::new();
        let fill = shape.add_fill_style(FillStyle::solid(Color::BLACK));
        for (min, max) in [(0.0, 10.0), (3.0, 7.0)] {
            let mut path = Path::new(point(min, min), Some(fill), None, None);
            path.line_to(point(max, min));
            path.line_to(point(max, max));
            path.line_to(point(min, max));
            path.close();
            shape.add_path(path).unwrap();
        }
        shape
    }

    #[test]
    fn polygon_containment() {
        let triangle = [point(0.0, 0.0), point(10.0, 0.0), point(0.0, 10.0)];
        assert!(polygon_contains(&triangle, point(2.0, 2.0)));
        assert!(!polygon_contains(&triangle, point(8.0, 8.0)));
        assert!(!polygon_contains(&[], point(0.0, 0.0)));
    }

    #[test]
    fn even_odd_ring_has_a_hole() {
        let shape = ring_shape();
        assert!(shape.point_test(point(1.0, 1.0)));
        assert!(!shape.point_test(point(5.0, 5.0)));
        assert!(!shape.point_test(point(11.0, 5.0)));
    }

    #[test]
    fn non_zero_ring_is_solid() {
        let mut shape = ring_shape();
        shape.set_options(TessellationOptions::default().with_fill_rule(FillRule::NonZero));
        assert!(shape.point_test(point(5.0, 5.0)));
    }

    #[test]
    fn winding_follows_orientation() {
        let square = [
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(10.0, 10.0),
            point(0.0, 10.0),
        ];
        let reversed: Vec<Point> = square.iter().rev().copied().collect();
        let inside = point(5.0, 5.0);
        assert_eq!(winding_number(&square, inside), -winding_number(&reversed, inside));
        assert_ne!(winding_number(&square, inside), 0);
        assert_eq!(winding_number(&square, point(15.0, 5.0)), 0);
    }

    #[test]
    fn open_stroke_is_hit_near_the_line() {
        let mut shape = ShapeDef::new();
        let line = shape.add_line_style(LineStyle::new(4, Color::BLACK));
        let mut path = Path::new(point(0.0, 0.0), None, None, Some(line));
        path.line_to(point(10.0, 0.0));
        shape.add_path(path).unwrap();

        assert!(shape.point_test(point(5.0, 1.5)));
        assert!(shape.point_test(point(5.0, -1.5)));
        assert!(!shape.point_test(point(5.0, 3.0)));
    }

    #[test]
    fn horizontal_stroke_is_hit_along_its_length() {
        let mut shape = ShapeDef::new();
        let line = shape.add_line_style(LineStyle::new(4, Color::BLACK));
        let mut path = Path::new(point(0.0, 0.0), None, None, Some(line));
        path.line_to(point(0.0, 0.0));
        path.line_to(point(100.0, 0.0));
        shape.add_path(path).unwrap();

        assert!(shape.point_test(point(50.0, 0.0)));
        assert!(shape.point_test(point(100.0, 1.5)));
        assert!(!shape.point_test(point(50.0, 5.0)));
    }

    #[test]
    fn unfilled_closed_path_is_hollow() {
        let mut shape = ShapeDef::new();
        let mut path = Path::new(point(0.0, 0.0), None, None, None);
        path.line_to(point(10.0, 0.0));
        path.line_to(point(10.0, 10.0));
        path.close();
        shape.add_path(path).unwrap();
        assert!(!shape.point_test(point(8.0, 2.0)));
    }
}
