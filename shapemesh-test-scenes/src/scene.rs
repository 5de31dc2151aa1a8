//! Canned shapes shared by integration tests and benchmarks.

use shapemesh::{
    point, Color, DrawingShape, FillStyle, FillStyleId, LineStyle, LineStyleId, Path, ShapeDef,
};

pub const RED: Color = Color::rgb(255, 0, 0);
pub const BLUE: Color = Color::rgb(0, 0, 255);

/// `begin_fill(red)`, a 10x10 square drawn with three `line_to` calls, `end_fill()`.
pub fn filled_square() -> DrawingShape {
    let mut drawing = DrawingShape::new();
    drawing.begin_fill(RED).unwrap();
    drawing.move_to(0.0, 0.0).unwrap();
    drawing.line_to(10.0, 0.0).unwrap();
    drawing.line_to(10.0, 10.0).unwrap();
    drawing.line_to(0.0, 10.0).unwrap();
    drawing.end_fill();
    drawing
}

/// A 2-unit blue stroke along the curve (0,0) -> ctrl (5,10) -> (10,0).
pub fn stroked_arc() -> DrawingShape {
    let mut drawing = DrawingShape::new();
    drawing.line_style(2, BLUE).unwrap();
    drawing.move_to(0.0, 0.0).unwrap();
    drawing.curve_to(5.0, 10.0, 10.0, 0.0).unwrap();
    drawing
}

/// A filled ring: two closed circular outlines sharing one fill, the outer one
/// stroked. Under the even-odd rule the inner circle cuts a hole.
pub fn donut(radius: f32, hole: f32) -> ShapeDef {
    let fill = FillStyleId::new(1);
    let outer = circle(radius, fill, LineStyleId::new(1));
    let inner = circle(hole, fill, None);
    ShapeDef::from_parts(
        vec![outer, inner],
        vec![FillStyle::solid(RED)],
        vec![LineStyle::new(1, Color::BLACK)],
    )
    .unwrap()
}

/// Closed circle made of eight quadratic arcs, control points on the tangent
/// intersections.
pub fn circle(radius: f32, fill: Option<FillStyleId>, line: Option<LineStyleId>) -> Path {
    let segments = 8;
    let step = std::f32::consts::TAU / segments as f32;
    let control_radius = radius / (step * 0.5).cos();
    let mut path = Path::new(point(radius, 0.0), fill, None, line);
    for segment in 0..segments {
        let middle = (segment as f32 + 0.5) * step;
        let end = (segment + 1) as f32 * step;
        path.quadratic_to(
            point(control_radius * middle.cos(), control_radius * middle.sin()),
            point(radius * end.cos(), radius * end.sin()),
        );
    }
    path.close();
    path
}

/// A decoded-style shape: one closed square path painted red on its left and blue on
/// its right.
pub fn two_tone_square() -> ShapeDef {
    let mut path = Path::new(
        point(0.0, 0.0),
        FillStyleId::new(1),
        FillStyleId::new(2),
        LineStyleId::new(1),
    );
    path.line_to(point(20.0, 0.0));
    path.line_to(point(20.0, 20.0));
    path.line_to(point(0.0, 20.0));
    path.close();
    ShapeDef::from_parts(
        vec![path],
        vec![FillStyle::solid(RED), FillStyle::solid(BLUE)],
        vec![LineStyle::new(1, Color::BLACK)],
    )
    .unwrap()
}

/// `count` curved open strokes fanning out from the origin.
pub fn curve_fan(count: usize) -> DrawingShape {
    let mut drawing = DrawingShape::new();
    drawing.line_style(1, Color::BLACK).unwrap();
    for index in 0..count {
        let angle = index as f32 / count.max(1) as f32 * std::f32::consts::PI;
        let (sin, cos) = angle.sin_cos();
        drawing.move_to(0.0, 0.0).unwrap();
        drawing
            .curve_to(50.0 * cos - 20.0 * sin, 50.0 * sin + 20.0 * cos, 100.0 * cos, 100.0 * sin)
            .unwrap();
    }
    drawing
}
