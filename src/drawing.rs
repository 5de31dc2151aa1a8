//! Pen-based drawing surface over a [`ShapeDef`].
//!
//! `DrawingShape` is what a scripting runtime drives when content draws at run time:
//! fills and strokes are switched with [`DrawingShape::begin_fill`] and
//! [`DrawingShape::line_style`], and geometry is appended with `move_to`, `line_to`
//! and `curve_to`.
//!
//! ```rust
//! use shapemesh::{Color, DrawingShape};
//!
//! let mut drawing = DrawingShape::new();
//! drawing.begin_fill(Color::rgb(255, 0, 0)).unwrap();
//! drawing.move_to(0.0, 0.0).unwrap();
//! drawing.line_to(10.0, 0.0).unwrap();
//! drawing.line_to(10.0, 10.0).unwrap();
//! drawing.line_to(0.0, 10.0).unwrap();
//! drawing.end_fill();
//!
//! let path = &drawing.shape().paths()[0];
//! assert!(path.is_closed());
//! assert_eq!(path.edges().len(), 3);
//! ```

use lyon::math::{point, Point};
use tracing::trace;

use crate::error::{check_finite, Result};
use crate::mesh::MeshSet;
use crate::path::Path;
use crate::shape::{MeshRenderer, Outline, Rect};
use crate::{Color, FillStyle, FillStyleId, LineStyle, LineStyleId, ShapeDef};

#[derive(Debug)]
pub struct DrawingShape {
    shape: ShapeDef,
    pen: Point,
    current_fill: Option<FillStyleId>,
    current_line: Option<LineStyleId>,
    changed: bool,
}

impl Default for DrawingShape {
    fn default() -> Self {
        Self {
            shape: ShapeDef::new(),
            pen: Point::origin(),
            current_fill: None,
            current_line: None,
            changed: false,
        }
    }
}

impl DrawingShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing shape; drawing continues from the origin with no fill or
    /// stroke selected.
    pub fn from_shape(mut shape: ShapeDef) -> Self {
        shape.forget_current_path();
        Self {
            shape,
            ..Self::default()
        }
    }

    pub fn shape(&self) -> &ShapeDef {
        &self.shape
    }

    pub fn into_shape(self) -> ShapeDef {
        self.shape
    }

    pub fn pen(&self) -> Point {
        self.pen
    }

    pub fn current_fill(&self) -> Option<FillStyleId> {
        self.current_fill
    }

    pub fn current_line_style(&self) -> Option<LineStyleId> {
        self.current_line
    }

    /// True when geometry changed since the last [`DrawingShape::finalize`].
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Ends any fill in progress and starts a new path filled with `color` on its
    /// left side.
    pub fn begin_fill(&mut self, color: Color) -> Result<()> {
        self.end_fill();
        let fill = self.shape.add_fill_style(FillStyle::Solid(color));
        self.current_fill = Some(fill);
        self.start_new_path()
    }

    /// Closes the current path and stops filling. The line style is kept.
    pub fn end_fill(&mut self) {
        self.shape.edit_current_path(Path::close);
        self.shape.forget_current_path();
        self.current_fill = None;
    }

    /// Selects the stroke for subsequent drawing. A zero `width` turns stroking off
    /// without registering a style.
    pub fn line_style(&mut self, width: u16, color: Color) -> Result<()> {
        self.current_line = if width > 0 {
            Some(self.shape.add_line_style(LineStyle::new(width, color)))
        } else {
            None
        };
        self.start_new_path()
    }

    /// Moves the pen, starting a new path unless the pen is already at `(x, y)`.
    pub fn move_to(&mut self, x: f32, y: f32) -> Result<()> {
        check_finite(x, y)?;
        let target = point(x, y);
        if target != self.pen {
            self.pen = target;
            self.start_new_path()?;
        }
        Ok(())
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> Result<()> {
        check_finite(x, y)?;
        let to = point(x, y);
        self.ensure_current_path()?;
        self.shape.edit_current_path(|path| path.line_to(to));
        self.pen = to;
        self.changed = true;
        Ok(())
    }

    /// Draws a quadratic curve with control point `(cx, cy)` ending at `(ax, ay)`.
    pub fn curve_to(&mut self, cx: f32, cy: f32, ax: f32, ay: f32) -> Result<()> {
        check_finite(cx, cy)?;
        check_finite(ax, ay)?;
        let ctrl = point(cx, cy);
        let to = point(ax, ay);
        self.ensure_current_path()?;
        self.shape.edit_current_path(|path| path.quadratic_to(ctrl, to));
        self.pen = to;
        self.changed = true;
        Ok(())
    }

    /// Empties the shape and resets the pen and selected styles.
    pub fn clear(&mut self) {
        self.shape.clear();
        self.pen = Point::origin();
        self.current_fill = None;
        self.current_line = None;
        self.changed = false;
    }

    /// Checks style references once drawing settles. Does nothing if nothing changed.
    pub fn finalize(&mut self) -> Result<()> {
        if !self.changed {
            return Ok(());
        }
        self.shape.validate()?;
        self.changed = false;
        Ok(())
    }

    fn ensure_current_path(&mut self) -> Result<()> {
        if self.shape.current_path().is_none() {
            self.start_new_path()?;
        }
        Ok(())
    }

    /// Starts a path at the pen carrying the selected fill (as left fill) and stroke.
    /// The previous path is left as is.
    fn start_new_path(&mut self) -> Result<()> {
        trace!(
            "Starting path at ({}, {}) with fill {:?} and line style {:?}",
            self.pen.x,
            self.pen.y,
            self.current_fill,
            self.current_line
        );
        let path = Path::new(self.pen, self.current_fill, None, self.current_line);
        self.shape.add_path(path)
    }
}

impl Outline for DrawingShape {
    fn compute_bound(&self) -> Rect {
        self.shape.compute_bound()
    }

    fn tessellate(&mut self, tolerance: f32) -> Result<&MeshSet> {
        self.shape.tessellate(tolerance)
    }

    fn display(&mut self, renderer: &mut dyn MeshRenderer, tolerance: f32) -> Result<()> {
        self.shape.display(renderer, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Edge;

    #[test]
    fn line_to_without_current_path_starts_at_pen() {
        let mut drawing = DrawingShape::new();
        drawing.line_to(5.0, 5.0).unwrap();
        let paths = drawing.shape().paths();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].start(), point(0.0, 0.0));
        assert_eq!(paths[0].edges(), &[Edge::Line { to: point(5.0, 5.0) }]);
        assert_eq!(drawing.pen(), point(5.0, 5.0));
        assert!(drawing.is_changed());
    }

    #[test]
    fn move_to_same_point_does_not_fragment() {
        let mut drawing = DrawingShape::new();
        drawing.move_to(0.0, 0.0).unwrap();
        assert!(drawing.shape().paths().is_empty());

        drawing.move_to(3.0, 4.0).unwrap();
        drawing.move_to(3.0, 4.0).unwrap();
        assert_eq!(drawing.shape().paths().len(), 1);
        assert_eq!(drawing.shape().paths()[0].start(), point(3.0, 4.0));
    }

    #[test]
    fn new_path_does_not_close_previous_one() {
        let mut drawing = DrawingShape::new();
        drawing.line_to(10.0, 0.0).unwrap();
        drawing.line_to(10.0, 10.0).unwrap();
        drawing.move_to(20.0, 20.0).unwrap();
        drawing.line_to(30.0, 20.0).unwrap();
        let paths = drawing.shape().paths();
        assert_eq!(paths.len(), 2);
        assert!(!paths[0].is_closed());
        assert_eq!(paths[1].start(), point(20.0, 20.0));
    }

    #[test]
    fn begin_fill_closes_previous_fill() {
        let mut drawing = DrawingShape::new();
        drawing.begin_fill(Color::rgb(255, 0, 0)).unwrap();
        drawing.line_to(10.0, 0.0).unwrap();
        drawing.line_to(10.0, 10.0).unwrap();
        drawing.begin_fill(Color::rgb(0, 255, 0)).unwrap();

        let paths = drawing.shape().paths();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].is_closed());
        assert_eq!(paths[0].left_fill.map(FillStyleId::get), Some(1));
        assert_eq!(paths[1].left_fill.map(FillStyleId::get), Some(2));
        assert_eq!(paths[1].right_fill, None);
        assert_eq!(paths[1].start(), point(10.0, 10.0));
    }

    #[test]
    fn end_fill_keeps_line_style() {
        let mut drawing = DrawingShape::new();
        drawing.line_style(3, Color::BLACK).unwrap();
        drawing.begin_fill(Color::WHITE).unwrap();
        drawing.line_to(1.0, 1.0).unwrap();
        drawing.end_fill();
        assert!(drawing.current_fill().is_none());
        assert!(drawing.shape().current_path().is_none());
        assert_eq!(drawing.current_line_style().map(LineStyleId::get), Some(1));

        drawing.line_to(2.0, 0.0).unwrap();
        let last = drawing.shape().paths().last().unwrap();
        assert_eq!(last.left_fill, None);
        assert_eq!(last.line_style.map(LineStyleId::get), Some(1));
    }

    #[test]
    fn zero_width_line_style_clears_stroke() {
        let mut drawing = DrawingShape::new();
        drawing.line_style(2, Color::BLACK).unwrap();
        drawing.line_to(1.0, 0.0).unwrap();
        drawing.line_style(0, Color::BLACK).unwrap();
        drawing.line_to(2.0, 0.0).unwrap();

        assert_eq!(drawing.shape().line_styles().len(), 1);
        let paths = drawing.shape().paths();
        assert_eq!(paths[0].line_style.map(LineStyleId::get), Some(1));
        assert_eq!(paths.last().unwrap().line_style, None);
    }

    #[test]
    fn non_finite_input_is_rejected_before_mutation() {
        let mut drawing = DrawingShape::new();
        drawing.line_to(1.0, 1.0).unwrap();
        let generation = drawing.shape().generation();

        assert!(drawing.line_to(f32::NAN, 0.0).is_err());
        assert!(drawing.curve_to(0.0, 0.0, f32::INFINITY, 0.0).is_err());
        assert!(drawing.move_to(0.0, f32::NEG_INFINITY).is_err());
        assert_eq!(drawing.shape().generation(), generation);
        assert_eq!(drawing.pen(), point(1.0, 1.0));
    }

    #[test]
    fn finalize_clears_changed_flag() {
        let mut drawing = DrawingShape::new();
        drawing.finalize().unwrap();
        drawing.curve_to(1.0, 2.0, 3.0, 0.0).unwrap();
        assert!(drawing.is_changed());
        drawing.finalize().unwrap();
        assert!(!drawing.is_changed());
    }

    #[test]
    fn clear_resets_drawing_state() {
        let mut drawing = DrawingShape::new();
        drawing.begin_fill(Color::BLACK).unwrap();
        drawing.line_style(1, Color::WHITE).unwrap();
        drawing.line_to(4.0, 4.0).unwrap();
        drawing.clear();

        assert_eq!(drawing.pen(), point(0.0, 0.0));
        assert!(drawing.current_fill().is_none());
        assert!(drawing.current_line_style().is_none());
        assert!(drawing.shape().paths().is_empty());
        assert!(drawing.shape().fill_styles().is_empty());

        drawing.begin_fill(Color::BLACK).unwrap();
        assert_eq!(drawing.current_fill().map(FillStyleId::get), Some(1));
    }
}
