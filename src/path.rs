//! Outline paths made of straight and quadratic edges.

use lyon::math::{Box2D, Point};
use smallvec::SmallVec;

use crate::error::{Result, ShapeError};
use crate::{FillStyleId, LineStyleId};

/// One segment of a [`Path`], starting where the previous one ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    Line { to: Point },
    Quadratic { ctrl: Point, to: Point },
}

impl Edge {
    #[inline]
    pub fn to(&self) -> Point {
        match *self {
            Edge::Line { to } | Edge::Quadratic { to, .. } => to,
        }
    }

    #[inline]
    pub fn is_curve(&self) -> bool {
        matches!(self, Edge::Quadratic { .. })
    }
}

/// An ordered run of edges sharing the same fill and stroke assignment.
///
/// `left_fill` paints the region on the left of the direction of travel and
/// `right_fill` the region on the right. A closed path ends with an implicit straight
/// segment back to `start`; closing never appends an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    start: Point,
    edges: SmallVec<[Edge; 8]>,
    pub left_fill: Option<FillStyleId>,
    pub right_fill: Option<FillStyleId>,
    pub line_style: Option<LineStyleId>,
    closed: bool,
}

impl Path {
    pub fn new(
        start: Point,
        left_fill: Option<FillStyleId>,
        right_fill: Option<FillStyleId>,
        line_style: Option<LineStyleId>,
    ) -> Self {
        Self {
            start,
            edges: SmallVec::new(),
            left_fill,
            right_fill,
            line_style,
            closed: false,
        }
    }

    /// Appends a straight edge. Appending to a closed path reopens it.
    pub fn line_to(&mut self, to: Point) {
        self.edges.push(Edge::Line { to });
        self.closed = false;
    }

    /// Appends a quadratic edge. Appending to a closed path reopens it.
    pub fn quadratic_to(&mut self, ctrl: Point, to: Point) {
        self.edges.push(Edge::Quadratic { ctrl, to });
        self.closed = false;
    }

    pub fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
        self.closed = false;
    }

    /// Marks the path closed. Paths without edges stay open.
    pub fn close(&mut self) {
        if !self.edges.is_empty() {
            self.closed = true;
        }
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Where the pen rests after the last edge.
    pub fn end_point(&self) -> Point {
        self.edges.last().map_or(self.start, Edge::to)
    }

    pub fn has_fill(&self) -> bool {
        self.left_fill.is_some() || self.right_fill.is_some()
    }

    /// Start point followed by every control and end point, in order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        std::iter::once(self.start).chain(self.edges.iter().flat_map(|edge| {
            let (first, second) = match *edge {
                Edge::Line { to } => (to, None),
                Edge::Quadratic { ctrl, to } => (ctrl, Some(to)),
            };
            std::iter::once(first).chain(second)
        }))
    }

    /// Conservative bounds: curves are bounded by their control polygon. Flat paths
    /// give a zero-area box that still spans their extent.
    pub fn bounding_box(&self) -> Box2D {
        Box2D::from_points(self.points())
    }

    /// Rejects paths holding a NaN or infinite coordinate, reporting the first one.
    pub fn check_finite(&self) -> Result<()> {
        match self.points().find(|p| !(p.x.is_finite() && p.y.is_finite())) {
            Some(p) => Err(ShapeError::NonFiniteCoordinate { x: p.x, y: p.y }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyon::math::point;

    #[test]
    fn close_keeps_edge_count() {
        let mut path = Path::new(point(0.0, 0.0), None, None, None);
        path.line_to(point(10.0, 0.0));
        path.line_to(point(10.0, 10.0));
        path.close();
        assert!(path.is_closed());
        assert_eq!(path.edges().len(), 2);

        path.line_to(point(0.0, 10.0));
        assert!(!path.is_closed());
    }

    #[test]
    fn empty_path_cannot_be_closed() {
        let mut path = Path::new(point(3.0, 4.0), None, None, None);
        path.close();
        assert!(!path.is_closed());
        assert_eq!(path.end_point(), point(3.0, 4.0));
    }

    #[test]
    fn points_include_control_points() {
        let mut path = Path::new(point(0.0, 0.0), None, None, None);
        path.quadratic_to(point(5.0, 10.0), point(10.0, 0.0));
        path.line_to(point(10.0, -2.0));
        let points: Vec<Point> = path.points().collect();
        assert_eq!(
            points,
            vec![
                point(0.0, 0.0),
                point(5.0, 10.0),
                point(10.0, 0.0),
                point(10.0, -2.0)
            ]
        );
        let bounds = path.bounding_box();
        assert_eq!(bounds.min, point(0.0, -2.0));
        assert_eq!(bounds.max, point(10.0, 10.0));
    }

    #[test]
    fn flat_path_box_spans_its_extent() {
        let mut path = Path::new(point(0.0, 20.0), None, None, None);
        path.line_to(point(30.0, 20.0));
        let bounds = path.bounding_box();
        assert_eq!(bounds.min, point(0.0, 20.0));
        assert_eq!(bounds.max, point(30.0, 20.0));
    }

    #[test]
    fn non_finite_points_are_reported() {
        let mut path = Path::new(point(0.0, 0.0), None, None, None);
        path.line_to(point(10.0, 0.0));
        assert!(path.check_finite().is_ok());

        path.quadratic_to(point(f32::NAN, 10.0), point(0.0, 10.0));
        assert!(matches!(
            path.check_finite(),
            Err(ShapeError::NonFiniteCoordinate { y, .. }) if y == 10.0
        ));
    }
}
