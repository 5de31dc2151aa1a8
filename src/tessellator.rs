//! Converts outline paths into mesh sets.
//!
//! Quadratic edges are flattened by recursive midpoint subdivision. Closed paths are
//! grouped per fill style (left fills in travel order, right fills reversed) and
//! triangulated with lyon's fill tessellator; stroked paths keep their flattened
//! polyline and get stroke triangles from lyon's stroke tessellator.

use ahash::HashMap;
use lyon::geom::QuadraticBezierSegment;
use lyon::math::Point;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, FillVertexConstructor,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, VertexBuffers,
};
use tracing::{debug, warn};

use crate::error::{check_tolerance, Result, ShapeError};
use crate::mesh::{FillMesh, LineStrip, Mesh, MeshSet, MeshVertex};
use crate::path::{Edge, Path};
use crate::style::StyleRegistry;
use crate::FillStyleId;

/// Tolerance used when callers have no better estimate, in content units.
pub const DEFAULT_TOLERANCE: f32 = 0.25;
/// Default bound on curve subdivision depth.
pub const MAX_SUBDIVISION_DEPTH: u32 = 12;
/// Upper clamp for [`TessellationOptions::with_max_subdivision_depth`].
pub const SUBDIVISION_DEPTH_LIMIT: u32 = 24;

/// Tessellation parameters other than the tolerance.
///
/// ```
/// use shapemesh::{FillRule, TessellationOptions};
///
/// let options = TessellationOptions::default()
///     .with_fill_rule(FillRule::NonZero)
///     .with_max_subdivision_depth(8);
/// assert_eq!(options.max_subdivision_depth, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationOptions {
    pub max_subdivision_depth: u32,
    pub fill_rule: FillRule,
}

impl Default for TessellationOptions {
    fn default() -> Self {
        Self {
            max_subdivision_depth: MAX_SUBDIVISION_DEPTH,
            fill_rule: FillRule::EvenOdd,
        }
    }
}

impl TessellationOptions {
    /// Sets the subdivision bound, clamped to [`SUBDIVISION_DEPTH_LIMIT`].
    pub fn with_max_subdivision_depth(mut self, depth: u32) -> Self {
        self.max_subdivision_depth = depth.min(SUBDIVISION_DEPTH_LIMIT);
        self
    }

    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }
}

/// Appends the flattened points of a quadratic curve starting at `from`, excluding
/// `from` itself, to `out`.
///
/// Returns `false` when the depth bound stopped the subdivision before the tolerance
/// was met.
pub fn flatten_quadratic(
    from: Point,
    ctrl: Point,
    to: Point,
    tolerance: f32,
    max_depth: u32,
    out: &mut Vec<Point>,
) -> bool {
    let segment = QuadraticBezierSegment { from, ctrl, to };
    subdivide(&segment, tolerance, 0, max_depth, out)
}

/// Largest distance between a quadratic curve and its chord.
///
/// The curve deviates from the chord's linear parametrisation by
/// `t(1-t)(2·ctrl - from - to)`, which peaks at `t = 0.5`.
#[inline]
pub fn chord_deviation(segment: &QuadraticBezierSegment<f32>) -> f32 {
    let from = segment.from.to_vector();
    let ctrl = segment.ctrl.to_vector();
    let to = segment.to.to_vector();
    (from - ctrl * 2.0 + to).length() * 0.25
}

fn subdivide(
    segment: &QuadraticBezierSegment<f32>,
    tolerance: f32,
    depth: u32,
    max_depth: u32,
    out: &mut Vec<Point>,
) -> bool {
    if chord_deviation(segment) <= tolerance {
        out.push(segment.to);
        return true;
    }
    if depth >= max_depth {
        out.push(segment.to);
        return false;
    }
    let (first, second) = segment.split(0.5);
    let first_ok = subdivide(&first, tolerance, depth + 1, max_depth, out);
    let second_ok = subdivide(&second, tolerance, depth + 1, max_depth, out);
    first_ok && second_ok
}

/// Path outline as a polyline: start point, then the end of every flattened segment.
///
/// The closing segment of a closed path is implicit and not repeated.
pub(crate) fn flatten_path(
    path: &Path,
    tolerance: f32,
    max_depth: u32,
    out: &mut Vec<Point>,
) -> bool {
    out.clear();
    out.push(path.start());
    let mut within_tolerance = true;
    let mut pen = path.start();
    for edge in path.edges() {
        match *edge {
            Edge::Line { to } => out.push(to),
            Edge::Quadratic { ctrl, to } => {
                within_tolerance &= flatten_quadratic(pen, ctrl, to, tolerance, max_depth, out);
            }
        }
        pen = edge.to();
    }
    if path.is_closed() && out.len() > 1 && out.last() == out.first() {
        out.pop();
    }
    within_tolerance
}

/// Checks that every path has finite coordinates and only references styles present
/// in `styles`.
pub fn validate_paths(paths: &[Path], styles: &StyleRegistry) -> Result<()> {
    paths.iter().try_for_each(Path::check_finite)?;
    validate_style_refs(paths, styles)
}

/// Checks that every style id referenced by `paths` exists in `styles`.
pub fn validate_style_refs(paths: &[Path], styles: &StyleRegistry) -> Result<()> {
    for (index, path) in paths.iter().enumerate() {
        for fill in [path.left_fill, path.right_fill].into_iter().flatten() {
            if !styles.contains_fill(fill) {
                return Err(ShapeError::FillStyleOutOfRange {
                    path: index,
                    index: fill.get(),
                    len: styles.fill_styles().len(),
                });
            }
        }
        if let Some(line) = path.line_style {
            if !styles.contains_line(line) {
                return Err(ShapeError::LineStyleOutOfRange {
                    path: index,
                    index: line.get(),
                    len: styles.line_styles().len(),
                });
            }
        }
    }
    Ok(())
}

struct VertexConverter;

impl FillVertexConstructor<MeshVertex> for VertexConverter {
    fn new_vertex(&mut self, vertex: FillVertex) -> MeshVertex {
        vertex.position().into()
    }
}

impl StrokeVertexConstructor<MeshVertex> for VertexConverter {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> MeshVertex {
        vertex.position().into()
    }
}

fn append_polygon<'a>(builder: &mut lyon::path::Builder, points: impl Iterator<Item = &'a Point>) {
    let mut points = points;
    if let Some(first) = points.next() {
        builder.begin(*first);
        for point in points {
            builder.line_to(*point);
        }
        builder.end(true);
    }
}

/// Distinct consecutive points in a closed outline, not counting the implicit closing
/// point.
fn has_area(outline: &[Point]) -> bool {
    let mut distinct = outline.windows(2).filter(|pair| pair[0] != pair[1]).count();
    if outline.first() != outline.last() {
        distinct += 1;
    }
    distinct >= 3
}

/// Tessellates `paths` against `styles` at `tolerance`.
///
/// This is a pure function of its inputs; shapes cache its result.
pub fn tessellate(
    paths: &[Path],
    styles: &StyleRegistry,
    tolerance: f32,
    options: &TessellationOptions,
) -> Result<MeshSet> {
    check_tolerance(tolerance)?;
    validate_paths(paths, styles)?;

    let max_depth = options.max_subdivision_depth.min(SUBDIVISION_DEPTH_LIMIT);
    let mut regions: HashMap<FillStyleId, lyon::path::Builder> = HashMap::default();
    let mut strips = Vec::new();
    let mut outline = Vec::new();
    let mut depth_limited_paths = 0usize;

    let mut stroke_tessellator = StrokeTessellator::new();

    for path in paths {
        if path.is_empty() {
            continue;
        }
        if !flatten_path(path, tolerance, max_depth, &mut outline) {
            depth_limited_paths += 1;
        }

        if path.is_closed() && path.has_fill() && has_area(&outline) {
            if let Some(left) = path.left_fill {
                let builder = regions.entry(left).or_insert_with(lyon::path::Path::builder);
                append_polygon(builder, outline.iter());
            }
            if let Some(right) = path.right_fill {
                let builder = regions
                    .entry(right)
                    .or_insert_with(lyon::path::Path::builder);
                append_polygon(builder, outline.iter().rev());
            }
        }

        let Some(line) = path.line_style else {
            continue;
        };
        let width = styles.line_style(line).map_or(0, |style| style.width);
        let mut mesh = Mesh::new();
        if width > 0 {
            let mut stroke_path = lyon::path::Path::builder();
            stroke_path.begin(outline[0]);
            for point in &outline[1..] {
                stroke_path.line_to(*point);
            }
            stroke_path.end(path.is_closed());
            let stroke_path = stroke_path.build();

            let mut buffers: VertexBuffers<MeshVertex, u32> = VertexBuffers::new();
            stroke_tessellator.tessellate_path(
                &stroke_path,
                &StrokeOptions::tolerance(tolerance).with_line_width(width as f32),
                &mut BuffersBuilder::new(&mut buffers, VertexConverter),
            )?;
            mesh = buffers.into();
        }
        strips.push(LineStrip {
            style: line,
            points: outline.clone(),
            closed: path.is_closed(),
            mesh,
        });
    }

    if depth_limited_paths > 0 {
        warn!(
            "Curve subdivision hit the depth limit of {} in {} path(s); tolerance {} not met",
            max_depth, depth_limited_paths, tolerance
        );
    }

    let mut regions: Vec<(FillStyleId, lyon::path::Builder)> = regions.into_iter().collect();
    regions.sort_unstable_by_key(|(style, _)| *style);

    let mut fill_tessellator = FillTessellator::new();
    let fill_options = FillOptions::tolerance(tolerance).with_fill_rule(options.fill_rule);
    let mut fills = Vec::with_capacity(regions.len());
    for (style, builder) in regions {
        let region = builder.build();
        let mut buffers: VertexBuffers<MeshVertex, u32> = VertexBuffers::new();
        fill_tessellator.tessellate_path(
            &region,
            &fill_options,
            &mut BuffersBuilder::new(&mut buffers, VertexConverter),
        )?;
        fills.push(FillMesh {
            style,
            mesh: buffers.into(),
        });
    }

    let mesh_set = MeshSet {
        tolerance,
        fills,
        strips,
    };
    debug!(
        "Tessellated {} path(s) at tolerance {}: {} fill mesh(es), {} line strip(s), {} triangle(s)",
        paths.len(),
        tolerance,
        mesh_set.fills.len(),
        mesh_set.strips.len(),
        mesh_set.triangle_count()
    );
    Ok(mesh_set)
}
