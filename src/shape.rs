//! The `shape` module holds [`ShapeDef`], the container that owns a shape's paths and
//! style tables, keeps its bounds current and caches its tessellation.
//!
//! # Examples
//!
//! Loading decoded content and tessellating it:
//!
//! ```rust
//! use lyon::math::point;
//! use shapemesh::{Color, FillStyle, Outline, Path, ShapeDef, StyleRegistry};
//!
//! let mut styles = StyleRegistry::new();
//! let fill = styles.add_fill_style(FillStyle::solid(Color::rgb(255, 0, 0)));
//!
//! let mut triangle = Path::new(point(0.0, 0.0), Some(fill), None, None);
//! triangle.line_to(point(50.0, 10.0));
//! triangle.line_to(point(50.0, 50.0));
//! triangle.close();
//!
//! let mut shape = ShapeDef::from_parts(
//!     vec![triangle],
//!     styles.fill_styles().to_vec(),
//!     styles.line_styles().to_vec(),
//! )
//! .unwrap();
//!
//! let meshes = shape.tessellate(0.25).unwrap();
//! assert_eq!(meshes.fills.len(), 1);
//! ```

use std::io::{Read, Write};

use lyon::math::{Box2D, Point};
use tracing::debug;

use crate::cache::{
    read_mesh_sets, validate_mesh_style_refs, write_mesh_sets, CacheOptions, MeshCache,
};
use crate::error::{check_tolerance, Result, ShapeError};
use crate::mesh::MeshSet;
use crate::path::Path;
use crate::style::StyleRegistry;
use crate::tessellator::{self, validate_paths, validate_style_refs, TessellationOptions};
use crate::{hit_test, FillStyle, FillStyleId, LineStyle, LineStyleId};

/// Axis-aligned bounds in content space.
pub type Rect = Box2D;

/// Receives tessellated shapes. Implemented by rasterizers.
pub trait MeshRenderer {
    fn draw_mesh_set(
        &mut self,
        meshes: &MeshSet,
        fill_styles: &[FillStyle],
        line_styles: &[LineStyle],
    );
}

/// Something that can be measured, tessellated and drawn.
pub trait Outline {
    /// Smallest rectangle containing every point of every path, control points
    /// included. Empty outlines yield `Rect::zero()`.
    fn compute_bound(&self) -> Rect;

    /// Mesh set for `tolerance`, served from the cache when still valid.
    fn tessellate(&mut self, tolerance: f32) -> Result<&MeshSet>;

    /// Tessellates if needed and hands the meshes and style tables to `renderer`.
    fn display(&mut self, renderer: &mut dyn MeshRenderer, tolerance: f32) -> Result<()>;
}

/// A shape definition: ordered paths (paint order), their styles and cached
/// derived data.
///
/// Every mutation bumps [`ShapeDef::generation`] and drops cached meshes; the next
/// [`Outline::tessellate`] call recomputes them.
#[derive(Default)]
pub struct ShapeDef {
    paths: Vec<Path>,
    styles: StyleRegistry,
    current_path: Option<usize>,
    bound: Option<Rect>,
    generation: u64,
    options: TessellationOptions,
    cache: MeshCache,
}

impl std::fmt::Debug for ShapeDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeDef")
            .field("paths", &self.paths)
            .field("styles", &self.styles)
            .field("bound", &self.bound)
            .field("generation", &self.generation)
            .field("cached", &self.cache.mesh_set().is_some())
            .finish()
    }
}

impl ShapeDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TessellationOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Builds a shape from decoded content, rejecting non-finite coordinates and
    /// style ids that point past the style tables.
    pub fn from_parts(
        paths: Vec<Path>,
        fill_styles: Vec<FillStyle>,
        line_styles: Vec<LineStyle>,
    ) -> Result<Self> {
        let styles = StyleRegistry::from_parts(fill_styles, line_styles);
        validate_paths(&paths, &styles)?;
        let mut shape = Self {
            paths,
            styles,
            ..Self::default()
        };
        shape.bound = shape.bound_of_paths();
        Ok(shape)
    }

    pub fn options(&self) -> &TessellationOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: TessellationOptions) {
        if self.options != options {
            self.options = options;
            self.cache.invalidate();
        }
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn fill_styles(&self) -> &[FillStyle] {
        self.styles.fill_styles()
    }

    pub fn line_styles(&self) -> &[LineStyle] {
        self.styles.line_styles()
    }

    /// Cached bounds; always equal to [`Outline::compute_bound`].
    pub fn bound(&self) -> Rect {
        self.bound.unwrap_or_else(Rect::zero)
    }

    pub fn width(&self) -> f32 {
        self.bound().width()
    }

    pub fn height(&self) -> f32 {
        self.bound().height()
    }

    /// Version token, bumped by every mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when no mesh set for the current geometry is cached.
    pub fn is_dirty(&self) -> bool {
        !self.cache.is_fresh_for(self.generation)
    }

    /// The cached mesh set, if any, without tessellating.
    pub fn cached_meshes(&self) -> Option<&MeshSet> {
        self.cache.mesh_set()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.and_then(|index| self.paths.get(index))
    }

    pub fn add_fill_style(&mut self, style: FillStyle) -> FillStyleId {
        self.touch();
        self.styles.add_fill_style(style)
    }

    pub fn add_line_style(&mut self, style: LineStyle) -> LineStyleId {
        self.touch();
        self.styles.add_line_style(style)
    }

    /// Appends a copy of `path` and makes it the current path.
    pub fn add_path(&mut self, path: Path) -> Result<()> {
        path.check_finite()?;
        validate_style_refs(std::slice::from_ref(&path), &self.styles).map_err(|error| {
            reindex_path_error(error, self.paths.len())
        })?;
        self.extend_bound(path.bounding_box());
        self.paths.push(path);
        self.current_path = Some(self.paths.len() - 1);
        self.touch();
        Ok(())
    }

    /// Replaces every path, keeping the style tables. Used by shape variants that
    /// derive their geometry elsewhere, such as morphs.
    pub fn replace_paths(&mut self, paths: Vec<Path>) -> Result<()> {
        validate_paths(&paths, &self.styles)?;
        self.paths = paths;
        self.current_path = None;
        self.bound = self.bound_of_paths();
        self.touch();
        Ok(())
    }

    /// Replaces both style tables. Existing paths must stay within the new tables.
    pub fn replace_styles(
        &mut self,
        fill_styles: Vec<FillStyle>,
        line_styles: Vec<LineStyle>,
    ) -> Result<()> {
        let styles = StyleRegistry::from_parts(fill_styles, line_styles);
        validate_style_refs(&self.paths, &styles)?;
        self.styles = styles;
        self.touch();
        Ok(())
    }

    /// Checks every path's coordinates and style ids.
    pub fn validate(&self) -> Result<()> {
        validate_paths(&self.paths, &self.styles)
    }

    /// Drops paths, styles, bounds and cached meshes.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.styles.clear();
        self.current_path = None;
        self.bound = None;
        self.touch();
    }

    /// Hit test in content space. See [`hit_test`](crate::hit_test).
    pub fn point_test(&self, point: Point) -> bool {
        hit_test::shape_contains(self, point)
    }

    /// Serializes the cached mesh sets. Writes an empty set list when nothing is
    /// cached.
    pub fn output_cached_data(&self, out: &mut impl Write, options: &CacheOptions) -> Result<()> {
        let cached = self.cache.mesh_set();
        debug!(
            "Writing {} cached mesh set(s) for shape generation {}",
            cached.iter().len(),
            self.generation
        );
        write_mesh_sets(out, cached.into_iter(), options)
    }

    /// Restores mesh sets written by [`ShapeDef::output_cached_data`] without
    /// tessellating. They are trusted to match the current geometry, but style ids
    /// must exist in the current style tables.
    ///
    /// On error the shape, including its cache, is left untouched.
    pub fn input_cached_data(&mut self, input: &mut impl Read) -> Result<()> {
        let mut mesh_sets = read_mesh_sets(input)?;
        if mesh_sets.len() > 1 {
            return Err(ShapeError::CorruptCache(format!(
                "expected at most one mesh set, found {}",
                mesh_sets.len()
            )));
        }
        match mesh_sets.pop() {
            Some(meshes) => {
                validate_mesh_style_refs(&meshes, &self.styles)?;
                self.cache.store(meshes, self.options, self.generation)
            }
            None => self.cache.invalidate(),
        }
        Ok(())
    }

    /// Applies `edit` to the current path, if there is one, and updates bounds and
    /// cache state.
    pub(crate) fn edit_current_path<R>(&mut self, edit: impl FnOnce(&mut Path) -> R) -> Option<R> {
        let index = self.current_path?;
        let path = self.paths.get_mut(index)?;
        let result = edit(path);
        let bounds = path.bounding_box();
        self.extend_bound(bounds);
        self.touch();
        Some(result)
    }

    pub(crate) fn forget_current_path(&mut self) {
        self.current_path = None;
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.cache.invalidate();
    }

    fn extend_bound(&mut self, bounds: Rect) {
        self.bound = Some(match self.bound {
            Some(current) => merge_bounds(current, bounds),
            None => bounds,
        });
    }

    fn bound_of_paths(&self) -> Option<Rect> {
        self.paths
            .iter()
            .map(Path::bounding_box)
            .reduce(merge_bounds)
    }
}

/// Union that keeps zero-area boxes. `Box2D::union` skips empty operands, which would
/// drop points, axis-aligned lines and flat paths from the bound.
fn merge_bounds(a: Rect, b: Rect) -> Rect {
    Rect::new(a.min.min(b.min), a.max.max(b.max))
}

fn reindex_path_error(error: ShapeError, path: usize) -> ShapeError {
    match error {
        ShapeError::FillStyleOutOfRange { index, len, .. } => {
            ShapeError::FillStyleOutOfRange { path, index, len }
        }
        ShapeError::LineStyleOutOfRange { index, len, .. } => {
            ShapeError::LineStyleOutOfRange { path, index, len }
        }
        other => other,
    }
}

impl Outline for ShapeDef {
    fn compute_bound(&self) -> Rect {
        self.bound_of_paths().unwrap_or_else(Rect::zero)
    }

    fn tessellate(&mut self, tolerance: f32) -> Result<&MeshSet> {
        check_tolerance(tolerance)?;
        let (paths, styles, options) = (&self.paths, &self.styles, &self.options);
        self.cache
            .get_or_try_insert_with(tolerance, options, self.generation, || {
                tessellator::tessellate(paths, styles, tolerance, options)
            })
    }

    fn display(&mut self, renderer: &mut dyn MeshRenderer, tolerance: f32) -> Result<()> {
        self.tessellate(tolerance)?;
        if let Some(meshes) = self.cache.mesh_set() {
            renderer.draw_mesh_set(meshes, self.styles.fill_styles(), self.styles.line_styles());
        }
        Ok(())
    }
}
