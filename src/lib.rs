//! Quadratic outline shapes: styled paths, an incremental drawing surface, a
//! tolerance-driven tessellator and a persistent cache of its output.

mod cache;
mod color;
mod drawing;
mod error;
pub mod hit_test;
mod mesh;
mod path;
mod shape;
mod stroke;
mod style;
pub mod tessellator;

pub use cache::{CacheOptions, CACHE_FORMAT_VERSION};
pub use color::Color;
pub use drawing::DrawingShape;
pub use error::{Result, ShapeError};
pub use lyon::math::{point, Point};
pub use lyon::tessellation::FillRule;
pub use mesh::{FillMesh, LineStrip, Mesh, MeshSet, MeshVertex};
pub use path::{Edge, Path};
pub use shape::{MeshRenderer, Outline, Rect, ShapeDef};
pub use stroke::LineStyle;
pub use style::{FillStyle, FillStyleId, LineStyleId, OpaqueFill, StyleRegistry};
pub use tessellator::{TessellationOptions, DEFAULT_TOLERANCE, MAX_SUBDIVISION_DEPTH};
