use lyon::tessellation::TessellationError;
use thiserror::Error;

pub type Result<T, E = ShapeError> = std::result::Result<T, E>;

/// Everything that can go wrong while building, tessellating or caching a shape.
///
/// Geometry requests are rejected before any state is touched, so an `Err` never
/// leaves a shape or its cached meshes half-updated.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("error tolerance must be finite and greater than zero, got {0}")]
    InvalidTolerance(f32),

    #[error("drawing coordinates must be finite, got ({x}, {y})")]
    NonFiniteCoordinate { x: f32, y: f32 },

    #[error("path {path} references fill style {index}, but only {len} fill styles exist")]
    FillStyleOutOfRange { path: usize, index: usize, len: usize },

    #[error("path {path} references line style {index}, but only {len} line styles exist")]
    LineStyleOutOfRange { path: usize, index: usize, len: usize },

    #[error("style id {0} does not fit the 32-bit cache encoding")]
    StyleIdOverflow(usize),

    #[error("tessellation failed: {0:?}")]
    Tessellation(TessellationError),

    #[error("cache stream I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cached mesh data is corrupt: {0}")]
    CorruptCache(String),

    #[error("unsupported cached mesh format version {0}")]
    UnsupportedCacheVersion(u16),
}

impl From<TessellationError> for ShapeError {
    fn from(error: TessellationError) -> Self {
        ShapeError::Tessellation(error)
    }
}

pub(crate) fn check_tolerance(tolerance: f32) -> Result<()> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(())
    } else {
        Err(ShapeError::InvalidTolerance(tolerance))
    }
}

pub(crate) fn check_finite(x: f32, y: f32) -> Result<()> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(ShapeError::NonFiniteCoordinate { x, y })
    }
}
