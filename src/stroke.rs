use crate::Color;

/// Stroke description referenced by [`LineStyleId`](crate::LineStyleId).
///
/// `width` is in content units. A zero width coming from decoded content is a
/// hairline; the drawing surface never registers one and treats zero as "no stroke".
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineStyle {
    pub width: u16,
    pub color: Color,
}

impl LineStyle {
    #[inline]
    pub fn new(width: u16, color: impl Into<Color>) -> Self {
        Self {
            width,
            color: color.into(),
        }
    }

    /// True for hairlines, which get a polyline but no stroke triangles.
    #[inline]
    pub fn is_hairline(&self) -> bool {
        self.width == 0
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width as f32 * 0.5
    }
}
