/// An RGBA color with 8-bit channels.
///
/// Fill and line styles carry colors verbatim; the crate never converts between color
/// spaces, that is left to the rasterizer.
///
/// # Examples
///
/// ```
/// use shapemesh::Color;
///
/// let red = Color::rgb(255, 0, 0);
/// assert_eq!(red.normalize(), [1.0, 0.0, 0.0, 1.0]);
///
/// let semi_blue = Color::rgba(0, 0, 255, 128);
/// assert_eq!(semi_blue.to_array(), [0, 0, 255, 128]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub [u8; 4]);

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);
    /// Opaque black.
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    /// Opaque white.
    pub const WHITE: Self = Self([255, 255, 255, 255]);

    /// Creates an opaque color.
    ///
    /// ```
    /// use shapemesh::Color;
    ///
    /// assert_eq!(Color::rgb(0, 255, 0), Color([0, 255, 0, 255]));
    /// ```
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Creates a color with an explicit alpha channel, where 0 is fully transparent.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Builds a color from a packed `0xRRGGBB` value as handed over by scripting
    /// runtimes, together with an alpha byte.
    ///
    /// ```
    /// use shapemesh::Color;
    ///
    /// assert_eq!(Color::from_rgb_u32(0xff8000, 255), Color::rgb(255, 128, 0));
    /// ```
    pub const fn from_rgb_u32(rgb: u32, alpha: u8) -> Self {
        Self([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, alpha])
    }

    /// Channel values scaled to `[0.0, 1.0]`.
    pub fn normalize(&self) -> [f32; 4] {
        [
            self.0[0] as f32 / 255.0,
            self.0[1] as f32 / 255.0,
            self.0[2] as f32 / 255.0,
            self.0[3] as f32 / 255.0,
        ]
    }

    pub fn to_array(&self) -> [u8; 4] {
        self.0
    }

    pub fn alpha(&self) -> u8 {
        self.0[3]
    }
}
