//! Fill and line style tables.
//!
//! Paths reference styles by 1-based id. Ids are handed out in append order and are
//! never renumbered, so a path built against an id keeps pointing at the same style
//! until the registry is cleared.

use std::fmt;
use std::num::NonZeroUsize;

use crate::error::{Result, ShapeError};
use crate::{Color, LineStyle};

macro_rules! style_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(NonZeroUsize);

        impl $name {
            /// Id of the style stored at zero-based `position` in its table.
            pub fn from_position(position: usize) -> Self {
                Self(NonZeroUsize::MIN.saturating_add(position))
            }

            /// Builds an id from its 1-based value; `0` is not a valid id.
            pub fn new(one_based: usize) -> Option<Self> {
                NonZeroUsize::new(one_based).map(Self)
            }

            /// The 1-based value, as stored by encoded content.
            pub fn get(self) -> usize {
                self.0.get()
            }

            /// Zero-based position in the style table.
            pub fn position(self) -> usize {
                self.0.get() - 1
            }

            /// Encodes an optional id with `0` standing for "no style".
            pub fn to_wire(id: Option<Self>) -> Result<u32> {
                match id {
                    None => Ok(0),
                    Some(id) => {
                        u32::try_from(id.get()).map_err(|_| ShapeError::StyleIdOverflow(id.get()))
                    }
                }
            }

            /// Decodes the 1-based wire value; `0` maps to `None`.
            pub fn from_wire(value: u32) -> Option<Self> {
                Self::new(value as usize)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

style_id!(
    /// 1-based index into a shape's fill style table.
    FillStyleId
);
style_id!(
    /// 1-based index into a shape's line style table.
    LineStyleId
);

/// Payload of a fill variant whose contents belong to the content decoder.
///
/// The crate stores and returns these bytes untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct OpaqueFill(pub Vec<u8>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FillStyle {
    Solid(Color),
    Gradient(OpaqueFill),
    Bitmap(OpaqueFill),
}

impl FillStyle {
    pub fn solid(color: impl Into<Color>) -> Self {
        FillStyle::Solid(color.into())
    }

    /// The color of a solid fill, `None` for gradients and bitmaps.
    pub fn solid_color(&self) -> Option<Color> {
        match self {
            FillStyle::Solid(color) => Some(*color),
            FillStyle::Gradient(_) | FillStyle::Bitmap(_) => None,
        }
    }
}

/// Append-only fill and line style tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleRegistry {
    fill_styles: Vec<FillStyle>,
    line_styles: Vec<LineStyle>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(fill_styles: Vec<FillStyle>, line_styles: Vec<LineStyle>) -> Self {
        Self {
            fill_styles,
            line_styles,
        }
    }

    /// Appends `style` and returns its id.
    ///
    /// Identical styles are not merged: every call yields the next id.
    pub fn add_fill_style(&mut self, style: FillStyle) -> FillStyleId {
        self.fill_styles.push(style);
        FillStyleId::from_position(self.fill_styles.len() - 1)
    }

    /// Appends `style` and returns its id. See [`StyleRegistry::add_fill_style`].
    pub fn add_line_style(&mut self, style: LineStyle) -> LineStyleId {
        self.line_styles.push(style);
        LineStyleId::from_position(self.line_styles.len() - 1)
    }

    pub fn fill_style(&self, id: FillStyleId) -> Option<&FillStyle> {
        self.fill_styles.get(id.position())
    }

    pub fn line_style(&self, id: LineStyleId) -> Option<&LineStyle> {
        self.line_styles.get(id.position())
    }

    pub fn fill_styles(&self) -> &[FillStyle] {
        &self.fill_styles
    }

    pub fn line_styles(&self) -> &[LineStyle] {
        &self.line_styles
    }

    pub fn contains_fill(&self, id: FillStyleId) -> bool {
        id.get() <= self.fill_styles.len()
    }

    pub fn contains_line(&self, id: LineStyleId) -> bool {
        id.get() <= self.line_styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fill_styles.is_empty() && self.line_styles.is_empty()
    }

    pub fn clear(&mut self) {
        self.fill_styles.clear();
        self.line_styles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_append_position() {
        let mut registry = StyleRegistry::new();
        let ids: Vec<usize> = (0..5)
            .map(|i| registry.add_fill_style(FillStyle::solid(Color::rgb(i, 0, 0))).get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let first_line = registry.add_line_style(LineStyle::new(1, Color::BLACK));
        let second_line = registry.add_line_style(LineStyle::new(1, Color::BLACK));
        assert_eq!(first_line.get(), 1);
        assert_eq!(second_line.get(), 2);
        assert_eq!(
            registry.line_style(second_line),
            Some(&LineStyle::new(1, Color::BLACK))
        );
    }

    #[test]
    fn identical_styles_are_not_merged() {
        let mut registry = StyleRegistry::new();
        let a = registry.add_fill_style(FillStyle::solid(Color::WHITE));
        let b = registry.add_fill_style(FillStyle::solid(Color::WHITE));
        assert_ne!(a, b);
        assert_eq!(registry.fill_styles().len(), 2);
    }

    #[test]
    fn range_checks_use_one_based_ids() {
        let mut registry = StyleRegistry::new();
        let id = registry.add_fill_style(FillStyle::solid(Color::BLACK));
        assert!(registry.contains_fill(id));
        assert!(!registry.contains_fill(FillStyleId::from_position(1)));
        assert!(!registry.contains_line(LineStyleId::from_position(0)));
    }

    #[test]
    fn wire_encoding_reserves_zero_for_none() {
        assert_eq!(FillStyleId::to_wire(None).unwrap(), 0);
        let id = FillStyleId::from_position(2);
        assert_eq!(LineStyleId::to_wire(LineStyleId::new(7)).unwrap(), 7);
        assert_eq!(FillStyleId::to_wire(Some(id)).unwrap(), 3);
        assert_eq!(FillStyleId::from_wire(3), Some(id));
        assert_eq!(FillStyleId::from_wire(0), None);
    }

    #[test]
    fn clear_empties_both_tables() {
        let mut registry = StyleRegistry::new();
        registry.add_fill_style(FillStyle::Bitmap(OpaqueFill(vec![1, 2, 3])));
        registry.add_line_style(LineStyle::new(3, Color::WHITE));
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(
            registry.add_fill_style(FillStyle::solid(Color::BLACK)).get(),
            1
        );
    }
}
