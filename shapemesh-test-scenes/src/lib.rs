pub mod scene;

pub use scene::{
    circle, curve_fan, donut, filled_square, stroked_arc, two_tone_square, BLUE, RED,
};
