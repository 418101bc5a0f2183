//! RGB colors.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A color from red, green and blue intensities in 0..=255.
///
/// Colors compare by value so they can label the cells of a world grid.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Intensities scaled to [0, 1].
    pub fn to_unit(&self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.,
            f32::from(self.g) / 255.,
            f32::from(self.b) / 255.,
        ]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb = [{}, {}, {}]", self.r, self.g, self.b)
    }
}
