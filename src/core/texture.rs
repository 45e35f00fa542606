//! Texture images.

use crate::core::geometry::{Vector2f, Vector4f};
use crate::core::pbrt::*;

/// A linear RGBA image sampled with bilinear filtering and repeat
/// addressing. Texture nodes and the sky model read from a table of these.
#[derive(Clone)]
pub struct Image {
    /// Width in texels.
    width: usize,

    /// Height in texels.
    height: usize,

    /// Row-major texel storage.
    texels: Vec<Vector4f>,
}

impl Image {
    /// Create a new `Image`.
    ///
    /// * `width`  - Width in texels.
    /// * `height` - Height in texels.
    /// * `texels` - Row-major texel data; must hold `width * height`
    ///              entries.
    pub fn new(width: usize, height: usize, texels: Vec<Vector4f>) -> Self {
        assert_eq!(texels.len(), width * height);
        Self { width, height, texels }
    }

    /// Create a single-texel image of a constant color.
    ///
    /// * `color` - The color.
    pub fn constant(color: Vector4f) -> Self {
        Self::new(1, 1, vec![color])
    }

    /// Width in texels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in texels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Reads a texel with repeat addressing.
    ///
    /// * `x` - Texel column, any integer.
    /// * `y` - Texel row, any integer.
    pub fn texel(&self, x: i32, y: i32) -> Vector4f {
        let x = rem(x, self.width as i32) as usize;
        let y = rem(y, self.height as i32) as usize;
        self.texels[y * self.width + x]
    }

    /// Samples the image at normalized coordinates with bilinear filtering
    /// and repeat addressing. Texel centers sit at half-texel offsets.
    ///
    /// * `uv` - Normalized coordinates.
    pub fn sample(&self, uv: &Vector2f) -> Vector4f {
        let x = uv.x * self.width as Float - 0.5;
        let y = uv.y * self.height as Float - 0.5;

        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let x0 = x0 as i32;
        let y0 = y0 as i32;

        let t00 = self.texel(x0, y0);
        let t10 = self.texel(x0 + 1, y0);
        let t01 = self.texel(x0, y0 + 1);
        let t11 = self.texel(x0 + 1, y0 + 1);

        let top = t00 * (1.0 - fx) + t10 * fx;
        let bottom = t01 * (1.0 - fx) + t11 * fx;
        top * (1.0 - fy) + bottom * fy
    }
}
