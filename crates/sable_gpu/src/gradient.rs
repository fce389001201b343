//! Gradient stop rasterization
//!
//! Gradients are rasterized into a 256-wide 1D RGBA lookup texture that the
//! fragment shader samples with the gradient parameter t, the standard
//! Skia/Cairo technique. Render settings own one such texture per gradient
//! fill; this module produces the pixel data.

use sable_paint::{Color, GradientStop};

/// Width of the gradient lookup texture
pub const GRADIENT_TEXTURE_WIDTH: u32 = 256;

/// Rasterized gradient data ready for GPU upload
pub struct RasterizedGradient {
    /// RGBA pixel data (256 * 4 bytes)
    pub pixels: [u8; GRADIENT_TEXTURE_WIDTH as usize * 4],
}

impl RasterizedGradient {
    /// Rasterize gradient stops into a 256-wide texture, clamping at the ends
    pub fn from_stops(stops: &[GradientStop]) -> Self {
        let mut pixels = [0u8; GRADIENT_TEXTURE_WIDTH as usize * 4];

        if stops.is_empty() {
            // All transparent
            return Self { pixels };
        }

        for i in 0..GRADIENT_TEXTURE_WIDTH as usize {
            let t = i as f32 / (GRADIENT_TEXTURE_WIDTH - 1) as f32;
            let color = sample_gradient(stops, t);

            pixels[i * 4] = (color.r * 255.0).clamp(0.0, 255.0) as u8;
            pixels[i * 4 + 1] = (color.g * 255.0).clamp(0.0, 255.0) as u8;
            pixels[i * 4 + 2] = (color.b * 255.0).clamp(0.0, 255.0) as u8;
            pixels[i * 4 + 3] = (color.a * 255.0).clamp(0.0, 255.0) as u8;
        }

        Self { pixels }
    }
}

/// Sample the stop list at parameter `t`, holding the end colors outside
/// the covered range
fn sample_gradient(stops: &[GradientStop], t: f32) -> Color {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Color::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }

    for pair in stops.windows(2) {
        let (s0, s1) = (pair[0], pair[1]);
        if t > s1.offset {
            continue;
        }
        let span = s1.offset - s0.offset;
        if span <= f32::EPSILON {
            // Coincident stops read as a hard edge
            return s0.color;
        }
        return lerp_color(s0.color, s1.color, (t - s0.offset) / span);
    }

    last.color
}

/// Component-wise blend of two colors
fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    Color {
        r: a.r + (b.r - a.r) * t,
        g: a.g + (b.g - a.g) * t,
        b: a.b + (b.b - a.b) * t,
        a: a.a + (b.a - a.a) * t,
    }
}
