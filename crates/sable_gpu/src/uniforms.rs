//! Uniform buffer layouts shared with the shaders
//!
//! Every struct here is `#[repr(C)]` + `Pod` and padded to 16-byte WGSL
//! alignment so it can be written with `bytemuck::bytes_of`.

use sable_paint::{Color, ColorFormat, Point, Transform2D};

/// Model transform for one paint record (column-major mat4)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub matrix: [f32; 16],
}

impl From<&Transform2D> for ModelUniform {
    fn from(transform: &Transform2D) -> Self {
        Self {
            matrix: transform.to_mat4(),
        }
    }
}

/// Blend settings for one paint record
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlendUniform {
    /// Target pixel layout: 0 = RGBA8, 1 = BGRA8
    pub format: u32,
    /// Paint opacity in 0.0..=1.0
    pub opacity: f32,
    pub _pad: [f32; 2],
}

impl BlendUniform {
    pub fn new(format: ColorFormat, opacity: f32) -> Self {
        Self {
            format: match format {
                ColorFormat::Rgba8 => 0,
                ColorFormat::Bgra8 => 1,
            },
            opacity,
            _pad: [0.0; 2],
        }
    }
}

/// Solid fill color
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SolidUniform {
    pub color: [f32; 4],
}

impl From<Color> for SolidUniform {
    fn from(color: Color) -> Self {
        Self {
            color: color.to_array(),
        }
    }
}

/// Gradient mapping parameters
///
/// Linear gradients store `p0 = start`, `p1 = end`. Radial gradients store
/// `p0 = center`, `p1 = (radius, 0)`. The shader picks the interpretation
/// from the pipeline it was compiled for.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GradientUniform {
    pub p0: [f32; 2],
    pub p1: [f32; 2],
}

impl GradientUniform {
    pub fn linear(start: Point, end: Point) -> Self {
        Self {
            p0: start.to_array(),
            p1: end.to_array(),
        }
    }

    pub fn radial(center: Point, radius: f32) -> Self {
        Self {
            p0: center.to_array(),
            p1: [radius, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_wgsl_aligned() {
        assert_eq!(std::mem::size_of::<ModelUniform>(), 64);
        assert_eq!(std::mem::size_of::<BlendUniform>(), 16);
        assert_eq!(std::mem::size_of::<SolidUniform>(), 16);
        assert_eq!(std::mem::size_of::<GradientUniform>(), 16);
    }

    #[test]
    fn test_blend_uniform_format_tag() {
        assert_eq!(BlendUniform::new(ColorFormat::Rgba8, 1.0).format, 0);
        assert_eq!(BlendUniform::new(ColorFormat::Bgra8, 0.5).format, 1);
    }
}
