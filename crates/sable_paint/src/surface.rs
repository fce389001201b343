//! Decoded pixel surfaces and clip handles

use crate::color::ColorFormat;

/// A decoded pixel buffer handed to the GPU layer for texture upload
///
/// Pixels are tightly packed rows of 4-byte texels in the given format.
#[derive(Clone, Copy, Debug)]
pub struct PixelSurface<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub format: ColorFormat,
}

impl<'a> PixelSurface<'a> {
    pub fn rgba8(pixels: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
            format: ColorFormat::Rgba8,
        }
    }

    /// Whether the buffer holds at least `width * height` texels
    pub fn is_complete(&self) -> bool {
        let required = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|texels| texels.checked_mul(4));
        matches!(required, Some(len) if self.pixels.len() >= len)
    }
}

/// Index into the caller-owned table of paint records used as clip sources
///
/// The scene graph owns the referenced records; this layer only stores and
/// hands back the handles, so freeing a clip source never dangles here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClipHandle(pub u32);
