//! Image texture resources for picture records
//!
//! Unlike meshes, image textures are not pooled: dimensions and formats vary
//! per source surface, so each distinct image owns its texture. The texture
//! is reused in place across updates as long as the surface shape matches.

use sable_paint::{ColorFormat, PixelSurface};

use crate::context::Context;

/// A GPU texture and its view, built from one decoded pixel surface
#[derive(Default)]
pub struct ImageData {
    texture: Option<wgpu::Texture>,
    view: Option<wgpu::TextureView>,
}

impl ImageData {
    /// Upload a decoded surface, creating the texture on first use or when
    /// the dimensions/format change. Returns true when the texture object
    /// was (re)created, so owners know to rebuild bind groups.
    pub fn update(&mut self, ctx: &Context, surface: &PixelSurface<'_>) -> bool {
        if surface.width == 0 || surface.height == 0 {
            return false;
        }
        if !surface.is_complete() {
            tracing::warn!(
                "image surface {}x{} is missing pixel data, skipping upload",
                surface.width,
                surface.height
            );
            return false;
        }

        let format = match surface.format {
            ColorFormat::Rgba8 => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorFormat::Bgra8 => wgpu::TextureFormat::Bgra8UnormSrgb,
        };

        let needs_new = match &self.texture {
            Some(texture) => {
                texture.width() != surface.width
                    || texture.height() != surface.height
                    || texture.format() != format
            }
            None => true,
        };

        if needs_new {
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Picture Texture"),
                size: wgpu::Extent3d {
                    width: surface.width,
                    height: surface.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            self.view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
            self.texture = Some(texture);
        }

        if let Some(texture) = &self.texture {
            ctx.queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                surface.pixels,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(surface.width * 4),
                    rows_per_image: Some(surface.height),
                },
                wgpu::Extent3d {
                    width: surface.width,
                    height: surface.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        needs_new
    }

    /// The texture view for binding, if a surface has been uploaded
    pub fn view(&self) -> Option<&wgpu::TextureView> {
        self.view.as_ref()
    }

    pub fn width(&self) -> u32 {
        self.texture.as_ref().map_or(0, wgpu::Texture::width)
    }

    pub fn height(&self) -> u32 {
        self.texture.as_ref().map_or(0, wgpu::Texture::height)
    }

    /// Destroy the texture and view; idempotent
    pub fn release(&mut self) {
        self.view = None;
        self.texture = None;
    }
}
