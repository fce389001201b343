//! Per-paint render settings: solid and gradient fill resources
//!
//! A `RenderSettings` owns the uniform buffer and bind group describing how
//! one fill (or stroke) is shaded. Exactly one of the solid/gradient
//! resource sets is populated at a time, matching `fill_type`; switching
//! kinds releases the previously active set first. The `skip` flag marks a
//! fill the consumer must not draw at all.

use sable_paint::{Brush, Gradient, UpdateFlags};

use crate::context::Context;
use crate::gradient::{RasterizedGradient, GRADIENT_TEXTURE_WIDTH};
use crate::uniforms::{GradientUniform, SolidUniform};

/// Which fill kind the settings currently describe
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillType {
    #[default]
    None,
    Solid,
    Linear,
    Radial,
}

/// Which raster path the consumer should bind for this fill
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RasterType {
    #[default]
    Solid,
    Gradient,
    Image,
}

#[derive(Default)]
pub struct RenderSettings {
    solid_buffer: Option<wgpu::Buffer>,
    solid_bind_group: Option<wgpu::BindGroup>,
    gradient_texture: Option<wgpu::Texture>,
    gradient_view: Option<wgpu::TextureView>,
    gradient_buffer: Option<wgpu::Buffer>,
    gradient_bind_group: Option<wgpu::BindGroup>,
    fill_type: FillType,
    raster_type: RasterType,
    skip: bool,
}

impl RenderSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_type(&self) -> FillType {
        self.fill_type
    }

    pub fn raster_type(&self) -> RasterType {
        self.raster_type
    }

    /// Whether the consumer should skip drawing this fill entirely
    pub fn skip(&self) -> bool {
        self.skip
    }

    /// The active resource set's bind group, or `None` when skipped or never
    /// updated
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        if self.skip {
            return None;
        }
        match self.raster_type {
            RasterType::Solid => self.solid_bind_group.as_ref(),
            RasterType::Gradient => self.gradient_bind_group.as_ref(),
            RasterType::Image => None,
        }
    }

    /// Apply a fill descriptor. `flags` gates GPU uploads: the solid uniform
    /// is only rewritten when `COLOR` changed, the gradient texture only when
    /// `GRADIENT` changed. Switching fill kinds always rebuilds, and releases
    /// the previously active resource set first.
    pub fn update(&mut self, ctx: &Context, brush: Option<&Brush>, flags: UpdateFlags) {
        let Some(brush) = brush else {
            self.fill_type = FillType::None;
            self.skip = true;
            return;
        };
        self.skip = false;

        match brush {
            Brush::Solid(color) => {
                let switching = self.fill_type != FillType::Solid;
                if switching {
                    self.release_gradient();
                }
                if switching || flags.intersects(UpdateFlags::COLOR) || self.solid_bind_group.is_none()
                {
                    let uniform = SolidUniform::from(*color);
                    let recreated = ctx.update_buffer(
                        &mut self.solid_buffer,
                        wgpu::BufferUsages::UNIFORM,
                        "Solid Fill Uniform",
                        bytemuck::bytes_of(&uniform),
                    );
                    if recreated || self.solid_bind_group.is_none() {
                        if let Some(buffer) = &self.solid_buffer {
                            self.solid_bind_group = Some(ctx.create_solid_bind_group(buffer));
                        }
                    }
                }
                self.fill_type = FillType::Solid;
                self.raster_type = RasterType::Solid;
            }
            Brush::Gradient(gradient) => {
                let fill_type = match gradient {
                    Gradient::Linear { .. } => FillType::Linear,
                    Gradient::Radial { .. } => FillType::Radial,
                };
                let switching = self.fill_type != fill_type;
                if self.fill_type == FillType::Solid {
                    self.release_solid();
                }
                if switching
                    || flags.intersects(UpdateFlags::GRADIENT)
                    || self.gradient_bind_group.is_none()
                {
                    self.upload_gradient(ctx, gradient);
                }
                self.fill_type = fill_type;
                self.raster_type = RasterType::Gradient;
            }
        }
    }

    fn upload_gradient(&mut self, ctx: &Context, gradient: &Gradient) {
        let texture_created = self.gradient_texture.is_none();
        if texture_created {
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Gradient Lookup Texture"),
                size: wgpu::Extent3d {
                    width: GRADIENT_TEXTURE_WIDTH,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D1,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            self.gradient_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
            self.gradient_texture = Some(texture);
        }

        let rasterized = RasterizedGradient::from_stops(gradient.stops());
        if let Some(texture) = &self.gradient_texture {
            ctx.queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &rasterized.pixels,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(GRADIENT_TEXTURE_WIDTH * 4),
                    rows_per_image: Some(1),
                },
                wgpu::Extent3d {
                    width: GRADIENT_TEXTURE_WIDTH,
                    height: 1,
                    depth_or_array_layers: 1,
                },
            );
        }

        let uniform = match gradient {
            Gradient::Linear { start, end, .. } => GradientUniform::linear(*start, *end),
            Gradient::Radial { center, radius, .. } => GradientUniform::radial(*center, *radius),
        };
        let buffer_created = ctx.update_buffer(
            &mut self.gradient_buffer,
            wgpu::BufferUsages::UNIFORM,
            "Gradient Fill Uniform",
            bytemuck::bytes_of(&uniform),
        );

        if texture_created || buffer_created || self.gradient_bind_group.is_none() {
            if let (Some(buffer), Some(view)) = (&self.gradient_buffer, &self.gradient_view) {
                self.gradient_bind_group = Some(ctx.create_gradient_bind_group(buffer, view));
            }
        }
    }

    fn release_solid(&mut self) {
        self.solid_bind_group = None;
        self.solid_buffer = None;
    }

    fn release_gradient(&mut self) {
        self.gradient_bind_group = None;
        self.gradient_buffer = None;
        self.gradient_view = None;
        self.gradient_texture = None;
    }

    pub(crate) fn has_solid_resources(&self) -> bool {
        self.solid_buffer.is_some() || self.solid_bind_group.is_some()
    }

    pub(crate) fn has_gradient_resources(&self) -> bool {
        self.gradient_texture.is_some()
            || self.gradient_view.is_some()
            || self.gradient_buffer.is_some()
            || self.gradient_bind_group.is_some()
    }

    /// Destroy whichever resource set is populated and reset the flags;
    /// idempotent.
    pub fn release(&mut self) {
        self.release_solid();
        self.release_gradient();
        self.fill_type = FillType::None;
        self.raster_type = RasterType::Solid;
        self.skip = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::create_test_context;
    use sable_paint::{Color, Point};

    fn linear_brush() -> Brush {
        Brush::Gradient(Gradient::linear_simple(
            Point::ZERO,
            Point::new(100.0, 0.0),
            Color::RED,
            Color::BLUE,
        ))
    }

    fn radial_brush() -> Brush {
        Brush::Gradient(Gradient::radial_simple(
            Point::new(50.0, 50.0),
            25.0,
            Color::WHITE,
            Color::BLACK,
        ))
    }

    #[test]
    fn no_fill_sets_skip() {
        pollster::block_on(async {
            let Some(ctx) = create_test_context().await else {
                // Skip test if no GPU available
                return;
            };
            let mut settings = RenderSettings::new();

            settings.update(&ctx, None, UpdateFlags::ALL);
            assert!(settings.skip());
            assert_eq!(settings.fill_type(), FillType::None);
            assert!(settings.bind_group().is_none());
        });
    }

    #[test]
    fn solid_fill_populates_only_solid_resources() {
        pollster::block_on(async {
            let Some(ctx) = create_test_context().await else {
                return;
            };
            let mut settings = RenderSettings::new();

            settings.update(&ctx, Some(&Brush::Solid(Color::RED)), UpdateFlags::COLOR);
            assert_eq!(settings.fill_type(), FillType::Solid);
            assert_eq!(settings.raster_type(), RasterType::Solid);
            assert!(!settings.skip());
            assert!(settings.has_solid_resources());
            assert!(!settings.has_gradient_resources());
            assert!(settings.bind_group().is_some());
        });
    }

    #[test]
    fn switching_solid_and_gradient_is_mutually_exclusive() {
        pollster::block_on(async {
            let Some(ctx) = create_test_context().await else {
                return;
            };
            let mut settings = RenderSettings::new();

            settings.update(&ctx, Some(&Brush::Solid(Color::RED)), UpdateFlags::COLOR);
            assert!(settings.has_solid_resources());

            settings.update(&ctx, Some(&linear_brush()), UpdateFlags::GRADIENT);
            assert_eq!(settings.fill_type(), FillType::Linear);
            assert_eq!(settings.raster_type(), RasterType::Gradient);
            assert!(!settings.has_solid_resources());
            assert!(settings.has_gradient_resources());
            assert!(settings.bind_group().is_some());

            settings.update(&ctx, Some(&radial_brush()), UpdateFlags::GRADIENT);
            assert_eq!(settings.fill_type(), FillType::Radial);
            assert!(!settings.has_solid_resources());
            assert!(settings.has_gradient_resources());

            settings.update(&ctx, Some(&Brush::Solid(Color::GREEN)), UpdateFlags::COLOR);
            assert_eq!(settings.fill_type(), FillType::Solid);
            assert!(settings.has_solid_resources());
            assert!(!settings.has_gradient_resources());
        });
    }

    #[test]
    fn unchanged_flags_keep_existing_resources() {
        pollster::block_on(async {
            let Some(ctx) = create_test_context().await else {
                return;
            };
            let mut settings = RenderSettings::new();

            // First update creates resources even with NONE flags
            settings.update(&ctx, Some(&Brush::Solid(Color::RED)), UpdateFlags::NONE);
            assert!(settings.bind_group().is_some());

            // Subsequent no-change update keeps them
            settings.update(&ctx, Some(&Brush::Solid(Color::RED)), UpdateFlags::NONE);
            assert!(settings.bind_group().is_some());
            assert_eq!(settings.fill_type(), FillType::Solid);
        });
    }

    #[test]
    fn release_resets_and_is_idempotent() {
        pollster::block_on(async {
            let Some(ctx) = create_test_context().await else {
                return;
            };
            let mut settings = RenderSettings::new();

            settings.update(&ctx, Some(&linear_brush()), UpdateFlags::GRADIENT);
            assert!(settings.has_gradient_resources());

            settings.release();
            assert_eq!(settings.fill_type(), FillType::None);
            assert!(!settings.has_solid_resources());
            assert!(!settings.has_gradient_resources());

            settings.release();
            assert_eq!(settings.fill_type(), FillType::None);
        });
    }
}
