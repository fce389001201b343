//! Paint records: the per-drawable aggregates consumed by the renderer
//!
//! `PaintData` carries the state every drawable shares (model transform,
//! blend settings, viewport, opacity, clip handles). `ShapeData` and
//! `PictureData` embed it by composition; the renderer dispatches on the
//! `RenderData` tag to pick the draw sequence, so no draw method lives here.
//! Shape records are recycled through a `ShapePool` the same way meshes go
//! through the mesh pool.

use slotmap::SlotMap;

use sable_paint::{
    ClipHandle, ColorFormat, FillRule, GeometryData, PixelSurface, Point, Polyline, Rect,
    Transform2D,
};

use crate::context::Context;
use crate::image::ImageData;
use crate::mesh::{MeshData, MeshGroup, MeshPool};
use crate::settings::RenderSettings;
use crate::uniforms::{BlendUniform, ModelUniform};

slotmap::new_key_type! {
    /// Stable handle to a pooled shape record
    pub struct ShapeKey;
}

/// Discriminator the renderer switches on to pick a draw path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintKind {
    Shape,
    Picture,
}

/// State shared by every paint record
#[derive(Default)]
pub struct PaintData {
    model_buffer: Option<wgpu::Buffer>,
    blend_buffer: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,
    pub viewport: Rect,
    pub opacity: f32,
    clips: Vec<ClipHandle>,
}

impl PaintData {
    /// Rewrite the model-transform and blend uniforms, rebuilding the shared
    /// bind group when either buffer object had to be (re)created.
    pub fn update(
        &mut self,
        ctx: &Context,
        transform: &Transform2D,
        format: ColorFormat,
        opacity: u8,
    ) {
        self.opacity = opacity as f32 / 255.0;

        let model = ModelUniform::from(transform);
        let blend = BlendUniform::new(format, self.opacity);

        let model_created = ctx.update_buffer(
            &mut self.model_buffer,
            wgpu::BufferUsages::UNIFORM,
            "Paint Model Uniform",
            bytemuck::bytes_of(&model),
        );
        let blend_created = ctx.update_buffer(
            &mut self.blend_buffer,
            wgpu::BufferUsages::UNIFORM,
            "Paint Blend Uniform",
            bytemuck::bytes_of(&blend),
        );

        if model_created || blend_created || self.bind_group.is_none() {
            if let (Some(model), Some(blend)) = (&self.model_buffer, &self.blend_buffer) {
                self.bind_group = Some(ctx.create_paint_bind_group(model, blend));
            }
        }
    }

    /// Replace the clip-source handle list. The referenced records stay
    /// owned by the caller's scene graph; nothing is freed here.
    pub fn update_clips(&mut self, clips: &[ClipHandle]) {
        self.clips.clear();
        self.clips.extend_from_slice(clips);
    }

    pub fn clips(&self) -> &[ClipHandle] {
        &self.clips
    }

    /// The transform/blend bind group, once updated
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }

    /// Drop the record's own uniforms and bind group; idempotent
    pub fn release(&mut self) {
        self.bind_group = None;
        self.model_buffer = None;
        self.blend_buffer = None;
        self.clips.clear();
        self.opacity = 0.0;
    }
}

/// Paint record for a filled/stroked shape
pub struct ShapeData {
    pub paint: PaintData,
    pub fill_settings: RenderSettings,
    pub stroke_settings: RenderSettings,
    pub fill_meshes: MeshGroup,
    pub fill_bbox_meshes: MeshGroup,
    pub stroke_meshes: MeshGroup,
    pub stroke_bbox_meshes: MeshGroup,
    /// Quad spanning the whole record, for bbox-based clipping/blending
    pub bbox_mesh: MeshData,
    pub p_min: Point,
    pub p_max: Point,
    /// Submit stroke geometry before fill geometry
    pub stroke_first: bool,
    pub fill_rule: FillRule,
}

impl Default for ShapeData {
    fn default() -> Self {
        Self {
            paint: PaintData::default(),
            fill_settings: RenderSettings::default(),
            stroke_settings: RenderSettings::default(),
            fill_meshes: MeshGroup::default(),
            fill_bbox_meshes: MeshGroup::default(),
            stroke_meshes: MeshGroup::default(),
            stroke_bbox_meshes: MeshGroup::default(),
            bbox_mesh: MeshData::default(),
            p_min: Point::new(f32::MAX, f32::MAX),
            p_max: Point::new(f32::MIN, f32::MIN),
            stroke_first: false,
            fill_rule: FillRule::default(),
        }
    }
}

impl ShapeData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any geometry has established the record's bounds yet
    pub fn has_bbox(&self) -> bool {
        self.p_min.x <= self.p_max.x && self.p_min.y <= self.p_max.y
    }

    /// Expand the record's bounds and rewrite the bbox quad to match
    pub fn update_bbox(&mut self, ctx: &mut Context, pmin: Point, pmax: Point) {
        self.p_min = self.p_min.min(pmin);
        self.p_max = self.p_max.max(pmax);
        self.bbox_mesh.update_bbox(ctx, self.p_min, self.p_max);
    }

    /// Append one fill contour: the polyline joins the fill group, its bbox
    /// quad joins the fill-bbox group, and the record bounds grow. Contours
    /// that cannot form a triangle are ignored.
    pub fn append_shape(&mut self, ctx: &mut Context, pool: &mut MeshPool, polyline: &Polyline) {
        if polyline.len() < 3 {
            return;
        }
        let Some((pmin, pmax)) = polyline.bbox() else {
            return;
        };
        self.fill_meshes.append_polyline(ctx, pool, polyline);
        self.fill_bbox_meshes.append_bbox(ctx, pool, pmin, pmax);
        self.update_bbox(ctx, pmin, pmax);
    }

    /// Append one pre-triangulated stroke batch, mirroring `append_shape`
    pub fn append_stroke(&mut self, ctx: &mut Context, pool: &mut MeshPool, geometry: &GeometryData) {
        if geometry.is_empty() {
            return;
        }
        let Some((pmin, pmax)) = geometry.bbox() else {
            return;
        };
        self.stroke_meshes.append_geometry(ctx, pool, geometry);
        self.stroke_bbox_meshes.append_bbox(ctx, pool, pmin, pmax);
        self.update_bbox(ctx, pmin, pmax);
    }

    /// Return all mesh-group members to the pool and reset the bounds.
    /// The standalone bbox mesh keeps its buffers (it is not pooled).
    pub fn release_meshes(&mut self, pool: &mut MeshPool) {
        self.fill_meshes.release(pool);
        self.fill_bbox_meshes.release(pool);
        self.stroke_meshes.release(pool);
        self.stroke_bbox_meshes.release(pool);
        self.p_min = Point::new(f32::MAX, f32::MAX);
        self.p_max = Point::new(f32::MIN, f32::MIN);
    }

    /// Full teardown: meshes back to the pool, settings and bbox buffers
    /// destroyed, then the embedded paint state. Idempotent.
    pub fn release(&mut self, pool: &mut MeshPool) {
        self.release_meshes(pool);
        self.fill_settings.release();
        self.stroke_settings.release();
        self.bbox_mesh.release();
        self.paint.release();
    }
}

/// Paint record for an image: one texture and one textured quad
#[derive(Default)]
pub struct PictureData {
    pub paint: PaintData,
    bind_group: Option<wgpu::BindGroup>,
    pub image: ImageData,
    pub mesh: MeshData,
}

impl PictureData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload the decoded surface and (re)build the picture bind group when
    /// the underlying texture changed
    pub fn update_surface(&mut self, ctx: &Context, surface: &PixelSurface<'_>) {
        let recreated = self.image.update(ctx, surface);
        if recreated || self.bind_group.is_none() {
            if let Some(view) = self.image.view() {
                self.bind_group = Some(ctx.create_image_bind_group(view));
            }
        }
    }

    /// Rewrite the textured quad (callers build it with
    /// `GeometryData::image_quad`)
    pub fn update_geometry(&mut self, ctx: &mut Context, geometry: &GeometryData) {
        self.mesh.update_geometry(ctx, geometry);
    }

    /// The texture/sampler bind group, once a surface is uploaded
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }

    /// Destroy the image, quad, and bind group, then the embedded paint
    /// state. Idempotent.
    pub fn release(&mut self) {
        self.bind_group = None;
        self.image.release();
        self.mesh.release();
        self.paint.release();
    }
}

/// A drawable record, tagged for renderer dispatch
pub enum RenderData {
    Shape(ShapeData),
    Picture(PictureData),
}

impl RenderData {
    pub fn kind(&self) -> PaintKind {
        match self {
            RenderData::Shape(_) => PaintKind::Shape,
            RenderData::Picture(_) => PaintKind::Picture,
        }
    }

    pub fn paint(&self) -> &PaintData {
        match self {
            RenderData::Shape(shape) => &shape.paint,
            RenderData::Picture(picture) => &picture.paint,
        }
    }

    pub fn paint_mut(&mut self) -> &mut PaintData {
        match self {
            RenderData::Shape(shape) => &mut shape.paint,
            RenderData::Picture(picture) => &mut picture.paint,
        }
    }

    /// Release every owned resource, returning pooled meshes to `pool`
    pub fn release(&mut self, pool: &mut MeshPool) {
        match self {
            RenderData::Shape(shape) => shape.release(pool),
            RenderData::Picture(picture) => picture.release(),
        }
    }
}

/// Reuse cache for whole shape records, mirroring `MeshPool`
#[derive(Default)]
pub struct ShapePool {
    items: SlotMap<ShapeKey, ShapeData>,
    free: Vec<ShapeKey>,
}

impl ShapePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a recycled or fresh shape record. Recycled records come back
    /// with empty mesh groups and stale settings, to be repopulated before
    /// use. LIFO reuse, never fails.
    pub fn allocate(&mut self) -> ShapeKey {
        match self.free.pop() {
            Some(key) => key,
            None => self.items.insert(ShapeData::new()),
        }
    }

    /// Return a record to the pool: its meshes go back to the mesh pool, but
    /// settings/uniform resources stay alive for the next use.
    pub fn free(&mut self, key: ShapeKey, mesh_pool: &mut MeshPool) {
        debug_assert!(self.items.contains_key(key), "freeing unknown shape");
        debug_assert!(!self.free.contains(&key), "double-free of pooled shape");
        if let Some(shape) = self.items.get_mut(key) {
            shape.release_meshes(mesh_pool);
            self.free.push(key);
        }
    }

    pub fn get(&self, key: ShapeKey) -> Option<&ShapeData> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: ShapeKey) -> Option<&mut ShapeData> {
        self.items.get_mut(key)
    }

    /// Total records, pooled and in use
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records currently available for reuse
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Tear down every record's owned GPU resources, delegating pooled
    /// meshes back through their release paths, and empty the pool.
    /// Idempotent; called once at context teardown.
    pub fn release(&mut self, mesh_pool: &mut MeshPool) {
        if !self.items.is_empty() {
            tracing::debug!(
                "releasing shape pool: {} records ({} pooled)",
                self.items.len(),
                self.free.len()
            );
        }
        for (_, shape) in self.items.iter_mut() {
            shape.release(mesh_pool);
        }
        self.items.clear();
        self.free.clear();
    }
}
