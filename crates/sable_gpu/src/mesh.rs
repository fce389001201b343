//! GPU mesh buffers, the mesh pool, and mesh groups
//!
//! A `MeshData` owns the position/texcoord/index buffers for one tessellated
//! mesh. Instances are recycled through a `MeshPool`: freeing a mesh keeps
//! its GPU buffers alive so the next frame's update rewrites them in place
//! instead of reallocating. Buffers are only destroyed when the pool itself
//! is released at context teardown.
//!
//! A `MeshGroup` is the ordered set of pooled meshes one logical shape needs
//! when it decomposes into multiple contours, each requiring its own draw.

use slotmap::SlotMap;
use smallvec::SmallVec;

use sable_paint::{GeometryData, Point, Polyline};

use crate::context::Context;

slotmap::new_key_type! {
    /// Stable handle to a pooled mesh
    pub struct MeshKey;
}

/// Index count of a triangle fan over `vertex_count` vertices
pub fn fan_index_count(vertex_count: u32) -> u32 {
    if vertex_count < 3 {
        0
    } else {
        (vertex_count - 2) * 3
    }
}

/// The four corners of an axis-aligned bbox quad, in fan winding
pub fn bbox_corners(pmin: Point, pmax: Point) -> [Point; 4] {
    [
        pmin,
        Point::new(pmax.x, pmin.y),
        pmax,
        Point::new(pmin.x, pmax.y),
    ]
}

/// GPU-resident vertex/texcoord/index data for one drawable triangle set
///
/// Buffer handles are either all absent (never updated) or sized for at
/// least the current vertex/index counts; capacity is grow-only, so counts
/// may be smaller than the live buffers after a shrinking update.
#[derive(Default)]
pub struct MeshData {
    position: Option<wgpu::Buffer>,
    tex_coord: Option<wgpu::Buffer>,
    index: Option<wgpu::Buffer>,
    vertex_count: u32,
    index_count: u32,
}

impl MeshData {
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Rewrite from a polyline contour, fan-indexed
    ///
    /// Only positions are uploaded; `draw_fan` borrows the context's shared
    /// fan index buffer. An empty or sub-triangle polyline zeroes the index
    /// count, making the draw a no-op.
    pub fn update_polyline(&mut self, ctx: &mut Context, polyline: &Polyline) {
        let count = polyline.points.len() as u32;
        self.vertex_count = count;
        self.index_count = fan_index_count(count);
        if count == 0 {
            return;
        }

        ctx.update_buffer(
            &mut self.position,
            wgpu::BufferUsages::VERTEX,
            "Mesh Position Buffer",
            bytemuck::cast_slice(&polyline.points),
        );
        ctx.ensure_fan_indices(count);
    }

    /// Rewrite from a pre-triangulated vertex batch (strokes, images)
    pub fn update_geometry(&mut self, ctx: &mut Context, geometry: &GeometryData) {
        if geometry.is_empty() {
            self.vertex_count = 0;
            self.index_count = 0;
            return;
        }
        self.vertex_count = geometry.positions.len() as u32;
        self.index_count = geometry.indices.len() as u32;

        ctx.update_buffer(
            &mut self.position,
            wgpu::BufferUsages::VERTEX,
            "Mesh Position Buffer",
            bytemuck::cast_slice(&geometry.positions),
        );
        if !geometry.tex_coords.is_empty() {
            ctx.update_buffer(
                &mut self.tex_coord,
                wgpu::BufferUsages::VERTEX,
                "Mesh TexCoord Buffer",
                bytemuck::cast_slice(&geometry.tex_coords),
            );
        }
        ctx.update_buffer(
            &mut self.index,
            wgpu::BufferUsages::INDEX,
            "Mesh Index Buffer",
            bytemuck::cast_slice(&geometry.indices),
        );
    }

    /// Rewrite as the axis-aligned quad spanning `pmin..pmax`, fan-indexed
    ///
    /// A zero-area box (either extent collapsed) zeroes the counts and skips
    /// the upload, so the draw is a no-op.
    pub fn update_bbox(&mut self, ctx: &mut Context, pmin: Point, pmax: Point) {
        if pmin.x >= pmax.x || pmin.y >= pmax.y {
            self.vertex_count = 0;
            self.index_count = 0;
            return;
        }
        let corners = bbox_corners(pmin, pmax);
        self.vertex_count = 4;
        self.index_count = 6;

        ctx.update_buffer(
            &mut self.position,
            wgpu::BufferUsages::VERTEX,
            "Mesh BBox Buffer",
            bytemuck::cast_slice(&corners),
        );
        ctx.ensure_fan_indices(4);
    }

    /// Submit as an indexed triangle list using the mesh's own indices
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        let (Some(position), Some(index)) = (&self.position, &self.index) else {
            return;
        };
        pass.set_vertex_buffer(0, position.slice(..));
        pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Submit as a triangle fan via the context's shared fan index buffer
    pub fn draw_fan(&self, ctx: &Context, pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        let Some(position) = &self.position else {
            return;
        };
        let Some(fan) = ctx.fan_index_buffer() else {
            return;
        };
        pass.set_vertex_buffer(0, position.slice(..));
        pass.set_index_buffer(fan.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Submit the textured quad topology (position + texcoord streams)
    pub fn draw_image(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        let (Some(position), Some(tex_coord), Some(index)) =
            (&self.position, &self.tex_coord, &self.index)
        else {
            return;
        };
        pass.set_vertex_buffer(0, position.slice(..));
        pass.set_vertex_buffer(1, tex_coord.slice(..));
        pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Destroy the GPU buffers. Only the pool calls this at teardown;
    /// per-frame recycling goes through `MeshPool::free` instead.
    pub fn release(&mut self) {
        self.position = None;
        self.tex_coord = None;
        self.index = None;
        self.vertex_count = 0;
        self.index_count = 0;
    }
}

/// Reuse cache for `MeshData` instances
///
/// `allocate` prefers the most recently freed instance (LIFO) over growing.
/// Freed meshes keep their GPU buffers so re-acquisition is upload-only.
#[derive(Default)]
pub struct MeshPool {
    items: SlotMap<MeshKey, MeshData>,
    free: Vec<MeshKey>,
}

impl MeshPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a ready-to-write mesh, reusing a freed one when available.
    /// Contents are stale until the next update. Never fails.
    pub fn allocate(&mut self) -> MeshKey {
        match self.free.pop() {
            Some(key) => key,
            None => self.items.insert(MeshData::default()),
        }
    }

    /// Return a mesh to the reuse set. GPU buffers are retained.
    pub fn free(&mut self, key: MeshKey) {
        debug_assert!(self.items.contains_key(key), "freeing unknown mesh");
        debug_assert!(!self.free.contains(&key), "double-free of pooled mesh");
        self.free.push(key);
    }

    pub fn get(&self, key: MeshKey) -> Option<&MeshData> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: MeshKey) -> Option<&mut MeshData> {
        self.items.get_mut(key)
    }

    /// Total instances, pooled and in use
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Instances currently available for reuse
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Destroy every instance's GPU buffers and empty the pool. Called once
    /// at context teardown; idempotent.
    pub fn release(&mut self) {
        if !self.items.is_empty() {
            tracing::debug!(
                "releasing mesh pool: {} meshes ({} pooled)",
                self.items.len(),
                self.free.len()
            );
        }
        self.items.clear();
        self.free.clear();
    }
}

/// Ordered collection of pooled meshes for one logical shape
///
/// One entry per independent draw call: a multi-contour fill gets one mesh
/// per contour since fan triangulation is per-contour.
#[derive(Default)]
pub struct MeshGroup {
    meshes: SmallVec<[MeshKey; 2]>,
}

impl MeshGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull one mesh from the pool, fill it from the polyline, append it
    pub fn append_polyline(&mut self, ctx: &mut Context, pool: &mut MeshPool, polyline: &Polyline) {
        let key = pool.allocate();
        if let Some(mesh) = pool.get_mut(key) {
            mesh.update_polyline(ctx, polyline);
        }
        self.meshes.push(key);
    }

    /// Pull one mesh from the pool, fill it from the vertex batch, append it
    pub fn append_geometry(
        &mut self,
        ctx: &mut Context,
        pool: &mut MeshPool,
        geometry: &GeometryData,
    ) {
        let key = pool.allocate();
        if let Some(mesh) = pool.get_mut(key) {
            mesh.update_geometry(ctx, geometry);
        }
        self.meshes.push(key);
    }

    /// Pull one mesh from the pool, fill it with a bbox quad, append it
    pub fn append_bbox(&mut self, ctx: &mut Context, pool: &mut MeshPool, pmin: Point, pmax: Point) {
        let key = pool.allocate();
        if let Some(mesh) = pool.get_mut(key) {
            mesh.update_bbox(ctx, pmin, pmax);
        }
        self.meshes.push(key);
    }

    /// Member meshes in draw order
    pub fn meshes(&self) -> &[MeshKey] {
        &self.meshes
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Return every member mesh to the pool and empty the group. Releasing
    /// an already-empty group is a no-op.
    pub fn release(&mut self, pool: &mut MeshPool) {
        for key in self.meshes.drain(..) {
            pool.free(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::create_test_context;

    #[test]
    fn test_fan_index_count() {
        assert_eq!(fan_index_count(0), 0);
        assert_eq!(fan_index_count(2), 0);
        assert_eq!(fan_index_count(3), 3);
        assert_eq!(fan_index_count(4), 6);
        assert_eq!(fan_index_count(10), 24);
    }

    #[test]
    fn test_bbox_corners_winding() {
        let pmin = Point::new(1.0, 2.0);
        let pmax = Point::new(5.0, 7.0);
        let corners = bbox_corners(pmin, pmax);
        assert_eq!(corners[0], Point::new(1.0, 2.0));
        assert_eq!(corners[1], Point::new(5.0, 2.0));
        assert_eq!(corners[2], Point::new(5.0, 7.0));
        assert_eq!(corners[3], Point::new(1.0, 7.0));
    }

    fn square_polyline() -> Polyline {
        Polyline::closed(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ])
    }

    #[test]
    fn mesh_pool_reuses_freed_instance() {
        pollster::block_on(async {
            let Some(mut ctx) = create_test_context().await else {
                // Skip test if no GPU available
                return;
            };
            let mut pool = MeshPool::new();

            let first = pool.allocate();
            if let Some(mesh) = pool.get_mut(first) {
                mesh.update_polyline(&mut ctx, &square_polyline());
            }
            assert_eq!(pool.len(), 1);

            pool.free(first);
            assert_eq!(pool.free_count(), 1);

            // Buffers must survive the free
            assert_eq!(pool.get(first).map(MeshData::vertex_count), Some(4));

            // Reallocation returns the freed instance, intact, before growing
            let second = pool.allocate();
            assert_eq!(second, first);
            assert_eq!(pool.len(), 1);
            assert_eq!(pool.free_count(), 0);
            assert_eq!(pool.get(second).map(MeshData::vertex_count), Some(4));
        });
    }

    #[test]
    fn mesh_pool_reuse_is_lifo() {
        // Pool bookkeeping touches no GPU state, so no device needed
        let mut pool = MeshPool::new();

        let a = pool.allocate();
        let b = pool.allocate();
        pool.free(a);
        pool.free(b);

        assert_eq!(pool.allocate(), b);
        assert_eq!(pool.allocate(), a);
    }

    #[test]
    fn mesh_pool_release_is_idempotent() {
        pollster::block_on(async {
            let Some(mut ctx) = create_test_context().await else {
                return;
            };
            let mut pool = MeshPool::new();

            let key = pool.allocate();
            if let Some(mesh) = pool.get_mut(key) {
                mesh.update_polyline(&mut ctx, &square_polyline());
            }

            pool.release();
            assert!(pool.is_empty());
            assert_eq!(pool.free_count(), 0);

            pool.release();
            assert!(pool.is_empty());
        });
    }

    #[test]
    fn group_append_square_polyline() {
        pollster::block_on(async {
            let Some(mut ctx) = create_test_context().await else {
                return;
            };
            let mut pool = MeshPool::new();
            let mut group = MeshGroup::new();

            group.append_polyline(&mut ctx, &mut pool, &square_polyline());
            assert_eq!(group.len(), 1);

            let mesh = pool.get(group.meshes()[0]).unwrap();
            assert_eq!(mesh.vertex_count(), 4);
            assert_eq!(mesh.index_count(), 6); // two triangles

            group.release(&mut pool);
            assert_eq!(group.len(), 0);
            assert_eq!(pool.free_count(), 1);

            // Releasing an already-empty group is a no-op
            group.release(&mut pool);
            assert_eq!(pool.free_count(), 1);
        });
    }

    #[test]
    fn degenerate_polyline_draws_nothing() {
        pollster::block_on(async {
            let Some(mut ctx) = create_test_context().await else {
                return;
            };
            let mut mesh = MeshData::default();

            mesh.update_polyline(&mut ctx, &Polyline::new());
            assert_eq!(mesh.vertex_count(), 0);
            assert_eq!(mesh.index_count(), 0);

            // Two points cannot form a triangle
            let mut line = Polyline::new();
            line.push(Point::new(0.0, 0.0));
            line.push(Point::new(1.0, 0.0));
            mesh.update_polyline(&mut ctx, &line);
            assert_eq!(mesh.vertex_count(), 2);
            assert_eq!(mesh.index_count(), 0);
        });
    }

    #[test]
    fn zero_area_bbox_draws_nothing() {
        pollster::block_on(async {
            let Some(mut ctx) = create_test_context().await else {
                return;
            };
            let mut mesh = MeshData::default();

            // A point box has no area
            let p = Point::new(5.0, 5.0);
            mesh.update_bbox(&mut ctx, p, p);
            assert_eq!(mesh.vertex_count(), 0);
            assert_eq!(mesh.index_count(), 0);

            // A collapsed extent on either axis is no better
            mesh.update_bbox(&mut ctx, Point::new(0.0, 0.0), Point::new(10.0, 0.0));
            assert_eq!(mesh.index_count(), 0);

            // A real box still fills in the quad counts
            mesh.update_bbox(&mut ctx, Point::new(0.0, 0.0), Point::new(10.0, 10.0));
            assert_eq!(mesh.vertex_count(), 4);
            assert_eq!(mesh.index_count(), 6);
        });
    }

    #[test]
    fn geometry_update_sets_explicit_counts() {
        pollster::block_on(async {
            let Some(mut ctx) = create_test_context().await else {
                return;
            };
            let mut mesh = MeshData::default();

            let quad = GeometryData::image_quad(Point::ZERO, Point::new(4.0, 4.0));
            mesh.update_geometry(&mut ctx, &quad);
            assert_eq!(mesh.vertex_count(), 4);
            assert_eq!(mesh.index_count(), 6);

            mesh.update_geometry(&mut ctx, &GeometryData::new());
            assert_eq!(mesh.vertex_count(), 0);
            assert_eq!(mesh.index_count(), 0);

            // Positions without indices cannot draw; no stale counts survive
            mesh.update_geometry(&mut ctx, &quad);
            let mut unindexed = GeometryData::new();
            unindexed.positions = quad.positions.clone();
            mesh.update_geometry(&mut ctx, &unindexed);
            assert_eq!(mesh.vertex_count(), 0);
            assert_eq!(mesh.index_count(), 0);

            mesh.release();
            assert_eq!(mesh.vertex_count(), 0);
            mesh.release(); // idempotent
        });
    }
}
