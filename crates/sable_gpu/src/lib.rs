//! Sable GPU render data
//!
//! The GPU-resource lifecycle layer of the Sable vector-graphics backend:
//! pooled mesh buffers for tessellated path geometry, image textures, and
//! per-paint render state (fill/stroke settings, transform/opacity/clip
//! uniforms), all scoped to one [`Context`] and recycled across frames.
//!
//! Draw orchestration (pipelines, passes, submission order) lives in the
//! renderer consuming these records; this crate only owns their resources.
//!
//! Single-threaded, frame-synchronous: every operation runs on the thread
//! owning the context, and a record must be fully drawn before the next
//! frame repopulates its buffers.

pub mod context;
pub mod gradient;
pub mod image;
pub mod mesh;
pub mod paint;
pub mod settings;
pub mod uniforms;

pub use context::{BindGroupLayouts, Context, ContextConfig, ContextError};
pub use image::ImageData;
pub use mesh::{MeshData, MeshGroup, MeshKey, MeshPool};
pub use paint::{PaintData, PaintKind, PictureData, RenderData, ShapeData, ShapeKey, ShapePool};
pub use settings::{FillType, RasterType, RenderSettings};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Once;

    use crate::context::Context;

    static INIT_LOGGING: Once = Once::new();

    /// Route test logs through `RUST_LOG`, once per process
    fn init_test_logging() {
        INIT_LOGGING.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        });
    }

    /// Helper to create a test wgpu device
    async fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        init_test_logging();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .ok()?;

        Some((device, queue))
    }

    /// A full context over the test device, or `None` when no GPU is
    /// available (callers skip their test in that case)
    pub async fn create_test_context() -> Option<Context> {
        let (device, queue) = create_test_device().await?;
        Some(Context::with_device(device, queue))
    }
}
