//! Built-in rasterizer: block layout, paint commands, RGBA canvas, PNG.

pub mod layout;
pub mod paint;
pub mod raster;

use async_trait::async_trait;

use crate::export::capture::{CaptureRegion, CaptureTarget, Rasterizer};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

/// Render a capture region synchronously.
pub fn render_region(region: &CaptureRegion) -> Result<Screenshot> {
    let page = match &region.target {
        CaptureTarget::Container(container) => layout::layout_container(container, &region.exclude_tags),
        CaptureTarget::Surface { surface, width } => layout::layout_single(surface, *width),
    };
    let commands = paint::paint_page(&page);
    raster::rasterize(page.width, page.height, &commands)
}

/// [`Rasterizer`] backed by [`render_region`], run on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct SurfaceRasterizer;

impl SurfaceRasterizer {
    pub fn new() -> Self {
        SurfaceRasterizer
    }
}

#[async_trait]
impl Rasterizer for SurfaceRasterizer {
    async fn rasterize(&self, region: &CaptureRegion) -> Result<Vec<u8>> {
        let region = region.clone();
        let shot = tokio::task::spawn_blocking(move || render_region(&region))
            .await
            .map_err(|e| Error::RenderError(format!("render task failed: {}", e)))??;
        Ok(shot.png_data)
    }
}
