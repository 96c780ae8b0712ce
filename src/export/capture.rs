//! Uniform "capture region -> raster bytes" contract over the rasterizer.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use log::{debug, warn};

use crate::surfaces::{DocumentSurface, LayoutContainer};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureTarget {
    /// Snapshot of the shared container, taken when the region was built
    Container(LayoutContainer),
    /// One document on its own
    Surface { surface: DocumentSurface, width: u32 },
}

/// A renderable region handed to the rasterizer
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRegion {
    pub id: String,
    pub target: CaptureTarget,
    /// Elements carrying any of these tags are left out of the capture
    pub exclude_tags: Vec<String>,
}

impl CaptureRegion {
    pub fn container(container: &LayoutContainer, exclude_tags: Vec<String>) -> Self {
        Self {
            id: container.id.clone(),
            target: CaptureTarget::Container(container.clone()),
            exclude_tags,
        }
    }

    pub fn surface(surface: &DocumentSurface, width: u32) -> Self {
        Self {
            id: surface.kind.id().to_string(),
            target: CaptureTarget::Surface {
                surface: surface.clone(),
                width,
            },
            exclude_tags: Vec::new(),
        }
    }
}

/// The external rasterization primitive.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, region: &CaptureRegion) -> Result<Vec<u8>>;
}

#[derive(Clone)]
pub struct CaptureAdapter {
    rasterizer: Arc<dyn Rasterizer>,
}

impl CaptureAdapter {
    pub fn new(rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self { rasterizer }
    }

    /// Capture one region. Any failure, including an empty raster, becomes
    /// `CaptureFailed` naming the region.
    pub async fn capture(&self, region: &CaptureRegion) -> Result<Vec<u8>> {
        debug!("capturing region '{}'", region.id);
        match self.rasterizer.rasterize(region).await {
            Ok(bytes) if bytes.is_empty() => Err(Error::CaptureFailed {
                region: region.id.clone(),
                reason: "rasterizer returned no data".into(),
            }),
            Ok(bytes) => Ok(bytes),
            Err(err @ Error::CaptureFailed { .. }) => Err(err),
            Err(err) => {
                warn!("capture of '{}' failed: {}", region.id, err);
                Err(Error::CaptureFailed {
                    region: region.id.clone(),
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Capture every region concurrently. Results follow `regions` order
    /// regardless of completion order; the first failure discards the batch.
    pub async fn capture_many(&self, regions: &[CaptureRegion]) -> Result<Vec<Vec<u8>>> {
        try_join_all(regions.iter().map(|r| self.capture(r))).await
    }
}
