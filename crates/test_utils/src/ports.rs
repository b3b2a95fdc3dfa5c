//! Stub Port Implementations

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};
use domain_intake::evidence::MIME_JPEG;
use domain_intake::{FileRef, Thumbnail, ThumbnailPort};

/// Thumbnail port returning a fixed poster frame, or always failing
#[derive(Debug, Default)]
pub struct StubThumbnailPort {
    failing: bool,
    calls: AtomicUsize,
}

impl StubThumbnailPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// A port whose renders always fail
    pub fn failing() -> Self {
        Self {
            failing: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of render calls received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DomainPort for StubThumbnailPort {}

#[async_trait]
impl ThumbnailPort for StubThumbnailPort {
    async fn render_thumbnail(&self, file: &FileRef) -> Result<Thumbnail, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(PortError::internal(format!("cannot decode {}", file.name)));
        }
        Ok(Thumbnail {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
            mime_type: MIME_JPEG.to_string(),
        })
    }
}
