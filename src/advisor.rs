use anyhow::Result;
use async_trait::async_trait;

use crate::metrics::{Advice, ClassroomMetrics, MetricsPatch};

/// A privacy-filtered, downscaled camera frame. Produced by the capture
/// collaborator; opaque to the orchestration core.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// The generative collaborator the orchestrator dispatches to. Both calls may
/// be slow and may fail; the core treats them as opaque async functions and
/// never lets a failure corrupt its own state.
#[async_trait]
pub trait AdviceClient: Send + Sync {
    async fn request_advice(&self, metrics: &ClassroomMetrics) -> Result<Advice>;

    async fn request_image_metrics(&self, frame: &EncodedFrame) -> Result<MetricsPatch>;
}
