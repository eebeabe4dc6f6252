//! Simulated collaborators for the demo binary: a fake generative client and
//! the two sensor producer loops, on the cadences the real dashboard uses.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use rand::Rng;
use tokio::sync::watch;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::advisor::{AdviceClient, EncodedFrame};
use crate::engine::{DashboardSnapshot, SensorHandle};
use crate::metrics::{
    ActivityType, Advice, ClassroomMetrics, FocusStatus, MetricsPatch,
};

const AUDIO_SAMPLE_INTERVAL_MS: u64 = 150;

/// Stands in for the Gemini-backed client: plausible latency, plausible
/// numbers, occasional failure.
pub struct SimulatedAdviceClient {
    failure_rate: f64,
}

impl SimulatedAdviceClient {
    pub fn new() -> Self {
        Self { failure_rate: 0.05 }
    }

    fn latency() -> Duration {
        Duration::from_millis(rand::thread_rng().gen_range(400..2200))
    }
}

impl Default for SimulatedAdviceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdviceClient for SimulatedAdviceClient {
    async fn request_advice(&self, metrics: &ClassroomMetrics) -> Result<Advice> {
        sleep(Self::latency()).await;

        if rand::thread_rng().gen_bool(self.failure_rate) {
            anyhow::bail!("simulated inference service error");
        }

        let status = if metrics.focus_score >= 70.0 {
            FocusStatus::HighFocus
        } else if metrics.focus_score >= 40.0 {
            FocusStatus::MediumFocus
        } else {
            FocusStatus::LowFocus
        };

        let (action, phrase) = match status {
            FocusStatus::HighFocus => (
                "keep_going",
                "The class is with you, this is a good moment to go deeper.",
            ),
            FocusStatus::MediumFocus => (
                "re_engage",
                "Let's hear one quick observation from each group.",
            ),
            FocusStatus::LowFocus => (
                "change_pace",
                "Let's stand up and try this as a two-minute pair exercise.",
            ),
        };

        Ok(Advice {
            overall_status: status,
            summary: format!(
                "Focus at {:.0} with noise level {:.1} during {}.",
                metrics.focus_score,
                metrics.noise_level,
                metrics.activity_type.as_str()
            ),
            short_message: format!("Attention is {:?}, minute {}.", status, metrics.lesson_minute),
            suggested_action_kind: action.to_string(),
            suggested_phrase: phrase.to_string(),
            alternative_activity_ideas: vec![
                "Quick quiz round".to_string(),
                "Pair discussion".to_string(),
                "Board race game".to_string(),
            ],
        })
    }

    async fn request_image_metrics(&self, frame: &EncodedFrame) -> Result<MetricsPatch> {
        sleep(Self::latency()).await;

        if frame.data.is_empty() {
            anyhow::bail!("empty frame");
        }

        let mut rng = rand::thread_rng();
        let activities = [
            ActivityType::Lecture,
            ActivityType::QuestionAnswer,
            ActivityType::GroupWork,
            ActivityType::Experiment,
            ActivityType::Game,
            ActivityType::Discussion,
        ];

        Ok(MetricsPatch {
            focus_score: Some(rng.gen_range(20.0..95.0)),
            gaze_board_percentage: Some(rng.gen_range(10.0..100.0)),
            heads_down_percentage: Some(rng.gen_range(0.0..40.0)),
            fidgeting_level: Some(rng.gen_range(0.0..8.0)),
            activity_type: Some(activities[rng.gen_range(0..activities.len())]),
            ..MetricsPatch::default()
        })
    }
}

/// A stand-in for the privacy-filtered capture pipeline: a small blob of
/// noise where the downscaled, blurred jpeg would be.
fn synthesize_frame() -> EncodedFrame {
    let mut rng = rand::thread_rng();
    let data = (0..2048).map(|_| rng.gen::<u8>()).collect();
    EncodedFrame {
        mime_type: "image/jpeg".to_string(),
        data,
    }
}

/// Periodic vision snapshot producer. Samples only while the system is
/// active, analyses the frame through the collaborator, and feeds the patch
/// to the engine.
pub async fn vision_loop(
    handle: SensorHandle,
    snapshots: watch::Receiver<DashboardSnapshot>,
    client: Arc<dyn AdviceClient>,
    capture_interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = interval(capture_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !snapshots.borrow().system_active {
                    continue;
                }

                let frame = synthesize_frame();
                match client.request_image_metrics(&frame).await {
                    Ok(patch) => {
                        info!("vision snapshot analysed, pushing patch");
                        handle.push_vision_metrics(patch);
                    }
                    Err(err) => warn!("image analysis failed: {err:?}"),
                }
            }
            _ = cancel_token.cancelled() => break,
        }
    }
}

/// Continuous microphone level producer: a bounded random walk at roughly
/// animation-frame rate.
pub async fn audio_loop(
    handle: SensorHandle,
    snapshots: watch::Receiver<DashboardSnapshot>,
    cancel_token: CancellationToken,
) {
    let mut ticker = interval(Duration::from_millis(AUDIO_SAMPLE_INTERVAL_MS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut level: f64 = 3.0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !snapshots.borrow().system_active {
                    continue;
                }

                level = (level + rand::thread_rng().gen_range(-0.8..0.8)).clamp(0.0, 10.0);
                handle.push_audio_level(level);
            }
            _ = cancel_token.cancelled() => break,
        }
    }
}
