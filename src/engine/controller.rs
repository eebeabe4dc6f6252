use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::advisor::AdviceClient;
use crate::metrics::MetricsPatch;
use crate::settings::EngineSettings;

use super::core::{engine_loop, DashboardSnapshot, Engine, EngineEvent, SensorEvent};

/// Cloneable handle sensor collaborators use to feed the engine. Producers
/// only ever emit events; they never touch engine state.
#[derive(Clone)]
pub struct SensorHandle {
    events_tx: mpsc::UnboundedSender<EngineEvent>,
}

impl SensorHandle {
    pub fn push_vision_metrics(&self, patch: MetricsPatch) {
        let _ = self
            .events_tx
            .send(EngineEvent::Sensor(SensorEvent::VisionMetrics(patch)));
    }

    pub fn push_audio_level(&self, level: f64) {
        let _ = self
            .events_tx
            .send(EngineEvent::Sensor(SensorEvent::AudioLevel(level)));
    }

    pub fn report_fault(&self, reason: impl Into<String>) {
        let _ = self.events_tx.send(EngineEvent::SensorFault(reason.into()));
    }
}

/// Owns the engine loop task: spawn on construction, cancel and join on stop.
pub struct EngineController {
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    snapshot_rx: watch::Receiver<DashboardSnapshot>,
    handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl EngineController {
    pub fn start(settings: EngineSettings, client: Arc<dyn AdviceClient>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (engine, snapshot_rx) = Engine::new(settings, client, events_tx.clone());

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(engine_loop(engine, events_rx, cancel_token.clone()));

        Self {
            events_tx,
            snapshot_rx,
            handle: Some(handle),
            cancel_token,
        }
    }

    pub fn sensor_handle(&self) -> SensorHandle {
        SensorHandle {
            events_tx: self.events_tx.clone(),
        }
    }

    pub fn set_active(&self, active: bool) {
        let _ = self.events_tx.send(EngineEvent::SetActive(active));
    }

    /// Change-notified snapshot port for dashboard consumers.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn current_snapshot(&self) -> DashboardSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.cancel_token.cancel();

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("engine loop task failed to join")
        } else {
            Ok(())
        }
    }
}
