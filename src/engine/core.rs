use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::advisor::AdviceClient;
use crate::cooldown::CooldownGate;
use crate::history::{HistoryRing, HistorySample};
use crate::metrics::{Advice, ClassroomMetrics, MetricsPatch, MetricsStore};
use crate::settings::EngineSettings;

/// An update emitted by one of the two sensor collaborators.
#[derive(Debug, Clone)]
pub enum SensorEvent {
    /// Periodic vision snapshot analysis result.
    VisionMetrics(MetricsPatch),
    /// Continuous microphone level sample, 0-10.
    AudioLevel(f64),
}

/// Everything the engine's event loop consumes, in arrival order.
#[derive(Debug)]
pub enum EngineEvent {
    Sensor(SensorEvent),
    SetActive(bool),
    /// A sensor collaborator lost its device or permission; forces the
    /// activation switch off.
    SensorFault(String),
    /// Completion of an in-flight advice dispatch, fed back into the queue by
    /// the dispatch task.
    AdviceResolved {
        epoch: u64,
        dispatch_id: Uuid,
        outcome: Result<Advice>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Idle,
    AwaitingAdvice,
    Errored,
}

/// Read-only view published to dashboard consumers through the snapshot port.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub metrics: ClassroomMetrics,
    pub advice: Option<Advice>,
    pub history: Vec<HistorySample>,
    pub system_active: bool,
    pub state: EngineState,
    pub last_advice_at: Option<DateTime<Utc>>,
    pub last_update: DateTime<Utc>,
}

impl DashboardSnapshot {
    /// JSON form for pull-style external consumers (the block-programming
    /// bridge reads this, never core state).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The advice-refresh orchestrator. All state lives behind one event loop;
/// concurrency enters only as independent event producers, so no locking is
/// needed around the store, ring, or gate.
pub struct Engine {
    settings: EngineSettings,
    client: Arc<dyn AdviceClient>,
    store: MetricsStore,
    history: HistoryRing,
    gate: CooldownGate,
    state: EngineState,
    active: bool,
    /// Bumped on every activation toggle; dispatches carry the epoch current
    /// at call time and stale resolutions are dropped.
    epoch: u64,
    activated_at: Option<DateTime<Utc>>,
    advice: Option<Advice>,
    last_advice_at: Option<DateTime<Utc>>,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    snapshot_tx: watch::Sender<DashboardSnapshot>,
}

impl Engine {
    pub fn new(
        settings: EngineSettings,
        client: Arc<dyn AdviceClient>,
        events_tx: mpsc::UnboundedSender<EngineEvent>,
    ) -> (Self, watch::Receiver<DashboardSnapshot>) {
        let gate = CooldownGate::new(settings.cooldown());
        let history = HistoryRing::new(settings.history_capacity);

        let initial = DashboardSnapshot {
            metrics: ClassroomMetrics::default(),
            advice: None,
            history: Vec::new(),
            system_active: false,
            state: EngineState::Idle,
            last_advice_at: None,
            last_update: Utc::now(),
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);

        let engine = Self {
            settings,
            client,
            store: MetricsStore::new(),
            history,
            gate,
            state: EngineState::Idle,
            active: false,
            epoch: 0,
            activated_at: None,
            advice: None,
            last_advice_at: None,
            events_tx,
            snapshot_tx,
        };

        (engine, snapshot_rx)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            metrics: self.store.current().clone(),
            advice: self.advice.clone(),
            history: self.history.snapshot(),
            system_active: self.active,
            state: self.state,
            last_advice_at: self.last_advice_at,
            last_update: Utc::now(),
        }
    }

    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Sensor(sensor_event) => {
                let patch = match sensor_event {
                    SensorEvent::VisionMetrics(patch) => patch,
                    SensorEvent::AudioLevel(level) => MetricsPatch::noise_level(level),
                };
                self.apply_update(patch);
            }
            EngineEvent::SetActive(active) => self.set_active(active),
            EngineEvent::SensorFault(reason) => {
                warn!("sensor collaborator unavailable: {reason}");
                if self.active {
                    self.set_active(false);
                }
            }
            EngineEvent::AdviceResolved {
                epoch,
                dispatch_id,
                outcome,
            } => self.apply_resolution(epoch, dispatch_id, outcome),
        }
    }

    /// Merge -> history -> gate -> dispatch. Updates are merged in arrival
    /// order and never lost, even when every guard says "no dispatch".
    fn apply_update(&mut self, patch: MetricsPatch) {
        self.store.merge(&patch);
        self.publish();

        if !self.active {
            debug!("system inactive, merged update without dispatch");
            return;
        }

        if self.state == EngineState::AwaitingAdvice {
            debug!("advice request already in flight, dispatch suppressed");
            return;
        }

        if !self.gate.try_admit(Instant::now()) {
            debug!("cooldown active, dispatch suppressed");
            return;
        }

        self.dispatch();
    }

    fn dispatch(&mut self) {
        // Stamp the lesson minute from the current activation before the
        // snapshot leaves the engine.
        if let Some(activated_at) = self.activated_at {
            let minutes = (Utc::now() - activated_at).num_minutes().max(0) as u32;
            self.store.merge(&MetricsPatch {
                lesson_minute: Some(minutes),
                ..MetricsPatch::default()
            });
        }

        let metrics = self.store.current().clone();
        self.history.record(Utc::now(), metrics.focus_score);
        self.state = EngineState::AwaitingAdvice;

        let dispatch_id = Uuid::new_v4();
        let epoch = self.epoch;
        let timeout = self.settings.advice_timeout();
        let client = Arc::clone(&self.client);
        let events_tx = self.events_tx.clone();

        info!(
            "dispatching advice request {dispatch_id} (focus={:.0}, activity={})",
            metrics.focus_score,
            metrics.activity_type.as_str()
        );

        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, client.request_advice(&metrics)).await
            {
                Ok(result) => result,
                Err(_) => Err(anyhow!(
                    "advice request {dispatch_id} timed out after {}ms",
                    timeout.as_millis()
                )),
            };
            // The loop may already be gone during shutdown; nothing to do then.
            let _ = events_tx.send(EngineEvent::AdviceResolved {
                epoch,
                dispatch_id,
                outcome,
            });
        });

        self.publish();
    }

    fn apply_resolution(&mut self, epoch: u64, dispatch_id: Uuid, outcome: Result<Advice>) {
        if self.state != EngineState::AwaitingAdvice {
            warn!("resolution for {dispatch_id} arrived with no dispatch outstanding");
            return;
        }

        if epoch != self.epoch {
            debug!("discarding stale advice {dispatch_id} (epoch {epoch} != {})", self.epoch);
            self.state = EngineState::Idle;
            self.publish();
            return;
        }

        match outcome {
            Ok(advice) => {
                info!("advice {dispatch_id} applied: {:?}", advice.overall_status);
                self.advice = Some(advice);
                self.last_advice_at = Some(Utc::now());
                self.state = EngineState::Idle;
                self.publish();
            }
            Err(err) => {
                // Stale advice beats blank advice: prior result stays. The
                // next qualifying update is the only retry trigger.
                error!("advice request {dispatch_id} failed: {err:?}");
                self.state = EngineState::Errored;
                self.publish();
                self.state = EngineState::Idle;
                self.publish();
            }
        }
    }

    fn set_active(&mut self, active: bool) {
        if self.active == active {
            return;
        }

        self.active = active;
        self.epoch += 1;
        self.activated_at = active.then(Utc::now);
        info!(
            "system {} (epoch {})",
            if active { "activated" } else { "deactivated" },
            self.epoch
        );
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

/// Single-consumer loop over both sensor streams, control events, and
/// dispatch completions. Mirrors the arrival order exactly.
pub async fn engine_loop(
    mut engine: Engine,
    mut events_rx: mpsc::UnboundedReceiver<EngineEvent>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            maybe_event = events_rx.recv() => {
                match maybe_event {
                    Some(event) => engine.handle_event(event),
                    None => break,
                }
            }
            _ = cancel_token.cancelled() => {
                info!("advice engine shutting down");
                break;
            }
        }
    }
}
