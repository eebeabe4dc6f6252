pub mod advisor;
pub mod cooldown;
pub mod engine;
pub mod history;
pub mod metrics;
pub mod settings;
pub mod sim;

use std::sync::Arc;

use anyhow::Result;
use log::info;
use tokio_util::sync::CancellationToken;

pub use advisor::{AdviceClient, EncodedFrame};
pub use engine::{DashboardSnapshot, EngineController, EngineState, SensorHandle};
pub use history::HistorySample;
pub use metrics::{ActivityType, Advice, ClassroomMetrics, FocusStatus, MetricsPatch, TrendType};
pub use settings::{EngineSettings, SettingsStore};

/// Demo entrypoint: wires the engine to simulated collaborators and runs
/// until ctrl-c, logging advice as it lands.
pub async fn run() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("classfocus starting up...");

    let settings_path = std::env::current_dir()?.join("classfocus.settings.json");
    let settings_store = SettingsStore::new(settings_path)?;
    let settings = settings_store.engine();

    let client: Arc<dyn AdviceClient> = Arc::new(sim::SimulatedAdviceClient::new());
    let mut controller = EngineController::start(settings.clone(), Arc::clone(&client));

    let cancel_token = CancellationToken::new();
    tokio::spawn(sim::vision_loop(
        controller.sensor_handle(),
        controller.subscribe(),
        Arc::clone(&client),
        settings.capture_interval(),
        cancel_token.clone(),
    ));
    tokio::spawn(sim::audio_loop(
        controller.sensor_handle(),
        controller.subscribe(),
        cancel_token.clone(),
    ));

    // Surface each fresh advice on the console, the way the dashboard's
    // advice card would render it.
    let mut snapshots = controller.subscribe();
    tokio::spawn(async move {
        let mut last_seen = None;
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow().clone();
            if snapshot.last_advice_at != last_seen {
                last_seen = snapshot.last_advice_at;
                if let Some(advice) = &snapshot.advice {
                    info!(
                        "advice: [{:?}] {} \"{}\"",
                        advice.overall_status, advice.summary, advice.suggested_phrase
                    );
                }
            }
        }
    });

    controller.set_active(true);

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    cancel_token.cancel();
    controller.set_active(false);
    controller.stop().await?;
    Ok(())
}
