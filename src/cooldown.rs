use tokio::time::{Duration, Instant};

/// Minimum-elapsed-time gate between two advice dispatches.
///
/// Admission and timestamp recording happen in one step so that, combined
/// with the orchestrator's single event loop, two overlapping dispatches can
/// never both be admitted. A zero duration disables the elapsed-time check
/// entirely, leaving the orchestrator's in-flight guard as the only gate.
#[derive(Debug)]
pub struct CooldownGate {
    cooldown: Duration,
    last_dispatch: Option<Instant>,
}

impl CooldownGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_dispatch: None,
        }
    }

    /// Returns true and records `now` iff no dispatch has happened yet or the
    /// cooldown has fully elapsed since the last one.
    pub fn try_admit(&mut self, now: Instant) -> bool {
        let admitted = self
            .last_dispatch
            .map(|prev| now.saturating_duration_since(prev) >= self.cooldown)
            .unwrap_or(true);

        if admitted {
            self.last_dispatch = Some(now);
        }
        admitted
    }

    pub fn last_dispatch(&self) -> Option<Instant> {
        self.last_dispatch
    }
}
