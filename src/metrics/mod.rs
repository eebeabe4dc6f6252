mod types;

pub use types::{
    ActivityType, Advice, ClassroomMetrics, FocusStatus, MetricsPatch, TrendType,
};

/// Merge point for partial updates from the audio and vision collaborators.
///
/// Owned exclusively by the orchestrator's event loop; collaborators never
/// touch it directly. Per-field last-writer-wins is the intended semantics,
/// since the two streams patch disjoint fields in practice.
#[derive(Debug)]
pub struct MetricsStore {
    current: ClassroomMetrics,
    prior_focus: Option<f64>,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self {
            current: ClassroomMetrics::default(),
            prior_focus: None,
        }
    }

    pub fn current(&self) -> &ClassroomMetrics {
        &self.current
    }

    /// Overwrites only the fields present in `patch`, derives the trend from
    /// the incoming focus score, then clamps every bounded field.
    pub fn merge(&mut self, patch: &MetricsPatch) -> &ClassroomMetrics {
        if let Some(score) = patch.focus_score {
            self.current.trend_last_5_min = derive_trend(self.prior_focus, score);
            self.current.focus_score = score;
            self.prior_focus = Some(score.clamp(0.0, 100.0));
        }
        if let Some(value) = patch.gaze_board_percentage {
            self.current.gaze_board_percentage = value;
        }
        if let Some(value) = patch.heads_down_percentage {
            self.current.heads_down_percentage = value;
        }
        if let Some(value) = patch.fidgeting_level {
            self.current.fidgeting_level = value;
        }
        if let Some(value) = patch.noise_level {
            self.current.noise_level = value;
        }
        if let Some(value) = patch.lesson_minute {
            self.current.lesson_minute = value;
        }
        if let Some(value) = patch.activity_type {
            self.current.activity_type = value;
        }

        self.clamp_bounded_fields();
        &self.current
    }

    /// Back to the fixed baseline (all zeros, lecture, stable). Used on an
    /// explicit restart, never on a plain activation toggle.
    pub fn reset(&mut self) {
        self.current = ClassroomMetrics::default();
        self.prior_focus = None;
    }

    fn clamp_bounded_fields(&mut self) {
        self.current.focus_score = self.current.focus_score.clamp(0.0, 100.0);
        self.current.gaze_board_percentage = self.current.gaze_board_percentage.clamp(0.0, 100.0);
        self.current.heads_down_percentage = self.current.heads_down_percentage.clamp(0.0, 100.0);
        self.current.fidgeting_level = self.current.fidgeting_level.clamp(0.0, 10.0);
        self.current.noise_level = self.current.noise_level.clamp(0.0, 10.0);
    }
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Two-sample instantaneous comparison against the previously stored score.
/// The very first sample has nothing to compare against and reads as stable.
fn derive_trend(prior: Option<f64>, incoming: f64) -> TrendType {
    let Some(prior) = prior else {
        return TrendType::Stable;
    };

    if incoming > prior {
        TrendType::Increasing
    } else if incoming < prior {
        TrendType::Decreasing
    } else {
        TrendType::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focus(score: f64) -> MetricsPatch {
        MetricsPatch {
            focus_score: Some(score),
            ..MetricsPatch::default()
        }
    }

    #[test]
    fn empty_patch_leaves_store_unchanged() {
        let mut store = MetricsStore::new();
        store.merge(&focus(42.0));
        let before = store.current().clone();

        store.merge(&MetricsPatch::default());

        assert_eq!(store.current(), &before);
    }

    #[test]
    fn unspecified_fields_retain_prior_values() {
        let mut store = MetricsStore::new();
        store.merge(&MetricsPatch {
            focus_score: Some(55.0),
            gaze_board_percentage: Some(80.0),
            activity_type: Some(ActivityType::GroupWork),
            ..MetricsPatch::default()
        });

        store.merge(&MetricsPatch::noise_level(4.0));

        let current = store.current();
        assert_eq!(current.focus_score, 55.0);
        assert_eq!(current.gaze_board_percentage, 80.0);
        assert_eq!(current.activity_type, ActivityType::GroupWork);
        assert_eq!(current.noise_level, 4.0);
    }

    #[test]
    fn merge_clamps_out_of_range_values() {
        let mut store = MetricsStore::new();
        store.merge(&MetricsPatch {
            focus_score: Some(150.0),
            noise_level: Some(-5.0),
            heads_down_percentage: Some(-1.0),
            fidgeting_level: Some(22.0),
            ..MetricsPatch::default()
        });

        let current = store.current();
        assert_eq!(current.focus_score, 100.0);
        assert_eq!(current.noise_level, 0.0);
        assert_eq!(current.heads_down_percentage, 0.0);
        assert_eq!(current.fidgeting_level, 10.0);
    }

    #[test]
    fn first_focus_sample_reads_stable() {
        let mut store = MetricsStore::new();
        store.merge(&focus(35.0));
        assert_eq!(store.current().trend_last_5_min, TrendType::Stable);
    }

    #[test]
    fn trend_follows_consecutive_focus_scores() {
        let mut store = MetricsStore::new();

        store.merge(&focus(50.0));
        store.merge(&focus(70.0));
        assert_eq!(store.current().trend_last_5_min, TrendType::Increasing);

        store.merge(&focus(50.0));
        assert_eq!(store.current().trend_last_5_min, TrendType::Decreasing);

        store.merge(&focus(50.0));
        assert_eq!(store.current().trend_last_5_min, TrendType::Stable);
    }

    #[test]
    fn trend_compares_against_clamped_prior() {
        let mut store = MetricsStore::new();
        store.merge(&focus(150.0));
        // Stored as 100; an incoming 100 is equal, not a decrease.
        store.merge(&focus(100.0));
        assert_eq!(store.current().trend_last_5_min, TrendType::Stable);
    }

    #[test]
    fn reset_returns_to_baseline() {
        let mut store = MetricsStore::new();
        store.merge(&focus(75.0));
        store.reset();

        assert_eq!(store.current(), &ClassroomMetrics::default());
        // Next sample is a "first" sample again.
        store.merge(&focus(10.0));
        assert_eq!(store.current().trend_last_5_min, TrendType::Stable);
    }
}
