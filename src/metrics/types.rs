use serde::{Deserialize, Serialize};

/// What the class is currently doing, as reported by the vision collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Lecture,
    QuestionAnswer,
    GroupWork,
    Experiment,
    Game,
    Discussion,
}

impl Default for ActivityType {
    fn default() -> Self {
        ActivityType::Lecture
    }
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Lecture => "lecture",
            ActivityType::QuestionAnswer => "question_answer",
            ActivityType::GroupWork => "group_work",
            ActivityType::Experiment => "experiment",
            ActivityType::Game => "game",
            ActivityType::Discussion => "discussion",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendType {
    Increasing,
    Decreasing,
    Stable,
}

impl Default for TrendType {
    fn default() -> Self {
        TrendType::Stable
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FocusStatus {
    HighFocus,
    MediumFocus,
    LowFocus,
}

/// Canonical classroom engagement snapshot. Bounded fields stay clamped to
/// their declared range after every merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassroomMetrics {
    /// 0-100
    pub focus_score: f64,
    /// 0-100
    pub gaze_board_percentage: f64,
    /// 0-100
    pub heads_down_percentage: f64,
    /// 0-10
    pub fidgeting_level: f64,
    /// 0-10
    pub noise_level: f64,
    pub lesson_minute: u32,
    pub activity_type: ActivityType,
    pub trend_last_5_min: TrendType,
}

impl Default for ClassroomMetrics {
    fn default() -> Self {
        Self {
            focus_score: 0.0,
            gaze_board_percentage: 0.0,
            heads_down_percentage: 0.0,
            fidgeting_level: 0.0,
            noise_level: 0.0,
            lesson_minute: 0,
            activity_type: ActivityType::Lecture,
            trend_last_5_min: TrendType::Stable,
        }
    }
}

/// Field-subset patch from a sensor collaborator. Absent fields keep their
/// prior stored value; the trend is derived, never patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaze_board_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heads_down_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fidgeting_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_minute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<ActivityType>,
}

impl MetricsPatch {
    pub fn noise_level(level: f64) -> Self {
        Self {
            noise_level: Some(level),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Pedagogical advice from the generative collaborator. Replaced wholesale on
/// each successful dispatch, never partially mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Advice {
    pub overall_status: FocusStatus,
    pub summary: String,
    pub short_message: String,
    pub suggested_action_kind: String,
    pub suggested_phrase: String,
    pub alternative_activity_ideas: Vec<String>,
}
