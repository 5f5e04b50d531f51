use crate::habits::DailyRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardTier {
    pub threshold: f64,
    pub label: String,
}

impl RewardTier {
    pub fn new(threshold: f64, label: impl Into<String>) -> Self {
        Self {
            threshold,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HabitCounter {
    pub completed_days: u32,
    pub total_days: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
    pub gym: bool,
    pub has_gym_photo: bool,
    pub eating_completed: bool,
    pub completed_all: bool,
}

impl CalendarDay {
    pub fn from_record(record: &DailyRecord) -> Self {
        use chrono::Datelike;
        Self {
            date: record.date,
            day: record.date.day(),
            breakfast: record.breakfast,
            lunch: record.lunch,
            dinner: record.dinner,
            gym: record.gym,
            has_gym_photo: record.gym_photo.is_some(),
            eating_completed: record.eating_completed,
            completed_all: record.completed_all,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyProgress {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub eating_progress: HabitCounter,
    pub gym_progress: HabitCounter,
    pub overall_progress: f64,
    pub rewards_unlocked: Vec<String>,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoadmapMilestone {
    pub threshold: f64,
    pub label: String,
    // Perfect days needed over the whole month to reach `threshold`.
    pub days_required: u32,
    // Whether the pace so far (perfect days / days elapsed) has reached `threshold`.
    pub unlocked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyProgress {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub days_elapsed: u32,
    pub completed_days: u32,
    pub progress_percentage: f64,
    pub rewards_unlocked: Vec<String>,
    pub roadmap: Vec<RoadmapMilestone>,
    pub completed_workouts: u32,
    pub total_workouts: u32,
    pub workout_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakInfo {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_perfect_days: u32,
    pub last_perfect_day: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub today: DailyRecord,
    pub weekly: WeeklyProgress,
    pub monthly: MonthlyProgress,
    pub streak: StreakInfo,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    pub today: NaiveDate,
}
