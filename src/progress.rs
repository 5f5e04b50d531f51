use crate::errors::TrackerError;
use crate::habits::DailyRecord;
use crate::models::{
    CalendarDay, HabitCounter, MonthlyProgress, RewardTier, RoadmapMilestone, StreakInfo,
    WeeklyProgress,
};
use crate::sessions::WorkoutSession;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

pub type Habits = BTreeMap<NaiveDate, DailyRecord>;
pub type Sessions = BTreeMap<(NaiveDate, u32), WorkoutSession>;

const WEEK_DAYS: u32 = 7;
const GYM_DAYS_PER_WEEK: u32 = 4;

pub fn build_weekly(today: NaiveDate, habits: &Habits, tiers: &[RewardTier]) -> WeeklyProgress {
    let week_start = today - Duration::days(i64::from(WEEK_DAYS) - 1);

    let mut days = Vec::with_capacity(WEEK_DAYS as usize);
    for offset in (0..i64::from(WEEK_DAYS)).rev() {
        days.push(day_summary(habits, today - Duration::days(offset)));
    }

    let eating_days = days.iter().filter(|day| day.eating_completed).count() as u32;
    let gym_days = days.iter().filter(|day| day.gym).count() as u32;

    let eating_progress = counter(eating_days, WEEK_DAYS);
    let gym_progress = counter(gym_days, GYM_DAYS_PER_WEEK);
    let overall_progress = (eating_progress.percentage + gym_progress.percentage) / 2.0;

    WeeklyProgress {
        week_start,
        week_end: today,
        rewards_unlocked: unlocked_rewards(tiers, overall_progress),
        eating_progress,
        gym_progress,
        overall_progress,
        days,
    }
}

pub fn build_monthly(
    today: NaiveDate,
    year: i32,
    month: u32,
    habits: &Habits,
    sessions: &Sessions,
    tiers: &[RewardTier],
) -> Result<MonthlyProgress, TrackerError> {
    let first = month_start(year, month)?;
    let days_in_month = days_in_month(first);
    let last = first + Duration::days(i64::from(days_in_month) - 1);

    let days_elapsed = if today < first {
        0
    } else if today > last {
        days_in_month
    } else {
        today.day()
    };
    let window_end = first + Duration::days(i64::from(days_elapsed));

    let completed_days = habits
        .range(first..window_end)
        .filter(|(_, record)| record.completed_all)
        .count() as u32;
    let progress_percentage = percentage(completed_days, days_elapsed);

    let completed_workouts = sessions
        .range((first, 0)..(window_end, 0))
        .filter(|(_, session)| session.completed)
        .count() as u32;
    let total_workouts = GYM_DAYS_PER_WEEK * days_in_month.div_ceil(WEEK_DAYS);

    let roadmap = sorted_tiers(tiers)
        .into_iter()
        .map(|tier| RoadmapMilestone {
            threshold: tier.threshold,
            label: tier.label.clone(),
            days_required: (tier.threshold * f64::from(days_in_month) / 100.0).ceil() as u32,
            unlocked: progress_percentage >= tier.threshold,
        })
        .collect();

    Ok(MonthlyProgress {
        year,
        month,
        days_in_month,
        days_elapsed,
        completed_days,
        progress_percentage,
        rewards_unlocked: unlocked_rewards(tiers, progress_percentage),
        roadmap,
        completed_workouts,
        total_workouts,
        workout_percentage: percentage(completed_workouts, total_workouts).min(100.0),
    })
}

// An unfinished today does not break the run; counting then starts from yesterday.
pub fn build_streak(today: NaiveDate, habits: &Habits) -> StreakInfo {
    let is_perfect = |date: NaiveDate| habits.get(&date).is_some_and(|record| record.completed_all);

    let mut cursor = if is_perfect(today) { today } else { today - Duration::days(1) };
    let mut current_streak = 0;
    while is_perfect(cursor) {
        current_streak += 1;
        cursor -= Duration::days(1);
    }

    let mut longest_streak = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    let mut total_perfect_days = 0;
    for date in habits.values().filter(|record| record.completed_all).map(|record| record.date) {
        total_perfect_days += 1;
        run = match previous {
            Some(prev) if date - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest_streak = longest_streak.max(run);
        previous = Some(date);
    }

    StreakInfo {
        current_streak,
        longest_streak,
        total_perfect_days,
        last_perfect_day: previous,
    }
}

pub fn build_calendar(
    year: i32,
    month: u32,
    habits: &Habits,
) -> Result<Vec<CalendarDay>, TrackerError> {
    let first = month_start(year, month)?;
    Ok((0..days_in_month(first))
        .map(|offset| day_summary(habits, first + Duration::days(i64::from(offset))))
        .collect())
}

pub fn unlocked_rewards(tiers: &[RewardTier], progress: f64) -> Vec<String> {
    sorted_tiers(tiers)
        .into_iter()
        .filter(|tier| progress >= tier.threshold)
        .map(|tier| tier.label.clone())
        .collect()
}

fn sorted_tiers(tiers: &[RewardTier]) -> Vec<&RewardTier> {
    let mut sorted: Vec<&RewardTier> = tiers.iter().collect();
    sorted.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
    sorted
}

fn day_summary(habits: &Habits, date: NaiveDate) -> CalendarDay {
    match habits.get(&date) {
        Some(record) => CalendarDay::from_record(record),
        None => CalendarDay::from_record(&DailyRecord::new(date)),
    }
}

fn counter(completed_days: u32, total_days: u32) -> HabitCounter {
    HabitCounter {
        completed_days,
        total_days,
        percentage: percentage(completed_days, total_days).min(100.0),
    }
}

fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole) * 100.0
    }
}

fn month_start(year: i32, month: u32) -> Result<NaiveDate, TrackerError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| TrackerError::validation(format!("{year}-{month:02} is not a valid month")))
}

fn days_in_month(first: NaiveDate) -> u32 {
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    match next {
        Some(next) => (next - first).num_days() as u32,
        // Last representable month; chrono's range ends on Dec 31.
        None => 31,
    }
}
