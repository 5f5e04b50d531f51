use crate::config::{Config, RewardConfig};
use crate::errors::TrackerError;
use crate::habits::{DailyRecord, HabitInput, HabitPatch};
use crate::models::{CalendarDay, MonthlyProgress, StreakInfo, Summary, WeeklyProgress};
use crate::program::{WorkoutDay, WorkoutProgram};
use crate::progress::{build_calendar, build_monthly, build_streak, build_weekly};
use crate::sessions::WorkoutSession;
use crate::store::Store;
use chrono::{Datelike, FixedOffset, NaiveDate, Utc};
use tracing::info;

// Aggregates are never cached; every call recomputes them from the store.
pub struct Tracker {
    store: Store,
    program: WorkoutProgram,
    rewards: RewardConfig,
    utc_offset: FixedOffset,
}

impl Tracker {
    pub fn new(store: Store, program: WorkoutProgram, config: &Config) -> Self {
        Self {
            store,
            program,
            rewards: config.rewards.clone(),
            utc_offset: config.utc_offset,
        }
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.utc_offset).date_naive()
    }

    pub fn program(&self) -> &WorkoutProgram {
        &self.program
    }

    pub async fn get_or_create(&self, date: NaiveDate) -> DailyRecord {
        self.store
            .habit(date)
            .await
            .unwrap_or_else(|| DailyRecord::new(date))
    }

    pub async fn update(
        &self,
        date: NaiveDate,
        patch: &HabitPatch,
    ) -> Result<DailyRecord, TrackerError> {
        patch.validate()?;
        let record = self
            .store
            .update_habit(date, |mut record| {
                record.apply(patch);
                record.updated_at = Some(Utc::now());
                Ok(record)
            })
            .await?;
        info!(%date, completed_all = record.completed_all, "updated habits");
        Ok(record)
    }

    pub async fn replace(&self, input: HabitInput) -> Result<DailyRecord, TrackerError> {
        let date = input.validate()?;
        let record = self
            .store
            .update_habit(date, |_| {
                let mut record = input.into_record(date);
                record.updated_at = Some(Utc::now());
                Ok(record)
            })
            .await?;
        info!(%date, completed_all = record.completed_all, "replaced habits");
        Ok(record)
    }

    pub async fn list_all(&self) -> Vec<DailyRecord> {
        self.store.read_habits().await.values().rev().cloned().collect()
    }

    pub async fn weekly_progress(&self) -> WeeklyProgress {
        self.weekly_progress_at(self.today()).await
    }

    pub async fn weekly_progress_at(&self, today: NaiveDate) -> WeeklyProgress {
        let habits = self.store.read_habits().await;
        build_weekly(today, &habits, &self.rewards.weekly)
    }

    pub async fn monthly_progress(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<MonthlyProgress, TrackerError> {
        let today = self.today();
        let year = year.unwrap_or(today.year());
        let month = month.unwrap_or(today.month());
        self.monthly_progress_at(today, year, month).await
    }

    pub async fn monthly_progress_at(
        &self,
        today: NaiveDate,
        year: i32,
        month: u32,
    ) -> Result<MonthlyProgress, TrackerError> {
        let (habits, sessions) = self.store.read_all().await;
        build_monthly(today, year, month, &habits, &sessions, &self.rewards.monthly)
    }

    pub async fn streak(&self) -> StreakInfo {
        self.streak_at(self.today()).await
    }

    pub async fn streak_at(&self, today: NaiveDate) -> StreakInfo {
        let habits = self.store.read_habits().await;
        build_streak(today, &habits)
    }

    pub async fn calendar(&self, year: i32, month: u32) -> Result<Vec<CalendarDay>, TrackerError> {
        let habits = self.store.read_habits().await;
        build_calendar(year, month, &habits)
    }

    // All parts come from one snapshot of the store.
    pub async fn summary_at(&self, today: NaiveDate) -> Result<Summary, TrackerError> {
        let (habits, sessions) = self.store.read_all().await;
        let monthly = build_monthly(
            today,
            today.year(),
            today.month(),
            &habits,
            &sessions,
            &self.rewards.monthly,
        )?;
        Ok(Summary {
            today: habits
                .get(&today)
                .cloned()
                .unwrap_or_else(|| DailyRecord::new(today)),
            weekly: build_weekly(today, &habits, &self.rewards.weekly),
            monthly,
            streak: build_streak(today, &habits),
        })
    }

    pub fn workout(&self, day: u32) -> Result<&WorkoutDay, TrackerError> {
        self.program.day(day)
    }

    pub async fn get_session(
        &self,
        date: NaiveDate,
        day: u32,
    ) -> Result<WorkoutSession, TrackerError> {
        let workout = self.program.day(day)?;
        Ok(self
            .store
            .session(date, day)
            .await
            .unwrap_or_else(|| WorkoutSession::seed(date, workout)))
    }

    pub async fn sessions_for_date(&self, date: NaiveDate) -> Vec<WorkoutSession> {
        let (_, sessions) = self.store.read_all().await;
        self.program
            .days()
            .map(|workout| {
                sessions
                    .get(&(date, workout.day))
                    .cloned()
                    .unwrap_or_else(|| WorkoutSession::seed(date, workout))
            })
            .collect()
    }

    pub async fn toggle_exercise(
        &self,
        date: NaiveDate,
        day: u32,
        exercise_name: &str,
        completed: bool,
    ) -> Result<WorkoutSession, TrackerError> {
        let workout = self.program.day(day)?;
        if !workout.has_exercise(exercise_name) {
            return Err(TrackerError::not_found(format!(
                "exercise '{exercise_name}' is not part of workout day {day}"
            )));
        }

        let session = self
            .store
            .update_session(
                date,
                day,
                || WorkoutSession::seed(date, workout),
                |mut session| {
                    session.set_exercise(exercise_name, completed)?;
                    session.updated_at = Some(Utc::now());
                    Ok(session)
                },
            )
            .await?;
        info!(
            %date,
            day,
            exercise = exercise_name,
            completed,
            status = ?session.status,
            "toggled exercise"
        );
        Ok(session)
    }
}
