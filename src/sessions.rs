use crate::errors::TrackerError;
use crate::program::WorkoutDay;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProgress {
    pub exercise_name: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub date: NaiveDate,
    pub day: u32,
    pub workout_name: String,
    pub trackable: bool,
    pub exercises: Vec<ExerciseProgress>,
    #[serde(default)]
    pub completion_percentage: f64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkoutSession {
    pub fn seed(date: NaiveDate, workout: &WorkoutDay) -> Self {
        let mut session = Self {
            date,
            day: workout.day,
            workout_name: workout.name.clone(),
            trackable: workout.trackable,
            exercises: workout
                .exercises
                .iter()
                .map(|exercise| ExerciseProgress {
                    exercise_name: exercise.name.clone(),
                    completed: false,
                })
                .collect(),
            completion_percentage: 0.0,
            completed: false,
            status: SessionStatus::NotStarted,
            updated_at: None,
        };
        session.refresh();
        session
    }

    pub fn completed_count(&self) -> usize {
        self.exercises.iter().filter(|exercise| exercise.completed).count()
    }

    pub fn refresh(&mut self) {
        let total = self.exercises.len();
        let done = self.completed_count();
        self.completion_percentage = if total == 0 {
            0.0
        } else {
            done as f64 / total as f64 * 100.0
        };
        self.completed = self.trackable && total > 0 && done == total;
        self.status = if self.completed {
            SessionStatus::Completed
        } else if done == 0 {
            SessionStatus::NotStarted
        } else {
            SessionStatus::InProgress
        };
    }

    pub fn set_exercise(
        &mut self,
        exercise_name: &str,
        completed: bool,
    ) -> Result<(), TrackerError> {
        if !self.trackable {
            return Err(TrackerError::validation(format!(
                "workout day {} ({}) is not tracked",
                self.day, self.workout_name
            )));
        }
        let exercise = self
            .exercises
            .iter_mut()
            .find(|exercise| exercise.exercise_name == exercise_name)
            .ok_or_else(|| {
                TrackerError::not_found(format!(
                    "exercise '{exercise_name}' is not part of workout day {}",
                    self.day
                ))
            })?;
        exercise.completed = completed;
        self.refresh();
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToggleExerciseRequest {
    pub exercise_name: String,
    pub completed: bool,
}
