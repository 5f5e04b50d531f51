use crate::errors::TrackerError;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub description: String,
    pub video_placeholder: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutDay {
    pub day: u32,
    pub name: String,
    pub exercises: Vec<Exercise>,
    pub is_active: bool,
    // Exercises can be ticked off and count toward completion.
    pub trackable: bool,
}

impl WorkoutDay {
    pub fn has_exercise(&self, name: &str) -> bool {
        self.exercises.iter().any(|exercise| exercise.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct WorkoutProgram {
    days: BTreeMap<u32, WorkoutDay>,
}

impl WorkoutProgram {
    pub fn new(days: impl IntoIterator<Item = WorkoutDay>) -> Self {
        Self {
            days: days.into_iter().map(|day| (day.day, day)).collect(),
        }
    }

    pub fn day(&self, day: u32) -> Result<&WorkoutDay, TrackerError> {
        self.days
            .get(&day)
            .ok_or_else(|| {
                TrackerError::not_found(format!("workout day {day} is not in the program"))
            })
    }

    pub fn days(&self) -> impl Iterator<Item = &WorkoutDay> {
        self.days.values()
    }

    // Four training days and an untracked core day.
    pub fn standard() -> Self {
        Self::new([
            workout_day(1, "Upper Body Power", UPPER_BODY, true),
            workout_day(2, "Lower Body Blast", LOWER_BODY, true),
            workout_day(3, "Full Body Flow", FULL_BODY, true),
            workout_day(4, "Cardio & Conditioning", CARDIO, true),
            workout_day(5, "Core", CORE, false),
        ])
    }
}

// name, sets, reps, description
type ExerciseRow = (&'static str, u32, &'static str, &'static str);

const UPPER_BODY: &[ExerciseRow] = &[
    ("Push-ups", 3, "12", "Hands under shoulders, lower chest to a fist above the floor."),
    ("Dumbbell rows", 3, "10", "Flat back, pull the elbow past the ribs."),
    ("Shoulder press", 3, "8", "Press overhead without arching the lower back."),
    ("Bicep curls", 2, "15", "Elbows pinned, slow on the way down."),
    ("Tricep dips", 2, "12", "Bench behind you, lower until elbows reach 90 degrees."),
];

const LOWER_BODY: &[ExerciseRow] = &[
    ("Squats", 4, "15", "Sit back and down, knees tracking the toes."),
    ("Lunges", 3, "12 each leg", "Long step, back knee hovers above the floor."),
    ("Glute bridges", 3, "15", "Drive through the heels, squeeze at the top."),
    ("Calf raises", 3, "20", "Full range, pause at the top."),
    ("Wall sit", 3, "30 seconds", "Thighs parallel to the floor, back flat on the wall."),
];

const FULL_BODY: &[ExerciseRow] = &[
    ("Deadlifts", 3, "10", "Hinge at the hips, bar close to the legs."),
    ("Push-up to T", 3, "8", "Rotate into a side plank after each push-up."),
    ("Squat to press", 3, "12", "Stand out of the squat straight into the press."),
    ("Plank to downward dog", 2, "10", "Push the hips up and back, then return."),
];

const CARDIO: &[ExerciseRow] = &[
    ("Mountain climbers", 3, "20", "Hips level, drive knees toward the chest."),
    ("Burpees", 2, "8", "Chest to floor, jump at the top."),
    ("Jumping jacks", 3, "30", "Land softly, keep a steady rhythm."),
    ("Cool down stretch", 1, "10 minutes", "Hold each stretch for 30 seconds."),
];

const CORE: &[ExerciseRow] = &[
    ("Plank", 3, "45 seconds", "Straight line from head to heels."),
    ("Russian twists", 3, "15", "Lean back slightly, rotate from the torso."),
    ("Dead bug", 3, "10 each side", "Lower back pressed into the floor."),
];

// Core day is neither scheduled training nor tracked.
fn workout_day(day: u32, name: &str, rows: &[ExerciseRow], training: bool) -> WorkoutDay {
    WorkoutDay {
        day,
        name: name.to_string(),
        exercises: rows
            .iter()
            .map(|&(name, sets, reps, description)| exercise(name, sets, reps, description))
            .collect(),
        is_active: training,
        trackable: training,
    }
}

fn exercise(name: &str, sets: u32, reps: &str, description: &str) -> Exercise {
    let slug = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>();
    Exercise {
        name: name.to_string(),
        sets,
        reps: reps.to_string(),
        description: description.to_string(),
        video_placeholder: format!("videos/{slug}.mp4"),
    }
}
