use crate::errors::TrackerError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub breakfast: bool,
    #[serde(default)]
    pub lunch: bool,
    #[serde(default)]
    pub dinner: bool,
    #[serde(default)]
    pub gym: bool,
    #[serde(default)]
    pub gym_photo: Option<String>,
    #[serde(default)]
    pub eating_completed: bool,
    #[serde(default)]
    pub completed_all: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DailyRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            breakfast: false,
            lunch: false,
            dinner: false,
            gym: false,
            gym_photo: None,
            eating_completed: false,
            completed_all: false,
            updated_at: None,
        }
    }

    pub fn refresh(&mut self) {
        self.eating_completed = self.breakfast && self.lunch && self.dinner;
        self.completed_all = self.eating_completed && self.gym;
    }

    pub fn apply(&mut self, patch: &HabitPatch) {
        if let Some(value) = patch.breakfast {
            self.breakfast = value;
        }
        if let Some(value) = patch.lunch {
            self.lunch = value;
        }
        if let Some(value) = patch.dinner {
            self.dinner = value;
        }
        if let Some(value) = patch.gym {
            self.gym = value;
        }
        if let Some(photo) = &patch.gym_photo {
            self.gym_photo = photo.clone();
        }
        self.refresh();
    }
}

// `gym_photo` tells an absent key (keep the photo) from an explicit `null` (clear it).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HabitPatch {
    pub breakfast: Option<bool>,
    pub lunch: Option<bool>,
    pub dinner: Option<bool>,
    pub gym: Option<bool>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub gym_photo: Option<Option<String>>,
}

impl HabitPatch {
    pub fn is_empty(&self) -> bool {
        self.breakfast.is_none()
            && self.lunch.is_none()
            && self.dinner.is_none()
            && self.gym.is_none()
            && self.gym_photo.is_none()
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.is_empty() {
            return Err(TrackerError::validation(
                "update must set at least one of breakfast, lunch, dinner, gym, gym_photo",
            ));
        }
        match &self.gym_photo {
            Some(Some(photo)) => validate_photo(photo),
            _ => Ok(()),
        }
    }
}

fn validate_photo(photo: &str) -> Result<(), TrackerError> {
    if photo.trim().is_empty() {
        return Err(TrackerError::validation("gym_photo must not be blank"));
    }
    Ok(())
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HabitInput {
    pub date: String,
    #[serde(default)]
    pub breakfast: bool,
    #[serde(default)]
    pub lunch: bool,
    #[serde(default)]
    pub dinner: bool,
    #[serde(default)]
    pub gym: bool,
    #[serde(default)]
    pub gym_photo: Option<String>,
}

impl HabitInput {
    pub fn validate(&self) -> Result<NaiveDate, TrackerError> {
        if let Some(photo) = &self.gym_photo {
            validate_photo(photo)?;
        }
        parse_date(&self.date)
    }

    pub fn into_record(self, date: NaiveDate) -> DailyRecord {
        let mut record = DailyRecord::new(date);
        record.breakfast = self.breakfast;
        record.lunch = self.lunch;
        record.dinner = self.dinner;
        record.gym = self.gym;
        record.gym_photo = self.gym_photo;
        record.refresh();
        record
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, TrackerError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| TrackerError::validation(format!("'{value}' is not a YYYY-MM-DD date")))
}
