//! Recurring bin-collection reminders.
//!
//! Only the schedule is kept here. Delivering notifications is left to the
//! client.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::storage::Storage;

const REMINDERS_KEY: &str = "bin_reminders";
const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    #[default]
    Garbage,
    Recycling,
    Compost,
    Custom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    pub fn interval_days(&self) -> i64 {
        match self {
            Frequency::Weekly => 7,
            Frequency::Biweekly => 14,
            Frequency::Monthly => 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Reminder {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    pub frequency: Frequency,
    /// 0 is Sunday.
    pub day_of_week: u32,
    /// `HH:MM`, 24-hour.
    pub time: String,
    pub enabled: bool,
    pub next_date: NaiveDate,
}

/// What a caller supplies when creating or replacing a reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ReminderDraft {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    pub frequency: Frequency,
    pub day_of_week: u32,
    pub time: String,
    pub enabled: bool,
}

impl Default for ReminderDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            kind: ReminderKind::Garbage,
            frequency: Frequency::Weekly,
            day_of_week: 1,
            time: "08:00".to_string(),
            enabled: true,
        }
    }
}

impl ReminderDraft {
    fn into_reminder(self, id: Uuid, today: NaiveDate) -> CoreResult<Reminder> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(CoreError::InvalidInput("reminder title is empty".to_string()));
        }
        if self.day_of_week > 6 {
            return Err(CoreError::InvalidInput(format!(
                "day_of_week must be 0-6, got {}",
                self.day_of_week
            )));
        }
        let time = NaiveTime::parse_from_str(self.time.trim(), TIME_FORMAT).map_err(|_| {
            CoreError::InvalidInput(format!("time must be HH:MM, got {}", self.time))
        })?;
        Ok(Reminder {
            id,
            title: title.to_string(),
            kind: self.kind,
            frequency: self.frequency,
            day_of_week: self.day_of_week,
            time: time.format(TIME_FORMAT).to_string(),
            enabled: self.enabled,
            next_date: next_date(self.day_of_week, self.frequency, today),
        })
    }
}

/// The next collection day after `today`. When `day_of_week` is today the
/// reminder rolls forward by one full interval.
pub fn next_date(day_of_week: u32, frequency: Frequency, today: NaiveDate) -> NaiveDate {
    let today_index = today.weekday().num_days_from_sunday();
    let days = match (day_of_week % 7 + 7 - today_index) % 7 {
        0 => frequency.interval_days(),
        days => i64::from(days),
    };
    today + Duration::days(days)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderBook {
    reminders: Vec<Reminder>,
}

impl ReminderBook {
    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn add(&mut self, draft: ReminderDraft, today: NaiveDate) -> CoreResult<&Reminder> {
        let reminder = draft.into_reminder(Uuid::new_v4(), today)?;
        self.reminders.push(reminder);
        let index = self.reminders.len() - 1;
        Ok(&self.reminders[index])
    }

    /// Replaces every field but the id and recomputes the next date.
    pub fn update(
        &mut self,
        id: Uuid,
        draft: ReminderDraft,
        today: NaiveDate,
    ) -> CoreResult<&Reminder> {
        let index = self.position(id)?;
        self.reminders[index] = draft.into_reminder(id, today)?;
        Ok(&self.reminders[index])
    }

    pub fn remove(&mut self, id: Uuid) -> CoreResult<Reminder> {
        let index = self.position(id)?;
        Ok(self.reminders.remove(index))
    }

    fn position(&self, id: Uuid) -> CoreResult<usize> {
        self.reminders
            .iter()
            .position(|reminder| reminder.id == id)
            .ok_or_else(|| CoreError::NotFound(format!("reminder {id}")))
    }

    pub async fn load(storage: &dyn Storage) -> CoreResult<Self> {
        let reminders = match storage.read(&[REMINDERS_KEY]).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|error| CoreError::Internal(format!("invalid reminders: {error}")))?,
            None => Vec::new(),
        };
        Ok(Self { reminders })
    }

    pub async fn save(&self, storage: &dyn Storage) -> CoreResult<()> {
        let value = serde_json::to_value(&self.reminders)
            .map_err(|error| CoreError::Internal(format!("reminders serialize error: {error}")))?;
        storage.write(&[REMINDERS_KEY], &value).await
    }
}
