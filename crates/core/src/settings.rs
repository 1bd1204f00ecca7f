//! Per-device reader settings kept next to the bundle cache.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::cohort::birth_year_to_cohort;
use crate::store::KvStore;

pub const BIRTH_YEAR_KEY: &str = "birthYear";
pub const META_REMINDER_ENABLED: &str = "meta:reminderEnabled";
pub const META_REMINDER_TIME: &str = "meta:reminderTime";
pub const DEFAULT_REMINDER_TIME: &str = "21:00";

/// Daily reminder preference. Scheduling is done by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReminderSettings {
    pub enabled: bool,
    /// `HH:MM`, 24-hour.
    pub time: String,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self { enabled: false, time: DEFAULT_REMINDER_TIME.to_string() }
    }
}

/// Split `HH:MM` into clamped (hour, minute). Unparseable parts fall back to 21:00.
pub fn split_time(t: &str) -> (u32, u32) {
    let mut parts = t.split(':');
    let h = parts.next().and_then(|p| p.trim().parse::<i64>().ok());
    let m = parts.next().and_then(|p| p.trim().parse::<i64>().ok());
    (h.map_or(21, |h| h.clamp(0, 23) as u32), m.map_or(0, |m| m.clamp(0, 59) as u32))
}

pub fn compose_time(h: u32, m: u32) -> String {
    format!("{h:02}:{m:02}")
}

static HH_MM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}$").expect("static pattern"));

fn is_hh_mm(t: &str) -> bool {
    HH_MM.is_match(t)
}

/// Reader settings over the device store.
#[derive(Clone)]
pub struct ReaderSettings {
    kv: Arc<dyn KvStore>,
}

impl ReaderSettings {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Stored birth year, if present and numeric.
    pub async fn birth_year(&self) -> Option<i32> {
        let raw = self.kv.get(BIRTH_YEAR_KEY).await.ok().flatten()?;
        raw.trim().parse().ok()
    }

    pub async fn set_birth_year(&self, year: i32) -> Result<(), Error> {
        if !(1900..=2100).contains(&year) {
            return Err(Error::InvalidInput(format!("birth year out of range: {year}")));
        }
        self.kv.set(BIRTH_YEAR_KEY, &year.to_string()).await?;
        Ok(())
    }

    /// Cohort derived from the stored birth year.
    pub async fn own_cohort(&self) -> Option<String> {
        self.birth_year().await.map(birth_year_to_cohort)
    }

    /// Reminder preference; malformed or missing values read as defaults.
    pub async fn reminder(&self) -> ReminderSettings {
        let enabled = self.kv.get(META_REMINDER_ENABLED).await.ok().flatten();
        let time = self.kv.get(META_REMINDER_TIME).await.ok().flatten();
        ReminderSettings {
            enabled: enabled.as_deref() == Some("1"),
            time: time.filter(|t| is_hh_mm(t)).unwrap_or_else(|| DEFAULT_REMINDER_TIME.to_string()),
        }
    }

    /// Persist the reminder preference, normalizing the time to clamped `HH:MM`.
    pub async fn set_reminder(&self, enabled: bool, time: &str) -> Result<ReminderSettings, Error> {
        let (h, m) = split_time(time);
        let settings = ReminderSettings { enabled, time: compose_time(h, m) };
        self.kv
            .set(META_REMINDER_ENABLED, if enabled { "1" } else { "0" })
            .await?;
        self.kv.set(META_REMINDER_TIME, &settings.time).await?;
        Ok(settings)
    }
}
