use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// One row of the food log. Every saved photo produces exactly one entry.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub date: NaiveDate,
    #[serde(with = "weekday_ser")]
    pub weekday: Weekday,
    pub label: Arc<str>,
    pub filename: String,
}

impl LogEntry {
    /// Date and weekday are both taken from `moment`, so they can never disagree.
    pub fn captured_at(moment: DateTime<Local>, label: Arc<str>, filename: String) -> Self {
        let date = moment.date_naive();
        Self {
            date,
            weekday: date.weekday(),
            label,
            filename,
        }
    }
}

mod weekday_ser {
    use chrono::Weekday;
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};

    use crate::utils::time::weekday_name;

    pub fn serialize<S>(weekday: &Weekday, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(weekday_name(*weekday))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Weekday, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Weekday>()
            .map_err(|_| D::Error::custom(format!("Unknown weekday {s}")))
    }
}
