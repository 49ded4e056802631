use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Season {
    /// Both ends are inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    pub fn start_year(&self) -> i32 {
        self.start_date.year()
    }

    pub fn has_started(&self, today: NaiveDate) -> bool {
        self.start_date < today
    }

    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.contains(today)
    }

    /// Two-digit start year followed by two-digit end year, e.g. `2425`.
    pub fn competition_code(&self) -> String {
        format!(
            "{}{}",
            self.start_date.format("%y"),
            self.end_date.format("%y")
        )
    }

    pub fn label(&self) -> String {
        format!(
            "Season '{} - '{}",
            self.start_date.format("%y"),
            self.end_date.format("%y")
        )
    }
}
