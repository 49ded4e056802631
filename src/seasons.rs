use chrono::{Days, Months, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{db::SeasonStore, errors::AppError, models::Season};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    #[serde(alias = "d")]
    #[value(alias = "d")]
    Day,
    #[serde(alias = "w")]
    #[value(alias = "w")]
    Week,
    #[serde(alias = "m")]
    #[value(alias = "m")]
    Month,
    #[serde(alias = "q")]
    #[value(alias = "q")]
    Quarter,
    #[serde(alias = "y")]
    #[value(alias = "y")]
    Year,
}

impl DurationUnit {
    fn add_to(self, date: NaiveDate, duration: u32) -> Option<NaiveDate> {
        match self {
            DurationUnit::Day => date.checked_add_days(Days::new(duration.into())),
            DurationUnit::Week => date.checked_add_days(Days::new(u64::from(duration) * 7)),
            DurationUnit::Month => date.checked_add_months(Months::new(duration)),
            DurationUnit::Quarter => {
                date.checked_add_months(Months::new(duration.checked_mul(3)?))
            }
            DurationUnit::Year => date.checked_add_months(Months::new(duration.checked_mul(12)?)),
        }
    }
}

/// Interval of the season following one that ended on `previous_end`.
///
/// The new season starts the next day. Its end is the day before that start
/// moved forward by `duration` units, so a one-year season after
/// 2025-06-30 runs 2025-07-01 to 2026-06-30. Month-based units clamp to the
/// last day of shorter months.
pub fn next_season_bounds(
    previous_end: NaiveDate,
    duration: u32,
    unit: DurationUnit,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    if duration == 0 {
        return Err(AppError::BadRequest(
            "Season duration must be at least 1".into(),
        ));
    }

    let out_of_range = || AppError::BadRequest("Season dates out of range".into());
    let start = previous_end.succ_opt().ok_or_else(out_of_range)?;
    let end = unit
        .add_to(previous_end, duration)
        .ok_or_else(out_of_range)?;

    Ok((start, end))
}

/// Season containing `date`, or today's season when no date is given. "Today"
/// is read on every call.
pub async fn get_season(
    store: &dyn SeasonStore,
    date: Option<NaiveDate>,
) -> Result<Season, AppError> {
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let mut seasons = store.seasons_containing(date).await?;

    match seasons.len() {
        0 => Err(AppError::NotFound(format!("No season contains {date}"))),
        1 => Ok(seasons.remove(0)),
        _ => Err(AppError::AmbiguousSeason(format!(
            "Multiple seasons contain {date}: {}",
            seasons
                .iter()
                .map(|s| s.id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

pub async fn get_season_id(
    store: &dyn SeasonStore,
    date: Option<NaiveDate>,
) -> Result<i32, AppError> {
    Ok(get_season(store, date).await?.id)
}

pub async fn add_season(
    store: &dyn SeasonStore,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Season, AppError> {
    if end < start {
        return Err(AppError::BadRequest(
            "End date must not be before start date".into(),
        ));
    }
    store.insert_season(start, end).await
}

pub async fn create_next_season(
    store: &dyn SeasonStore,
    duration: u32,
    unit: DurationUnit,
) -> Result<Season, AppError> {
    let previous = store.latest_season().await?.ok_or_else(|| {
        AppError::BadRequest("No previous season to continue from".into())
    })?;

    let (start, end) = next_season_bounds(previous.end_date, duration, unit)?;
    let season = add_season(store, start, end).await?;

    tracing::info!(
        "Created {} following season {} ({} {:?})",
        season.label(),
        previous.id,
        duration,
        unit
    );
    Ok(season)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn yearly_season_follows_previous_end() {
        let (start, end) = next_season_bounds(d(2025, 6, 30), 1, DurationUnit::Year).unwrap();
        assert_eq!(start, d(2025, 7, 1));
        assert_eq!(end, d(2026, 6, 30));
    }

    #[test]
    fn day_and_week_units_count_inclusive_days() {
        let (start, end) = next_season_bounds(d(2025, 6, 30), 10, DurationUnit::Day).unwrap();
        assert_eq!(start, d(2025, 7, 1));
        assert_eq!(end, d(2025, 7, 10));

        let (_, end) = next_season_bounds(d(2025, 6, 30), 2, DurationUnit::Week).unwrap();
        assert_eq!(end, d(2025, 7, 14));
    }

    #[test]
    fn quarter_is_three_months() {
        let (start, end) = next_season_bounds(d(2024, 12, 31), 1, DurationUnit::Quarter).unwrap();
        assert_eq!(start, d(2025, 1, 1));
        assert_eq!(end, d(2025, 3, 31));
    }

    #[test]
    fn month_arithmetic_clamps_to_month_end() {
        let (start, end) = next_season_bounds(d(2025, 1, 30), 1, DurationUnit::Month).unwrap();
        assert_eq!(start, d(2025, 1, 31));
        assert_eq!(end, d(2025, 2, 28));
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert!(matches!(
            next_season_bounds(d(2025, 6, 30), 0, DurationUnit::Year),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn unit_accepts_short_and_long_names() {
        assert_eq!(DurationUnit::from_str("y", true).unwrap(), DurationUnit::Year);
        assert_eq!(
            DurationUnit::from_str("Quarter", true).unwrap(),
            DurationUnit::Quarter
        );
        assert!(DurationUnit::from_str("fortnight", true).is_err());

        let unit: DurationUnit = serde_json::from_str("\"m\"").unwrap();
        assert_eq!(unit, DurationUnit::Month);
    }
}
