//! Calendar & Demand Builder (spec.md §4.1).
//!
//! Derives `num_days` and the per-day staffing demand (the "daily wallet") from the
//! (year, month, weekday template, weekend template, holiday oracle) inputs.

use crate::duty::Duty;
use crate::error::{RosterError, RosterResult};
use crate::request::{DailyWalletConfig, DutyCounts};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{BTreeMap, HashSet};

/// Abstracts the country/year holiday lookup behind a pure function so the calendar
/// builder stays testable without network access (spec.md §9).
pub trait HolidayOracle {
    /// Returns the set of `(month, day)` pairs that are holidays in `year`.
    fn holidays(&self, year: i32) -> HashSet<(u32, u32)>;
}

/// An oracle with no holidays; every weekend-like day comes purely from the weekday.
pub struct NoHolidays;

impl HolidayOracle for NoHolidays {
    fn holidays(&self, _year: i32) -> HashSet<(u32, u32)> {
        HashSet::new()
    }
}

/// A fixed, pre-computed holiday set, useful for tests and for callers who resolve
/// holidays themselves before invoking the core.
pub struct FixedHolidays(pub HashSet<(u32, u32)>);

impl HolidayOracle for FixedHolidays {
    fn holidays(&self, _year: i32) -> HashSet<(u32, u32)> {
        self.0.clone()
    }
}

/// `day -> {D,E,N,X}` demand for that day. `sum(counts) == nurse_count` is an invariant
/// checked by the input validator, not enforced here.
pub type DailyWallet = BTreeMap<i64, DutyCounts>;

#[derive(Debug)]
pub struct CalendarResult {
    pub num_days: i64,
    pub daily_wallet: DailyWallet,
    /// `day -> true` if the day is weekend-like (Sat/Sun or a holiday).
    pub weekend_like: BTreeMap<i64, bool>,
}

fn days_in_month(year: i32, month: u32) -> RosterResult<i64> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| RosterError::Config(format!("invalid year/month: {}-{}", year, month)))?;
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| RosterError::Config(format!("invalid year/month: {}-{}", year, month)))?;
    Ok((next_month_first - first).num_days())
}

fn validate_template(template: &DutyCounts, label: &str) -> RosterResult<()> {
    for duty in crate::duty::ALL_DUTIES {
        if template.get(duty) < 0 {
            return Err(RosterError::Config(format!(
                "{} template is missing a valid count for duty {}",
                label,
                duty.as_str()
            )));
        }
    }
    Ok(())
}

/// Builds the calendar and the daily wallet from the month's configuration.
pub fn build_calendar<H: HolidayOracle>(
    year: i32,
    month: u32,
    config: &DailyWalletConfig,
    holiday_oracle: &H,
) -> RosterResult<CalendarResult> {
    validate_template(&config.weekday, "weekday")?;
    validate_template(&config.weekend, "weekend")?;

    let num_days = days_in_month(year, month)?;
    let holidays = holiday_oracle.holidays(year);

    let mut daily_wallet = DailyWallet::new();
    let mut weekend_like = BTreeMap::new();

    for day in 1..=num_days {
        let date = NaiveDate::from_ymd_opt(year, month, day as u32)
            .ok_or_else(|| RosterError::Config(format!("invalid day {} in {}-{}", day, year, month)))?;
        let is_weekend =
            matches!(date.weekday(), Weekday::Sat | Weekday::Sun) || holidays.contains(&(month, day as u32));

        daily_wallet.insert(day, if is_weekend { config.weekend } else { config.weekday });
        weekend_like.insert(day, is_weekend);
    }

    Ok(CalendarResult {
        num_days,
        daily_wallet,
        weekend_like,
    })
}

/// Summed monthly demand for a single duty across the whole daily wallet.
pub fn monthly_total(daily_wallet: &DailyWallet, duty: Duty) -> i64 {
    daily_wallet.values().map(|counts| counts.get(duty)).sum()
}

/// Number of weekend-like days in the month.
pub fn weekends_in_month(weekend_like: &BTreeMap<i64, bool>) -> i64 {
    weekend_like.values().filter(|w| **w).count() as i64
}

/// Number of weekend-like days within an inclusive `[start, end]` day range.
pub fn weekends_within(weekend_like: &BTreeMap<i64, bool>, start: i64, end: i64) -> i64 {
    weekend_like
        .iter()
        .filter(|(day, is_weekend)| **day >= start && **day <= end && **is_weekend)
        .count() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::DutyCounts;

    fn template(d: i64, e: i64, n: i64, x: i64) -> DutyCounts {
        DutyCounts { d, e, n, x }
    }

    fn config() -> DailyWalletConfig {
        DailyWalletConfig {
            weekday: template(2, 2, 2, 2),
            weekend: template(1, 1, 1, 5),
        }
    }

    #[test]
    fn february_non_leap_year_has_28_days() {
        let result = build_calendar(2025, 2, &config(), &NoHolidays).unwrap();
        assert_eq!(result.num_days, 28);
    }

    #[test]
    fn february_leap_year_has_29_days() {
        let result = build_calendar(2024, 2, &config(), &NoHolidays).unwrap();
        assert_eq!(result.num_days, 29);
    }

    #[test]
    fn holiday_marks_a_weekday_as_weekend_like() {
        // 2025-02-03 is a Monday.
        let oracle = FixedHolidays(HashSet::from([(2, 3)]));
        let result = build_calendar(2025, 2, &config(), &oracle).unwrap();
        assert!(result.weekend_like[&3]);
        assert_eq!(result.daily_wallet[&3].x, 5);
    }

    #[test]
    fn month_starting_on_a_weekend_uses_weekend_template_for_day_one() {
        // 2025-03-01 is a Saturday.
        let result = build_calendar(2025, 3, &config(), &NoHolidays).unwrap();
        assert!(result.weekend_like[&1]);
    }

    #[test]
    fn missing_duty_in_template_is_a_config_error() {
        let mut bad = config();
        bad.weekday.x = -1;
        let err = build_calendar(2025, 2, &bad, &NoHolidays).unwrap_err();
        assert!(matches!(err, RosterError::Config(_)));
    }
}
