//! Violation periods and the monthly back-window they are surveyed over.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::tariff::TariffEra;

/// Number of days of a calendar month. Falls back to the legacy tool's 30-day
/// assumption for out-of-range input rather than failing the calculation.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next)) => u32::try_from((next - first).num_days()).unwrap_or(30),
        _ => 30,
    }
}

/// Accept both plain ISO dates and the datetime strings the legacy records carry
/// (`2024-10-01T00:00:00.000Z`): only the date part matters here.
fn deserialize_lenient_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<NaiveDate, D::Error> {
    let text = String::deserialize(deserializer)?;
    NaiveDate::from_str(text.get(..10).unwrap_or(&text)).map_err(|_| {
        de::Error::invalid_value(de::Unexpected::Str(&text), &"an ISO date or datetime")
    })
}

/// One month (or sub-month) of the violation window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationPeriod {
    pub month: u32,
    pub year: i32,

    #[serde(deserialize_with = "deserialize_lenient_date")]
    pub start_date: NaiveDate,

    #[serde(deserialize_with = "deserialize_lenient_date")]
    pub end_date: NaiveDate,

    /// Nominal days of violation within the period.
    pub violation_days: f64,

    /// Days of power outage within the violation window, excluded from billing.
    #[serde(default)]
    pub outage_days: f64,

    #[serde(default)]
    pub reason: String,

    /// Cached old/new-price flag from legacy records. Billing always rederives the
    /// era from `start_date`; the cache is kept only to round-trip saved data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_old_price: Option<bool>,
}

impl ViolationPeriod {
    fn over_range(month: u32, year: i32, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        let violation_days = f64::from(u32::try_from((end_date - start_date).num_days() + 1)
            .unwrap_or(0));
        Self {
            month,
            year,
            start_date,
            end_date,
            violation_days,
            outage_days: 0.0,
            reason: String::new(),
            is_old_price: Some(TariffEra::for_date(start_date).is_old_price()),
        }
    }

    /// A period covering the whole calendar month, `None` for an invalid month.
    pub fn full_month(month: u32, year: i32) -> Option<Self> {
        let start_date = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end_date = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
        Some(Self::over_range(month, year, start_date, end_date))
    }

    /// Days actually billable: the violation window minus outages, floored at zero.
    pub fn compensation_days(&self) -> f64 {
        let outage_days = if self.outage_days.is_finite() { self.outage_days } else { 0.0 };
        let violation_days = if self.violation_days.is_finite() { self.violation_days } else { 0.0 };
        (violation_days - outage_days).max(0.0)
    }

    /// The tariff era in force, derived from the start date. The persisted
    /// `isOldPrice` flag is never consulted.
    pub fn era(&self) -> TariffEra {
        TariffEra::for_date(self.start_date)
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// Lookup key into the per-period device and paid-usage maps. October 2024 is
    /// split at the tariff change, so its two sub-periods get a suffix.
    pub fn key(&self) -> String {
        if (self.month, self.year) == (10, 2024) {
            let suffix = if self.start_date.day() == 1 { 1 } else { 2 };
            format!("{}-{}-{suffix}", self.month, self.year)
        } else {
            format!("{}-{}", self.month, self.year)
        }
    }
}

/// The survey back-window: 13 calendar months up to and including the given one,
/// ascending. October 2024 straddles the tariff change and is split into the
/// 1–10 (old price) and 11–31 (new price) sub-periods.
pub fn monthly_periods(month: u32, year: i32) -> Vec<ViolationPeriod> {
    let mut periods = Vec::with_capacity(14);
    let (mut month, mut year) = (month, year);
    for _ in 0..13 {
        if (month, year) == (10, 2024) {
            let boundary = TariffEra::OCTOBER_2024_START;
            if let Some(last_old_day) = boundary.pred_opt()
                && let Some(first) = NaiveDate::from_ymd_opt(year, month, 1)
                && let Some(last) = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))
            {
                periods.push(ViolationPeriod::over_range(month, year, first, last_old_day));
                periods.push(ViolationPeriod::over_range(month, year, boundary, last));
            }
        } else if let Some(period) = ViolationPeriod::full_month(month, year) {
            periods.push(period);
        }
        (month, year) = if month == 1 { (12, year - 1) } else { (month - 1, year) };
    }
    periods.sort_by_key(|period| period.start_date);
    periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Result;

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 10), 31);
        assert_eq!(days_in_month(2024, 13), 30);
    }

    #[test]
    fn test_compensation_days() {
        let mut period = ViolationPeriod::full_month(3, 2024).unwrap();
        assert_eq!(period.violation_days, 31.0);
        period.outage_days = 2.5;
        assert_eq!(period.compensation_days(), 28.5);
        period.outage_days = 40.0;
        assert_eq!(period.compensation_days(), 0.0);
    }

    #[test]
    fn test_october_2024_split() {
        let periods = monthly_periods(12, 2024);
        assert_eq!(periods.len(), 14);

        let october: Vec<_> =
            periods.iter().filter(|period| (period.month, period.year) == (10, 2024)).collect();
        assert_eq!(october.len(), 2);
        assert_eq!(october[0].violation_days, 10.0);
        assert_eq!(october[0].key(), "10-2024-1");
        assert_eq!(october[0].era(), TariffEra::November2023);
        assert_eq!(october[1].violation_days, 21.0);
        assert_eq!(october[1].key(), "10-2024-2");
        assert_eq!(october[1].era(), TariffEra::October2024);
    }

    #[test]
    fn test_window_is_sorted_ascending() {
        let periods = monthly_periods(12, 2024);
        assert!(periods.windows(2).all(|pair| pair[0].start_date < pair[1].start_date));
        assert_eq!((periods[0].month, periods[0].year), (12, 2023));
    }

    #[test]
    fn test_window_without_split_month() {
        let periods = monthly_periods(6, 2023);
        assert_eq!(periods.len(), 13);
        assert_eq!(periods[0].key(), "6-2022");
    }

    #[test]
    fn test_lenient_dates() -> Result {
        let period: ViolationPeriod = serde_json::from_str(
            r#"{"month": 10, "year": 2024,
                "startDate": "2024-10-01T00:00:00.000Z",
                "endDate": "2024-10-10T23:59:59.999Z",
                "violationDays": 10, "outageDays": 0.5, "reason": "câu móc trực tiếp"}"#,
        )?;
        assert_eq!(period.start_date, NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
        assert_eq!(period.compensation_days(), 9.5);
        assert_eq!(period.era(), TariffEra::November2023);
        Ok(())
    }

    #[test]
    fn test_stale_cached_flag_is_ignored() -> Result {
        // A record claiming old price for a new-price period: the date wins.
        let period: ViolationPeriod = serde_json::from_str(
            r#"{"month": 11, "year": 2024, "startDate": "2024-11-01", "endDate": "2024-11-30",
                "violationDays": 30, "isOldPrice": true}"#,
        )?;
        assert_eq!(period.is_old_price, Some(true));
        assert!(!period.era().is_old_price());
        Ok(())
    }
}
