//! Progressive consumption tiers (bậc thang) and their usage caps.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::quantity::{Quantity, energy::KilowattHours};

/// One of the six progressive price brackets. Tier 6 has no upper cap.
///
/// Serialized as `bac1`..`bac6`, the keys used by the persisted records.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bac1,
    Bac2,
    Bac3,
    Bac4,
    Bac5,
    Bac6,
}

impl Tier {
    /// All tiers in ascending fill order.
    pub const ALL: [Self; 6] =
        [Self::Bac1, Self::Bac2, Self::Bac3, Self::Bac4, Self::Bac5, Self::Bac6];

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bậc {}", self.index() + 1)
    }
}

/// Monthly caps of tiers 1–5 for a single household meter: 0–50, 51–100, 101–200,
/// 201–300 and 301–400 kWh. Everything above 400 kWh falls into tier 6.
const BASE_MONTHLY_CAPS: [KilowattHours; 5] = [
    Quantity(50.0),
    Quantity(50.0),
    Quantity(100.0),
    Quantity(100.0),
    Quantity(100.0),
];

/// Usage caps of the five finite tiers for one billing period.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierLimits([KilowattHours; 5]);

impl TierLimits {
    /// Full-month caps: the base caps scaled by the number of metered households.
    pub fn monthly(meter_count: u32) -> Self {
        Self(BASE_MONTHLY_CAPS.map(|cap| cap * f64::from(meter_count)))
    }

    /// Day-prorated caps for a period that does not cover the whole month.
    pub fn prorated(compensation_days: f64, meter_count: u32, days_in_month: u32) -> Self {
        let compensation_days = if compensation_days.is_finite() {
            compensation_days.max(0.0)
        } else {
            0.0
        };
        Self(BASE_MONTHLY_CAPS.map(|cap| {
            cap * f64::from(meter_count) / f64::from(days_in_month) * compensation_days
        }))
    }

    /// Caps for a violation period.
    ///
    /// The full-month decision is made on the nominal violation window, not on the
    /// compensation days: a period that lost days to outages still gets full-month
    /// caps when the violation window spans the month. The prorated branch, in
    /// contrast, scales by compensation days.
    pub fn for_period(
        violation_days: f64,
        compensation_days: f64,
        meter_count: u32,
        days_in_month: u32,
    ) -> Self {
        if violation_days >= f64::from(days_in_month) {
            Self::monthly(meter_count)
        } else {
            Self::prorated(compensation_days, meter_count, days_in_month)
        }
    }

    /// The cap of a tier, `None` for the unbounded tier 6.
    pub fn cap(&self, tier: Tier) -> Option<KilowattHours> {
        self.0.get(tier.index()).copied()
    }

    /// Sum of the five finite caps, the boundary above which usage spills into tier 6.
    pub fn total_finite(&self) -> KilowattHours {
        self.0.iter().copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_monthly() {
        let limits = TierLimits::monthly(2);
        assert_eq!(limits.cap(Tier::Bac1), Some(Quantity(100.0)));
        assert_eq!(limits.cap(Tier::Bac3), Some(Quantity(200.0)));
        assert_eq!(limits.cap(Tier::Bac6), None);
        assert_eq!(limits.total_finite(), Quantity(800.0));
    }

    #[test]
    fn test_prorated() {
        // 10 compensated days out of a 31-day month, two meters.
        let limits = TierLimits::prorated(10.0, 2, 31);
        let bac1 = limits.cap(Tier::Bac1).unwrap();
        assert_abs_diff_eq!(bac1.0, 50.0 * 2.0 / 31.0 * 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bac1.0, 32.258, epsilon = 1e-3);
    }

    #[test]
    fn test_full_month_decision_uses_violation_days() {
        // 31 nominal violation days with 2 outage days: still a full month.
        let limits = TierLimits::for_period(31.0, 29.0, 1, 31);
        assert_eq!(limits, TierLimits::monthly(1));

        // A 20-day window in the same month prorates by its compensation days.
        let limits = TierLimits::for_period(20.0, 18.0, 1, 31);
        assert_eq!(limits, TierLimits::prorated(18.0, 1, 31));
    }

    #[test]
    fn test_degenerate_days() {
        let limits = TierLimits::prorated(f64::NAN, 1, 30);
        assert_eq!(limits.total_finite(), KilowattHours::ZERO);
        let limits = TierLimits::prorated(-3.0, 1, 30);
        assert_eq!(limits.total_finite(), KilowattHours::ZERO);
    }
}
