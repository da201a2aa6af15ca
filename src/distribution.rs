//! The waterfall allocation of paid and compensation usage over the tiers.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::{
    quantity::energy::KilowattHours,
    tier::{Tier, TierLimits},
};

/// Tier-keyed kilowatt-hours, enumerable in ascending tier order. Serialized with
/// the `bac1`..`bac6` keys of the persisted records.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierDistribution {
    bac1: KilowattHours,
    bac2: KilowattHours,
    bac3: KilowattHours,
    bac4: KilowattHours,
    bac5: KilowattHours,
    bac6: KilowattHours,
}

impl TierDistribution {
    pub fn iter(&self) -> impl Iterator<Item = (Tier, KilowattHours)> + '_ {
        Tier::ALL.into_iter().map(|tier| (tier, self[tier]))
    }

    pub fn total(&self) -> KilowattHours {
        Tier::ALL.into_iter().map(|tier| self[tier]).sum()
    }
}

impl Index<Tier> for TierDistribution {
    type Output = KilowattHours;

    fn index(&self, tier: Tier) -> &Self::Output {
        match tier {
            Tier::Bac1 => &self.bac1,
            Tier::Bac2 => &self.bac2,
            Tier::Bac3 => &self.bac3,
            Tier::Bac4 => &self.bac4,
            Tier::Bac5 => &self.bac5,
            Tier::Bac6 => &self.bac6,
        }
    }
}

impl IndexMut<Tier> for TierDistribution {
    fn index_mut(&mut self, tier: Tier) -> &mut Self::Output {
        match tier {
            Tier::Bac1 => &mut self.bac1,
            Tier::Bac2 => &mut self.bac2,
            Tier::Bac3 => &mut self.bac3,
            Tier::Bac4 => &mut self.bac4,
            Tier::Bac5 => &mut self.bac5,
            Tier::Bac6 => &mut self.bac6,
        }
    }
}

/// How a period's usage splits over the tiers: the already-invoiced part and the
/// part to be compensated. Each kilowatt-hour of either input lands in exactly
/// one tier.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub paid: TierDistribution,
    pub compensation: TierDistribution,
}

/// Split the total usage and the already-invoiced usage over the tiers with a
/// greedy waterfall, strictly in ascending tier order and without backtracking.
///
/// The invoiced usage fills the tiers first, against the cumulative caps. The
/// compensation usage (whatever of the total exceeds the invoiced amount) then
/// fills the remaining capacity of each tier; tier 6 absorbs any leftover.
/// Negative or non-finite inputs are treated as zero.
pub fn distribute(
    total_usage: KilowattHours,
    paid_amount: KilowattHours,
    limits: &TierLimits,
) -> Distribution {
    let total_usage = total_usage.sanitized();
    let paid_amount = paid_amount.sanitized();
    let remaining_usage = (total_usage - paid_amount).max(KilowattHours::ZERO);

    let mut paid = TierDistribution::default();
    let mut cumulative_caps = KilowattHours::ZERO;
    for tier in Tier::ALL {
        paid[tier] = match limits.cap(tier) {
            Some(cap) => {
                let share = (paid_amount - cumulative_caps).clamp(KilowattHours::ZERO, cap);
                cumulative_caps += cap;
                share
            }
            // The top tier takes whatever exceeds the five finite caps.
            None => (paid_amount - limits.total_finite()).max(KilowattHours::ZERO),
        };
    }

    let mut compensation = TierDistribution::default();
    let mut remaining = remaining_usage;
    for tier in Tier::ALL {
        let share = match limits.cap(tier) {
            Some(cap) => (cap - paid[tier]).max(KilowattHours::ZERO).min(remaining),
            None => remaining,
        };
        compensation[tier] = share;
        remaining -= share;
    }

    Distribution { paid, compensation }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::quantity::Quantity;

    fn kwh(distribution: TierDistribution) -> [f64; 6] {
        Tier::ALL.map(|tier| distribution[tier].0)
    }

    #[test]
    fn test_full_month_overflow() {
        // 500 kWh total, 200 already invoiced, one meter, full month.
        let result =
            distribute(Quantity(500.0), Quantity(200.0), &TierLimits::monthly(1));
        assert_eq!(kwh(result.paid), [50.0, 50.0, 100.0, 0.0, 0.0, 0.0]);
        assert_eq!(kwh(result.compensation), [0.0, 0.0, 0.0, 100.0, 100.0, 100.0]);
        assert_abs_diff_eq!(result.paid.total().0, 200.0);
        assert_abs_diff_eq!(result.compensation.total().0, 300.0);
    }

    #[test]
    fn test_low_usage_nothing_paid() {
        let result = distribute(Quantity(30.0), KilowattHours::ZERO, &TierLimits::monthly(1));
        assert_eq!(kwh(result.paid), [0.0; 6]);
        assert_eq!(kwh(result.compensation), [30.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_everything_already_invoiced() {
        let result =
            distribute(Quantity(250.0), Quantity(250.0), &TierLimits::monthly(1));
        assert_abs_diff_eq!(result.paid.total().0, 250.0);
        assert_eq!(result.compensation.total(), KilowattHours::ZERO);
    }

    #[test]
    fn test_paid_exceeds_total() {
        let result =
            distribute(Quantity(100.0), Quantity(150.0), &TierLimits::monthly(1));
        // The compensation clamps to zero; the invoiced part still distributes fully.
        assert_eq!(result.compensation.total(), KilowattHours::ZERO);
        assert_abs_diff_eq!(result.paid.total().0, 150.0);
    }

    #[test]
    fn test_paid_spills_into_top_tier() {
        let result =
            distribute(Quantity(700.0), Quantity(450.0), &TierLimits::monthly(1));
        assert_eq!(kwh(result.paid), [50.0, 50.0, 100.0, 100.0, 100.0, 50.0]);
        // Tiers 1–5 are exhausted by the invoiced usage, the rest is all tier 6.
        assert_eq!(kwh(result.compensation), [0.0, 0.0, 0.0, 0.0, 0.0, 250.0]);
    }

    #[test]
    fn test_ascending_fill_order() {
        let limits = TierLimits::monthly(1);
        let result = distribute(Quantity(180.0), Quantity(60.0), &limits);
        // A tier receives compensation only once every lower tier is full.
        let mut seen_partial = false;
        for tier in Tier::ALL {
            let allocated = result.paid[tier] + result.compensation[tier];
            if seen_partial {
                assert_eq!(allocated, KilowattHours::ZERO, "{tier} filled out of order");
            }
            if Some(allocated) != limits.cap(tier) {
                seen_partial = true;
            }
        }
    }

    #[test]
    fn test_zero_usage() {
        let result = distribute(KilowattHours::ZERO, KilowattHours::ZERO, &TierLimits::monthly(1));
        assert_eq!(result, Distribution::default());
    }

    #[test]
    fn test_negative_inputs_clamp() {
        let result =
            distribute(Quantity(-10.0), Quantity(-5.0), &TierLimits::monthly(1));
        assert_eq!(result, Distribution::default());
    }

    #[test]
    fn test_pure() {
        let limits = TierLimits::prorated(12.5, 3, 30);
        let first = distribute(Quantity(321.5), Quantity(87.0), &limits);
        let second = distribute(Quantity(321.5), Quantity(87.0), &limits);
        assert_eq!(first, second);
    }

    #[test]
    fn test_prorated_caps() {
        // 10 of 31 days, two meters: tier 1 cap ≈ 32.26 kWh.
        let limits = TierLimits::prorated(10.0, 2, 31);
        let result = distribute(Quantity(40.0), KilowattHours::ZERO, &limits);
        assert_abs_diff_eq!(result.compensation[Tier::Bac1].0, 32.258, epsilon = 1e-3);
        assert_abs_diff_eq!(result.compensation[Tier::Bac2].0, 40.0 - 32.258, epsilon = 1e-3);
    }
}
