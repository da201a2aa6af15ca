//! Per-period calculations and the customer-level billing rollup.

use bon::Builder;
use serde::Serialize;

use crate::{
    device::{Device, total_power_usage},
    distribution::{Distribution, distribute},
    period::ViolationPeriod,
    prelude::*,
    quantity::{energy::KilowattHours, money::Dong},
    tariff::{CustomerCategory, Schedule, TariffEra},
    tier::{Tier, TierLimits},
};

/// Compensation invoices carry the reduced 8 % VAT rate.
pub const VAT_RATE: f64 = 0.08;

/// One violation period with everything resolved: the device usage, the tier
/// caps and the paid/compensation distribution.
#[derive(Clone, Debug, Serialize)]
pub struct PeriodCalculation {
    pub period: ViolationPeriod,
    pub devices: Vec<Device>,
    pub paid_electricity: KilowattHours,
    pub total_usage: KilowattHours,
    pub limits: TierLimits,
    pub distribution: Distribution,
    pub era: TariffEra,
}

/// Inputs of a single period calculation. Built fresh on every recomputation;
/// nothing here is mutated in place.
#[derive(Builder)]
pub struct PeriodInputs<'a> {
    period: &'a ViolationPeriod,

    #[builder(default)]
    devices: &'a [Device],

    #[builder(default)]
    paid_electricity: KilowattHours,

    #[builder(default = 1)]
    meter_count: u32,
}

impl PeriodInputs<'_> {
    #[instrument(skip_all, fields(period = %self.period.key()))]
    pub fn calculate(self) -> PeriodCalculation {
        let total_usage = total_power_usage(self.devices, self.meter_count);
        let limits = TierLimits::for_period(
            self.period.violation_days,
            self.period.compensation_days(),
            self.meter_count,
            self.period.days_in_month(),
        );
        let distribution = distribute(total_usage, self.paid_electricity, &limits);
        trace!(
            total_usage = %total_usage,
            paid = %self.paid_electricity,
            compensation = %distribution.compensation.total(),
            "calculated",
        );
        PeriodCalculation {
            era: self.period.era(),
            period: self.period.clone(),
            devices: self.devices.to_vec(),
            paid_electricity: self.paid_electricity,
            total_usage,
            limits,
            distribution,
        }
    }
}

/// Compensated usage and its monetary amount for one tier.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct TierTotal {
    pub usage: KilowattHours,
    pub amount: Dong,
}

/// Per-tier sums for one price era bucket.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct EraBucket([TierTotal; 6]);

impl EraBucket {
    fn add(&mut self, tier: Tier, usage: KilowattHours, amount: Dong) {
        let total = &mut self.0[tier.index()];
        total.usage += usage;
        total.amount += amount;
    }

    pub fn get(&self, tier: Tier) -> TierTotal {
        self.0[tier.index()]
    }

    pub fn total_usage(&self) -> KilowattHours {
        self.0.iter().map(|total| total.usage).sum()
    }

    pub fn total_amount(&self) -> Dong {
        self.0.iter().map(|total| total.amount).sum()
    }
}

/// The customer-level rollup: old-price and new-price buckets, the grand totals
/// and the cross-check figures.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CustomerTotals {
    pub old_price: EraBucket,
    pub new_price: EraBucket,
    pub total_power_usage: KilowattHours,
    pub total_paid_usage: KilowattHours,
    pub total_compensation_usage: KilowattHours,
}

impl CustomerTotals {
    /// Accumulate all periods. A period with no devices or days contributes zero;
    /// partially-filled in-progress data must never fail the rollup.
    #[instrument(skip_all, fields(n_periods = calculations.len()))]
    pub fn aggregate(calculations: &[PeriodCalculation], schedule: &Schedule) -> Self {
        let mut totals = Self::default();
        for calculation in calculations {
            // Always rederived from the date, never from a persisted flag.
            let era = calculation.period.era();
            let bucket = if era.is_old_price() {
                &mut totals.old_price
            } else {
                &mut totals.new_price
            };
            for (tier, usage) in calculation.distribution.compensation.iter() {
                bucket.add(tier, usage, usage * schedule.tier_price(era, tier));
            }
            totals.total_power_usage += calculation.total_usage;
            totals.total_paid_usage += calculation.distribution.paid.total();
            totals.total_compensation_usage += calculation.distribution.compensation.total();
        }
        totals
    }

    /// Old-price plus new-price amounts, before VAT.
    pub fn grand_total(&self) -> Dong {
        self.old_price.total_amount() + self.new_price.total_amount()
    }

    pub fn vat(&self) -> Dong {
        self.grand_total() * VAT_RATE
    }

    pub fn final_total(&self) -> Dong {
        self.grand_total() + self.vat()
    }

    /// Cross-check figure: measured usage not covered by issued invoices.
    pub fn usage_difference(&self) -> KilowattHours {
        self.total_power_usage - self.total_paid_usage
    }
}

/// Rollup for the flat-rate categories (business, production): no tiers, one
/// old and one new per-kWh rate. `None` for households, which bill tiered.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FlatTotals {
    pub old_usage: KilowattHours,
    pub old_amount: Dong,
    pub new_usage: KilowattHours,
    pub new_amount: Dong,
}

impl FlatTotals {
    pub fn aggregate(
        calculations: &[PeriodCalculation],
        category: CustomerCategory,
    ) -> Option<Self> {
        category.flat_rate(TariffEra::October2024)?;
        let mut totals = Self::default();
        for calculation in calculations {
            let era = calculation.period.era();
            let rate = category.flat_rate(era)?;
            let compensation = calculation.distribution.compensation.total();
            if era.is_old_price() {
                totals.old_usage += compensation;
                totals.old_amount += compensation * rate;
            } else {
                totals.new_usage += compensation;
                totals.new_amount += compensation * rate;
            }
        }
        Some(totals)
    }

    pub fn grand_total(&self) -> Dong {
        self.old_amount + self.new_amount
    }

    pub fn vat(&self) -> Dong {
        self.grand_total() * VAT_RATE
    }

    pub fn final_total(&self) -> Dong {
        self.grand_total() + self.vat()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::quantity::Quantity;

    fn heater(days_per_period: f64) -> Device {
        Device {
            name: "Bình nóng lạnh".to_string(),
            unit: "cái".to_string(),
            quantity: 1.0,
            power: Quantity(1.0),
            cos_phi: 1.0,
            hours_per_day: Quantity(4.0),
            days_per_period,
        }
    }

    /// 100 kWh over each of two full months, one per price era.
    fn two_era_calculations() -> Vec<PeriodCalculation> {
        let devices = [heater(25.0)];
        [(9, 2024), (11, 2024)]
            .into_iter()
            .map(|(month, year)| {
                let period = ViolationPeriod::full_month(month, year).unwrap();
                PeriodInputs::builder().period(&period).devices(&devices).build().calculate()
            })
            .collect()
    }

    #[test]
    fn test_two_era_rollup() {
        let schedule = Schedule::default();
        let totals = CustomerTotals::aggregate(&two_era_calculations(), &schedule);

        // 100 kWh per period: 50 kWh in tier 1, 50 kWh in tier 2.
        assert_abs_diff_eq!(totals.old_price.get(Tier::Bac1).usage.0, 50.0);
        assert_abs_diff_eq!(totals.old_price.total_amount().0, 50.0 * 1806.0 + 50.0 * 1866.0);
        assert_abs_diff_eq!(totals.new_price.total_amount().0, 50.0 * 1893.0 + 50.0 * 1956.0);

        assert_abs_diff_eq!(totals.grand_total().0, 183_600.0 + 192_450.0);
        assert_abs_diff_eq!(totals.vat().0, 376_050.0 * 0.08);
        assert_abs_diff_eq!(totals.final_total().0, 376_050.0 * 1.08);

        assert_abs_diff_eq!(totals.total_power_usage.0, 200.0);
        assert_abs_diff_eq!(totals.total_compensation_usage.0, 200.0);
        assert_abs_diff_eq!(totals.usage_difference().0, 200.0);
    }

    #[test]
    fn test_paid_usage_reduces_compensation() {
        let period = ViolationPeriod::full_month(9, 2024).unwrap();
        let devices = [heater(25.0)];
        let calculation = PeriodInputs::builder()
            .period(&period)
            .devices(&devices)
            .paid_electricity(Quantity(60.0))
            .build()
            .calculate();
        let totals = CustomerTotals::aggregate(&[calculation], &Schedule::default());
        assert_abs_diff_eq!(totals.total_paid_usage.0, 60.0);
        assert_abs_diff_eq!(totals.total_compensation_usage.0, 40.0);
        assert_abs_diff_eq!(totals.usage_difference().0, 40.0);
    }

    #[test]
    fn test_empty_and_deviceless_periods() {
        let schedule = Schedule::default();
        let totals = CustomerTotals::aggregate(&[], &schedule);
        assert_eq!(totals.grand_total(), Dong::ZERO);

        let period = ViolationPeriod::full_month(5, 2024).unwrap();
        let calculation = PeriodInputs::builder().period(&period).build().calculate();
        let totals = CustomerTotals::aggregate(&[calculation], &schedule);
        assert_eq!(totals.grand_total(), Dong::ZERO);
        assert_eq!(totals.total_power_usage, KilowattHours::ZERO);
    }

    #[test]
    fn test_flat_rollup() {
        let totals =
            FlatTotals::aggregate(&two_era_calculations(), CustomerCategory::Production).unwrap();
        assert_abs_diff_eq!(totals.old_usage.0, 100.0);
        assert_abs_diff_eq!(totals.old_amount.0, 100.0 * 1809.0);
        assert_abs_diff_eq!(totals.new_amount.0, 100.0 * 1896.0);
        assert_abs_diff_eq!(totals.final_total().0, (180_900.0 + 189_600.0) * 1.08);
    }

    #[test]
    fn test_flat_rollup_is_not_for_households() {
        assert!(
            FlatTotals::aggregate(&two_era_calculations(), CustomerCategory::Household).is_none()
        );
    }
}
