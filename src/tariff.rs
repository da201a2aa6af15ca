//! Retail tariff eras and their six-tier price tables.

use std::{fs, path::Path};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    prelude::*,
    quantity::{Quantity, rate::DongPerKilowattHour},
    tier::Tier,
};

const fn calendar_date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date"),
    }
}

/// A date range during which one fixed six-tier price table applies.
///
/// The serialized names match the records produced by the legacy tool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum TariffEra {
    /// Until 2023-11-08 inclusive.
    #[serde(rename = "BEFORE_NOV_2023")]
    PreNovember2023,

    /// 2023-11-09 through 2024-10-10 inclusive.
    #[serde(rename = "NOV_2023_TO_OCT_2024")]
    November2023,

    /// From 2024-10-11 onward.
    #[serde(rename = "AFTER_OCT_2024")]
    October2024,
}

impl TariffEra {
    /// First day of the November 2023 price change.
    pub const NOVEMBER_2023_START: NaiveDate = calendar_date(2023, 11, 9);

    /// First day of the October 2024 price change, the "new price" boundary.
    pub const OCTOBER_2024_START: NaiveDate = calendar_date(2024, 10, 11);

    /// Resolve the era a date falls into. Total: any date maps to exactly one era,
    /// open-ended on both sides.
    pub fn for_date(date: NaiveDate) -> Self {
        if date < Self::NOVEMBER_2023_START {
            Self::PreNovember2023
        } else if date < Self::OCTOBER_2024_START {
            Self::November2023
        } else {
            Self::October2024
        }
    }

    /// Whether the era bills at the "old price" for rollup purposes.
    ///
    /// Both pre-November-2023 and November-2023 eras count as old: the billing
    /// summary only distinguishes before/after the October 2024 change.
    pub const fn is_old_price(self) -> bool {
        !matches!(self, Self::October2024)
    }
}

/// Customer category. The tiered distribution applies to households; business and
/// production connections are billed at a single per-era rate.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum CustomerCategory {
    #[default]
    Household,
    Business,
    Production,
}

impl CustomerCategory {
    /// Flat per-kWh rate for non-tiered categories, `None` for households.
    pub const fn flat_rate(self, era: TariffEra) -> Option<DongPerKilowattHour> {
        match (self, era.is_old_price()) {
            (Self::Household, _) => None,
            (Self::Business, true) => Some(Quantity(2870.0)),
            (Self::Business, false) => Some(Quantity(3007.0)),
            (Self::Production, true) => Some(Quantity(1809.0)),
            (Self::Production, false) => Some(Quantity(1896.0)),
        }
    }
}

const fn tier_prices(prices: [f64; 6]) -> [DongPerKilowattHour; 6] {
    [
        Quantity(prices[0]),
        Quantity(prices[1]),
        Quantity(prices[2]),
        Quantity(prices[3]),
        Quantity(prices[4]),
        Quantity(prices[5]),
    ]
}

/// The per-era tier price tables. Defaults to the published retail prices, with an
/// optional TOML override for when a new price decision lands before a release.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Schedule {
    pre_november_2023: [DongPerKilowattHour; 6],
    november_2023: [DongPerKilowattHour; 6],
    october_2024: [DongPerKilowattHour; 6],
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            pre_november_2023: tier_prices([1728.0, 1786.0, 2074.0, 2612.0, 2919.0, 3015.0]),
            november_2023: tier_prices([1806.0, 1866.0, 2167.0, 2729.0, 3050.0, 3151.0]),
            october_2024: tier_prices([1893.0, 1956.0, 2271.0, 2860.0, 3197.0, 3302.0]),
        }
    }
}

impl Schedule {
    #[instrument(skip_all, fields(path = %path.display()), name = "Reading tariff override…")]
    pub fn from_toml_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read the tariff file `{}`", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse the tariff file `{}`", path.display()))
    }

    pub const fn tier_prices(&self, era: TariffEra) -> &[DongPerKilowattHour; 6] {
        match era {
            TariffEra::PreNovember2023 => &self.pre_november_2023,
            TariffEra::November2023 => &self.november_2023,
            TariffEra::October2024 => &self.october_2024,
        }
    }

    pub fn tier_price(&self, era: TariffEra, tier: Tier) -> DongPerKilowattHour {
        self.tier_prices(era)[tier.index()]
    }
}
