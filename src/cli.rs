use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::{
    prelude::*,
    quantity::energy::KilowattHours,
    tariff::{CustomerCategory, Schedule},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Recompute a saved customer calculation and print the billing summary.
    Calculate(CalculateArgs),

    /// Run the tier distribution for a single period.
    Distribute(Box<DistributeArgs>),

    /// Print the tier price tables.
    Tariff(TariffArgs),

    /// List the survey back-window of violation periods for a month.
    Periods(PeriodsArgs),
}

#[derive(Parser)]
pub struct CalculateArgs {
    /// Path to the saved customer calculation (a JSON row export).
    pub path: PathBuf,

    /// Customer category: households bill tiered, the others at a flat per-era rate.
    #[clap(long, value_enum, default_value_t = CustomerCategory::Household)]
    pub category: CustomerCategory,

    /// Also print the per-period distribution tables.
    #[clap(long)]
    pub detailed: bool,

    #[clap(flatten)]
    pub tariff: TariffOverrideArgs,
}

#[derive(Parser)]
pub struct DistributeArgs {
    /// Total measured usage over the period, in kWh.
    #[clap(long = "usage-kwh")]
    pub total_usage: KilowattHours,

    /// Usage already invoiced for the period, in kWh.
    #[clap(long = "paid-kwh", default_value = "0")]
    pub paid: KilowattHours,

    /// Calendar month of the period.
    #[clap(long)]
    pub month: u32,

    #[clap(long)]
    pub year: i32,

    /// Nominal violation days; defaults to the whole month.
    #[clap(long = "violation-days")]
    pub violation_days: Option<f64>,

    /// Outage days excluded from billing.
    #[clap(long = "outage-days", default_value = "0")]
    pub outage_days: f64,

    /// Number of households behind the meter.
    #[clap(long = "meters", default_value = "1")]
    pub meter_count: u32,

    #[clap(flatten)]
    pub tariff: TariffOverrideArgs,
}

#[derive(Parser)]
pub struct TariffArgs {
    /// Date whose price table to highlight, defaults to today.
    #[clap(long)]
    pub date: Option<NaiveDate>,

    #[clap(flatten)]
    pub tariff: TariffOverrideArgs,
}

#[derive(Parser)]
pub struct PeriodsArgs {
    /// Last calendar month of the window.
    #[clap(long)]
    pub month: u32,

    #[clap(long)]
    pub year: i32,
}

#[derive(Parser)]
pub struct TariffOverrideArgs {
    /// TOML file overriding the built-in price tables.
    #[clap(long = "tariff-file", env = "DENBU_TARIFF_FILE")]
    pub tariff_file: Option<PathBuf>,
}

impl TariffOverrideArgs {
    pub fn schedule(&self) -> Result<Schedule> {
        match &self.tariff_file {
            Some(path) => Schedule::from_toml_path(path),
            None => Ok(Schedule::default()),
        }
    }
}
