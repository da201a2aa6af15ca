#![doc = include_str!("../README.md")]

mod cli;
mod customer;
mod device;
mod distribution;
mod period;
mod prelude;
mod quantity;
mod summary;
mod tables;
mod tariff;
mod tier;

use chrono::Local;
use clap::{Parser, crate_version};

use crate::{
    cli::{Args, CalculateArgs, Command, DistributeArgs, PeriodsArgs, TariffArgs},
    customer::CustomerCalculation,
    distribution::distribute,
    period::{ViolationPeriod, monthly_periods},
    prelude::*,
    summary::{CustomerTotals, FlatTotals, PeriodCalculation},
    tables::{
        build_bucket_table,
        build_distribution_table,
        build_flat_table,
        build_periods_table,
        build_price_table,
        build_totals_table,
    },
    tariff::TariffEra,
    tier::TierLimits,
};

fn main() -> Result {
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Calculate(args) => calculate(&args),
        Command::Distribute(args) => distribute_period(&args),
        Command::Tariff(args) => print_tariff(&args),
        Command::Periods(args) => print_periods(&args),
    }
}

fn calculate(args: &CalculateArgs) -> Result {
    let schedule = args.tariff.schedule()?;
    let customer = CustomerCalculation::from_json_file(&args.path)?;
    info!(
        customer = %customer.customer_name,
        meters = customer.meter_count,
        n_periods = customer.compensation_data.len(),
        "loaded",
    );

    let calculations = customer.period_calculations();
    if args.detailed {
        for calculation in &calculations {
            println!(
                "Tháng {}/{} ({} ÷ {})",
                calculation.period.month,
                calculation.period.year,
                calculation.period.start_date.format("%d/%m/%Y"),
                calculation.period.end_date.format("%d/%m/%Y"),
            );
            println!("{}", build_distribution_table(calculation, &schedule));
        }
    }

    if let Some(flat) = FlatTotals::aggregate(&calculations, args.category) {
        println!("{}", build_flat_table(&flat));
    } else {
        let totals = CustomerTotals::aggregate(&calculations, &schedule);
        println!("1. Điện năng, tiền điện bồi thường giá cũ:");
        println!("{}", build_bucket_table(&totals.old_price, TariffEra::November2023, &schedule));
        println!("2. Điện năng, tiền điện bồi thường giá mới:");
        println!("{}", build_bucket_table(&totals.new_price, TariffEra::October2024, &schedule));
        println!("{}", build_totals_table(&totals));
    }

    info!("done!");
    Ok(())
}

fn distribute_period(args: &DistributeArgs) -> Result {
    let schedule = args.tariff.schedule()?;
    let mut period = ViolationPeriod::full_month(args.month, args.year)
        .with_context(|| format!("invalid month {}/{}", args.month, args.year))?;
    if let Some(violation_days) = args.violation_days {
        period.violation_days = violation_days;
    }
    period.outage_days = args.outage_days;

    let limits = TierLimits::for_period(
        period.violation_days,
        period.compensation_days(),
        args.meter_count,
        period.days_in_month(),
    );
    let calculation = PeriodCalculation {
        era: period.era(),
        distribution: distribute(args.total_usage, args.paid, &limits),
        period,
        devices: Vec::new(),
        paid_electricity: args.paid,
        total_usage: args.total_usage,
        limits,
    };
    println!("{}", build_distribution_table(&calculation, &schedule));
    info!(
        compensation = %calculation.distribution.compensation.total(),
        era = ?calculation.era,
        "done!",
    );
    Ok(())
}

fn print_periods(args: &PeriodsArgs) -> Result {
    ensure!((1..=12).contains(&args.month), "invalid month {}", args.month);
    println!("{}", build_periods_table(&monthly_periods(args.month, args.year)));
    Ok(())
}

fn print_tariff(args: &TariffArgs) -> Result {
    let schedule = args.tariff.schedule()?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    println!("{}", build_price_table(&schedule, date));
    Ok(())
}
