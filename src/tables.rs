//! Console renderings of the distribution and the billing summary.

use chrono::NaiveDate;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;

use crate::{
    period::ViolationPeriod,
    summary::{CustomerTotals, EraBucket, FlatTotals, PeriodCalculation},
    tariff::{Schedule, TariffEra},
    tier::Tier,
};

const ERAS: [TariffEra; 3] =
    [TariffEra::PreNovember2023, TariffEra::November2023, TariffEra::October2024];

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn kwh_cell(value: impl std::fmt::Display) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

/// Per-tier breakdown of one period: caps, invoiced and compensated energy, and
/// the priced amounts.
#[must_use]
pub fn build_distribution_table(calculation: &PeriodCalculation, schedule: &Schedule) -> Table {
    let era = calculation.period.era();
    let era_color = if era.is_old_price() { Color::Reset } else { Color::Blue };

    let mut table = new_table();
    table.set_header(vec![
        "Bậc",
        "Giới hạn (kWh)",
        "Đã phát hành (kWh)",
        "Bồi thường (kWh)",
        "Đơn giá (₫/kWh)",
        "Thành tiền (₫)",
    ]);
    for tier in Tier::ALL {
        let price = schedule.tier_price(era, tier);
        let compensation = calculation.distribution.compensation[tier];
        table.add_row(vec![
            Cell::new(tier),
            match calculation.limits.cap(tier) {
                Some(cap) => kwh_cell(format!("{:.2}", cap.0)),
                None => kwh_cell("∞").add_attribute(Attribute::Dim),
            },
            kwh_cell(format!("{:.2}", calculation.distribution.paid[tier].0)),
            kwh_cell(format!("{:.2}", compensation.0)),
            kwh_cell(format!("{:.0}", price.0)).fg(era_color),
            kwh_cell(format!("{:.0}", (compensation * price).rounded().0)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Cộng").add_attribute(Attribute::Bold),
        Cell::new(""),
        kwh_cell(format!("{:.2}", calculation.distribution.paid.total().0))
            .add_attribute(Attribute::Bold),
        kwh_cell(format!("{:.2}", calculation.distribution.compensation.total().0))
            .add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
    ]);
    table
}

/// One price-era bucket of the customer summary.
#[must_use]
pub fn build_bucket_table(bucket: &EraBucket, era: TariffEra, schedule: &Schedule) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Bậc", "Điện năng (kWh)", "Đơn giá (₫/kWh)", "Thành tiền (₫)"]);
    for (tier, price) in Tier::ALL.into_iter().zip_eq(schedule.tier_prices(era)) {
        let total = bucket.get(tier);
        table.add_row(vec![
            Cell::new(tier),
            kwh_cell(format!("{:.2}", total.usage.0)),
            kwh_cell(format!("{:.0}", price.0)),
            kwh_cell(format!("{:.0}", total.amount.rounded().0)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Tổng").add_attribute(Attribute::Bold),
        kwh_cell(format!("{:.2}", bucket.total_usage().0)).add_attribute(Attribute::Bold),
        Cell::new(""),
        kwh_cell(format!("{:.0}", bucket.total_amount().rounded().0))
            .add_attribute(Attribute::Bold),
    ]);
    table
}

/// The grand-total block: old + new price amounts, VAT and the final figure.
#[must_use]
pub fn build_totals_table(totals: &CustomerTotals) -> Table {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Điện năng bồi thường"),
        kwh_cell(format!("{:.2} kWh", totals.total_compensation_usage.0)),
    ]);
    table.add_row(vec![
        Cell::new("Tiền điện bồi thường"),
        kwh_cell(totals.grand_total().rounded()),
    ]);
    table.add_row(vec![Cell::new("Thuế VAT 8%"), kwh_cell(totals.vat().rounded())]);
    table.add_row(vec![
        Cell::new("Tổng tiền điện bồi thường").add_attribute(Attribute::Bold),
        kwh_cell(totals.final_total().rounded()).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Chênh lệch điện năng").add_attribute(Attribute::Dim),
        kwh_cell(format!("{:.2} kWh", totals.usage_difference().0)).add_attribute(Attribute::Dim),
    ]);
    table
}

/// Flat-rate summary for business and production customers.
#[must_use]
pub fn build_flat_table(totals: &FlatTotals) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Giá", "Điện năng (kWh)", "Thành tiền (₫)"]);
    table.add_row(vec![
        Cell::new("Giá cũ"),
        kwh_cell(format!("{:.2}", totals.old_usage.0)),
        kwh_cell(format!("{:.0}", totals.old_amount.rounded().0)),
    ]);
    table.add_row(vec![
        Cell::new("Giá mới").fg(Color::Blue),
        kwh_cell(format!("{:.2}", totals.new_usage.0)),
        kwh_cell(format!("{:.0}", totals.new_amount.rounded().0)),
    ]);
    table.add_row(vec![
        Cell::new("Tổng cộng (chưa VAT)").add_attribute(Attribute::Bold),
        Cell::new(""),
        kwh_cell(totals.grand_total().rounded()).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Thuế VAT 8%"), Cell::new(""), kwh_cell(totals.vat().rounded())]);
    table.add_row(vec![
        Cell::new("Tổng tiền điện bồi thường").add_attribute(Attribute::Bold),
        Cell::new(""),
        kwh_cell(totals.final_total().rounded()).add_attribute(Attribute::Bold),
    ]);
    table
}

/// The survey window: one row per violation period with its date range and the
/// price era it bills under.
#[must_use]
pub fn build_periods_table(periods: &[ViolationPeriod]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Kỳ", "Từ ngày", "Đến ngày", "Số ngày", "Giá"]);
    for period in periods {
        table.add_row(vec![
            Cell::new(period.key()),
            Cell::new(period.start_date.format("%d/%m/%Y")),
            Cell::new(period.end_date.format("%d/%m/%Y")),
            kwh_cell(format!("{:.0}", period.violation_days)),
            if period.era().is_old_price() {
                Cell::new("cũ")
            } else {
                Cell::new("mới").fg(Color::Blue)
            },
        ]);
    }
    table
}

/// All three price tables side by side, with the era in force on the given date
/// highlighted.
#[must_use]
pub fn build_price_table(schedule: &Schedule, date: NaiveDate) -> Table {
    let active_era = TariffEra::for_date(date);

    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Bậc"),
        Cell::new("Trước 09/11/2023"),
        Cell::new("09/11/2023 ÷ 10/10/2024"),
        Cell::new("Từ 11/10/2024"),
    ]);
    for tier in Tier::ALL {
        let mut row = vec![Cell::new(tier)];
        for era in ERAS {
            let cell = kwh_cell(format!("{:.0}", schedule.tier_price(era, tier).0));
            row.push(if era == active_era {
                cell.fg(Color::Green).add_attribute(Attribute::Bold)
            } else {
                cell
            });
        }
        table.add_row(row);
    }
    table
}
