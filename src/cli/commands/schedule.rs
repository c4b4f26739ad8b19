use anyhow::Result;
use chrono::{Local, NaiveDate};
use common::SchedulePreviewRequest;
use model::entities::loan::PaymentScheme;
use rust_decimal::Decimal;
use tracing::debug;
use validator::Validate;

use crate::services::loans::preview_schedule;

pub fn print_schedule(
    principal: Decimal,
    annual_rate: Decimal,
    term_months: i32,
    issue_date: Option<NaiveDate>,
    payment_scheme: PaymentScheme,
) -> Result<()> {
    let request = SchedulePreviewRequest {
        principal,
        annual_rate,
        term_months,
        issue_date: issue_date.unwrap_or_else(|| Local::now().date_naive()),
        payment_scheme,
    };
    request.validate()?;
    debug!("Previewing schedule: {:?}", request);

    let rows = preview_schedule(&request)?;
    let total: Decimal = rows.iter().map(|row| row.total).sum();
    let interest: Decimal = rows.iter().map(|row| row.interest).sum();

    println!(
        "{:>4}  {:<10}  {:>14}  {:>14}  {:>14}  {:>14}",
        "#", "date", "principal", "interest", "total", "balance"
    );
    for row in &rows {
        println!(
            "{:>4}  {:<10}  {:>14}  {:>14}  {:>14}  {:>14}",
            row.sequence,
            row.date,
            row.principal.round_dp(2),
            row.interest.round_dp(2),
            row.total.round_dp(2),
            row.balance_after.round_dp(2)
        );
    }
    println!("total paid {}, of which interest {}", total.round_dp(2), interest.round_dp(2));
    Ok(())
}
