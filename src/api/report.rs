use std::fmt::Write;

use super::ProjectResponse;

/// Plain-text table with one row per projection year plus the starting row.
pub fn render_yearly_table(response: &ProjectResponse) -> String {
    let projection = &response.projection;
    let summary = &projection.summary;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Loan {:.2} at {:.2} per month, standard deduction {} ({:?}: {:.0})",
        summary.loan_amount,
        summary.monthly_payment,
        response.standard_deduction.tax_year,
        response.filing_status,
        response.standard_deduction.amount_for(response.filing_status),
    );
    let _ = writeln!(
        out,
        "{:>4}  {:<10}  {:>14}  {:>14}  {:>14}  {:>14}  {:>14}",
        "year", "date", "home value", "balance", "buying", "renting", "advantage"
    );

    for t in (0..response.dates.len()).step_by(12) {
        let _ = writeln!(
            out,
            "{:>4}  {:<10}  {:>14.2}  {:>14.2}  {:>14.2}  {:>14.2}  {:>14.2}",
            t / 12,
            response.dates[t],
            projection.costs.home_value[t],
            projection.schedule.periods[t].remaining_balance,
            projection.net_worth.buying_net_worth[t],
            projection.net_worth.renting_net_worth[t],
            projection.net_worth.advantage[t],
        );
    }

    match summary.breakeven_month {
        Some(month) => {
            let _ = writeln!(
                out,
                "Buying stays ahead from month {month} ({}).",
                response.dates[month as usize]
            );
        }
        None => {
            let _ = writeln!(out, "Renting is ahead at the end of the horizon.");
        }
    }
    out
}
