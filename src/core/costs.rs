use super::error::{ProjectionError, ProjectionResult, ensure_finite};
use super::types::{AmortizationSchedule, CostSeries, DownPayment, ProjectionInput};

/// Loan-to-price ratio above which PMI is charged.
pub const PMI_LTV_THRESHOLD: f64 = 0.8;
/// Down payments below this fraction of the price carry PMI at all.
pub const PMI_DOWN_PAYMENT_THRESHOLD: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDownPayment {
    pub amount: f64,
    pub fraction: f64,
}

/// Turns either form of down payment into both an amount and a fraction of
/// the home price. Needs a positive price since it is the denominator.
pub fn resolve_down_payment(input: &ProjectionInput) -> ProjectionResult<ResolvedDownPayment> {
    if !input.home_price.is_finite() || input.home_price <= 0.0 {
        return Err(ProjectionError::invalid(
            "home_price",
            format!("must be > 0, got {}", input.home_price),
        ));
    }

    let resolved = match input.down_payment {
        DownPayment::Percent(fraction) => ResolvedDownPayment {
            amount: input.home_price * fraction,
            fraction,
        },
        DownPayment::Amount(amount) => ResolvedDownPayment {
            amount,
            fraction: amount / input.home_price,
        },
    };

    if !resolved.amount.is_finite() || resolved.amount < 0.0 {
        return Err(ProjectionError::invalid(
            "down_payment",
            format!("must be >= 0, got {}", resolved.amount),
        ));
    }
    if resolved.amount > input.home_price {
        return Err(ProjectionError::invalid(
            "down_payment",
            format!(
                "{} exceeds home price {}",
                resolved.amount, input.home_price
            ),
        ));
    }
    Ok(resolved)
}

/// `(1 + annual_rate)^(period / 12)`: an annual rate applied with a
/// fractional-year exponent each month.
pub(crate) fn monthly_growth_factor(annual_rate: f64, period: usize) -> f64 {
    (1.0 + annual_rate).powf(period as f64 / 12.0)
}

pub(crate) fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Recurring ownership costs and tax savings aligned with `schedule`.
pub fn project_costs(
    schedule: &AmortizationSchedule,
    input: &ProjectionInput,
    down_payment: ResolvedDownPayment,
) -> ProjectionResult<CostSeries> {
    let periods = schedule.periods.len();

    let home_value = (0..periods)
        .map(|t| input.home_price * monthly_growth_factor(input.home_appreciation_annual, t))
        .collect::<Vec<_>>();
    ensure_finite("home_value", &home_value)?;

    let scaled = |rate: f64| {
        home_value
            .iter()
            .map(|value| value * rate / 12.0)
            .collect::<Vec<_>>()
    };
    let property_tax = scaled(input.property_tax_rate);
    let insurance = scaled(input.insurance_pct);
    let maintenance = scaled(input.maintenance_pct);

    let utilities = (0..periods)
        .map(|t| input.extra_utilities * monthly_growth_factor(input.inflation_annual, t))
        .collect::<Vec<_>>();
    ensure_finite("utilities", &utilities)?;
    let hoa = vec![input.hoa_fees; periods];

    let pmi = pmi_series(schedule, input, down_payment.fraction);

    let standard_deduction = input.standard_deduction.amount_for(input.filing_status);
    let cumulative_property_tax = cumulative_sum(&property_tax);
    let itemized_deductions = schedule
        .periods
        .iter()
        .zip(&cumulative_property_tax)
        .zip(&hoa)
        .map(|((p, tax_to_date), hoa)| {
            p.cumulative_interest_paid
                + tax_to_date
                + hoa * input.hoa_tax_deductible_pct
                + input.other_itemized_deductions
        })
        .collect::<Vec<_>>();
    let tax_savings = itemized_deductions
        .iter()
        .map(|itemized| (itemized - standard_deduction).max(0.0) * input.marginal_tax_rate)
        .collect::<Vec<_>>();
    ensure_finite("tax_savings", &tax_savings)?;

    Ok(CostSeries {
        home_value,
        property_tax,
        insurance,
        maintenance,
        utilities,
        hoa,
        pmi,
        itemized_deductions,
        tax_savings,
    })
}

/// PMI is re-evaluated every period against the original price. Under the
/// scheduled amortization the balance only falls, so it switches off once.
fn pmi_series(
    schedule: &AmortizationSchedule,
    input: &ProjectionInput,
    down_payment_fraction: f64,
) -> Vec<f64> {
    if down_payment_fraction >= PMI_DOWN_PAYMENT_THRESHOLD {
        return vec![0.0; schedule.periods.len()];
    }
    let monthly_rate = input.pmi_annual_rate / 12.0;
    schedule
        .periods
        .iter()
        .map(|p| {
            if p.remaining_balance / input.home_price > PMI_LTV_THRESHOLD {
                p.remaining_balance * monthly_rate
            } else {
                0.0
            }
        })
        .collect()
}
