use super::error::{ProjectionError, ProjectionResult};
use super::types::{AmortizationPeriod, AmortizationSchedule, MAX_HORIZON_YEARS};

/// Fixed monthly payment of a fully amortizing loan.
pub fn monthly_payment(loan_amount: f64, annual_rate: f64, term_years: u32) -> ProjectionResult<f64> {
    validate_terms(loan_amount, annual_rate, term_years)?;

    let n = f64::from(term_years) * 12.0;
    let r = annual_rate / 12.0;
    if r == 0.0 {
        return Ok(loan_amount / n);
    }

    // (1 + r)^n - 1 without cancellation when r is tiny.
    let growth_minus_one = (n * r.ln_1p()).exp_m1();
    if !growth_minus_one.is_finite() {
        return Err(ProjectionError::NumericOverflow(format!(
            "(1 + {r})^{n} is not finite"
        )));
    }
    if growth_minus_one == 0.0 {
        return Ok(loan_amount / n);
    }

    let payment = loan_amount * r * (1.0 + growth_minus_one) / growth_minus_one;
    if !payment.is_finite() {
        return Err(ProjectionError::NumericOverflow(format!(
            "monthly payment is not finite for rate {annual_rate} over {term_years} years"
        )));
    }
    Ok(payment)
}

/// Schedule over the full loan term: `term_years * 12 + 1` records.
pub fn amortize(
    loan_amount: f64,
    annual_rate: f64,
    term_years: u32,
) -> ProjectionResult<AmortizationSchedule> {
    amortize_over(
        loan_amount,
        annual_rate,
        term_years,
        term_years.saturating_mul(12),
    )
}

/// Schedule over `horizon_months` periods regardless of the loan term. Periods
/// past payoff repeat a zero balance with no interest or principal.
pub fn amortize_over(
    loan_amount: f64,
    annual_rate: f64,
    term_years: u32,
    horizon_months: u32,
) -> ProjectionResult<AmortizationSchedule> {
    let payment = monthly_payment(loan_amount, annual_rate, term_years)?;
    if horizon_months > MAX_HORIZON_YEARS * 12 {
        return Err(ProjectionError::invalid(
            "horizon_months",
            format!("must be <= {}, got {horizon_months}", MAX_HORIZON_YEARS * 12),
        ));
    }
    let r = annual_rate / 12.0;
    let scheduled_payments = term_years.saturating_mul(12);

    let mut periods = Vec::with_capacity(horizon_months as usize + 1);
    let mut balance = loan_amount;
    let mut cumulative_interest = 0.0;
    let mut cumulative_principal = 0.0;
    periods.push(AmortizationPeriod {
        period: 0,
        payment: 0.0,
        interest: 0.0,
        principal: 0.0,
        remaining_balance: balance,
        cumulative_interest_paid: 0.0,
        cumulative_principal_paid: 0.0,
    });

    for period in 1..=horizon_months {
        let (interest, principal) = if balance > 0.0 {
            let interest = balance * r;
            // Last scheduled payment retires whatever rounding left behind.
            let principal = if period >= scheduled_payments {
                balance
            } else {
                (payment - interest).min(balance)
            };
            (interest, principal)
        } else {
            (0.0, 0.0)
        };

        balance = (balance - principal).max(0.0);
        cumulative_interest += interest;
        cumulative_principal += principal;
        periods.push(AmortizationPeriod {
            period,
            payment: interest + principal,
            interest,
            principal,
            remaining_balance: balance,
            cumulative_interest_paid: cumulative_interest,
            cumulative_principal_paid: cumulative_principal,
        });
    }

    Ok(AmortizationSchedule {
        loan_amount,
        annual_rate,
        term_years,
        monthly_payment: payment,
        periods,
    })
}

impl AmortizationSchedule {
    pub fn balances(&self) -> Vec<f64> {
        self.periods.iter().map(|p| p.remaining_balance).collect()
    }

    pub fn cumulative_interest(&self) -> Vec<f64> {
        self.periods
            .iter()
            .map(|p| p.cumulative_interest_paid)
            .collect()
    }

    /// First period whose closing balance is zero.
    pub fn payoff_period(&self) -> Option<u32> {
        self.periods
            .iter()
            .skip(1)
            .find(|p| p.remaining_balance <= 0.0)
            .map(|p| p.period)
    }

    pub fn total_interest_paid(&self) -> f64 {
        self.periods
            .last()
            .map(|p| p.cumulative_interest_paid)
            .unwrap_or(0.0)
    }
}

fn validate_terms(loan_amount: f64, annual_rate: f64, term_years: u32) -> ProjectionResult<()> {
    if term_years == 0 {
        return Err(ProjectionError::InvalidTerm(
            "term_years must be > 0".to_string(),
        ));
    }
    if term_years > MAX_HORIZON_YEARS {
        return Err(ProjectionError::InvalidTerm(format!(
            "term_years must be <= {MAX_HORIZON_YEARS}, got {term_years}"
        )));
    }
    if !annual_rate.is_finite() || annual_rate < 0.0 {
        return Err(ProjectionError::InvalidTerm(format!(
            "annual_rate must be a finite value >= 0, got {annual_rate}"
        )));
    }
    if !loan_amount.is_finite() || loan_amount < 0.0 {
        return Err(ProjectionError::invalid(
            "loan_amount",
            format!("must be a finite value >= 0, got {loan_amount}"),
        ));
    }
    Ok(())
}
