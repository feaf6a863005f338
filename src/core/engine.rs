use tracing::debug;

use super::amortization::amortize_over;
use super::costs::{
    ResolvedDownPayment, cumulative_sum, monthly_growth_factor, project_costs,
    resolve_down_payment,
};
use super::error::{ProjectionError, ProjectionResult, ensure_finite};
use super::types::{
    AmortizationSchedule, CashflowSeries, CostSeries, InitialCosts, MAX_HORIZON_YEARS,
    NetWorthSeries, Projection, ProjectionInput, ProjectionSummary, RentGrowthPolicy, RentSeries,
};

/// Runs the full buy-vs-rent projection for one set of assumptions.
///
/// Input is validated up front; the run either returns every series or fails
/// without producing any of them.
pub fn project(input: &ProjectionInput) -> ProjectionResult<Projection> {
    let down_payment = validate_and_resolve(input)?;
    let horizon_months = input.horizon_months();
    let initial = initial_costs(input, down_payment);
    let loan_amount = input.home_price - down_payment.amount;

    let schedule = amortize_over(
        loan_amount,
        input.mortgage_annual_rate,
        input.mortgage_term_years,
        horizon_months,
    )?;
    let costs = project_costs(&schedule, input, down_payment)?;
    let rent = project_rent(input, schedule.periods.len())?;
    let cashflows = project_cashflows(input, &initial, &schedule, &costs, &rent)?;
    let net_worth = assemble_net_worth(input, &schedule, &costs, &rent, &cashflows)?;
    let summary = summarize(horizon_months, &schedule, &costs, &rent, &cashflows, &net_worth);

    debug!(
        loan_amount,
        monthly_payment = schedule.monthly_payment,
        horizon_months,
        final_advantage = summary.final_advantage,
        breakeven_month = ?summary.breakeven_month,
        "projection complete"
    );

    Ok(Projection {
        initial,
        schedule,
        costs,
        rent,
        cashflows,
        net_worth,
        summary,
    })
}

pub fn validate_input(input: &ProjectionInput) -> ProjectionResult<()> {
    validate_and_resolve(input).map(|_| ())
}

fn validate_and_resolve(input: &ProjectionInput) -> ProjectionResult<ResolvedDownPayment> {
    if input.horizon_years == 0 {
        return Err(ProjectionError::invalid("horizon_years", "must be > 0"));
    }
    if input.horizon_years > MAX_HORIZON_YEARS {
        return Err(ProjectionError::invalid(
            "horizon_years",
            format!("must be <= {MAX_HORIZON_YEARS}, got {}", input.horizon_years),
        ));
    }
    if input.mortgage_term_years == 0 {
        return Err(ProjectionError::InvalidTerm(
            "mortgage_term_years must be > 0".to_string(),
        ));
    }
    if input.mortgage_term_years > MAX_HORIZON_YEARS {
        return Err(ProjectionError::InvalidTerm(format!(
            "mortgage_term_years must be <= {MAX_HORIZON_YEARS}, got {}",
            input.mortgage_term_years
        )));
    }
    if !input.mortgage_annual_rate.is_finite() || input.mortgage_annual_rate < 0.0 {
        return Err(ProjectionError::InvalidTerm(format!(
            "mortgage_annual_rate must be >= 0, got {}",
            input.mortgage_annual_rate
        )));
    }

    for (field, value) in [
        ("monthly_rent", input.monthly_rent),
        ("pmi_annual_rate", input.pmi_annual_rate),
        ("home_appreciation_annual", input.home_appreciation_annual),
        ("rent_appreciation_annual", input.rent_appreciation_annual),
        ("investment_return_annual", input.investment_return_annual),
        ("inflation_annual", input.inflation_annual),
        ("property_tax_rate", input.property_tax_rate),
        ("other_itemized_deductions", input.other_itemized_deductions),
        ("buying_closing_cost_pct", input.buying_closing_cost_pct),
        ("maintenance_pct", input.maintenance_pct),
        ("insurance_pct", input.insurance_pct),
        ("extra_utilities", input.extra_utilities),
        ("hoa_fees", input.hoa_fees),
        ("security_deposit_months", input.security_deposit_months),
        ("broker_fee_pct", input.broker_fee_pct),
        ("renters_insurance_pct", input.renters_insurance_pct),
        ("standard_deduction.individual", input.standard_deduction.individual),
        ("standard_deduction.joint", input.standard_deduction.joint),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ProjectionError::invalid(
                field,
                format!("must be a finite value >= 0, got {value}"),
            ));
        }
    }

    for (field, value) in [
        ("marginal_tax_rate", input.marginal_tax_rate),
        ("selling_closing_cost_pct", input.selling_closing_cost_pct),
        ("hoa_tax_deductible_pct", input.hoa_tax_deductible_pct),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ProjectionError::invalid(
                field,
                format!("must be between 0 and 1, got {value}"),
            ));
        }
    }

    resolve_down_payment(input)
}

fn initial_costs(input: &ProjectionInput, down_payment: ResolvedDownPayment) -> InitialCosts {
    let buying_closing_costs = input.home_price * input.buying_closing_cost_pct;
    let initial_buy_costs = down_payment.amount + buying_closing_costs;
    let security_deposit = input.monthly_rent * input.security_deposit_months;
    let broker_fee = input.monthly_rent * 12.0 * input.broker_fee_pct;
    let initial_rent_costs = security_deposit + broker_fee;

    InitialCosts {
        down_payment: down_payment.amount,
        buying_closing_costs,
        initial_buy_costs,
        security_deposit,
        broker_fee,
        initial_rent_costs,
        investment_base: initial_buy_costs - initial_rent_costs,
    }
}

/// Rent per period under the configured growth policy. Renters insurance is a
/// fixed share of the starting annual rent.
pub fn project_rent(input: &ProjectionInput, periods: usize) -> ProjectionResult<RentSeries> {
    let rent = (0..periods)
        .map(|t| {
            let growth = match input.rent_growth_policy {
                RentGrowthPolicy::MonthlyCompounding => {
                    monthly_growth_factor(input.rent_appreciation_annual, t)
                }
                RentGrowthPolicy::AnnualStep => {
                    (1.0 + input.rent_appreciation_annual).powf((t / 12) as f64)
                }
            };
            input.monthly_rent * growth
        })
        .collect::<Vec<_>>();
    ensure_finite("rent", &rent)?;

    let monthly_insurance = input.monthly_rent * 12.0 * input.renters_insurance_pct / 12.0;
    Ok(RentSeries {
        rent,
        renters_insurance: vec![monthly_insurance; periods],
    })
}

/// Mortgage payment made over the month that starts at period `t`.
fn payment_due(schedule: &AmortizationSchedule, t: usize) -> f64 {
    match schedule.periods.get(t + 1) {
        Some(next) => next.payment,
        None => {
            let balance = schedule.periods[t].remaining_balance;
            if balance > 0.0 {
                let r = schedule.annual_rate / 12.0;
                schedule.monthly_payment.min(balance * (1.0 + r))
            } else {
                0.0
            }
        }
    }
}

/// Builds both outflow paths and the counterfactual investment account.
///
/// Each month the account grows by one month of return first, then receives
/// the previous period's outflow difference. Negative contributions withdraw
/// from the account; there is no floor.
fn project_cashflows(
    input: &ProjectionInput,
    initial: &InitialCosts,
    schedule: &AmortizationSchedule,
    costs: &CostSeries,
    rent: &RentSeries,
) -> ProjectionResult<CashflowSeries> {
    let periods = schedule.periods.len();
    let ownership_outflow = (0..periods)
        .map(|t| {
            payment_due(schedule, t)
                + costs.pmi[t]
                + costs.property_tax[t]
                + costs.insurance[t]
                + costs.maintenance[t]
                + costs.utilities[t]
                + costs.hoa[t]
        })
        .collect::<Vec<_>>();
    let renting_outflow = rent
        .rent
        .iter()
        .zip(&rent.renters_insurance)
        .map(|(rent, insurance)| rent + insurance)
        .collect::<Vec<_>>();
    let net_contribution = ownership_outflow
        .iter()
        .zip(&renting_outflow)
        .map(|(own, rent)| own - rent)
        .collect::<Vec<_>>();

    let monthly_return = 1.0 + input.investment_return_annual / 12.0;
    let mut investment_value = Vec::with_capacity(periods);
    investment_value.push(initial.investment_base);
    for t in 1..periods {
        let grown = investment_value[t - 1] * monthly_return;
        investment_value.push(grown + net_contribution[t - 1]);
    }
    ensure_finite("investment_value", &investment_value)?;

    Ok(CashflowSeries {
        ownership_outflow,
        renting_outflow,
        net_contribution,
        investment_value,
    })
}

/// Net worth of both scenarios as if the home were sold at every period.
fn assemble_net_worth(
    input: &ProjectionInput,
    schedule: &AmortizationSchedule,
    costs: &CostSeries,
    rent: &RentSeries,
    cashflows: &CashflowSeries,
) -> ProjectionResult<NetWorthSeries> {
    let paid_costs = [
        &costs.pmi,
        &costs.property_tax,
        &costs.insurance,
        &costs.maintenance,
        &costs.utilities,
        &costs.hoa,
    ]
    .into_iter()
    .map(|series| cumulative_sum(series))
    .fold(vec![0.0; schedule.periods.len()], |mut acc, cumulative| {
        for (total, value) in acc.iter_mut().zip(cumulative) {
            *total += value;
        }
        acc
    });

    let buying_net_worth = schedule
        .periods
        .iter()
        .enumerate()
        .map(|(t, p)| {
            let home_value = costs.home_value[t];
            home_value - p.remaining_balance - paid_costs[t] + costs.tax_savings[t]
                - input.selling_closing_cost_pct * home_value
        })
        .collect::<Vec<_>>();

    let rent_to_date = cumulative_sum(&rent.rent);
    let insurance_to_date = cumulative_sum(&rent.renters_insurance);
    let renting_net_worth = cashflows
        .investment_value
        .iter()
        .zip(rent_to_date.iter().zip(&insurance_to_date))
        .map(|(investment, (rent, insurance))| investment - rent - insurance)
        .collect::<Vec<_>>();

    let advantage = buying_net_worth
        .iter()
        .zip(&renting_net_worth)
        .map(|(buy, rent)| buy - rent)
        .collect::<Vec<_>>();

    ensure_finite("buying_net_worth", &buying_net_worth)?;
    ensure_finite("renting_net_worth", &renting_net_worth)?;
    ensure_finite("advantage", &advantage)?;

    Ok(NetWorthSeries {
        buying_net_worth,
        renting_net_worth,
        advantage,
    })
}

/// First period from which buying stays at least as good as renting through
/// the end of the horizon.
pub fn breakeven_month(advantage: &[f64]) -> Option<u32> {
    let trailing_non_negative = advantage.iter().rev().take_while(|v| **v >= 0.0).count();
    if trailing_non_negative == 0 {
        return None;
    }
    Some((advantage.len() - trailing_non_negative) as u32)
}

fn summarize(
    horizon_months: u32,
    schedule: &AmortizationSchedule,
    costs: &CostSeries,
    rent: &RentSeries,
    cashflows: &CashflowSeries,
    net_worth: &NetWorthSeries,
) -> ProjectionSummary {
    fn last(series: &[f64]) -> f64 {
        series.last().copied().unwrap_or(0.0)
    }

    ProjectionSummary {
        horizon_months,
        loan_amount: schedule.loan_amount,
        monthly_payment: schedule.monthly_payment,
        payoff_period: schedule.payoff_period(),
        pmi_months: costs.pmi.iter().filter(|v| **v > 0.0).count() as u32,
        total_interest_paid: schedule.total_interest_paid(),
        total_rent_paid: rent.rent.iter().sum(),
        final_home_value: last(&costs.home_value),
        final_investment_value: last(&cashflows.investment_value),
        final_buying_net_worth: last(&net_worth.buying_net_worth),
        final_renting_net_worth: last(&net_worth.renting_net_worth),
        final_advantage: last(&net_worth.advantage),
        breakeven_month: breakeven_month(&net_worth.advantage),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::types::{DownPayment, FilingStatus, StandardDeductionTable};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_rel(actual: f64, expected: f64) {
        let tol = (expected.abs() * 1e-6).max(1e-4);
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    pub(crate) fn sample_input() -> ProjectionInput {
        ProjectionInput {
            home_price: 375_000.0,
            monthly_rent: 2_000.0,
            horizon_years: 30,
            down_payment: DownPayment::Percent(0.20),
            mortgage_annual_rate: 0.065,
            mortgage_term_years: 30,
            pmi_annual_rate: 0.005,
            home_appreciation_annual: 0.03,
            rent_appreciation_annual: 0.03,
            rent_growth_policy: RentGrowthPolicy::MonthlyCompounding,
            investment_return_annual: 0.07,
            inflation_annual: 0.02,
            property_tax_rate: 0.015,
            marginal_tax_rate: 0.25,
            filing_status: FilingStatus::Individual,
            other_itemized_deductions: 0.0,
            buying_closing_cost_pct: 0.04,
            selling_closing_cost_pct: 0.06,
            maintenance_pct: 0.01,
            insurance_pct: 0.005,
            extra_utilities: 200.0,
            hoa_fees: 0.0,
            hoa_tax_deductible_pct: 0.0,
            security_deposit_months: 1.0,
            broker_fee_pct: 0.0,
            renters_insurance_pct: 0.005,
            standard_deduction: StandardDeductionTable::default(),
        }
    }

    fn zero_cost_input() -> ProjectionInput {
        ProjectionInput {
            pmi_annual_rate: 0.0,
            home_appreciation_annual: 0.0,
            rent_appreciation_annual: 0.0,
            investment_return_annual: 0.0,
            inflation_annual: 0.0,
            property_tax_rate: 0.0,
            marginal_tax_rate: 0.0,
            buying_closing_cost_pct: 0.0,
            selling_closing_cost_pct: 0.0,
            maintenance_pct: 0.0,
            insurance_pct: 0.0,
            extra_utilities: 0.0,
            security_deposit_months: 0.0,
            renters_insurance_pct: 0.0,
            ..sample_input()
        }
    }

    #[test]
    fn first_period_matches_initial_cost_closed_form() {
        let input = sample_input();
        let projection = project(&input).expect("valid projection");

        let price = 375_000.0;
        let down = 0.20 * price;
        let expected_buy = price - (price - down)
            - price * 0.015 / 12.0
            - price * 0.005 / 12.0
            - price * 0.01 / 12.0
            - 200.0
            - 0.06 * price;
        let investment_base = (down + 0.04 * price) - 2_000.0;
        let expected_rent = investment_base - 2_000.0 - 2_000.0 * 0.005;

        assert_approx(projection.net_worth.buying_net_worth[0], expected_buy);
        assert_approx(projection.net_worth.renting_net_worth[0], expected_rent);
        assert_approx(projection.net_worth.buying_net_worth[0], 51_362.5);
        assert_approx(projection.net_worth.renting_net_worth[0], 85_990.0);
        assert_approx(projection.net_worth.advantage[0], -34_627.5);
        assert_approx(projection.initial.investment_base, 88_000.0);
    }

    #[test]
    fn default_scenario_matches_reference_numbers() {
        let projection = project(&sample_input()).expect("valid projection");
        let nw = &projection.net_worth;

        assert_rel(projection.schedule.monthly_payment, 1_896.204_070_478_896);
        assert_rel(nw.buying_net_worth[1], 51_362.921_721_044_055);
        assert_rel(nw.renting_net_worth[1], 85_512.104_864_267_62);
        assert_rel(nw.buying_net_worth[12], 54_366.772_100_518_98);
        assert_rel(nw.renting_net_worth[12], 80_374.177_568_135_17);
        assert_rel(projection.costs.tax_savings[12], 2_934.003_977_716_149);
        assert_rel(nw.advantage[120], 70_886.985_480_975_4);
        assert_rel(projection.cashflows.investment_value[120], 331_058.174_286_358_7);
        assert_rel(nw.buying_net_worth[360], 372_474.266_058_917_2);
        assert_rel(nw.renting_net_worth[360], 355_753.057_879_752_95);
        assert_rel(projection.summary.final_advantage, 16_721.208_179_164_27);
    }

    #[test]
    fn low_down_payment_reference_numbers_include_pmi() {
        let input = ProjectionInput {
            down_payment: DownPayment::Percent(0.10),
            horizon_years: 10,
            ..sample_input()
        };
        let projection = project(&input).expect("valid projection");

        assert_rel(projection.costs.pmi[0], 140.625);
        assert_rel(projection.costs.pmi[60], 131.640_437_027_199_25);
        assert_eq!(projection.costs.pmi[120], 0.0);
        assert_rel(projection.net_worth.buying_net_worth[60], 40_781.511_926_960_04);
        assert_rel(projection.net_worth.renting_net_worth[60], 34_766.504_017_678_93);
        assert_rel(projection.net_worth.buying_net_worth[120], 80_360.520_013_164_98);
        assert_rel(projection.net_worth.renting_net_worth[120], 33_557.899_472_017_656);
    }

    #[test]
    fn zero_growth_zero_cost_advantage_has_closed_form() {
        let input = zero_cost_input();
        let projection = project(&input).expect("valid projection");
        let down = 75_000.0;
        let rent = 2_000.0;

        for (t, p) in projection.schedule.periods.iter().enumerate() {
            let paid = p.cumulative_interest_paid + p.cumulative_principal_paid;
            let owning = input.home_price - p.remaining_balance;
            let renting = down + paid - rent * t as f64 - rent * (t as f64 + 1.0);
            let expected = owning - renting;
            let tol = 1e-6 * expected.abs().max(1.0);
            assert!(
                (projection.net_worth.advantage[t] - expected).abs() <= tol,
                "period {t}: expected {expected}, got {}",
                projection.net_worth.advantage[t]
            );
        }
    }

    #[test]
    fn projection_is_bit_identical_across_runs() {
        let input = sample_input();
        let first = project(&input).expect("valid projection");
        let second = project(&input).expect("valid projection");
        assert_eq!(first, second);
    }

    #[test]
    fn horizon_past_loan_term_keeps_appreciating_after_payoff() {
        let input = ProjectionInput {
            horizon_years: 40,
            mortgage_term_years: 15,
            ..sample_input()
        };
        let projection = project(&input).expect("valid projection");
        assert_eq!(projection.schedule.periods.len(), 481);
        assert_eq!(projection.summary.payoff_period, Some(180));

        let at_payoff = projection.schedule.periods[180];
        for t in 181..=480 {
            let p = projection.schedule.periods[t];
            assert_eq!(p.remaining_balance, 0.0);
            assert_eq!(p.cumulative_interest_paid, at_payoff.cumulative_interest_paid);
            assert!(projection.costs.home_value[t] > projection.costs.home_value[t - 1]);
            assert!(projection.costs.property_tax[t] > 0.0);
        }
        // No mortgage payment in the outflow once the loan is gone.
        let expected_outflow = projection.costs.property_tax[200]
            + projection.costs.insurance[200]
            + projection.costs.maintenance[200]
            + projection.costs.utilities[200]
            + projection.costs.hoa[200];
        assert_approx(projection.cashflows.ownership_outflow[200], expected_outflow);
    }

    #[test]
    fn contributions_are_added_after_growth() {
        let input = sample_input();
        let projection = project(&input).expect("valid projection");
        let cf = &projection.cashflows;
        let r = 1.0 + 0.07 / 12.0;
        for t in [1usize, 2, 50, 359] {
            assert_approx(
                cf.investment_value[t],
                cf.investment_value[t - 1] * r + cf.net_contribution[t - 1],
            );
        }
    }

    #[test]
    fn negative_contributions_withdraw_without_floor() {
        let input = ProjectionInput {
            monthly_rent: 6_000.0,
            security_deposit_months: 20.0,
            ..sample_input()
        };
        let projection = project(&input).expect("valid projection");
        assert!(projection.initial.investment_base < 0.0);
        assert!(projection.cashflows.net_contribution[0] < 0.0);
        assert!(projection.cashflows.investment_value[1] < projection.initial.investment_base);
    }

    #[test]
    fn annual_step_rent_is_flat_within_each_lease_year() {
        let input = ProjectionInput {
            rent_growth_policy: RentGrowthPolicy::AnnualStep,
            ..sample_input()
        };
        let rent = project_rent(&input, 37).expect("rent");
        assert_approx(rent.rent[0], 2_000.0);
        assert_approx(rent.rent[11], 2_000.0);
        assert_approx(rent.rent[12], 2_060.0);
        assert_approx(rent.rent[23], 2_060.0);
        assert_approx(rent.rent[36], 2_000.0 * 1.03_f64.powi(3));

        let monthly = project_rent(&sample_input(), 37).expect("rent");
        assert!(monthly.rent[6] > rent.rent[6]);
        assert_approx(monthly.rent[12], rent.rent[12]);
        assert_approx(monthly.renters_insurance[20], 10.0);
    }

    #[test]
    fn rejects_invalid_inputs_before_computing() {
        let cases: Vec<(ProjectionInput, &str)> = vec![
            (ProjectionInput { horizon_years: 0, ..sample_input() }, "horizon_years"),
            (ProjectionInput { home_price: 0.0, ..sample_input() }, "home_price"),
            (ProjectionInput { monthly_rent: -1.0, ..sample_input() }, "monthly_rent"),
            (
                ProjectionInput { investment_return_annual: -0.01, ..sample_input() },
                "investment_return_annual",
            ),
            (
                ProjectionInput { down_payment: DownPayment::Percent(1.2), ..sample_input() },
                "down_payment",
            ),
            (
                ProjectionInput { marginal_tax_rate: 1.5, ..sample_input() },
                "marginal_tax_rate",
            ),
            (
                ProjectionInput { home_appreciation_annual: f64::NAN, ..sample_input() },
                "home_appreciation_annual",
            ),
        ];
        for (input, expected_field) in cases {
            match project(&input) {
                Err(ProjectionError::InvalidInput { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected invalid {expected_field}, got {other:?}"),
            }
        }

        let zero_term = ProjectionInput { mortgage_term_years: 0, ..sample_input() };
        assert!(matches!(project(&zero_term), Err(ProjectionError::InvalidTerm(_))));
    }

    #[test]
    fn rejects_horizon_and_term_beyond_limit() {
        let long_horizon = ProjectionInput { horizon_years: 400_000_000, ..sample_input() };
        assert!(matches!(
            project(&long_horizon),
            Err(ProjectionError::InvalidInput { field: "horizon_years", .. })
        ));
        let long_term = ProjectionInput { mortgage_term_years: u32::MAX, ..sample_input() };
        assert!(matches!(project(&long_term), Err(ProjectionError::InvalidTerm(_))));

        let longest = ProjectionInput {
            horizon_years: MAX_HORIZON_YEARS,
            mortgage_term_years: MAX_HORIZON_YEARS,
            ..sample_input()
        };
        let projection = project(&longest).expect("limit is inclusive");
        assert_eq!(projection.net_worth.advantage.len(), (MAX_HORIZON_YEARS * 12) as usize + 1);
    }

    #[test]
    fn extreme_growth_fails_with_overflow() {
        let input = ProjectionInput {
            home_appreciation_annual: 1e12,
            horizon_years: MAX_HORIZON_YEARS,
            mortgage_term_years: 30,
            ..sample_input()
        };
        assert!(matches!(project(&input), Err(ProjectionError::NumericOverflow(_))));
    }

    #[test]
    fn breakeven_month_requires_staying_ahead() {
        assert_eq!(breakeven_month(&[-3.0, -1.0, 0.5, 2.0]), Some(2));
        assert_eq!(breakeven_month(&[1.0, -1.0, 0.0, 2.0]), Some(2));
        assert_eq!(breakeven_month(&[1.0, 2.0]), Some(0));
        assert_eq!(breakeven_month(&[1.0, -2.0]), None);
        assert_eq!(breakeven_month(&[]), None);
    }

    #[test]
    fn summary_reports_final_values() {
        let projection = project(&sample_input()).expect("valid projection");
        let s = projection.summary;
        assert_eq!(s.horizon_months, 360);
        assert_approx(s.loan_amount, 300_000.0);
        assert_eq!(s.pmi_months, 0);
        assert_eq!(s.payoff_period, Some(360));
        assert_eq!(s.final_advantage, *projection.net_worth.advantage.last().expect("non-empty"));
        assert_eq!(s.breakeven_month, breakeven_month(&projection.net_worth.advantage));
        assert!(s.breakeven_month.is_some());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(24))]

        #[test]
        fn prop_series_are_aligned_finite_and_deterministic(
            price in 50_000u32..1_500_000,
            rent in 300u32..8_000,
            horizon in 1u32..41,
            term in 1u32..41,
            down_bp in 0u32..10_001,
            rate_bp in 0u32..1_200,
            return_bp in 0u32..1_200,
            appreciation_bp in 0u32..800,
            annual_step in proptest::bool::ANY
        ) {
            let input = ProjectionInput {
                home_price: price as f64,
                monthly_rent: rent as f64,
                horizon_years: horizon,
                mortgage_term_years: term,
                down_payment: DownPayment::Percent(down_bp as f64 / 10_000.0),
                mortgage_annual_rate: rate_bp as f64 / 10_000.0,
                investment_return_annual: return_bp as f64 / 10_000.0,
                home_appreciation_annual: appreciation_bp as f64 / 10_000.0,
                rent_growth_policy: if annual_step {
                    RentGrowthPolicy::AnnualStep
                } else {
                    RentGrowthPolicy::MonthlyCompounding
                },
                ..sample_input()
            };
            let projection = project(&input).expect("valid projection");
            let n = horizon as usize * 12 + 1;

            prop_assert_eq!(projection.schedule.periods.len(), n);
            prop_assert_eq!(projection.net_worth.advantage.len(), n);
            prop_assert_eq!(projection.cashflows.investment_value.len(), n);
            prop_assert_eq!(projection.rent.rent.len(), n);
            for t in 0..n {
                let nw = &projection.net_worth;
                prop_assert!(nw.advantage[t].is_finite());
                prop_assert!((nw.advantage[t] - (nw.buying_net_worth[t] - nw.renting_net_worth[t])).abs() <= 1e-9 * nw.buying_net_worth[t].abs().max(1.0));
            }

            let again = project(&input).expect("valid projection");
            prop_assert!(again == projection);
        }
    }
}
