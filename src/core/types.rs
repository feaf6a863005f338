use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilingStatus {
    Individual,
    Joint,
}

/// How the monthly rent grows from its starting value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RentGrowthPolicy {
    /// `rent[t] = rent0 * (1 + g)^(t / 12)`, a fractional-year exponent every month.
    MonthlyCompounding,
    /// Rent is flat within a lease year and steps up by `g` at every 12-month boundary.
    AnnualStep,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DownPayment {
    /// Fraction of the home price, e.g. `0.20`.
    Percent(f64),
    /// Absolute amount in currency units.
    Amount(f64),
}

/// Standard deduction baseline used to decide whether itemizing pays off.
///
/// Amounts are statutory values for `tax_year` and are treated as configuration,
/// callers can swap in another year's table without touching the engine.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardDeductionTable {
    pub tax_year: u16,
    pub individual: f64,
    pub joint: f64,
}

impl StandardDeductionTable {
    /// US federal standard deduction, tax year 2023 (IRS Rev. Proc. 2022-38).
    pub const TAX_YEAR_2023: Self = Self {
        tax_year: 2023,
        individual: 13_850.0,
        joint: 27_700.0,
    };

    pub fn amount_for(&self, status: FilingStatus) -> f64 {
        match status {
            FilingStatus::Individual => self.individual,
            FilingStatus::Joint => self.joint,
        }
    }
}

impl Default for StandardDeductionTable {
    fn default() -> Self {
        Self::TAX_YEAR_2023
    }
}

/// Longest horizon or mortgage term accepted, in years.
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Scalar assumptions for one projection run.
///
/// Every rate and `_pct` field is a fraction of one (`0.065` means 6.5%).
/// Annual rates are converted to monthly figures inside the engine.
#[derive(Debug, Clone)]
pub struct ProjectionInput {
    pub home_price: f64,
    pub monthly_rent: f64,
    pub horizon_years: u32,
    pub down_payment: DownPayment,
    pub mortgage_annual_rate: f64,
    pub mortgage_term_years: u32,
    pub pmi_annual_rate: f64,
    pub home_appreciation_annual: f64,
    pub rent_appreciation_annual: f64,
    pub rent_growth_policy: RentGrowthPolicy,
    pub investment_return_annual: f64,
    pub inflation_annual: f64,
    pub property_tax_rate: f64,
    pub marginal_tax_rate: f64,
    pub filing_status: FilingStatus,
    pub other_itemized_deductions: f64,
    pub buying_closing_cost_pct: f64,
    pub selling_closing_cost_pct: f64,
    pub maintenance_pct: f64,
    pub insurance_pct: f64,
    pub extra_utilities: f64,
    pub hoa_fees: f64,
    pub hoa_tax_deductible_pct: f64,
    pub security_deposit_months: f64,
    pub broker_fee_pct: f64,
    pub renters_insurance_pct: f64,
    pub standard_deduction: StandardDeductionTable,
}

impl ProjectionInput {
    pub fn horizon_months(&self) -> u32 {
        self.horizon_years.saturating_mul(12)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationPeriod {
    pub period: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub remaining_balance: f64,
    pub cumulative_interest_paid: f64,
    pub cumulative_principal_paid: f64,
}

/// Monthly schedule of a fixed-rate loan. `periods[0]` is the origination
/// record (full balance, nothing paid yet).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationSchedule {
    pub loan_amount: f64,
    pub annual_rate: f64,
    pub term_years: u32,
    pub monthly_payment: f64,
    pub periods: Vec<AmortizationPeriod>,
}

/// Recurring ownership costs and the resulting tax effect, one entry per period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSeries {
    pub home_value: Vec<f64>,
    pub property_tax: Vec<f64>,
    pub insurance: Vec<f64>,
    pub maintenance: Vec<f64>,
    pub utilities: Vec<f64>,
    pub hoa: Vec<f64>,
    pub pmi: Vec<f64>,
    pub itemized_deductions: Vec<f64>,
    pub tax_savings: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentSeries {
    pub rent: Vec<f64>,
    pub renters_insurance: Vec<f64>,
}

/// Per-period money movement of both scenarios and the counterfactual
/// investment account they feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowSeries {
    pub ownership_outflow: Vec<f64>,
    pub renting_outflow: Vec<f64>,
    pub net_contribution: Vec<f64>,
    pub investment_value: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthSeries {
    pub buying_net_worth: Vec<f64>,
    pub renting_net_worth: Vec<f64>,
    pub advantage: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialCosts {
    pub down_payment: f64,
    pub buying_closing_costs: f64,
    pub initial_buy_costs: f64,
    pub security_deposit: f64,
    pub broker_fee: f64,
    pub initial_rent_costs: f64,
    pub investment_base: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub horizon_months: u32,
    pub loan_amount: f64,
    pub monthly_payment: f64,
    pub payoff_period: Option<u32>,
    pub pmi_months: u32,
    pub total_interest_paid: f64,
    pub total_rent_paid: f64,
    pub final_home_value: f64,
    pub final_investment_value: f64,
    pub final_buying_net_worth: f64,
    pub final_renting_net_worth: f64,
    pub final_advantage: f64,
    pub breakeven_month: Option<u32>,
}

/// Everything one projection run derives. All series share the same
/// `0..=horizon_months` period axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub initial: InitialCosts,
    pub schedule: AmortizationSchedule,
    pub costs: CostSeries,
    pub rent: RentSeries,
    pub cashflows: CashflowSeries,
    pub net_worth: NetWorthSeries,
    pub summary: ProjectionSummary,
}
