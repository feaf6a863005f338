mod report;

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::core::{
    BreakevenSolveConfig, BreakevenSolveResult, DownPayment, FilingStatus, MAX_HORIZON_YEARS,
    Projection, ProjectionError, ProjectionInput, RentGrowthPolicy, StandardDeductionTable,
    month_axis, project, solve_breakeven_rent,
};

pub use report::render_yearly_table;

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliFilingStatus {
    Individual,
    Joint,
}

impl From<CliFilingStatus> for FilingStatus {
    fn from(value: CliFilingStatus) -> Self {
        match value {
            CliFilingStatus::Individual => FilingStatus::Individual,
            CliFilingStatus::Joint => FilingStatus::Joint,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliRentGrowth {
    MonthlyCompounding,
    AnnualStep,
}

impl From<CliRentGrowth> for RentGrowthPolicy {
    fn from(value: CliRentGrowth) -> Self {
        match value {
            CliRentGrowth::MonthlyCompounding => RentGrowthPolicy::MonthlyCompounding,
            CliRentGrowth::AnnualStep => RentGrowthPolicy::AnnualStep,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFilingStatus {
    #[serde(alias = "single")]
    Individual,
    #[serde(alias = "married", alias = "married-joint")]
    Joint,
}

impl From<ApiFilingStatus> for CliFilingStatus {
    fn from(value: ApiFilingStatus) -> Self {
        match value {
            ApiFilingStatus::Individual => CliFilingStatus::Individual,
            ApiFilingStatus::Joint => CliFilingStatus::Joint,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRentGrowth {
    #[serde(alias = "monthlyCompounding", alias = "monthly_compounding", alias = "monthly")]
    MonthlyCompounding,
    #[serde(alias = "annualStep", alias = "annual_step", alias = "annual")]
    AnnualStep,
}

impl From<ApiRentGrowth> for CliRentGrowth {
    fn from(value: ApiRentGrowth) -> Self {
        match value {
            ApiRentGrowth::MonthlyCompounding => CliRentGrowth::MonthlyCompounding,
            ApiRentGrowth::AnnualStep => CliRentGrowth::AnnualStep,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    home_price: Option<f64>,
    monthly_rent: Option<f64>,
    #[serde(alias = "horizonYears")]
    years: Option<u32>,

    down_payment: Option<f64>,
    down_payment_pct: Option<f64>,
    mortgage_rate: Option<f64>,
    mortgage_term: Option<u32>,
    pmi_rate: Option<f64>,

    home_appreciation: Option<f64>,
    rent_appreciation: Option<f64>,
    rent_growth: Option<ApiRentGrowth>,
    investment_return: Option<f64>,
    inflation: Option<f64>,

    property_tax_rate: Option<f64>,
    marginal_tax_rate: Option<f64>,
    filing_status: Option<ApiFilingStatus>,
    other_itemized_deductions: Option<f64>,
    tax_year: Option<u16>,
    standard_deduction_individual: Option<f64>,
    standard_deduction_joint: Option<f64>,

    buying_closing_cost_pct: Option<f64>,
    selling_closing_cost_pct: Option<f64>,
    maintenance_pct: Option<f64>,
    insurance_pct: Option<f64>,
    extra_utilities: Option<f64>,
    hoa_fees: Option<f64>,
    hoa_tax_deductible_pct: Option<f64>,

    security_deposit_months: Option<f64>,
    broker_fee_pct: Option<f64>,
    renters_insurance_pct: Option<f64>,

    anchor_date: Option<NaiveDate>,
    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
}

/// Projection assumptions as entered by a person: money in currency units,
/// every rate in percent.
#[derive(Args, Debug, Clone)]
pub struct ProjectionArgs {
    #[arg(long, default_value_t = 375_000.0, help = "Purchase price of the home")]
    pub home_price: f64,
    #[arg(long, default_value_t = 2_000.0, help = "Starting monthly rent")]
    pub monthly_rent: f64,
    #[arg(long, default_value_t = 30, help = "Projection horizon in years")]
    pub years: u32,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "Down payment in percent of the home price"
    )]
    pub down_payment_pct: f64,
    #[arg(
        long,
        help = "Down payment as an absolute amount; overrides --down-payment-pct"
    )]
    pub down_payment: Option<f64>,
    #[arg(long, default_value_t = 6.5, help = "Mortgage annual rate in percent")]
    pub mortgage_rate: f64,
    #[arg(long, default_value_t = 30, help = "Mortgage term in years")]
    pub mortgage_term: u32,
    #[arg(
        long,
        default_value_t = 0.5,
        help = "PMI annual rate in percent of the balance, charged below 20% down"
    )]
    pub pmi_rate: f64,
    #[arg(long, default_value_t = 3.0, help = "Home appreciation in percent per year")]
    pub home_appreciation: f64,
    #[arg(long, default_value_t = 3.0, help = "Rent growth in percent per year")]
    pub rent_appreciation: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliRentGrowth::MonthlyCompounding,
        help = "Rent growth policy: grow every month or step up once a year"
    )]
    pub rent_growth: CliRentGrowth,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Return on invested savings in percent per year"
    )]
    pub investment_return: f64,
    #[arg(long, default_value_t = 2.0, help = "Inflation in percent per year")]
    pub inflation: f64,
    #[arg(
        long,
        default_value_t = 1.5,
        help = "Property tax in percent of home value per year"
    )]
    pub property_tax_rate: f64,
    #[arg(long, default_value_t = 25.0, help = "Marginal income tax rate in percent")]
    pub marginal_tax_rate: f64,
    #[arg(long, value_enum, default_value_t = CliFilingStatus::Individual)]
    pub filing_status: CliFilingStatus,
    #[arg(long, default_value_t = 0.0)]
    pub other_itemized_deductions: f64,
    #[arg(
        long,
        default_value_t = 2023,
        help = "Tax year the standard deduction amounts belong to"
    )]
    pub tax_year: u16,
    #[arg(long, default_value_t = 13_850.0)]
    pub standard_deduction_individual: f64,
    #[arg(long, default_value_t = 27_700.0)]
    pub standard_deduction_joint: f64,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "Buying closing costs in percent of the price"
    )]
    pub buying_closing_cost_pct: f64,
    #[arg(
        long,
        default_value_t = 6.0,
        help = "Selling closing costs in percent of the home value"
    )]
    pub selling_closing_cost_pct: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Maintenance in percent of home value per year"
    )]
    pub maintenance_pct: f64,
    #[arg(
        long,
        default_value_t = 0.5,
        help = "Homeowners insurance in percent of home value per year"
    )]
    pub insurance_pct: f64,
    #[arg(
        long,
        default_value_t = 200.0,
        help = "Extra monthly utilities for owning, grows with inflation"
    )]
    pub extra_utilities: f64,
    #[arg(long, default_value_t = 0.0, help = "Monthly HOA fees")]
    pub hoa_fees: f64,
    #[arg(long, default_value_t = 0.0, help = "Tax-deductible share of HOA fees in percent")]
    pub hoa_tax_deductible_pct: f64,
    #[arg(long, default_value_t = 1.0, help = "Security deposit in months of rent")]
    pub security_deposit_months: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Broker fee in percent of one year's rent"
    )]
    pub broker_fee_pct: f64,
    #[arg(
        long,
        default_value_t = 0.5,
        help = "Renters insurance in percent of annual rent"
    )]
    pub renters_insurance_pct: f64,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: ProjectionInput,
    anchor_date: NaiveDate,
    solve_config: BreakevenSolveConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub anchor_date: NaiveDate,
    pub filing_status: FilingStatus,
    pub rent_growth_policy: RentGrowthPolicy,
    pub standard_deduction: StandardDeductionTable,
    pub dates: Vec<NaiveDate>,
    #[serde(flatten)]
    pub projection: Projection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BreakevenResponse {
    monthly_rent: f64,
    horizon_years: u32,
    #[serde(flatten)]
    result: BreakevenSolveResult,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_inputs(args: ProjectionArgs) -> Result<ProjectionInput, String> {
    if !args.home_price.is_finite() || args.home_price <= 0.0 {
        return Err("--home-price must be > 0".to_string());
    }
    if !args.monthly_rent.is_finite() || args.monthly_rent < 0.0 {
        return Err("--monthly-rent must be >= 0".to_string());
    }
    if args.years == 0 || args.years > MAX_HORIZON_YEARS {
        return Err(format!("--years must be between 1 and {MAX_HORIZON_YEARS}"));
    }
    if args.mortgage_term == 0 || args.mortgage_term > MAX_HORIZON_YEARS {
        return Err(format!(
            "--mortgage-term must be between 1 and {MAX_HORIZON_YEARS}"
        ));
    }

    let down_payment = match args.down_payment {
        Some(amount) => {
            if !amount.is_finite() || amount < 0.0 || amount > args.home_price {
                return Err("--down-payment must be between 0 and --home-price".to_string());
            }
            DownPayment::Amount(amount)
        }
        None => {
            if !(0.0..=100.0).contains(&args.down_payment_pct) {
                return Err("--down-payment-pct must be between 0 and 100".to_string());
            }
            DownPayment::Percent(args.down_payment_pct / 100.0)
        }
    };

    for (name, rate) in [
        ("--marginal-tax-rate", args.marginal_tax_rate),
        ("--selling-closing-cost-pct", args.selling_closing_cost_pct),
        ("--hoa-tax-deductible-pct", args.hoa_tax_deductible_pct),
    ] {
        if !(0.0..=100.0).contains(&rate) {
            return Err(format!("{name} must be between 0 and 100"));
        }
    }

    for (name, rate) in [
        ("--mortgage-rate", args.mortgage_rate),
        ("--pmi-rate", args.pmi_rate),
        ("--home-appreciation", args.home_appreciation),
        ("--rent-appreciation", args.rent_appreciation),
        ("--investment-return", args.investment_return),
        ("--inflation", args.inflation),
        ("--property-tax-rate", args.property_tax_rate),
        ("--buying-closing-cost-pct", args.buying_closing_cost_pct),
        ("--maintenance-pct", args.maintenance_pct),
        ("--insurance-pct", args.insurance_pct),
        ("--broker-fee-pct", args.broker_fee_pct),
        ("--renters-insurance-pct", args.renters_insurance_pct),
    ] {
        if !rate.is_finite() || rate < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    for (name, amount) in [
        ("--other-itemized-deductions", args.other_itemized_deductions),
        ("--extra-utilities", args.extra_utilities),
        ("--hoa-fees", args.hoa_fees),
        ("--security-deposit-months", args.security_deposit_months),
        (
            "--standard-deduction-individual",
            args.standard_deduction_individual,
        ),
        ("--standard-deduction-joint", args.standard_deduction_joint),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    Ok(ProjectionInput {
        home_price: args.home_price,
        monthly_rent: args.monthly_rent,
        horizon_years: args.years,
        down_payment,
        mortgage_annual_rate: args.mortgage_rate / 100.0,
        mortgage_term_years: args.mortgage_term,
        pmi_annual_rate: args.pmi_rate / 100.0,
        home_appreciation_annual: args.home_appreciation / 100.0,
        rent_appreciation_annual: args.rent_appreciation / 100.0,
        rent_growth_policy: args.rent_growth.into(),
        investment_return_annual: args.investment_return / 100.0,
        inflation_annual: args.inflation / 100.0,
        property_tax_rate: args.property_tax_rate / 100.0,
        marginal_tax_rate: args.marginal_tax_rate / 100.0,
        filing_status: args.filing_status.into(),
        other_itemized_deductions: args.other_itemized_deductions,
        buying_closing_cost_pct: args.buying_closing_cost_pct / 100.0,
        selling_closing_cost_pct: args.selling_closing_cost_pct / 100.0,
        maintenance_pct: args.maintenance_pct / 100.0,
        insurance_pct: args.insurance_pct / 100.0,
        extra_utilities: args.extra_utilities,
        hoa_fees: args.hoa_fees,
        hoa_tax_deductible_pct: args.hoa_tax_deductible_pct / 100.0,
        security_deposit_months: args.security_deposit_months,
        broker_fee_pct: args.broker_fee_pct / 100.0,
        renters_insurance_pct: args.renters_insurance_pct / 100.0,
        standard_deduction: StandardDeductionTable {
            tax_year: args.tax_year,
            individual: args.standard_deduction_individual,
            joint: args.standard_deduction_joint,
        },
    })
}

/// Runs one projection and pairs every period with its calendar date.
pub fn build_project_response(
    inputs: &ProjectionInput,
    anchor_date: NaiveDate,
) -> Result<ProjectResponse, ProjectionError> {
    let projection = project(inputs)?;
    let dates = month_axis(anchor_date, projection.schedule.periods.len())?;
    Ok(ProjectResponse {
        anchor_date,
        filing_status: inputs.filing_status,
        rent_growth_policy: inputs.rent_growth_policy,
        standard_deduction: inputs.standard_deduction,
        dates,
        projection,
    })
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route(
            "/api/breakeven",
            get(breakeven_get_handler).post(breakeven_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "buy-vs-rent HTTP API listening");
    info!("Local access: http://127.0.0.1:{}/", addr.port());
    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn breakeven_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    breakeven_handler_impl(payload).await
}

async fn breakeven_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    breakeven_handler_impl(payload).await
}

async fn project_handler_impl(payload: ProjectPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!(error = %msg, "rejected projection request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match build_project_response(&request.inputs, request.anchor_date) {
        Ok(response) => {
            debug!(
                periods = response.dates.len(),
                final_advantage = response.projection.summary.final_advantage,
                "projection served"
            );
            json_response(StatusCode::OK, response)
        }
        Err(err) => projection_error_response(&err),
    }
}

async fn breakeven_handler_impl(payload: ProjectPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!(error = %msg, "rejected breakeven request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let inputs = request.inputs.clone();
    let solve_config = request.solve_config;
    let solved = tokio::task::spawn_blocking(move || solve_breakeven_rent(&inputs, solve_config))
        .await;
    let solved = match solved {
        Ok(solved) => solved,
        Err(err) => {
            error!(error = %err, "breakeven solve task failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Breakeven solve failed");
        }
    };

    match solved {
        Ok(result) => json_response(
            StatusCode::OK,
            BreakevenResponse {
                monthly_rent: request.inputs.monthly_rent,
                horizon_years: request.inputs.horizon_years,
                result,
            },
        ),
        Err(err) => projection_error_response(&err),
    }
}

fn status_for(err: &ProjectionError) -> StatusCode {
    match err {
        ProjectionError::InvalidInput { .. } | ProjectionError::InvalidTerm(_) => {
            StatusCode::BAD_REQUEST
        }
        ProjectionError::NumericOverflow(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn projection_error_response(err: &ProjectionError) -> Response {
    warn!(error = %err, "projection failed");
    error_response(status_for(err), &err.to_string())
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ProjectPayload) -> Result<ApiRequest, String> {
    let mut args = default_args_for_api();
    let mut solve_config = BreakevenSolveConfig::default();

    if let Some(v) = payload.home_price {
        args.home_price = v;
    }
    if let Some(v) = payload.monthly_rent {
        args.monthly_rent = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }

    if let Some(v) = payload.down_payment {
        args.down_payment = Some(v);
    }
    if let Some(v) = payload.down_payment_pct {
        args.down_payment_pct = v;
    }
    if let Some(v) = payload.mortgage_rate {
        args.mortgage_rate = v;
    }
    if let Some(v) = payload.mortgage_term {
        args.mortgage_term = v;
    }
    if let Some(v) = payload.pmi_rate {
        args.pmi_rate = v;
    }

    if let Some(v) = payload.home_appreciation {
        args.home_appreciation = v;
    }
    if let Some(v) = payload.rent_appreciation {
        args.rent_appreciation = v;
    }
    if let Some(v) = payload.rent_growth {
        args.rent_growth = v.into();
    }
    if let Some(v) = payload.investment_return {
        args.investment_return = v;
    }
    if let Some(v) = payload.inflation {
        args.inflation = v;
    }

    if let Some(v) = payload.property_tax_rate {
        args.property_tax_rate = v;
    }
    if let Some(v) = payload.marginal_tax_rate {
        args.marginal_tax_rate = v;
    }
    if let Some(v) = payload.filing_status {
        args.filing_status = v.into();
    }
    if let Some(v) = payload.other_itemized_deductions {
        args.other_itemized_deductions = v;
    }
    if let Some(v) = payload.tax_year {
        args.tax_year = v;
    }
    if let Some(v) = payload.standard_deduction_individual {
        args.standard_deduction_individual = v;
    }
    if let Some(v) = payload.standard_deduction_joint {
        args.standard_deduction_joint = v;
    }

    if let Some(v) = payload.buying_closing_cost_pct {
        args.buying_closing_cost_pct = v;
    }
    if let Some(v) = payload.selling_closing_cost_pct {
        args.selling_closing_cost_pct = v;
    }
    if let Some(v) = payload.maintenance_pct {
        args.maintenance_pct = v;
    }
    if let Some(v) = payload.insurance_pct {
        args.insurance_pct = v;
    }
    if let Some(v) = payload.extra_utilities {
        args.extra_utilities = v;
    }
    if let Some(v) = payload.hoa_fees {
        args.hoa_fees = v;
    }
    if let Some(v) = payload.hoa_tax_deductible_pct {
        args.hoa_tax_deductible_pct = v;
    }

    if let Some(v) = payload.security_deposit_months {
        args.security_deposit_months = v;
    }
    if let Some(v) = payload.broker_fee_pct {
        args.broker_fee_pct = v;
    }
    if let Some(v) = payload.renters_insurance_pct {
        args.renters_insurance_pct = v;
    }

    if let Some(v) = payload.search_min {
        solve_config.search_min = v;
    }
    if let Some(v) = payload.search_max {
        solve_config.search_max = v;
    }
    if let Some(v) = payload.tolerance {
        solve_config.tolerance = v;
    }
    if let Some(v) = payload.max_iterations {
        solve_config.max_iterations = v;
    }

    let inputs = build_inputs(args)?;
    let anchor_date = payload
        .anchor_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    Ok(ApiRequest {
        inputs,
        anchor_date,
        solve_config,
    })
}

fn default_args_for_api() -> ProjectionArgs {
    ProjectionArgs {
        home_price: 375_000.0,
        monthly_rent: 2_000.0,
        years: 30,
        down_payment_pct: 20.0,
        down_payment: None,
        mortgage_rate: 6.5,
        mortgage_term: 30,
        pmi_rate: 0.5,
        home_appreciation: 3.0,
        rent_appreciation: 3.0,
        rent_growth: CliRentGrowth::MonthlyCompounding,
        investment_return: 7.0,
        inflation: 2.0,
        property_tax_rate: 1.5,
        marginal_tax_rate: 25.0,
        filing_status: CliFilingStatus::Individual,
        other_itemized_deductions: 0.0,
        tax_year: 2023,
        standard_deduction_individual: 13_850.0,
        standard_deduction_joint: 27_700.0,
        buying_closing_cost_pct: 4.0,
        selling_closing_cost_pct: 6.0,
        maintenance_pct: 1.0,
        insurance_pct: 0.5,
        extra_utilities: 200.0,
        hoa_fees: 0.0,
        hoa_tax_deductible_pct: 0.0,
        security_deposit_months: 1.0,
        broker_fee_pct: 0.0,
        renters_insurance_pct: 0.5,
    }
}
