mod amortization;
mod costs;
mod engine;
mod error;
mod solver;
mod timeline;
mod types;

pub use amortization::{amortize, amortize_over, monthly_payment};
pub use costs::{
    PMI_DOWN_PAYMENT_THRESHOLD, PMI_LTV_THRESHOLD, ResolvedDownPayment, project_costs,
    resolve_down_payment,
};
pub use engine::{breakeven_month, project, project_rent, validate_input};
pub use error::{ProjectionError, ProjectionResult};
pub use solver::{
    BreakevenIteration, BreakevenSolveConfig, BreakevenSolveResult, MAX_SOLVER_ITERATIONS,
    solve_breakeven_rent,
};
pub use timeline::month_axis;
pub use types::{
    AmortizationPeriod, AmortizationSchedule, CashflowSeries, CostSeries, DownPayment,
    FilingStatus, InitialCosts, MAX_HORIZON_YEARS, NetWorthSeries, Projection, ProjectionInput,
    ProjectionSummary, RentGrowthPolicy, RentSeries, StandardDeductionTable,
};
