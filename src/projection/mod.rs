//! Monthly lease cashflow projection and return metrics

mod state;
mod engine;
mod cashflows;
mod irr;

pub use state::PhaseSchedule;
pub use engine::{ProjectionEngine, ProjectionConfig, project};
pub use cashflows::{Category, PhaseSegment, Timeline, TimelinePeriod, TimelineSummary};
pub use irr::{xnpv, xirr, npv_monthly, irr_monthly, annualise_monthly_rate, DAYS_PER_YEAR};
