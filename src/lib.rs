//! Lease appraisal - monthly cashflow projection engine for a single commercial property lease
//!
//! This library provides:
//! - Month-by-month lease timelines (contracted rent, review, refurbishment, void, rent-free, relet)
//! - Entry/exit boundary rows and chart-friendly cashflow lines
//! - Dated NPV and IRR (XNPV/XIRR conventions)
//! - Years-purchase and initial-yield capital valuations
//! - Business-plan lookups with caching, and parallel sensitivity runs

pub mod config;
pub mod dates;
pub mod error;
pub mod lease;
pub mod projection;
pub mod valuation;
pub mod appraisal;
pub mod session;
pub mod scenario;

// Re-export commonly used types
pub use config::AppraisalConfig;
pub use error::{AppraisalError, AppraisalResult};
pub use lease::LeaseAssumptions;
pub use projection::{ProjectionEngine, ProjectionConfig, Timeline, TimelinePeriod, Category};
pub use appraisal::{appraise, Appraisal};
pub use session::AppraisalSession;
pub use scenario::{ScenarioRunner, SensitivityPoint};
