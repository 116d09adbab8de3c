//! Lease assumptions and business plan defaults

mod data;
mod cache;
pub mod loader;

pub use data::LeaseAssumptions;
pub use cache::{CachedBusinessPlans, CacheStats};
pub use loader::{BusinessPlanRecord, BusinessPlanSource, CsvBusinessPlans, resolve_assumptions};
