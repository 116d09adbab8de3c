//! Run configuration shared by the binaries
//!
//! Values come from environment variables with built-in defaults:
//!   DISCOUNT_RATE, PURCHASE_COSTS, BUSINESS_PLANS_PATH, CASHFLOW_OUTPUT_PATH

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default annual discount rate for NPV
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.08;

/// Default purchaser's costs applied in yield valuations
pub const DEFAULT_PURCHASE_COSTS: f64 = 0.068;

/// Default location of the business plan extract
pub const DEFAULT_BUSINESS_PLANS_PATH: &str = "data/business_plans.csv";

/// Default timeline CSV output
pub const DEFAULT_CASHFLOW_OUTPUT_PATH: &str = "cashflow_output.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppraisalConfig {
    /// Annual discount rate used for NPV and years-purchase factors
    pub discount_rate: f64,

    /// Purchaser's costs as a fraction of price
    pub purchase_costs: f64,

    pub business_plans_path: PathBuf,

    pub cashflow_output_path: PathBuf,
}

impl Default for AppraisalConfig {
    fn default() -> Self {
        Self {
            discount_rate: DEFAULT_DISCOUNT_RATE,
            purchase_costs: DEFAULT_PURCHASE_COSTS,
            business_plans_path: PathBuf::from(DEFAULT_BUSINESS_PLANS_PATH),
            cashflow_output_path: PathBuf::from(DEFAULT_CASHFLOW_OUTPUT_PATH),
        }
    }
}

impl AppraisalConfig {
    /// Read configuration from the environment, keeping defaults for
    /// anything unset or unparsable
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let discount_rate = lookup("DISCOUNT_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.discount_rate);

        let purchase_costs = lookup("PURCHASE_COSTS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.purchase_costs);

        let business_plans_path = lookup("BUSINESS_PLANS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.business_plans_path);

        let cashflow_output_path = lookup("CASHFLOW_OUTPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.cashflow_output_path);

        Self {
            discount_rate,
            purchase_costs,
            business_plans_path,
            cashflow_output_path,
        }
    }
}
