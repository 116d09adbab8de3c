//! Scenario runner for batch appraisals
//!
//! Holds one set of base assumptions and re-appraises it under varied
//! discount rates, exit yields or whole alternative assumption sets.
//! Runs are independent, so batches are spread across threads.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::appraisal::{appraise, derive_exit_price, Appraisal};
use crate::config::AppraisalConfig;
use crate::error::AppraisalResult;
use crate::lease::LeaseAssumptions;

/// One cell of a sensitivity grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub exit_yield: f64,
    pub discount_rate: f64,
    pub exit_price: f64,
    pub npv: f64,
    pub irr: Option<f64>,
}

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(LeaseAssumptions::default_pricing(), AppraisalConfig::default());
/// let by_rate = runner.run_discount_rates(&[0.06, 0.08, 0.10]);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base_assumptions: LeaseAssumptions,
    config: AppraisalConfig,
}

impl ScenarioRunner {
    pub fn new(base_assumptions: LeaseAssumptions, config: AppraisalConfig) -> Self {
        Self {
            base_assumptions,
            config,
        }
    }

    /// Appraise the base assumptions
    pub fn run(&self) -> AppraisalResult<Appraisal> {
        appraise(&self.base_assumptions, &self.config)
    }

    /// Appraise several assumption sets under the runner's config
    pub fn run_batch(&self, assumptions: &[LeaseAssumptions]) -> Vec<AppraisalResult<Appraisal>> {
        assumptions
            .par_iter()
            .map(|a| appraise(a, &self.config))
            .collect()
    }

    /// Appraise the base assumptions at each discount rate
    pub fn run_discount_rates(&self, rates: &[f64]) -> Vec<AppraisalResult<Appraisal>> {
        rates
            .par_iter()
            .map(|&rate| {
                let config = AppraisalConfig {
                    discount_rate: rate,
                    ..self.config.clone()
                };
                appraise(&self.base_assumptions, &config)
            })
            .collect()
    }

    /// NPV and IRR over exit yield x discount rate.
    ///
    /// Each exit yield reprices the exit row at the relet rent capitalised at
    /// that yield. Points come back exit-yield-major in input order.
    pub fn exit_yield_grid(&self, exit_yields: &[f64], rates: &[f64]) -> AppraisalResult<Vec<SensitivityPoint>> {
        let cells: Vec<(f64, f64)> = exit_yields
            .iter()
            .flat_map(|&y| rates.iter().map(move |&r| (y, r)))
            .collect();

        cells
            .par_iter()
            .map(|&(exit_yield, discount_rate)| {
                let mut assumptions = self.base_assumptions.clone();
                assumptions.exit_cap = exit_yield;
                let exit_price = derive_exit_price(&assumptions, self.config.purchase_costs)?;
                let assumptions = assumptions.with_prices(self.base_assumptions.entry_price, exit_price);

                let config = AppraisalConfig {
                    discount_rate,
                    ..self.config.clone()
                };
                let appraisal = appraise(&assumptions, &config)?;

                Ok(SensitivityPoint {
                    exit_yield,
                    discount_rate,
                    exit_price,
                    npv: appraisal.npv,
                    irr: appraisal.irr,
                })
            })
            .collect()
    }

    pub fn assumptions(&self) -> &LeaseAssumptions {
        &self.base_assumptions
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new(LeaseAssumptions::default_pricing(), AppraisalConfig::default())
    }
}
