//! Full appraisal of one lease: timeline, return metrics and valuations

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::AppraisalConfig;
use crate::error::AppraisalResult;
use crate::lease::LeaseAssumptions;
use crate::projection::{project, xirr, xnpv, Timeline, TimelineSummary};
use crate::valuation::{
    initial_yield_valuation_with_costs, rent_review_years_purchase, rent_years_purchase, reversion_date,
    reversion_years_purchase, valuation, YearsPurchase,
};

/// Everything derived from one set of assumptions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appraisal {
    pub assumptions: LeaseAssumptions,
    pub timeline: Timeline,
    pub summary: TimelineSummary,

    /// Annual discount rate used for NPV and years purchase
    pub discount_rate: f64,
    pub npv: f64,
    /// None when the cashflows admit no IRR
    pub irr: Option<f64>,

    /// Passing rent capitalised at the exit cap rate (None for a
    /// non-positive cap rate)
    pub initial_yield_value: Option<f64>,

    /// Years-purchase multipliers (None for a non-positive discount rate)
    pub years_purchase: Option<YearsPurchase>,
    /// Term-and-reversion value (None for a non-positive discount rate)
    pub dcf_value: Option<f64>,

    pub warnings: Vec<String>,
}

impl Appraisal {
    /// IRR formatted for display, with a placeholder when not computable
    pub fn irr_display(&self) -> String {
        match self.irr {
            Some(irr) => format!("{:.2}%", irr * 100.0),
            None => "n/a".to_string(),
        }
    }
}

/// Exit price implied by capitalising the relet rent at the exit cap rate
pub fn derive_exit_price(assumptions: &LeaseAssumptions, purchase_costs: f64) -> AppraisalResult<f64> {
    initial_yield_valuation_with_costs(assumptions.relet_annual_rent(), assumptions.exit_cap, purchase_costs)
}

/// Years-purchase multipliers for the lease at `rate`
pub fn years_purchase(assumptions: &LeaseAssumptions, rate: f64) -> AppraisalResult<YearsPurchase> {
    let a = assumptions;
    let dead_months = a
        .refurb_months()
        .saturating_add(a.void_months())
        .saturating_add(a.rf_months());

    Ok(YearsPurchase {
        rent: rent_years_purchase(rate, a.cashflow_start, a.review_date, a.lease_termination),
        rent_review: rent_review_years_purchase(rate, a.cashflow_start, a.review_date, a.lease_termination),
        reversion: reversion_years_purchase(
            rate,
            a.cashflow_start,
            a.lease_start,
            reversion_date(a.lease_termination, dead_months),
            a.rf_months(),
        )?,
    })
}

/// Project the lease and derive its return metrics and valuations
pub fn appraise(assumptions: &LeaseAssumptions, config: &AppraisalConfig) -> AppraisalResult<Appraisal> {
    let timeline = project(assumptions)?;
    let flows = timeline.dated_cashflows();
    let mut warnings = Vec::new();

    let npv = xnpv(config.discount_rate, &flows);
    let irr = xirr(&flows);
    if irr.is_none() {
        warn!("IRR not computable: cashflows have no sign change or no root");
        warnings.push("IRR not computable for these cashflows".to_string());
    }

    let initial_yield_value = match initial_yield_valuation_with_costs(
        assumptions.current_rent,
        assumptions.exit_cap,
        config.purchase_costs,
    ) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Initial-yield valuation skipped: {}", e);
            warnings.push(format!("Initial-yield valuation skipped: {}", e));
            None
        }
    };

    let (years_purchase, dcf_value) = if config.discount_rate > 0.0 {
        let yp = years_purchase(assumptions, config.discount_rate)?;
        let value = valuation(
            assumptions.current_rent,
            yp.rent,
            assumptions.market_rent(),
            assumptions.ner_discount,
            yp.rent_review,
            yp.reversion,
        );
        (Some(yp), Some(value))
    } else {
        warnings.push("Years-purchase valuation needs a positive discount rate".to_string());
        (None, None)
    };

    info!(
        "Appraised {} months: NPV {:.2} at {:.2}%, IRR {}",
        assumptions.cashflow_term,
        npv,
        config.discount_rate * 100.0,
        irr.map(|r| format!("{:.4}", r)).unwrap_or_else(|| "n/a".into())
    );

    Ok(Appraisal {
        assumptions: assumptions.clone(),
        summary: timeline.summary(),
        timeline,
        discount_rate: config.discount_rate,
        npv,
        irr,
        initial_yield_value,
        years_purchase,
        dcf_value,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn config(rate: f64) -> AppraisalConfig {
        AppraisalConfig {
            discount_rate: rate,
            ..AppraisalConfig::default()
        }
    }

    #[test]
    fn test_appraise_reference_scenario() {
        let a = LeaseAssumptions::default_pricing().with_prices(1_000_000.0, 2_000_000.0);
        let appraisal = appraise(&a, &config(0.08)).unwrap();

        assert_eq!(appraisal.timeline.len(), 62);
        assert!(appraisal.irr.is_some());
        assert!(appraisal.warnings.is_empty());
        // 50,000 / 0.06 / 1.068 = 780,274 -> 780,000
        assert_eq!(appraisal.initial_yield_value, Some(780_000.0));
        assert!(appraisal.dcf_value.unwrap() > 0.0);

        // IRR discounts the timeline to zero
        let flows = appraisal.timeline.dated_cashflows();
        assert_abs_diff_eq!(xnpv(appraisal.irr.unwrap(), &flows), 0.0, epsilon = 1.0);
    }

    #[test]
    fn test_npv_at_zero_rate_is_sum_of_cashflows() {
        let a = LeaseAssumptions::default_pricing().with_prices(1_000_000.0, 2_000_000.0);
        let appraisal = appraise(&a, &config(0.0)).unwrap();

        assert_abs_diff_eq!(appraisal.npv, appraisal.summary.net_cashflow, epsilon = 1e-6);
        assert!(appraisal.dcf_value.is_none());
        assert_eq!(appraisal.warnings.len(), 1);
    }

    #[test]
    fn test_no_prices_means_no_irr() {
        // Without a purchase the lease income has no outflow to balance
        let mut a = LeaseAssumptions::default_pricing();
        a.refurb_cost = 0.0;
        a.vacant_sc = 0.0;
        a.vacant_rates_percent = 0.0;
        let appraisal = appraise(&a, &config(0.08)).unwrap();

        assert!(appraisal.irr.is_none());
        assert_eq!(appraisal.irr_display(), "n/a");
        assert!(appraisal.warnings.iter().any(|w| w.contains("IRR")));
    }

    #[test]
    fn test_non_positive_exit_cap_is_a_warning() {
        let mut a = LeaseAssumptions::default_pricing().with_prices(1_000_000.0, 2_000_000.0);
        a.exit_cap = 0.0;
        let appraisal = appraise(&a, &config(0.08)).unwrap();

        assert!(appraisal.initial_yield_value.is_none());
        assert!(appraisal.irr.is_some());
        assert!(appraisal.dcf_value.is_some());
        assert_eq!(appraisal.warnings.len(), 1);
        assert!(appraisal.warnings[0].contains("Initial-yield"));
    }

    #[test]
    fn test_derive_exit_price() {
        let a = LeaseAssumptions::default_pricing();
        // 200,000 / 0.06 / 1.068 -> 3,120,000
        assert_eq!(derive_exit_price(&a, 0.068).unwrap(), 3_120_000.0);
    }

    #[test]
    fn test_years_purchase_components() {
        let a = LeaseAssumptions::default_pricing();
        let yp = years_purchase(&a, 0.08).unwrap();

        assert!(yp.rent > 0.0 && yp.rent < 1.0);
        assert!(yp.rent_review > 0.0 && yp.rent_review < 1.0);
        assert!(yp.reversion > 0.0 && yp.reversion < 1.0 / 0.08);
    }
}
