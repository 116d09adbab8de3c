//! Years-purchase multipliers for term, review and reversion income
//!
//! Periods are measured in years of 365.25 days from the cashflow start,
//! floored at zero when the reference date has already passed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{add_months, year_fraction};
use crate::error::{AppraisalError, AppraisalResult};

/// Day-count basis for years-purchase periods
pub const YEAR_BASIS: f64 = 365.25;

/// The three multipliers used by a term-and-reversion valuation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearsPurchase {
    pub rent: f64,
    pub rent_review: f64,
    pub reversion: f64,
}

/// Years from the cashflow start to the rent review
pub fn years_to_review(cashflow_start: NaiveDate, review_date: NaiveDate) -> f64 {
    year_fraction(cashflow_start, review_date, YEAR_BASIS)
}

/// Years from the cashflow start to the reversion
pub fn years_to_reversion(cashflow_start: NaiveDate, reversion_date: NaiveDate) -> f64 {
    year_fraction(cashflow_start, reversion_date, YEAR_BASIS)
}

/// Date market rent is received again: termination plus the months the
/// unit earns nothing (refurbishment, void, rent-free)
pub fn reversion_date(lease_termination: NaiveDate, dead_months: i32) -> NaiveDate {
    add_months(lease_termination, dead_months)
}

/// Present value of 1 per annum for `years` years
pub fn annuity_factor(rate: f64, years: f64) -> f64 {
    if rate.abs() < 1e-12 {
        return years;
    }
    (1.0 - (1.0 + rate).powf(-years)) / rate
}

/// Present value of 1 received in `years` years
pub fn deferral_factor(rate: f64, years: f64) -> f64 {
    (1.0 + rate).powf(-years)
}

/// YP of passing rent up to the review, or termination if sooner
pub fn rent_years_purchase(
    rate: f64,
    cashflow_start: NaiveDate,
    review_date: NaiveDate,
    lease_termination: NaiveDate,
) -> f64 {
    let to_review = years_to_review(cashflow_start, review_date);
    let remaining = year_fraction(cashflow_start, lease_termination, YEAR_BASIS);
    annuity_factor(rate, to_review.min(remaining))
}

/// YP of the reviewed rent from review to termination, deferred to today.
/// Zero when the review coincides with (or falls after) termination.
pub fn rent_review_years_purchase(
    rate: f64,
    cashflow_start: NaiveDate,
    review_date: NaiveDate,
    lease_termination: NaiveDate,
) -> f64 {
    if review_date == lease_termination {
        return 0.0;
    }

    let to_review = years_to_review(cashflow_start, review_date);
    let remaining = year_fraction(cashflow_start, lease_termination, YEAR_BASIS);
    let beyond_review = (remaining - to_review).max(0.0);

    (annuity_factor(rate, beyond_review) * deferral_factor(rate, to_review)).max(0.0)
}

/// YP in perpetuity of market rent from the reversion.
///
/// Already let (`lease_start` on or before the cashflow start): a perpetuity
/// deferred to `reversion`. Not yet let: a perpetuity deferred first by the
/// void until `lease_start`, then by `letup_months` of rent-free.
/// The rate must be positive.
pub fn reversion_years_purchase(
    rate: f64,
    cashflow_start: NaiveDate,
    lease_start: Option<NaiveDate>,
    reversion: NaiveDate,
    letup_months: i32,
) -> AppraisalResult<f64> {
    if rate <= 0.0 {
        return Err(AppraisalError::InvalidInput {
            field: "discount_rate".into(),
            reason: "Reversion in perpetuity needs a positive rate".into(),
        });
    }

    let perpetuity = 1.0 / rate;

    match lease_start {
        Some(start) if start > cashflow_start => {
            let void_years = year_fraction(cashflow_start, start, YEAR_BASIS);
            let letup_years = year_fraction(start, add_months(start, letup_months), YEAR_BASIS);
            Ok(perpetuity * deferral_factor(rate, void_years) * deferral_factor(rate, letup_years))
        }
        _ => Ok(perpetuity * deferral_factor(rate, years_to_reversion(cashflow_start, reversion))),
    }
}
