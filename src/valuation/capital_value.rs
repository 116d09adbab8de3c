//! Capital value formulas

use crate::config::DEFAULT_PURCHASE_COSTS;
use crate::error::{AppraisalError, AppraisalResult};

/// Valuations are reported to the nearest 10,000
const ROUNDING: f64 = 10_000.0;

/// Value of `rent` capitalised at `initial_yield`, net of default
/// purchaser's costs
pub fn initial_yield_valuation(rent: f64, initial_yield: f64) -> AppraisalResult<f64> {
    initial_yield_valuation_with_costs(rent, initial_yield, DEFAULT_PURCHASE_COSTS)
}

/// `rent / yield / (1 + costs)`, rounded to the nearest 10,000
pub fn initial_yield_valuation_with_costs(rent: f64, initial_yield: f64, costs: f64) -> AppraisalResult<f64> {
    if initial_yield <= 0.0 {
        return Err(AppraisalError::InvalidInput {
            field: "initial_yield".into(),
            reason: "Yield must be positive".into(),
        });
    }
    if costs <= -1.0 {
        return Err(AppraisalError::InvalidInput {
            field: "costs".into(),
            reason: "Purchaser's costs must be greater than -100%".into(),
        });
    }

    let value = rent / initial_yield / (1.0 + costs);
    Ok((value / ROUNDING).round() * ROUNDING)
}

/// Term-and-reversion capital value.
///
/// Passing rent to review, then the better of passing rent and net
/// effective rent to termination, then ERV in perpetuity. `erv` is the
/// annual ERV for the whole unit.
pub fn valuation(
    current_rent: f64,
    rent_yp: f64,
    erv: f64,
    ner_discount: f64,
    rr_yp: f64,
    reversion_yp: f64,
) -> f64 {
    let review_rent = current_rent.max(erv * ner_discount);
    current_rent * rent_yp + review_rent * rr_yp + erv * reversion_yp
}
