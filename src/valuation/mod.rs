//! Years-purchase and capital value formulas
//!
//! Independent of the projection timeline: these work from lease dates and
//! a discount rate only.

mod years_purchase;
mod capital_value;

pub use years_purchase::{
    YearsPurchase, YEAR_BASIS, annuity_factor, deferral_factor, reversion_date,
    rent_years_purchase, rent_review_years_purchase, reversion_years_purchase,
    years_to_review, years_to_reversion,
};
pub use capital_value::{initial_yield_valuation, initial_yield_valuation_with_costs, valuation};
