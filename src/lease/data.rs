//! Lease and relet assumptions for a single unit

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::loader::BusinessPlanRecord;

/// Inputs for one projection run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseAssumptions {
    /// First day of the holding period
    pub cashflow_start: NaiveDate,

    /// Holding period in months
    pub cashflow_term: u32,

    /// Unit area in sq ft
    pub unit_area: f64,

    /// Start of the current lease (None if unknown)
    #[serde(default)]
    pub lease_start: Option<NaiveDate>,

    /// Passing rent, annual
    pub current_rent: f64,

    pub review_date: NaiveDate,

    pub lease_termination: NaiveDate,

    /// Headline ERV per sq ft per annum
    pub headline_erv: f64,

    /// Fraction of headline rent collectible after incentives (0-1)
    pub ner_discount: f64,

    /// Refurbishment cost per sq ft
    pub refurb_cost: f64,

    /// Refurbishment duration in months. Must be non-zero.
    pub refurb_duration: f64,

    /// Void after refurbishment, months
    pub void_period: f64,

    /// Rent-free period granted on relet, months
    pub rf: f64,

    /// Relet term in years (informational)
    #[serde(default)]
    pub relet_term: f64,

    /// Exit / entry capitalisation rate
    pub exit_cap: f64,

    /// Empty rates as a fraction of ERV
    pub vacant_rates_percent: f64,

    /// Months of empty rates relief at the start of the void
    pub rates_relief: f64,

    /// Vacant service charge per sq ft per annum
    pub vacant_sc: f64,

    /// Annual relet rent; falls back to headline ERV x area
    #[serde(default)]
    pub relet_rent: Option<f64>,

    #[serde(default)]
    pub entry_price: f64,

    /// Sale price at exit. None leaves the choice to the caller (see
    /// `AppraisalSession::update`); the projection treats it as 0.
    #[serde(default)]
    pub exit_price: Option<f64>,
}

impl LeaseAssumptions {
    /// Built-in assumptions used when no business plan record is available
    pub fn default_pricing() -> Self {
        Self {
            cashflow_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            cashflow_term: 60,
            unit_area: 10_000.0,
            lease_start: NaiveDate::from_ymd_opt(2020, 1, 1),
            current_rent: 50_000.0,
            review_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap_or_default(),
            lease_termination: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),
            headline_erv: 20.0,
            ner_discount: 0.50,
            refurb_cost: 20.0,
            refurb_duration: 3.0,
            void_period: 12.0,
            rf: 3.0,
            relet_term: 6.0,
            exit_cap: 0.06,
            vacant_rates_percent: 0.5,
            rates_relief: 3.0,
            vacant_sc: 2.0,
            relet_rent: None,
            entry_price: 0.0,
            exit_price: None,
        }
    }

    /// Map a business plan record onto a holding period.
    ///
    /// A break date earlier than the lease end is treated as the termination.
    /// Empty rates are expressed against ERV, so `rates_psf / ERV_psf`.
    pub fn from_business_plan(record: &BusinessPlanRecord, cashflow_start: NaiveDate, cashflow_term: u32) -> Self {
        let lease_termination = match record.break_date {
            Some(brk) if brk < record.lease_end => brk,
            _ => record.lease_end,
        };

        let vacant_rates_percent = if record.erv_psf > 0.0 {
            record.rates_psf / record.erv_psf
        } else {
            0.0
        };

        Self {
            cashflow_start,
            cashflow_term,
            unit_area: record.floor_area,
            lease_start: Some(record.lease_start),
            current_rent: record.rent_pa,
            review_date: record.review_date,
            lease_termination,
            headline_erv: record.erv_psf,
            ner_discount: record.ner_discount,
            refurb_cost: record.refurb_psf,
            refurb_duration: record.refurb_duration,
            void_period: record.end_void,
            rf: record.relet_rent_free,
            relet_term: record.term_yrs,
            exit_cap: record.exit_yield,
            vacant_rates_percent,
            rates_relief: record.rates_relief,
            vacant_sc: record.sc_psf,
            relet_rent: None,
            entry_price: 0.0,
            exit_price: None,
        }
    }

    /// Headline ERV for the whole unit, annual
    pub fn market_rent(&self) -> f64 {
        self.headline_erv * self.unit_area
    }

    /// Net effective rent achievable at review, annual
    pub fn reviewed_rent(&self) -> f64 {
        self.market_rent() * self.ner_discount
    }

    /// Annual rent after relet (override or market rent)
    pub fn relet_annual_rent(&self) -> f64 {
        self.relet_rent.unwrap_or_else(|| self.market_rent())
    }

    /// Whole months of refurbishment, used as a date offset
    pub fn refurb_months(&self) -> i32 {
        self.refurb_duration.trunc() as i32
    }

    pub fn void_months(&self) -> i32 {
        self.void_period.trunc() as i32
    }

    pub fn rf_months(&self) -> i32 {
        self.rf.trunc() as i32
    }

    /// Re-base onto a different holding period, keeping everything else
    pub fn with_holding_period(mut self, cashflow_start: NaiveDate, cashflow_term: u32) -> Self {
        self.cashflow_start = cashflow_start;
        self.cashflow_term = cashflow_term;
        self
    }

    /// Builder-style override of entry and exit prices
    pub fn with_prices(mut self, entry_price: f64, exit_price: f64) -> Self {
        self.entry_price = entry_price;
        self.exit_price = Some(exit_price);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> BusinessPlanRecord {
        BusinessPlanRecord {
            property: "P001".into(),
            unit: "U1".into(),
            floor_area: 5_000.0,
            refurb_psf: 30.0,
            refurb_duration: 4.0,
            rent_pa: 90_000.0,
            review_date: NaiveDate::from_ymd_opt(2026, 3, 25).unwrap(),
            lease_start: NaiveDate::from_ymd_opt(2021, 3, 25).unwrap(),
            erv_psf: 25.0,
            break_date: Some(NaiveDate::from_ymd_opt(2027, 3, 24).unwrap()),
            lease_end: NaiveDate::from_ymd_opt(2031, 3, 24).unwrap(),
            end_void: 9.0,
            initial_void: 0.0,
            ner_discount: 0.85,
            term_yrs: 10.0,
            initial_rent_free: 0.0,
            relet_rent_free: 6.0,
            rates_psf: 10.0,
            rates_relief: 3.0,
            sc_psf: 4.5,
            exit_yield: 0.065,
        }
    }

    #[test]
    fn test_from_business_plan_uses_earlier_break() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let a = LeaseAssumptions::from_business_plan(&record(), start, 120);

        assert_eq!(a.lease_termination, NaiveDate::from_ymd_opt(2027, 3, 24).unwrap());
        assert_eq!(a.cashflow_term, 120);
        assert!((a.vacant_rates_percent - 0.4).abs() < 1e-12);
        assert_eq!(a.rf, 6.0);
        assert_eq!(a.exit_cap, 0.065);
    }

    #[test]
    fn test_from_business_plan_without_break() {
        let mut rec = record();
        rec.break_date = None;
        let a = LeaseAssumptions::from_business_plan(&rec, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 60);
        assert_eq!(a.lease_termination, rec.lease_end);
    }

    #[test]
    fn test_rent_helpers() {
        let mut a = LeaseAssumptions::default_pricing();
        assert_eq!(a.market_rent(), 200_000.0);
        assert_eq!(a.reviewed_rent(), 100_000.0);
        assert_eq!(a.relet_annual_rent(), 200_000.0);

        a.relet_rent = Some(150_000.0);
        assert_eq!(a.relet_annual_rent(), 150_000.0);
    }

    #[test]
    fn test_with_holding_period() {
        let start = NaiveDate::from_ymd_opt(2027, 4, 1).unwrap();
        let a = LeaseAssumptions::default_pricing().with_holding_period(start, 24);

        assert_eq!(a.cashflow_start, start);
        assert_eq!(a.cashflow_term, 24);
        assert_eq!(a.current_rent, LeaseAssumptions::default_pricing().current_rent);
    }

    #[test]
    fn test_month_offsets_truncate() {
        let mut a = LeaseAssumptions::default_pricing();
        a.refurb_duration = 3.9;
        a.void_period = 11.5;
        a.rf = 0.4;
        assert_eq!(a.refurb_months(), 3);
        assert_eq!(a.void_months(), 11);
        assert_eq!(a.rf_months(), 0);
    }
}
