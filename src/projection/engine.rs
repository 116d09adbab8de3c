//! Core projection engine for monthly lease cashflows

use chrono::NaiveDate;
use log::debug;

use super::cashflows::{Category, Timeline, TimelinePeriod};
use super::state::PhaseSchedule;
use crate::dates::{add_months, end_of_month};
use crate::error::{AppraisalError, AppraisalResult};
use crate::lease::LeaseAssumptions;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Add entry/exit marker rows around the monthly rows
    pub boundary_rows: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { boundary_rows: true }
    }
}

/// Main projection engine
pub struct ProjectionEngine {
    assumptions: LeaseAssumptions,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions and config
    pub fn new(assumptions: LeaseAssumptions, config: ProjectionConfig) -> Self {
        Self { assumptions, config }
    }

    /// Run the projection.
    ///
    /// Fails only when `refurb_duration` is zero, since the monthly
    /// refurbishment cost is divided by it. Other inputs are trusted.
    pub fn project(&self) -> AppraisalResult<Timeline> {
        let a = &self.assumptions;

        if a.refurb_duration == 0.0 {
            return Err(AppraisalError::DivisionByZero {
                context: "monthly refurbishment cost (refurb_duration = 0)".into(),
            });
        }

        let schedule = PhaseSchedule::from_assumptions(a);
        debug!(
            "Phase schedule: termination={} refurb_end={} void_end={} rf_end={} relet={}",
            schedule.lease_termination, schedule.refurb_end, schedule.void_end, schedule.rf_end, schedule.relet_date
        );

        let mut periods: Vec<TimelinePeriod> = (0..a.cashflow_term)
            .map(|index| self.calculate_month(&schedule, index))
            .collect();

        if self.config.boundary_rows {
            for period in periods.iter_mut() {
                period.month += 1;
            }

            let entry = self.entry_row();
            let exit = self.exit_row(periods.last());
            periods.insert(0, entry);
            periods.push(exit);
        }

        debug!("Projected {} timeline rows", periods.len());
        Ok(Timeline::new(periods))
    }

    /// Classify and value a single month
    fn calculate_month(&self, schedule: &PhaseSchedule, index: u32) -> TimelinePeriod {
        let a = &self.assumptions;
        let period_start = add_months(a.cashflow_start, index as i32);
        let mut row = TimelinePeriod::new(index, period_start, end_of_month(period_start));

        let mut category = None;
        let mut amount = 0.0;
        let mut refurb_overlay = 0.0;

        // Passing rent until the lease ends, uplifted at review if the
        // reviewed rent beats it
        if period_start < a.lease_termination {
            category = Some(Category::ContractedRent);
            amount = a.current_rent / 12.0;

            if a.review_date < a.lease_termination
                && period_start >= a.review_date
                && a.reviewed_rent() > a.current_rent
            {
                category = Some(Category::ReviewedRent);
                amount = a.reviewed_rent() / 12.0;
            }
        }

        // Refurbishment cost is added on top of whatever amount is already set
        if schedule.in_refurbishment(period_start) {
            category = Some(Category::RefurbishmentPeriod);
            refurb_overlay = schedule.monthly_refurb_cost;
        }

        if schedule.in_void(period_start) {
            category = Some(Category::VoidPeriod);
            amount = self.void_cost(schedule, period_start);
        }

        let monthly_new_rent = a.relet_annual_rent() / 12.0;
        if schedule.in_rent_free(period_start) {
            category = Some(Category::RfPeriod);
            amount = -monthly_new_rent;
        } else if period_start >= schedule.relet_date {
            category = Some(Category::ReletRent);
            amount = monthly_new_rent;
        }

        if let Some(category) = category {
            row.category = Some(category);
            row.set_amount(category, amount + refurb_overlay);
            row.refurb_overlay = refurb_overlay;
        }

        // A rent-free month shows the forgone relet rent alongside the
        // deduction, so the two net to zero
        if row.rf_period < 0.0 {
            row.relet_rent = -row.rf_period;
        }

        row.cashflow = row.category_total();
        row.cashflow_line = row.cashflow;
        row
    }

    /// Vacant service charge, plus empty rates once relief has run out
    fn void_cost(&self, schedule: &PhaseSchedule, period_start: NaiveDate) -> f64 {
        let a = &self.assumptions;
        let service_charge = -(a.unit_area * a.vacant_sc / 12.0);

        if schedule.void_month(period_start) as f64 > a.rates_relief {
            service_charge - a.vacant_rates_percent * a.market_rent() / 12.0
        } else {
            service_charge
        }
    }

    fn entry_row(&self) -> TimelinePeriod {
        let a = &self.assumptions;
        let date = a.cashflow_start.pred_opt().unwrap_or(a.cashflow_start);

        let mut row = TimelinePeriod::new(0, date, date);
        row.category = Some(Category::Entry);
        row.cashflow = -a.entry_price;
        row.cashflow_line = row.cashflow + a.entry_price;
        row
    }

    fn exit_row(&self, last: Option<&TimelinePeriod>) -> TimelinePeriod {
        let a = &self.assumptions;
        let (month, date) = match last {
            Some(p) => (p.month + 1, p.period_end.succ_opt().unwrap_or(p.period_end)),
            None => (1, a.cashflow_start),
        };

        let exit_price = a.exit_price.unwrap_or(0.0);

        let mut row = TimelinePeriod::new(month, date, date);
        row.category = Some(Category::Exit);
        row.cashflow = exit_price;
        row.cashflow_line = row.cashflow - exit_price;
        row
    }
}

/// Project with the default configuration (entry/exit rows included)
pub fn project(assumptions: &LeaseAssumptions) -> AppraisalResult<Timeline> {
    ProjectionEngine::new(assumptions.clone(), ProjectionConfig::default()).project()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn scenario() -> LeaseAssumptions {
        LeaseAssumptions::default_pricing().with_prices(1_000_000.0, 2_000_000.0)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row_for(timeline: &Timeline, start: NaiveDate) -> &TimelinePeriod {
        timeline
            .periods
            .iter()
            .find(|p| p.period_start == start && !p.is_boundary())
            .expect("row for month")
    }

    #[test]
    fn test_projection_runs() {
        let timeline = project(&scenario()).unwrap();
        assert_eq!(timeline.len(), 62);

        let months: Vec<u32> = timeline.periods.iter().map(|p| p.month).collect();
        assert_eq!(months, (0..62).collect::<Vec<u32>>());
    }

    #[test]
    fn test_reference_scenario() {
        let timeline = project(&scenario()).unwrap();

        let entry = timeline.entry().unwrap();
        assert_eq!(entry.cashflow, -1_000_000.0);
        assert_eq!(entry.period_start, d(2024, 12, 31));

        let jan_2026 = row_for(&timeline, d(2026, 1, 1));
        assert_eq!(jan_2026.month, 13);
        assert_eq!(jan_2026.category, Some(Category::RefurbishmentPeriod));
        assert_abs_diff_eq!(jan_2026.refurbishment_period, -66_666.666_666, epsilon = 1e-3);
        assert_abs_diff_eq!(jan_2026.cashflow, -66_666.666_666, epsilon = 1e-3);
        assert_abs_diff_eq!(jan_2026.refurb_overlay, jan_2026.refurbishment_period);

        let exit = timeline.exit().unwrap();
        assert_eq!(exit.cashflow, 2_000_000.0);
        assert_eq!(exit.month, 61);
        assert_eq!(exit.period_start, d(2030, 1, 1));
    }

    #[test]
    fn test_contracted_then_reviewed_rent() {
        let timeline = project(&scenario()).unwrap();

        let jun = row_for(&timeline, d(2025, 6, 1));
        assert_eq!(jun.category, Some(Category::ContractedRent));
        assert_abs_diff_eq!(jun.contracted_rent, 50_000.0 / 12.0, epsilon = 1e-9);

        let jul = row_for(&timeline, d(2025, 7, 1));
        assert_eq!(jul.category, Some(Category::ReviewedRent));
        assert_abs_diff_eq!(jul.reviewed_rent, 100_000.0 / 12.0, epsilon = 1e-9);

        let dec = row_for(&timeline, d(2025, 12, 1));
        assert_eq!(dec.category, Some(Category::ReviewedRent));
    }

    #[test]
    fn test_no_review_uplift_when_erv_below_passing_rent() {
        let mut a = scenario();
        a.current_rent = 150_000.0;
        let timeline = project(&a).unwrap();

        assert!(timeline.first_of(Category::ReviewedRent).is_none());
        let dec = row_for(&timeline, d(2025, 12, 1));
        assert_eq!(dec.category, Some(Category::ContractedRent));
    }

    #[test]
    fn test_void_rates_after_relief() {
        let timeline = project(&scenario()).unwrap();
        let sc_only = -(10_000.0 * 2.0 / 12.0);
        let with_rates = sc_only - 0.5 * 200_000.0 / 12.0;

        // Void starts April 2026; first three months within relief
        for m in 4..=6 {
            let row = row_for(&timeline, d(2026, m, 1));
            assert_eq!(row.category, Some(Category::VoidPeriod));
            assert_abs_diff_eq!(row.void_period, sc_only, epsilon = 1e-9);
        }

        let jul = row_for(&timeline, d(2026, 7, 1));
        assert_abs_diff_eq!(jul.void_period, with_rates, epsilon = 1e-9);

        let mar_2027 = row_for(&timeline, d(2027, 3, 1));
        assert_eq!(mar_2027.category, Some(Category::VoidPeriod));
    }

    #[test]
    fn test_rent_free_couples_relet_rent() {
        let timeline = project(&scenario()).unwrap();
        let monthly = 200_000.0 / 12.0;

        for m in 4..=6 {
            let row = row_for(&timeline, d(2027, m, 1));
            assert_eq!(row.category, Some(Category::RfPeriod));
            assert_abs_diff_eq!(row.rf_period, -monthly, epsilon = 1e-9);
            assert_abs_diff_eq!(row.relet_rent, monthly, epsilon = 1e-9);
            assert_eq!(row.populated_columns(), 2);
            assert_abs_diff_eq!(row.cashflow, 0.0, epsilon = 1e-9);
        }

        let jul = row_for(&timeline, d(2027, 7, 1));
        assert_eq!(jul.category, Some(Category::ReletRent));
        assert_abs_diff_eq!(jul.relet_rent, monthly, epsilon = 1e-9);
    }

    #[test]
    fn test_relet_rent_override() {
        let mut a = scenario();
        a.relet_rent = Some(180_000.0);
        let timeline = project(&a).unwrap();

        let row = row_for(&timeline, d(2028, 1, 1));
        assert_abs_diff_eq!(row.relet_rent, 15_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_row_count_and_column_coverage() {
        for term in [1, 12, 60, 120] {
            let mut a = scenario();
            a.cashflow_term = term;
            let timeline = project(&a).unwrap();
            assert_eq!(timeline.len(), term as usize + 2);

            for row in timeline.interior() {
                match row.category {
                    Some(Category::RfPeriod) => {
                        assert_eq!(row.populated_columns(), 2);
                        assert_eq!(row.relet_rent, -row.rf_period);
                    }
                    Some(_) => assert_eq!(row.populated_columns(), 1, "month {}", row.month),
                    None => panic!("uncategorised month {}", row.month),
                }
                assert_abs_diff_eq!(row.cashflow, row.category_total());
            }
        }
    }

    #[test]
    fn test_phase_ordering() {
        let timeline = project(&scenario()).unwrap();
        let first = |c| timeline.first_of(c).map(|p| p.month).unwrap();
        let last = |c| timeline.last_of(c).map(|p| p.month).unwrap();

        assert!(first(Category::RefurbishmentPeriod) >= last(Category::ReviewedRent));
        assert!(first(Category::VoidPeriod) >= last(Category::RefurbishmentPeriod));
        assert!(first(Category::RfPeriod) >= last(Category::VoidPeriod));
        assert!(first(Category::ReletRent) >= last(Category::RfPeriod));
    }

    #[test]
    fn test_cashflow_line_returns_to_baseline() {
        let timeline = project(&scenario()).unwrap();
        assert_eq!(timeline.entry().unwrap().cashflow_line, 0.0);
        assert_eq!(timeline.exit().unwrap().cashflow_line, 0.0);

        for row in timeline.interior() {
            assert_eq!(row.cashflow_line, row.cashflow);
        }
    }

    #[test]
    fn test_period_end_is_month_end() {
        let timeline = project(&scenario()).unwrap();
        let feb = row_for(&timeline, d(2025, 2, 1));
        assert_eq!(feb.period_end, d(2025, 2, 28));
    }

    #[test]
    fn test_zero_refurb_duration_is_rejected() {
        let mut a = scenario();
        a.refurb_duration = 0.0;
        let err = project(&a).unwrap_err();
        assert!(matches!(err, AppraisalError::DivisionByZero { .. }));
    }

    #[test]
    fn test_huge_durations_do_not_overflow() {
        let mut a = scenario();
        a.refurb_duration = 3e9;
        a.void_period = 3e9;
        let timeline = project(&a).unwrap();

        assert_eq!(timeline.len(), 62);
        let last = timeline.interior().last().unwrap();
        assert_eq!(last.category, Some(Category::RefurbishmentPeriod));
        assert!(timeline.first_of(Category::ReletRent).is_none());
    }

    #[test]
    fn test_refurb_cost_overlays_later_phase() {
        // A negative void pulls rent-free back inside the refurbishment window
        let mut a = scenario();
        a.void_period = -1.0;
        let timeline = project(&a).unwrap();

        let monthly_rent = 200_000.0 / 12.0;
        let monthly_refurb = 200_000.0 / 3.0;

        let mar = row_for(&timeline, d(2026, 3, 1));
        assert_eq!(mar.category, Some(Category::RfPeriod));
        assert_abs_diff_eq!(mar.refurb_overlay, -monthly_refurb, epsilon = 1e-6);
        assert_abs_diff_eq!(mar.rf_period, -(monthly_rent + monthly_refurb), epsilon = 1e-6);
        assert_abs_diff_eq!(mar.rf_period, -83_333.333_333, epsilon = 1e-3);
        assert_abs_diff_eq!(mar.relet_rent, 83_333.333_333, epsilon = 1e-3);
        assert_eq!(mar.refurbishment_period, 0.0);
        assert_abs_diff_eq!(mar.cashflow, 0.0, epsilon = 1e-9);

        // Outside the overlap the overlay is zero
        let may = row_for(&timeline, d(2026, 5, 1));
        assert_eq!(may.category, Some(Category::RfPeriod));
        assert_eq!(may.refurb_overlay, 0.0);
        assert_abs_diff_eq!(may.rf_period, -monthly_rent, epsilon = 1e-9);
    }

    #[test]
    fn test_without_boundary_rows() {
        let engine = ProjectionEngine::new(scenario(), ProjectionConfig { boundary_rows: false });
        let timeline = engine.project().unwrap();

        assert_eq!(timeline.len(), 60);
        assert_eq!(timeline.periods[0].month, 0);
        assert_eq!(timeline.periods[0].period_start, d(2025, 1, 1));
        assert!(timeline.entry().is_none());
        assert!(timeline.exit().is_none());
    }

    #[test]
    fn test_projection_is_repeatable() {
        let a = scenario();
        assert_eq!(project(&a).unwrap(), project(&a).unwrap());
    }
}
