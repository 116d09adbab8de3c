//! Phase boundaries derived from the lease assumptions

use chrono::NaiveDate;

use crate::dates::add_months;
use crate::lease::LeaseAssumptions;

/// Dates at which the unit moves between lease phases
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSchedule {
    /// End of the current lease; refurbishment starts here
    pub lease_termination: NaiveDate,

    /// End of refurbishment; void starts here
    pub refurb_end: NaiveDate,

    /// End of void; rent-free starts here
    pub void_end: NaiveDate,

    /// End of rent-free
    pub rf_end: NaiveDate,

    /// Date relet rent is treated as payable
    pub relet_date: NaiveDate,

    /// Refurbishment cost per month (negative)
    pub monthly_refurb_cost: f64,
}

impl PhaseSchedule {
    /// Derive the schedule. Caller guarantees `refurb_duration != 0`.
    pub fn from_assumptions(assumptions: &LeaseAssumptions) -> Self {
        let lease_termination = assumptions.lease_termination;
        let refurb_end = add_months(lease_termination, assumptions.refurb_months());
        let void_end = add_months(refurb_end, assumptions.void_months());
        let rf_end = add_months(void_end, assumptions.rf_months());
        let relet_date = add_months(
            lease_termination,
            assumptions.refurb_months().saturating_add(assumptions.void_months()),
        );

        Self {
            lease_termination,
            refurb_end,
            void_end,
            rf_end,
            relet_date,
            monthly_refurb_cost: -(assumptions.refurb_cost * assumptions.unit_area) / assumptions.refurb_duration,
        }
    }

    pub fn in_refurbishment(&self, date: NaiveDate) -> bool {
        self.lease_termination <= date && date < self.refurb_end
    }

    pub fn in_void(&self, date: NaiveDate) -> bool {
        self.refurb_end <= date && date < self.void_end
    }

    pub fn in_rent_free(&self, date: NaiveDate) -> bool {
        self.void_end <= date && date < self.rf_end
    }

    /// 1-based month of the void, counting 30-day blocks from `refurb_end`
    pub fn void_month(&self, date: NaiveDate) -> i64 {
        (date - self.refurb_end).num_days().div_euclid(30) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_schedule_for_default_assumptions() {
        let schedule = PhaseSchedule::from_assumptions(&LeaseAssumptions::default_pricing());

        assert_eq!(schedule.refurb_end, d(2026, 3, 31));
        assert_eq!(schedule.void_end, d(2027, 3, 31));
        assert_eq!(schedule.rf_end, d(2027, 6, 30));
        assert_eq!(schedule.relet_date, d(2027, 3, 31));
        assert!((schedule.monthly_refurb_cost + 200_000.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_phase_windows_are_half_open() {
        let schedule = PhaseSchedule::from_assumptions(&LeaseAssumptions::default_pricing());

        assert!(!schedule.in_refurbishment(d(2025, 12, 1)));
        assert!(schedule.in_refurbishment(d(2026, 1, 1)));
        assert!(schedule.in_refurbishment(d(2026, 3, 1)));
        assert!(!schedule.in_refurbishment(d(2026, 4, 1)));
        assert!(schedule.in_void(d(2026, 4, 1)));
        assert!(schedule.in_rent_free(d(2027, 4, 1)));
        assert!(!schedule.in_rent_free(d(2027, 7, 1)));
    }

    #[test]
    fn test_void_month_counts_thirty_day_blocks() {
        let schedule = PhaseSchedule::from_assumptions(&LeaseAssumptions::default_pricing());
        assert_eq!(schedule.void_month(d(2026, 4, 1)), 1);
        assert_eq!(schedule.void_month(d(2026, 5, 1)), 2);
        assert_eq!(schedule.void_month(d(2026, 7, 1)), 4);
    }

    #[test]
    fn test_huge_durations_saturate() {
        let mut a = LeaseAssumptions::default_pricing();
        a.refurb_duration = 3e9;
        a.void_period = 3e9;
        let schedule = PhaseSchedule::from_assumptions(&a);

        assert_eq!(schedule.refurb_end, NaiveDate::MAX);
        assert_eq!(schedule.void_end, NaiveDate::MAX);
        assert_eq!(schedule.relet_date, NaiveDate::MAX);
        assert!(schedule.in_refurbishment(d(2030, 1, 1)));
    }
}
