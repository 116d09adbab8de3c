//! Net present value and internal rate of return
//!
//! Dated (XNPV/XIRR style) measures discount on actual days / 365 from the
//! first date in the series. Periodic measures treat each entry as one month.

use chrono::NaiveDate;

/// Day-count basis for dated discounting
pub const DAYS_PER_YEAR: f64 = 365.0;

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;
const RATE_FLOOR: f64 = -0.99;
const RATE_CAP: f64 = 10.0;

/// Net present value of dated cashflows at an annual rate.
///
/// Each amount is discounted by `(1 + rate)^(days / 365)` measured from the
/// first date. An empty series is worth zero.
pub fn xnpv(rate: f64, flows: &[(NaiveDate, f64)]) -> f64 {
    let Some(&(base_date, _)) = flows.first() else {
        return 0.0;
    };

    flows
        .iter()
        .map(|&(date, amount)| amount / (1.0 + rate).powf(years_between(base_date, date)))
        .sum()
}

/// Annual internal rate of return for dated cashflows.
///
/// Returns None when the series has no sign change (no root exists) or the
/// solver cannot bracket a root.
pub fn xirr(flows: &[(NaiveDate, f64)]) -> Option<f64> {
    if !has_sign_change(flows.iter().map(|&(_, amount)| amount)) {
        return None;
    }

    let base_date = flows[0].0;
    let times: Vec<(f64, f64)> = flows
        .iter()
        .map(|&(date, amount)| (years_between(base_date, date), amount))
        .collect();

    solve_rate(&times, 0.1)
}

/// NPV of monthly cashflows at an annual rate; `cashflows[0]` is undiscounted
pub fn npv_monthly(cashflows: &[f64], annual_rate: f64) -> f64 {
    let monthly_rate = (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0;

    cashflows
        .iter()
        .enumerate()
        .map(|(i, cf)| cf / (1.0 + monthly_rate).powi(i as i32))
        .sum()
}

/// Per-month IRR of evenly spaced monthly cashflows.
///
/// Use [`annualise_monthly_rate`] for the annual equivalent.
pub fn irr_monthly(cashflows: &[f64]) -> Option<f64> {
    if !has_sign_change(cashflows.iter().copied()) {
        return None;
    }

    let times: Vec<(f64, f64)> = cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| (t as f64, cf))
        .collect();

    solve_rate(&times, 0.05 / 12.0)
}

/// Convert a monthly rate to the equivalent annual rate
pub fn annualise_monthly_rate(monthly_rate: f64) -> f64 {
    (1.0 + monthly_rate).powi(12) - 1.0
}

fn years_between(base: NaiveDate, date: NaiveDate) -> f64 {
    (date - base).num_days() as f64 / DAYS_PER_YEAR
}

/// At least one positive and one negative amount
fn has_sign_change<I: Iterator<Item = f64>>(amounts: I) -> bool {
    let mut has_positive = false;
    let mut has_negative = false;
    for amount in amounts {
        has_positive |= amount > 1e-10;
        has_negative |= amount < -1e-10;
    }
    has_positive && has_negative
}

/// Find `r` with `sum(amount / (1+r)^t) = 0` over `(t, amount)` pairs.
/// Newton-Raphson first, bisection if it stalls or fails to converge.
fn solve_rate(times: &[(f64, f64)], guess: f64) -> Option<f64> {
    let mut rate = guess;

    for _ in 0..MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(times, rate);

        if dnpv.abs() < 1e-20 || !dnpv.is_finite() {
            // Derivative too small, try bisection instead
            return solve_rate_bisection(times);
        }

        let new_rate = (rate - npv / dnpv).clamp(RATE_FLOOR, RATE_CAP);

        if (new_rate - rate).abs() < TOLERANCE {
            if npv_at(times, new_rate).abs() < 1e-6 * scale(times) {
                return Some(new_rate);
            }
            // Stuck against a bound rather than at a root
            break;
        }

        rate = new_rate;
    }

    solve_rate_bisection(times)
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(times: &[(f64, f64)], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for &(t, cf) in times {
        let discount = (1.0 + rate).powf(t);
        npv += cf / discount;
        dnpv -= t * cf / (discount * (1.0 + rate));
    }

    (npv, dnpv)
}

/// Fallback solver over the full rate domain
fn solve_rate_bisection(times: &[(f64, f64)]) -> Option<f64> {
    let mut low = RATE_FLOOR;
    let mut high = RATE_CAP;

    let mut npv_low = npv_at(times, low);
    let npv_high = npv_at(times, high);

    // Check that we have a root in this interval
    if npv_low * npv_high > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv_at(times, mid);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

fn npv_at(times: &[(f64, f64)], rate: f64) -> f64 {
    times.iter().map(|&(t, cf)| cf / (1.0 + rate).powf(t)).sum()
}

/// Largest absolute amount, used to judge a residual relative to the series
fn scale(times: &[(f64, f64)]) -> f64 {
    times.iter().map(|&(_, cf)| cf.abs()).fold(1.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_simple_xirr() {
        // 365 days apart, so exactly one year on this basis
        let flows = vec![(d(2023, 1, 1), -1000.0), (d(2024, 1, 1), 1100.0)];
        let irr = xirr(&flows).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-8);
    }

    #[test]
    fn test_xirr_irregular_flows() {
        let flows = vec![
            (d(2023, 1, 1), -1000.0),
            (d(2023, 6, 1), -500.0),
            (d(2024, 1, 1), 300.0),
            (d(2025, 3, 15), 1500.0),
        ];
        let irr = xirr(&flows).unwrap();
        assert_abs_diff_eq!(xnpv(irr, &flows), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_xirr_requires_sign_change() {
        let positive = vec![(d(2023, 1, 1), 100.0), (d(2024, 1, 1), 200.0)];
        let negative = vec![(d(2023, 1, 1), -100.0), (d(2024, 1, 1), -200.0)];
        let zeros = vec![(d(2023, 1, 1), 0.0), (d(2024, 1, 1), 0.0)];

        assert!(xirr(&positive).is_none());
        assert!(xirr(&negative).is_none());
        assert!(xirr(&zeros).is_none());
        assert!(xirr(&[]).is_none());
    }

    #[test]
    fn test_xnpv_at_zero_is_plain_sum() {
        let flows = vec![
            (d(2025, 1, 1), -1_000_000.0),
            (d(2025, 3, 1), 12_500.0),
            (d(2026, 8, 1), -4_000.0),
            (d(2029, 12, 1), 2_000_000.0),
        ];
        assert_abs_diff_eq!(xnpv(0.0, &flows), 1_008_500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_xnpv_discounts_from_first_date() {
        let flows = vec![(d(2023, 1, 1), -1000.0), (d(2024, 1, 1), 1100.0)];
        assert_abs_diff_eq!(xnpv(0.10, &flows), 0.0, epsilon = 1e-9);
        assert_eq!(xnpv(0.10, &[]), 0.0);
    }

    #[test]
    fn test_monthly_irr() {
        // Investment of 1000 returning 1100 after 12 months
        let mut cashflows = vec![-1000.0];
        cashflows.extend(vec![0.0; 11]);
        cashflows.push(1100.0);

        let monthly = irr_monthly(&cashflows).unwrap();
        assert_abs_diff_eq!(annualise_monthly_rate(monthly), 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_monthly_irr_level_payments() {
        // Loan of 10000, 12 monthly payments of 900
        let mut cashflows = vec![10000.0];
        cashflows.extend(vec![-900.0; 12]);

        let monthly = irr_monthly(&cashflows).unwrap();
        assert!(monthly > 0.0);
        assert_abs_diff_eq!(npv_monthly(&cashflows, annualise_monthly_rate(monthly)), 0.0, epsilon = 1e-4);
        assert!(irr_monthly(&[100.0, 100.0]).is_none());
    }

    #[test]
    fn test_npv_monthly() {
        let cashflows = vec![-1000.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1100.0];
        assert_abs_diff_eq!(npv_monthly(&cashflows, 0.10), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(npv_monthly(&cashflows, 0.0), 100.0, epsilon = 1e-12);
    }
}
