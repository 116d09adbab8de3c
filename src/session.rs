//! Per-user state carried between successive appraisals
//!
//! The projection engine is pure; anything remembered between runs (the most
//! recent timeline and the exit price the user settled on) lives here and is
//! owned by whichever front end drives the appraisals.

use log::debug;

use crate::appraisal::{appraise, derive_exit_price, Appraisal};
use crate::config::AppraisalConfig;
use crate::error::AppraisalResult;
use crate::lease::LeaseAssumptions;
use crate::projection::Timeline;

#[derive(Debug, Clone, Default)]
pub struct AppraisalSession {
    last_timeline: Option<Timeline>,
    last_exit_price: Option<f64>,
}

impl AppraisalSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-run the appraisal for new assumptions.
    ///
    /// The exit price is, in order of preference: `exit_price` when given,
    /// `assumptions.exit_price` when set (an explicit 0 included), the price
    /// used by the previous update, or the initial-yield value of the relet
    /// rent.
    pub fn update(
        &mut self,
        assumptions: &LeaseAssumptions,
        exit_price: Option<f64>,
        config: &AppraisalConfig,
    ) -> AppraisalResult<Appraisal> {
        let exit_price = match exit_price.or(assumptions.exit_price).or(self.last_exit_price) {
            Some(price) => price,
            None => {
                let derived = derive_exit_price(assumptions, config.purchase_costs)?;
                debug!("No exit price supplied, derived {:.0} from relet rent", derived);
                derived
            }
        };

        let priced = assumptions.clone().with_prices(assumptions.entry_price, exit_price);
        let appraisal = appraise(&priced, config)?;

        self.last_timeline = Some(appraisal.timeline.clone());
        self.last_exit_price = Some(exit_price);

        Ok(appraisal)
    }

    pub fn last_timeline(&self) -> Option<&Timeline> {
        self.last_timeline.as_ref()
    }

    pub fn last_exit_price(&self) -> Option<f64> {
        self.last_exit_price
    }

    /// Forget the previous run
    pub fn reset(&mut self) {
        self.last_timeline = None;
        self.last_exit_price = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assumptions() -> LeaseAssumptions {
        LeaseAssumptions {
            entry_price: 1_000_000.0,
            ..LeaseAssumptions::default_pricing()
        }
    }

    #[test]
    fn test_first_update_derives_exit_price() {
        let mut session = AppraisalSession::new();
        assert!(session.last_timeline().is_none());

        let appraisal = session.update(&assumptions(), None, &AppraisalConfig::default()).unwrap();

        assert_eq!(session.last_exit_price(), Some(3_120_000.0));
        assert_eq!(appraisal.timeline.exit().unwrap().cashflow, 3_120_000.0);
        assert_eq!(session.last_timeline(), Some(&appraisal.timeline));
    }

    #[test]
    fn test_exit_price_persists_between_updates() {
        let mut session = AppraisalSession::new();
        let config = AppraisalConfig::default();

        session.update(&assumptions(), Some(2_500_000.0), &config).unwrap();

        // A later run without an explicit price keeps the previous one
        let mut changed = assumptions();
        changed.exit_cap = 0.05;
        let appraisal = session.update(&changed, None, &config).unwrap();

        assert_eq!(session.last_exit_price(), Some(2_500_000.0));
        assert_eq!(appraisal.assumptions.exit_price, Some(2_500_000.0));
    }

    #[test]
    fn test_explicit_zero_exit_price_is_kept() {
        let mut session = AppraisalSession::new();
        let zero_exit = LeaseAssumptions {
            exit_price: Some(0.0),
            ..assumptions()
        };

        let appraisal = session.update(&zero_exit, None, &AppraisalConfig::default()).unwrap();

        assert_eq!(session.last_exit_price(), Some(0.0));
        assert_eq!(appraisal.timeline.exit().unwrap().cashflow, 0.0);
    }

    #[test]
    fn test_argument_beats_assumptions_price() {
        let mut session = AppraisalSession::new();
        let priced = assumptions().with_prices(1_000_000.0, 1_500_000.0);

        let appraisal = session.update(&priced, Some(1_800_000.0), &AppraisalConfig::default()).unwrap();
        assert_eq!(appraisal.timeline.exit().unwrap().cashflow, 1_800_000.0);
    }

    #[test]
    fn test_exit_price_missing_from_json_is_derived() {
        let mut json = serde_json::to_value(assumptions()).unwrap();
        json.as_object_mut().unwrap().remove("exit_price");
        let parsed: LeaseAssumptions = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.exit_price, None);

        let mut session = AppraisalSession::new();
        session.update(&parsed, None, &AppraisalConfig::default()).unwrap();
        assert_eq!(session.last_exit_price(), Some(3_120_000.0));
    }

    #[test]
    fn test_reset_clears_state() {
        let mut session = AppraisalSession::new();
        session.update(&assumptions(), Some(2_000_000.0), &AppraisalConfig::default()).unwrap();
        session.reset();

        assert!(session.last_timeline().is_none());
        assert!(session.last_exit_price().is_none());
    }
}
