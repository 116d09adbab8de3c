//! Timeline output structures for projections

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::AppraisalResult;

/// Phase a month of the timeline belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ContractedRent,
    ReviewedRent,
    RefurbishmentPeriod,
    VoidPeriod,
    RfPeriod,
    ReletRent,
    /// Synthetic purchase row before the first month
    Entry,
    /// Synthetic sale row after the last month
    Exit,
}

impl Category {
    /// The six lease phases, in timeline order
    pub const LEASE_PHASES: [Category; 6] = [
        Category::ContractedRent,
        Category::ReviewedRent,
        Category::RefurbishmentPeriod,
        Category::VoidPeriod,
        Category::RfPeriod,
        Category::ReletRent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ContractedRent => "contracted_rent",
            Category::ReviewedRent => "reviewed_rent",
            Category::RefurbishmentPeriod => "refurbishment_period",
            Category::VoidPeriod => "void_period",
            Category::RfPeriod => "rf_period",
            Category::ReletRent => "relet_rent",
            Category::Entry => "entry",
            Category::Exit => "exit",
        }
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, Category::Entry | Category::Exit)
    }
}

/// A single row of the timeline: one month, or an entry/exit marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePeriod {
    /// Month offset; 0 is the entry row when boundary rows are present
    pub month: u32,
    pub category: Option<Category>,

    // Category amounts (only the row's category is populated, except for
    // rent-free months which also carry the relet rent they forgo)
    pub contracted_rent: f64,
    pub reviewed_rent: f64,
    pub refurbishment_period: f64,
    pub void_period: f64,
    pub rf_period: f64,
    pub relet_rent: f64,

    /// Refurbishment cost included in the row's category amount
    pub refurb_overlay: f64,

    /// Net cashflow for the row
    pub cashflow: f64,
    /// Cashflow with entry/exit prices removed, for drawing a continuous line
    pub cashflow_line: f64,

    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

impl TimelinePeriod {
    /// Create an empty row
    pub fn new(month: u32, period_start: NaiveDate, period_end: NaiveDate) -> Self {
        Self {
            month,
            category: None,
            contracted_rent: 0.0,
            reviewed_rent: 0.0,
            refurbishment_period: 0.0,
            void_period: 0.0,
            rf_period: 0.0,
            relet_rent: 0.0,
            refurb_overlay: 0.0,
            cashflow: 0.0,
            cashflow_line: 0.0,
            period_start,
            period_end,
        }
    }

    /// Amount held in a lease-phase column (0 for entry/exit)
    pub fn amount(&self, category: Category) -> f64 {
        match category {
            Category::ContractedRent => self.contracted_rent,
            Category::ReviewedRent => self.reviewed_rent,
            Category::RefurbishmentPeriod => self.refurbishment_period,
            Category::VoidPeriod => self.void_period,
            Category::RfPeriod => self.rf_period,
            Category::ReletRent => self.relet_rent,
            Category::Entry | Category::Exit => 0.0,
        }
    }

    /// Write a lease-phase column. Entry/exit have no column.
    pub fn set_amount(&mut self, category: Category, amount: f64) {
        match category {
            Category::ContractedRent => self.contracted_rent = amount,
            Category::ReviewedRent => self.reviewed_rent = amount,
            Category::RefurbishmentPeriod => self.refurbishment_period = amount,
            Category::VoidPeriod => self.void_period = amount,
            Category::RfPeriod => self.rf_period = amount,
            Category::ReletRent => self.relet_rent = amount,
            Category::Entry | Category::Exit => {}
        }
    }

    /// Sum of the six lease-phase columns
    pub fn category_total(&self) -> f64 {
        Category::LEASE_PHASES.iter().map(|&c| self.amount(c)).sum()
    }

    /// Number of non-zero lease-phase columns
    pub fn populated_columns(&self) -> usize {
        Category::LEASE_PHASES
            .iter()
            .filter(|&&c| self.amount(c) != 0.0)
            .count()
    }

    pub fn is_boundary(&self) -> bool {
        self.category.is_some_and(|c| c.is_boundary())
    }
}

/// Contiguous run of months sharing a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSegment {
    pub category: Category,
    pub first_month: u32,
    pub last_month: u32,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Rows in month order
    pub periods: Vec<TimelinePeriod>,
}

impl Timeline {
    pub fn new(periods: Vec<TimelinePeriod>) -> Self {
        Self { periods }
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Monthly rows, excluding entry/exit markers
    pub fn interior(&self) -> impl Iterator<Item = &TimelinePeriod> {
        self.periods.iter().filter(|p| !p.is_boundary())
    }

    pub fn entry(&self) -> Option<&TimelinePeriod> {
        self.periods.first().filter(|p| p.category == Some(Category::Entry))
    }

    pub fn exit(&self) -> Option<&TimelinePeriod> {
        self.periods.last().filter(|p| p.category == Some(Category::Exit))
    }

    /// First row of a given category
    pub fn first_of(&self, category: Category) -> Option<&TimelinePeriod> {
        self.periods.iter().find(|p| p.category == Some(category))
    }

    /// Last row of a given category
    pub fn last_of(&self, category: Category) -> Option<&TimelinePeriod> {
        self.periods.iter().rev().find(|p| p.category == Some(category))
    }

    /// `(period_start, cashflow)` pairs for the return-metric calculators
    pub fn dated_cashflows(&self) -> Vec<(NaiveDate, f64)> {
        self.periods.iter().map(|p| (p.period_start, p.cashflow)).collect()
    }

    /// Contiguous category runs, skipping uncategorised rows
    pub fn segments(&self) -> Vec<PhaseSegment> {
        let mut segments: Vec<PhaseSegment> = Vec::new();

        for period in &self.periods {
            let Some(category) = period.category else {
                continue;
            };

            match segments.last_mut() {
                Some(seg) if seg.category == category && seg.last_month + 1 == period.month => {
                    seg.last_month = period.month;
                }
                _ => segments.push(PhaseSegment {
                    category,
                    first_month: period.month,
                    last_month: period.month,
                }),
            }
        }

        segments
    }

    /// Get summary statistics
    pub fn summary(&self) -> TimelineSummary {
        let total = |c: Category| -> f64 { self.periods.iter().map(|p| p.amount(c)).sum() };

        TimelineSummary {
            total_rows: self.periods.len(),
            total_contracted_rent: total(Category::ContractedRent),
            total_reviewed_rent: total(Category::ReviewedRent),
            total_refurbishment: total(Category::RefurbishmentPeriod),
            total_void: total(Category::VoidPeriod),
            total_rent_free: total(Category::RfPeriod),
            total_relet_rent: total(Category::ReletRent),
            entry_cashflow: self.entry().map(|p| p.cashflow).unwrap_or(0.0),
            exit_cashflow: self.exit().map(|p| p.cashflow).unwrap_or(0.0),
            net_cashflow: self.periods.iter().map(|p| p.cashflow).sum(),
        }
    }

    /// Write one CSV record per row
    pub fn write_csv<W: Write>(&self, writer: W) -> AppraisalResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for period in &self.periods {
            csv_writer.serialize(period)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Summary statistics for a timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSummary {
    pub total_rows: usize,
    pub total_contracted_rent: f64,
    pub total_reviewed_rent: f64,
    pub total_refurbishment: f64,
    pub total_void: f64,
    pub total_rent_free: f64,
    pub total_relet_rent: f64,
    pub entry_cashflow: f64,
    pub exit_cashflow: f64,
    pub net_cashflow: f64,
}
