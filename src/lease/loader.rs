//! Load business plan defaults from a CSV extract
//!
//! The extract mirrors the business_plans table: one row per property/unit.

use chrono::NaiveDate;
use csv::Reader;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::LeaseAssumptions;
use crate::dates::parse_date;
use crate::error::{AppraisalError, AppraisalResult};

/// Default parameters for one property/unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessPlanRecord {
    pub property: String,
    pub unit: String,
    pub floor_area: f64,
    pub refurb_psf: f64,
    pub refurb_duration: f64,
    pub rent_pa: f64,
    pub review_date: NaiveDate,
    pub lease_start: NaiveDate,
    pub erv_psf: f64,
    pub break_date: Option<NaiveDate>,
    pub lease_end: NaiveDate,
    pub end_void: f64,
    pub initial_void: f64,
    pub ner_discount: f64,
    pub term_yrs: f64,
    pub initial_rent_free: f64,
    pub relet_rent_free: f64,
    pub rates_psf: f64,
    pub rates_relief: f64,
    pub sc_psf: f64,
    pub exit_yield: f64,
}

/// Raw CSV row matching the business_plans columns
#[derive(Debug, Deserialize)]
struct CsvRow {
    property: String,
    unit: String,
    floor_area: f64,
    refurb_psf: f64,
    refurb_duration: f64,
    rent_pa: f64,
    review_date: String,
    lease_start: String,
    #[serde(rename = "ERV_psf")]
    erv_psf: f64,
    #[serde(default)]
    break_date: Option<String>,
    lease_end: String,
    end_void: f64,
    initial_void: f64,
    #[serde(rename = "NER_discount")]
    ner_discount: f64,
    term_yrs: f64,
    initial_rent_free: f64,
    relet_rent_free: f64,
    rates_psf: f64,
    #[serde(rename = "Rates_Relief")]
    rates_relief: f64,
    sc_psf: f64,
    exit_yield: f64,
}

impl CsvRow {
    fn to_record(self) -> AppraisalResult<BusinessPlanRecord> {
        let break_date = match self.break_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(parse_date("break_date", value)?),
        };

        Ok(BusinessPlanRecord {
            review_date: parse_date("review_date", &self.review_date)?,
            lease_start: parse_date("lease_start", &self.lease_start)?,
            lease_end: parse_date("lease_end", &self.lease_end)?,
            break_date,
            property: self.property,
            unit: self.unit,
            floor_area: self.floor_area,
            refurb_psf: self.refurb_psf,
            refurb_duration: self.refurb_duration,
            rent_pa: self.rent_pa,
            erv_psf: self.erv_psf,
            end_void: self.end_void,
            initial_void: self.initial_void,
            ner_discount: self.ner_discount,
            term_yrs: self.term_yrs,
            initial_rent_free: self.initial_rent_free,
            relet_rent_free: self.relet_rent_free,
            rates_psf: self.rates_psf,
            rates_relief: self.rates_relief,
            sc_psf: self.sc_psf,
            exit_yield: self.exit_yield,
        })
    }
}

/// Query interface over the business plan data
pub trait BusinessPlanSource {
    /// Distinct property identifiers, sorted
    fn list_properties(&self) -> AppraisalResult<Vec<String>>;

    /// Units belonging to a property, sorted
    fn list_units(&self, property: &str) -> AppraisalResult<Vec<String>>;

    /// Default record for a property/unit, or None if absent
    fn fetch_defaults(&self, property: &str, unit: &str) -> AppraisalResult<Option<BusinessPlanRecord>>;
}

/// Business plans held in memory after reading a CSV extract
#[derive(Debug, Clone, Default)]
pub struct CsvBusinessPlans {
    records: Vec<BusinessPlanRecord>,
}

impl CsvBusinessPlans {
    /// Load all records from a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> AppraisalResult<Self> {
        let reader = Reader::from_path(path)?;
        Self::from_csv(reader)
    }

    /// Load records from any reader (e.g., string buffer, network stream)
    pub fn from_reader<R: std::io::Read>(reader: R) -> AppraisalResult<Self> {
        Self::from_csv(Reader::from_reader(reader))
    }

    fn from_csv<R: std::io::Read>(mut reader: Reader<R>) -> AppraisalResult<Self> {
        let mut records = Vec::new();

        for result in reader.deserialize() {
            let row: CsvRow = result?;
            records.push(row.to_record()?);
        }

        debug!("Loaded {} business plan records", records.len());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[BusinessPlanRecord] {
        &self.records
    }
}

impl BusinessPlanSource for CsvBusinessPlans {
    fn list_properties(&self) -> AppraisalResult<Vec<String>> {
        let mut properties: Vec<String> = self.records.iter().map(|r| r.property.clone()).collect();
        properties.sort();
        properties.dedup();
        Ok(properties)
    }

    fn list_units(&self, property: &str) -> AppraisalResult<Vec<String>> {
        let mut units: Vec<String> = self
            .records
            .iter()
            .filter(|r| r.property == property)
            .map(|r| r.unit.clone())
            .collect();
        units.sort();
        units.dedup();
        Ok(units)
    }

    fn fetch_defaults(&self, property: &str, unit: &str) -> AppraisalResult<Option<BusinessPlanRecord>> {
        Ok(self
            .records
            .iter()
            .find(|r| r.property == property && r.unit == unit)
            .cloned())
    }
}

/// Assumptions for a property/unit, falling back to the built-in defaults.
///
/// Returns the assumptions together with any warnings the caller should
/// surface. Source errors are propagated; a missing record is not an error.
pub fn resolve_assumptions<S: BusinessPlanSource + ?Sized>(
    source: &S,
    property: &str,
    unit: &str,
    cashflow_start: NaiveDate,
    cashflow_term: u32,
) -> AppraisalResult<(LeaseAssumptions, Vec<String>)> {
    match source.fetch_defaults(property, unit)? {
        Some(record) => Ok((
            LeaseAssumptions::from_business_plan(&record, cashflow_start, cashflow_term),
            Vec::new(),
        )),
        None => {
            let err = AppraisalError::NotFound {
                property: property.to_string(),
                unit: unit.to_string(),
            };
            warn!("{}; using built-in defaults", err);

            let assumptions = LeaseAssumptions::default_pricing().with_holding_period(cashflow_start, cashflow_term);
            Ok((assumptions, vec![format!("{}; using built-in defaults", err)]))
        }
    }
}
