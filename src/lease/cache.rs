//! Query caching over a business plan source
//!
//! Each query result is cached under its parameters. Nothing is evicted
//! implicitly; callers invalidate a property or the whole cache when the
//! underlying data changes.

use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::loader::{BusinessPlanRecord, BusinessPlanSource};
use crate::error::AppraisalResult;

#[derive(Debug, Default)]
struct CacheState {
    properties: Option<Vec<String>>,
    units: HashMap<String, Vec<String>>,
    defaults: HashMap<(String, String), Option<BusinessPlanRecord>>,
    hits: u64,
    misses: u64,
}

/// Hit/miss counters for a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Caching wrapper around any [`BusinessPlanSource`]
#[derive(Debug)]
pub struct CachedBusinessPlans<S> {
    source: S,
    state: Mutex<CacheState>,
}

impl<S: BusinessPlanSource> CachedBusinessPlans<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        // Cached values stay consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Drop every cached query touching `property`
    pub fn invalidate(&self, property: &str) {
        let mut state = self.state();
        state.units.remove(property);
        state.defaults.retain(|(p, _), _| p != property);
        debug!("Invalidated cached business plans for {}", property);
    }

    /// Drop all cached queries
    pub fn invalidate_all(&self) {
        let mut state = self.state();
        state.properties = None;
        state.units.clear();
        state.defaults.clear();
        debug!("Invalidated all cached business plans");
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
        }
    }

    /// Underlying source
    pub fn inner(&self) -> &S {
        &self.source
    }
}

impl<S: BusinessPlanSource> BusinessPlanSource for CachedBusinessPlans<S> {
    fn list_properties(&self) -> AppraisalResult<Vec<String>> {
        {
            let mut state = self.state();
            if let Some(properties) = state.properties.clone() {
                state.hits += 1;
                return Ok(properties);
            }
        }

        let properties = self.source.list_properties()?;
        let mut state = self.state();
        state.misses += 1;
        state.properties = Some(properties.clone());
        Ok(properties)
    }

    fn list_units(&self, property: &str) -> AppraisalResult<Vec<String>> {
        {
            let mut state = self.state();
            if let Some(units) = state.units.get(property).cloned() {
                state.hits += 1;
                return Ok(units);
            }
        }

        let units = self.source.list_units(property)?;
        let mut state = self.state();
        state.misses += 1;
        state.units.insert(property.to_string(), units.clone());
        Ok(units)
    }

    fn fetch_defaults(&self, property: &str, unit: &str) -> AppraisalResult<Option<BusinessPlanRecord>> {
        let key = (property.to_string(), unit.to_string());
        {
            let mut state = self.state();
            if let Some(record) = state.defaults.get(&key).cloned() {
                state.hits += 1;
                debug!("Business plan cache hit for {}/{}", property, unit);
                return Ok(record);
            }
        }

        let record = self.source.fetch_defaults(property, unit)?;
        let mut state = self.state();
        state.misses += 1;
        state.defaults.insert(key, record.clone());
        Ok(record)
    }
}
