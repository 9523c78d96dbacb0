//! Venue records and the read-only collection the query engine runs over.
//!
//! RULE: Records are created once by the load step and never mutated.
//! The engine borrows them through `VenueSource`; it owns no dataset state
//! of its own beyond caches derived at construction.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    store::VenueStore,
    types::{DmaCode, EntityId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRecord {
    pub entity_id: EntityId,
    pub name: String,
    pub chain_id: String,
    pub chain_name: String,
    pub sub_category: String,
    pub city: String,
    pub state_code: String,
    pub state_name: String,
    pub dma: Option<DmaCode>,
    pub foot_traffic: u64,
    pub sales: f64,
    pub avg_dwell_time_min: f64,
    pub area_sqft: f64,
    pub street_address: String,
    pub postal_code: String,
    pub is_open: bool,
    pub date_opened: Option<NaiveDate>,
    pub date_closed: Option<NaiveDate>,
}

impl VenueRecord {
    /// Foot traffic per square foot of floor area.
    pub fn ft_per_sqft(&self) -> f64 {
        if self.area_sqft > 0.0 {
            self.foot_traffic as f64 / self.area_sqft
        } else {
            0.0
        }
    }

    /// Check the record-level invariants. Called by the loader for every row.
    pub fn validate(&self) -> Result<(), String> {
        if self.entity_id.trim().is_empty() {
            return Err("entity_id is empty".into());
        }
        if i64::try_from(self.foot_traffic).is_err() {
            return Err(format!("foot_traffic {} is out of range", self.foot_traffic));
        }
        if !self.sales.is_finite() || self.sales < 0.0 {
            return Err(format!("sales must be a non-negative amount, got {}", self.sales));
        }
        if !self.avg_dwell_time_min.is_finite() || self.avg_dwell_time_min < 0.0 {
            return Err(format!(
                "avg_dwell_time_min must be non-negative, got {}",
                self.avg_dwell_time_min
            ));
        }
        if !self.area_sqft.is_finite() || self.area_sqft <= 0.0 {
            return Err(format!("area_sqft must be positive, got {}", self.area_sqft));
        }
        if self.is_open && self.date_closed.is_some() {
            return Err("open venue carries a date_closed".into());
        }
        if let (Some(opened), Some(closed)) = (self.date_opened, self.date_closed) {
            if closed < opened {
                return Err(format!("date_closed {closed} precedes date_opened {opened}"));
            }
        }
        Ok(())
    }
}

/// Read-only access to the full venue collection, in load order.
///
/// The engine is generic over this so tests can hand it synthetic rows.
pub trait VenueSource: Send + Sync {
    fn venues(&self) -> &[VenueRecord];
}

/// An owned, immutable venue collection.
#[derive(Debug, Clone, Default)]
pub struct VenueSet {
    venues: Vec<VenueRecord>,
}

impl VenueSet {
    /// Build a set from already-validated records. Entity ids must be unique.
    pub fn new(venues: Vec<VenueRecord>) -> AnalyticsResult<Self> {
        let mut seen = HashSet::with_capacity(venues.len());
        for (idx, v) in venues.iter().enumerate() {
            if !seen.insert(v.entity_id.as_str()) {
                return Err(AnalyticsError::InvalidRecord {
                    row: idx + 1,
                    reason: format!("duplicate entity_id '{}'", v.entity_id),
                });
            }
        }
        Ok(Self { venues })
    }

    /// Read every stored venue once. Fails if the store is unreadable or was
    /// never migrated, so a bad load stops the process before any query runs.
    pub fn from_store(store: &VenueStore) -> AnalyticsResult<Self> {
        let venues = store.all_venues()?;
        log::info!("Loaded {} venue records from store", venues.len());
        Self::new(venues)
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }
}

impl VenueSource for VenueSet {
    fn venues(&self) -> &[VenueRecord] {
        &self.venues
    }
}

impl VenueSource for Vec<VenueRecord> {
    fn venues(&self) -> &[VenueRecord] {
        self
    }
}
