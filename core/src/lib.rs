//! Query and aggregation layer over a static dataset of retail venue records.
//!
//! Load once (`loader` → `store` → `VenueSet`), then hand the set to a
//! `QueryEngine` and query it as often as needed.

pub mod analytics;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod rng;
pub mod store;
pub mod synthetic;
pub mod types;
pub mod venue;

pub use analytics::{ChainPerformance, ChainSortKey, DmaDistribution, SummaryStats};
pub use config::{EngineConfig, SearchField, StateField};
pub use engine::{FilterField, QueryEngine, VenuePage};
pub use error::{AnalyticsError, AnalyticsResult};
pub use filter::{FilterParams, VenueFilter};
pub use venue::{VenueRecord, VenueSet, VenueSource};
