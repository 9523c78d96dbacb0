//! The query engine: the read side of the analytics layer.
//!
//! RULES:
//!   - The engine is handed a loaded `VenueSource`; it never loads data itself.
//!   - Every query is filter → aggregate over the read-only rows. No query
//!     mutates anything, so one engine can serve many threads at once.
//!   - Filter-option values are derived once at construction and reused.
//!   - Results depend only on (filter, arguments, data): same in, same out.

use crate::{
    analytics::{self, ChainPerformance, ChainSortKey, DmaDistribution, SummaryStats},
    config::{EngineConfig, SearchField},
    error::{AnalyticsError, AnalyticsResult},
    filter::{FilterMatcher, VenueFilter},
    types::DmaCode,
    venue::{VenueRecord, VenueSource, VenueSet},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, str::FromStr};

/// One page of matching venues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenuePage {
    pub items: Vec<VenueRecord>,
    pub total_matched: u64,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: u64,
}

/// Columns that feed the filter-option pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Chain,
    Dma,
    Category,
    City,
    State,
}

impl FromStr for FilterField {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chain" | "chains" | "chain_name"           => Ok(FilterField::Chain),
            "dma" | "dmas"                              => Ok(FilterField::Dma),
            "category" | "categories" | "sub_category"  => Ok(FilterField::Category),
            "city" | "cities"                           => Ok(FilterField::City),
            "state" | "states" | "state_code"           => Ok(FilterField::State),
            other => Err(AnalyticsError::validation(
                "field",
                format!("unknown filter field '{other}'"),
            )),
        }
    }
}

/// Distinct values of each picker column over the full collection, sorted.
#[derive(Debug, Clone, Default)]
struct FilterOptions {
    chains: Vec<String>,
    dmas: Vec<DmaCode>,
    dma_labels: Vec<String>,
    categories: Vec<String>,
    cities: Vec<String>,
    states: Vec<String>,
}

impl FilterOptions {
    fn build(venues: &[VenueRecord], config: &EngineConfig) -> Self {
        fn collect<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
            values
                .filter(|v| !v.trim().is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_string)
                .collect()
        }

        let dmas: Vec<DmaCode> = venues
            .iter()
            .filter_map(|v| v.dma)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            chains: collect(venues.iter().map(|v| v.chain_name.as_str())),
            dma_labels: dmas.iter().map(|d| d.to_string()).collect(),
            dmas,
            categories: collect(venues.iter().map(|v| v.sub_category.as_str())),
            cities: collect(venues.iter().map(|v| v.city.as_str())),
            states: collect(venues.iter().map(|v| config.state_field.value(v))),
        }
    }
}

pub struct QueryEngine<S: VenueSource = VenueSet> {
    source: S,
    config: EngineConfig,
    options: FilterOptions,
}

impl<S: VenueSource> QueryEngine<S> {
    pub fn new(source: S, config: EngineConfig) -> Self {
        let options = FilterOptions::build(source.venues(), &config);
        log::info!(
            "Query engine ready: {} venues, {} chains, {} DMAs",
            source.venues().len(),
            options.chains.len(),
            options.dmas.len()
        );
        Self {
            source,
            config,
            options,
        }
    }

    pub fn with_default_config(source: S) -> Self {
        Self::new(source, EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Every row satisfying `filter`, in load order.
    pub fn matching(&self, filter: &VenueFilter) -> Vec<&VenueRecord> {
        let matcher = FilterMatcher::new(filter, self.config.state_field, &self.config.search_fields);
        let rows = matcher.apply(self.source.venues());
        log::debug!("Filter {filter:?} matched {} rows", rows.len());
        rows
    }

    /// One 1-based page of matching venues. A page past the end is empty
    /// rather than an error.
    pub fn query_venues(
        &self,
        filter: &VenueFilter,
        page: usize,
        page_size: usize,
    ) -> AnalyticsResult<VenuePage> {
        if page < 1 {
            return Err(AnalyticsError::validation("page", "page numbers start at 1"));
        }
        if page_size < 1 || page_size > self.config.max_page_size {
            return Err(AnalyticsError::validation(
                "page_size",
                format!("must be in 1..={}, got {page_size}", self.config.max_page_size),
            ));
        }

        let rows = self.matching(filter);
        let total_matched = rows.len() as u64;
        let total_pages = total_matched.div_ceil(page_size as u64);
        let items = rows
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect();

        Ok(VenuePage {
            items,
            total_matched,
            page,
            page_size,
            total_pages,
        })
    }

    pub fn summary(&self, filter: &VenueFilter) -> SummaryStats {
        analytics::summarize(&self.matching(filter))
    }

    pub fn chain_performance(
        &self,
        filter: Option<&VenueFilter>,
        sort_key: Option<ChainSortKey>,
    ) -> Vec<ChainPerformance> {
        let rows = self.matching(filter.unwrap_or(&VenueFilter::default()));
        analytics::chain_performance(&rows, sort_key.unwrap_or_default())
    }

    pub fn dma_distribution(&self, filter: Option<&VenueFilter>) -> Vec<DmaDistribution> {
        let rows = self.matching(filter.unwrap_or(&VenueFilter::default()));
        analytics::dma_distribution(&rows)
    }

    /// Sorted distinct values for a picker column, from the full collection.
    pub fn distinct_values(&self, field: FilterField) -> &[String] {
        match field {
            FilterField::Chain    => &self.options.chains,
            FilterField::Dma      => &self.options.dma_labels,
            FilterField::Category => &self.options.categories,
            FilterField::City     => &self.options.cities,
            FilterField::State    => &self.options.states,
        }
    }

    /// Distinct DMA codes, ascending.
    pub fn distinct_dmas(&self) -> &[DmaCode] {
        &self.options.dmas
    }

    /// Suggestions whose text contains `query`, case-insensitively.
    /// Searches the configured search fields, or only `field` when given.
    pub fn autocomplete(&self, query: &str, field: Option<SearchField>) -> Vec<String> {
        let query = query.trim();
        if query.chars().count() < self.config.autocomplete_min_length {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        let single;
        let fields: &[SearchField] = match field {
            Some(f) => {
                single = [f];
                &single
            }
            None => &self.config.search_fields,
        };

        let mut suggestions: BTreeSet<&str> = BTreeSet::new();
        for venue in self.source.venues() {
            for f in fields {
                let value = f.value(venue);
                if !value.trim().is_empty() && value.to_lowercase().contains(&needle) {
                    suggestions.insert(value);
                }
            }
        }
        suggestions
            .into_iter()
            .take(self.config.autocomplete_limit)
            .map(str::to_string)
            .collect()
    }
}
