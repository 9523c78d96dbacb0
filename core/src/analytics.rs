//! Aggregations over a filtered venue subset.
//!
//! Every function here is a pure function of the rows it is handed. Nothing
//! refers back to the unfiltered collection, and grouping goes through
//! ordered maps so identical input always yields identical output.
//! Integer totals saturate at `u64::MAX`.

use crate::{
    error::AnalyticsError,
    types::DmaCode,
    venue::VenueRecord,
};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    str::FromStr,
};

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_venues: u64,
    pub total_foot_traffic: u64,
    pub total_sales: f64,
    pub avg_dwell_time: f64,
    pub open_venues: u64,
    pub closed_venues: u64,
    pub unique_chains: u64,
    pub unique_dmas: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainPerformance {
    pub chain_name: String,
    pub total_venues: u64,
    pub total_foot_traffic: u64,
    pub avg_foot_traffic: f64,
    pub total_sales: f64,
    pub avg_sales: f64,
    pub avg_dwell_time: f64,
    pub avg_sales_per_visitor: f64,
    pub open_venues: u64,
    pub closed_venues: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmaDistribution {
    pub dma: DmaCode,
    pub venue_count: u64,
    pub total_foot_traffic: u64,
    pub total_sales: f64,
    pub unique_chains: u64,
}

/// Ranking key for the chain breakdown. Always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainSortKey {
    #[default]
    TotalFootTraffic,
    TotalSales,
    AvgSalesPerVisitor,
    TotalVenues,
}

impl FromStr for ChainSortKey {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total_foot_traffic"    => Ok(ChainSortKey::TotalFootTraffic),
            "total_sales"           => Ok(ChainSortKey::TotalSales),
            "avg_sales_per_visitor" => Ok(ChainSortKey::AvgSalesPerVisitor),
            "total_venues"          => Ok(ChainSortKey::TotalVenues),
            other => Err(AnalyticsError::validation(
                "sort_key",
                format!("unknown chain sort key '{other}'"),
            )),
        }
    }
}

impl ChainSortKey {
    /// Descending by the key, then chain name ascending.
    fn compare(&self, a: &ChainPerformance, b: &ChainPerformance) -> Ordering {
        let primary = match self {
            ChainSortKey::TotalFootTraffic => b.total_foot_traffic.cmp(&a.total_foot_traffic),
            ChainSortKey::TotalSales => b.total_sales.total_cmp(&a.total_sales),
            ChainSortKey::AvgSalesPerVisitor => {
                b.avg_sales_per_visitor.total_cmp(&a.avg_sales_per_visitor)
            }
            ChainSortKey::TotalVenues => b.total_venues.cmp(&a.total_venues),
        };
        primary.then_with(|| a.chain_name.cmp(&b.chain_name))
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

pub fn summarize(rows: &[&VenueRecord]) -> SummaryStats {
    if rows.is_empty() {
        return SummaryStats::default();
    }

    let mut stats = SummaryStats::default();
    let mut dwell_sum = 0.0;
    let mut chains: BTreeSet<&str> = BTreeSet::new();
    let mut dmas: BTreeSet<DmaCode> = BTreeSet::new();

    for v in rows {
        stats.total_venues += 1;
        stats.total_foot_traffic = stats.total_foot_traffic.saturating_add(v.foot_traffic);
        stats.total_sales += v.sales;
        dwell_sum += v.avg_dwell_time_min;
        if v.is_open {
            stats.open_venues += 1;
        } else {
            stats.closed_venues += 1;
        }
        chains.insert(v.chain_name.as_str());
        if let Some(dma) = v.dma {
            dmas.insert(dma);
        }
    }

    stats.avg_dwell_time = dwell_sum / stats.total_venues as f64;
    stats.unique_chains = chains.len() as u64;
    stats.unique_dmas = dmas.len() as u64;
    stats
}

// ── Chain breakdown ──────────────────────────────────────────────────────────

#[derive(Default)]
struct ChainAccumulator {
    venues: u64,
    foot_traffic: u64,
    sales: f64,
    dwell: f64,
    open: u64,
}

pub fn chain_performance(rows: &[&VenueRecord], sort_key: ChainSortKey) -> Vec<ChainPerformance> {
    let mut groups: BTreeMap<&str, ChainAccumulator> = BTreeMap::new();
    for v in rows {
        let acc = groups.entry(v.chain_name.as_str()).or_default();
        acc.venues += 1;
        acc.foot_traffic = acc.foot_traffic.saturating_add(v.foot_traffic);
        acc.sales += v.sales;
        acc.dwell += v.avg_dwell_time_min;
        if v.is_open {
            acc.open += 1;
        }
    }

    let mut out: Vec<ChainPerformance> = groups
        .into_iter()
        .map(|(chain_name, acc)| {
            let n = acc.venues as f64;
            ChainPerformance {
                chain_name: chain_name.to_string(),
                total_venues: acc.venues,
                total_foot_traffic: acc.foot_traffic,
                avg_foot_traffic: acc.foot_traffic as f64 / n,
                total_sales: acc.sales,
                avg_sales: acc.sales / n,
                avg_dwell_time: acc.dwell / n,
                avg_sales_per_visitor: if acc.foot_traffic > 0 {
                    acc.sales / acc.foot_traffic as f64
                } else {
                    0.0
                },
                open_venues: acc.open,
                closed_venues: acc.venues - acc.open,
            }
        })
        .collect();

    out.sort_by(|a, b| sort_key.compare(a, b));
    out
}

// ── DMA breakdown ────────────────────────────────────────────────────────────

#[derive(Default)]
struct DmaAccumulator<'a> {
    venues: u64,
    foot_traffic: u64,
    sales: f64,
    chains: BTreeSet<&'a str>,
}

pub fn dma_distribution(rows: &[&VenueRecord]) -> Vec<DmaDistribution> {
    let mut groups: BTreeMap<DmaCode, DmaAccumulator<'_>> = BTreeMap::new();
    for v in rows {
        let Some(dma) = v.dma else { continue };
        let acc = groups.entry(dma).or_default();
        acc.venues += 1;
        acc.foot_traffic = acc.foot_traffic.saturating_add(v.foot_traffic);
        acc.sales += v.sales;
        acc.chains.insert(v.chain_name.as_str());
    }

    let mut out: Vec<DmaDistribution> = groups
        .into_iter()
        .map(|(dma, acc)| DmaDistribution {
            dma,
            venue_count: acc.venues,
            total_foot_traffic: acc.foot_traffic,
            total_sales: acc.sales,
            unique_chains: acc.chains.len() as u64,
        })
        .collect();

    out.sort_by(|a, b| b.venue_count.cmp(&a.venue_count).then_with(|| a.dma.cmp(&b.dma)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_parses_known_names() {
        assert_eq!(
            "avg_sales_per_visitor".parse::<ChainSortKey>().unwrap(),
            ChainSortKey::AvgSalesPerVisitor
        );
        assert_eq!("total_venues".parse::<ChainSortKey>().unwrap(), ChainSortKey::TotalVenues);
    }

    #[test]
    fn unknown_sort_key_is_validation_error() {
        let err = "popularity".parse::<ChainSortKey>().unwrap_err();
        assert!(matches!(err, AnalyticsError::Validation { field: "sort_key", .. }));
    }

    #[test]
    fn empty_input_yields_zeroed_summary() {
        let stats = summarize(&[]);
        assert_eq!(stats, SummaryStats::default());
        assert_eq!(stats.avg_dwell_time, 0.0);
    }
}
