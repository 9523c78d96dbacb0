//! Invariants checked over synthetic datasets from several seeds.
//!
//! Every engine answer is compared with a naive linear scan written out
//! longhand here, independent of the engine's matcher.

use poi_analytics_core::{
    synthetic::generate_venues, ChainSortKey, QueryEngine, VenueFilter, VenueRecord,
};

const SEEDS: [u64; 4] = [1, 42, 0xDEAD_BEEF, 987_654_321];
const COUNT: usize = 400;

fn naive_matches(v: &VenueRecord, f: &VenueFilter) -> bool {
    let exact = |want: &Option<String>, have: &str| match want {
        Some(w) if !w.trim().is_empty() => w == have,
        _ => true,
    };
    let search_ok = match f.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => {
            let term = term.to_lowercase();
            [&v.name, &v.chain_name, &v.city, &v.street_address]
                .iter()
                .any(|s| s.to_lowercase().contains(&term))
        }
        _ => true,
    };
    exact(&f.chain_name, &v.chain_name)
        && exact(&f.sub_category, &v.sub_category)
        && exact(&f.city, &v.city)
        && exact(&f.state_code, &v.state_code)
        && f.dma.map_or(true, |d| v.dma == Some(d))
        && f.is_open.map_or(true, |o| v.is_open == o)
        && search_ok
}

fn sample_filters() -> Vec<VenueFilter> {
    vec![
        VenueFilter::default(),
        VenueFilter::default().chain("Walmart"),
        VenueFilter::default().chain("Costco").open(true),
        VenueFilter::default().in_dma(501),
        VenueFilter::default().in_city("Springfield"),
        VenueFilter::default().in_city("Springfield").in_state("MO"),
        VenueFilter::default().category("Home Improvement").open(false),
        VenueFilter::default().searching("spring"),
        VenueFilter::default().searching("MAIN st"),
        VenueFilter::default().searching("#1").in_dma(803),
        VenueFilter::default().chain("not a chain"),
    ]
}

#[test]
fn total_matched_equals_linear_scan() {
    for seed in SEEDS {
        let venues = generate_venues(seed, COUNT);
        let engine = QueryEngine::with_default_config(venues.clone());
        for f in sample_filters() {
            let expected: Vec<&str> = venues
                .iter()
                .filter(|v| naive_matches(v, &f))
                .map(|v| v.entity_id.as_str())
                .collect();

            let page = engine.query_venues(&f, 1, 100).unwrap();
            assert_eq!(
                page.total_matched,
                expected.len() as u64,
                "seed {seed}, filter {f:?}: count diverged from linear scan"
            );
            let got: Vec<&str> = page.items.iter().map(|v| v.entity_id.as_str()).collect();
            let want: Vec<&str> = expected.iter().take(100).copied().collect();
            assert_eq!(got, want, "seed {seed}, filter {f:?}: first page order diverged");
        }
    }
}

#[test]
fn empty_filter_summary_covers_dataset() {
    for seed in SEEDS {
        let engine = QueryEngine::with_default_config(generate_venues(seed, COUNT));
        let stats = engine.summary(&VenueFilter::default());
        assert_eq!(stats.total_venues, COUNT as u64, "seed {seed}");
    }
}

#[test]
fn open_plus_closed_equals_total() {
    for seed in SEEDS {
        let engine = QueryEngine::with_default_config(generate_venues(seed, COUNT));
        for f in sample_filters() {
            let s = engine.summary(&f);
            assert_eq!(
                s.open_venues + s.closed_venues,
                s.total_venues,
                "seed {seed}, filter {f:?}"
            );
        }
    }
}

#[test]
fn chain_breakdown_accounts_for_every_row() {
    for seed in SEEDS {
        let engine = QueryEngine::with_default_config(generate_venues(seed, COUNT));
        for f in sample_filters() {
            let summary = engine.summary(&f);
            for key in [
                ChainSortKey::TotalFootTraffic,
                ChainSortKey::TotalSales,
                ChainSortKey::AvgSalesPerVisitor,
                ChainSortKey::TotalVenues,
            ] {
                let chains = engine.chain_performance(Some(&f), Some(key));
                let venues: u64 = chains.iter().map(|c| c.total_venues).sum();
                let traffic: u64 = chains.iter().map(|c| c.total_foot_traffic).sum();
                assert_eq!(venues, summary.total_venues, "seed {seed}, {key:?}, {f:?}");
                assert_eq!(traffic, summary.total_foot_traffic, "seed {seed}, {key:?}, {f:?}");
                assert_eq!(chains.len() as u64, summary.unique_chains);
            }
        }
    }
}

#[test]
fn default_chain_ranking_is_traffic_descending() {
    for seed in SEEDS {
        let engine = QueryEngine::with_default_config(generate_venues(seed, COUNT));
        let chains = engine.chain_performance(None, None);
        for pair in chains.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.total_foot_traffic > b.total_foot_traffic
                    || (a.total_foot_traffic == b.total_foot_traffic && a.chain_name < b.chain_name),
                "seed {seed}: {} ranked above {}",
                a.chain_name,
                b.chain_name
            );
        }
    }
}

#[test]
fn dma_breakdown_covers_rows_with_a_dma() {
    for seed in SEEDS {
        let venues = generate_venues(seed, COUNT);
        let with_dma = venues.iter().filter(|v| v.dma.is_some()).count() as u64;
        let engine = QueryEngine::with_default_config(venues);

        let dist = engine.dma_distribution(None);
        let counted: u64 = dist.iter().map(|d| d.venue_count).sum();
        assert_eq!(counted, with_dma, "seed {seed}");
        assert_eq!(dist.len() as u64, engine.summary(&VenueFilter::default()).unique_dmas);

        for pair in dist.windows(2) {
            assert!(
                pair[0].venue_count > pair[1].venue_count
                    || (pair[0].venue_count == pair[1].venue_count && pair[0].dma < pair[1].dma),
                "seed {seed}: DMA ordering broken at {} / {}",
                pair[0].dma,
                pair[1].dma
            );
        }
    }
}

#[test]
fn identical_inputs_give_identical_outputs() {
    let a = QueryEngine::with_default_config(generate_venues(42, COUNT));
    let b = QueryEngine::with_default_config(generate_venues(42, COUNT));
    for f in sample_filters() {
        let left = serde_json::to_string(&(a.summary(&f), a.chain_performance(Some(&f), None), a.dma_distribution(Some(&f)))).unwrap();
        let right = serde_json::to_string(&(b.summary(&f), b.chain_performance(Some(&f), None), b.dma_distribution(Some(&f)))).unwrap();
        assert_eq!(left, right, "filter {f:?}");
    }
}
