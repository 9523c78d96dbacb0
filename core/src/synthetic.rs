//! Deterministic synthetic venue datasets.
//!
//! Builds plausible big-box retail rows from curated chain and market lists.
//! Same seed and count ⇒ identical rows, which the property tests rely on.

use crate::{rng::DatasetRng, types::DmaCode, venue::VenueRecord};
use chrono::{Days, NaiveDate};

struct ChainProfile {
    chain_id: &'static str,
    chain_name: &'static str,
    sub_category: &'static str,
    /// Mean spend per visit, in dollars.
    spend_per_visit: f64,
}

struct Market {
    city: &'static str,
    state_code: &'static str,
    state_name: &'static str,
    dma: DmaCode,
    postal_prefix: &'static str,
}

fn chains() -> &'static [ChainProfile] {
    &[
        ChainProfile { chain_id: "ch-walmart",  chain_name: "Walmart",        sub_category: "Discount Stores",       spend_per_visit: 48.0 },
        ChainProfile { chain_id: "ch-target",   chain_name: "Target",         sub_category: "Discount Stores",       spend_per_visit: 52.0 },
        ChainProfile { chain_id: "ch-costco",   chain_name: "Costco",         sub_category: "Warehouse Clubs",       spend_per_visit: 141.0 },
        ChainProfile { chain_id: "ch-samsclub", chain_name: "Sam's Club",     sub_category: "Warehouse Clubs",       spend_per_visit: 118.0 },
        ChainProfile { chain_id: "ch-homedepot",chain_name: "The Home Depot", sub_category: "Home Improvement",      spend_per_visit: 79.0 },
        ChainProfile { chain_id: "ch-lowes",    chain_name: "Lowe's",         sub_category: "Home Improvement",      spend_per_visit: 74.0 },
        ChainProfile { chain_id: "ch-bestbuy",  chain_name: "Best Buy",       sub_category: "Electronics Stores",    spend_per_visit: 96.0 },
        ChainProfile { chain_id: "ch-kohls",    chain_name: "Kohl's",         sub_category: "Department Stores",     spend_per_visit: 41.0 },
        ChainProfile { chain_id: "ch-dicks",    chain_name: "Dick's Sporting Goods", sub_category: "Sporting Goods", spend_per_visit: 63.0 },
        ChainProfile { chain_id: "ch-petsmart", chain_name: "PetSmart",       sub_category: "Pet Stores",            spend_per_visit: 37.0 },
    ]
}

fn markets() -> &'static [Market] {
    &[
        Market { city: "New York",     state_code: "NY", state_name: "New York",     dma: 501, postal_prefix: "100" },
        Market { city: "Los Angeles",  state_code: "CA", state_name: "California",   dma: 803, postal_prefix: "900" },
        Market { city: "Chicago",      state_code: "IL", state_name: "Illinois",     dma: 602, postal_prefix: "606" },
        Market { city: "Philadelphia", state_code: "PA", state_name: "Pennsylvania", dma: 504, postal_prefix: "191" },
        Market { city: "Dallas",       state_code: "TX", state_name: "Texas",        dma: 623, postal_prefix: "752" },
        Market { city: "Houston",      state_code: "TX", state_name: "Texas",        dma: 618, postal_prefix: "770" },
        Market { city: "Atlanta",      state_code: "GA", state_name: "Georgia",      dma: 524, postal_prefix: "303" },
        Market { city: "Phoenix",      state_code: "AZ", state_name: "Arizona",      dma: 753, postal_prefix: "850" },
        Market { city: "Seattle",      state_code: "WA", state_name: "Washington",   dma: 819, postal_prefix: "981" },
        Market { city: "Springfield",  state_code: "IL", state_name: "Illinois",     dma: 648, postal_prefix: "627" },
        Market { city: "Springfield",  state_code: "MO", state_name: "Missouri",     dma: 619, postal_prefix: "658" },
        Market { city: "Portland",     state_code: "OR", state_name: "Oregon",       dma: 820, postal_prefix: "972" },
    ]
}

fn street_names() -> &'static [&'static str] {
    &[
        "Main St", "Market St", "Commerce Dr", "Industrial Blvd", "Oak Ave",
        "Highway 50", "Park Rd", "Center Pkwy", "Lakeview Dr", "Route 9",
    ]
}

/// Generate `count` venues. About 12% are closed, and about 5% lack a DMA.
pub fn generate_venues(seed: u64, count: usize) -> Vec<VenueRecord> {
    let mut rng = DatasetRng::new(seed);
    let epoch = NaiveDate::from_ymd_opt(1995, 1, 1).unwrap_or_default();
    let mut venues = Vec::with_capacity(count);

    for i in 0..count {
        let chain = rng.pick(chains());
        let market = rng.pick(markets());
        let street = rng.pick(street_names());

        let foot_traffic = rng.pareto(8_000.0, 1.6).min(5_000_000.0).round() as u64;
        let spend = chain.spend_per_visit * (0.75 + rng.next_f64() * 0.5);
        let sales = (foot_traffic as f64 * spend * 100.0).round() / 100.0;
        let avg_dwell_time_min = (8.0 + rng.next_f64() * 52.0).round();
        let area_sqft = rng.range_inclusive(18, 220) as f64 * 1_000.0;

        let date_opened = epoch.checked_add_days(Days::new(rng.range_inclusive(0, 9_000)));
        let date_closed = if rng.chance(0.12) {
            date_opened.and_then(|d| d.checked_add_days(Days::new(rng.range_inclusive(30, 3_000))))
        } else {
            None
        };

        venues.push(VenueRecord {
            entity_id: format!("zzw-{seed:x}-{i:05}"),
            name: format!("{} {} #{}", chain.chain_name, market.city, i + 1),
            chain_id: chain.chain_id.to_string(),
            chain_name: chain.chain_name.to_string(),
            sub_category: chain.sub_category.to_string(),
            city: market.city.to_string(),
            state_code: market.state_code.to_string(),
            state_name: market.state_name.to_string(),
            dma: if rng.chance(0.05) { None } else { Some(market.dma) },
            foot_traffic,
            sales,
            avg_dwell_time_min,
            area_sqft,
            street_address: format!("{} {}", rng.range_inclusive(1, 9_999), street),
            postal_code: format!("{}{:02}", market.postal_prefix, rng.next_u64_below(100)),
            is_open: date_closed.is_none(),
            date_opened,
            date_closed,
        });
    }
    venues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(generate_venues(12345, 50), generate_venues(12345, 50));
    }

    #[test]
    fn different_seeds_differ() {
        assert_ne!(generate_venues(1, 50), generate_venues(2, 50));
    }

    #[test]
    fn generated_records_satisfy_invariants() {
        for v in generate_venues(7, 500) {
            assert_eq!(v.validate(), Ok(()), "invalid synthetic venue: {v:?}");
        }
    }
}
