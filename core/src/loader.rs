//! CSV → SQLite load step.
//!
//! Runs once before the engine is built. Any malformed row aborts the whole
//! load; nothing is written unless every row parses and validates.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    store::VenueStore,
    types::DmaCode,
    venue::{VenueRecord, VenueSet, VenueSource},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};

/// One row of the source dataset, exactly as the CSV spells it.
/// Columns not listed here (geolocation, cbsa, store_id, ...) are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvVenueRow {
    entity_id: Option<String>,
    name: Option<String>,
    chain_id: Option<String>,
    chain_name: Option<String>,
    sub_category: Option<String>,
    city: Option<String>,
    state_code: Option<String>,
    state_name: Option<String>,
    dma: Option<String>,
    foot_traffic: Option<String>,
    sales: Option<String>,
    avg_dwell_time_min: Option<String>,
    area_sqft: Option<String>,
    street_address: Option<String>,
    postal_code: Option<String>,
    date_opened: Option<String>,
    date_closed: Option<String>,
}

impl CsvVenueRow {
    fn into_record(self, row: usize) -> AnalyticsResult<VenueRecord> {
        let invalid = |reason: String| AnalyticsError::InvalidRecord { row, reason };

        let entity_id = text(self.entity_id);
        if entity_id.is_empty() {
            return Err(invalid("missing entity_id".into()));
        }

        let foot_traffic = required(self.foot_traffic, "foot_traffic").and_then(|raw| {
            parse_whole(&raw).ok_or_else(|| {
                format!("foot_traffic must be a non-negative integer, got '{raw}'")
            })
        });
        let foot_traffic = foot_traffic.map_err(invalid)?;

        let sales = required(self.sales, "sales")
            .and_then(|raw| parse_amount("sales", &raw))
            .map_err(invalid)?;
        let avg_dwell_time_min = required(self.avg_dwell_time_min, "avg_dwell_time_min")
            .and_then(|raw| parse_amount("avg_dwell_time_min", &raw))
            .map_err(invalid)?;
        let area_sqft = required(self.area_sqft, "area_sqft")
            .and_then(|raw| parse_amount("area_sqft", &raw))
            .map_err(invalid)?;

        let dma = match self.dma.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                parse_whole(raw)
                    .and_then(|d| DmaCode::try_from(d).ok())
                    .ok_or_else(|| invalid(format!("dma must be an integer code, got '{raw}'")))?,
            ),
            None => None,
        };

        let date_opened = parse_date(row, "date_opened", self.date_opened);
        let date_closed = parse_date(row, "date_closed", self.date_closed);

        let record = VenueRecord {
            entity_id,
            name: text(self.name),
            chain_id: text(self.chain_id),
            chain_name: text(self.chain_name),
            sub_category: text(self.sub_category),
            city: text(self.city),
            state_code: text(self.state_code),
            state_name: text(self.state_name),
            dma,
            foot_traffic,
            sales,
            avg_dwell_time_min,
            area_sqft,
            street_address: text(self.street_address),
            postal_code: text(self.postal_code),
            is_open: date_closed.is_none(),
            date_opened,
            date_closed,
        };
        record.validate().map_err(invalid)?;
        Ok(record)
    }
}

fn text(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn required(value: Option<String>, column: &str) -> Result<String, String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing {column}"))
}

/// Accepts "1234" as well as the "1234.0" spelling some exporters write for
/// integer columns.
fn parse_whole(raw: &str) -> Option<u64> {
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

fn parse_amount(column: &str, raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .ok_or_else(|| format!("{column} must be numeric, got '{raw}'"))
}

/// Unparseable dates are coerced to absent rather than failing the load.
fn parse_date(row: usize, column: &str, value: Option<String>) -> Option<NaiveDate> {
    let raw = value?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.date_naive());
    }
    log::warn!("Row {row}: unparseable {column} '{raw}', treating as absent");
    None
}

/// Parse a venue CSV into validated records, in file order.
pub fn read_csv<R: Read>(reader: R) -> AnalyticsResult<Vec<VenueRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let mut venues = Vec::new();
    for (idx, result) in rdr.deserialize::<CsvVenueRow>().enumerate() {
        let row = idx + 1;
        let raw = result?;
        venues.push(raw.into_record(row)?);
    }
    Ok(venues)
}

pub fn read_csv_path(path: &Path) -> AnalyticsResult<Vec<VenueRecord>> {
    let file = File::open(path)?;
    read_csv(file)
}

/// Load the CSV at `path` into `store`. With `replace`, existing rows are
/// removed first; the whole load runs after full validation so a bad file
/// leaves the store untouched.
pub fn load_csv_into_store(path: &Path, store: &VenueStore, replace: bool) -> AnalyticsResult<usize> {
    log::info!("Loading venues from {}", path.display());
    let venues = read_csv_path(path)?;
    let set = VenueSet::new(venues)?;
    log::info!("Parsed {} venue records", set.len());

    store.migrate()?;
    if replace {
        store.clear_venues()?;
    }
    let inserted = store.insert_venues(set.venues())?;
    log::info!("Inserted {inserted} venues; store now holds {}", store.venue_count()?);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_floats_are_accepted_for_integer_columns() {
        assert_eq!(parse_whole("807"), Some(807));
        assert_eq!(parse_whole("807.0"), Some(807));
        assert_eq!(parse_whole("807.5"), None);
        assert_eq!(parse_whole("-1"), None);
    }

    #[test]
    fn dates_accept_common_spellings() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 4);
        assert_eq!(parse_date(1, "d", Some("2021-03-04".into())), expected);
        assert_eq!(parse_date(1, "d", Some("2021-03-04 10:00:00".into())), expected);
        assert_eq!(parse_date(1, "d", Some("2021-03-04T10:00:00+00:00".into())), expected);
        assert_eq!(parse_date(1, "d", Some("not a date".into())), None);
        assert_eq!(parse_date(1, "d", Some("".into())), None);
    }
}
