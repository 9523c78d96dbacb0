//! CSV writers for filtered venue rows.
//!
//! Two layouts: the report layout with human-readable headings that the
//! dashboard's download button produces, and the source layout the loader
//! reads, so generated or filtered datasets can be loaded again.

use crate::{error::AnalyticsResult, venue::VenueRecord};
use std::io::Write;

const REPORT_HEADERS: [&str; 17] = [
    "Entity ID",
    "Name",
    "Chain Name",
    "Category",
    "City",
    "State",
    "Postal Code",
    "Address",
    "DMA",
    "Foot Traffic",
    "Sales",
    "Avg Dwell Time (min)",
    "Area (sqft)",
    "Foot Traffic per sqft",
    "Is Open",
    "Date Opened",
    "Date Closed",
];

const SOURCE_HEADERS: [&str; 18] = [
    "entity_id",
    "name",
    "chain_id",
    "chain_name",
    "sub_category",
    "city",
    "state_code",
    "state_name",
    "dma",
    "foot_traffic",
    "sales",
    "avg_dwell_time_min",
    "area_sqft",
    "ft_per_sqft",
    "street_address",
    "postal_code",
    "date_opened",
    "date_closed",
];

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write rows with report headings. An empty row set still gets a header.
pub fn write_report_csv<W: Write>(writer: W, rows: &[&VenueRecord]) -> AnalyticsResult<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(REPORT_HEADERS)?;
    for v in rows {
        wtr.write_record([
            v.entity_id.clone(),
            v.name.clone(),
            v.chain_name.clone(),
            v.sub_category.clone(),
            v.city.clone(),
            v.state_name.clone(),
            v.postal_code.clone(),
            v.street_address.clone(),
            opt(v.dma),
            v.foot_traffic.to_string(),
            v.sales.to_string(),
            v.avg_dwell_time_min.to_string(),
            v.area_sqft.to_string(),
            v.ft_per_sqft().to_string(),
            v.is_open.to_string(),
            opt(v.date_opened),
            opt(v.date_closed),
        ])?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

/// Write rows in the column layout `loader::read_csv` accepts.
pub fn write_source_csv<W: Write>(writer: W, rows: &[&VenueRecord]) -> AnalyticsResult<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SOURCE_HEADERS)?;
    for v in rows {
        wtr.write_record([
            v.entity_id.clone(),
            v.name.clone(),
            v.chain_id.clone(),
            v.chain_name.clone(),
            v.sub_category.clone(),
            v.city.clone(),
            v.state_code.clone(),
            v.state_name.clone(),
            opt(v.dma),
            v.foot_traffic.to_string(),
            v.sales.to_string(),
            v.avg_dwell_time_min.to_string(),
            v.area_sqft.to_string(),
            v.ft_per_sqft().to_string(),
            v.street_address.clone(),
            v.postal_code.clone(),
            opt(v.date_opened),
            opt(v.date_closed),
        ])?;
    }
    wtr.flush()?;
    Ok(rows.len())
}
