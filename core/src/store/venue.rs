use super::VenueStore;
use crate::{
    error::{AnalyticsError, AnalyticsResult},
    venue::VenueRecord,
};
use rusqlite::params;

const VENUE_COLUMNS: &str = "entity_id, name, chain_id, chain_name, sub_category, city,
    state_code, state_name, dma, foot_traffic, sales, avg_dwell_time_min, area_sqft,
    street_address, postal_code, is_open, date_opened, date_closed";

fn venue_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<VenueRecord> {
    Ok(VenueRecord {
        entity_id: row.get(0)?,
        name: row.get(1)?,
        chain_id: row.get(2)?,
        chain_name: row.get(3)?,
        sub_category: row.get(4)?,
        city: row.get(5)?,
        state_code: row.get(6)?,
        state_name: row.get(7)?,
        dma: row.get(8)?,
        foot_traffic: {
            let raw: i64 = row.get(9)?;
            u64::try_from(raw).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(9, raw))?
        },
        sales: row.get(10)?,
        avg_dwell_time_min: row.get(11)?,
        area_sqft: row.get(12)?,
        street_address: row.get(13)?,
        postal_code: row.get(14)?,
        is_open: row.get::<_, i32>(15)? != 0,
        date_opened: row.get(16)?,
        date_closed: row.get(17)?,
    })
}

impl VenueStore {
    // ── Venue ──────────────────────────────────────────────────────

    /// Insert a batch of venues in one transaction. Either all rows land or
    /// none do; a row the schema cannot represent rejects the whole batch.
    pub fn insert_venues(&self, venues: &[VenueRecord]) -> AnalyticsResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO venue ({VENUE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
            ))?;
            for (idx, v) in venues.iter().enumerate() {
                let foot_traffic = i64::try_from(v.foot_traffic).map_err(|_| {
                    AnalyticsError::InvalidRecord {
                        row: idx + 1,
                        reason: format!("foot_traffic {} is out of range", v.foot_traffic),
                    }
                })?;
                stmt.execute(params![
                    &v.entity_id,
                    &v.name,
                    &v.chain_id,
                    &v.chain_name,
                    &v.sub_category,
                    &v.city,
                    &v.state_code,
                    &v.state_name,
                    v.dma,
                    foot_traffic,
                    v.sales,
                    v.avg_dwell_time_min,
                    v.area_sqft,
                    &v.street_address,
                    &v.postal_code,
                    if v.is_open { 1i32 } else { 0i32 },
                    v.date_opened,
                    v.date_closed,
                ])?;
            }
        }
        tx.commit()?;
        Ok(venues.len())
    }

    /// Remove every venue row. Used when a load replaces the dataset.
    pub fn clear_venues(&self) -> AnalyticsResult<()> {
        self.conn.execute("DELETE FROM venue", [])?;
        Ok(())
    }

    pub fn venue_count(&self) -> AnalyticsResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM venue", [], |row| row.get(0))
            .map_err(Into::into)
    }

    /// Every venue, in the order it was loaded.
    pub fn all_venues(&self) -> AnalyticsResult<Vec<VenueRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {VENUE_COLUMNS} FROM venue ORDER BY load_seq ASC"))?;
        let rows = stmt.query_map([], venue_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
