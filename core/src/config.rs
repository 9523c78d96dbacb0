use crate::venue::VenueRecord;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which venue column the `state_code` filter and the "states" picker target.
///
/// The source dataset carries both a code and a full name; which one callers
/// send depends on the upstream feed, so it is configured rather than fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    #[default]
    Code,
    Name,
}

impl StateField {
    pub fn value<'a>(&self, venue: &'a VenueRecord) -> &'a str {
        match self {
            StateField::Code => &venue.state_code,
            StateField::Name => &venue.state_name,
        }
    }
}

/// Text columns that free-text search and autocomplete look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Name,
    ChainName,
    City,
    StreetAddress,
    StateName,
    StateCode,
}

impl SearchField {
    pub fn value<'a>(&self, venue: &'a VenueRecord) -> &'a str {
        match self {
            SearchField::Name          => &venue.name,
            SearchField::ChainName     => &venue.chain_name,
            SearchField::City          => &venue.city,
            SearchField::StreetAddress => &venue.street_address,
            SearchField::StateName     => &venue.state_name,
            SearchField::StateCode     => &venue.state_code,
        }
    }
}

impl FromStr for SearchField {
    type Err = crate::error::AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name"                       => Ok(SearchField::Name),
            "chain" | "chain_name"       => Ok(SearchField::ChainName),
            "city"                       => Ok(SearchField::City),
            "address" | "street_address" => Ok(SearchField::StreetAddress),
            "state" | "state_name"       => Ok(SearchField::StateName),
            "state_code"                 => Ok(SearchField::StateCode),
            other => Err(crate::error::AnalyticsError::validation(
                "field",
                format!("unknown search field '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub autocomplete_min_length: usize,
    pub autocomplete_limit: usize,
    pub state_field: StateField,
    pub search_fields: Vec<SearchField>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            autocomplete_min_length: 2,
            autocomplete_limit: 10,
            state_field: StateField::Code,
            search_fields: vec![
                SearchField::Name,
                SearchField::ChainName,
                SearchField::City,
                SearchField::StreetAddress,
            ],
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file. Missing keys fall back to the defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.max_page_size == 0 {
            anyhow::bail!("max_page_size must be at least 1");
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            anyhow::bail!(
                "default_page_size must be in 1..={}, got {}",
                self.max_page_size,
                self.default_page_size
            );
        }
        if self.search_fields.is_empty() {
            anyhow::bail!("search_fields must name at least one field");
        }
        Ok(())
    }
}
