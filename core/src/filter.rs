//! Filter definitions and predicate matching.
//!
//! `FilterParams` is the loosely-typed shape a caller sends (strings from a
//! query string or CLI flags). `VenueFilter` is the validated form the engine
//! works with: every field is optional and an absent field imposes no
//! constraint. Present predicates are AND-ed together.

use crate::{
    config::{SearchField, StateField},
    error::{AnalyticsError, AnalyticsResult},
    types::DmaCode,
    venue::VenueRecord,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueFilter {
    pub chain_name: Option<String>,
    pub dma: Option<DmaCode>,
    pub sub_category: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub is_open: Option<bool>,
    pub search: Option<String>,
}

/// Raw filter values as received at the boundary, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterParams {
    pub chain_name: Option<String>,
    pub dma: Option<String>,
    pub sub_category: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub is_open: Option<String>,
    pub search: Option<String>,
}

impl TryFrom<FilterParams> for VenueFilter {
    type Error = AnalyticsError;

    fn try_from(p: FilterParams) -> AnalyticsResult<Self> {
        let dma = match non_empty(p.dma) {
            Some(raw) => Some(raw.trim().parse::<DmaCode>().map_err(|_| {
                AnalyticsError::validation("dma", format!("expected an integer, got '{raw}'"))
            })?),
            None => None,
        };
        let is_open = match non_empty(p.is_open) {
            Some(raw) => Some(parse_bool(&raw)?),
            None => None,
        };
        Ok(VenueFilter {
            chain_name: p.chain_name,
            dma,
            sub_category: p.sub_category,
            city: p.city,
            state_code: p.state_code,
            is_open,
            search: p.search,
        }
        .normalized())
    }
}

fn parse_bool(raw: &str) -> AnalyticsResult<bool> {
    match raw.trim() {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        other => Err(AnalyticsError::validation(
            "is_open",
            format!("expected true or false, got '{other}'"),
        )),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl VenueFilter {
    /// Drop empty and whitespace-only strings so they read as "no constraint",
    /// and trim the search term.
    pub fn normalized(self) -> Self {
        VenueFilter {
            chain_name: non_empty(self.chain_name),
            dma: self.dma,
            sub_category: non_empty(self.sub_category),
            city: non_empty(self.city),
            state_code: non_empty(self.state_code),
            is_open: self.is_open,
            search: non_empty(self.search).map(|s| s.trim().to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == VenueFilter::default()
    }

    pub fn chain(mut self, chain_name: impl Into<String>) -> Self {
        self.chain_name = Some(chain_name.into());
        self
    }

    pub fn in_dma(mut self, dma: DmaCode) -> Self {
        self.dma = Some(dma);
        self
    }

    pub fn category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = Some(sub_category.into());
        self
    }

    pub fn in_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn in_state(mut self, state: impl Into<String>) -> Self {
        self.state_code = Some(state.into());
        self
    }

    pub fn open(mut self, is_open: bool) -> Self {
        self.is_open = Some(is_open);
        self
    }

    pub fn searching(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }
}

/// A filter prepared for repeated evaluation: normalised once, with the
/// search term lower-cased up front.
pub struct FilterMatcher<'a> {
    filter: VenueFilter,
    search_lower: Option<String>,
    state_field: StateField,
    search_fields: &'a [SearchField],
}

impl<'a> FilterMatcher<'a> {
    pub fn new(
        filter: &VenueFilter,
        state_field: StateField,
        search_fields: &'a [SearchField],
    ) -> Self {
        let filter = filter.clone().normalized();
        let search_lower = filter.search.as_ref().map(|s| s.to_lowercase());
        Self {
            filter,
            search_lower,
            state_field,
            search_fields,
        }
    }

    pub fn matches(&self, venue: &VenueRecord) -> bool {
        let f = &self.filter;

        if let Some(chain) = &f.chain_name {
            if venue.chain_name != *chain {
                return false;
            }
        }
        if let Some(dma) = f.dma {
            if venue.dma != Some(dma) {
                return false;
            }
        }
        if let Some(category) = &f.sub_category {
            if venue.sub_category != *category {
                return false;
            }
        }
        if let Some(city) = &f.city {
            if venue.city != *city {
                return false;
            }
        }
        if let Some(state) = &f.state_code {
            if self.state_field.value(venue) != state.as_str() {
                return false;
            }
        }
        if let Some(is_open) = f.is_open {
            if venue.is_open != is_open {
                return false;
            }
        }
        if let Some(term) = &self.search_lower {
            return self
                .search_fields
                .iter()
                .any(|field| field.value(venue).to_lowercase().contains(term.as_str()));
        }
        true
    }

    /// Matching rows in load order.
    pub fn apply<'v>(&self, venues: &'v [VenueRecord]) -> Vec<&'v VenueRecord> {
        venues.iter().filter(|v| self.matches(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_params_are_treated_as_absent() {
        let params = FilterParams {
            chain_name: Some("".into()),
            city: Some("   ".into()),
            dma: Some("".into()),
            is_open: Some(" ".into()),
            search: Some("  ".into()),
            ..Default::default()
        };
        let filter = VenueFilter::try_from(params).unwrap();
        assert!(filter.is_empty(), "blank values must not constrain: {filter:?}");
    }

    #[test]
    fn malformed_dma_is_rejected() {
        let params = FilterParams { dma: Some("five".into()), ..Default::default() };
        let err = VenueFilter::try_from(params).unwrap_err();
        assert!(
            matches!(err, AnalyticsError::Validation { field: "dma", .. }),
            "expected dma validation error, got {err:?}"
        );
    }

    #[test]
    fn malformed_is_open_is_rejected() {
        let params = FilterParams { is_open: Some("yes".into()), ..Default::default() };
        let err = VenueFilter::try_from(params).unwrap_err();
        assert!(matches!(err, AnalyticsError::Validation { field: "is_open", .. }));
    }

    #[test]
    fn well_typed_params_are_parsed() {
        let params = FilterParams {
            dma: Some(" 501 ".into()),
            is_open: Some("false".into()),
            search: Some("  target ".into()),
            ..Default::default()
        };
        let filter = VenueFilter::try_from(params).unwrap();
        assert_eq!(filter.dma, Some(501));
        assert_eq!(filter.is_open, Some(false));
        assert_eq!(filter.search.as_deref(), Some("target"));
    }
}
