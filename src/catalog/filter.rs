//! Catalog filter engine.
//!
//! A listing passes a [`FilterSpec`] iff every constrained dimension passes:
//! AND across dimensions, OR inside a multi-value dimension. Filtering is
//! pure, keeps input order and never fails; an unsatisfiable spec simply
//! yields no listings.
//!
//! Loosely typed input (query strings, CLI flags) goes through
//! [`FilterQuery::into_spec`] once, at the boundary.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use super::types::{Transmission, Vehicle};
use crate::location::Selection;

/// Location value meaning "any" in the storefront selects.
pub const ALL: &str = "all";

/// A sparse set of constraints. `None` / empty means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_min: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_max: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub make: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub model: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transmission: Vec<Transmission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

impl FilterSpec {
    /// A spec constraining only the location, taken from a cascade selection.
    pub fn located(selection: &Selection) -> Self {
        Self::default().with_selection(selection)
    }

    /// Replace the location constraints with the given selection.
    pub fn with_selection(mut self, selection: &Selection) -> Self {
        self.state = non_blank(&selection.state);
        self.city = non_blank(&selection.city);
        self.region = non_blank(&selection.region);
        self
    }

    /// True when no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        location_constraint(&self.state).is_none()
            && location_constraint(&self.city).is_none()
            && location_constraint(&self.region).is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.year_min.is_none()
            && self.year_max.is_none()
            && self.make.is_empty()
            && self.model.is_empty()
            && self.transmission.is_empty()
            && search_constraint(&self.search_term).is_none()
    }

    /// Test a single listing.
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        Matcher::new(self).matches(vehicle)
    }
}

/// Return the listings that pass `spec`, in input order.
pub fn filter(listings: &[Vehicle], spec: &FilterSpec) -> Vec<Vehicle> {
    let matcher = Matcher::new(spec);
    listings
        .iter()
        .filter(|v| matcher.matches(v))
        .cloned()
        .collect()
}

/// A spec with its search term lowered once per filter call.
struct Matcher<'a> {
    spec: &'a FilterSpec,
    term: Option<String>,
}

impl<'a> Matcher<'a> {
    fn new(spec: &'a FilterSpec) -> Self {
        Self {
            spec,
            term: search_constraint(&spec.search_term).map(str::to_lowercase),
        }
    }

    fn matches(&self, v: &Vehicle) -> bool {
        let s = self.spec;
        location_matches(&s.state, &v.location.state)
            && location_matches(&s.city, &v.location.city)
            && location_matches(&s.region, &v.location.region)
            && within(v.price, s.price_min, s.price_max)
            && within(v.year, s.year_min, s.year_max)
            && member(&s.make, &v.make)
            && member(&s.model, &v.model)
            && member(&s.transmission, &v.transmission)
            && self.search_matches(v)
    }

    fn search_matches(&self, v: &Vehicle) -> bool {
        match &self.term {
            None => true,
            Some(term) => {
                v.make.to_lowercase().contains(term.as_str())
                    || v.model.to_lowercase().contains(term.as_str())
            }
        }
    }
}

fn location_constraint(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty() && *s != ALL)
}

fn search_constraint(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn location_matches(wanted: &Option<String>, actual: &str) -> bool {
    location_constraint(wanted).map_or(true, |w| w == actual)
}

fn within<T: PartialOrd + Copy>(value: T, min: Option<T>, max: Option<T>) -> bool {
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}

fn member<T: PartialEq + ?Sized, U: PartialEq<T>>(set: &[U], value: &T) -> bool {
    set.is_empty() || set.iter().any(|x| x == value)
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() || s == ALL {
        None
    } else {
        Some(s.to_string())
    }
}

// ─── Boundary input ──────────────────────────────────────────────

/// Filter input rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unknown transmission '{0}', expected 'manual' or 'automatic'")]
    UnknownTransmission(String),

    #[error("{field} must be a whole number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// Loosely typed filter input as it arrives from a query string or CLI.
///
/// List dimensions are comma separated (`make=Honda,Fiat`). Numbers arrive
/// as text so that an empty form field (`priceMin=`) means "unset".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterQuery {
    pub state: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub year_min: Option<String>,
    pub year_max: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub transmission: Option<String>,
    #[serde(alias = "searchTerm")]
    pub q: Option<String>,
}

impl FilterQuery {
    pub fn into_spec(self) -> Result<FilterSpec, FilterError> {
        let transmission = split_list(self.transmission.as_deref())
            .into_iter()
            .map(|t| t.parse::<Transmission>().map_err(FilterError::UnknownTransmission))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FilterSpec {
            state: self.state.as_deref().and_then(non_blank),
            city: self.city.as_deref().and_then(non_blank),
            region: self.region.as_deref().and_then(non_blank),
            price_min: number("priceMin", self.price_min.as_deref())?,
            price_max: number("priceMax", self.price_max.as_deref())?,
            year_min: number("yearMin", self.year_min.as_deref())?,
            year_max: number("yearMax", self.year_max.as_deref())?,
            make: split_list(self.make.as_deref()),
            model: split_list(self.model.as_deref()),
            transmission,
            search_term: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
        })
    }
}

fn number<T: FromStr>(field: &'static str, raw: Option<&str>) -> Result<Option<T>, FilterError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| FilterError::InvalidNumber {
            field,
            value: v.to_string(),
        }),
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample;
    use crate::catalog::types::VehicleLocation;

    fn listing(id: &str, make: &str, price: u64, year: u16, state: &str) -> Vehicle {
        let mut v = sample::vehicles()[0].clone();
        v.id = id.into();
        v.make = make.into();
        v.model = format!("{make} model");
        v.price = price;
        v.year = year;
        v.location = VehicleLocation {
            state: state.into(),
            city: String::new(),
            region: String::new(),
        };
        v
    }

    fn ids(vs: &[Vehicle]) -> Vec<&str> {
        vs.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let all = sample::vehicles();
        assert_eq!(filter(&all, &FilterSpec::default()), all);
        assert!(FilterSpec::default().is_empty());
    }

    #[test]
    fn test_empty_listings() {
        let spec = FilterSpec { state: Some("SP".into()), ..Default::default() };
        assert!(filter(&[], &spec).is_empty());
    }

    #[test]
    fn test_state_only() {
        let listings = vec![
            listing("1", "Toyota", 105900, 2021, "SP"),
            listing("2", "Honda", 129900, 2022, "RJ"),
        ];
        let spec = FilterSpec { state: Some("SP".into()), ..Default::default() };
        let out = filter(&listings, &spec);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].make, "Toyota");
    }

    #[test]
    fn test_all_sentinel_is_unconstrained() {
        let all = sample::vehicles();
        let spec = FilterSpec {
            state: Some(ALL.into()),
            city: Some(ALL.into()),
            region: Some(String::new()),
            ..Default::default()
        };
        assert!(spec.is_empty());
        assert_eq!(filter(&all, &spec).len(), all.len());
    }

    #[test]
    fn test_make_set_and_transmission() {
        let spec = FilterSpec {
            make: vec!["Honda".into(), "Fiat".into()],
            transmission: vec![Transmission::Automatic],
            ..Default::default()
        };
        let out = filter(&sample::vehicles(), &spec);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].make, "Honda");
        assert_eq!(out[0].model, "Civic");
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let spec = FilterSpec {
            price_min: Some(100_000),
            price_max: Some(50_000),
            ..Default::default()
        };
        assert!(filter(&sample::vehicles(), &spec).is_empty());
    }

    #[test]
    fn test_ranges_are_inclusive() {
        let spec = FilterSpec {
            price_min: Some(68500),
            price_max: Some(79900),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&sample::vehicles(), &spec)), vec!["4", "5", "6"]);

        let spec = FilterSpec {
            year_min: Some(2022),
            year_max: Some(2022),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&sample::vehicles(), &spec)), vec!["2", "5"]);
    }

    #[test]
    fn test_unknown_set_member_filters_everything() {
        let spec = FilterSpec { model: vec!["Beetle".into()], ..Default::default() };
        assert!(filter(&sample::vehicles(), &spec).is_empty());
    }

    #[test]
    fn test_search_term_make_or_model_case_insensitive() {
        let spec = FilterSpec { search_term: Some("GOL".into()), ..Default::default() };
        assert_eq!(ids(&filter(&sample::vehicles(), &spec)), vec!["3"]);

        let spec = FilterSpec { search_term: Some("on".into()), ..Default::default() };
        // hONda, ONix
        assert_eq!(ids(&filter(&sample::vehicles(), &spec)), vec!["2", "5"]);
    }

    #[test]
    fn test_order_preserved_and_subset() {
        let all = sample::vehicles();
        let spec = FilterSpec { state: Some("SP".into()), ..Default::default() };
        let out = filter(&all, &spec);
        assert_eq!(ids(&out), vec!["1", "3", "5"]);
        assert!(out.iter().all(|v| all.contains(v)));
    }

    #[test]
    fn test_idempotent() {
        let all = sample::vehicles();
        let spec = FilterSpec {
            state: Some("RJ".into()),
            price_max: Some(130_000),
            ..Default::default()
        };
        let once = filter(&all, &spec);
        assert_eq!(filter(&once, &spec), once);
    }

    #[test]
    fn test_located_from_selection() {
        let sel = Selection {
            state: "SP".into(),
            city: "São Paulo".into(),
            region: String::new(),
        };
        let spec = FilterSpec::located(&sel);
        assert_eq!(spec.region, None);
        assert_eq!(ids(&filter(&sample::vehicles(), &spec)), vec!["1", "5"]);
    }

    #[test]
    fn test_query_into_spec() {
        let q = FilterQuery {
            state: Some("all".into()),
            city: Some("  ".into()),
            make: Some("Honda, Fiat,".into()),
            transmission: Some("automatic".into()),
            q: Some(String::new()),
            ..Default::default()
        };
        let spec = q.into_spec().unwrap();
        assert_eq!(spec.state, None);
        assert_eq!(spec.city, None);
        assert_eq!(spec.make, vec!["Honda".to_string(), "Fiat".to_string()]);
        assert_eq!(spec.transmission, vec![Transmission::Automatic]);
        assert_eq!(spec.search_term, None);
    }

    #[test]
    fn test_query_blank_fields_are_unset() {
        let q = FilterQuery {
            price_min: Some(String::new()),
            price_max: Some(" 90000 ".into()),
            year_max: Some("  ".into()),
            q: Some("   ".into()),
            ..Default::default()
        };
        let spec = q.into_spec().unwrap();
        assert_eq!(spec.price_min, None);
        assert_eq!(spec.price_max, Some(90000));
        assert_eq!(spec.year_max, None);
        assert_eq!(spec.search_term, None);

        let q = FilterQuery { q: Some("  civic ".into()), ..Default::default() };
        assert_eq!(q.into_spec().unwrap().search_term.as_deref(), Some("civic"));
    }

    #[test]
    fn test_query_rejects_non_numeric_bounds() {
        let q = FilterQuery { year_min: Some("2020a".into()), ..Default::default() };
        assert_eq!(
            q.into_spec(),
            Err(FilterError::InvalidNumber { field: "yearMin", value: "2020a".into() })
        );
        let q = FilterQuery { year_max: Some("70000".into()), ..Default::default() };
        assert!(matches!(q.into_spec(), Err(FilterError::InvalidNumber { field: "yearMax", .. })));
    }

    #[test]
    fn test_query_rejects_unknown_transmission() {
        let q = FilterQuery { transmission: Some("manual,cvt".into()), ..Default::default() };
        assert_eq!(q.into_spec(), Err(FilterError::UnknownTransmission("cvt".into())));
    }

    #[test]
    fn test_spec_deserializes_camel_case() {
        let spec: FilterSpec =
            serde_json::from_str(r#"{"priceMin": 70000, "make": ["Fiat"], "searchTerm": "arg"}"#).unwrap();
        assert_eq!(spec.price_min, Some(70000));
        assert_eq!(ids(&filter(&sample::vehicles(), &spec)), Vec::<&str>::new());
        let spec = FilterSpec { price_min: Some(60000), ..spec };
        assert_eq!(ids(&filter(&sample::vehicles(), &spec)), vec!["6"]);
    }
}
