//! Core types for the location cascade.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A city and its ordered regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityNode {
    pub name: String,
    pub regions: Vec<String>,
}

/// A state, keyed by its two-letter abbreviation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateNode {
    pub name: String,
    pub abbreviation: String,
    pub cities: Vec<CityNode>,
}

/// Ordered State → City → Region hierarchy. Read-only reference data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationTree {
    pub states: Vec<StateNode>,
}

/// The (state, city, region) triple picked in the cascade. Empty = unset.
///
/// Invariant: a non-empty city belongs to the state, a non-empty region
/// belongs to the city. Only the transitions in `resolver` produce values
/// that are guaranteed to hold it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub state: String,
    pub city: String,
    pub region: String,
}

/// How far down the cascade a selection reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStage {
    NoSelection,
    StateOnly,
    StateAndCity,
    FullySelected,
}

impl fmt::Display for SelectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSelection => write!(f, "no selection"),
            Self::StateOnly => write!(f, "state"),
            Self::StateAndCity => write!(f, "state + city"),
            Self::FullySelected => write!(f, "state + city + region"),
        }
    }
}

/// A rejected cascade transition. The selection is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CascadeError {
    #[error("unknown state '{0}'")]
    UnknownState(String),
    #[error("a state must be selected before a city")]
    NoState,
    #[error("a city must be selected before a region")]
    NoCity,
    #[error("city '{city}' is not in state '{state}'")]
    CityNotInState { state: String, city: String },
    #[error("region '{region}' is not in city '{city}'")]
    RegionNotInCity { city: String, region: String },
}
