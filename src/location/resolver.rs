//! Location cascade resolver: child lookups and selection transitions.
//!
//! Lookups:   state code → cities → regions, in dataset order.
//! Cascade:   changing the state clears city and region; changing the city
//!            clears region. Unknown children are rejected, not stored.

use super::dataset;
use super::types::{CascadeError, CityNode, LocationTree, Selection, SelectionStage, StateNode};
use crate::catalog::ALL;

impl LocationTree {
    pub fn state(&self, code: &str) -> Option<&StateNode> {
        if code.is_empty() {
            return None;
        }
        self.states.iter().find(|s| s.abbreviation == code)
    }

    pub fn city(&self, state_code: &str, city: &str) -> Option<&CityNode> {
        if city.is_empty() {
            return None;
        }
        self.state(state_code)?.cities.iter().find(|c| c.name == city)
    }

    /// City names of a state. Empty for a blank or unknown code.
    pub fn cities_for(&self, state_code: &str) -> Vec<&str> {
        self.state(state_code)
            .map(|s| s.cities.iter().map(|c| c.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Region names of a city. Empty when either key is blank or the path
    /// does not exist.
    pub fn regions_for(&self, state_code: &str, city: &str) -> Vec<&str> {
        self.city(state_code, city)
            .map(|c| c.regions.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn has_region(&self, state_code: &str, city: &str, region: &str) -> bool {
        self.city(state_code, city)
            .is_some_and(|c| c.regions.iter().any(|r| r == region))
    }
}

impl Selection {
    pub fn new(state: &str, city: &str, region: &str) -> Self {
        Self {
            state: state.to_string(),
            city: city.to_string(),
            region: region.to_string(),
        }
    }

    /// Stage from which fields are filled. Does not check tree membership.
    pub fn stage(&self) -> SelectionStage {
        match (self.state.is_empty(), self.city.is_empty(), self.region.is_empty()) {
            (true, _, _) => SelectionStage::NoSelection,
            (false, true, _) => SelectionStage::StateOnly,
            (false, false, true) => SelectionStage::StateAndCity,
            (false, false, false) => SelectionStage::FullySelected,
        }
    }
}

/// Owns the location tree and enforces the selection invariant.
pub struct LocationResolver {
    tree: LocationTree,
}

impl LocationResolver {
    pub fn new(tree: LocationTree) -> Self {
        Self { tree }
    }

    /// Resolver over the built-in SP / RJ / MG dataset.
    pub fn builtin() -> Self {
        Self::new(dataset::builtin_tree())
    }

    pub fn tree(&self) -> &LocationTree {
        &self.tree
    }

    pub fn cities_for(&self, state_code: &str) -> Vec<&str> {
        self.tree.cities_for(state_code)
    }

    pub fn regions_for(&self, state_code: &str, city: &str) -> Vec<&str> {
        self.tree.regions_for(state_code, city)
    }

    /// Select a state. Blank or `"all"` clears the whole selection; a
    /// different state clears city and region; the same state keeps the
    /// valid part of the current children.
    ///
    /// Every transition repairs `current` with [`Self::normalize`] first, so
    /// the result holds the invariant whatever the caller passed in.
    pub fn set_state(&self, current: &Selection, code: &str) -> Result<Selection, CascadeError> {
        let code = code.trim();
        if code.is_empty() || code == ALL {
            return Ok(Selection::default());
        }
        if self.tree.state(code).is_none() {
            return Err(CascadeError::UnknownState(code.to_string()));
        }
        let current = self.normalize(current);
        if code == current.state {
            return Ok(current);
        }
        Ok(Selection::new(code, "", ""))
    }

    /// Select a city of the current state. Blank or `"all"` clears city and
    /// region; a different city clears region.
    pub fn set_city(&self, current: &Selection, city: &str) -> Result<Selection, CascadeError> {
        let city = city.trim();
        let current = self.normalize(current);
        if current.state.is_empty() {
            return Err(CascadeError::NoState);
        }
        if city.is_empty() || city == ALL {
            return Ok(Selection::new(&current.state, "", ""));
        }
        if city == current.city {
            return Ok(current);
        }
        if self.tree.city(&current.state, city).is_none() {
            return Err(CascadeError::CityNotInState {
                state: current.state,
                city: city.to_string(),
            });
        }
        Ok(Selection::new(&current.state, city, ""))
    }

    /// Select a region of the current city. Blank or `"all"` clears it.
    pub fn set_region(&self, current: &Selection, region: &str) -> Result<Selection, CascadeError> {
        let region = region.trim();
        let current = self.normalize(current);
        if current.city.is_empty() {
            return Err(CascadeError::NoCity);
        }
        if region.is_empty() || region == ALL {
            return Ok(Selection::new(&current.state, &current.city, ""));
        }
        if !self.tree.has_region(&current.state, &current.city, region) {
            return Err(CascadeError::RegionNotInCity {
                city: current.city,
                region: region.to_string(),
            });
        }
        Ok(Selection::new(&current.state, &current.city, region))
    }

    /// Repair an arbitrary selection: keep the longest valid prefix and
    /// clear everything below the first level that is not in the tree.
    pub fn normalize(&self, selection: &Selection) -> Selection {
        let Some(state) = self.tree.state(&selection.state) else {
            return Selection::default();
        };
        let Some(city) = self.tree.city(&state.abbreviation, &selection.city) else {
            return Selection::new(&state.abbreviation, "", "");
        };
        let region = if city.regions.iter().any(|r| *r == selection.region) {
            selection.region.as_str()
        } else {
            ""
        };
        Selection::new(&state.abbreviation, &city.name, region)
    }

    /// True when every filled level belongs to the one above it.
    pub fn is_consistent(&self, selection: &Selection) -> bool {
        self.normalize(selection) == *selection
    }
}
