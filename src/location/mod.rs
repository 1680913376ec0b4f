//! Location cascade for AutoProposta.
//!
//! Provides the state → city → region reference tree, child lookups, and
//! the selection transitions that keep a (state, city, region) triple valid.

pub mod dataset;
pub mod resolver;
pub mod types;

pub use dataset::{builtin_tree, state_display_name};
pub use resolver::LocationResolver;
pub use types::{CascadeError, CityNode, LocationTree, Selection, SelectionStage, StateNode};
