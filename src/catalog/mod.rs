//! Vehicle catalog: records, the filter engine, facets and admin search.

pub mod facets;
pub mod filter;
pub mod sample;
pub mod search;
pub mod types;

pub use facets::{dashboard_stats, proposals_by_model, sales_by_make, Bounds, ChartPoint, DashboardStats, Facets};
pub use filter::{filter, FilterError, FilterQuery, FilterSpec, ALL};
pub use search::{search_dealers, search_proposals, search_vehicles};
pub use types::{format_price, Dealer, Proposal, ProposalStatus, Record, Transmission, Vehicle, VehicleLocation};
