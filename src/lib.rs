//! AutoProposta: vehicle marketplace catalog, location cascade and admin
//! store, with an HTTP API and a CLI on top.

pub mod catalog;
pub mod config;
pub mod location;
pub mod provider;
pub mod server;
pub mod store;
