//! Free-text search for the admin tables.
//!
//! A blank term returns everything. Matching is case-insensitive substring,
//! except phone numbers which match verbatim.

use super::types::{Dealer, Proposal, ProposalStatus, Vehicle};

fn needle(term: &str) -> Option<String> {
    let t = term.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_lowercase())
    }
}

fn has(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Match make, model or model year.
pub fn search_vehicles(vehicles: &[Vehicle], term: &str) -> Vec<Vehicle> {
    let Some(n) = needle(term) else {
        return vehicles.to_vec();
    };
    vehicles
        .iter()
        .filter(|v| has(&v.make, &n) || has(&v.model, &n) || v.year.to_string().contains(&n))
        .cloned()
        .collect()
}

pub fn search_dealers(dealers: &[Dealer], term: &str) -> Vec<Dealer> {
    let Some(n) = needle(term) else {
        return dealers.to_vec();
    };
    let raw = term.trim();
    dealers
        .iter()
        .filter(|d| {
            has(&d.name, &n)
                || has(&d.email, &n)
                || d.phone.contains(raw)
                || has(&d.city, &n)
                || has(&d.state, &n)
        })
        .cloned()
        .collect()
}

/// Text search over customer name, email and message, then an optional
/// exact status filter. Both are applied in the same pass.
pub fn search_proposals(
    proposals: &[Proposal],
    term: &str,
    status: Option<ProposalStatus>,
) -> Vec<Proposal> {
    let n = needle(term);
    proposals
        .iter()
        .filter(|p| {
            n.as_deref().map_or(true, |n| {
                has(&p.customer_name, n) || has(&p.customer_email, n) || has(&p.message, n)
            })
        })
        .filter(|p| status.map_or(true, |s| p.status == s))
        .cloned()
        .collect()
}
