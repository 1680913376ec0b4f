//! Facets for the storefront filters and figures for the admin dashboard.

use serde::Serialize;

use super::types::{Proposal, Vehicle};

/// Inclusive lower/upper bound of a numeric attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

/// Everything the filter panel needs to render its controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facets {
    pub makes: Vec<String>,
    pub models: Vec<String>,
    pub years: Vec<u16>,
    pub price: Option<Bounds<u64>>,
    pub year: Option<Bounds<u16>>,
}

impl Facets {
    pub fn from_vehicles(vehicles: &[Vehicle]) -> Self {
        Self {
            makes: unique_makes(vehicles),
            models: unique_models(vehicles),
            years: unique_years(vehicles),
            price: price_range(vehicles),
            year: year_range(vehicles),
        }
    }
}

/// Distinct makes in first-seen order.
pub fn unique_makes(vehicles: &[Vehicle]) -> Vec<String> {
    distinct(vehicles.iter().map(|v| v.make.as_str()))
}

/// Distinct models in first-seen order.
pub fn unique_models(vehicles: &[Vehicle]) -> Vec<String> {
    distinct(vehicles.iter().map(|v| v.model.as_str()))
}

/// Distinct model years, ascending.
pub fn unique_years(vehicles: &[Vehicle]) -> Vec<u16> {
    let mut years: Vec<u16> = vehicles.iter().map(|v| v.year).collect();
    years.sort_unstable();
    years.dedup();
    years
}

pub fn price_range(vehicles: &[Vehicle]) -> Option<Bounds<u64>> {
    bounds(vehicles.iter().map(|v| v.price))
}

pub fn year_range(vehicles: &[Vehicle]) -> Option<Bounds<u16>> {
    bounds(vehicles.iter().map(|v| v.year))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.iter().any(|o| o == v) {
            out.push(v.to_string());
        }
    }
    out
}

fn bounds<T: Ord + Copy>(mut values: impl Iterator<Item = T>) -> Option<Bounds<T>> {
    let first = values.next()?;
    Some(values.fold(Bounds { min: first, max: first }, |b, v| Bounds {
        min: b.min.min(v),
        max: b.max.max(v),
    }))
}

// ─── Dashboard ───────────────────────────────────────────────────

const RECENT_PROPOSALS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_vehicles: usize,
    pub sold_vehicles: usize,
    pub total_proposals: usize,
    pub recent_proposals: Vec<Proposal>,
}

/// A labelled count for the dashboard charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: usize,
}

pub fn dashboard_stats(vehicles: &[Vehicle], proposals: &[Proposal]) -> DashboardStats {
    let mut recent = proposals.to_vec();
    // Newest first; ties keep store order.
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(RECENT_PROPOSALS);

    DashboardStats {
        total_vehicles: vehicles.len(),
        sold_vehicles: vehicles.iter().filter(|v| v.is_sold).count(),
        total_proposals: proposals.len(),
        recent_proposals: recent,
    }
}

/// Sold vehicles per make.
pub fn sales_by_make(vehicles: &[Vehicle]) -> Vec<ChartPoint> {
    tally(vehicles.iter().filter(|v| v.is_sold).map(|v| v.make.as_str()))
}

/// Proposals per vehicle model. Proposals for unknown vehicles are skipped.
pub fn proposals_by_model(vehicles: &[Vehicle], proposals: &[Proposal]) -> Vec<ChartPoint> {
    tally(proposals.iter().filter_map(|p| {
        vehicles
            .iter()
            .find(|v| v.id == p.vehicle_id)
            .map(|v| v.model.as_str())
    }))
}

fn tally<'a>(names: impl Iterator<Item = &'a str>) -> Vec<ChartPoint> {
    let mut out: Vec<ChartPoint> = Vec::new();
    for name in names {
        match out.iter_mut().find(|p| p.name == name) {
            Some(p) => p.value += 1,
            None => out.push(ChartPoint { name: name.to_string(), value: 1 }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample;

    #[test]
    fn test_facets_over_sample() {
        let f = Facets::from_vehicles(&sample::vehicles());
        assert_eq!(f.makes, vec!["Toyota", "Honda", "Volkswagen", "Hyundai", "Chevrolet", "Fiat"]);
        assert_eq!(f.models.len(), 6);
        assert_eq!(f.years, vec![2020, 2021, 2022]);
        assert_eq!(f.price, Some(Bounds { min: 68500, max: 129900 }));
        assert_eq!(f.year, Some(Bounds { min: 2020, max: 2022 }));
    }

    #[test]
    fn test_facets_empty() {
        let f = Facets::from_vehicles(&[]);
        assert!(f.makes.is_empty());
        assert_eq!(f.price, None);
        assert_eq!(f.year, None);
    }

    #[test]
    fn test_unique_makes_dedup() {
        let mut vs = sample::vehicles();
        vs.push(vs[0].clone());
        assert_eq!(unique_makes(&vs).len(), 6);
    }

    #[test]
    fn test_dashboard_stats() {
        let stats = dashboard_stats(&sample::vehicles(), &sample::proposals());
        assert_eq!(stats.total_vehicles, 6);
        assert_eq!(stats.sold_vehicles, 1);
        assert_eq!(stats.total_proposals, 4);
        assert_eq!(stats.recent_proposals.len(), 4);
        assert_eq!(stats.recent_proposals[0].id, "4");
    }

    #[test]
    fn test_recent_proposals_newest_first_capped() {
        let mut ps = sample::proposals();
        for (i, day) in [3, 30, 1].into_iter().enumerate() {
            let mut p = ps[0].clone();
            p.id = (5 + i).to_string();
            p.created_at = format!("2023-08-{day:02}T12:00:00Z").parse().unwrap();
            ps.push(p);
        }
        let stats = dashboard_stats(&sample::vehicles(), &ps);
        let ids: Vec<_> = stats.recent_proposals.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["6", "5", "7", "4", "3"]);
    }

    #[test]
    fn test_sales_by_make() {
        let points = sales_by_make(&sample::vehicles());
        assert_eq!(points, vec![ChartPoint { name: "Volkswagen".into(), value: 1 }]);
    }

    #[test]
    fn test_proposals_by_model() {
        let vs = sample::vehicles();
        let mut ps = sample::proposals();
        let mut extra = ps[0].clone();
        extra.id = "5".into();
        ps.push(extra);
        let mut orphan = ps[0].clone();
        orphan.vehicle_id = "404".into();
        ps.push(orphan);

        let points = proposals_by_model(&vs, &ps);
        assert_eq!(points[0], ChartPoint { name: "Corolla".into(), value: 2 });
        assert_eq!(points.iter().map(|p| p.value).sum::<usize>(), 5);
    }
}
