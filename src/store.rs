//! In-memory admin store: CRUD over vehicles, dealers and proposals.
//!
//! Ids are `max(numeric id) + 1`. Vehicle locations go through the cascade
//! resolver, so a stored vehicle never carries a city outside its state or
//! a region outside its city.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::catalog::{Dealer, Proposal, ProposalStatus, Record, Transmission, Vehicle, VehicleLocation};
use crate::location::{CascadeError, LocationResolver, Selection};
use crate::provider::{DataProvider, Dataset, ProviderError};

const PLACEHOLDER_IMAGE: &str = "/images/placeholder.jpg";

/// Admin store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("invalid location: {0}")]
    Location(#[from] CascadeError),

    #[error("vehicle '{0}' is sold and no longer accepts proposals")]
    VehicleSold(String),

    #[error("dealer '{id}' still has {vehicles} vehicle(s)")]
    DealerInUse { id: String, vehicles: usize },

    #[error("no {0} id left to allocate")]
    IdsExhausted(&'static str),
}

fn not_found(kind: &'static str, id: &str) -> StoreError {
    StoreError::NotFound { kind, id: id.to_string() }
}

fn invalid(field: &'static str, reason: &str) -> StoreError {
    StoreError::Invalid { field, reason: reason.to_string() }
}

/// Vehicle fields editable from the admin form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleForm {
    pub make: String,
    pub model: String,
    /// Defaults to the current year.
    pub year: Option<u16>,
    pub price: u64,
    /// Defaults to manual.
    pub transmission: Option<Transmission>,
    pub location: VehicleLocation,
    pub color: String,
    pub mileage: u32,
    /// Defaults to "Flex".
    pub fuel_type: String,
    pub is_sold: bool,
    pub dealer_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DealerForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub state: String,
}

/// The public contact form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProposalForm {
    pub vehicle_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub message: String,
}

/// A proposal joined with the vehicle it refers to, if that still exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDetail {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub vehicle: Option<Vehicle>,
}

pub struct Store {
    data: Dataset,
    resolver: Arc<LocationResolver>,
}

impl Store {
    pub fn new(data: Dataset, resolver: Arc<LocationResolver>) -> Self {
        Self { data, resolver }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.data.vehicles
    }

    pub fn dealers(&self) -> &[Dealer] {
        &self.data.dealers
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.data.proposals
    }

    pub fn vehicle(&self, id: &str) -> Result<&Vehicle, StoreError> {
        self.data.vehicles.iter().find(|v| v.id == id).ok_or_else(|| not_found("vehicle", id))
    }

    pub fn dealer(&self, id: &str) -> Result<&Dealer, StoreError> {
        self.data.dealers.iter().find(|d| d.id == id).ok_or_else(|| not_found("dealer", id))
    }

    pub fn proposal(&self, id: &str) -> Result<&Proposal, StoreError> {
        self.data.proposals.iter().find(|p| p.id == id).ok_or_else(|| not_found("proposal", id))
    }

    // ─── Vehicles ────────────────────────────────────────────────

    pub fn create_vehicle(&mut self, form: VehicleForm) -> Result<Vehicle, StoreError> {
        let mut vehicle = Vehicle {
            id: next_id(&self.data.vehicles)?,
            make: String::new(),
            model: String::new(),
            year: 0,
            price: 0,
            images: vec![PLACEHOLDER_IMAGE.to_string()],
            main_image: PLACEHOLDER_IMAGE.to_string(),
            transmission: Transmission::Manual,
            location: VehicleLocation::default(),
            color: String::new(),
            mileage: 0,
            fuel_type: String::new(),
            is_sold: false,
            created_at: Utc::now(),
            dealer_id: String::new(),
        };
        self.apply_vehicle_form(&mut vehicle, form)?;
        info!(id = %vehicle.id, title = %vehicle.title(), "vehicle created");
        self.data.vehicles.push(vehicle.clone());
        Ok(vehicle)
    }

    /// Replace the editable fields of a vehicle. Id, images and creation
    /// time are kept.
    pub fn update_vehicle(&mut self, id: &str, form: VehicleForm) -> Result<Vehicle, StoreError> {
        let mut updated = self.vehicle(id)?.clone();
        self.apply_vehicle_form(&mut updated, form)?;
        if let Some(slot) = self.data.vehicles.iter_mut().find(|v| v.id == id) {
            *slot = updated.clone();
        }
        info!(id, "vehicle updated");
        Ok(updated)
    }

    pub fn delete_vehicle(&mut self, id: &str) -> Result<Vehicle, StoreError> {
        let pos = position(&self.data.vehicles, id).ok_or_else(|| not_found("vehicle", id))?;
        info!(id, "vehicle deleted");
        Ok(self.data.vehicles.remove(pos))
    }

    fn apply_vehicle_form(&self, v: &mut Vehicle, form: VehicleForm) -> Result<(), StoreError> {
        let make = required("make", &form.make)?;
        let model = required("model", &form.model)?;
        if form.price == 0 {
            return Err(invalid("price", "must be greater than zero"));
        }
        let dealer_id = form.dealer_id.trim();
        if !dealer_id.is_empty() {
            self.dealer(dealer_id)?;
        }

        v.location = self.checked_location(&form.location)?;
        v.make = make;
        v.model = model;
        v.year = form.year.unwrap_or_else(current_year);
        v.price = form.price;
        v.transmission = form.transmission.unwrap_or(Transmission::Manual);
        v.color = form.color.trim().to_string();
        v.mileage = form.mileage;
        v.fuel_type = match form.fuel_type.trim() {
            "" => "Flex".to_string(),
            f => f.to_string(),
        };
        v.is_sold = form.is_sold;
        v.dealer_id = dealer_id.to_string();
        Ok(())
    }

    /// Walk the cascade level by level so an inconsistent location is
    /// rejected with the transition that failed.
    fn checked_location(&self, loc: &VehicleLocation) -> Result<VehicleLocation, StoreError> {
        let r = &self.resolver;
        let mut sel = r.set_state(&Selection::default(), &loc.state)?;
        if !loc.city.trim().is_empty() {
            sel = r.set_city(&sel, &loc.city)?;
        }
        if !loc.region.trim().is_empty() {
            sel = r.set_region(&sel, &loc.region)?;
        }
        Ok(VehicleLocation {
            state: sel.state,
            city: sel.city,
            region: sel.region,
        })
    }

    // ─── Dealers ─────────────────────────────────────────────────

    pub fn create_dealer(&mut self, form: DealerForm) -> Result<Dealer, StoreError> {
        let mut dealer = Dealer {
            id: next_id(&self.data.dealers)?,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            city: String::new(),
            state: String::new(),
            created_at: Utc::now(),
        };
        apply_dealer_form(&mut dealer, form)?;
        info!(id = %dealer.id, name = %dealer.name, "dealer created");
        self.data.dealers.push(dealer.clone());
        Ok(dealer)
    }

    pub fn update_dealer(&mut self, id: &str, form: DealerForm) -> Result<Dealer, StoreError> {
        let slot = self
            .data
            .dealers
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found("dealer", id))?;
        let mut updated = slot.clone();
        apply_dealer_form(&mut updated, form)?;
        *slot = updated.clone();
        info!(id, "dealer updated");
        Ok(updated)
    }

    /// Refused while any vehicle still references the dealer.
    pub fn delete_dealer(&mut self, id: &str) -> Result<Dealer, StoreError> {
        let pos = position(&self.data.dealers, id).ok_or_else(|| not_found("dealer", id))?;
        let vehicles = self.data.vehicles.iter().filter(|v| v.dealer_id == id).count();
        if vehicles > 0 {
            return Err(StoreError::DealerInUse { id: id.to_string(), vehicles });
        }
        info!(id, "dealer deleted");
        Ok(self.data.dealers.remove(pos))
    }

    // ─── Proposals ───────────────────────────────────────────────

    /// Record a customer proposal for an available vehicle.
    pub fn submit_proposal(&mut self, form: ProposalForm) -> Result<Proposal, StoreError> {
        let vehicle_id = form.vehicle_id.trim();
        let vehicle = self.vehicle(vehicle_id)?;
        if vehicle.is_sold {
            return Err(StoreError::VehicleSold(vehicle.id.clone()));
        }
        let customer_name = required("customerName", &form.customer_name)?;
        let customer_email = required("customerEmail", &form.customer_email)?;
        if !is_valid_email(&customer_email) {
            return Err(invalid("customerEmail", "not a valid email address"));
        }
        let customer_phone = required("customerPhone", &form.customer_phone)?;

        let proposal = Proposal {
            id: next_id(&self.data.proposals)?,
            vehicle_id: vehicle.id.clone(),
            customer_name,
            customer_email,
            customer_phone,
            message: form.message.trim().to_string(),
            status: ProposalStatus::Pending,
            created_at: Utc::now(),
        };
        info!(id = %proposal.id, vehicle = %proposal.vehicle_id, "proposal submitted");
        self.data.proposals.push(proposal.clone());
        Ok(proposal)
    }

    pub fn update_proposal_status(
        &mut self,
        id: &str,
        status: ProposalStatus,
    ) -> Result<Proposal, StoreError> {
        let slot = self
            .data
            .proposals
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("proposal", id))?;
        slot.status = status;
        info!(id, status = %status, "proposal status updated");
        Ok(slot.clone())
    }

    pub fn delete_proposal(&mut self, id: &str) -> Result<Proposal, StoreError> {
        let pos = position(&self.data.proposals, id).ok_or_else(|| not_found("proposal", id))?;
        info!(id, "proposal deleted");
        Ok(self.data.proposals.remove(pos))
    }

    pub fn proposal_with_vehicle(&self, id: &str) -> Result<ProposalDetail, StoreError> {
        let proposal = self.proposal(id)?.clone();
        let vehicle = self.vehicle(&proposal.vehicle_id).ok().cloned();
        Ok(ProposalDetail { proposal, vehicle })
    }
}

impl<T> DataProvider<T> for Store
where
    T: Record + Clone,
    Dataset: AsRef<[T]>,
{
    fn list_all(&self) -> Result<Vec<T>, ProviderError> {
        <Dataset as DataProvider<T>>::list_all(&self.data)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<T>, ProviderError> {
        <Dataset as DataProvider<T>>::find_by_id(&self.data, id)
    }
}

fn apply_dealer_form(d: &mut Dealer, form: DealerForm) -> Result<(), StoreError> {
    let name = required("name", &form.name)?;
    let email = required("email", &form.email)?;
    if !is_valid_email(&email) {
        return Err(invalid("email", "not a valid email address"));
    }
    let phone = required("phone", &form.phone)?;

    d.name = name;
    d.email = email;
    d.phone = phone;
    d.city = form.city.trim().to_string();
    d.state = form.state.trim().to_string();
    Ok(())
}

fn required(field: &'static str, value: &str) -> Result<String, StoreError> {
    let v = value.trim();
    if v.is_empty() {
        Err(invalid(field, "required"))
    } else {
        Ok(v.to_string())
    }
}

/// `local@domain.tld`: one `@`, no whitespace, a dot inside the domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn next_id<T: Record>(records: &[T]) -> Result<String, StoreError> {
    let next = match records.iter().filter_map(|r| r.id().parse::<u64>().ok()).max() {
        None => 1,
        Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted(T::COLLECTION))?,
    };
    Ok(next.to_string())
}

fn position<T: Record>(records: &[T], id: &str) -> Option<usize> {
    records.iter().position(|r| r.id() == id)
}

fn current_year() -> u16 {
    u16::try_from(Utc::now().year()).unwrap_or(u16::MAX)
}
