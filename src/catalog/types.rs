//! Core records of the marketplace: vehicles, dealers and proposals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A record that can be listed and looked up by id through a data provider.
pub trait Record {
    /// Collection name used by remote backends (`/vehicles`, `/dealers`, ...).
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Gearbox kind of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Manual,
    Automatic,
}

impl Transmission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automatic => "automatic",
        }
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transmission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "automatic" | "automatico" | "automático" => Ok(Self::Automatic),
            other => Err(other.to_string()),
        }
    }
}

/// Where a vehicle is parked: state code, city and region names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleLocation {
    pub state: String,
    pub city: String,
    pub region: String,
}

/// A catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    /// Asking price in whole reais.
    pub price: u64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub main_image: String,
    pub transmission: Transmission,
    pub location: VehicleLocation,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub mileage: u32,
    #[serde(default)]
    pub fuel_type: String,
    #[serde(default)]
    pub is_sold: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub dealer_id: String,
}

impl Vehicle {
    /// "Toyota Corolla 2021"
    pub fn title(&self) -> String {
        format!("{} {} {}", self.make, self.model, self.year)
    }
}

impl Record for Vehicle {
    const COLLECTION: &'static str = "vehicles";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A dealer that owns listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dealer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub created_at: DateTime<Utc>,
}

impl Record for Dealer {
    const COLLECTION: &'static str = "dealers";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Lifecycle of a customer proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Contacted,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Contacted => "contacted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "contacted" => Ok(Self::Contacted),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(other.to_string()),
        }
    }
}

/// A customer's offer or contact request for a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    pub vehicle_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[serde(default)]
    pub message: String,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for Proposal {
    const COLLECTION: &'static str = "proposals";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Format a price the way the storefront shows it: "R$ 105.900".
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    out.push_str("R$ ");
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}
