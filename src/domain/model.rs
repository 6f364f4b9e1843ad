use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::utils::error::RentalError;

pub type UnitId = u32;
pub type UserId = u32;
pub type ReviewId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    Studio,
    #[serde(rename = "1 Bedroom")]
    OneBedroom,
    #[serde(rename = "2 Bedroom")]
    TwoBedroom,
    #[serde(rename = "3 Bedroom")]
    ThreeBedroom,
}

impl UnitType {
    pub const ALL: [UnitType; 4] = [
        UnitType::Studio,
        UnitType::OneBedroom,
        UnitType::TwoBedroom,
        UnitType::ThreeBedroom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            UnitType::Studio => "Studio",
            UnitType::OneBedroom => "1 Bedroom",
            UnitType::TwoBedroom => "2 Bedroom",
            UnitType::ThreeBedroom => "3 Bedroom",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UnitType {
    type Err = RentalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        UnitType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                RentalError::validation("unit_type", format!("unknown unit type '{}'", needle))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Rented,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub unit_type: UnitType,
    /// Monthly rent in the smallest currency unit.
    pub monthly_price: i64,
    pub size_sqm: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub floor: i32,
    pub availability: Availability,
}

impl Unit {
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Tenant,
    Manager,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Tenant => f.write_str("tenant"),
            Capability::Manager => f.write_str("manager"),
        }
    }
}

impl FromStr for Capability {
    type Err = RentalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tenant" => Ok(Capability::Tenant),
            "manager" => Ok(Capability::Manager),
            other => Err(RentalError::validation(
                "capability",
                format!("unknown capability '{}'", other),
            )),
        }
    }
}

/// The authenticated user as handed over by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub capability: Capability,
}

impl Actor {
    pub fn is_tenant(&self) -> bool {
        self.capability == Capability::Tenant
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum LeaseDuration {
    ThreeMonths,
    #[default]
    SixMonths,
    TwelveMonths,
    TwentyFourMonths,
}

impl LeaseDuration {
    pub const ALL: [LeaseDuration; 4] = [
        LeaseDuration::ThreeMonths,
        LeaseDuration::SixMonths,
        LeaseDuration::TwelveMonths,
        LeaseDuration::TwentyFourMonths,
    ];

    pub fn months(self) -> u32 {
        match self {
            LeaseDuration::ThreeMonths => 3,
            LeaseDuration::SixMonths => 6,
            LeaseDuration::TwelveMonths => 12,
            LeaseDuration::TwentyFourMonths => 24,
        }
    }
}

impl TryFrom<u32> for LeaseDuration {
    type Error = RentalError;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        LeaseDuration::ALL
            .into_iter()
            .find(|d| d.months() == months)
            .ok_or_else(|| {
                RentalError::validation(
                    "duration_months",
                    format!("{} months is not an offered lease duration (3, 6, 12 or 24)", months),
                )
            })
    }
}

impl From<LeaseDuration> for u32 {
    fn from(duration: LeaseDuration) -> Self {
        duration.months()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Transfer,
    Installment,
}

impl FromStr for PaymentMethod {
    type Err = RentalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transfer" => Ok(PaymentMethod::Transfer),
            "installment" => Ok(PaymentMethod::Installment),
            other => Err(RentalError::validation(
                "payment_method",
                format!("unknown payment method '{}'", other),
            )),
        }
    }
}

/// Checkout form contents while the tenant is still editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub unit_id: UnitId,
    pub tenant_id: UserId,
    pub start_date: Option<NaiveDate>,
    pub duration: LeaseDuration,
    pub payment_method: PaymentMethod,
}

impl BookingDraft {
    pub fn new(unit_id: UnitId, tenant_id: UserId) -> Self {
        Self {
            unit_id,
            tenant_id,
            start_date: None,
            duration: LeaseDuration::default(),
            payment_method: PaymentMethod::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub monthly_price: i64,
    pub rent: i64,
    pub deposit: i64,
    pub admin_fee: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
    Rejected,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Active,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::Rejected,
    ];
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub code: String,
    pub unit_id: UnitId,
    pub tenant_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: LeaseDuration,
    pub payment_method: PaymentMethod,
    pub price: PriceBreakdown,
    pub created_at: DateTime<Utc>,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl Booking {
    pub fn total(&self) -> i64 {
        self.price.total
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub unit_id: UnitId,
    pub author_id: UserId,
    pub author_name: String,
    pub rating: u8,
    pub body: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub helpful: u32,
    #[serde(default)]
    pub verified: bool,
    pub created_on: NaiveDate,
}

/// Units a user has saved. Each unit appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteSet {
    pub owner: UserId,
    units: BTreeSet<UnitId>,
}

impl FavoriteSet {
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            units: BTreeSet::new(),
        }
    }

    /// Removes `unit_id` when present, inserts it otherwise. Returns whether
    /// the unit is a favorite afterwards.
    pub fn toggle(&mut self, unit_id: UnitId) -> bool {
        if self.units.remove(&unit_id) {
            false
        } else {
            self.units.insert(unit_id)
        }
    }

    pub fn contains(&self, unit_id: UnitId) -> bool {
        self.units.contains(&unit_id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.iter().copied()
    }
}
