use crate::domain::model::{Unit, UnitType};
use crate::utils::error::{RentalError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Upper bound (exclusive) of the low band, lower bound (inclusive) of mid.
pub const LOW_BAND_CEILING: i64 = 4_000_000;
/// Upper bound (exclusive) of the mid band, lower bound (inclusive) of high.
pub const HIGH_BAND_FLOOR: i64 = 6_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBand {
    Low,
    Mid,
    High,
}

impl PriceBand {
    /// Every price falls in exactly one band.
    pub fn of(price: i64) -> Self {
        if price < LOW_BAND_CEILING {
            PriceBand::Low
        } else if price < HIGH_BAND_FLOOR {
            PriceBand::Mid
        } else {
            PriceBand::High
        }
    }

    pub fn contains(self, price: i64) -> bool {
        PriceBand::of(price) == self
    }
}

impl FromStr for PriceBand {
    type Err = RentalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(PriceBand::Low),
            "mid" => Ok(PriceBand::Mid),
            "high" => Ok(PriceBand::High),
            other => Err(RentalError::validation(
                "price_band",
                format!("unknown price band '{}' (expected low, mid or high)", other),
            )),
        }
    }
}

/// Search form state. `None` on any optional field means "any".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub query: String,
    pub unit_type: Option<UnitType>,
    pub price_band: Option<PriceBand>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub bedrooms: Option<u32>,
}

/// Blank, "any", "all" and the Indonesian "semua" all mean no filter.
fn is_wildcard(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || ["any", "all", "semua"].iter().any(|w| v.eq_ignore_ascii_case(w))
}

impl SearchCriteria {
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_unit_type(mut self, unit_type: UnitType) -> Self {
        self.unit_type = Some(unit_type);
        self
    }

    pub fn with_price_band(mut self, band: PriceBand) -> Self {
        self.price_band = Some(band);
        self
    }

    /// Builds criteria from the raw select-box values of the listing page.
    /// A wildcard value (see `is_wildcard`) disables that filter.
    pub fn from_form(query: &str, unit_type: &str, price_band: &str) -> Result<Self> {
        let unit_type = if is_wildcard(unit_type) {
            None
        } else {
            Some(unit_type.parse()?)
        };
        let price_band = if is_wildcard(price_band) {
            None
        } else {
            Some(price_band.parse()?)
        };

        Ok(Self {
            query: query.to_string(),
            unit_type,
            price_band,
            ..Self::default()
        })
    }

    fn matches_query(&self, unit: &Unit) -> bool {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        unit.name.to_lowercase().contains(&needle)
            || unit.unit_type.label().to_lowercase().contains(&needle)
    }
}

/// Every criterion except availability.
pub fn matches_criteria(unit: &Unit, criteria: &SearchCriteria) -> bool {
    let price = unit.monthly_price;

    criteria.matches_query(unit)
        && criteria.unit_type.is_none_or(|t| unit.unit_type == t)
        && criteria.price_band.is_none_or(|band| band.contains(price))
        && criteria.min_price.is_none_or(|min| price >= min)
        && criteria.max_price.is_none_or(|max| price <= max)
        && criteria.bedrooms.is_none_or(|beds| unit.bedrooms == beds)
}

/// Available units matching `criteria`, in catalog order.
pub fn filter_units<'a>(units: &'a [Unit], criteria: &SearchCriteria) -> Vec<&'a Unit> {
    units
        .iter()
        .filter(|unit| unit.is_available() && matches_criteria(unit, criteria))
        .collect()
}
