use crate::domain::model::{Availability, Review, Unit, UnitType};
use crate::utils::error::{RentalError, Result};
use crate::utils::validation::{validate_positive_amount, validate_range, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

/// Seed data for the in-memory stores, read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogData {
    pub units: Vec<Unit>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl CatalogData {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let data: CatalogData = serde_json::from_str(content)?;
        data.validate()?;
        Ok(data)
    }

    /// 沒有設定資料檔時使用內建範例資料
    pub fn load_or_sample(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::debug!("Loading catalog from {}", path);
                Self::from_file(path)
            }
            None => {
                tracing::warn!("No catalog file configured, using sample catalog");
                Ok(Self::sample())
            }
        }
    }

    pub fn sample() -> Self {
        let unit = |id, name: &str, unit_type, price, size, floor, availability| Unit {
            id,
            name: name.to_string(),
            unit_type,
            monthly_price: price,
            size_sqm: size,
            bedrooms: match unit_type {
                UnitType::Studio => 0,
                UnitType::OneBedroom => 1,
                UnitType::TwoBedroom => 2,
                UnitType::ThreeBedroom => 3,
            },
            bathrooms: if unit_type == UnitType::TwoBedroom { 2 } else { 1 },
            floor,
            availability,
        };

        let units = vec![
            unit(1, "Unit A-101", UnitType::Studio, 3_500_000, 24.0, 1, Availability::Available),
            unit(2, "Unit B-205", UnitType::OneBedroom, 5_000_000, 36.0, 2, Availability::Available),
            unit(3, "Unit C-310", UnitType::TwoBedroom, 7_500_000, 48.0, 3, Availability::Available),
            unit(4, "Unit A-102", UnitType::Studio, 3_500_000, 24.0, 1, Availability::Available),
            unit(5, "Unit B-206", UnitType::OneBedroom, 5_200_000, 38.0, 2, Availability::Rented),
            unit(6, "Unit C-315", UnitType::TwoBedroom, 8_000_000, 50.0, 3, Availability::Available),
        ];

        let review = |id, author: &str, rating, date: (i32, u32, u32), body: &str, helpful, verified| {
            Review {
                id,
                unit_id: 1,
                author_id: 100 + id,
                author_name: author.to_string(),
                rating,
                body: body.to_string(),
                photos: vec![],
                helpful,
                verified,
                created_on: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap_or_default(),
            }
        };

        let reviews = vec![
            review(1, "Budi Santoso", 5, (2025, 10, 15),
                "Unit sangat nyaman dan bersih. Lokasi strategis, pengelola responsif.", 12, true),
            review(2, "Sarah Johnson", 4, (2025, 10, 10),
                "Overall bagus, hanya saja kadang lift agak lama.", 8, true),
            review(3, "Ahmad Yani", 5, (2025, 9, 28),
                "Sangat puas tinggal di sini. View bagus, keamanan 24 jam.", 15, true),
            review(4, "Lisa Chen", 3, (2025, 9, 20),
                "Unit cukup baik tapi AC kadang kurang dingin.", 5, false),
        ];

        Self { units, reviews }
    }
}

impl Validate for CatalogData {
    fn validate(&self) -> Result<()> {
        let mut unit_ids = HashSet::new();
        for unit in &self.units {
            if !unit_ids.insert(unit.id) {
                return Err(RentalError::validation(
                    "units.id",
                    format!("duplicate unit id {}", unit.id),
                ));
            }
            validate_positive_amount("units.monthly_price", unit.monthly_price)?;
            if unit.size_sqm.is_nan() || unit.size_sqm <= 0.0 {
                return Err(RentalError::validation(
                    "units.size_sqm",
                    format!("unit {} has a non-positive size", unit.id),
                ));
            }
            if unit.bathrooms < 1 {
                return Err(RentalError::validation(
                    "units.bathrooms",
                    format!("unit {} needs at least one bathroom", unit.id),
                ));
            }
        }

        let mut review_ids = HashSet::new();
        for review in &self.reviews {
            if !review_ids.insert(review.id) {
                return Err(RentalError::validation(
                    "reviews.id",
                    format!("duplicate review id {}", review.id),
                ));
            }
            validate_range("reviews.rating", review.rating, 1, 5)?;
            if !unit_ids.contains(&review.unit_id) {
                return Err(RentalError::validation(
                    "reviews.unit_id",
                    format!("review {} points at unknown unit {}", review.id, review.unit_id),
                ));
            }
        }

        Ok(())
    }
}

pub fn write_units_csv<W: Write>(units: &[Unit], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for unit in units {
        csv_writer.serialize(unit)?;
    }
    csv_writer.flush()?;
    Ok(())
}
