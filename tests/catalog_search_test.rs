use anyhow::Result;
use chrono::{DateTime, Utc};
use rental_core::adapters::catalog_file::write_units_csv;
use rental_core::adapters::{in_memory_service, CatalogData, FixedClock, InMemoryService};
use rental_core::core::catalog::{filter_units, matches_criteria, PriceBand};
use rental_core::domain::model::{LeaseDuration, UnitType};
use rental_core::{RentalError, SearchCriteria, TomlConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn service_with(data: CatalogData) -> Result<InMemoryService> {
    let now: DateTime<Utc> = "2025-10-20T09:00:00Z".parse()?;
    Ok(in_memory_service(
        data,
        &TomlConfig::default(),
        Box::new(FixedClock(now)),
    )?)
}

fn ids(units: &[rental_core::domain::model::Unit]) -> Vec<u32> {
    units.iter().map(|u| u.id).collect()
}

#[test]
fn test_search_hides_rented_units() -> Result<()> {
    let service = service_with(CatalogData::sample())?;

    let all = service.search(&SearchCriteria::default())?;
    assert_eq!(ids(&all), vec![1, 2, 3, 4, 6]);

    let studios_low = SearchCriteria::from_form("", "Studio", "low")?;
    assert_eq!(ids(&service.search(&studios_low)?), vec![1, 4]);

    // Unit B-206 是唯一出租中的單位
    let one_bedroom = SearchCriteria::from_form("b-20", "1 bedroom", "any")?;
    assert_eq!(ids(&service.search(&one_bedroom)?), vec![2]);
    Ok(())
}

/// 結果必須同時滿足正確性與完整性
#[test]
fn test_filter_is_sound_and_complete() -> Result<()> {
    let data = CatalogData::sample();
    let queries = ["", "unit a", "c-3", "bedroom", "zzz"];

    for query in queries {
        for unit_type in UnitType::ALL.iter().map(|t| Some(*t)).chain([None]) {
            for band in [
                None,
                Some(PriceBand::Low),
                Some(PriceBand::Mid),
                Some(PriceBand::High),
            ] {
                let criteria = SearchCriteria {
                    query: query.to_string(),
                    unit_type,
                    price_band: band,
                    ..SearchCriteria::default()
                };
                let result = filter_units(&data.units, &criteria);

                for unit in &data.units {
                    let expected = unit.is_available() && matches_criteria(unit, &criteria);
                    assert_eq!(
                        result.iter().any(|u| u.id == unit.id),
                        expected,
                        "unit {} with {:?}",
                        unit.id,
                        criteria
                    );
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_unit_detail_and_quote() -> Result<()> {
    let service = service_with(CatalogData::sample())?;

    let detail = service.unit_detail(1)?;
    assert_eq!(detail.unit.name, "Unit A-101");
    assert_eq!(detail.rating.total, 4);
    assert_eq!(detail.rating.rounded_average(), 4.25);

    // 無評論的單位平均為 0
    assert_eq!(service.unit_detail(3)?.rating.average, 0.0);

    let quote = service.quote(1, LeaseDuration::SixMonths)?;
    assert_eq!(quote.total, 25_000_000);

    let err = service.unit_detail(42).unwrap_err();
    assert!(matches!(err, RentalError::NotFound { .. }));
    Ok(())
}

#[test]
fn test_catalog_loaded_from_json_file() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(
        br#"{
  "units": [
    {"id": 10, "name": "Tower 1-01", "unit_type": "Studio", "monthly_price": 3000000,
     "size_sqm": 21.5, "bedrooms": 0, "bathrooms": 1, "floor": 1, "availability": "available"},
    {"id": 11, "name": "Tower 1-02", "unit_type": "3 Bedroom", "monthly_price": 12000000,
     "size_sqm": 90.0, "bedrooms": 3, "bathrooms": 2, "floor": 12, "availability": "available"}
  ]
}"#,
    )?;

    let data = CatalogData::load_or_sample(file.path().to_str())?;
    assert!(data.reviews.is_empty());

    let service = service_with(data)?;
    let high = SearchCriteria::default().with_price_band(PriceBand::High);
    assert_eq!(ids(&service.search(&high)?), vec![11]);

    let mut csv = Vec::new();
    write_units_csv(&service.search(&SearchCriteria::default())?, &mut csv)?;
    let csv = String::from_utf8(csv)?;
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("Tower 1-02"));
    Ok(())
}

#[test]
fn test_invalid_catalog_file_is_rejected() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(
        br#"{"units": [
    {"id": 1, "name": "A", "unit_type": "Studio", "monthly_price": 0,
     "size_sqm": 20.0, "bedrooms": 0, "bathrooms": 1, "floor": 1, "availability": "available"}
]}"#,
    )?;

    let err = CatalogData::from_file(file.path()).unwrap_err();
    assert!(matches!(err, RentalError::ValidationError { .. }));
    Ok(())
}
