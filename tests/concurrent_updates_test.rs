use anyhow::Result;
use chrono::{DateTime, Utc};
use rental_core::adapters::{in_memory_service, CatalogData, FixedClock, InMemoryService};
use rental_core::core::reviews::ReviewSort;
use rental_core::domain::model::{Actor, Availability, Capability, Unit, UnitType};
use rental_core::domain::ports::ReservationStore;
use rental_core::{SearchCriteria, TomlConfig};
use std::thread;

fn service(data: CatalogData) -> Result<InMemoryService> {
    let now: DateTime<Utc> = "2025-10-20T09:00:00Z".parse()?;
    Ok(in_memory_service(
        data,
        &TomlConfig::default(),
        Box::new(FixedClock(now)),
    )?)
}

fn tenant(id: u32) -> Actor {
    Actor {
        id,
        name: format!("Penyewa {}", id),
        email: format!("tenant{}@example.com", id),
        capability: Capability::Tenant,
    }
}

/// 多個執行緒同時投票，每一票都要被記錄
#[test]
fn test_parallel_helpful_votes_are_all_counted() -> Result<()> {
    let service = service(CatalogData::sample())?;

    thread::scope(|scope| {
        for voter in 0..8 {
            let service = &service;
            scope.spawn(move || {
                let actor = tenant(20 + voter);
                for _ in 0..100 {
                    service.vote_helpful(Some(&actor), 1, 2).unwrap();
                }
            });
        }
    });

    let page = service.review_page(1, None, ReviewSort::Newest)?;
    let review = page.reviews.iter().find(|r| r.id == 2).unwrap();
    assert_eq!(review.helpful, 8 + 800);
    Ok(())
}

/// 同一房客在多個執行緒切換不同單位的收藏，結果互不覆蓋
#[test]
fn test_parallel_favorite_toggles_keep_every_unit() -> Result<()> {
    let service = service(CatalogData::sample())?;
    let lisa = tenant(12);

    thread::scope(|scope| {
        for unit_id in 1..=6 {
            let (service, lisa) = (&service, &lisa);
            scope.spawn(move || {
                // odd number of flips leaves the unit saved
                for _ in 0..201 {
                    service.toggle_favorite(Some(lisa), unit_id).unwrap();
                }
            });
        }
    });

    let saved: Vec<u32> = service
        .favorites(Some(&lisa), &SearchCriteria::default())?
        .iter()
        .map(|u| u.id)
        .collect();
    assert_eq!(saved, vec![1, 2, 3, 4, 5, 6]);
    Ok(())
}

/// 多位房客搶同一單位，只有一筆訂單成立
#[test]
fn test_parallel_checkouts_claim_unit_once() -> Result<()> {
    let mut data = CatalogData::sample();
    data.units.push(Unit {
        id: 7,
        name: "Unit D-401".to_string(),
        unit_type: UnitType::ThreeBedroom,
        monthly_price: 12_000_000,
        size_sqm: 72.0,
        bedrooms: 3,
        bathrooms: 2,
        floor: 4,
        availability: Availability::Available,
    });
    let service = service(data)?;

    let confirmed = thread::scope(|scope| {
        let handles: Vec<_> = (0..6)
            .map(|n| {
                let service = &service;
                scope.spawn(move || -> rental_core::Result<bool> {
                    let actor = tenant(30 + n);
                    let mut checkout = service.begin_checkout(Some(&actor), Some(7))?;
                    checkout.set_start_date_str("2025-11-01")?;
                    service.submit_checkout(&mut checkout)?;
                    Ok(service.confirm_checkout(&mut checkout).is_ok())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap_or(false))
            .filter(|ok| *ok)
            .count()
    });

    assert_eq!(confirmed, 1);
    let bookings: Vec<_> = service
        .reservations()
        .bookings()?
        .into_iter()
        .filter(|b| b.unit_id == 7)
        .collect();
    assert_eq!(bookings.len(), 1);
    Ok(())
}
