//! In-memory stand-ins for the catalog, reservation, review and favorites
//! stores. Each keeps its rows behind an `RwLock` so it can be shared, and
//! every read-modify-write happens under a single write guard.

use crate::adapters::catalog_file::CatalogData;
use crate::core::favorites::toggle_favorite;
use crate::core::pricing::PricingCalculator;
use crate::core::reviews::record_helpful_vote;
use crate::core::service::RentalService;
use crate::domain::model::{
    Actor, Availability, Booking, FavoriteSet, Review, ReviewId, Unit, UnitId, UserId,
};
use crate::domain::ports::{
    CatalogStore, Clock, ConfigProvider, FavoriteStore, ReservationStore, ReviewStore,
};
use crate::utils::error::{RentalError, Result};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

fn poisoned<T>(_: PoisonError<T>) -> RentalError {
    RentalError::store("in-memory store lock poisoned")
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    units: RwLock<Vec<Unit>>,
}

impl InMemoryCatalog {
    pub fn new(units: Vec<Unit>) -> Self {
        Self {
            units: RwLock::new(units),
        }
    }

    /// Price change made by management; existing checkout snapshots keep
    /// the price they were quoted with.
    pub fn update_price(&self, id: UnitId, monthly_price: i64) -> Result<()> {
        self.with_unit(id, |unit| {
            unit.monthly_price = monthly_price;
            Ok(())
        })
    }

    fn with_unit(&self, id: UnitId, change: impl FnOnce(&mut Unit) -> Result<()>) -> Result<()> {
        let mut units = self.units.write().map_err(poisoned)?;
        let unit = units
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| RentalError::not_found("unit", id))?;
        change(unit)
    }
}

impl CatalogStore for InMemoryCatalog {
    fn units(&self) -> Result<Vec<Unit>> {
        Ok(self.units.read().map_err(poisoned)?.clone())
    }

    fn find_unit(&self, id: UnitId) -> Result<Option<Unit>> {
        let units = self.units.read().map_err(poisoned)?;
        Ok(units.iter().find(|u| u.id == id).cloned())
    }

    fn mark_rented(&self, id: UnitId) -> Result<()> {
        self.with_unit(id, |unit| {
            if unit.availability == Availability::Rented {
                return Err(RentalError::UnitUnavailable { unit_id: id });
            }
            unit.availability = Availability::Rented;
            Ok(())
        })
    }

    fn mark_available(&self, id: UnitId) -> Result<()> {
        self.with_unit(id, |unit| {
            unit.availability = Availability::Available;
            Ok(())
        })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryReservations {
    bookings: RwLock<Vec<Booking>>,
}

impl InMemoryReservations {
    pub fn new() -> Self {
        Self::default()
    }
}

fn issued_on(bookings: &[Booking], day: NaiveDate) -> u32 {
    bookings
        .iter()
        .filter(|b| b.created_at.date_naive() == day)
        .count() as u32
}

impl ReservationStore for InMemoryReservations {
    fn next_sequence(&self, day: NaiveDate) -> Result<u32> {
        let bookings = self.bookings.read().map_err(poisoned)?;
        Ok(issued_on(&bookings, day) + 1)
    }

    fn insert_booking(
        &self,
        day: NaiveDate,
        build: &mut dyn FnMut(u32) -> Result<Booking>,
    ) -> Result<Booking> {
        let mut bookings = self.bookings.write().map_err(poisoned)?;
        let booking = build(issued_on(&bookings, day) + 1)?;
        if bookings.iter().any(|b| b.code == booking.code) {
            return Err(RentalError::store(format!(
                "booking {} already exists",
                booking.code
            )));
        }
        bookings.push(booking.clone());
        Ok(booking)
    }

    fn update_booking(
        &self,
        code: &str,
        change: &mut dyn FnMut(&mut Booking) -> Result<()>,
    ) -> Result<Booking> {
        let mut bookings = self.bookings.write().map_err(poisoned)?;
        let slot = bookings
            .iter_mut()
            .find(|b| b.code == code)
            .ok_or_else(|| RentalError::not_found("booking", code))?;

        let mut updated = slot.clone();
        change(&mut updated)?;
        *slot = updated.clone();
        Ok(updated)
    }

    fn bookings_for_tenant(&self, tenant_id: UserId) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().map_err(poisoned)?;
        Ok(bookings
            .iter()
            .filter(|b| b.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn bookings(&self) -> Result<Vec<Booking>> {
        Ok(self.bookings.read().map_err(poisoned)?.clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryReviews {
    reviews: RwLock<Vec<Review>>,
}

impl InMemoryReviews {
    pub fn new(reviews: Vec<Review>) -> Self {
        Self {
            reviews: RwLock::new(reviews),
        }
    }
}

impl ReviewStore for InMemoryReviews {
    fn reviews_for_unit(&self, unit_id: UnitId) -> Result<Vec<Review>> {
        let reviews = self.reviews.read().map_err(poisoned)?;
        Ok(reviews
            .iter()
            .filter(|r| r.unit_id == unit_id)
            .cloned()
            .collect())
    }

    fn insert_review(&self, build: &mut dyn FnMut(ReviewId) -> Result<Review>) -> Result<Review> {
        let mut reviews = self.reviews.write().map_err(poisoned)?;
        let next_id = reviews.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let review = build(next_id)?;
        if reviews.iter().any(|r| r.id == review.id) {
            return Err(RentalError::store(format!(
                "review {} already exists",
                review.id
            )));
        }
        // newest first, like the listing shows them
        reviews.insert(0, review.clone());
        Ok(review)
    }

    fn record_helpful_vote(&self, unit_id: UnitId, review_id: ReviewId) -> Result<u32> {
        let mut reviews = self.reviews.write().map_err(poisoned)?;
        if !reviews
            .iter()
            .any(|r| r.id == review_id && r.unit_id == unit_id)
        {
            return Err(RentalError::not_found("review", review_id));
        }
        record_helpful_vote(&mut reviews, review_id)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFavorites {
    sets: RwLock<HashMap<UserId, FavoriteSet>>,
}

impl InMemoryFavorites {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FavoriteStore for InMemoryFavorites {
    fn load(&self, user_id: UserId) -> Result<FavoriteSet> {
        let sets = self.sets.read().map_err(poisoned)?;
        Ok(sets
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| FavoriteSet::new(user_id)))
    }

    fn toggle(&self, owner: &Actor, unit_id: UnitId) -> Result<bool> {
        let mut sets = self.sets.write().map_err(poisoned)?;
        let set = sets
            .entry(owner.id)
            .or_insert_with(|| FavoriteSet::new(owner.id));
        toggle_favorite(Some(owner), set, unit_id)
    }
}

pub type InMemoryService =
    RentalService<InMemoryCatalog, InMemoryReservations, InMemoryReviews, InMemoryFavorites>;

/// Wires a service over fresh in-memory stores seeded from `data`.
pub fn in_memory_service(
    data: CatalogData,
    config: &dyn ConfigProvider,
    clock: Box<dyn Clock>,
) -> Result<InMemoryService> {
    let pricing = PricingCalculator::new(config.admin_fee())?;
    tracing::debug!(
        "Seeding in-memory stores with {} units and {} reviews",
        data.units.len(),
        data.reviews.len()
    );

    Ok(RentalService::new(
        InMemoryCatalog::new(data.units),
        InMemoryReservations::new(),
        InMemoryReviews::new(data.reviews),
        InMemoryFavorites::new(),
        clock,
    )
    .with_pricing(pricing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Capability;

    fn tenant(id: UserId) -> Actor {
        Actor {
            id,
            name: "Lisa Chen".to_string(),
            email: "lisa@example.com".to_string(),
            capability: Capability::Tenant,
        }
    }

    #[test]
    fn test_catalog_claims_unit_once() {
        let catalog = InMemoryCatalog::new(CatalogData::sample().units);
        catalog.mark_rented(1).unwrap();
        assert!(!catalog.find_unit(1).unwrap().unwrap().is_available());

        // 第二次佔用同一單位會失敗
        assert!(matches!(
            catalog.mark_rented(1),
            Err(RentalError::UnitUnavailable { unit_id: 1 })
        ));
        assert!(catalog.mark_rented(404).is_err());

        catalog.mark_available(1).unwrap();
        assert!(catalog.find_unit(1).unwrap().unwrap().is_available());
    }

    #[test]
    fn test_review_ids_continue_from_max() {
        let store = InMemoryReviews::new(CatalogData::sample().reviews);
        let mut template = CatalogData::sample().reviews.remove(0);
        template.unit_id = 2;

        let review = store
            .insert_review(&mut |id| {
                let mut review = template.clone();
                review.id = id;
                Ok(review)
            })
            .unwrap();
        assert_eq!(review.id, 5);
        assert_eq!(store.reviews_for_unit(1).unwrap().len(), 4);
        assert_eq!(store.reviews_for_unit(2).unwrap()[0].id, 5);
    }

    #[test]
    fn test_failed_review_build_stores_nothing() {
        let store = InMemoryReviews::new(vec![]);
        let result = store.insert_review(&mut |_| Err(RentalError::validation("body", "review text required")));
        assert!(result.is_err());
        assert!(store.reviews_for_unit(1).unwrap().is_empty());
    }

    #[test]
    fn test_vote_on_review_of_other_unit_is_not_found() {
        let store = InMemoryReviews::new(CatalogData::sample().reviews);
        assert_eq!(store.record_helpful_vote(1, 1).unwrap(), 13);
        assert!(matches!(
            store.record_helpful_vote(2, 1),
            Err(RentalError::NotFound { .. })
        ));
    }

    #[test]
    fn test_booking_update_is_kept_only_on_success() {
        let store = InMemoryReservations::new();
        let day = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
        let template = |seq: u32| Booking {
            code: format!("BK20251020{:03}", seq),
            unit_id: 1,
            tenant_id: 7,
            start_date: day,
            end_date: day,
            duration: Default::default(),
            payment_method: Default::default(),
            price: crate::domain::model::PriceBreakdown {
                monthly_price: 1,
                rent: 6,
                deposit: 1,
                admin_fee: 0,
                total: 7,
            },
            created_at: day.and_hms_opt(9, 0, 0).unwrap().and_utc(),
            status: crate::domain::model::BookingStatus::Pending,
            rejection_reason: None,
        };

        let first = store.insert_booking(day, &mut |seq| Ok(template(seq))).unwrap();
        assert_eq!(first.code, "BK20251020001");
        assert_eq!(store.next_sequence(day).unwrap(), 2);

        let err = store
            .update_booking(&first.code, &mut |b| {
                b.tenant_id = 99;
                Err(RentalError::store("rejected"))
            })
            .unwrap_err();
        assert!(matches!(err, RentalError::StoreError { .. }));
        assert_eq!(store.bookings().unwrap()[0].tenant_id, 7);

        assert!(matches!(
            store.update_booking("BK000", &mut |_| Ok(())),
            Err(RentalError::NotFound { .. })
        ));
    }

    #[test]
    fn test_favorites_toggle_under_owner() {
        let store = InMemoryFavorites::new();
        assert!(store.load(3).unwrap().is_empty());

        assert!(store.toggle(&tenant(3), 2).unwrap());
        assert!(store.load(3).unwrap().contains(2));
        assert!(store.load(4).unwrap().is_empty());

        assert!(!store.toggle(&tenant(3), 2).unwrap());
        assert!(store.load(3).unwrap().is_empty());
    }
}
