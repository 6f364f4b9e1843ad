use crate::domain::model::{Actor, Booking, FavoriteSet, Review, ReviewId, Unit, UnitId, UserId};
use crate::utils::error::Result;
use chrono::{DateTime, NaiveDate, Utc};

/// Source of the unit catalog. Owns availability transitions.
pub trait CatalogStore: Send + Sync {
    fn units(&self) -> Result<Vec<Unit>>;
    fn find_unit(&self, id: UnitId) -> Result<Option<Unit>>;
    /// Claims the unit. Fails with `UnitUnavailable` if it is already rented.
    fn mark_rented(&self, id: UnitId) -> Result<()>;
    fn mark_available(&self, id: UnitId) -> Result<()>;
}

pub trait IdentityProvider: Send + Sync {
    fn current_actor(&self) -> Option<Actor>;
}

/// Receives finalized bookings once a checkout is confirmed.
pub trait ReservationStore: Send + Sync {
    /// Sequence number the next booking issued on `day` would get.
    fn next_sequence(&self, day: NaiveDate) -> Result<u32>;
    /// Allocates the day's sequence number and stores the booking `build`
    /// makes from it, as one step. Nothing is stored if `build` fails.
    fn insert_booking(
        &self,
        day: NaiveDate,
        build: &mut dyn FnMut(u32) -> Result<Booking>,
    ) -> Result<Booking>;
    /// Applies `change` to the stored booking and keeps the result only if
    /// `change` succeeds.
    fn update_booking(
        &self,
        code: &str,
        change: &mut dyn FnMut(&mut Booking) -> Result<()>,
    ) -> Result<Booking>;
    fn bookings_for_tenant(&self, tenant_id: UserId) -> Result<Vec<Booking>>;
    fn bookings(&self) -> Result<Vec<Booking>>;
}

pub trait ReviewStore: Send + Sync {
    fn reviews_for_unit(&self, unit_id: UnitId) -> Result<Vec<Review>>;
    /// Allocates the next review id and stores what `build` returns for it.
    fn insert_review(&self, build: &mut dyn FnMut(ReviewId) -> Result<Review>) -> Result<Review>;
    /// Adds one helpful vote and returns the new count.
    fn record_helpful_vote(&self, unit_id: UnitId, review_id: ReviewId) -> Result<u32>;
}

pub trait FavoriteStore: Send + Sync {
    fn load(&self, user_id: UserId) -> Result<FavoriteSet>;
    /// Flips `unit_id` in the owner's set and returns the new membership.
    fn toggle(&self, owner: &Actor, unit_id: UnitId) -> Result<bool>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn admin_fee(&self) -> i64;
    fn catalog_file(&self) -> Option<&str>;
}
