use crate::core::access::{require_manager, require_signed_in, require_tenant};
use crate::core::booking::{booking_code, BookingCheckout, ConfirmationSnapshot};
use crate::core::catalog::{filter_units, matches_criteria, SearchCriteria};
use crate::core::dashboard::{manager_stats, tenant_stats, ManagerStats, TenantStats};
use crate::core::favorites::favorite_units;
use crate::core::pricing::PricingCalculator;
use crate::core::reviews::{
    filter_and_sort, rating_stats, submit_review, RatingStats, ReviewSort, ReviewSubmission,
};
use crate::core::{
    Actor, Booking, CatalogStore, Clock, FavoriteStore, LeaseDuration, PriceBreakdown,
    ReservationStore, Review, ReviewId, ReviewStore, Unit, UnitId,
};
use crate::utils::error::{RentalError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct UnitDetail {
    pub unit: Unit,
    pub rating: RatingStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewPage {
    pub stats: RatingStats,
    pub reviews: Vec<Review>,
}

/// 串接各個引擎與外部儲存的服務層
pub struct RentalService<C, R, V, F>
where
    C: CatalogStore,
    R: ReservationStore,
    V: ReviewStore,
    F: FavoriteStore,
{
    catalog: C,
    reservations: R,
    reviews: V,
    favorites: F,
    pricing: PricingCalculator,
    clock: Box<dyn Clock>,
}

impl<C, R, V, F> RentalService<C, R, V, F>
where
    C: CatalogStore,
    R: ReservationStore,
    V: ReviewStore,
    F: FavoriteStore,
{
    pub fn new(catalog: C, reservations: R, reviews: V, favorites: F, clock: Box<dyn Clock>) -> Self {
        Self {
            catalog,
            reservations,
            reviews,
            favorites,
            pricing: PricingCalculator::default(),
            clock,
        }
    }

    pub fn with_pricing(mut self, pricing: PricingCalculator) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn reservations(&self) -> &R {
        &self.reservations
    }

    fn require_unit(&self, unit_id: UnitId) -> Result<Unit> {
        self.catalog
            .find_unit(unit_id)?
            .ok_or_else(|| RentalError::not_found("unit", unit_id))
    }

    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Unit>> {
        let units = self.catalog.units()?;
        let matches: Vec<Unit> = filter_units(&units, criteria).into_iter().cloned().collect();
        tracing::debug!(
            "🔍 Search '{}' matched {} of {} units",
            criteria.query,
            matches.len(),
            units.len()
        );
        Ok(matches)
    }

    /// Unit plus its derived rating summary.
    pub fn unit_detail(&self, unit_id: UnitId) -> Result<UnitDetail> {
        let unit = self.require_unit(unit_id)?;
        let reviews = self.reviews.reviews_for_unit(unit_id)?;
        Ok(UnitDetail {
            unit,
            rating: rating_stats(&reviews),
        })
    }

    pub fn quote(&self, unit_id: UnitId, duration: LeaseDuration) -> Result<PriceBreakdown> {
        let unit = self.require_unit(unit_id)?;
        self.pricing.quote(unit.monthly_price, duration)
    }

    pub fn begin_checkout(
        &self,
        actor: Option<&Actor>,
        unit_id: Option<UnitId>,
    ) -> Result<BookingCheckout> {
        require_tenant(actor, "book a unit")?;
        let unit = match unit_id {
            Some(id) => Some(self.require_unit(id)?),
            None => None,
        };
        BookingCheckout::start(actor, unit.as_ref(), self.pricing)
    }

    pub fn submit_checkout(&self, checkout: &mut BookingCheckout) -> Result<ConfirmationSnapshot> {
        let today = self.clock.today();
        match checkout.submit(today) {
            Ok(snapshot) => Ok(snapshot.clone()),
            Err(e) => {
                tracing::warn!("⚠️ Booking form rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Claims the unit, stores the booking and only then moves the checkout
    /// to `Completed`. If storing fails the claim is released and the
    /// checkout stays in `Confirming`, so the tenant can try again.
    pub fn confirm_checkout(&self, checkout: &mut BookingCheckout) -> Result<Booking> {
        let unit_id = checkout
            .snapshot()
            .map(|s| s.draft.unit_id)
            .ok_or_else(|| RentalError::InvalidTransition {
                state: checkout.state().name().to_string(),
                action: "confirm the booking".to_string(),
            })?;
        let now = self.clock.now();
        let day = now.date_naive();

        self.catalog.mark_rented(unit_id)?;
        let stored = self
            .reservations
            .insert_booking(day, &mut |sequence| checkout.finalize(booking_code(day, sequence), now));
        let booking = match stored {
            Ok(booking) => booking,
            Err(e) => {
                tracing::warn!("⚠️ Booking for unit {} not stored: {}", unit_id, e);
                if let Err(release) = self.catalog.mark_available(unit_id) {
                    tracing::error!("❌ Unit {} could not be released: {}", unit_id, release);
                }
                return Err(e);
            }
        };
        checkout.commit(booking.clone())?;

        tracing::info!(
            "✅ Booking {} confirmed for unit {} (total {})",
            booking.code,
            booking.unit_id,
            booking.total()
        );
        Ok(booking)
    }

    pub fn bookings_for(&self, actor: Option<&Actor>) -> Result<Vec<Booking>> {
        let actor = require_signed_in(actor)?;
        self.reservations.bookings_for_tenant(actor.id)
    }

    pub fn activate_booking(&self, actor: Option<&Actor>, code: &str) -> Result<Booking> {
        let manager = require_manager(actor, "activate a booking")?;
        let booking = self
            .reservations
            .update_booking(code, &mut |b| b.activate(manager))?;
        tracing::info!("🔑 Booking {} is now active", booking.code);
        Ok(booking)
    }

    pub fn complete_booking(&self, actor: Option<&Actor>, code: &str) -> Result<Booking> {
        let manager = require_manager(actor, "complete a booking")?;
        let booking = self
            .reservations
            .update_booking(code, &mut |b| b.complete(manager))?;
        tracing::info!("🏁 Booking {} completed", booking.code);
        Ok(booking)
    }

    /// Rejects a pending booking and puts its unit back on the market.
    pub fn reject_booking(&self, actor: Option<&Actor>, code: &str, reason: &str) -> Result<Booking> {
        let manager = require_manager(actor, "reject a booking")?;
        let booking = self
            .reservations
            .update_booking(code, &mut |b| b.reject(manager, reason))?;
        self.release_unit(&booking)?;
        tracing::info!(
            "🚫 Booking {} rejected: {}",
            booking.code,
            booking.rejection_reason.as_deref().unwrap_or_default()
        );
        Ok(booking)
    }

    /// Owner cancels a pending or active booking; the unit becomes available.
    pub fn cancel_booking(&self, actor: Option<&Actor>, code: &str) -> Result<Booking> {
        let owner = require_signed_in(actor)?;
        let booking = self
            .reservations
            .update_booking(code, &mut |b| b.cancel(owner))?;
        self.release_unit(&booking)?;
        tracing::info!("↩️ Booking {} cancelled by user {}", booking.code, owner.id);
        Ok(booking)
    }

    fn release_unit(&self, booking: &Booking) -> Result<()> {
        if booking.releases_unit() {
            self.catalog.mark_available(booking.unit_id)?;
            tracing::debug!("Unit {} is available again", booking.unit_id);
        }
        Ok(())
    }

    pub fn review_page(
        &self,
        unit_id: UnitId,
        rating: Option<u8>,
        sort: ReviewSort,
    ) -> Result<ReviewPage> {
        let reviews = self.reviews.reviews_for_unit(unit_id)?;
        let stats = rating_stats(&reviews);
        let view = filter_and_sort(&reviews, rating, sort)
            .into_iter()
            .cloned()
            .collect();
        Ok(ReviewPage {
            stats,
            reviews: view,
        })
    }

    pub fn submit_review(&self, actor: Option<&Actor>, submission: ReviewSubmission) -> Result<Review> {
        require_tenant(actor, "write a review")?;
        self.require_unit(submission.unit_id)?;

        let today = self.clock.today();
        let review = self
            .reviews
            .insert_review(&mut |id| submit_review(id, actor, submission.clone(), today))?;

        tracing::info!("📝 Review {} added to unit {}", review.id, review.unit_id);
        Ok(review)
    }

    /// Any signed-in user may vote; votes are not de-duplicated per user.
    pub fn vote_helpful(
        &self,
        actor: Option<&Actor>,
        unit_id: UnitId,
        review_id: ReviewId,
    ) -> Result<u32> {
        require_signed_in(actor)?;
        self.reviews.record_helpful_vote(unit_id, review_id)
    }

    pub fn toggle_favorite(&self, actor: Option<&Actor>, unit_id: UnitId) -> Result<bool> {
        let tenant = require_tenant(actor, "save favorites")?;
        self.require_unit(unit_id)?;

        let saved = self.favorites.toggle(tenant, unit_id)?;

        tracing::debug!(
            "❤️ Unit {} {} favorites of user {}",
            unit_id,
            if saved { "added to" } else { "removed from" },
            tenant.id
        );
        Ok(saved)
    }

    /// Saved units matching `criteria`. Rented favorites are still listed.
    pub fn favorites(&self, actor: Option<&Actor>, criteria: &SearchCriteria) -> Result<Vec<Unit>> {
        let tenant = require_tenant(actor, "view favorites")?;
        let set = self.favorites.load(tenant.id)?;
        let units = self.catalog.units()?;

        Ok(favorite_units(&units, &set)
            .into_iter()
            .filter(|unit| matches_criteria(unit, criteria))
            .cloned()
            .collect())
    }

    pub fn tenant_dashboard(&self, actor: Option<&Actor>) -> Result<TenantStats> {
        let tenant = require_tenant(actor, "view the tenant dashboard")?;
        let bookings = self.reservations.bookings_for_tenant(tenant.id)?;
        let favorites = self.favorites.load(tenant.id)?;
        Ok(tenant_stats(&bookings, favorites.len()))
    }

    pub fn manager_dashboard(&self, actor: Option<&Actor>) -> Result<ManagerStats> {
        require_manager(actor, "view the manager dashboard")?;
        let units = self.catalog.units()?;
        let bookings = self.reservations.bookings()?;
        Ok(manager_stats(&units, &bookings, self.clock.today()))
    }
}
