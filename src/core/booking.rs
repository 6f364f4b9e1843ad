use crate::core::access::{require_manager, require_tenant};
use crate::core::pricing::{lease_end_date, PricingCalculator};
use crate::domain::model::{
    Actor, Booking, BookingDraft, BookingStatus, LeaseDuration, PaymentMethod, PriceBreakdown,
    Unit,
};
use crate::utils::error::{RentalError, Result};
use crate::utils::validation::{parse_iso_date, validate_not_before};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Frozen at submission. Confirming uses these figures even if the catalog
/// price changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmationSnapshot {
    pub draft: BookingDraft,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: PriceBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum CheckoutState {
    Drafting(BookingDraft),
    Confirming(ConfirmationSnapshot),
    Completed(Booking),
}

impl CheckoutState {
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutState::Drafting(_) => "drafting",
            CheckoutState::Confirming(_) => "confirming",
            CheckoutState::Completed(_) => "completed",
        }
    }
}

/// Where the caller should send the user when a checkout cannot start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Authentication,
    Catalog,
}

pub fn redirect_for(err: &RentalError) -> Option<Redirect> {
    match err {
        RentalError::AuthenticationRequired | RentalError::CapabilityRequired { .. } => {
            Some(Redirect::Authentication)
        }
        RentalError::NoUnitSelected | RentalError::UnitUnavailable { .. } => {
            Some(Redirect::Catalog)
        }
        _ => None,
    }
}

pub fn booking_code(day: NaiveDate, sequence: u32) -> String {
    format!("BK{}{:03}", day.format("%Y%m%d"), sequence)
}

/// One checkout session for one unit. A new unit selection needs a new
/// instance; `Completed` is terminal.
#[derive(Debug, Clone)]
pub struct BookingCheckout {
    unit: Unit,
    tenant: Actor,
    pricing: PricingCalculator,
    state: CheckoutState,
}

impl BookingCheckout {
    pub fn start(
        actor: Option<&Actor>,
        unit: Option<&Unit>,
        pricing: PricingCalculator,
    ) -> Result<Self> {
        let tenant = require_tenant(actor, "book a unit")?;
        let unit = unit.ok_or(RentalError::NoUnitSelected)?;
        if !unit.is_available() {
            return Err(RentalError::UnitUnavailable { unit_id: unit.id });
        }

        tracing::debug!("Checkout started for unit {} by user {}", unit.id, tenant.id);

        Ok(Self {
            unit: unit.clone(),
            tenant: tenant.clone(),
            pricing,
            state: CheckoutState::Drafting(BookingDraft::new(unit.id, tenant.id)),
        })
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn tenant(&self) -> &Actor {
        &self.tenant
    }

    pub fn draft(&self) -> Option<&BookingDraft> {
        match &self.state {
            CheckoutState::Drafting(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Option<&ConfirmationSnapshot> {
        match &self.state {
            CheckoutState::Confirming(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn booking(&self) -> Option<&Booking> {
        match &self.state {
            CheckoutState::Completed(booking) => Some(booking),
            _ => None,
        }
    }

    fn invalid(&self, action: &str) -> RentalError {
        RentalError::InvalidTransition {
            state: self.state.name().to_string(),
            action: action.to_string(),
        }
    }

    fn draft_mut(&mut self, action: &str) -> Result<&mut BookingDraft> {
        let state = self.state.name();
        match &mut self.state {
            CheckoutState::Drafting(draft) => Ok(draft),
            _ => Err(RentalError::InvalidTransition {
                state: state.to_string(),
                action: action.to_string(),
            }),
        }
    }

    pub fn set_start_date(&mut self, start_date: NaiveDate) -> Result<()> {
        self.draft_mut("change the start date")?.start_date = Some(start_date);
        Ok(())
    }

    /// Accepts the raw date input. Blank clears the date; a malformed value
    /// is rejected and the draft is left as it was.
    pub fn set_start_date_str(&mut self, raw: &str) -> Result<()> {
        let parsed = if raw.trim().is_empty() {
            None
        } else {
            Some(parse_iso_date("start_date", raw)?)
        };
        self.draft_mut("change the start date")?.start_date = parsed;
        Ok(())
    }

    pub fn set_duration(&mut self, duration: LeaseDuration) -> Result<()> {
        self.draft_mut("change the duration")?.duration = duration;
        Ok(())
    }

    pub fn set_duration_months(&mut self, months: u32) -> Result<()> {
        let duration = LeaseDuration::try_from(months)?;
        self.set_duration(duration)
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<()> {
        self.draft_mut("change the payment method")?.payment_method = method;
        Ok(())
    }

    /// Drafting -> Confirming. On a guard failure the draft stays untouched.
    pub fn submit(&mut self, today: NaiveDate) -> Result<&ConfirmationSnapshot> {
        let draft = match &self.state {
            CheckoutState::Drafting(draft) => draft,
            _ => return Err(self.invalid("submit the booking form")),
        };

        let start_date = draft
            .start_date
            .ok_or_else(|| RentalError::validation("start_date", "start date required"))?;
        validate_not_before("start_date", start_date, today)?;

        let price = self.pricing.quote(self.unit.monthly_price, draft.duration)?;
        let end_date = lease_end_date(start_date, draft.duration)?;

        let snapshot = ConfirmationSnapshot {
            draft: draft.clone(),
            start_date,
            end_date,
            price,
        };
        tracing::debug!(
            "Booking draft for unit {} submitted, total {}",
            self.unit.id,
            price.total
        );
        self.state = CheckoutState::Confirming(snapshot);
        self.snapshot()
            .ok_or_else(|| self.invalid("submit the booking form"))
    }

    /// Confirming -> Drafting, dropping the computed snapshot.
    pub fn edit(&mut self) -> Result<&BookingDraft> {
        let draft = match &self.state {
            CheckoutState::Confirming(snapshot) => snapshot.draft.clone(),
            _ => return Err(self.invalid("edit the booking")),
        };
        self.state = CheckoutState::Drafting(draft);
        self.draft().ok_or_else(|| self.invalid("edit the booking"))
    }

    /// Builds the booking record for the current snapshot. The machine stays
    /// in `Confirming` until [`commit`](Self::commit) is called, so a failed
    /// hand-off to the stores can be retried.
    pub fn finalize(&self, code: String, now: DateTime<Utc>) -> Result<Booking> {
        let snapshot = self
            .snapshot()
            .ok_or_else(|| self.invalid("confirm the booking"))?;

        Ok(Booking {
            code,
            unit_id: snapshot.draft.unit_id,
            tenant_id: snapshot.draft.tenant_id,
            start_date: snapshot.start_date,
            end_date: snapshot.end_date,
            duration: snapshot.draft.duration,
            payment_method: snapshot.draft.payment_method,
            price: snapshot.price,
            created_at: now,
            status: BookingStatus::Pending,
            rejection_reason: None,
        })
    }

    /// Confirming -> Completed with a record produced by `finalize`.
    pub fn commit(&mut self, booking: Booking) -> Result<&Booking> {
        let matches = self
            .snapshot()
            .is_some_and(|s| s.draft.unit_id == booking.unit_id && s.price == booking.price);
        if !matches {
            return Err(self.invalid("confirm the booking"));
        }
        self.state = CheckoutState::Completed(booking);
        self.booking()
            .ok_or_else(|| self.invalid("confirm the booking"))
    }

    /// `finalize` followed by `commit`, for callers with nothing to persist.
    pub fn confirm(&mut self, code: String, now: DateTime<Utc>) -> Result<Booking> {
        let booking = self.finalize(code, now)?;
        self.commit(booking.clone())?;
        Ok(booking)
    }
}

impl Booking {
    fn advance(&mut self, from: &[BookingStatus], to: BookingStatus, action: &str) -> Result<()> {
        if !from.contains(&self.status) {
            return Err(RentalError::InvalidTransition {
                state: self.status.to_string(),
                action: action.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }

    /// pending -> active, once management approves the lease.
    pub fn activate(&mut self, actor: &Actor) -> Result<()> {
        require_manager(Some(actor), "activate a booking")?;
        self.advance(&[BookingStatus::Pending], BookingStatus::Active, "activate")
    }

    pub fn complete(&mut self, actor: &Actor) -> Result<()> {
        require_manager(Some(actor), "complete a booking")?;
        self.advance(&[BookingStatus::Active], BookingStatus::Completed, "complete")
    }

    /// pending -> rejected. A blank reason is recorded as "No reason provided".
    pub fn reject(&mut self, actor: &Actor, reason: &str) -> Result<()> {
        require_manager(Some(actor), "reject a booking")?;
        self.advance(&[BookingStatus::Pending], BookingStatus::Rejected, "reject")?;
        let reason = reason.trim();
        self.rejection_reason = Some(if reason.is_empty() {
            "No reason provided".to_string()
        } else {
            reason.to_string()
        });
        Ok(())
    }

    /// Only the tenant who made the booking can cancel it, while it is
    /// pending or active.
    pub fn cancel(&mut self, actor: &Actor) -> Result<()> {
        if actor.id != self.tenant_id {
            return Err(RentalError::CapabilityRequired {
                action: "cancel this booking".to_string(),
                required: "booking owner".to_string(),
            });
        }
        self.advance(
            &[BookingStatus::Pending, BookingStatus::Active],
            BookingStatus::Cancelled,
            "cancel",
        )
    }

    /// Rejected and cancelled bookings no longer hold their unit.
    pub fn releases_unit(&self) -> bool {
        matches!(self.status, BookingStatus::Rejected | BookingStatus::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Availability, Capability, UnitType};
    use chrono::TimeZone;

    fn tenant() -> Actor {
        Actor {
            id: 7,
            name: "Budi Santoso".to_string(),
            email: "budi@example.com".to_string(),
            capability: Capability::Tenant,
        }
    }

    fn manager() -> Actor {
        Actor {
            id: 1,
            name: "Pengelola".to_string(),
            email: "admin@example.com".to_string(),
            capability: Capability::Manager,
        }
    }

    fn studio() -> Unit {
        Unit {
            id: 1,
            name: "Unit A-101".to_string(),
            unit_type: UnitType::Studio,
            monthly_price: 3_500_000,
            size_sqm: 24.0,
            bedrooms: 0,
            bathrooms: 1,
            floor: 1,
            availability: Availability::Available,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()
    }

    fn checkout() -> BookingCheckout {
        BookingCheckout::start(Some(&tenant()), Some(&studio()), PricingCalculator::default())
            .unwrap()
    }

    #[test]
    fn test_start_requires_authenticated_tenant() {
        let unit = studio();
        let err = BookingCheckout::start(None, Some(&unit), PricingCalculator::default())
            .unwrap_err();
        assert!(matches!(err, RentalError::AuthenticationRequired));
        assert_eq!(redirect_for(&err), Some(Redirect::Authentication));

        let err = BookingCheckout::start(Some(&manager()), Some(&unit), PricingCalculator::default())
            .unwrap_err();
        assert!(matches!(err, RentalError::CapabilityRequired { .. }));
        assert_eq!(redirect_for(&err), Some(Redirect::Authentication));
    }

    #[test]
    fn test_start_requires_available_unit() {
        let err = BookingCheckout::start(Some(&tenant()), None, PricingCalculator::default())
            .unwrap_err();
        assert_eq!(redirect_for(&err), Some(Redirect::Catalog));

        let mut rented = studio();
        rented.availability = Availability::Rented;
        let err = BookingCheckout::start(Some(&tenant()), Some(&rented), PricingCalculator::default())
            .unwrap_err();
        assert!(matches!(err, RentalError::UnitUnavailable { unit_id: 1 }));
    }

    #[test]
    fn test_new_checkout_has_form_defaults() {
        let checkout = checkout();
        let draft = checkout.draft().unwrap();
        assert_eq!(draft.start_date, None);
        assert_eq!(draft.duration, LeaseDuration::SixMonths);
        assert_eq!(draft.payment_method, PaymentMethod::Transfer);
        assert_eq!(checkout.tenant().id, 7);
        assert_eq!(checkout.unit().id, draft.unit_id);
        assert!(checkout.booking().is_none());
    }

    #[test]
    fn test_submit_without_start_date_stays_drafting() {
        let mut checkout = checkout();
        let err = checkout.submit(today()).unwrap_err();
        assert!(matches!(err, RentalError::ValidationError { .. }));
        assert_eq!(err.user_friendly_message(), "start date required");
        assert_eq!(checkout.state().name(), "drafting");
    }

    #[test]
    fn test_submit_rejects_past_start_date() {
        let mut checkout = checkout();
        checkout
            .set_start_date(today().pred_opt().unwrap())
            .unwrap();
        assert!(checkout.submit(today()).is_err());
        assert!(checkout.draft().is_some());
    }

    #[test]
    fn test_submit_computes_snapshot_total() {
        let mut checkout = checkout();
        checkout.set_start_date(today()).unwrap();
        let snapshot = checkout.submit(today()).unwrap();
        assert_eq!(snapshot.price.total, 25_000_000);
        assert_eq!(snapshot.end_date, NaiveDate::from_ymd_opt(2026, 4, 20).unwrap());
    }

    #[test]
    fn test_malformed_date_leaves_draft_unchanged() {
        let mut checkout = checkout();
        checkout.set_start_date(today()).unwrap();
        assert!(checkout.set_start_date_str("20/10/2025").is_err());
        assert_eq!(checkout.draft().unwrap().start_date, Some(today()));

        checkout.set_start_date_str("").unwrap();
        assert_eq!(checkout.draft().unwrap().start_date, None);
    }

    #[test]
    fn test_invalid_duration_is_a_validation_error() {
        let mut checkout = checkout();
        let err = checkout.set_duration_months(9).unwrap_err();
        assert!(matches!(err, RentalError::ValidationError { .. }));
        assert_eq!(checkout.draft().unwrap().duration, LeaseDuration::SixMonths);
    }

    #[test]
    fn test_edit_returns_to_drafting_with_same_inputs() {
        let mut checkout = checkout();
        checkout.set_start_date(today()).unwrap();
        checkout.set_duration(LeaseDuration::TwelveMonths).unwrap();
        checkout.submit(today()).unwrap();

        assert!(checkout.set_duration(LeaseDuration::ThreeMonths).is_err());

        let draft = checkout.edit().unwrap();
        assert_eq!(draft.duration, LeaseDuration::TwelveMonths);
        assert!(checkout.snapshot().is_none());
    }

    #[test]
    fn test_confirm_emits_pending_booking_and_is_terminal() {
        let mut checkout = checkout();
        checkout.set_start_date(today()).unwrap();
        checkout.set_payment_method(PaymentMethod::Installment).unwrap();
        checkout.submit(today()).unwrap();

        let now = Utc.with_ymd_and_hms(2025, 10, 20, 9, 30, 0).unwrap();
        let booking = checkout
            .confirm(booking_code(today(), 1), now)
            .unwrap();
        assert_eq!(booking.code, "BK20251020001");
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.total(), 25_000_000);
        assert_eq!(booking.payment_method, PaymentMethod::Installment);
        assert_eq!(booking.created_at, now);

        assert_eq!(checkout.state().name(), "completed");
        assert_eq!(checkout.booking(), Some(&booking));
        assert!(checkout.edit().is_err());
        assert!(checkout.confirm("BK20251020002".to_string(), now).is_err());
    }

    #[test]
    fn test_confirm_requires_confirming_state() {
        let mut checkout = checkout();
        let err = checkout
            .confirm("BK20251020001".to_string(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, RentalError::InvalidTransition { .. }));
    }

    #[test]
    fn test_booking_lifecycle_guards() {
        let mut checkout = checkout();
        checkout.set_start_date(today()).unwrap();
        checkout.submit(today()).unwrap();
        let mut booking = checkout.confirm(booking_code(today(), 3), Utc::now()).unwrap();

        assert!(booking.activate(&tenant()).is_err());
        booking.activate(&manager()).unwrap();
        assert_eq!(booking.status, BookingStatus::Active);

        booking.complete(&manager()).unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
        assert!(booking.cancel(&tenant()).is_err());
        assert!(!booking.releases_unit());
    }

    #[test]
    fn test_only_owner_cancels_pending_booking() {
        let mut checkout = checkout();
        checkout.set_start_date(today()).unwrap();
        checkout.submit(today()).unwrap();
        let mut booking = checkout.confirm(booking_code(today(), 4), Utc::now()).unwrap();

        let mut stranger = tenant();
        stranger.id = 99;
        assert!(booking.cancel(&stranger).is_err());

        booking.cancel(&tenant()).unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert!(booking.releases_unit());
    }

    #[test]
    fn test_active_booking_can_be_cancelled_by_owner() {
        let mut checkout = checkout();
        checkout.set_start_date(today()).unwrap();
        checkout.submit(today()).unwrap();
        let mut booking = checkout.confirm(booking_code(today(), 5), Utc::now()).unwrap();

        booking.activate(&manager()).unwrap();
        booking.cancel(&tenant()).unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert!(booking.cancel(&tenant()).is_err());
    }

    #[test]
    fn test_manager_rejects_pending_booking_with_reason() {
        let mut checkout = checkout();
        checkout.set_start_date(today()).unwrap();
        checkout.submit(today()).unwrap();
        let mut booking = checkout.confirm(booking_code(today(), 6), Utc::now()).unwrap();

        assert!(matches!(
            booking.reject(&tenant(), "dokumen kurang"),
            Err(RentalError::CapabilityRequired { .. })
        ));
        booking.reject(&manager(), "  dokumen kurang ").unwrap();
        assert_eq!(booking.status, BookingStatus::Rejected);
        assert_eq!(booking.rejection_reason.as_deref(), Some("dokumen kurang"));
        assert!(booking.releases_unit());

        // 已拒絕的訂單不能再核准或取消
        assert!(booking.activate(&manager()).is_err());
        assert!(booking.cancel(&tenant()).is_err());
    }

    #[test]
    fn test_blank_rejection_reason_gets_default() {
        let mut checkout = checkout();
        checkout.set_start_date(today()).unwrap();
        checkout.submit(today()).unwrap();
        let mut booking = checkout.confirm(booking_code(today(), 7), Utc::now()).unwrap();

        booking.reject(&manager(), "").unwrap();
        assert_eq!(booking.rejection_reason.as_deref(), Some("No reason provided"));
    }

    #[test]
    fn test_finalize_leaves_checkout_in_confirming() {
        let mut checkout = checkout();
        checkout.set_start_date(today()).unwrap();
        checkout.submit(today()).unwrap();

        let now = Utc.with_ymd_and_hms(2025, 10, 20, 9, 30, 0).unwrap();
        let booking = checkout.finalize(booking_code(today(), 1), now).unwrap();
        assert_eq!(checkout.state().name(), "confirming");

        // 可以重試，產生相同的紀錄
        let again = checkout.finalize(booking_code(today(), 1), now).unwrap();
        assert_eq!(booking, again);

        assert_eq!(checkout.commit(booking.clone()).unwrap(), &booking);
        assert_eq!(checkout.state().name(), "completed");
        assert!(checkout.finalize(booking_code(today(), 2), now).is_err());
        assert!(checkout.commit(again).is_err());
    }
}
