pub mod access;
pub mod booking;
pub mod catalog;
pub mod dashboard;
pub mod favorites;
pub mod pricing;
pub mod reviews;
pub mod service;

pub use crate::domain::model::{
    Actor, Availability, Booking, BookingDraft, BookingStatus, Capability, FavoriteSet,
    LeaseDuration, PaymentMethod, PriceBreakdown, Review, ReviewId, Unit, UnitId, UnitType,
    UserId,
};
pub use crate::domain::ports::{
    CatalogStore, Clock, ConfigProvider, FavoriteStore, IdentityProvider, ReservationStore,
    ReviewStore,
};
pub use crate::utils::error::Result;
