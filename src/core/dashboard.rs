//! Summary figures for the tenant and manager home pages.

use crate::domain::model::{Booking, BookingStatus, Unit};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingCounts {
    pub total: usize,
    pub pending: usize,
    pub active: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occupancy {
    pub total: usize,
    pub available: usize,
    pub rented: usize,
    /// Rented share in percent, two decimals. 0 for an empty catalog.
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantStats {
    pub bookings: BookingCounts,
    pub total_spent: i64,
    pub favorites: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerStats {
    pub units: Occupancy,
    pub bookings: BookingCounts,
    pub revenue: i64,
    pub monthly_revenue: i64,
}

pub fn booking_counts(bookings: &[Booking]) -> BookingCounts {
    bookings.iter().fold(BookingCounts::default(), |mut counts, b| {
        counts.total += 1;
        match b.status {
            BookingStatus::Pending => counts.pending += 1,
            BookingStatus::Active => counts.active += 1,
            BookingStatus::Completed => counts.completed += 1,
            BookingStatus::Cancelled => counts.cancelled += 1,
            BookingStatus::Rejected => counts.rejected += 1,
        }
        counts
    })
}

pub fn occupancy(units: &[Unit]) -> Occupancy {
    let total = units.len();
    let available = units.iter().filter(|u| u.is_available()).count();
    let rented = total - available;
    let rate = if total == 0 {
        0.0
    } else {
        (rented as f64 / total as f64 * 10_000.0).round() / 100.0
    };

    Occupancy {
        total,
        available,
        rented,
        rate,
    }
}

/// Only active and completed bookings are paid for.
fn is_paid(booking: &Booking) -> bool {
    matches!(booking.status, BookingStatus::Active | BookingStatus::Completed)
}

fn paid_total<'a>(bookings: impl Iterator<Item = &'a Booking>) -> i64 {
    bookings.filter(|b| is_paid(b)).map(Booking::total).sum()
}

pub fn tenant_stats(bookings: &[Booking], favorites: usize) -> TenantStats {
    TenantStats {
        bookings: booking_counts(bookings),
        total_spent: paid_total(bookings.iter()),
        favorites,
    }
}

/// `today` picks the calendar month counted in `monthly_revenue`.
pub fn manager_stats(units: &[Unit], bookings: &[Booking], today: NaiveDate) -> ManagerStats {
    let this_month = bookings.iter().filter(|b| {
        let created = b.created_at.date_naive();
        created.year() == today.year() && created.month() == today.month()
    });

    ManagerStats {
        units: occupancy(units),
        bookings: booking_counts(bookings),
        revenue: paid_total(bookings.iter()),
        monthly_revenue: paid_total(this_month),
    }
}
