use crate::domain::model::{LeaseDuration, PriceBreakdown};
use crate::utils::error::{RentalError, Result};
use chrono::{Months, NaiveDate};

/// Flat administration fee charged once per booking.
pub const ADMIN_FEE: i64 = 500_000;

/// `monthly_price * duration_months + monthly_price + ADMIN_FEE`.
pub fn compute_total(monthly_price: i64, duration_months: u32) -> Result<i64> {
    let duration = LeaseDuration::try_from(duration_months).map_err(|_| {
        RentalError::invalid_input(format!(
            "unsupported lease duration: {} months",
            duration_months
        ))
    })?;
    PricingCalculator::default()
        .quote(monthly_price, duration)
        .map(|breakdown| breakdown.total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingCalculator {
    admin_fee: i64,
}

impl Default for PricingCalculator {
    fn default() -> Self {
        Self {
            admin_fee: ADMIN_FEE,
        }
    }
}

impl PricingCalculator {
    pub fn new(admin_fee: i64) -> Result<Self> {
        if admin_fee < 0 {
            return Err(RentalError::invalid_input(format!(
                "admin fee cannot be negative: {}",
                admin_fee
            )));
        }
        Ok(Self { admin_fee })
    }

    pub fn admin_fee(&self) -> i64 {
        self.admin_fee
    }

    pub fn quote(&self, monthly_price: i64, duration: LeaseDuration) -> Result<PriceBreakdown> {
        if monthly_price <= 0 {
            return Err(RentalError::invalid_input(format!(
                "monthly price must be positive: {}",
                monthly_price
            )));
        }

        let overflow =
            || RentalError::invalid_input(format!("total overflows for price {}", monthly_price));

        let rent = monthly_price
            .checked_mul(i64::from(duration.months()))
            .ok_or_else(overflow)?;
        let deposit = monthly_price;
        let total = rent
            .checked_add(deposit)
            .and_then(|sum| sum.checked_add(self.admin_fee))
            .ok_or_else(overflow)?;

        Ok(PriceBreakdown {
            monthly_price,
            rent,
            deposit,
            admin_fee: self.admin_fee,
            total,
        })
    }
}

/// Last day covered by the lease is the day before this date.
pub fn lease_end_date(start: NaiveDate, duration: LeaseDuration) -> Result<NaiveDate> {
    start
        .checked_add_months(Months::new(duration.months()))
        .ok_or_else(|| RentalError::invalid_input(format!("lease end out of range for {}", start)))
}
