pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use core::{
    booking::BookingCheckout, catalog::SearchCriteria, pricing::compute_total,
    service::RentalService,
};
pub use utils::error::{RentalError, Result};
