// Adapters layer: concrete implementations of the domain ports.

pub mod catalog_file;
pub mod clock;
pub mod identity;
pub mod memory;

pub use catalog_file::CatalogData;
pub use clock::{FixedClock, SystemClock};
pub use identity::StaticIdentity;
pub use memory::{
    in_memory_service, InMemoryCatalog, InMemoryFavorites, InMemoryReservations, InMemoryReviews,
    InMemoryService,
};
