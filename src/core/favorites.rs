use crate::core::access::require_tenant;
use crate::domain::model::{Actor, FavoriteSet, Unit, UnitId};
use crate::utils::error::{RentalError, Result};

/// Toggles `unit_id` in the actor's own set and returns the new membership.
pub fn toggle_favorite(actor: Option<&Actor>, set: &mut FavoriteSet, unit_id: UnitId) -> Result<bool> {
    let actor = require_tenant(actor, "save favorites")?;
    if set.owner != actor.id {
        return Err(RentalError::CapabilityRequired {
            action: "change another user's favorites".to_string(),
            required: "favorites owner".to_string(),
        });
    }
    Ok(set.toggle(unit_id))
}

/// Catalog units present in `set`, in catalog order. Rented units are kept.
pub fn favorite_units<'a>(units: &'a [Unit], set: &FavoriteSet) -> Vec<&'a Unit> {
    units.iter().filter(|unit| set.contains(unit.id)).collect()
}
