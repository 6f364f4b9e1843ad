//! Capability guards shared by the booking, review, favorites and dashboard
//! operations.

use crate::domain::model::{Actor, Capability};
use crate::utils::error::{RentalError, Result};

pub fn require_signed_in(actor: Option<&Actor>) -> Result<&Actor> {
    actor.ok_or(RentalError::AuthenticationRequired)
}

pub fn require_capability<'a>(
    actor: Option<&'a Actor>,
    capability: Capability,
    action: &str,
) -> Result<&'a Actor> {
    let actor = require_signed_in(actor)?;
    if actor.capability != capability {
        return Err(RentalError::CapabilityRequired {
            action: action.to_string(),
            required: capability.to_string(),
        });
    }
    Ok(actor)
}

pub fn require_tenant<'a>(actor: Option<&'a Actor>, action: &str) -> Result<&'a Actor> {
    require_capability(actor, Capability::Tenant, action)
}

pub fn require_manager<'a>(actor: Option<&'a Actor>, action: &str) -> Result<&'a Actor> {
    require_capability(actor, Capability::Manager, action)
}
