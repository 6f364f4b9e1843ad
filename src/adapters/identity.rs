use crate::domain::model::Actor;
use crate::domain::ports::IdentityProvider;

/// Identity fixed at startup, e.g. from the `[identity]` config section.
/// `None` behaves like a signed-out visitor.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    actor: Option<Actor>,
}

impl StaticIdentity {
    pub fn signed_in(actor: Actor) -> Self {
        Self { actor: Some(actor) }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_actor(&self) -> Option<Actor> {
        self.actor.clone()
    }
}
