//! Authenticated actor model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity behind the current session.
///
/// Actors are created at sign-in and dropped at sign-out by the session
/// layer. An actor whose session is no longer valid is treated exactly
/// like an absent one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub session_valid: bool,
}

impl Actor {
    /// An actor with a live session.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            session_valid: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session_valid
    }
}

/// Narrow an optional actor down to one holding a valid session.
pub fn authenticated(actor: Option<&Actor>) -> Option<&Actor> {
    actor.filter(|a| a.is_authenticated())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_session_is_not_authenticated() {
        let mut actor = Actor::new(Uuid::new_v4());
        assert!(authenticated(Some(&actor)).is_some());

        actor.session_valid = false;
        assert!(authenticated(Some(&actor)).is_none());
        assert!(authenticated(None).is_none());
    }
}
