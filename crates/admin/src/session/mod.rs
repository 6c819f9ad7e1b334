//! Session gate: the single admin allow-list.
//!
//! The gate is a two-state machine. It moves to [`SessionState::Authorized`]
//! only for an identity whose email exactly equals the configured admin
//! address, and back to [`SessionState::Unauthenticated`] on sign-out or on
//! any other identity. The state is published on a `watch` channel so that
//! background work (the refresh task) can stop the moment authorization is
//! lost.

mod error;

pub use error::AuthError;

use circuit_cart_core::Email;
use tokio::sync::watch;

use crate::models::Identity;

/// Whether the dashboard may run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No identity, or an identity that is not the admin.
    #[default]
    Unauthenticated,
    /// Signed in as the allow-listed admin.
    Authorized(Identity),
}

impl SessionState {
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }
}

/// Gate comparing identities against the allow-listed admin email.
#[derive(Debug)]
pub struct SessionGate {
    allowed: Email,
    tx: watch::Sender<SessionState>,
}

impl SessionGate {
    /// Create a gate for `allowed`, starting unauthenticated.
    #[must_use]
    pub fn new(allowed: Email) -> Self {
        let (tx, _rx) = watch::channel(SessionState::Unauthenticated);
        Self { allowed, tx }
    }

    /// The allow-listed address.
    #[must_use]
    pub const fn allowed(&self) -> &Email {
        &self.allowed
    }

    /// Apply the result of an identity-provider callback.
    ///
    /// `None` (signed out, or the provider returned nothing) and any identity
    /// whose email is not an exact match leave the gate unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAllowed`] for an identity with another email
    /// (or none), and [`AuthError::NotAuthorized`] for no identity at all.
    pub fn evaluate(&self, identity: Option<Identity>) -> Result<(), AuthError> {
        let Some(identity) = identity else {
            self.tx.send_replace(SessionState::Unauthenticated);
            return Err(AuthError::NotAuthorized);
        };

        let email = identity.email.as_deref().unwrap_or_default();
        if self.allowed.matches(email) {
            tracing::info!(uid = %identity.uid, "Admin session authorized");
            self.tx.send_replace(SessionState::Authorized(identity));
            Ok(())
        } else {
            tracing::warn!(email, "Rejected sign-in from non-admin account");
            self.tx.send_replace(SessionState::Unauthenticated);
            Err(AuthError::NotAllowed {
                email: email.to_owned(),
            })
        }
    }

    /// Leave the authorized state.
    pub fn sign_out(&self) {
        let previous = self.tx.send_replace(SessionState::Unauthenticated);
        if previous.is_authorized() {
            tracing::info!("Admin session ended");
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.tx.borrow().is_authorized()
    }

    /// The authorized identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        match &*self.tx.borrow() {
            SessionState::Authorized(identity) => Some(identity.clone()),
            SessionState::Unauthenticated => None,
        }
    }

    /// Fail with [`AuthError::NotAuthorized`] unless authorized.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthorized`] while unauthenticated.
    pub fn require_authorized(&self) -> Result<(), AuthError> {
        if self.is_authorized() {
            Ok(())
        } else {
            Err(AuthError::NotAuthorized)
        }
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ADMIN: &str = "owner@circuitcart.in";

    fn gate() -> SessionGate {
        SessionGate::new(Email::parse(ADMIN).unwrap())
    }

    #[test]
    fn test_exact_match_authorizes() {
        let gate = gate();
        gate.evaluate(Some(Identity::with_email("g-1", ADMIN))).unwrap();
        assert!(gate.is_authorized());
        assert_eq!(gate.identity().unwrap().uid, "g-1");
    }

    #[test]
    fn test_other_email_stays_unauthenticated() {
        let gate = gate();
        for email in ["someone@example.in", "Owner@circuitcart.in", " owner@circuitcart.in"] {
            let err = gate
                .evaluate(Some(Identity::with_email("g-2", email)))
                .unwrap_err();
            assert_eq!(
                err,
                AuthError::NotAllowed {
                    email: email.to_string()
                }
            );
            assert_eq!(gate.state(), SessionState::Unauthenticated);
        }
    }

    #[test]
    fn test_identity_without_email_is_not_allowed() {
        let gate = gate();
        let identity = Identity {
            uid: "anon".to_string(),
            email: None,
            display_name: None,
        };
        assert!(matches!(
            gate.evaluate(Some(identity)),
            Err(AuthError::NotAllowed { .. })
        ));
        assert!(!gate.is_authorized());
    }

    #[test]
    fn test_no_identity_and_sign_out() {
        let gate = gate();
        assert_eq!(gate.evaluate(None), Err(AuthError::NotAuthorized));

        gate.evaluate(Some(Identity::with_email("g-1", ADMIN))).unwrap();
        gate.sign_out();
        assert!(!gate.is_authorized());
        assert_eq!(gate.require_authorized(), Err(AuthError::NotAuthorized));
    }

    #[tokio::test]
    async fn test_subscribers_see_sign_out() {
        let gate = gate();
        gate.evaluate(Some(Identity::with_email("g-1", ADMIN))).unwrap();
        let mut rx = gate.subscribe();
        assert!(rx.borrow_and_update().is_authorized());

        gate.sign_out();
        rx.changed().await.unwrap();
        assert!(!rx.borrow().is_authorized());
    }

    #[test]
    fn test_non_admin_after_admin_revokes() {
        let gate = gate();
        gate.evaluate(Some(Identity::with_email("g-1", ADMIN))).unwrap();
        let _ = gate.evaluate(Some(Identity::with_email("g-2", "x@y.in")));
        assert!(!gate.is_authorized());
    }
}
