//! Identity types exchanged with the federated identity provider.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// An authenticated identity returned by the identity provider.
///
/// Being authenticated is not the same as being allowed in: the session gate
/// still compares `email` against the allow-listed address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned subject id.
    pub uid: String,
    /// Email claim, if the provider released one.
    pub email: Option<String>,
    /// Display name claim.
    pub display_name: Option<String>,
}

impl Identity {
    /// Identity with just an email claim.
    #[must_use]
    pub fn with_email(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: Some(email.into()),
            display_name: None,
        }
    }
}

/// Token obtained from the federated sign-in popup (e.g. a Google id token).
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct FederatedCredential {
    /// Provider name as understood by the backend (`google`, `apple`, ...).
    pub provider: String,
    /// The provider-issued id token.
    pub id_token: SecretString,
}

impl FederatedCredential {
    /// Build a credential for `provider`.
    #[must_use]
    pub fn new(provider: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            id_token: SecretString::from(id_token.into()),
        }
    }
}

impl std::fmt::Debug for FederatedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FederatedCredential")
            .field("provider", &self.provider)
            .field("id_token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_redacts_token() {
        let credential = FederatedCredential::new("google", "eyJhbGciOiJSUzI1NiJ9.secret");
        let debug_output = format!("{credential:?}");
        assert!(debug_output.contains("google"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("secret"));
    }
}
