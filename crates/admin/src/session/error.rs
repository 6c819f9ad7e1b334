//! Authentication errors.

use thiserror::Error;

/// Errors from signing in or from acting without an authorized session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The operator closed the sign-in popup.
    #[error("Sign-in was cancelled")]
    Cancelled,

    /// The identity provider or the backend refused the credential.
    #[error("Identity provider error: {0}")]
    Provider(String),

    /// Signed in, but not as the allow-listed admin.
    #[error("{email} is not allowed to use the admin dashboard")]
    NotAllowed { email: String },

    /// An operation was attempted without an authorized session.
    #[error("Not authorized")]
    NotAuthorized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_allowed_names_the_account() {
        let err = AuthError::NotAllowed {
            email: "someone@example.in".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "someone@example.in is not allowed to use the admin dashboard"
        );
    }
}
