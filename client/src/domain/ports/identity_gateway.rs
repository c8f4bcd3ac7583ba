//! Port for the injected identity/session backend.
//!
//! The gateway performs the remote calls only; the session service owns the
//! observable current identity and maps these errors onto the user-facing
//! taxonomy.

use async_trait::async_trait;

use crate::domain::{Account, Credentials};

/// Errors raised by identity gateway adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityGatewayError {
    /// The backend rejected the email address as malformed.
    #[error("identity backend rejected the email address")]
    InvalidEmail,
    /// The email address is already registered.
    #[error("email address is already registered")]
    EmailInUse,
    /// The password does not meet the backend's strength policy.
    #[error("password does not meet the strength policy")]
    WeakPassword,
    /// Email/password sign-in is not enabled on the backend.
    #[error("email/password accounts are not enabled")]
    AuthDisabled,
    /// The account exists but has been disabled.
    #[error("account is disabled")]
    AccountDisabled,
    /// No account matches the email address.
    #[error("no account matches the email address")]
    AccountNotFound,
    /// The password does not match the account.
    #[error("password does not match the account")]
    WrongCredentials,
    /// Transport or unclassified backend failure.
    #[error("identity backend call failed: {message}")]
    Backend {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl IdentityGatewayError {
    /// Construct a [`IdentityGatewayError::Backend`] error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Port for account registration, sign-in, and session restoration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Register a new account and sign it in.
    async fn create_account(
        &self,
        credentials: &Credentials,
    ) -> Result<Account, IdentityGatewayError>;

    /// Sign an existing account in.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Account, IdentityGatewayError>;

    /// End the backend session.
    async fn sign_out(&self) -> Result<(), IdentityGatewayError>;

    /// Account restored from a persisted backend session, if one is valid.
    async fn restore_session(&self) -> Result<Option<Account>, IdentityGatewayError>;
}

/// Fixture implementation for tests that never authenticate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityGateway;

#[async_trait]
impl IdentityGateway for FixtureIdentityGateway {
    async fn create_account(
        &self,
        credentials: &Credentials,
    ) -> Result<Account, IdentityGatewayError> {
        fixture_account(credentials)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Account, IdentityGatewayError> {
        fixture_account(credentials)
    }

    async fn sign_out(&self) -> Result<(), IdentityGatewayError> {
        Ok(())
    }

    async fn restore_session(&self) -> Result<Option<Account>, IdentityGatewayError> {
        Ok(None)
    }
}

fn fixture_account(credentials: &Credentials) -> Result<Account, IdentityGatewayError> {
    let id = crate::domain::AccountId::new("fixture-account")
        .map_err(|err| IdentityGatewayError::backend(err.to_string()))?;
    Ok(Account::new(id, credentials.email().clone()))
}
