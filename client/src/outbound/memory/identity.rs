//! In-memory identity backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::ports::{IdentityGateway, IdentityGatewayError};
use crate::domain::{Account, AccountId, Credentials, PASSWORD_MIN};

struct StoredAccount {
    account: Account,
    password: String,
    disabled: bool,
}

struct IdentityData {
    // Keyed by email address; the backend enforces one account per email.
    accounts: HashMap<String, StoredAccount>,
    session: Option<Account>,
    password_auth_enabled: bool,
}

impl IdentityData {
    fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            session: None,
            password_auth_enabled: true,
        }
    }
}

/// Identity backend holding accounts and the persisted session in memory.
///
/// Mirrors the hosted backend's policy checks (duplicate emails, password
/// strength, disabled accounts, disabled password auth) so every
/// [`IdentityGatewayError`] variant can be produced in tests.
pub struct MemoryIdentityGateway {
    data: Mutex<IdentityData>,
}

impl MemoryIdentityGateway {
    /// Create an empty identity backend with password auth enabled.
    pub fn new() -> Self {
        Self {
            data: Mutex::new(IdentityData::new()),
        }
    }

    /// Mark an existing account as disabled; `false` when the email is
    /// unknown.
    pub async fn disable_account(&self, email: &str) -> bool {
        let mut data = self.data.lock().await;
        match data.accounts.get_mut(email) {
            Some(stored) => {
                stored.disabled = true;
                true
            }
            None => false,
        }
    }

    /// Toggle the email/password sign-in method, as a backend operator
    /// would.
    pub async fn set_password_auth_enabled(&self, enabled: bool) {
        self.data.lock().await.password_auth_enabled = enabled;
    }
}

impl Default for MemoryIdentityGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityGateway for MemoryIdentityGateway {
    async fn create_account(
        &self,
        credentials: &Credentials,
    ) -> Result<Account, IdentityGatewayError> {
        let mut data = self.data.lock().await;
        if !data.password_auth_enabled {
            return Err(IdentityGatewayError::AuthDisabled);
        }
        let email = credentials.email().as_ref().to_owned();
        if data.accounts.contains_key(&email) {
            return Err(IdentityGatewayError::EmailInUse);
        }
        if credentials.password().chars().count() < PASSWORD_MIN {
            return Err(IdentityGatewayError::WeakPassword);
        }

        let id = AccountId::new(Uuid::new_v4().simple().to_string())
            .map_err(|err| IdentityGatewayError::backend(err.to_string()))?;
        let account = Account::new(id, credentials.email().clone());
        data.accounts.insert(
            email,
            StoredAccount {
                account: account.clone(),
                password: credentials.password().to_owned(),
                disabled: false,
            },
        );
        data.session = Some(account.clone());
        Ok(account)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Account, IdentityGatewayError> {
        let mut data = self.data.lock().await;
        if !data.password_auth_enabled {
            return Err(IdentityGatewayError::AuthDisabled);
        }
        let email = credentials.email().as_ref();
        let stored = data
            .accounts
            .get(email)
            .ok_or(IdentityGatewayError::AccountNotFound)?;
        if stored.disabled {
            return Err(IdentityGatewayError::AccountDisabled);
        }
        if stored.password != credentials.password() {
            return Err(IdentityGatewayError::WrongCredentials);
        }
        let account = stored.account.clone();
        data.session = Some(account.clone());
        Ok(account)
    }

    async fn sign_out(&self) -> Result<(), IdentityGatewayError> {
        self.data.lock().await.session = None;
        Ok(())
    }

    async fn restore_session(&self) -> Result<Option<Account>, IdentityGatewayError> {
        Ok(self.data.lock().await.session.clone())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials::try_from_parts(email, password).expect("valid credentials")
    }

    #[tokio::test]
    async fn registration_persists_a_session_and_rejects_duplicates() {
        let gateway = MemoryIdentityGateway::new();
        let account = gateway
            .create_account(&credentials("ada@example.com", "hunter42"))
            .await
            .expect("first registration succeeds");

        assert_eq!(account.email().as_ref(), "ada@example.com");
        assert_eq!(
            gateway.restore_session().await.expect("restore succeeds"),
            Some(account)
        );

        let err = gateway
            .create_account(&credentials("ada@example.com", "other-pw"))
            .await
            .expect_err("duplicate email fails");
        assert_eq!(err, IdentityGatewayError::EmailInUse);
    }

    #[tokio::test]
    async fn sign_in_checks_password_and_account_state() {
        let gateway = MemoryIdentityGateway::new();
        gateway
            .create_account(&credentials("ada@example.com", "hunter42"))
            .await
            .expect("registration succeeds");
        gateway.sign_out().await.expect("sign-out succeeds");

        let err = gateway
            .sign_in(&credentials("ada@example.com", "wrong"))
            .await
            .expect_err("wrong password fails");
        assert_eq!(err, IdentityGatewayError::WrongCredentials);

        let err = gateway
            .sign_in(&credentials("nobody@example.com", "hunter42"))
            .await
            .expect_err("unknown email fails");
        assert_eq!(err, IdentityGatewayError::AccountNotFound);

        assert!(gateway.disable_account("ada@example.com").await);
        let err = gateway
            .sign_in(&credentials("ada@example.com", "hunter42"))
            .await
            .expect_err("disabled account fails");
        assert_eq!(err, IdentityGatewayError::AccountDisabled);
    }

    #[tokio::test]
    async fn disabled_password_auth_blocks_both_operations() {
        let gateway = MemoryIdentityGateway::new();
        gateway.set_password_auth_enabled(false).await;

        let err = gateway
            .create_account(&credentials("ada@example.com", "hunter42"))
            .await
            .expect_err("registration is blocked");
        assert_eq!(err, IdentityGatewayError::AuthDisabled);

        let err = gateway
            .sign_in(&credentials("ada@example.com", "hunter42"))
            .await
            .expect_err("sign-in is blocked");
        assert_eq!(err, IdentityGatewayError::AuthDisabled);
    }

    #[tokio::test]
    async fn weak_passwords_are_rejected_by_the_backend_policy() {
        let gateway = MemoryIdentityGateway::new();
        let err = gateway
            .create_account(&credentials("ada@example.com", "abc"))
            .await
            .expect_err("short password fails");
        assert_eq!(err, IdentityGatewayError::WeakPassword);
    }

    #[tokio::test]
    async fn sign_out_clears_the_persisted_session() {
        let gateway = MemoryIdentityGateway::new();
        gateway
            .create_account(&credentials("ada@example.com", "hunter42"))
            .await
            .expect("registration succeeds");

        gateway.sign_out().await.expect("sign-out succeeds");
        assert_eq!(
            gateway.restore_session().await.expect("restore succeeds"),
            None
        );
    }
}
