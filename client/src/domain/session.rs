//! Process-wide account session observable.
//!
//! Owns the current identity, the register/login/logout/bootstrap operations
//! against the injected identity gateway, and an explicit publish/subscribe
//! surface over state changes. Local credential checks run before any backend
//! call so a malformed email or weak password never leaves the process.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::domain::ports::{IdentityGateway, IdentityGatewayError};
use crate::domain::{
    Account, Credentials, CredentialsValidationError, Error, ErrorCode, PASSWORD_MIN,
};

/// Session lifecycle states published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No identity is signed in.
    Unauthenticated,
    /// A register or login backend call is in flight.
    Authenticating,
    /// The contained account is signed in.
    Authenticated(Account),
}

impl SessionState {
    /// Signed-in account, when one is present.
    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::Authenticated(account) => Some(account),
            Self::Unauthenticated | Self::Authenticating => None,
        }
    }

    /// Whether an account is signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Token returned by [`SessionService::subscribe`] for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&SessionState) + Send + Sync>;

/// Observable session holding at most one authenticated identity.
///
/// All mutating operations notify subscribers synchronously after each state
/// change, on the calling task.
///
/// # Examples
/// ```
/// # use std::sync::Arc;
/// # use client::domain::SessionService;
/// # use client::domain::ports::FixtureIdentityGateway;
/// # async fn example() -> Result<(), client::domain::Error> {
/// let session = SessionService::new(Arc::new(FixtureIdentityGateway));
/// let account = session.register("ada@example.com", "hunter42").await?;
/// assert_eq!(session.current_account().as_ref(), Some(&account));
/// # Ok(())
/// # }
/// ```
pub struct SessionService<G> {
    gateway: Arc<G>,
    state: Mutex<SessionState>,
    observers: Mutex<BTreeMap<SubscriptionId, Observer>>,
    next_subscription: AtomicU64,
    restored: AtomicBool,
}

impl<G> SessionService<G> {
    /// Create a session service over an identity gateway.
    ///
    /// The initial state is [`SessionState::Unauthenticated`] until
    /// [`bootstrap`](Self::bootstrap) resolves or an operation signs in.
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            state: Mutex::new(SessionState::Unauthenticated),
            observers: Mutex::new(BTreeMap::new()),
            next_subscription: AtomicU64::new(0),
            restored: AtomicBool::new(false),
        }
    }

    /// Snapshot of the present session state.
    pub fn state(&self) -> SessionState {
        lock_unpoisoned(&self.state).clone()
    }

    /// Currently signed-in account, if any.
    pub fn current_account(&self) -> Option<Account> {
        self.state().account().cloned()
    }

    /// Register `observer` for state-change notifications.
    ///
    /// The observer is invoked synchronously on whichever task performs a
    /// state change, after the change is visible.
    pub fn subscribe(
        &self,
        observer: impl Fn(&SessionState) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock_unpoisoned(&self.observers).insert(id, Arc::new(observer));
        id
    }

    /// Remove a previously registered observer.
    ///
    /// Returns `false` when the id is unknown or already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        lock_unpoisoned(&self.observers).remove(&id).is_some()
    }

    fn transition(&self, next: SessionState) {
        *lock_unpoisoned(&self.state) = next.clone();
        self.notify(&next);
    }

    fn notify(&self, state: &SessionState) {
        // Collect before invoking so observer callbacks run without the
        // registry lock and may subscribe or unsubscribe freely.
        let observers: Vec<Observer> = lock_unpoisoned(&self.observers).values().cloned().collect();
        for observer in observers {
            observer(state);
        }
    }
}

impl<G> SessionService<G>
where
    G: IdentityGateway,
{
    /// Register a new account and sign it in.
    ///
    /// Email grammar and password length are checked locally first; a
    /// malformed email or weak password fails without a backend call.
    pub async fn register(&self, email: &str, password: &str) -> Result<Account, Error> {
        let credentials = registration_credentials(email, password)?;
        self.transition(SessionState::Authenticating);
        match self.gateway.create_account(&credentials).await {
            Ok(account) => {
                debug!(account = %account.id(), "account registered");
                self.transition(SessionState::Authenticated(account.clone()));
                Ok(account)
            }
            Err(error) => {
                self.transition(SessionState::Unauthenticated);
                Err(map_register_error(error))
            }
        }
    }

    /// Sign an existing account in.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, Error> {
        let credentials = login_credentials(email, password)?;
        self.transition(SessionState::Authenticating);
        match self.gateway.sign_in(&credentials).await {
            Ok(account) => {
                debug!(account = %account.id(), "account signed in");
                self.transition(SessionState::Authenticated(account.clone()));
                Ok(account)
            }
            Err(error) => {
                self.transition(SessionState::Unauthenticated);
                Err(map_login_error(error))
            }
        }
    }

    /// Sign the current account out.
    ///
    /// When the backend sign-out call fails the state is left unchanged and
    /// the failure surfaces as a session error.
    pub async fn logout(&self) -> Result<(), Error> {
        if let Err(error) = self.gateway.sign_out().await {
            warn!(%error, "sign-out failed");
            return Err(Error::session_error("Failed to log out."));
        }
        debug!("account signed out");
        self.transition(SessionState::Unauthenticated);
        Ok(())
    }

    /// One-time session-restore check.
    ///
    /// The first call asks the gateway whether a prior backend session is
    /// still valid and resolves the state accordingly, notifying subscribers
    /// once resolved. Later calls answer from the already-resolved state
    /// without touching the backend. A gateway failure resolves to no
    /// session.
    pub async fn bootstrap(&self) -> Option<Account> {
        if self.restored.swap(true, Ordering::SeqCst) {
            return self.current_account();
        }
        let restored = match self.gateway.restore_session().await {
            Ok(account) => account,
            Err(error) => {
                warn!(%error, "session restore failed");
                None
            }
        };
        debug!(restored = restored.is_some(), "session bootstrap resolved");
        let resolved = {
            let mut state = lock_unpoisoned(&self.state);
            // An operation that raced ahead of bootstrap wins; the restored
            // session only fills an untouched state.
            if let Some(account) = restored {
                if matches!(*state, SessionState::Unauthenticated) {
                    *state = SessionState::Authenticated(account);
                }
            }
            state.clone()
        };
        self.notify(&resolved);
        resolved.account().cloned()
    }
}

// Guards wrap plain reads and map edits only, so a poisoned guard still
// holds consistent data.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn registration_credentials(email: &str, password: &str) -> Result<Credentials, Error> {
    let credentials = Credentials::try_from_parts(email, password).map_err(|error| match error {
        CredentialsValidationError::InvalidEmail => invalid_email_error(),
        CredentialsValidationError::EmptyPassword => weak_password_error(),
    })?;
    if credentials.password().chars().count() < PASSWORD_MIN {
        return Err(weak_password_error());
    }
    Ok(credentials)
}

fn login_credentials(email: &str, password: &str) -> Result<Credentials, Error> {
    Credentials::try_from_parts(email, password).map_err(|error| match error {
        CredentialsValidationError::InvalidEmail => invalid_email_error(),
        CredentialsValidationError::EmptyPassword => {
            Error::new(ErrorCode::WrongCredentials, "Incorrect password.")
        }
    })
}

fn invalid_email_error() -> Error {
    Error::new(ErrorCode::InvalidEmail, "Please enter a valid email address.")
}

fn weak_password_error() -> Error {
    Error::new(
        ErrorCode::WeakPassword,
        "Please choose a stronger password (at least 6 characters).",
    )
}

fn map_register_error(error: IdentityGatewayError) -> Error {
    match error {
        IdentityGatewayError::InvalidEmail => invalid_email_error(),
        IdentityGatewayError::EmailInUse => Error::new(
            ErrorCode::EmailInUse,
            "This email is already registered. Please use a different email or try logging in.",
        ),
        IdentityGatewayError::WeakPassword => weak_password_error(),
        IdentityGatewayError::AuthDisabled => Error::new(
            ErrorCode::AuthDisabled,
            "Email/password accounts are not enabled. Please contact support.",
        ),
        other => {
            warn!(error = %other, "account registration failed");
            Error::backend("Failed to create an account.")
        }
    }
}

fn map_login_error(error: IdentityGatewayError) -> Error {
    match error {
        IdentityGatewayError::InvalidEmail => invalid_email_error(),
        IdentityGatewayError::AccountDisabled => Error::new(
            ErrorCode::AccountDisabled,
            "This account has been disabled. Please contact support.",
        ),
        IdentityGatewayError::AccountNotFound => {
            Error::new(ErrorCode::AccountNotFound, "No account found with this email.")
        }
        IdentityGatewayError::WrongCredentials => {
            Error::new(ErrorCode::WrongCredentials, "Incorrect password.")
        }
        other => {
            warn!(error = %other, "sign-in failed");
            Error::backend("Failed to log in.")
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
