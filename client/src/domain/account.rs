//! Account identity model and credential primitives.
//!
//! Keep presentation payload parsing outside the domain by exposing
//! constructors that validate string inputs before a caller talks to a port
//! or service.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Minimum allowed password length on the registration surface.
pub const PASSWORD_MIN: usize = 6;

/// Validation errors returned by the account constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    /// Account id was missing or blank once trimmed.
    EmptyId,
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email did not match the address grammar.
    InvalidEmail,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "account id must not be empty"),
            Self::EmptyEmail => write!(f, "email address must not be empty"),
            Self::InvalidEmail => write!(f, "email address is malformed"),
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Opaque account identifier assigned by the identity backend.
///
/// The backend decides the format; this layer only requires the value to be
/// non-empty and treats it as stable for the lifetime of the account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Validate and construct an [`AccountId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, AccountValidationError> {
        if id.trim().is_empty() {
            return Err(AccountValidationError::EmptyId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Standard address grammar: local part, one @, dotted domain.
        let pattern = "^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\\.[A-Za-z0-9-]+)*\\.[A-Za-z]{2,}$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Validated email address.
///
/// ## Invariants
/// - The value is trimmed and matches the address grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`] from borrowed input.
    pub fn new(email: impl AsRef<str>) -> Result<Self, AccountValidationError> {
        Self::from_owned(email.as_ref().to_owned())
    }

    fn from_owned(email: String) -> Result<Self, AccountValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(AccountValidationError::EmptyEmail);
        }
        if !email_regex().is_match(normalized) {
            return Err(AccountValidationError::InvalidEmail);
        }
        Ok(Self(normalized.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Authenticated identity capable of owning recipes.
///
/// ## Invariants
/// - `id` is non-empty and never changes once assigned by the backend.
/// - `email` matches the address grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "AccountDto", into = "AccountDto")]
pub struct Account {
    id: AccountId,
    email: EmailAddress,
}

impl Account {
    /// Assemble an account from already-validated parts.
    pub fn new(id: AccountId, email: EmailAddress) -> Self {
        Self { id, email }
    }

    /// Stable identifier assigned by the identity backend.
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Email address the account was registered with.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountDto {
    id: String,
    email: String,
}

impl From<Account> for AccountDto {
    fn from(value: Account) -> Self {
        Self {
            id: value.id.into(),
            email: value.email.into(),
        }
    }
}

impl TryFrom<AccountDto> for Account {
    type Error = AccountValidationError;

    fn try_from(value: AccountDto) -> Result<Self, Self::Error> {
        Ok(Account {
            id: AccountId::try_from(value.id)?,
            email: EmailAddress::try_from(value.email)?,
        })
    }
}

/// Domain error returned when credential values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or did not match the address grammar.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is malformed"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Validated sign-in credentials handed to the identity gateway.
///
/// ## Invariants
/// - `email` is trimmed and matches the address grammar.
/// - `password` is non-empty but retains caller-provided whitespace to avoid
///   surprising credential comparisons.
///
/// The password buffer is wiped on drop.
///
/// # Examples
/// ```
/// use client::domain::Credentials;
///
/// let creds = Credentials::try_from_parts("ada@example.com", "hunter42")
///     .expect("valid credentials");
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password(), "hunter42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email =
            EmailAddress::new(email).map_err(|_| CredentialsValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address used for the backend lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
