//! Reqwest-backed identity gateway adapter.
//!
//! This adapter owns transport details only: credential serialisation, HTTP
//! error mapping, and decoding of session payloads. A successful
//! registration or sign-in stores the returned session token on the shared
//! [`RestBackend`]; sign-out and expired sessions clear it.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::client::{RestBackend, status_message};
use crate::domain::ports::{IdentityGateway, IdentityGatewayError};
use crate::domain::{Account, Credentials};

/// Identity gateway backed by the hosted auth endpoints.
pub struct RestIdentityGateway {
    backend: Arc<RestBackend>,
}

impl RestIdentityGateway {
    /// Build a gateway over the shared transport handle.
    pub fn new(backend: Arc<RestBackend>) -> Self {
        Self { backend }
    }

    async fn post_credentials(
        &self,
        path: &str,
        credentials: &Credentials,
    ) -> Result<SessionDto, IdentityGatewayError> {
        let url = self.backend.endpoint(path).map_err(map_endpoint_error)?;
        let response = self
            .backend
            .request(Method::POST, url)
            .json(&CredentialsDto {
                email: credentials.email().as_ref(),
                password: credentials.password(),
            })
            .send()
            .await
            .map_err(map_transport_error)?;
        read_session(response).await
    }
}

#[async_trait]
impl IdentityGateway for RestIdentityGateway {
    async fn create_account(
        &self,
        credentials: &Credentials,
    ) -> Result<Account, IdentityGatewayError> {
        let session = self.post_credentials("auth/register", credentials).await?;
        self.backend.set_session_token(Some(session.session_token));
        Ok(session.account)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Account, IdentityGatewayError> {
        let session = self.post_credentials("auth/login", credentials).await?;
        self.backend.set_session_token(Some(session.session_token));
        Ok(session.account)
    }

    async fn sign_out(&self) -> Result<(), IdentityGatewayError> {
        let url = self
            .backend
            .endpoint("auth/logout")
            .map_err(map_endpoint_error)?;
        let response = self
            .backend
            .request(Method::POST, url)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        self.backend.set_session_token(None);
        Ok(())
    }

    async fn restore_session(&self) -> Result<Option<Account>, IdentityGatewayError> {
        // No persisted token means no session to restore; skip the network.
        if self.backend.session_token().is_none() {
            return Ok(None);
        }
        let url = self
            .backend
            .endpoint("auth/session")
            .map_err(map_endpoint_error)?;
        let response = self
            .backend
            .request(Method::GET, url)
            .send()
            .await
            .map_err(map_transport_error)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            // The persisted token no longer names a live session.
            self.backend.set_session_token(None);
            return Ok(None);
        }
        let session = read_session(response).await?;
        self.backend.set_session_token(Some(session.session_token));
        Ok(Some(session.account))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsDto<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionDto {
    account: Account,
    session_token: String,
}

#[derive(Deserialize)]
struct ErrorEnvelopeDto {
    error: ErrorBodyDto,
}

#[derive(Deserialize)]
struct ErrorBodyDto {
    code: String,
}

async fn read_session(response: Response) -> Result<SessionDto, IdentityGatewayError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    serde_json::from_slice(body.as_ref())
        .map_err(|error| IdentityGatewayError::backend(format!("invalid session payload: {error}")))
}

fn map_endpoint_error(error: url::ParseError) -> IdentityGatewayError {
    IdentityGatewayError::backend(error.to_string())
}

fn map_transport_error(error: reqwest::Error) -> IdentityGatewayError {
    IdentityGatewayError::backend(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityGatewayError {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelopeDto>(body) {
        if let Some(error) = error_for_code(&envelope.error.code) {
            return error;
        }
    }
    IdentityGatewayError::backend(status_message(status, body))
}

fn error_for_code(code: &str) -> Option<IdentityGatewayError> {
    match code {
        "invalidEmail" => Some(IdentityGatewayError::InvalidEmail),
        "emailInUse" => Some(IdentityGatewayError::EmailInUse),
        "weakPassword" => Some(IdentityGatewayError::WeakPassword),
        "authDisabled" => Some(IdentityGatewayError::AuthDisabled),
        "accountDisabled" => Some(IdentityGatewayError::AccountDisabled),
        "accountNotFound" => Some(IdentityGatewayError::AccountNotFound),
        "wrongCredentials" => Some(IdentityGatewayError::WrongCredentials),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network identity mapping helpers.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::invalid_email("invalidEmail", IdentityGatewayError::InvalidEmail)]
    #[case::email_in_use("emailInUse", IdentityGatewayError::EmailInUse)]
    #[case::weak_password("weakPassword", IdentityGatewayError::WeakPassword)]
    #[case::auth_disabled("authDisabled", IdentityGatewayError::AuthDisabled)]
    #[case::account_disabled("accountDisabled", IdentityGatewayError::AccountDisabled)]
    #[case::account_not_found("accountNotFound", IdentityGatewayError::AccountNotFound)]
    #[case::wrong_credentials("wrongCredentials", IdentityGatewayError::WrongCredentials)]
    fn maps_error_envelope_codes_to_gateway_errors(
        #[case] code: &str,
        #[case] expected: IdentityGatewayError,
    ) {
        let body = format!("{{\"error\":{{\"code\":\"{code}\",\"message\":\"details\"}}}}");
        let mapped = map_status_error(StatusCode::BAD_REQUEST, body.as_bytes());
        assert_eq!(mapped, expected);
    }

    #[test]
    fn unknown_codes_fall_back_to_backend_errors() {
        let body = br#"{"error":{"code":"quotaExceeded","message":"slow down"}}"#;
        let mapped = map_status_error(StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(mapped, IdentityGatewayError::Backend { .. }));
    }

    #[test]
    fn unparseable_bodies_keep_the_status_line() {
        let mapped = map_status_error(StatusCode::BAD_GATEWAY, b"<html>oops</html>");
        match mapped {
            IdentityGatewayError::Backend { message } => {
                assert!(message.contains("status 502"));
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn session_payloads_decode_account_and_token() {
        let body = br#"{
            "account": { "id": "acct-1", "email": "ada@example.com" },
            "sessionToken": "token-1"
        }"#;
        let session: SessionDto = serde_json::from_slice(body).expect("payload deserialises");
        assert_eq!(session.account.email().as_ref(), "ada@example.com");
        assert_eq!(session.session_token, "token-1");
    }
}
