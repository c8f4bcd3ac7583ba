//! Tests for the session service.

use std::sync::{Arc, Mutex};

use rstest::rstest;

use super::*;
use crate::domain::ports::MockIdentityGateway;
use crate::domain::{AccountId, EmailAddress};

fn sample_account() -> Account {
    Account::new(
        AccountId::new("acct-1").expect("valid id"),
        EmailAddress::new("ada@example.com").expect("valid email"),
    )
}

fn make_service(gateway: MockIdentityGateway) -> SessionService<MockIdentityGateway> {
    SessionService::new(Arc::new(gateway))
}

fn record_states(service: &SessionService<MockIdentityGateway>) -> Arc<Mutex<Vec<SessionState>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    service.subscribe(move |state| sink.lock().expect("observer sink").push(state.clone()));
    seen
}

#[tokio::test]
async fn register_transitions_through_authenticating_to_authenticated() {
    let account = sample_account();
    let mut gateway = MockIdentityGateway::new();
    let returned = account.clone();
    gateway
        .expect_create_account()
        .times(1)
        .return_once(move |_| Ok(returned));

    let service = make_service(gateway);
    let seen = record_states(&service);

    let registered = service
        .register("ada@example.com", "hunter42")
        .await
        .expect("registration succeeds");

    assert_eq!(registered, account);
    assert_eq!(service.current_account(), Some(account.clone()));
    assert_eq!(
        *seen.lock().expect("observer sink"),
        vec![
            SessionState::Authenticating,
            SessionState::Authenticated(account),
        ]
    );
}

#[rstest]
#[case("ada@example.com", "abc", ErrorCode::WeakPassword)]
#[case("ada@example.com", "", ErrorCode::WeakPassword)]
#[case("not-an-email", "hunter42", ErrorCode::InvalidEmail)]
#[tokio::test]
async fn register_rejects_bad_credentials_before_any_backend_call(
    #[case] email: &str,
    #[case] password: &str,
    #[case] expected: ErrorCode,
) {
    let mut gateway = MockIdentityGateway::new();
    gateway.expect_create_account().times(0);

    let service = make_service(gateway);
    let seen = record_states(&service);

    let error = service
        .register(email, password)
        .await
        .expect_err("local validation fails");

    assert_eq!(error.code(), expected);
    assert_eq!(service.current_account(), None);
    assert!(seen.lock().expect("observer sink").is_empty());
}

#[tokio::test]
async fn register_failure_resolves_back_to_unauthenticated() {
    let mut gateway = MockIdentityGateway::new();
    gateway
        .expect_create_account()
        .times(1)
        .return_once(|_| Err(IdentityGatewayError::EmailInUse));

    let service = make_service(gateway);
    let seen = record_states(&service);

    let error = service
        .register("ada@example.com", "hunter42")
        .await
        .expect_err("duplicate email fails");

    assert_eq!(error.code(), ErrorCode::EmailInUse);
    assert_eq!(
        error.message(),
        "This email is already registered. Please use a different email or try logging in.",
    );
    assert_eq!(service.current_account(), None);
    assert_eq!(
        *seen.lock().expect("observer sink"),
        vec![SessionState::Authenticating, SessionState::Unauthenticated]
    );
}

#[rstest]
#[case(
    IdentityGatewayError::InvalidEmail,
    ErrorCode::InvalidEmail,
    "Please enter a valid email address."
)]
#[case(
    IdentityGatewayError::EmailInUse,
    ErrorCode::EmailInUse,
    "This email is already registered. Please use a different email or try logging in."
)]
#[case(
    IdentityGatewayError::WeakPassword,
    ErrorCode::WeakPassword,
    "Please choose a stronger password (at least 6 characters)."
)]
#[case(
    IdentityGatewayError::AuthDisabled,
    ErrorCode::AuthDisabled,
    "Email/password accounts are not enabled. Please contact support."
)]
#[case(
    IdentityGatewayError::backend("boom"),
    ErrorCode::Backend,
    "Failed to create an account."
)]
#[case(
    IdentityGatewayError::AccountNotFound,
    ErrorCode::Backend,
    "Failed to create an account."
)]
fn register_errors_map_to_user_facing_messages(
    #[case] gateway_error: IdentityGatewayError,
    #[case] expected_code: ErrorCode,
    #[case] expected_message: &str,
) {
    let error = map_register_error(gateway_error);
    assert_eq!(error.code(), expected_code);
    assert_eq!(error.message(), expected_message);
}

#[rstest]
#[case(
    IdentityGatewayError::InvalidEmail,
    ErrorCode::InvalidEmail,
    "Please enter a valid email address."
)]
#[case(
    IdentityGatewayError::AccountDisabled,
    ErrorCode::AccountDisabled,
    "This account has been disabled. Please contact support."
)]
#[case(
    IdentityGatewayError::AccountNotFound,
    ErrorCode::AccountNotFound,
    "No account found with this email."
)]
#[case(
    IdentityGatewayError::WrongCredentials,
    ErrorCode::WrongCredentials,
    "Incorrect password."
)]
#[case(IdentityGatewayError::backend("boom"), ErrorCode::Backend, "Failed to log in.")]
fn login_errors_map_to_user_facing_messages(
    #[case] gateway_error: IdentityGatewayError,
    #[case] expected_code: ErrorCode,
    #[case] expected_message: &str,
) {
    let error = map_login_error(gateway_error);
    assert_eq!(error.code(), expected_code);
    assert_eq!(error.message(), expected_message);
}

#[tokio::test]
async fn login_success_sets_the_current_identity() {
    let account = sample_account();
    let mut gateway = MockIdentityGateway::new();
    let returned = account.clone();
    gateway
        .expect_sign_in()
        .times(1)
        .return_once(move |_| Ok(returned));

    let service = make_service(gateway);

    let signed_in = service
        .login("ada@example.com", "hunter42")
        .await
        .expect("login succeeds");

    assert_eq!(signed_in, account);
    assert_eq!(service.current_account(), Some(account));
    assert!(service.state().is_authenticated());
}

#[tokio::test]
async fn login_with_empty_password_reports_wrong_credentials_locally() {
    let mut gateway = MockIdentityGateway::new();
    gateway.expect_sign_in().times(0);

    let service = make_service(gateway);

    let error = service
        .login("ada@example.com", "")
        .await
        .expect_err("empty password fails");

    assert_eq!(error.code(), ErrorCode::WrongCredentials);
    assert_eq!(error.message(), "Incorrect password.");
}

#[tokio::test]
async fn logout_clears_the_identity_and_notifies() {
    let account = sample_account();
    let mut gateway = MockIdentityGateway::new();
    gateway
        .expect_sign_in()
        .return_once(move |_| Ok(account));
    gateway.expect_sign_out().times(1).return_once(|| Ok(()));

    let service = make_service(gateway);
    service
        .login("ada@example.com", "hunter42")
        .await
        .expect("login succeeds");

    let seen = record_states(&service);
    service.logout().await.expect("logout succeeds");

    assert_eq!(service.current_account(), None);
    assert_eq!(
        *seen.lock().expect("observer sink"),
        vec![SessionState::Unauthenticated]
    );
}

#[tokio::test]
async fn failed_logout_keeps_the_identity() {
    let account = sample_account();
    let mut gateway = MockIdentityGateway::new();
    let returned = account.clone();
    gateway
        .expect_sign_in()
        .return_once(move |_| Ok(returned));
    gateway
        .expect_sign_out()
        .times(1)
        .return_once(|| Err(IdentityGatewayError::backend("socket closed")));

    let service = make_service(gateway);
    service
        .login("ada@example.com", "hunter42")
        .await
        .expect("login succeeds");

    let seen = record_states(&service);
    let error = service.logout().await.expect_err("logout fails");

    assert_eq!(error.code(), ErrorCode::SessionError);
    assert_eq!(error.message(), "Failed to log out.");
    assert_eq!(service.current_account(), Some(account));
    assert!(seen.lock().expect("observer sink").is_empty());
}

#[tokio::test]
async fn bootstrap_promotes_a_restored_session_once() {
    let account = sample_account();
    let mut gateway = MockIdentityGateway::new();
    let returned = account.clone();
    gateway
        .expect_restore_session()
        .times(1)
        .return_once(move || Ok(Some(returned)));

    let service = make_service(gateway);
    let seen = record_states(&service);

    assert_eq!(service.bootstrap().await, Some(account.clone()));
    // Second call answers from state; times(1) above proves no second
    // backend call.
    assert_eq!(service.bootstrap().await, Some(account.clone()));

    assert_eq!(
        *seen.lock().expect("observer sink"),
        vec![SessionState::Authenticated(account)]
    );
}

#[tokio::test]
async fn bootstrap_without_a_persisted_session_resolves_unauthenticated() {
    let mut gateway = MockIdentityGateway::new();
    gateway
        .expect_restore_session()
        .times(1)
        .return_once(|| Ok(None));

    let service = make_service(gateway);
    let seen = record_states(&service);

    assert_eq!(service.bootstrap().await, None);
    assert_eq!(service.current_account(), None);
    assert_eq!(
        *seen.lock().expect("observer sink"),
        vec![SessionState::Unauthenticated]
    );
}

#[tokio::test]
async fn bootstrap_swallows_gateway_failures() {
    let mut gateway = MockIdentityGateway::new();
    gateway
        .expect_restore_session()
        .times(1)
        .return_once(|| Err(IdentityGatewayError::backend("token store unavailable")));

    let service = make_service(gateway);

    assert_eq!(service.bootstrap().await, None);
    assert_eq!(service.current_account(), None);
}

#[tokio::test]
async fn unsubscribed_observers_stop_receiving_notifications() {
    let account = sample_account();
    let mut gateway = MockIdentityGateway::new();
    gateway
        .expect_sign_in()
        .return_once(move |_| Ok(account));

    let service = make_service(gateway);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = service.subscribe(move |state| sink.lock().expect("observer sink").push(state.clone()));

    assert!(service.unsubscribe(id));
    assert!(!service.unsubscribe(id));

    service
        .login("ada@example.com", "hunter42")
        .await
        .expect("login succeeds");

    assert!(seen.lock().expect("observer sink").is_empty());
}
