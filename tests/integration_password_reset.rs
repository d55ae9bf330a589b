mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use common::{PASSWORD, TestApp};
use kurs::modules::auth::service::{
    EMAIL_NOT_FOUND_MESSAGE, EMAIL_REQUIRED_MESSAGE, EMAIL_SEND_FAILED_MESSAGE,
    INVALID_RESET_CODE_MESSAGE, RESET_FIELDS_REQUIRED_MESSAGE,
};
use kurs::store::UserStore;
use kurs::utils::email::RESET_CODE_SUBJECT;
use kurs_auth::reset_code::RESET_CODE_TTL_SECONDS;

const NEW_PASSWORD: &str = "Another#456";

async fn forgot(app: &TestApp, email: &str) -> common::TestResponse {
    app.post_json("/user/forgot-password", json!({ "email": email }), None)
        .await
}

async fn reset(app: &TestApp, email: &str, code: &str, new_password: &str) -> common::TestResponse {
    app.post_json(
        "/user/reset-password",
        json!({ "email": email, "resetToken": code, "newPassword": new_password }),
        None,
    )
    .await
}

async fn stored_code(app: &TestApp, email: &str) -> String {
    app.user_by_email(email)
        .await
        .reset_password_token
        .expect("reset code stored")
}

#[tokio::test]
async fn test_forgot_password_sends_code() {
    let app = TestApp::new();
    let (email, _) = app.create_student().await;

    let response = forgot(&app, &email).await;

    assert_eq!(response.status, StatusCode::OK);
    let record = app.user_by_email(&email).await;
    let code = record.reset_password_token.clone().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let expires = record.reset_password_expire.unwrap();
    let ttl = (expires - Utc::now()).num_seconds();
    assert!(ttl > RESET_CODE_TTL_SECONDS - 10 && ttl <= RESET_CODE_TTL_SECONDS);

    let sent = app.mailer.last_to(&email).unwrap();
    assert_eq!(sent.subject, RESET_CODE_SUBJECT);
    assert!(sent.html_body.contains(&code));
}

#[tokio::test]
async fn test_forgot_password_requires_email() {
    let app = TestApp::new();

    let response = app
        .post_json("/user/forgot-password", json!({}), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), EMAIL_REQUIRED_MESSAGE);
}

#[tokio::test]
async fn test_forgot_password_unknown_email() {
    let app = TestApp::new();

    let response = forgot(&app, "nobody@example.com").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), EMAIL_NOT_FOUND_MESSAGE);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_forgot_password_send_failure_keeps_code() {
    let app = TestApp::new();
    let (email, _) = app.create_student().await;
    app.mailer.set_failing(true);

    let response = forgot(&app, &email).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.message(), EMAIL_SEND_FAILED_MESSAGE);
    assert!(app.user_by_email(&email).await.reset_password_token.is_some());
}

#[tokio::test]
async fn test_reset_password_with_valid_code() {
    let app = TestApp::new();
    let (email, _) = app.create_student().await;
    forgot(&app, &email).await;
    let code = stored_code(&app, &email).await;

    let response = reset(&app, &email, &code, NEW_PASSWORD).await;

    assert_eq!(response.status, StatusCode::OK);
    let record = app.user_by_email(&email).await;
    assert!(record.reset_password_token.is_none());
    assert!(record.reset_password_expire.is_none());

    assert_eq!(app.login(&email, NEW_PASSWORD).await.status, StatusCode::OK);
    assert_eq!(
        app.login(&email, PASSWORD).await.status,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_reset_code_is_single_use() {
    let app = TestApp::new();
    let (email, _) = app.create_student().await;
    forgot(&app, &email).await;
    let code = stored_code(&app, &email).await;

    assert_eq!(
        reset(&app, &email, &code, NEW_PASSWORD).await.status,
        StatusCode::OK
    );
    let second = reset(&app, &email, &code, "Third#789x").await;

    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.message(), INVALID_RESET_CODE_MESSAGE);
}

#[tokio::test]
async fn test_second_forgot_invalidates_first_code() {
    let app = TestApp::new();
    let (email, _) = app.create_student().await;

    forgot(&app, &email).await;
    let first = stored_code(&app, &email).await;
    let mut second = first.clone();
    while second == first {
        forgot(&app, &email).await;
        second = stored_code(&app, &email).await;
    }

    let stale = reset(&app, &email, &first, NEW_PASSWORD).await;
    assert_eq!(stale.status, StatusCode::BAD_REQUEST);

    let fresh = reset(&app, &email, &second, NEW_PASSWORD).await;
    assert_eq!(fresh.status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_code_is_rejected() {
    let app = TestApp::new();
    let (email, _) = app.create_student().await;
    let user = app.user_by_email(&email).await;

    // Issued 181 seconds ago.
    let issued_at = Utc::now() - Duration::seconds(RESET_CODE_TTL_SECONDS + 1);
    UserStore::set_reset_code(
        app.store.as_ref(),
        user.id,
        "123456",
        issued_at + Duration::seconds(RESET_CODE_TTL_SECONDS),
    )
    .await
    .unwrap();

    let response = reset(&app, &email, "123456", NEW_PASSWORD).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), INVALID_RESET_CODE_MESSAGE);
    let record = app.user_by_email(&email).await;
    assert_eq!(record.password_hash, user.password_hash);
    assert_eq!(app.login(&email, PASSWORD).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_code_is_rejected() {
    let app = TestApp::new();
    let (email, _) = app.create_student().await;
    forgot(&app, &email).await;
    let code = stored_code(&app, &email).await;
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let response = reset(&app, &email, wrong, NEW_PASSWORD).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), INVALID_RESET_CODE_MESSAGE);
}

#[tokio::test]
async fn test_malformed_code_is_rejected() {
    let app = TestApp::new();
    let (email, _) = app.create_student().await;

    let response = reset(&app, &email, "abc", NEW_PASSWORD).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), INVALID_RESET_CODE_MESSAGE);
}

#[tokio::test]
async fn test_weak_password_does_not_consume_code() {
    let app = TestApp::new();
    let (email, _) = app.create_student().await;
    forgot(&app, &email).await;
    let code = stored_code(&app, &email).await;

    let weak = reset(&app, &email, &code, "short").await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);
    assert_eq!(stored_code(&app, &email).await, code);

    let strong = reset(&app, &email, &code, NEW_PASSWORD).await;
    assert_eq!(strong.status, StatusCode::OK);
}

#[tokio::test]
async fn test_reset_requires_all_fields() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/user/reset-password",
            json!({ "email": "ali@example.com", "resetToken": "123456" }),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), RESET_FIELDS_REQUIRED_MESSAGE);
}

#[tokio::test]
async fn test_concurrent_redemptions_only_one_wins() {
    let app = TestApp::new();
    let (email, _) = app.create_student().await;
    forgot(&app, &email).await;
    let code = stored_code(&app, &email).await;

    let (first, second) = tokio::join!(
        reset(&app, &email, &code, "First#111"),
        reset(&app, &email, &code, "Second#222"),
    );

    let winners: Vec<&str> = [(&first, "First#111"), (&second, "Second#222")]
        .into_iter()
        .filter(|(response, _)| response.status == StatusCode::OK)
        .map(|(_, password)| password)
        .collect();
    assert_eq!(winners.len(), 1);
    let loser = if winners[0] == "First#111" { &second } else { &first };
    assert_eq!(loser.status, StatusCode::BAD_REQUEST);
    assert_eq!(loser.message(), INVALID_RESET_CODE_MESSAGE);

    let losing_password = if winners[0] == "First#111" { "Second#222" } else { "First#111" };
    assert_eq!(app.login(&email, winners[0]).await.status, StatusCode::OK);
    assert_eq!(app.login(&email, losing_password).await.status, StatusCode::BAD_REQUEST);
    assert!(app.user_by_email(&email).await.reset_password_token.is_none());
}
