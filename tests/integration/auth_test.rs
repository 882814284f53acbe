//! Integration tests for the registration, verification and session flow.

use http::StatusCode;
use serde_json::json;

use warden_messaging::codec;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_alice_end_to_end() {
    let app = TestApp::new().await;
    let code = app.register("alice", "a@x.com", "pw1").await;

    let wrong = app
        .request(
            "POST",
            "/auth/verify",
            Some(json!({ "email": "a@x.com", "code": "000000" })),
            None,
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.body["error"], "CODE_MISMATCH");
    assert_eq!(wrong.body["message"], "Wrong validation code");

    let verified = app
        .request(
            "POST",
            "/auth/verify",
            Some(json!({ "email": "a@x.com", "code": code })),
            None,
        )
        .await;
    assert_eq!(verified.status, StatusCode::OK);
    assert_eq!(verified.body["data"]["message"], "User verified!");

    let published = app.broker.drain(&app.config.broker.user_queue).unwrap();
    assert_eq!(published.len(), 1);
    let event = codec::decode_user_registered(&published[0]).unwrap();
    assert_eq!(event.name, "alice");

    let token = app.login("a@x.com", "pw1").await;
    let me = app.request("GET", "/auth/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["name"], "alice");
    assert_eq!(me.body["data"]["role"], "USER");

    let logout = app.request("POST", "/auth/logout", None, Some(&token)).await;
    assert_eq!(logout.status, StatusCode::OK);

    let after = app.request("GET", "/auth/me", None, Some(&token)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.body["error"], "REVOKED_TOKEN");
}

#[tokio::test]
async fn test_register_returns_created_message() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({ "name": "bob", "email": "b@x.com", "password": "pw2" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(
        response.body["data"]["message"],
        "Verification code sent to your email"
    );
    assert!(response.body["data"].get("code").is_none());
}

#[tokio::test]
async fn test_register_conflict_and_validation() {
    let app = TestApp::new().await;
    app.register("alice", "a@x.com", "pw1").await;

    let duplicate = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({ "name": "alice", "email": "other@x.com", "password": "pw1" })),
            None,
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.body["error"], "CONFLICT");

    let invalid = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({ "name": "carol", "email": "not-an-email", "password": "pw1" })),
            None,
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.body["error"], "VALIDATION");

    let missing = app
        .request("POST", "/auth/register", Some(json!({ "name": "dave" })), None)
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_unknown_email_is_not_found() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/auth/verify",
            Some(json!({ "email": "ghost@x.com", "code": "123456" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_second_verify_is_already_verified() {
    let app = TestApp::new().await;
    let code = app.register("alice", "a@x.com", "pw1").await;
    let body = json!({ "email": "a@x.com", "code": code });

    let first = app.request("POST", "/auth/verify", Some(body.clone()), None).await;
    assert_eq!(first.status, StatusCode::OK);
    let second = app.request("POST", "/auth/verify", Some(body), None).await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.body["error"], "ALREADY_VERIFIED");
}

#[tokio::test]
async fn test_resend_by_query_and_body() {
    let app = TestApp::new().await;
    let first = app.register("alice", "a@x.com", "pw1").await;

    let by_query = app
        .request("POST", "/auth/resend?email=a@x.com", None, None)
        .await;
    assert_eq!(by_query.status, StatusCode::OK);
    assert_eq!(by_query.body["data"]["message"], "Code resent");

    let by_body = app
        .request("POST", "/auth/resend", Some(json!({ "email": "a@x.com" })), None)
        .await;
    assert_eq!(by_body.status, StatusCode::OK);

    let latest = app.mailer.last_code_for("a@x.com").unwrap();
    if latest != first {
        let stale = app
            .request(
                "POST",
                "/auth/verify",
                Some(json!({ "email": "a@x.com", "code": first })),
                None,
            )
            .await;
        assert_eq!(stale.body["error"], "CODE_MISMATCH");
    }

    let ok = app
        .request(
            "POST",
            "/auth/verify",
            Some(json!({ "email": "a@x.com", "code": latest })),
            None,
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);

    let again = app
        .request("POST", "/auth/resend?email=a@x.com", None, None)
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["message"], "User already verified");
}

#[tokio::test]
async fn test_resend_requires_email() {
    let app = TestApp::new().await;
    let response = app.request("POST", "/auth/resend", None, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let unknown = app
        .request("POST", "/auth/resend?email=ghost@x.com", None, None)
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_rejections_look_alike() {
    let app = TestApp::new().await;
    app.create_verified_user("alice", "a@x.com", "pw1").await;
    app.register("bob", "b@x.com", "pw2").await;

    for (email, password) in [("a@x.com", "nope"), ("ghost@x.com", "pw1"), ("b@x.com", "pw2")] {
        let response = app
            .request(
                "POST",
                "/auth/login",
                Some(json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{email}");
        assert_eq!(response.body["message"], "Incorrect username or password");
    }
}

#[tokio::test]
async fn test_logout_without_token_is_ok() {
    let app = TestApp::new().await;
    let response = app.request("POST", "/auth/logout", None, None).await;
    assert_eq!(response.status, StatusCode::OK);

    let garbage = app
        .request("POST", "/auth/logout", None, Some("not.a.token"))
        .await;
    assert_eq!(garbage.status, StatusCode::OK);
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let forged = app.request("GET", "/auth/me", None, Some("a.b.c")).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
    assert_eq!(forged.body["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_admin_code_yields_admin_claims() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({
                "name": "root",
                "email": "root@x.com",
                "password": "pw1",
                "adminCode": "letmein",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let code = app.mailer.last_code_for("root@x.com").unwrap();
    app.request(
        "POST",
        "/auth/verify",
        Some(json!({ "email": "root@x.com", "code": code })),
        None,
    )
    .await;

    let token = app.login("root@x.com", "pw1").await;
    let me = app.request("GET", "/auth/me", None, Some(&token)).await;
    assert_eq!(me.body["data"]["role"], "ADMIN");
    let authorities = me.body["data"]["authorities"].as_array().unwrap();
    assert!(authorities.iter().any(|a| a == "ROLE_USER"));
    assert!(authorities.iter().any(|a| a == "ROLE_ADMIN"));
}

#[tokio::test]
async fn test_legacy_field_names_are_accepted() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(json!({
                "name": "ops",
                "email": "ops@x.com",
                "password": "pw1",
                "code": "letmein",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let code = app.mailer.last_code_for("ops@x.com").unwrap();
    let verified = app
        .request(
            "POST",
            "/auth/verify",
            Some(json!({ "email": "ops@x.com", "verificationCode": code })),
            None,
        )
        .await;
    assert_eq!(verified.status, StatusCode::OK);

    let token = app.login("ops@x.com", "pw1").await;
    let me = app.request("GET", "/auth/me", None, Some(&token)).await;
    assert_eq!(me.body["data"]["role"], "ADMIN");
}

#[tokio::test]
async fn test_health_reports_ok() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["store"], "up");
}
