//! Integration tests for deletion requests arriving over the broker.

use http::StatusCode;
use serde_json::json;

use warden_database::UserRepository;
use warden_messaging::{DeletionConsumer, PollOutcome};

use crate::helpers::TestApp;

fn consumer(app: &TestApp) -> DeletionConsumer {
    DeletionConsumer::new(app.broker.clone(), app.removal.clone(), &app.config.broker)
}

#[tokio::test]
async fn test_deletion_request_removes_user_once() {
    let app = TestApp::new().await;
    app.create_verified_user("alice", "a@x.com", "pw1").await;
    let user = app.users.find_by_email("a@x.com").await.unwrap().unwrap();

    let body = json!({ "userId": user.id.to_string() }).to_string();
    app.broker.enqueue(&app.config.broker.auth_queue, body.clone()).unwrap();
    app.broker.enqueue(&app.config.broker.auth_queue, body).unwrap();

    let consumer = consumer(&app);
    assert_eq!(consumer.poll_once().await.unwrap(), PollOutcome::Applied);
    assert_eq!(consumer.poll_once().await.unwrap(), PollOutcome::Applied);
    assert!(app.users.find_by_id(user.id).await.unwrap().is_none());

    let login = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "email": "a@x.com", "password": "pw1" })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_poison_message_is_dropped() {
    let app = TestApp::new().await;
    app.broker
        .enqueue(&app.config.broker.auth_queue, r#"{"userId": 42}"#)
        .unwrap();

    let consumer = consumer(&app);
    assert_eq!(consumer.poll_once().await.unwrap(), PollOutcome::Rejected);
    assert_eq!(app.broker.pending(&app.config.broker.auth_queue).unwrap(), 0);
    assert_eq!(app.broker.in_flight().unwrap(), 0);
}

#[tokio::test]
async fn test_consumer_stops_on_shutdown() {
    let app = TestApp::new().await;
    let consumer = consumer(&app);
    let (tx, rx) = tokio::sync::watch::channel(false);

    let handle = tokio::spawn(async move { consumer.run(rx).await });
    tx.send(true).unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .expect("consumer did not stop")
        .unwrap();
}
