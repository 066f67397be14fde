use std::time::Duration;

use serde_json::json;
use videoqueue::trigger::{TriggerError, TriggerGateway, TriggerSettings};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> TriggerGateway {
    TriggerGateway::new(TriggerSettings::new("ghp_test", "octo", "videos").with_api_base(server.uri()))
        .unwrap()
}

#[tokio::test]
async fn dispatch_follows_the_platform_contract() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/videos/dispatches"))
        .and(header("authorization", "Bearer ghp_test"))
        .and(header("accept", "application/vnd.github.v3+json"))
        .and(body_json(json!({ "event_type": "trigger-worker" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let ack = gateway(&server).trigger().await.unwrap();
    assert_eq!(ack.status, 204);
}

#[tokio::test]
async fn non_success_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"message":"Bad credentials"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = gateway(&server).trigger().await.unwrap_err();
    match &err {
        TriggerError::Upstream { status, body } => {
            assert_eq!(*status, 401);
            assert_eq!(body, r#"{"message":"Bad credentials"}"#);
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
    assert_eq!(err.upstream_status(), Some(401));
    assert_eq!(
        err.to_string(),
        r#"GitHub API error: 401 {"message":"Bad credentials"}"#
    );
}

#[tokio::test]
async fn failures_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    assert!(gateway(&server).trigger().await.is_err());
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let gw = TriggerGateway::new(
        TriggerSettings::new("ghp_test", "octo", "videos")
            .with_api_base(server.uri())
            .with_timeout(Duration::from_millis(200)),
    )
    .unwrap();

    let err = gw.trigger().await.unwrap_err();
    assert!(matches!(&err, TriggerError::Transport(e) if e.is_timeout()), "{err:?}");
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_error() {
    // nothing listens on the discard port
    let gw = TriggerGateway::new(
        TriggerSettings::new("ghp_test", "octo", "videos")
            .with_api_base("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2)),
    )
    .unwrap();

    let err = gw.trigger().await.unwrap_err();
    assert!(matches!(err, TriggerError::Transport(_)));
    assert!(err.to_string().starts_with("GitHub API request failed"));
}
