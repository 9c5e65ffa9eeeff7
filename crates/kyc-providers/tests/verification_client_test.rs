//! Contract tests for SynapsClient.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/v4/session/init` | `create_session_*` |
//! | GET    | `/v4/individual/session/{id}` | `session_status_*` |

use kyc_core::{Did, ExternalSessionId};
use kyc_providers::{ProviderError, SynapsClient, VerificationConfig, VerificationProvider};
use kyc_session::Status;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> SynapsClient {
    SynapsClient::new(VerificationConfig {
        base_url: mock_server.uri().parse().unwrap(),
        api_key: "test-key".into(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn holder() -> Did {
    Did::new("did:iden3:privado:main:holder").unwrap()
}

// ── POST /v4/session/init ────────────────────────────────────────────

#[tokio::test]
async fn create_session_sends_alias_and_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4/session/init"))
        .and(header("Api-Key", "test-key"))
        .and(body_json(serde_json::json!({ "Alias": "did:iden3:privado:main:holder" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "session_id": "ext-123",
            "sandbox": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let id = test_client(&mock_server).create_session(&holder()).await.unwrap();
    assert_eq!(id.as_str(), "ext-123");
}

#[tokio::test]
async fn create_session_rejects_empty_session_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4/session/init"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "session_id": "",
            "sandbox": false
        })))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).create_session(&holder()).await.unwrap_err();
    assert!(matches!(err, ProviderError::MissingSessionId { .. }));
}

#[tokio::test]
async fn create_session_handles_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4/session/init"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&mock_server)
        .await;

    match test_client(&mock_server).create_session(&holder()).await.unwrap_err() {
        ProviderError::ApiError { status, body, .. } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected ApiError, got: {other:?}"),
    }
}

// ── GET /v4/individual/session/{id} ──────────────────────────────────

#[tokio::test]
async fn session_status_parses_each_status() {
    for status in Status::ALL {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/individual/session/ext-123"))
            .and(header("Api-Key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "session": { "id": "ext-123", "status": status.as_str() }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let reported = test_client(&mock_server)
            .session_status(&ExternalSessionId::new("ext-123").unwrap())
            .await
            .unwrap();
        assert_eq!(reported, status);
    }
}

#[tokio::test]
async fn session_status_rejects_unknown_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/individual/session/ext-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "session": { "id": "ext-123", "status": "RESUBMISSION_REQUESTED" }
        })))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .session_status(&ExternalSessionId::new("ext-123").unwrap())
        .await
        .unwrap_err();
    match err {
        ProviderError::UnknownStatus { status, .. } => assert_eq!(status, "RESUBMISSION_REQUESTED"),
        other => panic!("expected UnknownStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn session_status_server_error_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/individual/session/ext-123"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .session_status(&ExternalSessionId::new("ext-123").unwrap())
        .await
        .unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn session_status_malformed_body_is_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/individual/session/ext-123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .session_status(&ExternalSessionId::new("ext-123").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Deserialization { .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn slow_provider_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/individual/session/ext-123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_secs(3))
                .set_body_json(serde_json::json!({
                    "session": { "id": "ext-123", "status": "APPROVED" }
                })),
        )
        .mount(&mock_server)
        .await;

    let client = SynapsClient::new(VerificationConfig {
        base_url: mock_server.uri().parse().unwrap(),
        api_key: "test-key".into(),
        timeout_secs: 1,
    })
    .unwrap();
    let err = client
        .session_status(&ExternalSessionId::new("ext-123").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Timeout { .. }));
    assert!(err.is_transient());
}
