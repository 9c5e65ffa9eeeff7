//! Contract tests for IssuerNodeClient.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/v2/identities/{did}/credentials` | `issue_*` |

use kyc_core::{CredentialDefinition, Did};
use kyc_providers::{CredentialIssuer, IssuerConfig, IssuerNodeClient, ProviderError};
use wiremock::matchers::{basic_auth, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ISSUER: &str = "did:iden3:privado:main:issuer";

fn test_client(mock_server: &MockServer) -> IssuerNodeClient {
    IssuerNodeClient::new(IssuerConfig {
        base_url: mock_server.uri().parse().unwrap(),
        issuer_did: Did::new(ISSUER).unwrap(),
        username: "user".into(),
        password: "secret".into(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn holder() -> Did {
    Did::new("did:iden3:privado:main:holder").unwrap()
}

#[tokio::test]
async fn issue_posts_credential_request_with_basic_auth() {
    let mock_server = MockServer::start().await;
    let def = CredentialDefinition::proof_of_liveness();

    Mock::given(method("POST"))
        .and(path(format!("/v2/identities/{ISSUER}/credentials")))
        .and(basic_auth("user", "secret"))
        .and(body_partial_json(serde_json::json!({
            "credentialSchema": def.schema,
            "type": "AnimaProofOfLife",
            "credentialSubject": { "id": "did:iden3:privado:main:holder", "human": true }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "cred-123"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let id = test_client(&mock_server).issue(&holder(), &def).await.unwrap();
    assert_eq!(id.as_str(), "cred-123");
}

#[tokio::test]
async fn issue_without_id_is_missing_credential_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v2/identities/{ISSUER}/credentials")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .issue(&holder(), &CredentialDefinition::proof_of_liveness())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MissingCredentialId { .. }));
}

#[tokio::test]
async fn issue_handles_api_error_without_retrying() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v2/identities/{ISSUER}/credentials")))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    match test_client(&mock_server)
        .issue(&holder(), &CredentialDefinition::proof_of_liveness())
        .await
        .unwrap_err()
    {
        ProviderError::ApiError { status, .. } => assert_eq!(status, 500),
        other => panic!("expected ApiError, got: {other:?}"),
    }
}

#[tokio::test]
async fn issue_rejected_credentials_are_not_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v2/identities/{ISSUER}/credentials")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .issue(&holder(), &CredentialDefinition::proof_of_liveness())
        .await
        .unwrap_err();
    assert!(!err.is_transient());
}
