//! Contract tests for HttpProofVerifier.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use kyc_protocol::{ProofVerifier, ProtocolError, ZkpToken};
use kyc_providers::{HttpProofVerifier, ProofVerifierConfig};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token() -> ZkpToken {
    let part = |v: serde_json::Value| URL_SAFE_NO_PAD.encode(serde_json::to_vec(&v).unwrap());
    let compact = format!(
        "{}.{}.{}",
        part(serde_json::json!({"alg": "groth16", "circuitId": "authV2", "typ": "application/iden3-zkp-json"})),
        part(serde_json::json!({"type": "t", "from": "did:iden3:holder"})),
        part(serde_json::json!({"pi_a": []})),
    );
    ZkpToken::parse(&compact).unwrap()
}

fn verifier(mock_server: &MockServer) -> HttpProofVerifier {
    HttpProofVerifier::new(ProofVerifierConfig {
        url: format!("{}/verify", mock_server.uri()).parse().unwrap(),
        rpc_url: Some("https://rpc.example.com".into()),
        contract_address: Some("0x3C9acB2205Aa72A05F6D77d708b5Cf85FCa3a896".into()),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn verified_proof_returns_sender() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/verify"))
        .and(body_partial_json(serde_json::json!({
            "circuitId": "authV2",
            "rpcUrl": "https://rpc.example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "verified": true,
            "sender": "did:iden3:holder"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sender = verifier(&mock_server).verify(&token()).await.unwrap();
    assert_eq!(sender.as_deref(), Some("did:iden3:holder"));
}

#[tokio::test]
async fn failed_proof_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "verified": false,
            "reason": "state not found"
        })))
        .mount(&mock_server)
        .await;

    let err = verifier(&mock_server).verify(&token()).await.unwrap_err();
    assert_eq!(err, ProtocolError::ProofRejected("state not found".into()));
}

#[tokio::test]
async fn verifier_outage_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let err = verifier(&mock_server).verify(&token()).await.unwrap_err();
    assert!(matches!(err, ProtocolError::VerifierUnavailable(_)));
}
