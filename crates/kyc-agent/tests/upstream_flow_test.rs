//! End-to-end flow against mocked upstream HTTP services: the real
//! verification and issuance clients, wired exactly as the binary wires
//! them, talking to a `wiremock` server.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kyc_agent::state::{AppConfig, AppState};
use kyc_core::{CredentialDefinition, Did};
use kyc_protocol::message_type;
use kyc_providers::ProviderConfig;

const ISSUER_DID: &str = "did:iden3:issuer";
const HOLDER_DID: &str = "did:iden3:holder";

fn app_for(server: &MockServer) -> axum::Router {
    let providers =
        ProviderConfig::local_mock(server.address().port(), Did::new(ISSUER_DID).unwrap())
            .unwrap();
    let config = AppConfig {
        port: 3000,
        agent_url: "http://localhost:3000".to_string(),
        development: true,
    };
    kyc_agent::app(AppState::from_providers(config, providers).unwrap())
}

fn proposal_request() -> String {
    let credential = CredentialDefinition::proof_of_liveness();
    json!({
        "id": "m-1",
        "type": message_type::PROPOSAL_REQUEST,
        "thid": "T1",
        "body": { "credentials": [{ "type": credential.credential_type, "context": credential.context }] },
        "from": HOLDER_DID,
        "to": ISSUER_DID,
    })
    .to_string()
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn proposal_then_approval_issues_one_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v4/session/init"))
        .and(header("Api-Key", "test-api-key"))
        .and(body_partial_json(json!({ "Alias": HOLDER_DID })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "session_id": "sess-42", "sandbox": true })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/individual/session/sess-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "session": { "id": "sess-42", "status": "APPROVED" } }),
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v2/identities/{ISSUER_DID}/credentials")))
        .and(body_partial_json(json!({
            "type": "AnimaProofOfLife",
            "credentialSubject": { "id": HOLDER_DID, "human": true }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "cred-9" })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);

    let (status, proposal) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/agent")
            .body(Body::from(proposal_request()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(proposal["type"], message_type::PROPOSAL);
    assert_eq!(
        proposal["body"]["proposals"][0]["url"],
        format!("http://localhost:3000/index.html?session=sess-42&did={ISSUER_DID}&clientType=WEB")
    );

    for _ in 0..2 {
        let (status, offer) = send(
            &app,
            Request::builder()
                .uri("/offers?sessionID=sess-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(offer["type"], message_type::CREDENTIAL_OFFER);
        assert_eq!(offer["thid"], "T1");
        assert_eq!(offer["body"]["credentials"][0]["id"], "cred-9");
        assert_eq!(offer["body"]["credentials"][0]["status"], "completed");
        assert_eq!(
            offer["body"]["url"],
            format!("{}/v1/agent", server.uri())
        );
    }
}

#[tokio::test]
async fn issuance_without_id_leaves_session_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v4/session/init"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_id": "sess-7" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/individual/session/sess-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "session": { "id": "sess-7", "status": "APPROVED" } }),
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v2/identities/{ISSUER_DID}/credentials")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v2/identities/{ISSUER_DID}/credentials")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "cred-retry" })))
        .mount(&server)
        .await;

    let app = app_for(&server);
    let (status, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/agent")
            .body(Body::from(proposal_request()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let offers = || {
        Request::builder()
            .uri("/offers?sessionID=sess-7")
            .body(Body::empty())
            .unwrap()
    };
    let (status, body) = send(&app, offers()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "ISSUANCE_FAILED");

    let (status, offer) = send(&app, offers()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(offer["body"]["credentials"][0]["id"], "cred-retry");
}

#[tokio::test]
async fn provider_outage_is_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v4/session/init"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let app = app_for(&server);
    let (status, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/agent")
            .body(Body::from(proposal_request()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "UPSTREAM_UNAVAILABLE");
}
