//! `ReqwestTransport` against a local mock HTTP server.

mod common;

use common::{jwt, ScriptedProvider, PROFILE_JSON};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use workmate_session::{
    ApiResponse, HttpTransport, MemoryNavigator, ReqwestTransport, SessionConfig,
    SessionController, SessionError, SessionEvents, SessionState, TransportRequest,
};

fn config_for(server_url: &str) -> SessionConfig {
    let mut config = SessionConfig::default();
    config.api.base_url = Some(server_url.to_string());
    config.api.force_https = false;
    config
}

#[tokio::test]
async fn test_init_and_requests_over_http() {
    let mut server = mockito::Server::new_async().await;
    let token = jwt("u-7", "Ada Lovelace");
    let bearer = format!("Bearer {}", token);

    let profile = server
        .mock("GET", "/employees/me")
        .match_header("authorization", bearer.as_str())
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PROFILE_JSON)
        .create_async()
        .await;
    let update = server
        .mock("PATCH", "/employees/KIT-0007")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"phone": "+49 721 0"})))
        .with_status(204)
        .create_async()
        .await;
    let missing = server
        .mock("GET", "/documents/404")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail":"Document not found"}"#)
        .create_async()
        .await;

    let navigator = Arc::new(MemoryNavigator::new("/"));
    let config = config_for(&server.url());
    let transport = Arc::new(ReqwestTransport::from_config(&config.api).unwrap());
    let controller = SessionController::builder(config)
        .provider(Arc::new(ScriptedProvider::signed_in(token)))
        .navigator(navigator.clone())
        .transport(transport)
        .events(SessionEvents::new())
        .build()
        .unwrap();

    assert_eq!(controller.init().await.unwrap(), SessionState::Ready);
    assert_eq!(navigator.redirects(), vec!["/dashboard".to_string()]);
    profile.assert_async().await;

    let response = controller
        .gateway()
        .patch("/employees/KIT-0007", json!({"phone": "+49 721 0", "room": null, "title": ""}))
        .await
        .unwrap();
    assert_eq!(response, ApiResponse::Empty);
    update.assert_async().await;

    let err = controller.gateway().get("/documents/404").await.unwrap_err();
    match err {
        SessionError::ClientError(failure) => {
            assert_eq!(failure.status, 404);
            assert_eq!(failure.message, "Document not found");
        },
        other => panic!("expected client error, got {:?}", other),
    }
    missing.assert_async().await;
}

#[tokio::test]
async fn test_transport_returns_raw_response_for_error_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .with_status(502)
        .with_header("content-type", "text/plain")
        .with_body("bad gateway")
        .create_async()
        .await;

    let transport = ReqwestTransport::from_config(&SessionConfig::default().api).unwrap();
    let response = transport
        .send(TransportRequest {
            method: reqwest::Method::GET,
            url: format!("{}/health", server.url()),
            headers: vec![("Accept".into(), "application/json".into())],
            body: None,
        })
        .await
        .unwrap();

    assert_eq!(response.status, 502);
    assert_eq!(response.content_type.as_deref(), Some("text/plain"));
    assert_eq!(response.body, "bad gateway");
    assert!(!response.is_json());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let transport = ReqwestTransport::from_config(&SessionConfig::default().api).unwrap();
    let err = transport
        .send(TransportRequest {
            method: reqwest::Method::GET,
            url: "http://127.0.0.1:1/unreachable".into(),
            headers: Vec::new(),
            body: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::TransportError(_)));
}
