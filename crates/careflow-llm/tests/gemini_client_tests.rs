//! Gemini client tests against a local stand-in for the REST endpoint.

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, Router};
use careflow_llm::{
    Credential, GeminiConfig, GeminiOracle, Oracle, OracleError, API_KEY_HEADER,
};
use serde_json::{json, Value};
use std::time::Duration;

/// Serve `router` on an ephemeral port and return the API base URL.
async fn spawn_fake_api(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/v1beta", addr)
}

fn config(api_base: String) -> GeminiConfig {
    GeminiConfig {
        api_base,
        credential: Credential::Static("test-key".into()),
        timeout: Duration::from_secs(5),
        ..GeminiConfig::default()
    }
}

fn envelope(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
}

async fn echo(
    uri: axum::http::Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let text = format!(
        "path={} query={} key={} prompt={} topK={} max={}",
        uri.path(),
        uri.query().unwrap_or_default(),
        headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default(),
        body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default(),
        body["generationConfig"]["topK"],
        body["generationConfig"]["maxOutputTokens"],
    );
    Json(envelope(&text))
}

#[tokio::test]
async fn test_generate_success() {
    let base = spawn_fake_api(Router::new().fallback(echo)).await;
    let oracle = GeminiOracle::new(config(base)).unwrap();

    let text = oracle.generate("describe patient").await.unwrap();
    assert_eq!(
        text,
        "path=/v1beta/models/gemini-2.5-flash:generateContent query= key=test-key prompt=describe patient topK=32 max=1024"
    );
}

#[tokio::test]
async fn test_generate_http_error() {
    let router = Router::new().fallback(|| async {
        (StatusCode::SERVICE_UNAVAILABLE, "overloaded").into_response()
    });
    let base = spawn_fake_api(router).await;
    let oracle = GeminiOracle::new(config(base)).unwrap();

    match oracle.generate("p").await {
        Err(OracleError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_empty_candidates() {
    let router = Router::new().fallback(|| async { Json(json!({ "candidates": [] })) });
    let base = spawn_fake_api(router).await;
    let oracle = GeminiOracle::new(config(base)).unwrap();

    let err = oracle.generate("p").await.unwrap_err();
    assert!(matches!(err, OracleError::EmptyGeneration));
    assert_eq!(err.to_string(), "No response from oracle");
}

#[tokio::test]
async fn test_generate_non_json_body() {
    let router = Router::new().fallback(|| async { "<html>gateway</html>" });
    let base = spawn_fake_api(router).await;
    let oracle = GeminiOracle::new(config(base)).unwrap();

    assert!(matches!(oracle.generate("p").await, Err(OracleError::Decode(_))));
}

#[tokio::test]
async fn test_generate_timeout() {
    let router = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        Json(envelope("too late"))
    });
    let base = spawn_fake_api(router).await;
    let oracle = GeminiOracle::new(GeminiConfig {
        timeout: Duration::from_millis(200),
        ..config(base)
    })
    .unwrap();

    match oracle.generate("p").await {
        Err(OracleError::Transport(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let oracle = GeminiOracle::new(config(format!("http://{}/v1beta", addr))).unwrap();
    let err = oracle.generate("p").await.unwrap_err();
    assert!(matches!(err, OracleError::Transport(_)));
    assert!(!err.to_string().contains("test-key"));
    assert!(!format!("{:?}", err).contains("test-key"));
}

#[tokio::test]
async fn test_missing_credential_makes_no_request() {
    // Nothing listens on the discard port; reaching it would be a transport error.
    let oracle = GeminiOracle::new(GeminiConfig {
        api_base: "http://127.0.0.1:9/v1beta".into(),
        credential: Credential::Env("CAREFLOW_TEST_UNSET_CREDENTIAL_91B2".into()),
        ..GeminiConfig::default()
    })
    .unwrap();

    let err = oracle.generate("p").await.unwrap_err();
    assert_eq!(err.to_string(), "CAREFLOW_TEST_UNSET_CREDENTIAL_91B2 is not set");
}
