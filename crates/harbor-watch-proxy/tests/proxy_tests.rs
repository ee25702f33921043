use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use harbor_watch_core::{
    BackendAdapter, BackendError, ChatMessage, ChatRequest, ChatSession, ExchangeOutcome,
    ProxyAdapter,
};
use harbor_watch_proxy::{build_router, AppState};

/// Upstream stand-in that records prompts and replays one outcome.
struct FakeUpstream {
    prompts: Mutex<Vec<String>>,
    outcome: fn() -> ExchangeOutcome,
}

#[async_trait]
impl BackendAdapter for FakeUpstream {
    fn name(&self) -> &str {
        "fake"
    }

    async fn send(&self, request: ChatRequest<'_>) -> ExchangeOutcome {
        assert_eq!(request.transcript.len(), 1);
        assert!(request.context.is_none());
        self.prompts
            .lock()
            .unwrap()
            .push(request.transcript[0].content.clone());
        (self.outcome)()
    }
}

async fn serve(outcome: fn() -> ExchangeOutcome) -> (String, Arc<FakeUpstream>) {
    let upstream = Arc::new(FakeUpstream {
        prompts: Mutex::new(Vec::new()),
        outcome,
    });
    let app = build_router(AppState::new(upstream.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api/chat", addr), upstream)
}

#[tokio::test]
async fn forwards_prompt_and_returns_reply() {
    let (url, upstream) = serve(|| Ok(Some("Surge peaks at 18:00.".to_string()))).await;

    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({"prompt": "what's happening?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"reply": "Surge peaks at 18:00."}));

    assert_eq!(*upstream.prompts.lock().unwrap(), vec!["what's happening?".to_string()]);
}

#[tokio::test]
async fn missing_upstream_reply_is_null() {
    let (url, _) = serve(|| Ok(None)).await;

    let body: Value = reqwest::Client::new()
        .post(&url)
        .json(&json!({"prompt": "hi"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["reply"], Value::Null);
}

#[tokio::test]
async fn empty_prompt_is_rejected() {
    let (url, upstream) = serve(|| Ok(Some("unused".to_string()))).await;

    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({"prompt": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert!(upstream.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_body_gets_json_error_envelope() {
    let (url, upstream) = serve(|| Ok(Some("unused".to_string()))).await;
    let client = reqwest::Client::new();

    let missing_field = client.post(&url).json(&json!({})).send().await.unwrap();
    let not_json = client
        .post(&url)
        .header("content-type", "application/json")
        .body("{prompt:")
        .send()
        .await
        .unwrap();
    let wrong_type = client.post(&url).body("prompt=hi").send().await.unwrap();

    for response in [missing_field, not_json, wrong_type] {
        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));
    }
    assert!(upstream.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway_without_details() {
    let (url, _) =
        serve(|| Err(BackendError::interrupted("provider account acct-42 suspended"))).await;

    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({"prompt": "hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 502);
    let body = response.text().await.unwrap();
    assert!(body.contains("error"));
    assert!(!body.contains("acct-42"));
}

#[tokio::test]
async fn session_round_trip_through_proxy() {
    let (url, upstream) = serve(|| Ok(Some("Harbor conditions are calm.".to_string()))).await;
    let adapter = ProxyAdapter::new(&url);

    let mut session = ChatSession::new();
    session.set_context(Some("Storm surge warning active".to_string()));
    session.update_input("what's happening?");
    assert!(session.submit(&adapter).await);

    assert_eq!(
        session.transcript(),
        &[
            ChatMessage::user("what's happening?"),
            ChatMessage::assistant("Harbor conditions are calm."),
        ]
    );

    let prompts = upstream.prompts.lock().unwrap();
    assert!(prompts[0].contains("Storm surge warning active"));
    assert!(prompts[0].contains("what's happening?"));
}

#[tokio::test]
async fn upstream_failure_surfaces_as_error_reply() {
    let (url, _) = serve(|| Err(BackendError::interrupted("boom"))).await;
    let adapter = ProxyAdapter::new(&url);

    let mut session = ChatSession::new();
    session.update_input("status?");
    session.submit(&adapter).await;

    assert_eq!(
        session.transcript().last(),
        Some(&ChatMessage::assistant(harbor_watch_core::prompt::ERROR_REPLY))
    );
    assert!(!session.is_loading());
}
