mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{deck, init_logging, VALID};
use explainer_core::Entry;
use explainer_engine::{
    EntryStore, Explainer, FailureKind, FetchOrchestrator, FetchOutcome, FetchReport,
    GenerateSettings, InMemoryEntryStore, OllamaClient, RetryController, TerminalOutcome,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> GenerateSettings {
    GenerateSettings {
        endpoint: format!("{}/api/generate", server.uri()),
        ..GenerateSettings::default()
    }
}

#[tokio::test]
async fn client_posts_generate_request_and_returns_response_text() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({
            "model": "llama3",
            "prompt": "T\nquay: \"On the quay.\"",
            "stream": false,
            "format": "json",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3",
            "response": "{\"direct_explanation\":\"x\"}",
            "done": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(settings_for(&server)).expect("client");
    let raw = client
        .explain("T\nquay: \"On the quay.\"")
        .await
        .expect("explain ok");

    assert_eq!(raw.as_deref(), Some("{\"direct_explanation\":\"x\"}"));
}

#[tokio::test]
async fn format_is_omitted_when_disabled() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({
            "model": "mistral",
            "prompt": "p",
            "stream": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = GenerateSettings {
        model: "mistral".to_string(),
        format_json: false,
        ..settings_for(&server)
    };
    let client = OllamaClient::new(settings).unwrap();

    assert_eq!(client.explain("p").await.unwrap().as_deref(), Some("ok"));
}

#[tokio::test]
async fn client_fails_on_http_status() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = OllamaClient::new(settings_for(&server)).unwrap();

    let err = client.explain("p").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn client_times_out_on_slow_model() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "response": "late" })),
        )
        .mount(&server)
        .await;

    let settings = GenerateSettings {
        request_timeout: Duration::from_millis(50),
        ..settings_for(&server)
    };
    let client = OllamaClient::new(settings).unwrap();

    let err = client.explain("p").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn client_rejects_oversized_body() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
        .mount(&server)
        .await;

    let settings = GenerateSettings {
        max_bytes: 16,
        ..settings_for(&server)
    };
    let client = OllamaClient::new(settings).unwrap();

    let err = client.explain("p").await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 16, .. }));
}

#[tokio::test]
async fn missing_or_blank_response_field_is_empty() {
    init_logging();
    for body in [
        json!({ "done": true }).to_string(),
        json!({ "response": "" }).to_string(),
        "<html>not an envelope</html>".to_string(),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
            .mount(&server)
            .await;

        let client = OllamaClient::new(settings_for(&server)).unwrap();
        assert_eq!(client.explain("p").await.unwrap(), None, "body: {body}");
    }
}

#[test]
fn invalid_endpoint_is_rejected_up_front() {
    let settings = GenerateSettings {
        endpoint: "not a url".to_string(),
        ..GenerateSettings::default()
    };
    let err = OllamaClient::new(settings).unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidEndpoint);
}

#[tokio::test]
async fn fetch_all_recovers_from_server_errors() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": VALID })))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryEntryStore::new());
    let deck_id = store.insert_deck(deck(vec![Entry::new("quay", "On the quay.")]));
    let client = Arc::new(OllamaClient::new(settings_for(&server)).unwrap());
    let orchestrator = FetchOrchestrator::new(RetryController::new(client, store.clone(), "T"));

    let outcome = orchestrator.fetch_all(deck_id, 5).await;

    assert_eq!(
        outcome,
        FetchOutcome::Completed(FetchReport {
            eligible: 1,
            applied: 1,
            ..FetchReport::default()
        })
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    let entry = &store.get_deck(deck_id).unwrap().entries[0];
    assert_eq!(entry.def[0].text, "quay");
    assert!(entry.def[0].translations[0].text.ends_with("<b>Etymology:</b><br/><br/>z"));
}

#[tokio::test]
async fn non_string_response_field_is_passed_on_as_raw_json() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": 42 })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(settings_for(&server)).unwrap();
    assert_eq!(client.explain("p").await.unwrap(), Some("42".to_string()));
}

#[tokio::test]
async fn non_string_response_field_is_retried() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": 42 })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": VALID })))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryEntryStore::new());
    let deck_id = store.insert_deck(deck(vec![Entry::new("quay", "On the quay.")]));
    let client = Arc::new(OllamaClient::new(settings_for(&server)).unwrap());
    let controller = RetryController::new(client, store.clone(), "T");
    let entry = store.get_deck(deck_id).unwrap().entries[0].clone();

    let outcome = controller.attempt(deck_id, &entry, 3).await;

    assert_eq!(outcome, TerminalOutcome::Applied);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
