use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;
use tokio::sync::mpsc;

use stratamind_core::{
    Backend, BackendError, ChatController, Config, ConnectionState, Control, HttpBackend, Message,
    Role, UiEvent, ViewState,
};

fn config_for(server: &MockServer) -> Config {
    Config::new().with_backend_override(Some(server.base_url()))
}

fn controller_for(config: &Config) -> (ChatController, mpsc::UnboundedReceiver<UiEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let backend = Arc::new(HttpBackend::from_config(config));
    (ChatController::new(backend, Arc::new(tx), config), rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<UiEvent>) -> ViewState {
    let mut view = ViewState::new();
    while let Ok(event) = rx.try_recv() {
        view.apply(event);
    }
    view
}

#[tokio::test]
async fn health_ok_and_failure_statuses() {
    let server = MockServer::start_async().await;
    let health = server
        .mock_async(|when, then| {
            when.method(GET).path("/health").header("accept", "application/json");
            then.status(200).json_body(json!({"status": "ok"}));
        })
        .await;

    let backend = HttpBackend::from_config(&config_for(&server));
    assert_eq!(backend.health().await, Ok(()));
    health.assert_calls(1);

    let down = MockServer::start_async().await;
    down.mock_async(|when, then| {
        when.method(GET).path("/health");
        then.status(503);
    })
    .await;

    let backend = HttpBackend::from_config(&config_for(&down));
    let err = backend.health().await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
}

#[tokio::test]
async fn health_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/health");
            then.status(200).delay(Duration::from_secs(3));
        })
        .await;

    let mut config = config_for(&server);
    config.health_timeout_secs = 1;
    let backend = HttpBackend::from_config(&config);

    assert_eq!(backend.health().await, Err(BackendError::Timeout));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let backend = HttpBackend::new("http://127.0.0.1:1");
    let err = backend.health().await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn upload_sends_knowledge_file() {
    let server = MockServer::start_async().await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/upload_text/")
                .body_includes("name=\"file\"; filename=\"knowledge.txt\"")
                .body_includes("The sky is blue.");
            then.status(200).json_body(json!({"message": "Uploaded 1 document"}));
        })
        .await;

    let backend = HttpBackend::from_config(&config_for(&server));
    let response = backend.upload_text("The sky is blue.").await.unwrap();

    assert_eq!(response.message.as_deref(), Some("Uploaded 1 document"));
    upload.assert_calls(1);
}

#[tokio::test]
async fn ask_sends_question_field() {
    let server = MockServer::start_async().await;
    let ask = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/ask/")
                .body_includes("name=\"question\"")
                .body_includes("What colour is the sky?");
            then.status(200).json_body(json!({"answer": "Blue."}));
        })
        .await;

    let backend = HttpBackend::from_config(&config_for(&server));
    let response = backend.ask("What colour is the sky?").await.unwrap();

    assert_eq!(response.answer.as_deref(), Some("Blue."));
    ask.assert_calls(1);
}

#[tokio::test]
async fn non_json_body_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ask/");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let backend = HttpBackend::from_config(&config_for(&server));
    let err = backend.ask("anyone there?").await.unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn ask_round_trip_through_controller() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/health");
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ask/");
            then.status(200).json_body(json!({"answer": "X is Y"}));
        })
        .await;

    let config = config_for(&server);
    let (controller, mut rx) = controller_for(&config);

    assert_eq!(controller.check_health().await, ConnectionState::Connected);
    assert_eq!(controller.ask("What is X?").await.unwrap(), "X is Y");

    let view = drain(&mut rx);
    assert_eq!(
        view.transcript.messages(),
        [Message::user("What is X?"), Message::assistant("X is Y")]
    );
    assert!(view.is_enabled(Control::SendButton));
}

#[tokio::test]
async fn upload_server_error_through_controller() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/health");
            then.status(200);
        })
        .await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST).path("/upload_text/");
            then.status(500);
        })
        .await;

    let config = config_for(&server);
    let (controller, mut rx) = controller_for(&config);

    controller.check_health().await;
    assert!(controller.upload("some fact").await.is_err());
    upload.assert_calls(1);

    let view = drain(&mut rx);
    let last = view.transcript.last().unwrap();
    assert_eq!(last.role, Role::System);
    assert!(last.text.starts_with("Upload failed: HTTP 500"), "got {:?}", last.text);
    assert!(view.is_enabled(Control::UploadButton));
}

#[tokio::test]
async fn ask_gateway_error_through_controller() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/health");
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ask/");
            then.status(502);
        })
        .await;

    let config = config_for(&server);
    let (controller, mut rx) = controller_for(&config);
    controller.check_health().await;

    assert!(controller.ask("hi").await.is_err());

    let view = drain(&mut rx);
    let messages = view.transcript.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].text, "Sorry, I encountered an error: HTTP 502: Bad Gateway");
    assert!(!view.transcript.has_pending());
    assert!(view.is_enabled(Control::SendButton));
}
