use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::sink::UiSink;
use crate::state::{ConnectionState, Control};
use crate::transcript::Message;

pub const EMPTY_KNOWLEDGE_TEXT: &str = "Please enter some knowledge text before uploading.";
pub const UPLOAD_FALLBACK_TEXT: &str = "Knowledge uploaded successfully!";
pub const NO_ANSWER_TEXT: &str = "Sorry, I couldn't generate a response.";

/// Marks a control busy for as long as it lives.
///
/// Released on drop, so every exit path of a request (including the
/// future being dropped mid-flight) gives the control back exactly once.
struct BusyGuard<'a> {
    sink: &'a dyn UiSink,
    control: Control,
}

impl<'a> BusyGuard<'a> {
    fn acquire(sink: &'a dyn UiSink, control: Control) -> Self {
        sink.set_busy(control, true);
        Self { sink, control }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.sink.set_busy(self.control, false);
    }
}

/// Connectivity monitor, knowledge uploader and question asker in one.
///
/// Cheap to clone; clones share the backend, the sink and the connection state.
#[derive(Clone)]
pub struct ChatController {
    backend: Arc<dyn Backend>,
    sink: Arc<dyn UiSink>,
    state: Arc<watch::Sender<ConnectionState>>,
    retry_delay: Duration,
}

impl ChatController {
    pub fn new(backend: Arc<dyn Backend>, sink: Arc<dyn UiSink>, config: &Config) -> Self {
        let (state, _) = watch::channel(ConnectionState::Connecting);
        Self {
            backend,
            sink,
            state: Arc::new(state),
            retry_delay: config.health_retry_delay(),
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn set_state(&self, next: ConnectionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            info!(from = ?previous, to = ?next, "connection state changed");
        }
        self.sink.show_status(next);
    }

    /// Run one health probe and enable the dependent controls iff it succeeds.
    pub async fn check_health(&self) -> ConnectionState {
        self.set_state(ConnectionState::Connecting);

        let next = match self.backend.health().await {
            Ok(()) => ConnectionState::Connected,
            Err(e) => {
                warn!(error = %e, "backend health check failed");
                ConnectionState::Offline
            }
        };

        self.set_state(next);
        self.sink.set_controls_enabled(next.is_connected());
        next
    }

    /// Probe until the backend is reachable, waiting the fixed retry delay
    /// after every failure. Only one probe is ever in flight.
    pub async fn monitor(&self) {
        loop {
            if self.check_health().await.is_connected() {
                return;
            }
            debug!(delay_secs = self.retry_delay.as_secs(), "scheduling health re-check");
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    pub fn spawn_monitor(&self) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move { controller.monitor().await })
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connection_state().is_connected() {
            Ok(())
        } else {
            warn!("request refused while backend is not connected");
            Err(ChatError::Offline)
        }
    }

    /// Send knowledge text to the backend for ingestion.
    pub async fn upload(&self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            self.sink.append_message(Message::system(EMPTY_KNOWLEDGE_TEXT));
            return Err(ChatError::EmptyInput);
        }
        self.ensure_connected()?;

        let _busy = BusyGuard::acquire(&*self.sink, Control::UploadButton);

        match self.backend.upload_text(text).await {
            Ok(response) => {
                let ack = response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| UPLOAD_FALLBACK_TEXT.to_string());
                info!("knowledge uploaded");
                self.sink.append_message(Message::system(ack.clone()));
                self.sink.clear_input(Control::KnowledgeInput);
                Ok(ack)
            }
            Err(e) => {
                warn!(error = %e, "knowledge upload failed");
                self.sink.append_message(Message::system(format!("Upload failed: {}", e)));
                Err(e.into())
            }
        }
    }

    /// Ask a question and put the answer (or the failure) in the transcript.
    ///
    /// Empty questions are ignored without any message.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        self.ensure_connected()?;

        self.sink.append_message(Message::user(question));
        self.sink.clear_input(Control::QuestionInput);

        let _busy = BusyGuard::acquire(&*self.sink, Control::SendButton);
        self.sink.append_message(Message::thinking());

        let result = self.backend.ask(question).await;
        self.sink.remove_pending();

        match result {
            Ok(response) => {
                let answer = response
                    .answer
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| NO_ANSWER_TEXT.to_string());
                self.sink.append_message(Message::assistant(answer.clone()));
                Ok(answer)
            }
            Err(e) => {
                warn!(error = %e, "question failed");
                self.sink
                    .append_message(Message::assistant(format!("Sorry, I encountered an error: {}", e)));
                Err(e.into())
            }
        }
    }
}
