pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod sink;
pub mod state;
pub mod transcript;
pub mod view;

// Re-export main types for convenience
pub use backend::{AskResponse, Backend, HttpBackend, UploadResponse};
pub use config::Config;
pub use controller::ChatController;
pub use error::{BackendError, ChatError};
pub use sink::{UiEvent, UiSink};
pub use state::{ConnectionState, Control};
pub use transcript::{Message, Role, Transcript};
pub use view::ViewState;
