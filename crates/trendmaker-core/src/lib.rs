pub mod ask;
pub mod chat;
pub mod config;
pub mod error;
pub mod state;

// Re-export main types for convenience
pub use ask::{AskBackend, AskClient, DEFAULT_ENDPOINT};
pub use chat::{ChatView, PendingSend, RequestId, BACKEND_ERROR_TEXT};
pub use config::{Config, Theme};
pub use error::{AskError, ConfigError};
pub use state::{ConversationLog, Message, Sender};
