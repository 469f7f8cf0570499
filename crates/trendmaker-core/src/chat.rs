//! The chat view: conversation log, input buffer and the send operation.
//!
//! A send has a synchronous half ([`ChatView::begin_send`]) that records the
//! user's message and clears the buffer, and a completion half
//! ([`ChatView::complete`]) that records the agent's reply. Front-ends that
//! keep taking input while a request is outstanding call the two halves
//! separately; everything else can use [`ChatView::send`].

use tracing::{debug, warn};

use crate::ask::AskBackend;
use crate::error::AskError;
use crate::state::{ConversationLog, Message};

/// Text of the agent bubble shown for any failed request
pub const BACKEND_ERROR_TEXT: &str = "⚠️ Backend error. Please try again later.";

pub type RequestId = u64;

/// A user message that has been logged and still needs an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub id: RequestId,
    pub message: String,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Default)]
pub struct ChatView {
    log: ConversationLog,
    input: String,
    cursor: usize, // in chars, not bytes
    in_flight: Vec<RequestId>,
    next_id: RequestId,
    failures: usize,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the buffer, leaving the cursor at the end
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.cursor = self.input.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Number of requests still waiting for a reply
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_awaiting(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Replies that were replaced by the backend error bubble
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Log the current input as a user message and clear the buffer.
    ///
    /// Returns `None` (and changes nothing) when the input is blank.
    pub fn begin_send(&mut self) -> Option<PendingSend> {
        if self.input.trim().is_empty() {
            return None;
        }

        let message = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.log.push(Message::user(message.clone()));

        let id = self.next_id;
        self.next_id += 1;
        self.in_flight.push(id);
        debug!(id, in_flight = self.in_flight.len(), "send dispatched");

        Some(PendingSend { id, message })
    }

    /// Record the outcome of request `id` as an agent message.
    ///
    /// Returns `false` for ids that are unknown or already completed; those
    /// leave the log untouched.
    pub fn complete(&mut self, id: RequestId, outcome: Result<String, AskError>) -> bool {
        let Some(pos) = self.in_flight.iter().position(|&pending| pending == id) else {
            warn!(id, "ignoring completion for unknown request");
            return false;
        };
        self.in_flight.remove(pos);

        let text = match outcome {
            Ok(reply) => {
                debug!(id, "reply received");
                reply
            }
            Err(e) => {
                warn!(id, kind = e.kind(), error = %e, "ask request failed");
                self.failures += 1;
                BACKEND_ERROR_TEXT.to_string()
            }
        };
        self.log.push(Message::agent(text));
        true
    }

    /// Send the current input and wait for the reply.
    ///
    /// Returns the request id, or `None` when the input was blank.
    pub async fn send<B>(&mut self, backend: &B) -> Option<RequestId>
    where
        B: AskBackend + ?Sized,
    {
        let pending = self.begin_send()?;
        let outcome = backend.ask(&pending.message).await;
        self.complete(pending.id, outcome);
        Some(pending.id)
    }
}
