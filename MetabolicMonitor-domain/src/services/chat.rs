use metabolic_monitor_data::{ApiError, HealthApiTrait};
use tracing::{debug, info, instrument, warn};

use crate::entities::chat::ChatMessage;
use crate::entities::conversions::convert_to_domain_transcript;
use crate::services::refresh::{RefreshToken, RefreshTracker};

/// Shown in place of a reply when sending fails
pub const CHAT_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// Start or resume the conversation; the backend may append a greeting
#[instrument(skip(api))]
pub async fn load_transcript(api: &dyn HealthApiTrait) -> Result<Vec<ChatMessage>, ApiError> {
    let response = api.initial_chat().await?;
    Ok(convert_to_domain_transcript(response.conversations))
}

/// Stored transcript, without asking the backend to say anything new
#[instrument(skip(api))]
pub async fn load_history(api: &dyn HealthApiTrait) -> Result<Vec<ChatMessage>, ApiError> {
    let response = api.fetch_history().await?;
    Ok(convert_to_domain_transcript(response.conversations))
}

/// Send one message and return the assistant's reply
#[instrument(skip(api, message), fields(chars = message.len()))]
pub async fn send_message(api: &dyn HealthApiTrait, message: String) -> Result<String, ApiError> {
    let reply = api.chat(message).await?;
    Ok(reply.message)
}

/// Ask the backend to wipe the stored transcript
#[instrument(skip(api))]
pub async fn clear_history(api: &dyn HealthApiTrait) -> Result<(), ApiError> {
    api.clear_chat().await?;
    Ok(())
}

/// Chat widget state: transcript, input line, and in-flight flags
#[derive(Debug, Default)]
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
    input: String,
    responding: bool,
    clearing: bool,
    resync: RefreshTracker,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn push_input(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input(&mut self) {
        self.input.pop();
    }

    pub fn is_responding(&self) -> bool {
        self.responding
    }

    pub fn can_send(&self) -> bool {
        !self.responding && !self.clearing && !self.input.trim().is_empty()
    }

    pub fn can_clear(&self) -> bool {
        !self.responding && !self.clearing
    }

    /// Start rebuilding the transcript from the backend
    pub fn begin_resync(&mut self) -> RefreshToken {
        self.resync.issue()
    }

    /// Replace the transcript; returns `false` if the result was superseded
    pub fn apply_resync(&mut self, token: RefreshToken, result: Result<Vec<ChatMessage>, ApiError>) -> bool {
        if !self.resync.is_current(token) {
            debug!(token = token.value(), "Discarding stale transcript");
            return false;
        }
        match result {
            Ok(transcript) => {
                debug!(messages = transcript.len(), "Transcript replaced");
                self.transcript = transcript;
            }
            Err(e) => warn!(error = %e, "Failed to load chat transcript"),
        }
        true
    }

    /// Take the input for sending
    ///
    /// Nothing is sent for blank input, or while a reply or a clear is
    /// pending. Otherwise the message is appended right away and the input
    /// cleared.
    pub fn begin_send(&mut self) -> Option<String> {
        if !self.can_send() {
            return None;
        }
        let message = std::mem::take(&mut self.input);
        self.transcript.push(ChatMessage::user(message.clone()));
        self.responding = true;
        Some(message)
    }

    /// Append the reply, or the apology if sending failed
    pub fn complete_send(&mut self, result: Result<String, ApiError>) {
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                CHAT_APOLOGY.to_string()
            }
        };
        self.transcript.push(ChatMessage::assistant(reply));
        self.responding = false;
    }

    /// Start clearing; returns `false` while a reply is pending
    pub fn begin_clear(&mut self) -> bool {
        if !self.can_clear() {
            return false;
        }
        self.clearing = true;
        true
    }

    /// Empty the transcript whether or not the backend wipe succeeded
    pub fn complete_clear(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => info!("Chat history cleared"),
            Err(e) => warn!(error = %e, "Backend failed to clear chat history"),
        }
        self.transcript.clear();
        self.clearing = false;
        self.resync.invalidate();
    }
}
