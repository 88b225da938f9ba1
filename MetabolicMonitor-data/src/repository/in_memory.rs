use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::errors::ApiError;
use super::health_api::HealthApiTrait;
use crate::models::{
    Acknowledgement, ChatMessageRecord, ChatReply, ConversationsResponse, InsightsResponse,
    ReadingRecord, ReadingsResponse, NO_DATA_SENTINEL,
};
use crate::push::{PushEvent, NEW_READING_EVENT};

/// In-process stand-in for the backend
///
/// Keeps readings and the chat transcript in memory and answers insight and
/// chat requests with canned text. Used for demo mode, where no server is
/// running. When a push sender is attached, writes to the readings emit
/// `new_reading` the way a live backend would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHealthApi {
    readings: Arc<Mutex<ReadingsResponse>>,
    conversations: Arc<Mutex<Vec<ChatMessageRecord>>>,
    push: Option<UnboundedSender<PushEvent>>,
}

impl InMemoryHealthApi {
    /// Create an empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `new_reading` on this sender whenever readings change
    pub fn with_push_events(mut self, push: UnboundedSender<PushEvent>) -> Self {
        self.push = Some(push);
        self
    }

    /// Seed a stored reading
    pub fn with_reading(self, reading: ReadingRecord) -> Self {
        if let Ok(mut readings) = self.readings.lock() {
            readings.insert(reading.date, reading.values);
        }
        self
    }

    fn notify_change(&self) {
        if let Some(push) = &self.push {
            if push.send(PushEvent::new(NEW_READING_EVENT)).is_err() {
                debug!("No listener for in-memory push events");
            }
        }
    }

    fn latest_hba1c(readings: &ReadingsResponse) -> Option<(String, f64)> {
        readings
            .iter()
            .rev()
            .find_map(|(date, values)| values.hba1c.map(|v| (date.clone(), v)))
    }
}

#[async_trait]
impl HealthApiTrait for InMemoryHealthApi {
    async fn get_readings(&self) -> Result<ReadingsResponse, ApiError> {
        Ok(self.readings.lock()?.clone())
    }

    async fn add_reading(&self, reading: ReadingRecord) -> Result<Acknowledgement, ApiError> {
        {
            let mut readings = self.readings.lock()?;
            readings.insert(reading.date, reading.values);
        }
        self.notify_change();
        Ok(Acknowledgement {
            status: Some("success".to_string()),
            message: Some("Reading added successfully".to_string()),
        })
    }

    async fn clear_all_readings(&self) -> Result<(), ApiError> {
        self.readings.lock()?.clear();
        self.conversations.lock()?.clear();
        Ok(())
    }

    async fn generate_insights(&self) -> Result<InsightsResponse, ApiError> {
        let readings = self.readings.lock()?;
        if readings.is_empty() {
            return Ok(InsightsResponse {
                response_text: NO_DATA_SENTINEL.to_string(),
            });
        }

        let explanation = match Self::latest_hba1c(&readings) {
            Some((date, value)) => format!("Your most recent HbA1c, recorded on {}, is {}%.", date, value),
            None => "None of your readings include an HbA1c value yet.".to_string(),
        };
        let document = json!({
            "Explanations": [
                { "HbA1c": explanation },
                { "Readings on file": format!("{} dated reading(s) are stored.", readings.len()) }
            ],
            "Suggestions": [
                { "Keep recording": "Regular readings make trends easier to interpret." }
            ]
        });

        Ok(InsightsResponse {
            response_text: document.to_string(),
        })
    }

    async fn initial_chat(&self) -> Result<ConversationsResponse, ApiError> {
        let count = self.readings.lock()?.len();
        let greeting = format!(
            "Hello! I can see {} reading(s) on file. Ask me anything about your results.",
            count
        );
        let mut conversations = self.conversations.lock()?;
        conversations.push(ChatMessageRecord::new("assistant", greeting.clone()));
        Ok(ConversationsResponse {
            conversations: conversations.clone(),
            message: Some(greeting),
        })
    }

    async fn fetch_history(&self) -> Result<ConversationsResponse, ApiError> {
        Ok(ConversationsResponse {
            conversations: self.conversations.lock()?.clone(),
            message: None,
        })
    }

    async fn chat(&self, message: String) -> Result<ChatReply, ApiError> {
        let reply = match Self::latest_hba1c(&*self.readings.lock()?) {
            Some((date, value)) => format!(
                "You asked: **{}**. Your latest HbA1c ({}) is {}%.",
                message.trim(),
                date,
                value
            ),
            None => format!("You asked: **{}**. Add a reading so I can help.", message.trim()),
        };

        let mut conversations = self.conversations.lock()?;
        conversations.push(ChatMessageRecord::new("user", message));
        conversations.push(ChatMessageRecord::new("assistant", reply.clone()));

        Ok(ChatReply {
            message: reply,
            conversations: Some(conversations.clone()),
        })
    }

    async fn clear_chat(&self) -> Result<Acknowledgement, ApiError> {
        self.conversations.lock()?.clear();
        Ok(Acknowledgement {
            status: None,
            message: Some("Chat history cleared successfully".to_string()),
        })
    }
}
