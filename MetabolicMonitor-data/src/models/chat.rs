use serde::{Deserialize, Serialize};

/// One transcript entry as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    /// `user` or `assistant`
    pub role: String,

    /// Message text, may contain `**bold**` markup
    pub content: String,
}

impl ChatMessageRecord {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Response of `POST /api/initial_chat` and `GET /api/fetchhistory`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationsResponse {
    /// The complete stored transcript
    #[serde(default)]
    pub conversations: Vec<ChatMessageRecord>,

    /// Greeting produced by `initial_chat`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Request body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Response of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Assistant reply
    pub message: String,

    /// Transcript after the exchange, when the backend includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversations: Option<Vec<ChatMessageRecord>>,
}
