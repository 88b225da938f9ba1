// Wire models exchanged with the backend
pub mod chat;
pub mod common;
pub mod insights;
pub mod reading;

pub use chat::{ChatMessageRecord, ChatReply, ChatRequest, ConversationsResponse};
pub use common::Acknowledgement;
pub use insights::{InsightsResponse, NO_DATA_SENTINEL};
pub use reading::{ReadingRecord, ReadingValues, ReadingsResponse};
