use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::errors::ApiError;
use crate::config::ClientConfig;
use crate::models::{
    Acknowledgement, ChatReply, ChatRequest, ConversationsResponse, InsightsResponse,
    ReadingRecord, ReadingsResponse,
};

/// Backend operations used by the dashboard
///
/// Every call is a fresh round trip; nothing is cached. Implementations
/// never retry.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait HealthApiTrait: Send + Sync {
    /// `GET /api/readings`
    async fn get_readings(&self) -> Result<ReadingsResponse, ApiError>;

    /// `POST /api/addReading`
    async fn add_reading(&self, reading: ReadingRecord) -> Result<Acknowledgement, ApiError>;

    /// `DELETE /api/clearAllReadings`
    async fn clear_all_readings(&self) -> Result<(), ApiError>;

    /// `POST /api/generate_insights`
    async fn generate_insights(&self) -> Result<InsightsResponse, ApiError>;

    /// `POST /api/initial_chat`
    async fn initial_chat(&self) -> Result<ConversationsResponse, ApiError>;

    /// `GET /api/fetchhistory`
    async fn fetch_history(&self) -> Result<ConversationsResponse, ApiError>;

    /// `POST /api/chat`
    async fn chat(&self, message: String) -> Result<ChatReply, ApiError>;

    /// `POST /api/clearchat`
    async fn clear_chat(&self) -> Result<Acknowledgement, ApiError>;
}

/// `HealthApiTrait` over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpHealthApi {
    client: Client,
    config: ClientConfig,
}

impl HttpHealthApi {
    /// Create a client for the configured backend
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let config = config.validated()?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Send a request and return the body of a successful response
    async fn send(&self, endpoint: &'static str, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "Backend returned an error status");
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        debug!(endpoint, bytes = body.len(), "Backend request succeeded");
        Ok(body)
    }

    fn decode<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }

    /// Decode an acknowledgement, tolerating an empty body
    fn decode_ack(endpoint: &'static str, body: &str) -> Result<Acknowledgement, ApiError> {
        if body.trim().is_empty() {
            return Ok(Acknowledgement::default());
        }
        Self::decode(endpoint, body)
    }
}

#[async_trait]
impl HealthApiTrait for HttpHealthApi {
    #[instrument(skip(self))]
    async fn get_readings(&self) -> Result<ReadingsResponse, ApiError> {
        const ENDPOINT: &str = "GET /api/readings";
        let request = self.client.get(self.config.endpoint("/api/readings"));
        let body = self.send(ENDPOINT, request).await?;
        Self::decode(ENDPOINT, &body)
    }

    #[instrument(skip(self, reading), fields(date = %reading.date))]
    async fn add_reading(&self, reading: ReadingRecord) -> Result<Acknowledgement, ApiError> {
        const ENDPOINT: &str = "POST /api/addReading";
        let request = self
            .client
            .post(self.config.endpoint("/api/addReading"))
            .json(&reading);
        let body = self.send(ENDPOINT, request).await?;
        Self::decode_ack(ENDPOINT, &body)
    }

    #[instrument(skip(self))]
    async fn clear_all_readings(&self) -> Result<(), ApiError> {
        const ENDPOINT: &str = "DELETE /api/clearAllReadings";
        let request = self.client.delete(self.config.endpoint("/api/clearAllReadings"));
        self.send(ENDPOINT, request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn generate_insights(&self) -> Result<InsightsResponse, ApiError> {
        const ENDPOINT: &str = "POST /api/generate_insights";
        let request = self
            .client
            .post(self.config.endpoint("/api/generate_insights"))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        let body = self.send(ENDPOINT, request).await?;
        Self::decode(ENDPOINT, &body)
    }

    #[instrument(skip(self))]
    async fn initial_chat(&self) -> Result<ConversationsResponse, ApiError> {
        const ENDPOINT: &str = "POST /api/initial_chat";
        let request = self.client.post(self.config.endpoint("/api/initial_chat"));
        let body = self.send(ENDPOINT, request).await?;
        Self::decode(ENDPOINT, &body)
    }

    #[instrument(skip(self))]
    async fn fetch_history(&self) -> Result<ConversationsResponse, ApiError> {
        const ENDPOINT: &str = "GET /api/fetchhistory";
        let request = self.client.get(self.config.endpoint("/api/fetchhistory"));
        let body = self.send(ENDPOINT, request).await?;
        Self::decode(ENDPOINT, &body)
    }

    #[instrument(skip(self, message))]
    async fn chat(&self, message: String) -> Result<ChatReply, ApiError> {
        const ENDPOINT: &str = "POST /api/chat";
        let request = self
            .client
            .post(self.config.endpoint("/api/chat"))
            .json(&ChatRequest { message });
        let body = self.send(ENDPOINT, request).await?;
        Self::decode(ENDPOINT, &body)
    }

    #[instrument(skip(self))]
    async fn clear_chat(&self) -> Result<Acknowledgement, ApiError> {
        const ENDPOINT: &str = "POST /api/clearchat";
        let request = self
            .client
            .post(self.config.endpoint("/api/clearchat"))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        let body = self.send(ENDPOINT, request).await?;
        Self::decode_ack(ENDPOINT, &body)
    }
}

/// Mock backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use crate::models::{ChatMessageRecord, ReadingValues};

    pub use super::MockHealthApiTrait as MockHealthApi;

    /// Readings for three dates, one of them without an HbA1c value
    pub fn sample_readings() -> ReadingsResponse {
        let mut readings = ReadingsResponse::new();
        readings.insert(
            "2024-03-10".to_string(),
            ReadingValues {
                hba1c: Some(6.2),
                triglycerides: Some(1.5),
                hdl_cholesterol: Some(1.0),
                triglyceride_hdl_ratio: Some(1.5),
                ..Default::default()
            },
        );
        readings.insert(
            "2024-01-05".to_string(),
            ReadingValues {
                hba1c: Some(5.5),
                ..Default::default()
            },
        );
        readings.insert(
            "2024-02-20".to_string(),
            ReadingValues {
                fasting_glucose: Some(5.1),
                ..Default::default()
            },
        );
        readings
    }

    /// A two-message stored transcript
    pub fn sample_conversation() -> ConversationsResponse {
        ConversationsResponse {
            conversations: vec![
                ChatMessageRecord::new("user", "Hello"),
                ChatMessageRecord::new("assistant", "Hi! How can I help with your results?"),
            ],
            message: None,
        }
    }

    /// A 503 from the given endpoint
    pub fn unavailable(endpoint: &'static str) -> ApiError {
        ApiError::Status {
            endpoint,
            status: 503,
            body: "service unavailable".to_string(),
        }
    }

    #[test]
    fn test_decode_ack_tolerates_empty_body() {
        let ack = HttpHealthApi::decode_ack("POST /api/clearchat", "  ").unwrap();
        assert_eq!(ack, Acknowledgement::default());
    }

    #[test]
    fn test_decode_reports_endpoint() {
        let err = HttpHealthApi::decode::<InsightsResponse>("POST /api/generate_insights", "[]")
            .unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().contains("generate_insights"));
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let result = HttpHealthApi::new(ClientConfig::default().with_base_url("not a url"));
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[tokio::test]
    async fn test_mock_api_returns_scripted_readings() {
        let mut api = MockHealthApi::new();
        api.expect_get_readings()
            .times(1)
            .returning(|| Ok(sample_readings()));

        let readings = api.get_readings().await.unwrap();
        assert_eq!(readings.len(), 3);
    }
}
