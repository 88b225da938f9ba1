use serde::{Deserialize, Serialize};

/// Acknowledgement body returned by write endpoints
///
/// The backend answers with `{"status": ..., "message": ...}` on some routes
/// and only `{"message": ...}` on others, so both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Outcome reported by the backend, e.g. `success`
    #[serde(default)]
    pub status: Option<String>,

    /// Human readable message
    #[serde(default)]
    pub message: Option<String>,
}
