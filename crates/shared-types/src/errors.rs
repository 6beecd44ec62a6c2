//! Common error types used across all perfcharts crates
//! Provides consistent error handling and reporting

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base error type for all perfcharts operations
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum PerfChartsError {
    // Data-related errors
    #[error("Data fetch failed: {message}")]
    DataFetch { message: String },

    #[error("Data parse error: {message}")]
    DataParse {
        message: String,
        offset: Option<usize>,
    },

    #[error("Data not found: {resource}")]
    DataNotFound { resource: String },

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
        field: Option<String>,
    },

    #[error("Storage error: {message}")]
    Storage { message: String },

    // Chart instance errors
    #[error("Instance not found: {id}")]
    InstanceNotFound { id: String },

    #[error("Chart handle no longer mounted: {id}")]
    StaleHandle { id: String },

    // WASM-specific errors
    #[error("JavaScript interop error: {message}")]
    JsInterop { message: String },
}

/// Result type alias for perfcharts operations
pub type PerfChartsResult<T> = Result<T, PerfChartsError>;

/// Error response structure for JavaScript interop
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: PerfChartsError,
    pub timestamp: u64,
    pub context: Option<ErrorContext>,
}

/// Additional context for error reporting
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorContext {
    pub component: String,
    pub operation: String,
}

impl ErrorResponse {
    pub fn new(error: PerfChartsError) -> Self {
        Self {
            success: false,
            error,
            timestamp: chrono::Utc::now().timestamp_millis() as u64,
            context: None,
        }
    }

    pub fn with_context(mut self, component: &str, operation: &str) -> Self {
        self.context = Some(ErrorContext {
            component: component.to_string(),
            operation: operation.to_string(),
        });
        self
    }

    /// Convert to JSON string for JavaScript
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"type":"JsInterop","details":{"message":"Failed to serialize error"}}}"#.to_string()
        })
    }
}

impl From<serde_json::Error> for PerfChartsError {
    fn from(err: serde_json::Error) -> Self {
        PerfChartsError::DataParse {
            message: err.to_string(),
            offset: Some(err.line()),
        }
    }
}
