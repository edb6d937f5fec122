//! Error types for the tracking client.
//!
//! [`TransportError`] is what an [`crate::ApiTransport`] implementation
//! reports when a request cannot be completed or its body cannot be decoded.
//! [`TrackingError`] is what every client operation returns; it wraps
//! transport failures and adds the conditions the client itself detects.
//!
//! Nothing here is retried. Every error is final for the operation that
//! produced it and is handed to the caller.

use thiserror::Error;

use crate::ApiResponse;

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Failures raised by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The target URL could not be built from the base URL and path.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The URL (or base URL) that failed to parse.
        url: String,
        /// Parser diagnostic.
        message: String,
    },

    /// The configured response encoding is not a known charset label.
    #[error("Unsupported response encoding '{label}'")]
    UnsupportedEncoding {
        /// The label as configured.
        label: String,
    },

    /// The request could not be sent or no response was received
    /// (connection refused, DNS failure, I/O error).
    #[error("Request to '{url}' failed: {message}")]
    Request {
        /// Full request URL without the query string.
        url: String,
        /// Underlying client diagnostic.
        message: String,
    },

    /// The response body was not a JSON object in the expected encoding.
    #[error("Could not decode response from '{url}': {message}")]
    Decode {
        /// Full request URL without the query string.
        url: String,
        /// Decoder diagnostic.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Client errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::TrackMl`] operations.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// No model id was passed and no default model is set.
    ///
    /// Raised before anything is queued or sent. Call
    /// [`crate::TrackMl::set_model`] or pass a model id explicitly.
    #[error("No model id given and no default model set")]
    MissingModelId,

    /// The server answered without `"success": true`.
    ///
    /// Carries the parsed response so callers can inspect server messages.
    #[error("Server rejected request to '{path}': {response}")]
    Rejected {
        /// API path that was called.
        path: String,
        /// The decoded response body.
        response: ApiResponse,
    },

    /// The server reported success but the response lacked a usable `id`.
    #[error("Invalid response from '{path}': {message}")]
    InvalidResponse {
        /// API path that was called.
        path: String,
        /// What was wrong with the response.
        message: String,
    },

    /// The client configuration is invalid.
    ///
    /// Produced at construction time; a client never exists with an invalid
    /// configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// Request parameters could not be serialised to JSON.
    #[error("Could not encode request parameters: {0}")]
    Encode(#[from] serde_json::Error),

    /// The transport failed; see [`TransportError`].
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl TrackingError {
    /// Shorthand for a [`TrackingError::Configuration`] error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
