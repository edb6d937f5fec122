//! Port trait for talking to the tracking server.
//!
//! The client facade only knows how to compose requests and validate
//! responses. Sending them is delegated to an [`ApiTransport`]; the
//! `http-transport` crate provides the HTTP implementation.

use async_trait::async_trait;

use crate::{ApiResponse, QueryParams, TransportError};

/// HTTP verb of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl Method {
    /// Upper-case verb as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A JSON API endpoint reachable under a fixed base URL.
///
/// Implementations encode `params` as the query string of
/// `base_url + path`, issue the request, and decode the body as a JSON object.
/// They must not interpret the `success` field; that is the facade's job.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Issues one request and returns the decoded JSON object.
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &QueryParams,
    ) -> Result<ApiResponse, TransportError>;

    /// Root URL every path is resolved against.
    fn base_url(&self) -> &str;

    /// Issues a `GET` request.
    async fn get(&self, path: &str, params: &QueryParams) -> Result<ApiResponse, TransportError> {
        self.request(Method::Get, path, params).await
    }

    /// Issues a `POST` request.
    async fn post(&self, path: &str, params: &QueryParams) -> Result<ApiResponse, TransportError> {
        self.request(Method::Post, path, params).await
    }
}
