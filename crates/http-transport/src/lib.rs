//! TrackML HTTP transport.
//!
//! Implements the [`tracking::ApiTransport`] trait over `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL composition, query-string encoding, charset-aware
//! body decoding, and JSON parsing live here. The [`tracking`] crate sees only
//! [`tracking::ApiTransport`].
//!
//! ## Wire Format
//!
//! Every request targets `base_url + path` with the parameters form-encoded
//! into the query string and no body. HTTP status codes are not interpreted:
//! the server reports failure through the `success` field of the JSON body,
//! which the facade checks.
//!
//! The body is decoded with the charset named in the `Content-Type` header, or
//! the configured encoding when the header names none. Bytes that are invalid
//! in that charset, and bodies that are not a JSON object, are a
//! [`TransportError::Decode`]; nothing is decoded lossily.

use std::time::Instant;

use async_trait::async_trait;
use encoding_rs::Encoding;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Url};
use tracing::{debug, error};
use tracking::{ApiResponse, ApiTransport, Method, QueryParams, TrackMlConfig, TransportError};

/// `reqwest`-backed [`ApiTransport`].
///
/// Holds one pooled [`Client`]; cloning the transport shares the pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Base URL, normalised to end with `/`.
    base_url: Url,

    /// Fallback charset for bodies whose `Content-Type` names none.
    encoding: &'static Encoding,

    /// Shared HTTP client with connection pooling.
    http_client: Client,
}

impl HttpTransport {
    /// Creates a transport for `config.base_url` using `config.encoding`.
    ///
    /// # Errors
    ///
    /// - [`TransportError::InvalidUrl`] if the base URL is not an absolute
    ///   `http`/`https` URL.
    /// - [`TransportError::UnsupportedEncoding`] if `config.encoding` is not a
    ///   known charset label.
    /// - [`TransportError::Request`] if the HTTP client cannot be built.
    pub fn new(config: &TrackMlConfig) -> Result<Self, TransportError> {
        let http_client = Client::builder()
            .build()
            .map_err(|e| TransportError::Request {
                url: config.base_url.clone(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Self::with_client(config, http_client)
    }

    /// Creates a transport that sends requests through `http_client`.
    pub fn with_client(config: &TrackMlConfig, http_client: Client) -> Result<Self, TransportError> {
        let encoding = Encoding::for_label(config.encoding.trim().as_bytes()).ok_or_else(|| {
            TransportError::UnsupportedEncoding {
                label: config.encoding.clone(),
            }
        })?;

        Ok(Self {
            base_url: parse_base_url(&config.base_url)?,
            encoding,
            http_client,
        })
    }

    /// Fallback charset used to decode response bodies.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Resolves `path` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &QueryParams,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.endpoint(path)?;
        let builder = match method {
            Method::Get => self.http_client.get(url.clone()),
            Method::Post => self.http_client.post(url.clone()),
        };

        debug!(%method, %url, params = params.len(), "Sending request");
        let start = Instant::now();

        let response = builder
            .query(params.pairs())
            .send()
            .await
            .map_err(|e| {
                error!(%method, %url, error = %e, "Request failed");
                TransportError::Request {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        let charset = header_charset(response.headers());
        let bytes = response.bytes().await.map_err(|e| TransportError::Decode {
            url: url.to_string(),
            message: format!("failed to read body: {e}"),
        })?;
        let body = decode_text(&url, &bytes, charset.as_deref(), self.encoding)?;

        debug!(
            %url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Received response"
        );

        decode_body(&url, &body)
    }

    fn base_url(&self) -> &str {
        self.base_url.as_str()
    }
}

/// Parses and normalises a base URL so relative paths append to it.
fn parse_base_url(raw: &str) -> Result<Url, TransportError> {
    let mut normalised = raw.trim().to_string();
    if !normalised.ends_with('/') {
        normalised.push('/');
    }

    let url = Url::parse(&normalised).map_err(|e| TransportError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(TransportError::InvalidUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Extracts the `charset` parameter of the `Content-Type` header.
fn header_charset(headers: &HeaderMap) -> Option<String> {
    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

/// Decodes body bytes strictly, with the header charset taking precedence
/// over `fallback`.
fn decode_text(
    url: &Url,
    bytes: &[u8],
    header_charset: Option<&str>,
    fallback: &'static Encoding,
) -> Result<String, TransportError> {
    let encoding = match header_charset {
        Some(label) => Encoding::for_label(label.as_bytes()).ok_or_else(|| TransportError::Decode {
            url: url.to_string(),
            message: format!("unknown charset '{label}' in Content-Type"),
        })?,
        None => fallback,
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| TransportError::Decode {
            url: url.to_string(),
            message: format!("body is not valid {}", encoding.name()),
        })
}

/// Parses a response body into a JSON object.
fn decode_body(url: &Url, body: &str) -> Result<ApiResponse, TransportError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| TransportError::Decode {
            url: url.to_string(),
            message: format!("invalid JSON: {e}"),
        })?;

    ApiResponse::try_from(value).map_err(|other| TransportError::Decode {
        url: url.to_string(),
        message: format!("expected a JSON object, got {other}"),
    })
}
