//! TrackML experiment-logging client.
//!
//! This crate is the composition root: it wires the [`tracking::TrackMl`]
//! facade to the [`HttpTransport`] and offers a `tracing-subscriber` setup for
//! applications that do not install their own.
//!
//! ```no_run
//! use trackml::{fields, ModelId, TrackMlConfig};
//!
//! # async fn example() -> Result<(), trackml::TrackingError> {
//! let mut client = trackml::connect(&TrackMlConfig {
//!     model_id: Some(ModelId::new(1)),
//!     ..TrackMlConfig::default()
//! })?;
//!
//! let id = client
//!     .log(fields! { "max_depth" => 3 }, fields! { "accuracy" => 0.93 }, None)
//!     .await?;
//! println!("logged experiment {id}");
//!
//! client
//!     .deferred_log(fields! { "max_depth" => 5 }, fields! { "accuracy" => 0.91 }, None)
//!     .await?;
//! client.send_cache().await?;
//! # Ok(())
//! # }
//! ```

pub mod logging;

use tracing::info;

pub use http_transport::HttpTransport;
pub use tracking::*;

/// The facade over HTTP, as used against a real server.
pub type Client = TrackMl<HttpTransport>;

/// Builds a client for the server named in `config`.
///
/// # Errors
///
/// - [`TrackingError::Transport`] if the base URL cannot be parsed, the
///   encoding label is unknown, or the HTTP client cannot be built.
/// - [`TrackingError::Configuration`] if `config` fails validation.
pub fn connect(config: &TrackMlConfig) -> Result<Client, TrackingError> {
    let transport = HttpTransport::new(config)?;
    let client = TrackMl::new(transport, config)?;

    info!(
        base_url = client.base_url(),
        cache_size = client.cache_size(),
        default_model = ?client.model(),
        "TrackML client ready"
    );
    Ok(client)
}
