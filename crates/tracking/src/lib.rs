//! Client-side domain for logging machine-learning experiments to a TrackML
//! server.
//!
//! This crate holds every type the client works with, the [`ApiTransport`]
//! port trait, and the [`TrackMl`] facade that composes requests, validates
//! responses, and buffers deferred experiments. It performs no I/O itself;
//! the `http-transport` crate supplies the HTTP implementation of
//! [`ApiTransport`].
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype ids (`ProjectId`, `ModelId`, `ExperimentId`) |
//! | [`types`] | Field values, experiment records, query params, responses |
//! | [`errors`] | `TransportError` and `TrackingError` |
//! | [`config`] | `TrackMlConfig` and its defaults |
//! | [`cache`] | The bounded deferred-log buffer |
//! | [`transport`] | The `ApiTransport` port trait |
//! | [`client`] | The `TrackMl` facade |

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod identifiers;
pub mod transport;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use cache::ExperimentCache;
pub use client::{paths, TrackMl};
pub use config::{TrackMlConfig, DEFAULT_BASE_URL, DEFAULT_CACHE_SIZE, DEFAULT_ENCODING};
pub use errors::{TrackingError, TransportError};
pub use identifiers::{ExperimentId, ModelId, ProjectId};
pub use transport::{ApiTransport, Method};
pub use types::{
    ApiResponse, BatchReceipt, ExperimentRecord, FieldValue, Fields, FlushOutcome, QueryParams,
};
