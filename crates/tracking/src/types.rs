//! Shared value types: logged fields, experiment records, request parameters
//! and decoded server responses.
//!
//! Parameters and scores are free-form. The client never interprets them; it
//! only guarantees they reach the server as JSON objects with the caller's
//! keys and values intact.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ModelId;

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// A single hyperparameter or score value.
///
/// Serialises as the bare JSON scalar (`0.1`, `"gini"`, `null`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicitly absent value (e.g. `max_depth = None`).
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integral value.
    Integer(i64),
    /// Floating-point value.
    Float(f64),
    /// Free text (e.g. a criterion or optimiser name).
    Text(String),
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------

/// An ordered key→value mapping used for both `parameters` and `scores`.
///
/// Keys are kept sorted so the JSON sent to the server is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous value for `key` if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Builds a [`Fields`] mapping from `key => value` pairs.
///
/// ```
/// let params = tracking::fields! { "lr" => 0.1, "criterion" => "gini" };
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $( fields.insert($key, $value); )+
        fields
    }};
}

// ---------------------------------------------------------------------------
// Experiment records
// ---------------------------------------------------------------------------

/// One experiment: the hyperparameters tried and the scores they produced,
/// attributed to a model.
///
/// The model id is always resolved by the time a record exists; see
/// [`crate::TrackMl::log`] for the resolution rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    /// Model the experiment is logged against.
    pub model_id: ModelId,
    /// Hyperparameters used for this run.
    pub parameters: Fields,
    /// Metric values produced by this run.
    pub scores: Fields,
}

impl ExperimentRecord {
    /// Creates a record for `model_id`.
    pub fn new(model_id: ModelId, parameters: Fields, scores: Fields) -> Self {
        Self {
            model_id,
            parameters,
            scores,
        }
    }
}

// ---------------------------------------------------------------------------
// Request parameters
// ---------------------------------------------------------------------------

/// Ordered `(key, value)` pairs sent as the URL query string of a request.
///
/// Keys use the server's bracketed form-field naming (`model[name]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair and returns `self` for chaining.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Appends a pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Returns the first value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All pairs in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// A decoded JSON object returned by the tracking server.
///
/// The server contract is loose: `success` is the only field every endpoint
/// sends, and creation endpoints add an `id` that may arrive as a number or a
/// numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiResponse(Map<String, Value>);

impl ApiResponse {
    /// Wraps an already-decoded JSON object.
    pub fn new(object: Map<String, Value>) -> Self {
        Self(object)
    }

    /// Returns `true` only if the server sent `"success": true`.
    ///
    /// A missing or non-boolean `success` field counts as failure.
    pub fn success(&self) -> bool {
        self.0.get("success").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Returns the `id` field as an integer, if present and convertible.
    pub fn id(&self) -> Option<u64> {
        match self.0.get("id")? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns an arbitrary field of the response.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Borrows the underlying JSON object.
    pub fn as_json(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts back into a [`Value`].
    pub fn into_json(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for ApiResponse {
    type Error = Value;

    /// Accepts JSON objects only; any other value is handed back unchanged.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(object) => Ok(Self(object)),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

// ---------------------------------------------------------------------------
// Flush results
// ---------------------------------------------------------------------------

/// Result of a batch request that delivered the cached experiments.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReceipt {
    /// Number of experiment records delivered in the batch.
    pub count: usize,
    /// Server response to the batch request.
    pub response: ApiResponse,
}

/// Outcome of [`crate::TrackMl::send_cache`].
///
/// Failures are reported through `Err`; both variants mean the cache holds
/// nothing that the server has not accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum FlushOutcome {
    /// The cache was empty; no request was made.
    Empty,
    /// The cache was delivered and cleared.
    Flushed(BatchReceipt),
}

impl FlushOutcome {
    /// Returns the batch receipt if a request was made.
    pub fn receipt(&self) -> Option<&BatchReceipt> {
        match self {
            Self::Empty => None,
            Self::Flushed(receipt) => Some(receipt),
        }
    }
}
