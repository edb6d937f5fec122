//! The TrackML client facade.
//!
//! [`TrackMl`] composes requests for the tracking server, validates its
//! responses, holds the default model id, and buffers deferred experiments.
//! It is generic over the [`ApiTransport`] that actually moves bytes, so the
//! same logic runs against HTTP in production and an in-memory double in
//! tests.
//!
//! ## Default model id
//!
//! Experiment-logging calls take an optional model id. When it is `None` the
//! stored default is used; when both are absent the call fails with
//! [`TrackingError::MissingModelId`] before anything is queued or sent.
//! Creating a project or a model clears the default because it was scoped to
//! the previous context.
//!
//! ## Deferred logging
//!
//! [`TrackMl::deferred_log`] queues records and flushes them in one batch
//! request once `cache_size` records are waiting. [`TrackMl::send_cache`]
//! flushes on demand. The cache is cleared only after the server accepts the
//! batch; on failure every record stays queued and the next flush resends it.

use tracing::{debug, info, warn};

use crate::{
    ApiResponse, ApiTransport, BatchReceipt, ExperimentCache, ExperimentId, ExperimentRecord,
    Fields, FlushOutcome, ModelId, ProjectId, QueryParams, TrackMlConfig, TrackingError,
};

/// API paths of the tracking server.
pub mod paths {
    /// Creates a project.
    pub const CREATE_PROJECT: &str = "api/create_project";
    /// Creates a model under a project.
    pub const CREATE_MODEL: &str = "api/create_model";
    /// Logs a single experiment.
    pub const CREATE_EXPERIMENT: &str = "api/create_experiment";
    /// Logs a batch of experiments.
    pub const CREATE_EXPERIMENTS: &str = "api/create_experiments";
}

/// Client for a TrackML experiment-tracking server.
///
/// Not designed for concurrent use: mutating operations take `&mut self`.
#[derive(Debug)]
pub struct TrackMl<T> {
    transport: T,
    default_model: Option<ModelId>,
    cache: ExperimentCache,
}

impl<T: ApiTransport> TrackMl<T> {
    /// Creates a client over `transport`.
    ///
    /// Uses `config.cache_size` as the flush threshold and `config.model_id`
    /// as the initial default model.
    ///
    /// # Errors
    ///
    /// [`TrackingError::Configuration`] if `config` fails validation.
    pub fn new(transport: T, config: &TrackMlConfig) -> Result<Self, TrackingError> {
        config.validate()?;

        Ok(Self {
            transport,
            default_model: config.model_id,
            cache: ExperimentCache::new(config.cache_size),
        })
    }

    /// Root URL of the tracking server.
    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -----------------------------------------------------------------------
    // Projects and models
    // -----------------------------------------------------------------------

    /// Creates a project named `name` and returns its id.
    ///
    /// Clears the default model id.
    pub async fn new_project(&mut self, name: &str) -> Result<ProjectId, TrackingError> {
        let params = QueryParams::new().with("project[name]", name);
        let id = self.create(paths::CREATE_PROJECT, &params).await?;
        self.default_model = None;

        let id = ProjectId::new(id);
        info!(project_id = %id, name, "Created project");
        Ok(id)
    }

    /// Creates a model named `name` under `project_id` and returns its id.
    ///
    /// `description` is stored as the model's comment. Clears the default
    /// model id; call [`Self::set_model`] with the returned id to log against
    /// the new model by default.
    pub async fn new_model(
        &mut self,
        name: &str,
        project_id: ProjectId,
        description: Option<&str>,
    ) -> Result<ModelId, TrackingError> {
        let mut params = QueryParams::new()
            .with("model[name]", name)
            .with("model[project_id]", project_id.to_string());
        if let Some(description) = description {
            params.push("model[comment]", description);
        }

        let id = self.create(paths::CREATE_MODEL, &params).await?;
        self.default_model = None;

        let id = ModelId::new(id);
        info!(model_id = %id, %project_id, name, "Created model");
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Default model
    // -----------------------------------------------------------------------

    /// Sets the model id used when a logging call omits one.
    pub fn set_model(&mut self, model_id: ModelId) {
        debug!(%model_id, "Default model set");
        self.default_model = Some(model_id);
    }

    /// Clears the default model id.
    pub fn reset_model(&mut self) {
        self.default_model = None;
    }

    /// The current default model id.
    pub fn model(&self) -> Option<ModelId> {
        self.default_model
    }

    // -----------------------------------------------------------------------
    // Experiments
    // -----------------------------------------------------------------------

    /// Logs one experiment immediately and returns the id the server
    /// assigned to it.
    ///
    /// An explicit `model_id` applies to this call only; the default is left
    /// untouched.
    pub async fn log(
        &self,
        parameters: Fields,
        scores: Fields,
        model_id: Option<ModelId>,
    ) -> Result<ExperimentId, TrackingError> {
        let model_id = self.resolve_model(model_id)?;

        let params = QueryParams::new()
            .with("experiment[model_id]", model_id.to_string())
            .with("experiment[parameters]", serde_json::to_string(&parameters)?)
            .with("experiment[scores]", serde_json::to_string(&scores)?);

        let id = ExperimentId::new(self.create(paths::CREATE_EXPERIMENT, &params).await?);
        debug!(experiment_id = %id, %model_id, "Logged experiment");
        Ok(id)
    }

    /// Queues one experiment for a later batch request.
    ///
    /// When the queue reaches `cache_size`, the whole queue is flushed before
    /// returning and the batch receipt is returned. If that flush fails the
    /// error is returned and the record stays queued.
    pub async fn deferred_log(
        &mut self,
        parameters: Fields,
        scores: Fields,
        model_id: Option<ModelId>,
    ) -> Result<Option<BatchReceipt>, TrackingError> {
        let model_id = self.resolve_model(model_id)?;
        self.cache
            .push(ExperimentRecord::new(model_id, parameters, scores));
        debug!(
            %model_id,
            pending = self.cache.len(),
            capacity = self.cache.capacity(),
            "Queued experiment"
        );

        if !self.cache.is_full() {
            return Ok(None);
        }

        match self.send_cache().await? {
            FlushOutcome::Flushed(receipt) => Ok(Some(receipt)),
            FlushOutcome::Empty => Ok(None),
        }
    }

    /// Sends every queued experiment in one batch request.
    ///
    /// Returns [`FlushOutcome::Empty`] without contacting the server when
    /// nothing is queued.
    pub async fn send_cache(&mut self) -> Result<FlushOutcome, TrackingError> {
        if self.cache.is_empty() {
            return Ok(FlushOutcome::Empty);
        }

        let count = self.cache.len();
        let params = QueryParams::new().with(
            "experiments",
            serde_json::to_string(self.cache.entries())?,
        );

        let response = match self.post_checked(paths::CREATE_EXPERIMENTS, &params).await {
            Ok(response) => response,
            Err(err) => {
                warn!(pending = count, error = %err, "Batch flush failed; experiments kept in cache");
                return Err(err);
            }
        };

        self.cache.clear();
        info!(count, "Flushed experiment cache");
        Ok(FlushOutcome::Flushed(BatchReceipt { count, response }))
    }

    /// Experiments queued by [`Self::deferred_log`] and not yet sent.
    pub fn pending(&self) -> &[ExperimentRecord] {
        self.cache.entries()
    }

    /// Number of queued experiments.
    pub fn pending_len(&self) -> usize {
        self.cache.len()
    }

    /// Flush threshold.
    pub fn cache_size(&self) -> usize {
        self.cache.capacity()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn resolve_model(&self, model_id: Option<ModelId>) -> Result<ModelId, TrackingError> {
        model_id
            .or(self.default_model)
            .ok_or(TrackingError::MissingModelId)
    }

    /// Posts to `path` and fails unless the server reports success.
    async fn post_checked(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<ApiResponse, TrackingError> {
        debug!(path, params = params.len(), "Posting to tracking server");
        let response = self.transport.post(path, params).await?;

        if !response.success() {
            warn!(path, %response, "Tracking server rejected request");
            return Err(TrackingError::Rejected {
                path: path.to_string(),
                response,
            });
        }
        Ok(response)
    }

    /// Posts to a creation endpoint and extracts the new entity's id.
    async fn create(&self, path: &str, params: &QueryParams) -> Result<u64, TrackingError> {
        let response = self.post_checked(path, params).await?;
        response.id().ok_or_else(|| TrackingError::InvalidResponse {
            path: path.to_string(),
            message: format!("missing or non-integer 'id' in {response}"),
        })
    }
}
