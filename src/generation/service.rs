// Pipeline service - drives one generation end to end
//
// Resolves images from the session store, builds the request, calls the
// client, and persists the outcome through the record-store boundary. A
// vanished or foreign session means "no images available", never a failure.

use super::client::{ChatTransport, GenerationClient};
use super::error::GenerationError;
use super::request::{build_request, GenerationRequest, ModelSelection};
use crate::issue::{compose_issue_context, IssueContext};
use crate::models::{GenerationMode, GenerationRecord, GenerationResult, GenerationStatus};
use crate::session::ImageSessionStore;
use crate::storage::GenerationStore;
use chrono::Utc;
use uuid::Uuid;

pub struct GenerationService<T: ChatTransport> {
    sessions: ImageSessionStore,
    client: GenerationClient<T>,
    models: ModelSelection,
}

impl<T: ChatTransport> GenerationService<T> {
    pub fn new(sessions: ImageSessionStore, client: GenerationClient<T>) -> Self {
        Self {
            sessions,
            client,
            models: ModelSelection::default(),
        }
    }

    /// Substitute configured model identifiers for the built-in defaults
    pub fn with_models(mut self, models: ModelSelection) -> Self {
        self.models = models;
        self
    }

    pub fn sessions(&self) -> &ImageSessionStore {
        &self.sessions
    }

    /// Run the full pipeline for one issue.
    ///
    /// The outcome is always persisted: success writes the content, usage,
    /// cost and a completed status, and consumes the image session; failure
    /// writes a terminal failed status with a human-readable error. The
    /// record id is the returned record's `id`.
    pub async fn generate_for_issue(
        &self,
        records: &dyn GenerationStore,
        issue: &IssueContext,
        mode: GenerationMode,
        session_id: Option<&str>,
        principal: &str,
    ) -> Result<GenerationRecord, GenerationError> {
        // A session counts as consumed only if it resolved for this
        // principal; an unresolved id must never be cleaned up
        let (images, consumed_session) = match session_id {
            Some(sid) => match self.sessions.get_session(sid, Some(principal)) {
                Some(session) => (session.images, Some(sid)),
                None => {
                    // Expired, foreign or never-existed: degrade to text-only
                    log::debug!(
                        "Image session '{}' unavailable for {}; generating without images",
                        sid,
                        issue.key
                    );
                    (Vec::new(), None)
                }
            },
            None => (Vec::new(), None),
        };

        let mut record =
            GenerationRecord::new(Uuid::new_v4().to_string(), issue.key.clone(), mode);
        records
            .create(record.clone())
            .map_err(GenerationError::Storage)?;

        let request = GenerationRequest {
            issue_key: issue.key.clone(),
            text_context: compose_issue_context(issue),
            images,
            mode,
        };

        let outcome = self.run_generation(&request).await;
        record.updated_at = Utc::now();

        match outcome {
            Ok(result) => {
                record.result = Some(result.content.clone());
                record.token_usage = Some(result.token_usage);
                record.cost = Some(result.cost);
                record.status = GenerationStatus::Completed;
                if let Err(e) = records.update(record.clone()) {
                    log::error!("Failed to persist generation {}: {}", record.id, e);
                }
                // The session is consumed only on success; a failed call
                // leaves it alive for a retry until its TTL fires
                if let Some(sid) = consumed_session {
                    self.sessions.cleanup_session(sid).await;
                }
                Ok(record)
            }
            Err(e) => {
                record.status = GenerationStatus::Failed;
                record.error = Some(e.to_string());
                if let Err(persist_err) = records.update(record.clone()) {
                    log::error!(
                        "Failed to persist failure for generation {}: {}",
                        record.id,
                        persist_err
                    );
                }
                Err(e)
            }
        }
    }

    async fn run_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let payload = build_request(request, &self.models).await?;
        self.client.generate(&payload).await
    }
}
