use std::sync::Arc;

use crate::classifier::{ClassificationService, ClientError};
use crate::config::SessionSettings;

use super::jobs::{JobKind, SessionJobs};
use super::state::{ConnectionStatus, SessionState, ViewMode};

const EMPTY_COMMENT_MESSAGE: &str = "Please enter a comment first";
const NOT_CONNECTED_MESSAGE: &str = "Not connected to the classification service";

/// What happened to a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A predict request was sent.
    Started,
    /// Rejected locally; the reason is in [`SessionState::error`].
    Rejected,
    /// A prediction is already on the wire; nothing changed.
    AlreadyPending,
}

/// Owns the session state and drives the classification service.
///
/// Operations return immediately. Service calls finish on worker threads and
/// take effect when the owner calls [`SessionController::poll_jobs`].
pub struct SessionController {
    pub(super) state: SessionState,
    pub(super) jobs: SessionJobs,
    settings: SessionSettings,
}

impl SessionController {
    pub fn new(service: Arc<dyn ClassificationService>, settings: SessionSettings) -> Self {
        Self {
            state: SessionState::default(),
            jobs: SessionJobs::new(service),
            settings,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// True while any service call has not been received back yet.
    pub fn is_busy(&self) -> bool {
        self.jobs.outstanding() > 0
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.state.draft = text.into();
    }

    pub fn draft(&self) -> &str {
        &self.state.draft
    }

    /// Replace the draft with `text` and submit it.
    pub fn submit(&mut self, text: impl Into<String>) -> SubmitOutcome {
        if self.state.predict_pending {
            return SubmitOutcome::AlreadyPending;
        }
        self.set_draft(text);
        self.submit_draft()
    }

    /// Submit the current draft for classification.
    pub fn submit_draft(&mut self) -> SubmitOutcome {
        if self.state.predict_pending {
            tracing::debug!("Submission ignored; a prediction is already pending");
            return SubmitOutcome::AlreadyPending;
        }
        let text = self.state.draft.trim().to_string();
        if let Err(err) = self.validate_comment(&text) {
            return self.reject(err);
        }
        if self.state.connection != ConnectionStatus::Connected {
            return self.reject(ClientError::Connection(NOT_CONNECTED_MESSAGE.to_string()));
        }

        self.state.error = None;
        self.state.prediction = None;
        self.jobs.begin_predict(text);
        self.state.predict_pending = true;
        tracing::info!("Prediction submitted");
        SubmitOutcome::Started
    }

    fn validate_comment(&self, text: &str) -> Result<(), ClientError> {
        if text.is_empty() {
            return Err(ClientError::Validation(EMPTY_COMMENT_MESSAGE.to_string()));
        }
        let max = self.settings.max_comment_chars;
        if text.chars().count() > max {
            return Err(ClientError::Validation(format!(
                "Comment must be at most {max} characters"
            )));
        }
        Ok(())
    }

    fn reject(&mut self, err: ClientError) -> SubmitOutcome {
        tracing::debug!("Submission rejected: {err}");
        self.state.error = Some(err);
        SubmitOutcome::Rejected
    }

    /// Clear draft, result and error. A prediction still on the wire is
    /// discarded when it lands and keeps blocking new submissions until then.
    pub fn reset(&mut self) {
        self.state.draft.clear();
        self.state.prediction = None;
        self.state.error = None;
        self.jobs.invalidate(JobKind::Predict);
    }

    /// Ask the service for its health and model status.
    pub fn check_health(&mut self) {
        self.jobs.begin_health_check();
    }

    /// Change view; history and stats views reload their data.
    pub fn switch_view(&mut self, mode: ViewMode) {
        self.state.view = mode;
        self.refresh_view();
    }

    /// Reload whatever the current view shows. The analyze view has nothing to load.
    pub fn refresh_view(&mut self) {
        match self.state.view {
            ViewMode::Analyze => {}
            ViewMode::History => self.refresh_history(),
            ViewMode::Stats => self.refresh_stats(),
        }
    }

    /// Re-fetch history; a fetch already in flight is superseded.
    pub fn refresh_history(&mut self) {
        self.state.history_loading = true;
        self.jobs.begin_history_load();
    }

    pub fn refresh_stats(&mut self) {
        self.state.stats_loading = true;
        self.jobs.begin_stats_load();
    }

    /// Delete one history entry. The cache changes only once the service confirms.
    pub fn delete_entry(&mut self, id: u64) {
        self.jobs.begin_delete(id);
    }

    /// Delete the whole history on the service.
    pub fn clear_all(&mut self) {
        self.jobs.begin_clear();
    }

    /// Fetch the service's diagnostic snapshot.
    pub fn refresh_debug_info(&mut self) {
        self.jobs.begin_debug_load();
    }
}
