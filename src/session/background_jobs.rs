use crate::classifier::ClientError;
use crate::normalize::normalize;
use crate::stats::StatsSummary;

use super::controller::SessionController;
use super::jobs::{JobKind, JobMessage};
use super::state::{ConnectionStatus, StatsSnapshot, ViewMode};

impl SessionController {
    /// Apply every queued service result; stale ones are dropped.
    ///
    /// Returns how many results changed the state.
    pub fn poll_jobs(&mut self) -> usize {
        let mut applied = 0;
        while let Some(message) = self.jobs.try_recv_message() {
            if self.apply_message(message) {
                applied += 1;
            }
        }
        applied
    }

    fn apply_message(&mut self, message: JobMessage) -> bool {
        match message {
            JobMessage::HealthChecked { generation, result } => {
                if !self.jobs.is_current(JobKind::Health, generation) {
                    return false;
                }
                match result {
                    Ok(health) => {
                        let connection = if health.healthy {
                            ConnectionStatus::Connected
                        } else {
                            ConnectionStatus::Disconnected
                        };
                        if connection != self.state.connection {
                            match connection {
                                ConnectionStatus::Connected => {
                                    tracing::info!("Connected to classification service")
                                }
                                _ => tracing::warn!(
                                    detail = health.message.as_deref().unwrap_or_default(),
                                    "Classification service reachable but not ready"
                                ),
                            }
                        }
                        self.state.connection = connection;
                        self.state.model_health = Some(health.models);
                        self.state.service_health = Some(health);
                    }
                    Err(err) => {
                        tracing::warn!("Health check failed: {err}");
                        self.state.connection = ConnectionStatus::Disconnected;
                    }
                }
            }
            JobMessage::Predicted { generation, result } => {
                self.state.predict_pending = false;
                if !self.jobs.is_current(JobKind::Predict, generation) {
                    tracing::debug!("Discarding superseded prediction response");
                    return false;
                }
                match result {
                    Ok(raw) => {
                        self.state.prediction = Some(normalize(&raw));
                        self.state.error = None;
                        self.refresh_view();
                    }
                    Err(err) => {
                        tracing::warn!("Prediction failed: {err}");
                        self.state.prediction = None;
                        self.state.error = Some(err);
                    }
                }
            }
            JobMessage::HistoryLoaded { generation, result } => {
                if !self.jobs.is_current(JobKind::History, generation) {
                    return false;
                }
                self.state.history_loading = false;
                match result {
                    Ok(history) => self.state.history = history,
                    Err(err) => self.surface_error("History load failed", err),
                }
            }
            JobMessage::StatsLoaded { generation, result } => {
                if !self.jobs.is_current(JobKind::Stats, generation) {
                    return false;
                }
                self.state.stats_loading = false;
                match result {
                    Ok(snapshot) => self.state.stats = Some(snapshot),
                    Err(err) => self.surface_error("Stats load failed", err),
                }
            }
            JobMessage::DebugLoaded { generation, result } => {
                if !self.jobs.is_current(JobKind::Debug, generation) {
                    return false;
                }
                match result {
                    Ok(debug) => self.state.debug = Some(debug),
                    Err(err) => self.surface_error("Debug info load failed", err),
                }
            }
            JobMessage::EntryDeleted { id, result } => match result {
                Ok(()) | Err(ClientError::NotFound(_)) => {
                    self.state.history.retain(|entry| entry.id != id);
                    self.refresh_history();
                    if self.state.view == ViewMode::Stats {
                        self.refresh_stats();
                    }
                }
                Err(err) => self.surface_error("Delete failed", err),
            },
            JobMessage::HistoryCleared { result } => match result {
                Ok(()) => {
                    self.jobs.invalidate(JobKind::History);
                    self.jobs.invalidate(JobKind::Stats);
                    self.state.history.clear();
                    self.state.history_loading = false;
                    self.state.stats = Some(StatsSnapshot::from_service(StatsSummary::empty()));
                    self.state.stats_loading = false;
                    tracing::info!("History cleared");
                }
                Err(err) => self.surface_error("Clear history failed", err),
            },
        }
        true
    }

    fn surface_error(&mut self, context: &str, err: ClientError) {
        tracing::warn!("{context}: {err}");
        self.state.error = Some(err);
    }
}
