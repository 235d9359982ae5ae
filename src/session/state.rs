use serde::Serialize;

use crate::classifier::ClientError;
use crate::model::{DebugInfo, HistoryEntry, ModelHealth, PredictionResult, ServiceHealth};
use crate::stats::{StatsSummary, aggregate};

/// Whether the classification service answered the last health check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No health check has completed yet.
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

/// Which view the session is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Analyze,
    History,
    Stats,
}

/// Where the cached stats came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsSource {
    /// Pre-aggregated by the service.
    Service,
    /// Computed locally from history.
    Aggregated,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub summary: StatsSummary,
    pub source: StatsSource,
}

impl StatsSnapshot {
    pub fn from_service(summary: StatsSummary) -> Self {
        Self {
            summary,
            source: StatsSource::Service,
        }
    }

    pub fn aggregated(history: &[HistoryEntry]) -> Self {
        Self {
            summary: aggregate(history),
            source: StatsSource::Aggregated,
        }
    }
}

/// Everything the session knows. Only [`super::SessionController`] mutates it.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SessionState {
    /// Comment text being edited.
    pub draft: String,
    pub connection: ConnectionStatus,
    /// Last health reply, ready or not; kept when a later check cannot reach the service.
    pub service_health: Option<ServiceHealth>,
    pub model_health: Option<ModelHealth>,
    pub prediction: Option<PredictionResult>,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<ClientError>,
    pub view: ViewMode,
    /// Read-through copy of the service's history.
    pub history: Vec<HistoryEntry>,
    pub stats: Option<StatsSnapshot>,
    pub debug: Option<DebugInfo>,
    /// A prediction is on the wire. New submissions are refused until it settles,
    /// including one superseded by [`super::SessionController::reset`].
    pub predict_pending: bool,
    pub history_loading: bool,
    pub stats_loading: bool,
}

impl SessionState {
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn history_entry(&self, id: u64) -> Option<&HistoryEntry> {
        self.history.iter().find(|entry| entry.id == id)
    }
}

fn serialize_error<S: serde::Serializer>(
    error: &Option<ClientError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_some(&error.to_string()),
        None => serializer.serialize_none(),
    }
}
