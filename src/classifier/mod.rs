//! Client for the remote comment classification service.
//!
//! [`ClassificationService`] is the seam the session store talks to;
//! [`HttpClassifier`] implements it over HTTP+JSON.

mod error;
mod wire;

pub mod api;

pub use api::HttpClassifier;
pub use error::{ClientError, ErrorKind};
pub use wire::RawPrediction;

use crate::model::{DebugInfo, HistoryEntry, ServiceHealth};
use crate::stats::StatsSummary;

/// Operations offered by the classification service.
///
/// Calls block; the session store runs them off its own thread. Every failure
/// comes back as a [`ClientError`].
pub trait ClassificationService: Send + Sync {
    /// `GET /health`.
    fn check_health(&self) -> Result<ServiceHealth, ClientError>;

    /// `POST /predict`. Empty text fails with [`ClientError::Validation`]
    /// before any request is sent.
    fn predict(&self, text: &str) -> Result<RawPrediction, ClientError>;

    /// `GET /history`, in the service's order. An empty list is not an error.
    fn fetch_history(&self) -> Result<Vec<HistoryEntry>, ClientError>;

    /// `GET /stats`. `None` when the service has no aggregated stats to offer.
    fn fetch_stats(&self) -> Result<Option<StatsSummary>, ClientError>;

    /// `DELETE /history/{id}`.
    fn delete_history_entry(&self, id: u64) -> Result<(), ClientError>;

    /// `DELETE /history/clear`.
    fn clear_history(&self) -> Result<(), ClientError>;

    /// `GET /debug`.
    fn fetch_debug_info(&self) -> Result<DebugInfo, ClientError>;
}
