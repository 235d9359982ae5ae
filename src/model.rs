//! Domain records shared by the client, the session store and the aggregator.

use serde::{Deserialize, Serialize};
use time::{
    OffsetDateTime, PrimitiveDateTime,
    format_description::well_known::{Iso8601, Rfc3339},
};

use crate::labels::{Emotion, Label, LikeCountBucket, Sentiment};

/// Canonical outcome of one prediction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PredictionResult {
    pub emotion: Label<Emotion>,
    pub sentiment: Label<Sentiment>,
    pub like_count: Label<LikeCountBucket>,
    /// Id of the history record the service created, if it reported one.
    pub history_id: Option<u64>,
}

impl PredictionResult {
    /// True when any axis carries a sentinel instead of a real prediction.
    pub fn is_degraded(&self) -> bool {
        self.emotion.is_sentinel() || self.sentiment.is_sentinel() || self.like_count.is_sentinel()
    }
}

/// One past prediction as stored by the remote service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: u64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
    pub comment_text: String,
    /// Service-truncated copy of the comment.
    pub comment_preview: String,
    pub emotion: Label<Emotion>,
    pub sentiment: Label<Sentiment>,
    pub like_count: Label<LikeCountBucket>,
}

/// Parse a service timestamp. Offset-less values are local service time, read as UTC.
pub fn parse_timestamp(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();
    OffsetDateTime::parse(text, &Rfc3339)
        .ok()
        .or_else(|| {
            PrimitiveDateTime::parse(text, &Iso8601::DEFAULT)
                .ok()
                .map(PrimitiveDateTime::assume_utc)
        })
}

/// Which classification models the service has loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ModelHealth {
    pub emotion_loaded: bool,
    pub sentiment_loaded: bool,
    pub like_count_loaded: bool,
    pub like_count_submodels: Option<LikeCountSubmodels>,
}

impl ModelHealth {
    pub fn all_loaded(&self) -> bool {
        self.emotion_loaded && self.sentiment_loaded && self.like_count_loaded
    }
}

/// The like-count pipeline is an embedding model feeding a regressor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LikeCountSubmodels {
    pub bert_loaded: bool,
    pub xgboost_loaded: bool,
}

/// Result of a successful health check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    /// The service reported `status: "healthy"`.
    pub healthy: bool,
    pub message: Option<String>,
    pub models: ModelHealth,
}

/// Diagnostic snapshot from the service's debug endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugInfo {
    pub emotion_model_loaded: bool,
    pub sentiment_model_loaded: bool,
    pub embedding_model_loaded: bool,
    pub xgboost_model_loaded: bool,
    pub xgboost_path_exists: bool,
    pub like_count_path_exists: bool,
    pub xgboost_path: Option<String>,
    pub like_count_path: Option<String>,
    pub files_in_like_count_dir: Option<Vec<String>>,
    pub xgboost_type: Option<String>,
}
