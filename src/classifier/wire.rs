//! JSON shapes exchanged with the classification service and their parsers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::labels::{Emotion, Label, LikeCountBucket, Sentiment};
use crate::model::{
    DebugInfo, HistoryEntry, LikeCountSubmodels, ModelHealth, ServiceHealth, parse_timestamp,
};
use crate::stats::{LabelCounts, StatsSummary};

use super::ClientError;

const HEALTHY_STATUS: &str = "healthy";

#[derive(Clone, Debug, Serialize)]
pub(super) struct PredictRequest<'a> {
    pub text: &'a str,
}

/// Predict response before normalization. Label fields keep whatever JSON the
/// service sent.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawPrediction {
    pub emotion: Option<Value>,
    pub sentiment: Option<Value>,
    pub like_count: Option<Value>,
    #[serde(deserialize_with = "lenient_id")]
    pub history_id: Option<u64>,
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => number.as_u64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorWire {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HealthWire {
    status: Option<String>,
    message: Option<String>,
    models: ModelsWire,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModelsWire {
    emotion_model: ModelStatusWire,
    sentiment_model: ModelStatusWire,
    like_count_model: ModelStatusWire,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModelStatusWire {
    loaded: bool,
    bert_loaded: Option<bool>,
    xgboost_loaded: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HistoryWire {
    history: Option<Vec<HistoryEntryWire>>,
}

#[derive(Debug, Deserialize)]
struct HistoryEntryWire {
    id: u64,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    full_comment: Option<String>,
    #[serde(default)]
    emotion: Label<Emotion>,
    #[serde(default)]
    sentiment: Label<Sentiment>,
    #[serde(default)]
    like_count: Label<LikeCountBucket>,
}

impl From<HistoryEntryWire> for HistoryEntry {
    fn from(wire: HistoryEntryWire) -> Self {
        let comment_text = wire
            .full_comment
            .clone()
            .or_else(|| wire.comment.clone())
            .unwrap_or_default();
        let comment_preview = wire.comment.unwrap_or_else(|| comment_text.clone());
        Self {
            id: wire.id,
            timestamp: wire.timestamp.as_deref().and_then(parse_timestamp),
            comment_text,
            comment_preview,
            emotion: wire.emotion,
            sentiment: wire.sentiment,
            like_count: wire.like_count,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatsEnvelopeWire {
    stats: Option<StatsWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatsWire {
    total_predictions: Option<u64>,
    emotion_stats: LabelCounts,
    sentiment_stats: LabelCounts,
    like_count_stats: LabelCounts,
}

impl From<StatsWire> for StatsSummary {
    fn from(wire: StatsWire) -> Self {
        let total_predictions = wire
            .total_predictions
            .unwrap_or_else(|| wire.emotion_stats.total());
        Self {
            total_predictions,
            emotion_counts: wire.emotion_stats,
            sentiment_counts: wire.sentiment_stats,
            like_count_counts: wire.like_count_stats,
        }
    }
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ClientError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Transport("Empty response body".to_string()));
    }
    serde_json::from_str(trimmed)
        .map_err(|err| ClientError::Transport(format!("Invalid response JSON: {err}")))
}

/// Error text the service put in a body, if any.
pub(super) fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorWire = serde_json::from_str(body.trim()).ok()?;
    parsed
        .error
        .or(parsed.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}

pub(super) fn parse_health(body: &str) -> Result<ServiceHealth, ClientError> {
    let wire: HealthWire = decode(body)?;
    let like_count = &wire.models.like_count_model;
    let like_count_submodels = match (like_count.bert_loaded, like_count.xgboost_loaded) {
        (Some(bert_loaded), Some(xgboost_loaded)) => Some(LikeCountSubmodels {
            bert_loaded,
            xgboost_loaded,
        }),
        _ => None,
    };
    Ok(ServiceHealth {
        healthy: wire.status.as_deref() == Some(HEALTHY_STATUS),
        message: wire.message,
        models: ModelHealth {
            emotion_loaded: wire.models.emotion_model.loaded,
            sentiment_loaded: wire.models.sentiment_model.loaded,
            like_count_loaded: like_count.loaded,
            like_count_submodels,
        },
    })
}

/// Parse a 2xx predict body. A body carrying `error` is a failed prediction.
pub(super) fn parse_prediction(body: &str) -> Result<RawPrediction, ClientError> {
    let value: Value = decode(body)?;
    if let Some(message) = value
        .get("error")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
    {
        return Err(ClientError::Prediction(message.to_string()));
    }
    if !value.is_object() {
        return Err(ClientError::Transport(
            "Predict response is not a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|err| ClientError::Transport(format!("Invalid predict response: {err}")))
}

/// Map a non-2xx predict reply to a prediction error.
pub(super) fn prediction_failure(code: u16, body: &str) -> ClientError {
    ClientError::Prediction(
        error_message(body).unwrap_or_else(|| format!("HTTP error! status: {code}")),
    )
}

/// Map a non-2xx reply from any other endpoint to a transport error.
pub(super) fn status_failure(code: u16, body: &str) -> ClientError {
    let detail = error_message(body).unwrap_or_else(|| body.trim().to_string());
    if detail.is_empty() {
        ClientError::Transport(format!("HTTP {code}"))
    } else {
        ClientError::Transport(format!("HTTP {code}: {detail}"))
    }
}

pub(super) fn parse_history(body: &str) -> Result<Vec<HistoryEntry>, ClientError> {
    let wire: HistoryWire = decode(body)?;
    Ok(wire
        .history
        .unwrap_or_default()
        .into_iter()
        .map(HistoryEntry::from)
        .collect())
}

pub(super) fn parse_stats(body: &str) -> Result<Option<StatsSummary>, ClientError> {
    let wire: StatsEnvelopeWire = decode(body)?;
    Ok(wire.stats.map(StatsSummary::from))
}

pub(super) fn parse_debug(body: &str) -> Result<DebugInfo, ClientError> {
    decode(body)
}
