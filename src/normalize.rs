//! Maps raw service labels onto the canonical label sets.
//!
//! Missing, null, non-string and unrecognized values become `unknown`. The
//! `error` and `model_not_loaded` sentinels pass through so a degraded service
//! stays visible to the caller.

use serde_json::Value;

use crate::classifier::RawPrediction;
use crate::labels::{Label, LabelSet, SENTINEL_ERROR, SENTINEL_MODEL_NOT_LOADED};
use crate::model::PredictionResult;

/// Normalize a raw predict response into a [`PredictionResult`].
pub fn normalize(raw: &RawPrediction) -> PredictionResult {
    let result = PredictionResult {
        emotion: normalize_label(raw.emotion.as_ref()),
        sentiment: normalize_label(raw.sentiment.as_ref()),
        like_count: normalize_label(raw.like_count.as_ref()),
        history_id: raw.history_id,
    };
    if result.is_degraded() {
        tracing::warn!(
            emotion = %result.emotion,
            sentiment = %result.sentiment,
            like_count = %result.like_count,
            "Prediction contains degraded labels"
        );
    }
    result
}

/// Normalize one label field of arbitrary JSON shape.
pub fn normalize_label<T: LabelSet>(value: Option<&Value>) -> Label<T> {
    match value {
        Some(Value::String(text)) => parse_label(text),
        Some(Value::Null) | None => Label::Unknown,
        Some(other) => {
            tracing::debug!(axis = T::AXIS, value = %other, "Non-string label coerced to unknown");
            Label::Unknown
        }
    }
}

/// Parse label text: trimmed and case-folded, sentinels before known labels.
pub fn parse_label<T: LabelSet>(text: &str) -> Label<T> {
    let folded = text.trim().to_ascii_lowercase();
    match folded.as_str() {
        SENTINEL_ERROR => Label::Error,
        SENTINEL_MODEL_NOT_LOADED => Label::ModelNotLoaded,
        _ => match T::from_folded(&folded) {
            Some(label) => Label::Known(label),
            None => {
                if !folded.is_empty() && folded != crate::labels::SENTINEL_UNKNOWN {
                    tracing::debug!(axis = T::AXIS, raw = text, "Unrecognized label coerced to unknown");
                }
                Label::Unknown
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{Emotion, LikeCountBucket, Sentiment};
    use serde_json::json;

    fn raw(value: Value) -> RawPrediction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn canonical_labels_pass_unchanged() {
        let result = normalize(&raw(json!({
            "emotion": "joy",
            "sentiment": "positive",
            "like_count": "high",
            "history_id": 7
        })));
        assert_eq!(result.emotion, Label::Known(Emotion::Joy));
        assert_eq!(result.sentiment, Label::Known(Sentiment::Positive));
        assert_eq!(result.like_count, Label::Known(LikeCountBucket::High));
        assert_eq!(result.history_id, Some(7));
        assert!(!result.is_degraded());
    }

    #[test]
    fn each_missing_field_becomes_unknown_alone() {
        let full = json!({"emotion": "anger", "sentiment": "negative", "like_count": "viral"});
        for missing in ["emotion", "sentiment", "like_count"] {
            let mut value = full.clone();
            value.as_object_mut().unwrap().remove(missing);
            let result = normalize(&raw(value));

            let expect = |field: &str, canonical: &'static str, actual: &'static str| {
                if field == missing {
                    assert_eq!(actual, "unknown", "{field} should be unknown");
                } else {
                    assert_eq!(actual, canonical, "{field} should be untouched");
                }
            };
            expect("emotion", "anger", result.emotion.as_str());
            expect("sentiment", "negative", result.sentiment.as_str());
            expect("like_count", "viral", result.like_count.as_str());
        }
    }

    #[test]
    fn labels_are_case_folded() {
        let result = normalize(&raw(json!({
            "emotion": "  Surprise ",
            "sentiment": "NEUTRAL",
            "like_count": "Medium"
        })));
        assert_eq!(result.emotion, Label::Known(Emotion::Surprise));
        assert_eq!(result.sentiment, Label::Known(Sentiment::Neutral));
        assert_eq!(result.like_count, Label::Known(LikeCountBucket::Medium));
    }

    #[test]
    fn sentinels_survive_normalization() {
        let result = normalize(&raw(json!({
            "emotion": "error",
            "sentiment": "model_not_loaded",
            "like_count": "Model_Not_Loaded"
        })));
        assert_eq!(result.emotion, Label::Error);
        assert_eq!(result.sentiment, Label::ModelNotLoaded);
        assert_eq!(result.like_count, Label::ModelNotLoaded);
        assert!(result.is_degraded());
    }

    #[test]
    fn malformed_values_become_unknown() {
        let result = normalize(&raw(json!({
            "emotion": "ecstatic",
            "sentiment": null,
            "like_count": 3
        })));
        assert_eq!(result.emotion, Label::Unknown);
        assert_eq!(result.sentiment, Label::Unknown);
        assert_eq!(result.like_count, Label::Unknown);
    }

    #[test]
    fn labels_do_not_leak_across_axes() {
        assert_eq!(parse_label::<Sentiment>("joy"), Label::Unknown);
        assert_eq!(parse_label::<LikeCountBucket>("positive"), Label::Unknown);
        assert_eq!(parse_label::<Emotion>("neutral"), Label::Known(Emotion::Neutral));
    }
}
