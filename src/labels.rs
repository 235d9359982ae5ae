//! Canonical label sets produced by the classification service.
//!
//! Every axis (emotion, sentiment, like-count bucket) has a closed set of known
//! labels. [`Label`] wraps one of them or a sentinel that signals a degraded
//! classification.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentinel reported when the service failed to classify an axis.
pub const SENTINEL_ERROR: &str = "error";
/// Sentinel reported when the model for an axis is not loaded server-side.
pub const SENTINEL_MODEL_NOT_LOADED: &str = "model_not_loaded";
/// Sentinel for missing or unrecognized values.
pub const SENTINEL_UNKNOWN: &str = "unknown";

/// A closed set of known labels for one classification axis.
pub trait LabelSet: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Axis name used in logs.
    const AXIS: &'static str;
    /// Every known label, in the service's class-index order.
    const ALL: &'static [Self];

    /// Canonical lowercase label text.
    fn as_str(self) -> &'static str;

    /// Match already case-folded text against the known set.
    fn from_folded(folded: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|label| label.as_str() == folded)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Disgust,
    Surprise,
    Neutral,
}

impl LabelSet for Emotion {
    const AXIS: &'static str = "emotion";
    const ALL: &'static [Self] = &[
        Self::Joy,
        Self::Sadness,
        Self::Anger,
        Self::Fear,
        Self::Disgust,
        Self::Surprise,
        Self::Neutral,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Joy => "joy",
            Self::Sadness => "sadness",
            Self::Anger => "anger",
            Self::Fear => "fear",
            Self::Disgust => "disgust",
            Self::Surprise => "surprise",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl LabelSet for Sentiment {
    const AXIS: &'static str = "sentiment";
    const ALL: &'static [Self] = &[Self::Positive, Self::Negative, Self::Neutral];

    fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

/// Predicted popularity bucket for a comment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LikeCountBucket {
    Low,
    Medium,
    High,
    Viral,
}

impl LikeCountBucket {
    /// Inclusive like-count range the bucket stands for; `None` means unbounded.
    pub fn like_range(self) -> (u32, Option<u32>) {
        match self {
            Self::Low => (0, Some(99)),
            Self::Medium => (100, Some(500)),
            Self::High => (501, Some(1500)),
            Self::Viral => (1501, None),
        }
    }

    /// Bucket that a raw like count falls into.
    pub fn for_like_count(likes: u32) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|bucket| match bucket.like_range() {
                (low, Some(high)) => (low..=high).contains(&likes),
                (low, None) => likes >= low,
            })
            .unwrap_or(Self::Viral)
    }
}

impl LabelSet for LikeCountBucket {
    const AXIS: &'static str = "like_count";
    const ALL: &'static [Self] = &[Self::Low, Self::Medium, Self::High, Self::Viral];

    fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Viral => "viral",
        }
    }
}

/// A normalized label for one axis: a known value or a sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Label<T> {
    Known(T),
    /// The service tried and failed to classify this axis.
    Error,
    /// The model for this axis is not loaded on the service.
    ModelNotLoaded,
    #[default]
    Unknown,
}

impl<T: LabelSet> Label<T> {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Known(label) => label.as_str(),
            Self::Error => SENTINEL_ERROR,
            Self::ModelNotLoaded => SENTINEL_MODEL_NOT_LOADED,
            Self::Unknown => SENTINEL_UNKNOWN,
        }
    }

    pub fn known(&self) -> Option<T> {
        match self {
            Self::Known(label) => Some(*label),
            _ => None,
        }
    }

    /// True for `error`, `model_not_loaded` and `unknown`.
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Self::Known(_))
    }
}

impl<T: LabelSet> fmt::Display for Label<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T: LabelSet> Serialize for Label<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Lenient: any JSON value is accepted and coerced by the normalizer.
impl<'de, T: LabelSet> Deserialize<'de> for Label<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(crate::normalize::normalize_label(value.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sets_match_service_class_order() {
        let emotions: Vec<_> = Emotion::ALL.iter().map(|e| e.as_str()).collect();
        assert_eq!(
            emotions,
            ["joy", "sadness", "anger", "fear", "disgust", "surprise", "neutral"]
        );
        let sentiments: Vec<_> = Sentiment::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(sentiments, ["positive", "negative", "neutral"]);
        let buckets: Vec<_> = LikeCountBucket::ALL.iter().map(|b| b.as_str()).collect();
        assert_eq!(buckets, ["low", "medium", "high", "viral"]);
    }

    #[test]
    fn like_count_boundaries_follow_bucket_ranges() {
        assert_eq!(LikeCountBucket::for_like_count(0), LikeCountBucket::Low);
        assert_eq!(LikeCountBucket::for_like_count(99), LikeCountBucket::Low);
        assert_eq!(LikeCountBucket::for_like_count(100), LikeCountBucket::Medium);
        assert_eq!(LikeCountBucket::for_like_count(500), LikeCountBucket::Medium);
        assert_eq!(LikeCountBucket::for_like_count(501), LikeCountBucket::High);
        assert_eq!(LikeCountBucket::for_like_count(1500), LikeCountBucket::High);
        assert_eq!(LikeCountBucket::for_like_count(1501), LikeCountBucket::Viral);
    }

    #[test]
    fn labels_serialize_as_canonical_text() {
        let labels = vec![
            serde_json::to_value(Label::Known(Emotion::Fear)).unwrap(),
            serde_json::to_value(Label::<Sentiment>::ModelNotLoaded).unwrap(),
            serde_json::to_value(Label::<LikeCountBucket>::Unknown).unwrap(),
        ];
        assert_eq!(labels, ["fear", "model_not_loaded", "unknown"]);
    }

    #[test]
    fn sentinels_are_flagged() {
        assert!(!Label::Known(Sentiment::Neutral).is_sentinel());
        assert!(Label::<Sentiment>::Error.is_sentinel());
        assert_eq!(Label::Known(LikeCountBucket::Viral).known(), Some(LikeCountBucket::Viral));
        assert_eq!(Label::<LikeCountBucket>::Error.known(), None);
    }
}
