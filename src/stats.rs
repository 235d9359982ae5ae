//! Distribution summaries over the prediction history.
//!
//! [`aggregate`] is a pure function of its input. Count maps remember the
//! order labels were first seen; that order only breaks ties in [`LabelCounts::ranked`].

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::HistoryEntry;

/// One label and how often it occurred.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
}

/// Count map keyed by label, in first-seen order.
///
/// Equality compares counts only; two maps built from the same entries in a
/// different order are equal.
#[derive(Clone, Debug, Default)]
pub struct LabelCounts {
    entries: Vec<LabelCount>,
}

impl LabelCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `label`, creating it at zero first if new.
    pub fn increment(&mut self, label: &str) {
        self.add(label, 1);
    }

    /// Counts come from the service too, so sums saturate instead of overflowing.
    pub fn add(&mut self, label: &str, count: u64) {
        match self.entries.iter_mut().find(|entry| entry.label == label) {
            Some(entry) => entry.count = entry.count.saturating_add(count),
            None => self.entries.push(LabelCount {
                label: label.to_string(),
                count,
            }),
        }
    }

    /// Count for `label`; zero when never seen.
    pub fn get(&self, label: &str) -> u64 {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map_or(0, |entry| entry.count)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |total, entry| total.saturating_add(entry.count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels and counts in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries
            .iter()
            .map(|entry| (entry.label.as_str(), entry.count))
    }

    /// Counts sorted descending; ties keep first-seen order.
    pub fn ranked(&self) -> Vec<LabelCount> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    /// Most frequent label; the first seen wins a tie.
    pub fn top(&self) -> Option<LabelCount> {
        self.ranked().into_iter().next()
    }

    pub fn to_map(&self) -> BTreeMap<String, u64> {
        self.iter()
            .map(|(label, count)| (label.to_string(), count))
            .collect()
    }
}

impl PartialEq for LabelCounts {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(label, count)| other.get(label) == count)
    }
}

impl Eq for LabelCounts {}

impl Serialize for LabelCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (label, count) in self.iter() {
            map.serialize_entry(label, &count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LabelCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountsVisitor;

        impl<'de> Visitor<'de> for CountsVisitor {
            type Value = LabelCounts;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of label to count")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(LabelCounts::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut counts = LabelCounts::new();
                while let Some((label, count)) = access.next_entry::<String, u64>()? {
                    counts.add(&label, count);
                }
                Ok(counts)
            }
        }

        deserializer.deserialize_any(CountsVisitor)
    }
}

/// The single "most frequent label" rule shared by every axis.
pub fn top_label(counts: &LabelCounts) -> Option<LabelCount> {
    counts.top()
}

/// Aggregate counts per axis over a history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total_predictions: u64,
    pub emotion_counts: LabelCounts,
    pub sentiment_counts: LabelCounts,
    pub like_count_counts: LabelCounts,
}

impl StatsSummary {
    /// The "no data" summary: zero total and empty maps.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.total_predictions == 0
    }

    /// Percentage of all predictions that `count` represents.
    pub fn share(&self, count: u64) -> f64 {
        if self.total_predictions == 0 {
            return 0.0;
        }
        count as f64 * 100.0 / self.total_predictions as f64
    }
}

/// Count every entry's emotion, sentiment and like-count label.
pub fn aggregate(history: &[HistoryEntry]) -> StatsSummary {
    let mut summary = StatsSummary::empty();
    for entry in history {
        summary.emotion_counts.increment(entry.emotion.as_str());
        summary.sentiment_counts.increment(entry.sentiment.as_str());
        summary.like_count_counts.increment(entry.like_count.as_str());
    }
    summary.total_predictions = history.len() as u64;
    summary
}
