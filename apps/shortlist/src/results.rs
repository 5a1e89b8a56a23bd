#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// A course the service suggests for a missing skill. When no direct link is
/// available the service substitutes topic suggestions instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecommendation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics_to_cover: Option<Vec<String>>,
}

/// Per-CV feedback facets. Facets the user did not select are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_percentage: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub similarities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub course_recommendations: Vec<CourseRecommendation>,
}

/// One per-CV outcome as the service reports it: feedback on success, an error
/// message when that CV could not be analyzed. A failed CV never fails the
/// batch — it is stored and rendered inline. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisRecord {
    /// The match percentage, or 0 for failed or percentage-less records.
    pub fn score(&self) -> f32 {
        self.feedback
            .as_ref()
            .and_then(|f| f.match_percentage)
            .unwrap_or(0.0)
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some() || self.feedback.is_none()
    }
}

/// Aggregated outcomes of the latest fully-successful submission, keyed by CV
/// name. Replaced wholesale by the submitter, never partially mutated.
/// Iteration order is submission order.
#[derive(Debug, Default)]
pub struct ResultStore {
    records: Vec<AnalysisRecord>,
}

impl ResultStore {
    pub fn from_records(records: Vec<AnalysisRecord>) -> Self {
        Self { records }
    }

    pub fn replace(&mut self, records: Vec<AnalysisRecord>) {
        self.records = records;
    }

    pub fn get(&self, name: &str) -> Option<&AnalysisRecord> {
        self.records.iter().find(|r| r.filename == name)
    }

    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
