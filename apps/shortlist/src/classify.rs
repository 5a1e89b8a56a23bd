//! Cutoff classification — partitions and orders results against a threshold.

use std::cmp::Ordering;

use crate::errors::AppError;
use crate::results::{AnalysisRecord, ResultStore};

/// User-chosen pass threshold, validated to the inclusive range 0–100.
/// The classifier itself assumes a valid value; this constructor is the
/// caller-facing gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutoff(u8);

impl Cutoff {
    pub fn new(value: i64) -> Result<Self, AppError> {
        if !(0..=100).contains(&value) {
            return Err(AppError::Validation(format!(
                "Cutoff must be between 0 and 100, got {value}"
            )));
        }
        Ok(Self(value as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Cutoff {
    fn default() -> Self {
        Self(70)
    }
}

/// One classified row: the record, its effective score, and whether it clears
/// the cutoff. Failed records score 0 and never pass.
#[derive(Debug, Clone)]
pub struct ClassifiedEntry {
    pub filename: String,
    pub record: AnalysisRecord,
    pub score: f32,
    pub passes: bool,
}

/// Returns every result partitioned and ordered: passing entries before
/// failing ones, each partition in descending score order, ties keeping
/// store order.
pub fn classify(results: &ResultStore, cutoff: Cutoff) -> Vec<ClassifiedEntry> {
    let mut entries: Vec<ClassifiedEntry> = results
        .records()
        .iter()
        .map(|record| {
            let score = record.score();
            let passes = !record.is_failure() && score >= f32::from(cutoff.value());
            ClassifiedEntry {
                filename: record.filename.clone(),
                record: record.clone(),
                score,
                passes,
            }
        })
        .collect();

    // Stable sort: ties stay in submission order.
    entries.sort_by(|a, b| {
        b.passes
            .cmp(&a.passes)
            .then(b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
    });

    entries
}
