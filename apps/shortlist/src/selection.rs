#![allow(dead_code)]

//! Feedback-dimension selection — which analysis facets the service should return.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// One analysis facet the user can request, plus the `All` sentinel covering
/// every facet. Serialized names are the wire identifiers the service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackDimension {
    Percentage,
    Similarities,
    Missing,
    Courses,
    All,
}

impl FeedbackDimension {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "percentage" => Some(Self::Percentage),
            "similarities" => Some(Self::Similarities),
            "missing" => Some(Self::Missing),
            "courses" => Some(Self::Courses),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// At most this many concrete dimensions may be active at once.
pub const MAX_CONCRETE: usize = 3;

/// Bounded set of requested dimensions. Holds up to [`MAX_CONCRETE`] concrete
/// dimensions, or the single `All` sentinel — never both forms mixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSet {
    dimensions: Vec<FeedbackDimension>,
}

impl Default for SelectionSet {
    /// The service returns every facet unless the user narrows the selection.
    fn default() -> Self {
        Self {
            dimensions: vec![FeedbackDimension::All],
        }
    }
}

impl SelectionSet {
    pub fn empty() -> Self {
        Self {
            dimensions: Vec::new(),
        }
    }

    /// Enables or disables one dimension.
    ///
    /// Enabling `All` replaces the whole set; disabling it clears the set.
    /// Toggling a concrete dimension first strips `All`. Enabling a 4th
    /// concrete dimension is rejected with the set unchanged.
    pub fn toggle(&mut self, dimension: FeedbackDimension, enabled: bool) -> Result<(), AppError> {
        if dimension == FeedbackDimension::All {
            self.dimensions.clear();
            if enabled {
                self.dimensions.push(FeedbackDimension::All);
            }
            return Ok(());
        }

        self.dimensions.retain(|d| *d != FeedbackDimension::All);

        if enabled {
            if self.dimensions.contains(&dimension) {
                return Ok(());
            }
            if self.dimensions.len() >= MAX_CONCRETE {
                return Err(AppError::SelectionLimit {
                    limit: MAX_CONCRETE,
                });
            }
            self.dimensions.push(dimension);
        } else {
            self.dimensions.retain(|d| *d != dimension);
        }
        Ok(())
    }

    /// True if the set contains `All` or the literal dimension.
    pub fn is_active(&self, dimension: FeedbackDimension) -> bool {
        self.dimensions.contains(&FeedbackDimension::All) || self.dimensions.contains(&dimension)
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// JSON array of wire identifiers, as the `selectedOptions` form field expects.
    pub fn wire_params(&self) -> String {
        serde_json::to_string(&self.dimensions).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabling_all_replaces_concrete_dimensions() {
        let mut set = SelectionSet::empty();
        set.toggle(FeedbackDimension::Percentage, true).unwrap();
        set.toggle(FeedbackDimension::Missing, true).unwrap();
        set.toggle(FeedbackDimension::All, true).unwrap();

        assert!(set.is_active(FeedbackDimension::All));
        assert_eq!(set.wire_params(), r#"["all"]"#);
    }

    #[test]
    fn test_disabling_all_clears_the_set() {
        let mut set = SelectionSet::default();
        set.toggle(FeedbackDimension::All, false).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_concrete_toggle_strips_all() {
        let mut set = SelectionSet::default();
        set.toggle(FeedbackDimension::Courses, true).unwrap();

        assert!(!set.is_active(FeedbackDimension::All));
        assert!(set.is_active(FeedbackDimension::Courses));
        assert!(!set.is_active(FeedbackDimension::Percentage));
    }

    #[test]
    fn test_fourth_concrete_dimension_is_rejected_unchanged() {
        let mut set = SelectionSet::empty();
        set.toggle(FeedbackDimension::Percentage, true).unwrap();
        set.toggle(FeedbackDimension::Similarities, true).unwrap();
        set.toggle(FeedbackDimension::Missing, true).unwrap();

        let result = set.toggle(FeedbackDimension::Courses, true);
        assert!(matches!(result, Err(AppError::SelectionLimit { limit: 3 })));
        assert!(set.is_active(FeedbackDimension::Percentage));
        assert!(set.is_active(FeedbackDimension::Similarities));
        assert!(set.is_active(FeedbackDimension::Missing));
        assert!(!set.is_active(FeedbackDimension::Courses));
    }

    #[test]
    fn test_re_enabling_a_held_dimension_is_a_no_op() {
        let mut set = SelectionSet::empty();
        set.toggle(FeedbackDimension::Percentage, true).unwrap();
        set.toggle(FeedbackDimension::Percentage, true).unwrap();
        assert_eq!(set.wire_params(), r#"["percentage"]"#);
    }

    #[test]
    fn test_disabling_removes_unconditionally() {
        let mut set = SelectionSet::empty();
        set.toggle(FeedbackDimension::Missing, true).unwrap();
        set.toggle(FeedbackDimension::Missing, false).unwrap();
        set.toggle(FeedbackDimension::Missing, false).unwrap(); // no-op
        assert!(set.is_empty());
    }

    #[test]
    fn test_all_activates_every_dimension() {
        let set = SelectionSet::default();
        assert!(set.is_active(FeedbackDimension::Percentage));
        assert!(set.is_active(FeedbackDimension::Similarities));
        assert!(set.is_active(FeedbackDimension::Missing));
        assert!(set.is_active(FeedbackDimension::Courses));
    }

    #[test]
    fn test_wire_params_lists_identifiers_in_toggle_order() {
        let mut set = SelectionSet::empty();
        set.toggle(FeedbackDimension::Courses, true).unwrap();
        set.toggle(FeedbackDimension::Percentage, true).unwrap();
        assert_eq!(set.wire_params(), r#"["courses","percentage"]"#);
    }

    #[test]
    fn test_from_wire_round_trips_identifiers() {
        for id in ["percentage", "similarities", "missing", "courses", "all"] {
            assert!(FeedbackDimension::from_wire(id).is_some(), "{id}");
        }
        assert!(FeedbackDimension::from_wire("salary").is_none());
    }
}
