//! Composition trace models.
//!
//! Every family run records one step per breakdown spec, join, suppression
//! pass and assembly, along with any warnings raised on the way.

use serde::{Deserialize, Serialize};

/// A single step in the composition trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The name of the spec or stage that ran.
    pub breakdown: String,
    /// The breakdown type label, or the stage name for non-aggregating steps.
    pub breakdown_type: String,
    /// The record filter or rule applied.
    pub condition: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the step.
    pub reasoning: String,
}

/// A warning raised during composition.
///
/// Warnings never stop a run; they flag data the operator should review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl CompositionWarning {
    /// Creates a warning.
    pub fn new(code: &str, message: impl Into<String>, severity: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: severity.to_string(),
        }
    }
}

/// The complete trace of a family run.
///
/// # Example
///
/// ```
/// use absence_rates::models::CompositionTrace;
///
/// let trace = CompositionTrace::default();
/// assert_eq!(trace.next_step(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionTrace {
    /// The sequence of steps.
    pub steps: Vec<CompositionStep>,
    /// Any warnings raised.
    pub warnings: Vec<CompositionWarning>,
    /// The total duration in microseconds.
    pub duration_us: u64,
}

impl CompositionTrace {
    /// The number the next recorded step should carry.
    pub fn next_step(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Appends another trace, renumbering its steps to follow this one.
    pub fn extend(&mut self, other: CompositionTrace) {
        let offset = self.steps.len() as u32;
        self.steps.extend(other.steps.into_iter().map(|mut step| {
            step.step_number += offset;
            step
        }));
        self.warnings.extend(other.warnings);
        self.duration_us += other.duration_us;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_step(step_number: u32, breakdown: &str) -> CompositionStep {
        CompositionStep {
            step_number,
            breakdown: breakdown.to_string(),
            breakdown_type: "REGION".to_string(),
            condition: "all records".to_string(),
            input: serde_json::json!({}),
            output: serde_json::json!({}),
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_extend_renumbers_steps() {
        let mut first = CompositionTrace {
            steps: vec![create_test_step(1, "a"), create_test_step(2, "b")],
            warnings: vec![],
            duration_us: 10,
        };
        let second = CompositionTrace {
            steps: vec![create_test_step(1, "c")],
            warnings: vec![CompositionWarning::new("NULL_GROUP_KEY", "dropped", "low")],
            duration_us: 5,
        };

        first.extend(second);

        assert_eq!(first.steps.len(), 3);
        assert_eq!(first.steps[2].step_number, 3);
        assert_eq!(first.steps[2].breakdown, "c");
        assert_eq!(first.warnings.len(), 1);
        assert_eq!(first.duration_us, 15);
        assert_eq!(first.next_step(), 4);
    }
}
