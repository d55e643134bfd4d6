//! Flow view
//!
//! Read-only projection of the booking step for screens that only care
//! which page is active. It has no setters; the step moves through
//! [`BookingWorkflow`] commands only.

use crate::workflow::BookingWorkflow;
use serde::Serialize;
use shared::models::BookingStep;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowView {
    pub step: BookingStep,
    pub current_table_route: Option<String>,
}

impl FlowView {
    pub fn of(workflow: &BookingWorkflow) -> Self {
        Self {
            step: workflow.step(),
            current_table_route: workflow.current_table_route().map(str::to_string),
        }
    }

    /// Position of the step, for progress indicators
    pub fn step_index(&self) -> usize {
        self.step.index()
    }

    pub fn is_at(&self, step: BookingStep) -> bool {
        self.step == step
    }

    /// Whether `step` is already behind the current one
    pub fn is_completed(&self, step: BookingStep) -> bool {
        step < self.step
    }
}

impl From<&BookingWorkflow> for FlowView {
    fn from(workflow: &BookingWorkflow) -> Self {
        Self::of(workflow)
    }
}
