use serde::{Deserialize, Serialize};

const CONDITIONAL_MIN_DOCUMENTS: usize = 5;
const CONDITIONAL_MIN_COMPLETED_TASKS: usize = 3;
const CLOSING_MIN_DOCUMENTS: usize = 10;
const CLOSING_MIN_COMPLETED_TASKS: usize = 7;

/// Coarse processing stage the assistant talks about. Derived on every call,
/// never stored, so deleting documents can move a loan back a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStage {
    InitialSubmission,
    ConditionalApproval,
    Closing,
}

impl ProcessStage {
    pub fn infer(document_count: usize, completed_tasks: usize) -> Self {
        if document_count >= CLOSING_MIN_DOCUMENTS && completed_tasks >= CLOSING_MIN_COMPLETED_TASKS
        {
            ProcessStage::Closing
        } else if document_count >= CONDITIONAL_MIN_DOCUMENTS
            && completed_tasks >= CONDITIONAL_MIN_COMPLETED_TASKS
        {
            ProcessStage::ConditionalApproval
        } else {
            ProcessStage::InitialSubmission
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            ProcessStage::InitialSubmission => "initial_submission",
            ProcessStage::ConditionalApproval => "conditional_approval",
            ProcessStage::Closing => "closing",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ProcessStage::InitialSubmission => "Initial Submission",
            ProcessStage::ConditionalApproval => "Conditional Approval",
            ProcessStage::Closing => "Closing",
        }
    }
}
