//! Loan file processing: funder checklists, document assignment, contacts,
//! tasks, email drafting and the chat assistant, behind one service and router.

pub mod assistant;
pub mod checklist;
pub mod domain;
pub mod email;
pub(crate) mod intake;
pub mod repository;
pub mod requirements;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use assistant::{
    AssistantError, AssistantReply, ChatResponder, FallbackAssistant, Intent, IntentClassifier,
    KnowledgeBase, LoanContext, ProcessStage,
};
pub use checklist::{ChecklistError, ChecklistView};
pub use domain::{
    Contact, ContactDraft, ContactId, ContactRole, Document, DocumentId, DocumentUpload, Loan,
    LoanFile, LoanId, LoanIntake, LoanPurpose, LoanStatus, LoanType, LoanUpdate, Message,
    MessageRole, Task, TaskDraft, TaskId, TaskPriority,
};
pub use email::{generate_email_template, render, EmailTemplate, TemplateContext};
pub use intake::IntakeViolation;
pub use repository::{LoanRepository, RepositoryError};
pub use requirements::{
    CatalogError, Requirement, RequirementCatalog, RequirementCategory, RequirementResolver,
};
pub use router::loan_router;
pub use service::{LoanFileService, LoanServiceError};
pub use views::{ChatExchange, DocumentReceipt, EmailDraftView, LoanDetailView, LoanSummaryView};
