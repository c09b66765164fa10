use chrono::NaiveDate;
use serde::Serialize;

use super::assistant::{Intent, ProcessStage};
use super::domain::{
    Contact, ContactId, Document, DocumentId, Loan, LoanFile, LoanId, Message, Task,
};
use super::requirements::Requirement;

/// Dashboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanSummaryView {
    pub id: LoanId,
    pub borrower_name: String,
    pub property_address: String,
    pub funder: String,
    pub status: &'static str,
    pub percent_complete: u8,
    pub open_tasks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_close_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanDetailView {
    pub loan: Loan,
    pub percent_complete: u8,
    pub stage: ProcessStage,
    pub contacts: Vec<Contact>,
    pub documents: Vec<Document>,
    pub tasks: Vec<Task>,
}

impl LoanFile {
    pub fn summary(&self, resolved: &[Requirement]) -> LoanSummaryView {
        LoanSummaryView {
            id: self.loan.id.clone(),
            borrower_name: self.loan.borrower_name.clone(),
            property_address: self.loan.property_address.clone(),
            funder: self.loan.funder.clone(),
            status: self.loan.status.label(),
            percent_complete: self.loan.percent_complete(resolved),
            open_tasks: self.tasks.iter().filter(|task| !task.completed).count(),
            target_close_date: self.loan.target_close_date,
        }
    }

    /// Deleted documents stay out of the detail view; they are only kept for
    /// duplicate detection.
    pub fn detail(&self, resolved: &[Requirement]) -> LoanDetailView {
        LoanDetailView {
            loan: self.loan.clone(),
            percent_complete: self.loan.percent_complete(resolved),
            stage: ProcessStage::infer(self.active_documents().count(), self.completed_task_count()),
            contacts: self.contacts.clone(),
            documents: self.active_documents().cloned().collect(),
            tasks: self.tasks.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReceipt {
    pub document: Document,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<DocumentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailDraftView {
    pub contact_id: ContactId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatExchange {
    pub question: Message,
    pub reply: Message,
    pub intent: Intent,
    pub stage: ProcessStage,
}

