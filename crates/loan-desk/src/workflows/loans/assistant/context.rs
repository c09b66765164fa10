use std::collections::BTreeSet;

use super::super::domain::{ContactRole, LoanFile, LoanPurpose, LoanType};
use super::AssistantError;

/// Snapshot of a loan file the assistant reasons over. Only constructible from
/// a file with an id and a borrower, so replies never describe a partial loan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanContext {
    pub loan_id: String,
    pub borrower_name: String,
    pub property_address: String,
    pub funder: String,
    pub loan_type: LoanType,
    pub loan_purpose: LoanPurpose,
    pub loan_amount: Option<u64>,
    pub document_categories: BTreeSet<String>,
    pub document_count: usize,
    pub completed_task_count: usize,
    pub open_tasks: Vec<String>,
    pub contacts: Vec<(String, ContactRole)>,
}

impl LoanContext {
    pub fn from_file(file: &LoanFile) -> Result<Self, AssistantError> {
        let loan = &file.loan;
        if loan.id.as_str().trim().is_empty() {
            return Err(AssistantError::InvalidContext("loan id is blank".to_string()));
        }
        if loan.borrower_name.trim().is_empty() {
            return Err(AssistantError::InvalidContext(format!(
                "loan {} has no borrower name",
                loan.id
            )));
        }

        let document_categories = file
            .active_documents()
            .filter_map(|document| document.category.as_deref())
            .map(|category| category.trim().to_lowercase())
            .filter(|category| !category.is_empty())
            .collect();

        Ok(Self {
            loan_id: loan.id.to_string(),
            borrower_name: loan.borrower_name.clone(),
            property_address: loan.property_address.clone(),
            funder: loan.funder.clone(),
            loan_type: loan.loan_type,
            loan_purpose: loan.loan_purpose,
            loan_amount: loan.loan_amount,
            document_categories,
            document_count: file.active_documents().count(),
            completed_task_count: file.completed_task_count(),
            open_tasks: file
                .tasks
                .iter()
                .filter(|task| !task.completed)
                .map(|task| task.description.clone())
                .collect(),
            contacts: file
                .contacts
                .iter()
                .map(|contact| (contact.name.clone(), contact.role))
                .collect(),
        })
    }
}
