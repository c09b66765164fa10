use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use super::domain::{
    Contact, ContactDraft, ContactId, Document, DocumentId, DocumentUpload, Loan, LoanId,
    LoanIntake, LoanStatus, LoanUpdate, Task, TaskDraft, TaskId,
};

/// Validation errors raised before loosely shaped input reaches the core.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntakeViolation {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("loan amount must be greater than zero")]
    ZeroLoanAmount,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}

/// Turns request payloads into domain records, trimming text and rejecting
/// anything the checklist or assistant could not render.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn loan_from_intake(
        &self,
        id: LoanId,
        intake: LoanIntake,
        now: DateTime<Utc>,
    ) -> Result<Loan, IntakeViolation> {
        if intake.loan_amount == Some(0) {
            return Err(IntakeViolation::ZeroLoanAmount);
        }

        Ok(Loan {
            id,
            processor: required("processor", intake.processor)?,
            borrower_name: required("borrower_name", intake.borrower_name)?,
            borrower_entity: optional(intake.borrower_entity),
            property_address: required("property_address", intake.property_address)?,
            loan_amount: intake.loan_amount,
            loan_type: intake.loan_type,
            loan_purpose: intake.loan_purpose,
            funder: required("funder", intake.funder)?,
            target_close_date: intake.target_close_date,
            status: LoanStatus::Active,
            completed_requirements: BTreeSet::new(),
            requirement_documents: BTreeMap::new(),
            created_at: now,
        })
    }

    /// Applies an edit under the intake rules. `loan` is untouched on error.
    pub fn apply_update(&self, loan: &mut Loan, update: LoanUpdate) -> Result<(), IntakeViolation> {
        if update.loan_amount == Some(0) {
            return Err(IntakeViolation::ZeroLoanAmount);
        }

        let mut edited = loan.clone();
        if let Some(processor) = update.processor {
            edited.processor = required("processor", processor)?;
        }
        if let Some(borrower_name) = update.borrower_name {
            edited.borrower_name = required("borrower_name", borrower_name)?;
        }
        if update.borrower_entity.is_some() {
            edited.borrower_entity = optional(update.borrower_entity);
        }
        if let Some(address) = update.property_address {
            edited.property_address = required("property_address", address)?;
        }
        if let Some(funder) = update.funder {
            edited.funder = required("funder", funder)?;
        }
        edited.loan_amount = update.loan_amount.or(edited.loan_amount);
        edited.loan_type = update.loan_type.unwrap_or(edited.loan_type);
        edited.loan_purpose = update.loan_purpose.unwrap_or(edited.loan_purpose);
        edited.target_close_date = update.target_close_date.or(edited.target_close_date);

        *loan = edited;
        Ok(())
    }

    pub fn contact_from_draft(
        &self,
        id: ContactId,
        draft: ContactDraft,
    ) -> Result<Contact, IntakeViolation> {
        let email = optional(draft.email);
        if let Some(address) = &email {
            if !looks_like_email(address) {
                return Err(IntakeViolation::InvalidEmail(address.clone()));
            }
        }

        Ok(Contact {
            id,
            name: required("name", draft.name)?,
            email,
            phone: optional(draft.phone),
            company: optional(draft.company),
            role: draft.role,
        })
    }

    pub fn document_from_upload(
        &self,
        id: DocumentId,
        upload: DocumentUpload,
        now: DateTime<Utc>,
    ) -> Result<Document, IntakeViolation> {
        let name = required("name", upload.name)?;
        let file_id = required("file_id", upload.file_id)?;
        let content_type = optional(upload.content_type).or_else(|| {
            mime_guess::from_path(&name)
                .first()
                .map(|mime| mime.essence_str().to_string())
        });

        Ok(Document {
            id,
            name,
            file_id,
            category: optional(upload.category),
            content_type,
            deleted: false,
            uploaded_at: now,
        })
    }

    pub fn task_from_draft(&self, id: TaskId, draft: TaskDraft) -> Result<Task, IntakeViolation> {
        Ok(Task {
            id,
            description: required("description", draft.description)?,
            due_date: draft.due_date,
            priority: draft.priority,
            completed: false,
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, IntakeViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(IntakeViolation::MissingField { field })
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn looks_like_email(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !address.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
