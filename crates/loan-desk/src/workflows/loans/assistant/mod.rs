//! Loan chat assistant. Only the keyword fallback ships; a model-backed
//! responder can be slotted in through [`ChatResponder`].

mod context;
mod fallback;
mod intent;
mod knowledge;
mod stage;

use serde::Serialize;

pub use context::LoanContext;
pub use fallback::FallbackAssistant;
pub use intent::{Intent, IntentClassifier};
pub use knowledge::{ExpectedCategory, KnowledgeBase};
pub use stage::ProcessStage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistantReply {
    pub content: String,
    pub intent: Intent,
    pub stage: ProcessStage,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AssistantError {
    #[error("invalid loan context: {0}")]
    InvalidContext(String),
    #[error("message is empty")]
    EmptyQuery,
}

pub trait ChatResponder: Send + Sync {
    fn respond(&self, context: &LoanContext, query: &str)
        -> Result<AssistantReply, AssistantError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::loans::domain::{
        Contact, ContactId, ContactRole, Document, DocumentId, Loan, LoanFile, LoanId,
        LoanPurpose, LoanStatus, LoanType, Task, TaskId, TaskPriority,
    };
    use chrono::{TimeZone, Utc};

    fn loan_file() -> LoanFile {
        LoanFile::new(Loan {
            id: LoanId("loan-000001".to_string()),
            processor: "Avery".to_string(),
            borrower_name: "Dana Whitfield".to_string(),
            borrower_entity: Some("Harbor View Holdings LLC".to_string()),
            property_address: "1420 Harbor View Dr, Tampa, FL".to_string(),
            loan_amount: Some(412_500),
            loan_type: LoanType::Dscr,
            loan_purpose: LoanPurpose::Purchase,
            funder: "Kiavi".to_string(),
            target_close_date: None,
            status: LoanStatus::Active,
            completed_requirements: Default::default(),
            requirement_documents: Default::default(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        })
    }

    fn document(index: usize, category: &str) -> Document {
        Document {
            id: DocumentId(format!("doc-{index:06}")),
            name: format!("{category} {index}.pdf"),
            file_id: format!("file-{index}"),
            category: Some(category.to_string()),
            content_type: Some("application/pdf".to_string()),
            deleted: false,
            uploaded_at: Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap(),
        }
    }

    fn task(index: usize, completed: bool) -> Task {
        Task {
            id: TaskId(format!("task-{index:06}")),
            description: format!("Task {index}"),
            due_date: None,
            priority: TaskPriority::Medium,
            completed,
        }
    }

    #[test]
    fn documents_question_reports_missing_title() {
        let mut file = loan_file();
        file.documents.push(document(1, "Borrower"));
        file.documents.push(document(2, "insurance"));
        let context = LoanContext::from_file(&file).expect("valid context");

        let reply = FallbackAssistant::default()
            .respond(&context, "what documents do I need?")
            .expect("reply");

        assert_eq!(reply.intent, Intent::Documents);
        assert!(reply.content.contains("Title Documents"));
        assert!(!reply.content.contains("Borrower Documents"));
        assert!(!reply.content.contains("Insurance Documents"));
    }

    #[test]
    fn deleted_documents_do_not_fill_gaps() {
        let mut file = loan_file();
        let mut title = document(1, "title");
        title.deleted = true;
        file.documents.push(title);
        let context = LoanContext::from_file(&file).expect("valid context");

        let assistant = FallbackAssistant::default();
        assert_eq!(
            assistant.missing_categories(&context),
            vec!["Borrower Documents", "Title Documents", "Insurance Documents"]
        );
        assert_eq!(context.document_count, 0);
    }

    #[test]
    fn process_question_reports_inferred_stage() {
        let mut file = loan_file();
        for index in 0..6 {
            file.documents.push(document(index, "borrower"));
        }
        for index in 0..5 {
            file.tasks.push(task(index, index < 4));
        }
        let context = LoanContext::from_file(&file).expect("valid context");

        let reply = FallbackAssistant::default()
            .respond(&context, "What are the next steps?")
            .expect("reply");

        assert_eq!(reply.intent, Intent::Process);
        assert_eq!(reply.stage, ProcessStage::ConditionalApproval);
        assert!(reply.content.contains("Conditional Approval"));
        assert!(reply.content.contains("Task 4"));
    }

    #[test]
    fn email_question_lists_contacts() {
        let mut file = loan_file();
        file.contacts.push(Contact {
            id: ContactId("contact-000001".to_string()),
            name: "Morgan Reyes".to_string(),
            email: None,
            phone: None,
            company: Some("Gulf Title".to_string()),
            role: ContactRole::Title,
        });
        let context = LoanContext::from_file(&file).expect("valid context");

        let reply = FallbackAssistant::default()
            .respond(&context, "what documents should I email the title agent")
            .expect("reply");

        assert_eq!(reply.intent, Intent::EmailTemplate);
        assert!(reply.content.contains("Morgan Reyes (Title)"));
    }

    #[test]
    fn dscr_question_mentions_loan_when_dscr_product() {
        let context = LoanContext::from_file(&loan_file()).expect("valid context");
        let reply = FallbackAssistant::default()
            .respond(&context, "what is dscr?")
            .expect("reply");
        assert_eq!(reply.intent, Intent::Dscr);
        assert!(reply.content.contains("Debt Service Coverage Ratio"));
        assert!(reply.content.contains("DSCR loan with Kiavi"));
    }

    #[test]
    fn general_reply_summarizes_loan() {
        let context = LoanContext::from_file(&loan_file()).expect("valid context");
        let reply = FallbackAssistant::default()
            .respond(&context, "hi")
            .expect("reply");
        assert_eq!(reply.intent, Intent::General);
        assert!(reply.content.contains("$412,500"));
        assert!(reply.content.contains("Dana Whitfield"));
    }

    #[test]
    fn blank_borrower_is_invalid_context() {
        let mut file = loan_file();
        file.loan.borrower_name = "  ".to_string();
        assert!(matches!(
            LoanContext::from_file(&file),
            Err(AssistantError::InvalidContext(_))
        ));
    }

    #[test]
    fn blank_query_is_rejected() {
        let context = LoanContext::from_file(&loan_file()).expect("valid context");
        assert_eq!(
            FallbackAssistant::default().respond(&context, "   "),
            Err(AssistantError::EmptyQuery)
        );
    }
}
