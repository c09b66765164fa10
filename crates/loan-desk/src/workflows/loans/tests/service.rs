use super::common::*;
use crate::workflows::loans::assistant::{AssistantError, Intent, ProcessStage};
use crate::workflows::loans::domain::{
    ContactId, LoanId, LoanStatus, LoanUpdate, MessageRole, TaskDraft, TaskId, TaskPriority,
};
use crate::workflows::loans::email::EmailTemplate;
use crate::workflows::loans::intake::IntakeViolation;
use crate::workflows::loans::repository::RepositoryError;
use crate::workflows::loans::service::LoanServiceError;

fn task(description: &str) -> TaskDraft {
    TaskDraft {
        description: description.to_string(),
        due_date: None,
        priority: TaskPriority::High,
    }
}

#[test]
fn create_loan_assigns_sequential_ids() {
    let (service, repository) = build_service();

    let first = service.create_loan(intake()).expect("first loan");
    let second = service.create_loan(intake()).expect("second loan");

    assert_eq!(first.loan.id, LoanId("loan-000001".to_string()));
    assert_eq!(second.loan.id, LoanId("loan-000002".to_string()));
    assert_eq!(repository.stored(&first.loan.id).loan.status, LoanStatus::Active);
}

#[test]
fn create_loan_propagates_intake_violations() {
    let (service, repository) = build_service();
    let mut draft = intake();
    draft.borrower_name = "   ".to_string();

    match service.create_loan(draft) {
        Err(LoanServiceError::Intake(IntakeViolation::MissingField { field })) => {
            assert_eq!(field, "borrower_name");
        }
        other => panic!("expected missing field, got {other:?}"),
    }

    let mut draft = intake();
    draft.loan_amount = Some(0);
    assert!(matches!(
        service.create_loan(draft),
        Err(LoanServiceError::Intake(IntakeViolation::ZeroLoanAmount))
    ));
    assert!(repository.records.lock().expect("mutex").is_empty());
}

#[test]
fn get_propagates_not_found() {
    let (service, _) = build_service();
    assert!(matches!(
        service.get(&LoanId("loan-404".to_string())),
        Err(LoanServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn dashboard_lists_newest_first_with_progress() {
    let (service, _) = build_service();
    let older = service.create_loan(intake()).expect("older");
    let mut draft = intake();
    draft.funder = "Unknown Capital".to_string();
    let newer = service.create_loan(draft).expect("newer");
    service
        .mark_complete(&older.loan.id, "Kiavi Loan Application")
        .expect("complete");

    let rows = service.dashboard().expect("dashboard");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, newer.loan.id);
    assert_eq!(rows[0].percent_complete, 0);
    assert_eq!(rows[1].id, older.loan.id);
    assert_eq!(rows[1].percent_complete, 10);
}

#[test]
fn funder_change_recomputes_progress_against_new_checklist() {
    let (service, repository) = build_service();
    let loan_id = service.create_loan(intake()).expect("loan").loan.id;
    service
        .mark_complete(&loan_id, "Driver's License")
        .expect("common item");
    let kiavi = service
        .mark_complete(&loan_id, "Kiavi Loan Application")
        .expect("lender item");
    assert_eq!(kiavi.percent_complete, 20);

    let updated = service
        .update_loan(
            &loan_id,
            LoanUpdate {
                funder: Some("Acme Hard Money".to_string()),
                ..LoanUpdate::default()
            },
        )
        .expect("funder changed");
    assert_eq!(updated.loan.funder, "Acme Hard Money");
    assert_eq!(updated.loan.completed_requirements.len(), 2);

    let checklist = service.checklist(&loan_id).expect("checklist");
    assert!(!checklist.lender_matched);
    assert_eq!(checklist.total, 9);
    assert_eq!(checklist.percent_complete, 11);
    assert_eq!(service.dashboard().expect("dashboard")[0].percent_complete, 11);
    assert_eq!(repository.stored(&loan_id).loan.funder, "Acme Hard Money");
}

#[test]
fn invalid_loan_update_is_not_persisted() {
    let (service, repository) = build_service();
    let loan_id = service.create_loan(intake()).expect("loan").loan.id;

    let result = service.update_loan(
        &loan_id,
        LoanUpdate {
            borrower_name: Some("Jordan Lee".to_string()),
            loan_amount: Some(0),
            ..LoanUpdate::default()
        },
    );

    assert!(matches!(
        result,
        Err(LoanServiceError::Intake(IntakeViolation::ZeroLoanAmount))
    ));
    assert_eq!(repository.stored(&loan_id).loan.borrower_name, "Dana Whitfield");
    assert!(matches!(
        service.update_loan(&LoanId("loan-404".to_string()), LoanUpdate::default()),
        Err(LoanServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn status_update_and_delete() {
    let (service, repository) = build_service();
    let file = service.create_loan(intake()).expect("loan");

    let updated = service
        .update_status(&file.loan.id, LoanStatus::OnHold)
        .expect("status updated");
    assert_eq!(updated.loan.status, LoanStatus::OnHold);

    service.delete_loan(&file.loan.id).expect("deleted");
    assert!(repository.records.lock().expect("mutex").is_empty());
    assert!(matches!(
        service.delete_loan(&file.loan.id),
        Err(LoanServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn duplicate_uploads_are_flagged_not_rejected() {
    let (service, repository) = build_service();
    let file = service.create_loan(intake()).expect("loan");

    let first = service
        .add_document(&file.loan.id, upload("Bank Statement.pdf", "drive-1", "borrower"))
        .expect("first upload");
    assert_eq!(first.duplicate_of, None);
    assert_eq!(
        first.document.content_type.as_deref(),
        Some("application/pdf")
    );

    let same_name = service
        .add_document(&file.loan.id, upload("bank statement.PDF", "drive-2", "borrower"))
        .expect("second upload");
    assert_eq!(same_name.duplicate_of, Some(first.document.id.clone()));

    service
        .delete_document(&file.loan.id, &first.document.id)
        .expect("soft delete");
    let same_file = service
        .add_document(&file.loan.id, upload("Statement copy.pdf", "drive-1", "borrower"))
        .expect("third upload");
    assert_eq!(same_file.duplicate_of, Some(first.document.id.clone()));

    assert_eq!(repository.stored(&file.loan.id).documents.len(), 3);
}

#[test]
fn soft_delete_unassigns_and_lowers_stage() {
    let (service, repository) = build_service();
    let file = service.create_loan(intake()).expect("loan");
    let mut documents = Vec::new();
    for index in 0..5 {
        let receipt = service
            .add_document(
                &file.loan.id,
                upload(&format!("Doc {index}.pdf"), &format!("drive-{index}"), "borrower"),
            )
            .expect("upload");
        documents.push(receipt.document.id);
    }
    for index in 0..3 {
        let added = service
            .add_task(&file.loan.id, task(&format!("Task {index}")))
            .expect("task");
        service
            .set_task_completed(&file.loan.id, &added.id, true)
            .expect("task completed");
    }
    service
        .assign_document(&file.loan.id, "Driver's License", &documents[0])
        .expect("assign");

    let stored = repository.stored(&file.loan.id);
    let resolved = service.resolver().resolve(&stored.loan.funder);
    assert_eq!(stored.detail(&resolved).stage, ProcessStage::ConditionalApproval);

    let deleted = service
        .delete_document(&file.loan.id, &documents[0])
        .expect("soft delete");
    assert!(deleted.deleted);

    let stored = repository.stored(&file.loan.id);
    let detail = stored.detail(&resolved);
    assert_eq!(detail.stage, ProcessStage::InitialSubmission);
    assert_eq!(detail.documents.len(), 4);
    assert!(stored.loan.requirement_documents.is_empty());

    assert!(matches!(
        service.delete_document(&file.loan.id, &documents[0]),
        Err(LoanServiceError::DocumentNotFound(_))
    ));
}

#[test]
fn task_lifecycle_reports_missing_ids() {
    let (service, repository) = build_service();
    let file = service.create_loan(intake()).expect("loan");
    let added = service
        .add_task(&file.loan.id, task("Order appraisal"))
        .expect("task added");
    assert!(!added.completed);

    service.remove_task(&file.loan.id, &added.id).expect("removed");
    assert!(repository.stored(&file.loan.id).tasks.is_empty());
    assert!(matches!(
        service.set_task_completed(&file.loan.id, &TaskId("task-000404".to_string()), true),
        Err(LoanServiceError::TaskNotFound(_))
    ));
}

#[test]
fn contacts_can_be_removed_once() {
    let (service, _) = build_service();
    let file = service.create_loan(intake()).expect("loan");
    let contact = service
        .add_contact(&file.loan.id, title_contact())
        .expect("contact");

    service
        .remove_contact(&file.loan.id, &contact.id)
        .expect("removed");
    assert!(matches!(
        service.remove_contact(&file.loan.id, &contact.id),
        Err(LoanServiceError::ContactNotFound(_))
    ));
}

#[test]
fn draft_email_uses_contact_role() {
    let (service, _) = build_service();
    let file = service.create_loan(intake()).expect("loan");
    let contact = service
        .add_contact(&file.loan.id, insurance_contact())
        .expect("contact");

    let draft = service
        .draft_email(&file.loan.id, &contact.id)
        .expect("draft");

    assert_eq!(
        draft.subject,
        "Insurance Requirements - 1420 Harbor View Dr, Tampa, FL 33602"
    );
    assert!(draft.body.starts_with("Hi Priya,"));
    assert!(draft.body.contains("purchasing"));
    assert_eq!(draft.to.as_deref(), Some("priya@coastalins.com"));

    assert!(matches!(
        service.draft_email(&file.loan.id, &ContactId("contact-404".to_string())),
        Err(LoanServiceError::ContactNotFound(_))
    ));
}

#[test]
fn render_email_fills_loan_and_contact_tokens() {
    let (service, _) = build_service();
    let file = service.create_loan(intake()).expect("loan");
    let contact = service
        .add_contact(&file.loan.id, title_contact())
        .expect("contact");
    let template = EmailTemplate {
        subject: "{LOAN_NUMBER} - {PROPERTY_ADDRESS}".to_string(),
        body: "Hi {CONTACT_NAME}, the {LOAN_AMOUNT} loan closes {TARGET_CLOSE_DATE}.".to_string(),
    };

    let rendered = service
        .render_email(&file.loan.id, &template, Some(&contact.id))
        .expect("rendered");

    assert_eq!(
        rendered.subject,
        "loan-000001 - 1420 Harbor View Dr, Tampa, FL 33602"
    );
    assert_eq!(
        rendered.body,
        "Hi Morgan Reyes, the $412,500 loan closes {TARGET_CLOSE_DATE}."
    );
}

#[test]
fn chat_appends_question_and_reply() {
    let (service, repository) = build_service();
    let file = service.create_loan(intake()).expect("loan");

    let exchange = service
        .chat(&file.loan.id, "  what documents are missing? ")
        .expect("chat");

    assert_eq!(exchange.intent, Intent::Documents);
    assert_eq!(exchange.stage, ProcessStage::InitialSubmission);
    assert_eq!(exchange.question.content, "what documents are missing?");
    assert!(exchange.reply.content.contains("Title Documents"));

    let messages = service.messages(&file.loan.id).expect("messages");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert_eq!(repository.stored(&file.loan.id).messages, messages);
}

#[test]
fn blank_chat_leaves_history_untouched() {
    let (service, repository) = build_service();
    let file = service.create_loan(intake()).expect("loan");

    assert!(matches!(
        service.chat(&file.loan.id, "   "),
        Err(LoanServiceError::Assistant(AssistantError::EmptyQuery))
    ));
    assert!(repository.stored(&file.loan.id).messages.is_empty());
}

#[test]
fn unavailable_repository_surfaces_on_create() {
    let service = service_with(UnavailableRepository);
    assert!(matches!(
        service.create_loan(intake()),
        Err(LoanServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}
