use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::assistant::{AssistantError, ChatResponder, LoanContext};
use super::checklist::{ChecklistError, ChecklistView};
use super::domain::{
    Contact, ContactDraft, ContactId, Document, DocumentId, DocumentUpload, LoanFile, LoanId,
    LoanIntake, LoanStatus, LoanUpdate, Message, MessageId, MessageRole, Task, TaskDraft, TaskId,
};
use super::email::{self, EmailTemplate, TemplateContext};
use super::intake::{IntakeGuard, IntakeViolation};
use super::repository::{LoanRepository, RepositoryError};
use super::requirements::{RequirementCatalog, RequirementResolver};
use super::views::{ChatExchange, DocumentReceipt, EmailDraftView, LoanSummaryView};

#[derive(Debug, Default)]
struct IdSequences {
    loans: AtomicU64,
    contacts: AtomicU64,
    documents: AtomicU64,
    tasks: AtomicU64,
    messages: AtomicU64,
}

fn next_id(sequence: &AtomicU64, prefix: &str) -> String {
    let id = sequence.fetch_add(1, Ordering::Relaxed) + 1;
    format!("{prefix}-{id:06}")
}

/// Service composing the intake guard, requirement resolver, repository and
/// chat responder.
pub struct LoanFileService<R, C> {
    guard: IntakeGuard,
    resolver: RequirementResolver,
    repository: Arc<R>,
    assistant: Arc<C>,
    sequences: IdSequences,
}

impl<R, C> LoanFileService<R, C>
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    pub fn new(repository: Arc<R>, assistant: Arc<C>, catalog: Arc<RequirementCatalog>) -> Self {
        Self {
            guard: IntakeGuard,
            resolver: RequirementResolver::new(catalog),
            repository,
            assistant,
            sequences: IdSequences::default(),
        }
    }

    pub fn resolver(&self) -> &RequirementResolver {
        &self.resolver
    }

    pub fn create_loan(&self, intake: LoanIntake) -> Result<LoanFile, LoanServiceError> {
        let id = LoanId(next_id(&self.sequences.loans, "loan"));
        let loan = self.guard.loan_from_intake(id, intake, Utc::now())?;
        let stored = self.repository.insert(LoanFile::new(loan))?;
        info!(
            loan_id = %stored.loan.id,
            funder = %stored.loan.funder,
            lender_matched = self.resolver.lender_profile(&stored.loan.funder).is_some(),
            "loan file created"
        );
        Ok(stored)
    }

    pub fn get(&self, loan_id: &LoanId) -> Result<LoanFile, LoanServiceError> {
        let file = self
            .repository
            .fetch(loan_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(file)
    }

    /// Every loan with its completion percentage, newest first.
    pub fn dashboard(&self) -> Result<Vec<LoanSummaryView>, LoanServiceError> {
        let mut files = self.repository.list()?;
        files.sort_by(|a, b| {
            b.loan
                .created_at
                .cmp(&a.loan.created_at)
                .then_with(|| b.loan.id.cmp(&a.loan.id))
        });
        Ok(files
            .iter()
            .map(|file| file.summary(&self.resolver.resolve(&file.loan.funder)))
            .collect())
    }

    pub fn update_status(
        &self,
        loan_id: &LoanId,
        status: LoanStatus,
    ) -> Result<LoanFile, LoanServiceError> {
        self.modify(loan_id, |file| {
            file.loan.status = status;
            Ok(file.clone())
        })
    }

    /// Edits intake fields. Completions stay as recorded; a funder change
    /// only alters which of them count toward the percentage.
    pub fn update_loan(
        &self,
        loan_id: &LoanId,
        update: LoanUpdate,
    ) -> Result<LoanFile, LoanServiceError> {
        self.modify(loan_id, |file| {
            let previous_funder = file.loan.funder.clone();
            self.guard.apply_update(&mut file.loan, update)?;
            if file.loan.funder != previous_funder {
                info!(
                    loan_id = %file.loan.id,
                    from = %previous_funder,
                    to = %file.loan.funder,
                    lender_matched = self.resolver.lender_profile(&file.loan.funder).is_some(),
                    "loan funder changed"
                );
            }
            Ok(file.clone())
        })
    }

    pub fn delete_loan(&self, loan_id: &LoanId) -> Result<(), LoanServiceError> {
        self.repository.delete(loan_id)?;
        info!(loan_id = %loan_id, "loan file deleted");
        Ok(())
    }

    pub fn checklist(&self, loan_id: &LoanId) -> Result<ChecklistView, LoanServiceError> {
        let file = self.get(loan_id)?;
        Ok(self.checklist_view(&file))
    }

    pub fn mark_complete(
        &self,
        loan_id: &LoanId,
        requirement: &str,
    ) -> Result<ChecklistView, LoanServiceError> {
        self.modify(loan_id, |file| {
            let resolved = self.resolver.resolve(&file.loan.funder);
            if file.complete_requirement(requirement, &resolved)? {
                info!(loan_id = %file.loan.id, requirement, "requirement completed");
            }
            Ok(self.checklist_view(file))
        })
    }

    pub fn mark_incomplete(
        &self,
        loan_id: &LoanId,
        requirement: &str,
    ) -> Result<ChecklistView, LoanServiceError> {
        self.modify(loan_id, |file| {
            if file.loan.mark_incomplete(requirement) {
                info!(loan_id = %file.loan.id, requirement, "requirement reopened");
            }
            Ok(self.checklist_view(file))
        })
    }

    pub fn assign_document(
        &self,
        loan_id: &LoanId,
        requirement: &str,
        document_id: &DocumentId,
    ) -> Result<ChecklistView, LoanServiceError> {
        self.modify(loan_id, |file| {
            let resolved = self.resolver.resolve(&file.loan.funder);
            if file.assign_document(requirement, document_id, &resolved)? {
                debug!(loan_id = %file.loan.id, requirement, document_id = %document_id, "document assigned");
            }
            Ok(self.checklist_view(file))
        })
    }

    pub fn unassign_document(
        &self,
        loan_id: &LoanId,
        requirement: &str,
        document_id: &DocumentId,
    ) -> Result<ChecklistView, LoanServiceError> {
        self.modify(loan_id, |file| {
            if file.loan.unassign(requirement, document_id) {
                debug!(loan_id = %file.loan.id, requirement, document_id = %document_id, "document unassigned");
            }
            Ok(self.checklist_view(file))
        })
    }

    pub fn add_contact(
        &self,
        loan_id: &LoanId,
        draft: ContactDraft,
    ) -> Result<Contact, LoanServiceError> {
        let id = ContactId(next_id(&self.sequences.contacts, "contact"));
        let contact = self.guard.contact_from_draft(id, draft)?;
        self.modify(loan_id, |file| {
            file.contacts.push(contact.clone());
            Ok(contact)
        })
    }

    pub fn remove_contact(
        &self,
        loan_id: &LoanId,
        contact_id: &ContactId,
    ) -> Result<(), LoanServiceError> {
        self.modify(loan_id, |file| {
            let before = file.contacts.len();
            file.contacts.retain(|contact| &contact.id != contact_id);
            if file.contacts.len() == before {
                return Err(LoanServiceError::ContactNotFound(contact_id.clone()));
            }
            Ok(())
        })
    }

    /// Stores the document and reports an earlier upload (deleted or not) with
    /// the same file id or name instead of rejecting the new one.
    pub fn add_document(
        &self,
        loan_id: &LoanId,
        upload: DocumentUpload,
    ) -> Result<DocumentReceipt, LoanServiceError> {
        let id = DocumentId(next_id(&self.sequences.documents, "doc"));
        let document = self.guard.document_from_upload(id, upload, Utc::now())?;
        self.modify(loan_id, |file| {
            let duplicate_of = file
                .documents
                .iter()
                .find(|existing| {
                    existing.file_id == document.file_id
                        || existing.name.eq_ignore_ascii_case(&document.name)
                })
                .map(|existing| existing.id.clone());
            if let Some(original) = &duplicate_of {
                info!(loan_id = %file.loan.id, document_id = %document.id, duplicate_of = %original, "possible duplicate upload");
            }
            file.documents.push(document.clone());
            Ok(DocumentReceipt {
                document,
                duplicate_of,
            })
        })
    }

    /// Soft delete: the row is kept, but the document leaves every assignment.
    pub fn delete_document(
        &self,
        loan_id: &LoanId,
        document_id: &DocumentId,
    ) -> Result<Document, LoanServiceError> {
        self.modify(loan_id, |file| {
            let document = file
                .documents
                .iter_mut()
                .find(|document| &document.id == document_id && document.is_active())
                .ok_or_else(|| LoanServiceError::DocumentNotFound(document_id.clone()))?;
            document.deleted = true;
            let deleted = document.clone();
            file.loan.unassign_everywhere(document_id);
            Ok(deleted)
        })
    }

    pub fn add_task(&self, loan_id: &LoanId, draft: TaskDraft) -> Result<Task, LoanServiceError> {
        let id = TaskId(next_id(&self.sequences.tasks, "task"));
        let task = self.guard.task_from_draft(id, draft)?;
        self.modify(loan_id, |file| {
            file.tasks.push(task.clone());
            Ok(task)
        })
    }

    pub fn set_task_completed(
        &self,
        loan_id: &LoanId,
        task_id: &TaskId,
        completed: bool,
    ) -> Result<Task, LoanServiceError> {
        self.modify(loan_id, |file| {
            let task = file
                .tasks
                .iter_mut()
                .find(|task| &task.id == task_id)
                .ok_or_else(|| LoanServiceError::TaskNotFound(task_id.clone()))?;
            task.completed = completed;
            Ok(task.clone())
        })
    }

    pub fn remove_task(&self, loan_id: &LoanId, task_id: &TaskId) -> Result<(), LoanServiceError> {
        self.modify(loan_id, |file| {
            let before = file.tasks.len();
            file.tasks.retain(|task| &task.id != task_id);
            if file.tasks.len() == before {
                return Err(LoanServiceError::TaskNotFound(task_id.clone()));
            }
            Ok(())
        })
    }

    /// Role-based opening email for one of the loan's contacts.
    pub fn draft_email(
        &self,
        loan_id: &LoanId,
        contact_id: &ContactId,
    ) -> Result<EmailDraftView, LoanServiceError> {
        let file = self.get(loan_id)?;
        let contact = file
            .contact(contact_id)
            .ok_or_else(|| LoanServiceError::ContactNotFound(contact_id.clone()))?;
        let draft = email::generate_email_template(
            contact,
            &file.loan.property_address,
            &file.loan.borrower_name,
            Some(file.loan.loan_purpose),
        );
        Ok(EmailDraftView {
            contact_id: contact.id.clone(),
            to: contact.email.clone(),
            subject: draft.subject,
            body: draft.body,
        })
    }

    /// Fills `{TOKEN}` placeholders from the loan and, optionally, a contact.
    pub fn render_email(
        &self,
        loan_id: &LoanId,
        template: &EmailTemplate,
        contact_id: Option<&ContactId>,
    ) -> Result<EmailTemplate, LoanServiceError> {
        let file = self.get(loan_id)?;
        let contact = match contact_id {
            Some(id) => Some(
                file.contact(id)
                    .ok_or_else(|| LoanServiceError::ContactNotFound(id.clone()))?,
            ),
            None => None,
        };
        let context = TemplateContext::for_loan(&file.loan, contact);
        Ok(email::render(template, &context))
    }

    /// Appends the question and the assistant's reply to the loan's chat log.
    pub fn chat(&self, loan_id: &LoanId, content: &str) -> Result<ChatExchange, LoanServiceError> {
        self.modify(loan_id, |file| {
            let context = LoanContext::from_file(file)?;
            let reply = self.assistant.respond(&context, content)?;
            debug!(loan_id = %file.loan.id, intent = ?reply.intent, stage = reply.stage.key(), "assistant replied");

            let question = self.message(MessageRole::User, content.trim().to_string());
            let answer = self.message(MessageRole::Assistant, reply.content);
            file.messages.push(question.clone());
            file.messages.push(answer.clone());

            Ok(ChatExchange {
                question,
                reply: answer,
                intent: reply.intent,
                stage: reply.stage,
            })
        })
    }

    pub fn messages(&self, loan_id: &LoanId) -> Result<Vec<Message>, LoanServiceError> {
        Ok(self.get(loan_id)?.messages)
    }

    fn message(&self, role: MessageRole, content: String) -> Message {
        Message {
            id: MessageId(next_id(&self.sequences.messages, "msg")),
            role,
            content,
            created_at: Utc::now(),
        }
    }

    fn checklist_view(&self, file: &LoanFile) -> ChecklistView {
        let resolved = self.resolver.resolve(&file.loan.funder);
        let matched = self.resolver.lender_profile(&file.loan.funder).is_some();
        ChecklistView::build(&file.loan, &file.documents, &resolved, matched)
    }

    /// Read-modify-write of a whole file; nothing is persisted when `apply` fails.
    fn modify<T>(
        &self,
        loan_id: &LoanId,
        apply: impl FnOnce(&mut LoanFile) -> Result<T, LoanServiceError>,
    ) -> Result<T, LoanServiceError> {
        let mut file = self.get(loan_id)?;
        let outcome = apply(&mut file)?;
        self.repository.update(file)?;
        Ok(outcome)
    }
}

/// Error raised by the loan file service.
#[derive(Debug, thiserror::Error)]
pub enum LoanServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Checklist(#[from] ChecklistError),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("contact {0} not found on this loan")]
    ContactNotFound(ContactId),
    #[error("document {0} not found on this loan")]
    DocumentNotFound(DocumentId),
    #[error("task {0} not found on this loan")]
    TaskNotFound(TaskId),
}
