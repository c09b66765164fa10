use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::assistant::ChatResponder;
use super::domain::{
    ContactDraft, ContactId, DocumentId, DocumentUpload, LoanId, LoanIntake, LoanStatus,
    LoanUpdate, TaskDraft, TaskId,
};
use super::email::EmailTemplate;
use super::repository::{LoanRepository, RepositoryError};
use super::service::{LoanFileService, LoanServiceError};

type SharedService<R, C> = State<Arc<LoanFileService<R, C>>>;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: LoanStatus,
}

#[derive(Debug, Deserialize)]
pub struct CompletionUpdate {
    pub requirement: String,
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentAction {
    Assign,
    Unassign,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentUpdate {
    pub requirement: String,
    pub document_id: DocumentId,
    pub action: AssignmentAction,
}

#[derive(Debug, Deserialize)]
pub struct TaskUpdate {
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    #[serde(flatten)]
    pub template: EmailTemplate,
    #[serde(default)]
    pub contact_id: Option<ContactId>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct RequirementQuery {
    #[serde(default)]
    pub lender: String,
}

/// Router builder exposing the loan file endpoints.
pub fn loan_router<R, C>(service: Arc<LoanFileService<R, C>>) -> Router
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    Router::new()
        .route(
            "/api/v1/loans",
            post(create_handler::<R, C>).get(dashboard_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id",
            get(detail_handler::<R, C>)
                .patch(update_handler::<R, C>)
                .delete(delete_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id/status",
            patch(status_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id/checklist",
            get(checklist_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id/completed-requirements",
            patch(completion_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id/requirement-documents",
            patch(assignment_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id/contacts",
            post(add_contact_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id/contacts/:contact_id",
            delete(remove_contact_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id/contacts/:contact_id/email-draft",
            get(email_draft_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id/email/render",
            post(render_email_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id/documents",
            post(add_document_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id/documents/:document_id",
            delete(delete_document_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id/tasks",
            post(add_task_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id/tasks/:task_id",
            patch(update_task_handler::<R, C>).delete(remove_task_handler::<R, C>),
        )
        .route(
            "/api/v1/loans/:loan_id/messages",
            get(messages_handler::<R, C>).post(chat_handler::<R, C>),
        )
        .route("/api/v1/requirements", get(requirements_handler::<R, C>))
        .with_state(service)
}

pub(crate) fn error_response(error: LoanServiceError) -> Response {
    let status = match &error {
        LoanServiceError::Intake(_)
        | LoanServiceError::Checklist(_)
        | LoanServiceError::Assistant(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LoanServiceError::Repository(RepositoryError::NotFound)
        | LoanServiceError::ContactNotFound(_)
        | LoanServiceError::DocumentNotFound(_)
        | LoanServiceError::TaskNotFound(_) => StatusCode::NOT_FOUND,
        LoanServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        LoanServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, LoanServiceError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<R, C>(
    State(service): SharedService<R, C>,
    Json(intake): Json<LoanIntake>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    let result = service.create_loan(intake).map(|file| {
        let resolved = service.resolver().resolve(&file.loan.funder);
        file.detail(&resolved)
    });
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn dashboard_handler<R, C>(State(service): SharedService<R, C>) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    respond(StatusCode::OK, service.dashboard())
}

pub(crate) async fn detail_handler<R, C>(
    State(service): SharedService<R, C>,
    Path(loan_id): Path<String>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    let result = service.get(&LoanId(loan_id)).map(|file| {
        let resolved = service.resolver().resolve(&file.loan.funder);
        file.detail(&resolved)
    });
    respond(StatusCode::OK, result)
}

pub(crate) async fn update_handler<R, C>(
    State(service): SharedService<R, C>,
    Path(loan_id): Path<String>,
    Json(update): Json<LoanUpdate>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    let result = service.update_loan(&LoanId(loan_id), update).map(|file| {
        let resolved = service.resolver().resolve(&file.loan.funder);
        file.detail(&resolved)
    });
    respond(StatusCode::OK, result)
}

pub(crate) async fn delete_handler<R, C>(
    State(service): SharedService<R, C>,
    Path(loan_id): Path<String>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    match service.delete_loan(&LoanId(loan_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, C>(
    State(service): SharedService<R, C>,
    Path(loan_id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    let result = service
        .update_status(&LoanId(loan_id), update.status)
        .map(|file| file.summary(&service.resolver().resolve(&file.loan.funder)));
    respond(StatusCode::OK, result)
}

pub(crate) async fn checklist_handler<R, C>(
    State(service): SharedService<R, C>,
    Path(loan_id): Path<String>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    respond(StatusCode::OK, service.checklist(&LoanId(loan_id)))
}

pub(crate) async fn completion_handler<R, C>(
    State(service): SharedService<R, C>,
    Path(loan_id): Path<String>,
    Json(update): Json<CompletionUpdate>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    let loan_id = LoanId(loan_id);
    let result = if update.complete {
        service.mark_complete(&loan_id, &update.requirement)
    } else {
        service.mark_incomplete(&loan_id, &update.requirement)
    };
    respond(StatusCode::OK, result)
}

pub(crate) async fn assignment_handler<R, C>(
    State(service): SharedService<R, C>,
    Path(loan_id): Path<String>,
    Json(update): Json<AssignmentUpdate>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    let loan_id = LoanId(loan_id);
    let result = match update.action {
        AssignmentAction::Assign => {
            service.assign_document(&loan_id, &update.requirement, &update.document_id)
        }
        AssignmentAction::Unassign => {
            service.unassign_document(&loan_id, &update.requirement, &update.document_id)
        }
    };
    respond(StatusCode::OK, result)
}

pub(crate) async fn add_contact_handler<R, C>(
    State(service): SharedService<R, C>,
    Path(loan_id): Path<String>,
    Json(draft): Json<ContactDraft>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_contact(&LoanId(loan_id), draft),
    )
}

pub(crate) async fn remove_contact_handler<R, C>(
    State(service): SharedService<R, C>,
    Path((loan_id, contact_id)): Path<(String, String)>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    match service.remove_contact(&LoanId(loan_id), &ContactId(contact_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn email_draft_handler<R, C>(
    State(service): SharedService<R, C>,
    Path((loan_id, contact_id)): Path<(String, String)>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    respond(
        StatusCode::OK,
        service.draft_email(&LoanId(loan_id), &ContactId(contact_id)),
    )
}

pub(crate) async fn render_email_handler<R, C>(
    State(service): SharedService<R, C>,
    Path(loan_id): Path<String>,
    Json(request): Json<RenderRequest>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    respond(
        StatusCode::OK,
        service.render_email(
            &LoanId(loan_id),
            &request.template,
            request.contact_id.as_ref(),
        ),
    )
}

pub(crate) async fn add_document_handler<R, C>(
    State(service): SharedService<R, C>,
    Path(loan_id): Path<String>,
    Json(upload): Json<DocumentUpload>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    respond(
        StatusCode::CREATED,
        service.add_document(&LoanId(loan_id), upload),
    )
}

pub(crate) async fn delete_document_handler<R, C>(
    State(service): SharedService<R, C>,
    Path((loan_id, document_id)): Path<(String, String)>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    respond(
        StatusCode::OK,
        service.delete_document(&LoanId(loan_id), &DocumentId(document_id)),
    )
}

pub(crate) async fn add_task_handler<R, C>(
    State(service): SharedService<R, C>,
    Path(loan_id): Path<String>,
    Json(draft): Json<TaskDraft>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    respond(StatusCode::CREATED, service.add_task(&LoanId(loan_id), draft))
}

pub(crate) async fn update_task_handler<R, C>(
    State(service): SharedService<R, C>,
    Path((loan_id, task_id)): Path<(String, String)>,
    Json(update): Json<TaskUpdate>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    respond(
        StatusCode::OK,
        service.set_task_completed(&LoanId(loan_id), &TaskId(task_id), update.completed),
    )
}

pub(crate) async fn remove_task_handler<R, C>(
    State(service): SharedService<R, C>,
    Path((loan_id, task_id)): Path<(String, String)>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    match service.remove_task(&LoanId(loan_id), &TaskId(task_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn messages_handler<R, C>(
    State(service): SharedService<R, C>,
    Path(loan_id): Path<String>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    respond(StatusCode::OK, service.messages(&LoanId(loan_id)))
}

pub(crate) async fn chat_handler<R, C>(
    State(service): SharedService<R, C>,
    Path(loan_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    respond(
        StatusCode::CREATED,
        service.chat(&LoanId(loan_id), &request.content),
    )
}

pub(crate) async fn requirements_handler<R, C>(
    State(service): SharedService<R, C>,
    Query(query): Query<RequirementQuery>,
) -> Response
where
    R: LoanRepository + 'static,
    C: ChatResponder + 'static,
{
    let resolver = service.resolver();
    let lender = resolver.lender_profile(&query.lender);
    let payload = json!({
        "lender": lender.map(|profile| profile.display_name.as_str()),
        "lender_matched": lender.is_some(),
        "groups": resolver.resolve_grouped(&query.lender),
    });
    (StatusCode::OK, Json(payload)).into_response()
}
