use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::loans::assistant::FallbackAssistant;
use crate::workflows::loans::domain::{
    ContactDraft, ContactRole, DocumentUpload, LoanFile, LoanId, LoanIntake, LoanPurpose, LoanType,
};
use crate::workflows::loans::repository::{LoanRepository, RepositoryError};
use crate::workflows::loans::requirements::RequirementCatalog;
use crate::workflows::loans::{loan_router, LoanFileService};

pub(super) fn intake() -> LoanIntake {
    LoanIntake {
        processor: "Avery Chen".to_string(),
        borrower_name: "Dana Whitfield".to_string(),
        borrower_entity: Some("Harbor View Holdings LLC".to_string()),
        property_address: "1420 Harbor View Dr, Tampa, FL 33602".to_string(),
        loan_amount: Some(412_500),
        loan_type: LoanType::Dscr,
        loan_purpose: LoanPurpose::Purchase,
        funder: "Kiavi".to_string(),
        target_close_date: None,
    }
}

pub(super) fn title_contact() -> ContactDraft {
    ContactDraft {
        name: "Morgan Reyes".to_string(),
        email: Some("morgan@gulftitle.com".to_string()),
        phone: Some("813-555-0140".to_string()),
        company: Some("Gulf Title".to_string()),
        role: ContactRole::Title,
    }
}

pub(super) fn insurance_contact() -> ContactDraft {
    ContactDraft {
        name: "Priya Shah".to_string(),
        email: Some("priya@coastalins.com".to_string()),
        phone: None,
        company: Some("Coastal Insurance".to_string()),
        role: ContactRole::Insurance,
    }
}

pub(super) fn upload(name: &str, file_id: &str, category: &str) -> DocumentUpload {
    DocumentUpload {
        name: name.to_string(),
        file_id: file_id.to_string(),
        category: Some(category.to_string()),
        content_type: None,
    }
}

pub(super) type MemoryService = LoanFileService<MemoryRepository, FallbackAssistant>;

pub(super) fn build_service() -> (MemoryService, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = LoanFileService::new(
        repository.clone(),
        Arc::new(FallbackAssistant::default()),
        Arc::new(RequirementCatalog::standard()),
    );
    (service, repository)
}

pub(super) fn service_with<R: LoanRepository + 'static>(
    repository: R,
) -> LoanFileService<R, FallbackAssistant> {
    LoanFileService::new(
        Arc::new(repository),
        Arc::new(FallbackAssistant::default()),
        Arc::new(RequirementCatalog::standard()),
    )
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<LoanId, LoanFile>>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self, id: &LoanId) -> LoanFile {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("loan stored")
    }
}

impl LoanRepository for MemoryRepository {
    fn insert(&self, file: LoanFile) -> Result<LoanFile, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&file.loan.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(file.loan.id.clone(), file.clone());
        Ok(file)
    }

    fn update(&self, file: LoanFile) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&file.loan.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(file.loan.id.clone(), file);
        Ok(())
    }

    fn fetch(&self, id: &LoanId) -> Result<Option<LoanFile>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<LoanFile>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn delete(&self, id: &LoanId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct ConflictRepository;

impl LoanRepository for ConflictRepository {
    fn insert(&self, _file: LoanFile) -> Result<LoanFile, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _file: LoanFile) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &LoanId) -> Result<Option<LoanFile>, RepositoryError> {
        Ok(None)
    }

    fn list(&self) -> Result<Vec<LoanFile>, RepositoryError> {
        Ok(Vec::new())
    }

    fn delete(&self, _id: &LoanId) -> Result<(), RepositoryError> {
        Err(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

impl LoanRepository for UnavailableRepository {
    fn insert(&self, _file: LoanFile) -> Result<LoanFile, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _file: LoanFile) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &LoanId) -> Result<Option<LoanFile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<LoanFile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &LoanId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    loan_router(Arc::new(service))
}
