use chrono::NaiveDate;
use loan_desk::config::AppConfig;
use loan_desk::error::AppError;
use loan_desk::workflows::loans::{
    FallbackAssistant, IntentClassifier, KnowledgeBase, LoanFile, LoanFileService, LoanId,
    LoanRepository, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

pub(crate) type DeskService = LoanFileService<InMemoryLoanRepository, FallbackAssistant>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLoanRepository {
    records: Arc<Mutex<HashMap<LoanId, LoanFile>>>,
}

impl LoanRepository for InMemoryLoanRepository {
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
        if guard.contains_key(&file.loan.id) {
            guard.insert(file.loan.id.clone(), file);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
        match guard.remove(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }
}

/// Wires the configured catalog and intent priority into a service backed by
/// the in-memory repository.
pub(crate) fn build_service(config: &AppConfig) -> Result<DeskService, AppError> {
    let catalog = config.catalog.load()?;
    let assistant = FallbackAssistant::new(
        KnowledgeBase::standard(),
        IntentClassifier::with_priority(&config.assistant.intent_priority),
    );

    Ok(LoanFileService::new(
        Arc::new(InMemoryLoanRepository::default()),
        Arc::new(assistant),
        Arc::new(catalog),
    ))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
