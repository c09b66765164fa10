use super::domain::{LoanFile, LoanId};

/// Storage abstraction so the service can be exercised without a database.
/// Updates replace the whole file; the last writer wins.
pub trait LoanRepository: Send + Sync {
    fn insert(&self, file: LoanFile) -> Result<LoanFile, RepositoryError>;
    fn update(&self, file: LoanFile) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LoanId) -> Result<Option<LoanFile>, RepositoryError>;
    fn list(&self) -> Result<Vec<LoanFile>, RepositoryError>;
    fn delete(&self, id: &LoanId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
