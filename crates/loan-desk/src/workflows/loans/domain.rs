use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_type!(
    /// Identifier wrapper for loan files; doubles as the loan number in emails.
    LoanId
);
id_type!(ContactId);
id_type!(DocumentId);
id_type!(TaskId);
id_type!(MessageId);

/// Product the borrower is applying for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    Dscr,
    FixAndFlip,
    Bridge,
    GroundUp,
    #[serde(other)]
    Other,
}

impl LoanType {
    pub const fn label(self) -> &'static str {
        match self {
            LoanType::Dscr => "DSCR Rental",
            LoanType::FixAndFlip => "Fix & Flip",
            LoanType::Bridge => "Bridge",
            LoanType::GroundUp => "Ground-Up Construction",
            LoanType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPurpose {
    Purchase,
    Refinance,
    CashOutRefinance,
    #[serde(other)]
    Other,
}

impl LoanPurpose {
    pub const fn label(self) -> &'static str {
        match self {
            LoanPurpose::Purchase => "Purchase",
            LoanPurpose::Refinance => "Refinance",
            LoanPurpose::CashOutRefinance => "Cash-Out Refinance",
            LoanPurpose::Other => "Other",
        }
    }

    /// Verb phrase used when describing the transaction to third parties.
    pub const fn activity(purpose: Option<Self>) -> &'static str {
        match purpose {
            Some(LoanPurpose::Purchase) => "purchasing",
            Some(LoanPurpose::Refinance) | Some(LoanPurpose::CashOutRefinance) => "refinancing",
            _ => "purchasing/refinancing",
        }
    }
}

/// Soft lifecycle state; loans are normally parked rather than deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Active,
    OnHold,
    Funded,
    Withdrawn,
}

impl LoanStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::OnHold => "on_hold",
            LoanStatus::Funded => "funded",
            LoanStatus::Withdrawn => "withdrawn",
        }
    }
}

/// Loan-level metadata plus the checklist state persisted with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub processor: String,
    pub borrower_name: String,
    pub borrower_entity: Option<String>,
    pub property_address: String,
    pub loan_amount: Option<u64>,
    pub loan_type: LoanType,
    pub loan_purpose: LoanPurpose,
    pub funder: String,
    pub target_close_date: Option<NaiveDate>,
    pub status: LoanStatus,
    #[serde(default)]
    pub completed_requirements: BTreeSet<String>,
    #[serde(default)]
    pub requirement_documents: BTreeMap<String, Vec<DocumentId>>,
    pub created_at: DateTime<Utc>,
}

/// Payload accepted on loan intake before the guard turns it into a `Loan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanIntake {
    pub processor: String,
    pub borrower_name: String,
    #[serde(default)]
    pub borrower_entity: Option<String>,
    pub property_address: String,
    #[serde(default)]
    pub loan_amount: Option<u64>,
    pub loan_type: LoanType,
    pub loan_purpose: LoanPurpose,
    pub funder: String,
    #[serde(default)]
    pub target_close_date: Option<NaiveDate>,
}

/// Partial edit of a loan after intake. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanUpdate {
    pub processor: Option<String>,
    pub borrower_name: Option<String>,
    pub borrower_entity: Option<String>,
    pub property_address: Option<String>,
    pub loan_amount: Option<u64>,
    pub loan_type: Option<LoanType>,
    pub loan_purpose: Option<LoanPurpose>,
    pub funder: Option<String>,
    pub target_close_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactRole {
    Borrower,
    Title,
    Insurance,
    Lender,
    Analyst,
    Appraiser,
    Attorney,
    #[serde(other)]
    Other,
}

impl ContactRole {
    pub const fn label(self) -> &'static str {
        match self {
            ContactRole::Borrower => "Borrower",
            ContactRole::Title => "Title",
            ContactRole::Insurance => "Insurance",
            ContactRole::Lender => "Lender",
            ContactRole::Analyst => "Analyst",
            ContactRole::Appraiser => "Appraiser",
            ContactRole::Attorney => "Attorney",
            ContactRole::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub role: ContactRole,
}

impl Contact {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    pub role: ContactRole,
}

/// Uploaded file metadata. Deleted rows are kept so re-uploads can be flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub file_id: String,
    pub category: Option<String>,
    pub content_type: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn is_active(&self) -> bool {
        !self.deleted
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub name: String,
    pub file_id: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: TaskPriority,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub description: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: TaskPriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Repository record: a loan together with everything that belongs to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanFile {
    pub loan: Loan,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl LoanFile {
    pub fn new(loan: Loan) -> Self {
        Self {
            loan,
            contacts: Vec::new(),
            documents: Vec::new(),
            tasks: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn active_documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().filter(|document| document.is_active())
    }

    pub fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|document| &document.id == id)
    }

    pub fn contact(&self, id: &ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|contact| &contact.id == id)
    }

    pub fn completed_task_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }
}
