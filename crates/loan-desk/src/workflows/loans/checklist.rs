use std::io::Write;

use serde::Serialize;

use super::domain::{Document, DocumentId, Loan, LoanFile};
use super::requirements::{Requirement, RequirementCategory};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChecklistError {
    #[error("'{name}' is not on the {lender} checklist")]
    UnknownRequirement { lender: String, name: String },
    #[error("document {0} does not exist or was deleted")]
    UnknownDocument(DocumentId),
}

/// Completion tracking and document assignment. These are the unchecked
/// primitives; `LoanFile` layers the membership checks on top.
impl Loan {
    pub fn is_complete(&self, requirement: &str) -> bool {
        self.completed_requirements.contains(requirement)
    }

    pub fn mark_complete(&mut self, requirement: &str) -> bool {
        self.completed_requirements.insert(requirement.to_string())
    }

    pub fn mark_incomplete(&mut self, requirement: &str) -> bool {
        self.completed_requirements.remove(requirement)
    }

    /// Share of `resolved` marked complete, rounded half up. Completed names that
    /// are no longer on the checklist (e.g. after a funder change) do not count.
    pub fn percent_complete(&self, resolved: &[Requirement]) -> u8 {
        let total = resolved.len();
        if total == 0 {
            return 0;
        }
        let done = resolved
            .iter()
            .filter(|requirement| self.is_complete(&requirement.name))
            .count();
        ((200 * done + total) / (2 * total)) as u8
    }

    pub fn documents_for(&self, requirement: &str) -> &[DocumentId] {
        self.requirement_documents
            .get(requirement)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn assign(&mut self, requirement: &str, document: &DocumentId) -> bool {
        let assigned = self
            .requirement_documents
            .entry(requirement.to_string())
            .or_default();
        if assigned.contains(document) {
            return false;
        }
        assigned.push(document.clone());
        true
    }

    pub fn unassign(&mut self, requirement: &str, document: &DocumentId) -> bool {
        let Some(assigned) = self.requirement_documents.get_mut(requirement) else {
            return false;
        };
        let before = assigned.len();
        assigned.retain(|id| id != document);
        let removed = assigned.len() != before;
        if assigned.is_empty() {
            self.requirement_documents.remove(requirement);
        }
        removed
    }

    pub fn unassign_everywhere(&mut self, document: &DocumentId) {
        self.requirement_documents
            .values_mut()
            .for_each(|assigned| assigned.retain(|id| id != document));
        self.requirement_documents
            .retain(|_, assigned| !assigned.is_empty());
    }

    /// Display-only: a document row is highlighted once any requirement it
    /// backs has been marked complete.
    pub fn is_document_highlighted(&self, document: &DocumentId) -> bool {
        self.requirement_documents
            .iter()
            .any(|(requirement, assigned)| {
                assigned.contains(document) && self.is_complete(requirement)
            })
    }
}

impl LoanFile {
    pub fn complete_requirement(
        &mut self,
        requirement: &str,
        resolved: &[Requirement],
    ) -> Result<bool, ChecklistError> {
        self.ensure_on_checklist(requirement, resolved)?;
        Ok(self.loan.mark_complete(requirement))
    }

    pub fn assign_document(
        &mut self,
        requirement: &str,
        document: &DocumentId,
        resolved: &[Requirement],
    ) -> Result<bool, ChecklistError> {
        self.ensure_on_checklist(requirement, resolved)?;
        if !self.active_documents().any(|doc| &doc.id == document) {
            return Err(ChecklistError::UnknownDocument(document.clone()));
        }
        Ok(self.loan.assign(requirement, document))
    }

    fn ensure_on_checklist(
        &self,
        requirement: &str,
        resolved: &[Requirement],
    ) -> Result<(), ChecklistError> {
        if resolved.iter().any(|entry| entry.name == requirement) {
            Ok(())
        } else {
            Err(ChecklistError::UnknownRequirement {
                lender: self.loan.funder.clone(),
                name: requirement.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedDocumentView {
    pub id: DocumentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItemView {
    pub name: String,
    pub complete: bool,
    pub documents: Vec<AssignedDocumentView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistSectionView {
    pub category: RequirementCategory,
    pub category_label: &'static str,
    pub items: Vec<ChecklistItemView>,
}

/// Checklist as rendered on the loan page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistView {
    pub funder: String,
    pub lender_matched: bool,
    pub completed: usize,
    pub total: usize,
    pub percent_complete: u8,
    pub sections: Vec<ChecklistSectionView>,
    pub highlighted_documents: Vec<DocumentId>,
}

#[derive(Serialize)]
struct ChecklistCsvRow<'a> {
    category: &'static str,
    requirement: &'a str,
    complete: bool,
    documents: String,
}

impl ChecklistView {
    pub fn build(
        loan: &Loan,
        documents: &[Document],
        resolved: &[Requirement],
        lender_matched: bool,
    ) -> Self {
        let document_name = |id: &DocumentId| {
            documents
                .iter()
                .find(|document| &document.id == id && document.is_active())
                .map(|document| AssignedDocumentView {
                    id: id.clone(),
                    name: document.name.clone(),
                })
        };

        let sections = RequirementCategory::ordered()
            .into_iter()
            .filter_map(|category| {
                let items: Vec<ChecklistItemView> = resolved
                    .iter()
                    .filter(|requirement| requirement.category == category)
                    .map(|requirement| ChecklistItemView {
                        name: requirement.name.clone(),
                        complete: loan.is_complete(&requirement.name),
                        documents: loan
                            .documents_for(&requirement.name)
                            .iter()
                            .filter_map(|id| document_name(id))
                            .collect(),
                    })
                    .collect();
                (!items.is_empty()).then(|| ChecklistSectionView {
                    category,
                    category_label: category.label(),
                    items,
                })
            })
            .collect();

        let highlighted_documents = documents
            .iter()
            .filter(|document| document.is_active() && loan.is_document_highlighted(&document.id))
            .map(|document| document.id.clone())
            .collect();

        Self {
            funder: loan.funder.clone(),
            lender_matched,
            completed: resolved
                .iter()
                .filter(|requirement| loan.is_complete(&requirement.name))
                .count(),
            total: resolved.len(),
            percent_complete: loan.percent_complete(resolved),
            sections,
            highlighted_documents,
        }
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv = csv::Writer::from_writer(writer);
        for section in &self.sections {
            for item in &section.items {
                csv.serialize(ChecklistCsvRow {
                    category: section.category_label,
                    requirement: &item.name,
                    complete: item.complete,
                    documents: item
                        .documents
                        .iter()
                        .map(|document| document.name.as_str())
                        .collect::<Vec<_>>()
                        .join("; "),
                })?;
            }
        }
        csv.flush()?;
        Ok(())
    }
}
