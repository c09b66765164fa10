use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Section of the checklist a requirement is rendered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementCategory {
    BorrowerEntity,
    Financials,
    Property,
    Appraisal,
    Title,
    Insurance,
    Payoff,
    LenderSpecific,
}

impl RequirementCategory {
    pub fn ordered() -> [RequirementCategory; 8] {
        [
            RequirementCategory::BorrowerEntity,
            RequirementCategory::Financials,
            RequirementCategory::Property,
            RequirementCategory::Appraisal,
            RequirementCategory::Title,
            RequirementCategory::Insurance,
            RequirementCategory::Payoff,
            RequirementCategory::LenderSpecific,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            RequirementCategory::BorrowerEntity => "Borrower & Entity",
            RequirementCategory::Financials => "Financials",
            RequirementCategory::Property => "Property",
            RequirementCategory::Appraisal => "Appraisal",
            RequirementCategory::Title => "Title",
            RequirementCategory::Insurance => "Insurance",
            RequirementCategory::Payoff => "Payoff",
            RequirementCategory::LenderSpecific => "Lender Specific",
        }
    }
}

/// A named document or attestation a funder wants before closing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub category: RequirementCategory,
}

impl Requirement {
    pub fn new(name: impl Into<String>, category: RequirementCategory) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

/// Funder entry: a canonical key, the aliases processors type, and its own table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LenderProfile {
    pub key: String,
    pub display_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub requirements: Vec<Requirement>,
}

impl LenderProfile {
    /// Key, display name and aliases, all normalized.
    pub fn spellings(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(self.key.as_str())
            .chain(std::iter::once(self.display_name.as_str()))
            .chain(self.aliases.iter().map(String::as_str))
            .map(normalize_lender_key)
            .filter(|spelling| !spelling.is_empty())
    }

    pub(crate) fn matches(&self, normalized: &str) -> bool {
        self.spellings().any(|spelling| spelling == normalized)
    }
}

/// Per-lender requirement tables plus the list every loan needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementCatalog {
    pub lenders: Vec<LenderProfile>,
    pub common: Vec<Requirement>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to read requirement catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("requirement catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("lender entry #{index} has a blank key")]
    MissingLenderKey { index: usize },
    #[error("lender spelling '{spelling}' is claimed by both '{first}' and '{second}'")]
    AmbiguousLender {
        spelling: String,
        first: String,
        second: String,
    },
    #[error("lender '{lender}' lists requirement '{name}' more than once")]
    DuplicateRequirement { lender: String, name: String },
}

impl RequirementCatalog {
    pub fn standard() -> Self {
        Self {
            lenders: standard_lenders(),
            common: common_requirements(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let catalog: RequirementCatalog = serde_json::from_reader(reader)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut owners: HashMap<String, (usize, &str)> = HashMap::new();
        for (index, lender) in self.lenders.iter().enumerate() {
            if lender.key.trim().is_empty() {
                return Err(CatalogError::MissingLenderKey { index });
            }
            ensure_unique(&lender.key, &lender.requirements)?;

            for spelling in lender.spellings() {
                match owners.get(&spelling) {
                    Some(&(owner, first)) if owner != index => {
                        return Err(CatalogError::AmbiguousLender {
                            spelling,
                            first: first.to_string(),
                            second: lender.key.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        owners.insert(spelling, (index, lender.key.as_str()));
                    }
                }
            }
        }
        ensure_unique("common", &self.common)
    }

    pub fn lender(&self, raw: &str) -> Option<&LenderProfile> {
        let normalized = normalize_lender_key(raw);
        if normalized.is_empty() {
            return None;
        }
        self.lenders.iter().find(|lender| lender.matches(&normalized))
    }
}

fn ensure_unique(lender: &str, requirements: &[Requirement]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for requirement in requirements {
        if !seen.insert(requirement.name.as_str()) {
            return Err(CatalogError::DuplicateRequirement {
                lender: lender.to_string(),
                name: requirement.name.clone(),
            });
        }
    }
    Ok(())
}

/// Lowercases and folds spaces/hyphens so "Roc Capital" and "roc-capital" agree.
pub fn normalize_lender_key(raw: &str) -> String {
    raw.trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

fn common_requirements() -> Vec<Requirement> {
    use RequirementCategory::*;
    vec![
        Requirement::new("Driver's License", BorrowerEntity),
        Requirement::new("Articles of Organization", BorrowerEntity),
        Requirement::new("Operating Agreement", BorrowerEntity),
        Requirement::new("EIN Letter", BorrowerEntity),
        Requirement::new("Bank Statements (2 Months)", Financials),
        Requirement::new("Purchase Contract", Property),
        Requirement::new("Appraisal Report", Appraisal),
        Requirement::new("Title Commitment", Title),
        Requirement::new("Evidence of Insurance", Insurance),
    ]
}

fn standard_lenders() -> Vec<LenderProfile> {
    use RequirementCategory::*;
    vec![
        LenderProfile {
            key: "kiavi".to_string(),
            display_name: "Kiavi".to_string(),
            aliases: vec!["kiavi funding".to_string(), "lendinghome".to_string()],
            requirements: vec![
                Requirement::new("Kiavi Loan Application", LenderSpecific),
                Requirement::new("Driver's License", BorrowerEntity),
            ],
        },
        LenderProfile {
            key: "ahl".to_string(),
            display_name: "AHL".to_string(),
            aliases: vec!["american heritage lending".to_string()],
            requirements: vec![
                Requirement::new("AHL Loan Application", LenderSpecific),
                Requirement::new("Real Estate Owned Schedule", Financials),
                Requirement::new("Scope of Work", Property),
                Requirement::new("Certificate of Good Standing", BorrowerEntity),
            ],
        },
        LenderProfile {
            key: "visio".to_string(),
            display_name: "Visio Lending".to_string(),
            aliases: vec!["visio lending".to_string()],
            requirements: vec![
                Requirement::new("Visio Term Sheet", LenderSpecific),
                Requirement::new("Lease Agreements", Property),
                Requirement::new("Rent Roll", Property),
                Requirement::new("Payoff Statement", Payoff),
                Requirement::new("Appraisal Report", Appraisal),
            ],
        },
        LenderProfile {
            key: "roc_capital".to_string(),
            display_name: "Roc Capital".to_string(),
            aliases: vec!["roc".to_string(), "roc360".to_string()],
            requirements: vec![
                Requirement::new("Roc Capital Credit Authorization", LenderSpecific),
                Requirement::new("Background Check Authorization", LenderSpecific),
                Requirement::new("Construction Budget", Property),
                Requirement::new("Certificate of Good Standing", BorrowerEntity),
            ],
        },
        LenderProfile {
            key: "velocity".to_string(),
            display_name: "Velocity Mortgage Capital".to_string(),
            aliases: vec!["velocity mortgage".to_string()],
            requirements: vec![
                Requirement::new("Velocity Loan Application", LenderSpecific),
                Requirement::new("Personal Financial Statement", Financials),
                Requirement::new("Mortgage Statement", Payoff),
                Requirement::new("Flood Certificate", Insurance),
                Requirement::new("Lease Agreements", Property),
            ],
        },
    ]
}
