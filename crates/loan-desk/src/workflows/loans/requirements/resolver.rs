use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use super::catalog::{LenderProfile, Requirement, RequirementCatalog, RequirementCategory};

/// Turns a funder name into the checklist a loan has to satisfy.
///
/// Unknown funders resolve to the common list instead of failing, so a typo in
/// the funder field still produces a usable checklist.
#[derive(Debug, Clone)]
pub struct RequirementResolver {
    catalog: Arc<RequirementCatalog>,
}

/// Requirements sharing a category, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementGroup {
    pub category: RequirementCategory,
    pub category_label: &'static str,
    pub requirements: Vec<Requirement>,
}

impl RequirementResolver {
    pub fn new(catalog: Arc<RequirementCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &RequirementCatalog {
        &self.catalog
    }

    pub fn lender_profile(&self, lender: &str) -> Option<&LenderProfile> {
        self.catalog.lender(lender)
    }

    pub fn resolve(&self, lender: &str) -> Vec<Requirement> {
        let specific = self
            .lender_profile(lender)
            .map(|profile| profile.requirements.as_slice())
            .unwrap_or_default();

        let mut seen = HashSet::new();
        specific
            .iter()
            .chain(self.catalog.common.iter())
            .filter(|requirement| seen.insert(requirement.name.as_str()))
            .cloned()
            .collect()
    }

    pub fn resolve_grouped(&self, lender: &str) -> Vec<RequirementGroup> {
        group_by_category(self.resolve(lender))
    }

    pub fn is_required(&self, lender: &str, name: &str) -> bool {
        self.resolve(lender)
            .iter()
            .any(|requirement| requirement.name == name)
    }
}

pub fn group_by_category(requirements: Vec<Requirement>) -> Vec<RequirementGroup> {
    RequirementCategory::ordered()
        .into_iter()
        .filter_map(|category| {
            let members: Vec<Requirement> = requirements
                .iter()
                .filter(|requirement| requirement.category == category)
                .cloned()
                .collect();
            if members.is_empty() {
                None
            } else {
                Some(RequirementGroup {
                    category,
                    category_label: category.label(),
                    requirements: members,
                })
            }
        })
        .collect()
}
