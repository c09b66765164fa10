//! Funder requirement tables and the resolver that flattens them into a checklist.

mod catalog;
mod resolver;

pub use catalog::{
    normalize_lender_key, CatalogError, LenderProfile, Requirement, RequirementCatalog,
    RequirementCategory,
};
pub use resolver::{group_by_category, RequirementGroup, RequirementResolver};
