//! Outbound email drafting: token templates and role-based openers.

mod roles;
mod template;

pub use roles::generate_email_template;
pub use template::{render, substitute, EmailTemplate, TemplateContext};
pub(crate) use template::format_currency;
