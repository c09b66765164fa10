use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::{Contact, Loan};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

/// Placeholder values keyed by token name (without braces).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.values.insert(token.into(), value.into());
    }

    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(token, value);
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    /// Tokens available for a loan; optional fields that are unset are left out
    /// so their placeholders survive rendering.
    pub fn for_loan(loan: &Loan, contact: Option<&Contact>) -> Self {
        let mut context = Self::new()
            .with("BORROWER_NAME", loan.borrower_name.as_str())
            .with(
                "BORROWER_FIRST_NAME",
                loan.borrower_name
                    .split_whitespace()
                    .next()
                    .unwrap_or(&loan.borrower_name),
            )
            .with("PROPERTY_ADDRESS", loan.property_address.as_str())
            .with("LOAN_NUMBER", loan.id.as_str())
            .with("LOAN_TYPE", loan.loan_type.label())
            .with("LOAN_PURPOSE", loan.loan_purpose.label())
            .with("LENDER_NAME", loan.funder.as_str())
            .with("PROCESSOR_NAME", loan.processor.as_str());

        if let Some(entity) = &loan.borrower_entity {
            context.insert("BORROWER_ENTITY", entity.as_str());
        }
        if let Some(amount) = loan.loan_amount {
            context.insert("LOAN_AMOUNT", format_currency(amount));
        }
        if let Some(date) = loan.target_close_date {
            context.insert("TARGET_CLOSE_DATE", date.format("%B %-d, %Y").to_string());
        }
        if let Some(contact) = contact {
            context.insert("CONTACT_NAME", contact.name.as_str());
            context.insert("CONTACT_ROLE", contact.role.label());
            if let Some(company) = &contact.company {
                context.insert("CONTACT_COMPANY", company.as_str());
            }
        }

        context
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

pub fn render(template: &EmailTemplate, context: &TemplateContext) -> EmailTemplate {
    EmailTemplate {
        subject: substitute(&template.subject, context),
        body: substitute(&template.body, context),
    }
}

/// Replaces `{TOKEN}` where TOKEN is `[A-Z0-9_]+` and present in `context`.
/// Everything else, including unknown tokens and stray braces, is copied as-is.
pub fn substitute(input: &str, context: &TemplateContext) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let candidate = &rest[open + 1..];
        match candidate.find('}') {
            Some(close) if is_token(&candidate[..close]) => {
                let token = &candidate[..close];
                match context.get(token) {
                    Some(value) => output.push_str(value),
                    None => {
                        output.push('{');
                        output.push_str(token);
                        output.push('}');
                    }
                }
                rest = &candidate[close + 1..];
            }
            _ => {
                output.push('{');
                rest = candidate;
            }
        }
    }

    output.push_str(rest);
    output
}

fn is_token(raw: &str) -> bool {
    !raw.is_empty()
        && raw
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

pub(crate) fn format_currency(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(subject: &str, body: &str) -> EmailTemplate {
        EmailTemplate {
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn render_substitutes_known_tokens() {
        let context: TemplateContext = [
            ("BORROWER_NAME", "Dana Whitfield"),
            ("LOAN_NUMBER", "loan-000042"),
        ]
        .into_iter()
        .collect();

        let rendered = render(
            &template(
                "Loan {LOAN_NUMBER}",
                "Hi {BORROWER_NAME}, loan {LOAN_NUMBER} is moving.",
            ),
            &context,
        );

        assert_eq!(rendered.subject, "Loan loan-000042");
        assert_eq!(
            rendered.body,
            "Hi Dana Whitfield, loan loan-000042 is moving."
        );
    }

    #[test]
    fn render_with_empty_context_is_identity() {
        let original = template(
            "{PROPERTY_ADDRESS} update",
            "Dear {CONTACT_NAME},\n{ {lower} {} {UNCLOSED",
        );
        assert_eq!(render(&original, &TemplateContext::new()), original);
    }

    #[test]
    fn unresolved_tokens_survive_partial_context() {
        let context = TemplateContext::new().with("BORROWER_NAME", "Dana");
        let rendered = substitute("{BORROWER_NAME} / {LOAN_AMOUNT}", &context);
        assert_eq!(rendered, "Dana / {LOAN_AMOUNT}");
    }

    #[test]
    fn values_are_not_rescanned() {
        let context = TemplateContext::new()
            .with("A", "{B}")
            .with("B", "nested");
        assert_eq!(substitute("{A}", &context), "{B}");
    }

    #[test]
    fn handles_braces_around_tokens() {
        let context = TemplateContext::new().with("X", "1");
        assert_eq!(substitute("{{X}}", &context), "{1}");
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0), "$0");
        assert_eq!(format_currency(950), "$950");
        assert_eq!(format_currency(1_250_000), "$1,250,000");
        assert_eq!(format_currency(12_500), "$12,500");
    }
}
