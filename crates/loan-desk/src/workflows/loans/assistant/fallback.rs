use std::fmt::Write as _;

use super::super::domain::LoanType;
use super::context::LoanContext;
use super::intent::{Intent, IntentClassifier};
use super::knowledge::KnowledgeBase;
use super::stage::ProcessStage;
use super::{AssistantError, AssistantReply, ChatResponder};
use crate::workflows::loans::email::format_currency;

const OPEN_TASK_PREVIEW: usize = 3;

/// Keyword responder used whenever no model backend is configured.
#[derive(Debug, Clone)]
pub struct FallbackAssistant {
    knowledge: KnowledgeBase,
    classifier: IntentClassifier,
}

impl Default for FallbackAssistant {
    fn default() -> Self {
        Self::new(KnowledgeBase::standard(), IntentClassifier::default())
    }
}

impl FallbackAssistant {
    pub fn new(knowledge: KnowledgeBase, classifier: IntentClassifier) -> Self {
        Self {
            knowledge,
            classifier,
        }
    }

    /// Expected category labels with no matching document on file.
    pub fn missing_categories(&self, context: &LoanContext) -> Vec<&str> {
        self.knowledge
            .expected_categories
            .iter()
            .filter(|expected| !context.document_categories.contains(&expected.key))
            .map(|expected| expected.label.as_str())
            .collect()
    }

    fn documents_reply(&self, context: &LoanContext) -> String {
        let missing = self.missing_categories(context);
        if missing.is_empty() {
            return format!(
                "{} has borrower, title and insurance documents on file ({} active documents). \
                 Check the {} checklist for any lender-specific items still open.",
                context.borrower_name, context.document_count, context.funder
            );
        }

        let mut reply = format!(
            "For {}'s loan with {} the file is still missing:\n",
            context.borrower_name, context.funder
        );
        for label in missing {
            let _ = writeln!(reply, "- {label}");
        }
        let _ = write!(
            reply,
            "Upload these and assign them on the {} checklist to keep the file moving.",
            context.funder
        );
        reply
    }

    fn process_reply(&self, context: &LoanContext, stage: ProcessStage) -> String {
        let mut reply = format!(
            "{}'s loan is in the {} stage ({} documents, {} completed tasks). Next steps:\n",
            context.borrower_name,
            stage.label(),
            context.document_count,
            context.completed_task_count
        );
        for step in self.knowledge.steps_for(stage) {
            let _ = writeln!(reply, "- {step}");
        }
        if !context.open_tasks.is_empty() {
            reply.push_str("Open tasks on this file:\n");
            for task in context.open_tasks.iter().take(OPEN_TASK_PREVIEW) {
                let _ = writeln!(reply, "- {task}");
            }
        }
        reply.trim_end().to_string()
    }

    fn email_reply(&self, context: &LoanContext) -> String {
        let mut reply = self.knowledge.email_guidance.clone();
        if context.contacts.is_empty() {
            reply.push_str(
                "\nThere are no contacts on this loan yet. Add the title, insurance or \
                 lender contact first and I will tailor the draft to their role.",
            );
        } else {
            reply.push_str("\nContacts on this loan:");
            for (name, role) in &context.contacts {
                let _ = write!(reply, "\n- {name} ({})", role.label());
            }
        }
        reply
    }

    fn dscr_reply(&self, context: &LoanContext) -> String {
        let mut reply = self.knowledge.dscr_explanation.clone();
        if context.loan_type == LoanType::Dscr {
            let _ = write!(
                reply,
                "\nThis is a DSCR loan with {}, so it will be sized on the rent at {}.",
                context.funder, context.property_address
            );
        }
        reply
    }

    fn general_reply(&self, context: &LoanContext) -> String {
        let amount = context
            .loan_amount
            .map(|amount| format!(" for {}", format_currency(amount)))
            .unwrap_or_default();
        format!(
            "{} loan {}{} with {} on {} ({}). {}",
            context.loan_type.label(),
            context.loan_id,
            amount,
            context.funder,
            context.property_address,
            context.borrower_name,
            self.knowledge.general_help
        )
    }
}

impl ChatResponder for FallbackAssistant {
    fn respond(
        &self,
        context: &LoanContext,
        query: &str,
    ) -> Result<AssistantReply, AssistantError> {
        if query.trim().is_empty() {
            return Err(AssistantError::EmptyQuery);
        }

        let intent = self.classifier.classify(query);
        let stage = ProcessStage::infer(context.document_count, context.completed_task_count);
        let content = match intent {
            Intent::Documents => self.documents_reply(context),
            Intent::Process => self.process_reply(context, stage),
            Intent::EmailTemplate => self.email_reply(context),
            Intent::Dscr => self.dscr_reply(context),
            Intent::General => self.general_reply(context),
        };

        Ok(AssistantReply {
            content,
            intent,
            stage,
        })
    }
}
