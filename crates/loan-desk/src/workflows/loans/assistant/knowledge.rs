use super::stage::ProcessStage;

/// Document category the assistant expects every file to carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedCategory {
    pub key: String,
    pub label: String,
}

/// Canned answers for the fallback assistant. Built explicitly and handed to
/// the assistant; nothing here is global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBase {
    pub expected_categories: Vec<ExpectedCategory>,
    pub stage_steps: Vec<(ProcessStage, Vec<String>)>,
    pub dscr_explanation: String,
    pub email_guidance: String,
    pub general_help: String,
}

impl KnowledgeBase {
    pub fn standard() -> Self {
        Self {
            expected_categories: vec![
                expected("borrower", "Borrower Documents"),
                expected("title", "Title Documents"),
                expected("insurance", "Insurance Documents"),
            ],
            stage_steps: vec![
                (
                    ProcessStage::InitialSubmission,
                    strings(&[
                        "Collect borrower ID and entity documents",
                        "Order the appraisal once the term sheet is signed",
                        "Open title and request the preliminary commitment",
                        "Request an insurance quote that names the lender as mortgagee",
                    ]),
                ),
                (
                    ProcessStage::ConditionalApproval,
                    strings(&[
                        "Clear the underwriting conditions on the approval letter",
                        "Confirm the appraisal value supports the loan amount",
                        "Review the title commitment for liens and exceptions",
                        "Get the insurance binder finalized",
                    ]),
                ),
                (
                    ProcessStage::Closing,
                    strings(&[
                        "Confirm the final settlement statement with title",
                        "Verify wiring instructions by phone",
                        "Schedule the signing with the borrower",
                        "Send the closing package to the lender for funding",
                    ]),
                ),
            ],
            dscr_explanation: "DSCR (Debt Service Coverage Ratio) compares a property's income \
                to its debt payments: DSCR = gross monthly rent / monthly PITIA (principal, \
                interest, taxes, insurance and HOA dues). A DSCR of 1.0 means the rent exactly \
                covers the payment. Most DSCR lenders want 1.0 to 1.25 or higher, and a lower \
                ratio usually means a lower maximum LTV or a pricing adjustment."
                .to_string(),
            email_guidance: "I can draft emails for the contacts on this loan. Drafts exist \
                for title (commitment and wiring instructions), insurance (binder \
                requirements), lender payoffs, borrower document requests and general \
                follow-ups."
                .to_string(),
            general_help: "I can help with missing documents, next steps for the current \
                stage, email drafts for your contacts, and questions about DSCR loans."
                .to_string(),
        }
    }

    pub fn steps_for(&self, stage: ProcessStage) -> &[String] {
        self.stage_steps
            .iter()
            .find(|(candidate, _)| *candidate == stage)
            .map(|(_, steps)| steps.as_slice())
            .unwrap_or_default()
    }
}

fn expected(key: &str, label: &str) -> ExpectedCategory {
    ExpectedCategory {
        key: key.to_string(),
        label: label.to_string(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
