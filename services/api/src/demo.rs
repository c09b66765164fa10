use crate::infra::{build_service, parse_date, DeskService};
use chrono::{Local, NaiveDate};
use clap::Args;
use loan_desk::config::AppConfig;
use loan_desk::error::AppError;
use loan_desk::workflows::loans::{
    ChecklistView, ContactDraft, ContactRole, DocumentUpload, EmailTemplate, LoanIntake,
    LoanPurpose, LoanType, TaskDraft, TaskPriority,
};
use std::fmt::Write as _;
use std::io::Write;

#[derive(Args, Debug)]
pub(crate) struct ChecklistArgs {
    /// Funder name or alias, e.g. "Kiavi" or "roc360"
    #[arg(long)]
    pub(crate) lender: String,
    /// Requirement to mark complete before printing; may be repeated
    #[arg(long)]
    pub(crate) completed: Vec<String>,
    /// Write the checklist as CSV to stdout
    #[arg(long)]
    pub(crate) csv: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Funder for the sample loan
    #[arg(long, default_value = "Kiavi")]
    pub(crate) lender: String,
    /// Target close date (YYYY-MM-DD). Defaults to 30 days from today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) close_date: Option<NaiveDate>,
    /// Skip the assistant portion of the demo.
    #[arg(long)]
    pub(crate) skip_chat: bool,
}

pub(crate) fn run_checklist(args: ChecklistArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config)?;
    write_checklist(&service, &args, std::io::stdout().lock())
}

/// Builds a throwaway loan for the lender, applies `--completed`, and writes
/// the checklist as text or CSV.
pub(crate) fn write_checklist<W: Write>(
    service: &DeskService,
    args: &ChecklistArgs,
    mut out: W,
) -> Result<(), AppError> {
    let file = service.create_loan(LoanIntake {
        processor: "cli".to_string(),
        borrower_name: "Checklist Preview".to_string(),
        borrower_entity: None,
        property_address: "N/A".to_string(),
        loan_amount: None,
        loan_type: LoanType::Other,
        loan_purpose: LoanPurpose::Other,
        funder: args.lender.clone(),
        target_close_date: None,
    })?;
    for requirement in &args.completed {
        service.mark_complete(&file.loan.id, requirement)?;
    }
    let view = service.checklist(&file.loan.id)?;

    if args.csv {
        view.write_csv(out)?;
    } else {
        out.write_all(render_checklist(&view).as_bytes())?;
    }
    Ok(())
}

pub(crate) fn render_checklist(view: &ChecklistView) -> String {
    let mut out = String::new();
    let matched = if view.lender_matched {
        "lender matched"
    } else {
        "unknown lender, common items only"
    };
    let _ = writeln!(
        out,
        "{} checklist ({}): {}/{} complete ({}%)",
        view.funder, matched, view.completed, view.total, view.percent_complete
    );
    for section in &view.sections {
        let _ = writeln!(out, "{}", section.category_label);
        for item in &section.items {
            let mark = if item.complete { "x" } else { " " };
            let _ = write!(out, "  [{mark}] {}", item.name);
            if !item.documents.is_empty() {
                let names: Vec<&str> = item
                    .documents
                    .iter()
                    .map(|document| document.name.as_str())
                    .collect();
                let _ = write!(out, " <- {}", names.join(", "));
            }
            out.push('\n');
        }
    }
    out
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        lender,
        close_date,
        skip_chat,
    } = args;

    let config = AppConfig::load()?;
    let service = build_service(&config)?;
    let close_date =
        close_date.unwrap_or_else(|| Local::now().date_naive() + chrono::Duration::days(30));

    println!("Loan desk demo");
    let file = service.create_loan(LoanIntake {
        processor: "Avery Chen".to_string(),
        borrower_name: "Dana Whitfield".to_string(),
        borrower_entity: Some("Harbor View Holdings LLC".to_string()),
        property_address: "1420 Harbor View Dr, Tampa, FL 33602".to_string(),
        loan_amount: Some(412_500),
        loan_type: LoanType::Dscr,
        loan_purpose: LoanPurpose::Purchase,
        funder: lender,
        target_close_date: Some(close_date),
    })?;
    let loan_id = file.loan.id.clone();
    println!(
        "- Opened {} for {} with {} (target close {})",
        loan_id, file.loan.borrower_name, file.loan.funder, close_date
    );

    let title = service.add_contact(
        &loan_id,
        ContactDraft {
            name: "Morgan Reyes".to_string(),
            email: Some("morgan@gulftitle.com".to_string()),
            phone: Some("813-555-0140".to_string()),
            company: Some("Gulf Title".to_string()),
            role: ContactRole::Title,
        },
    )?;
    service.add_contact(
        &loan_id,
        ContactDraft {
            name: "Priya Shah".to_string(),
            email: Some("priya@coastalins.com".to_string()),
            phone: None,
            company: Some("Coastal Insurance".to_string()),
            role: ContactRole::Insurance,
        },
    )?;

    let license = service.add_document(
        &loan_id,
        DocumentUpload {
            name: "Drivers License.pdf".to_string(),
            file_id: "drive-license".to_string(),
            category: Some("borrower".to_string()),
            content_type: None,
        },
    )?;
    let reupload = service.add_document(
        &loan_id,
        DocumentUpload {
            name: "drivers license.pdf".to_string(),
            file_id: "drive-license-2".to_string(),
            category: Some("borrower".to_string()),
            content_type: None,
        },
    )?;
    if let Some(original) = &reupload.duplicate_of {
        println!(
            "- Upload {} looks like a duplicate of {}",
            reupload.document.id, original
        );
    }

    service.assign_document(&loan_id, "Driver's License", &license.document.id)?;
    service.mark_complete(&loan_id, "Driver's License")?;
    service.add_task(
        &loan_id,
        TaskDraft {
            description: "Order appraisal".to_string(),
            due_date: Some(close_date - chrono::Duration::days(14)),
            priority: TaskPriority::High,
        },
    )?;

    println!();
    print!("{}", render_checklist(&service.checklist(&loan_id)?));

    let draft = service.draft_email(&loan_id, &title.id)?;
    println!("\nOpening email to {}", title.name);
    println!("Subject: {}", draft.subject);
    println!("{}", draft.body);

    let reminder = service.render_email(
        &loan_id,
        &EmailTemplate {
            subject: "{LOAN_NUMBER}: closing {TARGET_CLOSE_DATE}".to_string(),
            body: "Hi {BORROWER_FIRST_NAME}, we are on track for {LENDER_NAME} to fund \
                   {LOAN_AMOUNT} on {TARGET_CLOSE_DATE}."
                .to_string(),
        },
        None,
    )?;
    println!("\nRendered reminder");
    println!("Subject: {}", reminder.subject);
    println!("{}", reminder.body);

    if skip_chat {
        return Ok(());
    }

    println!("\nAssistant");
    for question in [
        "What documents are still missing?",
        "What should I email the title agent?",
        "What are the next steps?",
        "How is DSCR calculated?",
    ] {
        let exchange = service.chat(&loan_id, question)?;
        println!("> {question}");
        println!("[{:?} / {}]", exchange.intent, exchange.stage.label());
        println!("{}\n", exchange.reply.content);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_desk::config::{
        AppEnvironment, AssistantConfig, CatalogConfig, ServerConfig, TelemetryConfig,
    };
    use loan_desk::workflows::loans::{ChecklistError, LoanServiceError};

    fn service() -> DeskService {
        let config = AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
            catalog: CatalogConfig::default(),
            assistant: AssistantConfig::default(),
        };
        build_service(&config).expect("service builds")
    }

    fn args(lender: &str, completed: &[&str], csv: bool) -> ChecklistArgs {
        ChecklistArgs {
            lender: lender.to_string(),
            completed: completed.iter().map(|name| name.to_string()).collect(),
            csv,
        }
    }

    fn output(args: &ChecklistArgs) -> String {
        let mut out = Vec::new();
        write_checklist(&service(), args, &mut out).expect("checklist written");
        String::from_utf8(out).expect("utf-8 output")
    }

    #[test]
    fn text_checklist_marks_completed_items() {
        let text = output(&args("Kiavi", &["Driver's License"], false));

        assert!(text.starts_with("Kiavi checklist (lender matched): 1/10 complete (10%)"));
        assert!(text.contains("Borrower & Entity\n  [x] Driver's License\n"));
        assert!(text.contains("  [ ] Kiavi Loan Application"));
    }

    #[test]
    fn text_checklist_flags_unknown_lender() {
        let text = output(&args("Nobody Lending", &[], false));

        assert!(text.contains("unknown lender, common items only): 0/9 complete (0%)"));
    }

    #[test]
    fn csv_checklist_has_header_and_completion_column() {
        let csv = output(&args("roc360", &["Driver's License"], true));
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some("category,requirement,complete,documents")
        );
        assert!(csv.contains("Borrower & Entity,Driver's License,true,"));
        assert!(csv.contains("Lender Specific,Roc Capital Credit Authorization,false,"));
    }

    #[test]
    fn unknown_completed_name_is_an_error() {
        let mut out = Vec::new();
        let result = write_checklist(&service(), &args("Kiavi", &["Rent Roll"], false), &mut out);

        assert!(matches!(
            result,
            Err(AppError::Loan(LoanServiceError::Checklist(
                ChecklistError::UnknownRequirement { .. }
            )))
        ));
        assert!(out.is_empty());
    }
}
