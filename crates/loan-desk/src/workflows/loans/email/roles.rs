use super::super::domain::{Contact, ContactRole, LoanPurpose};
use super::template::EmailTemplate;

/// Opening draft for a contact, picked by the contact's role.
///
/// Unlike [`super::render`], these templates interpolate directly; there are no
/// placeholders left for the processor to fill in.
pub fn generate_email_template(
    contact: &Contact,
    property_address: &str,
    borrower_name: &str,
    purpose: Option<LoanPurpose>,
) -> EmailTemplate {
    let greeting = contact.first_name();
    let activity = LoanPurpose::activity(purpose);

    match contact.role {
        ContactRole::Title => EmailTemplate {
            subject: format!("Title Request - {property_address}"),
            body: format!(
                "Hi {greeting},\n\n\
                 We are working with {borrower_name} on a loan for the property at \
                 {property_address}; the borrower is {activity} the property.\n\n\
                 Could you please send over the following:\n\
                 - Preliminary title commitment\n\
                 - Closing protection letter\n\
                 - Wiring instructions\n\
                 - Estimated settlement statement\n\n\
                 Please let us know if you need anything from our side to open the order.\n\n\
                 Thank you,"
            ),
        },
        ContactRole::Insurance => EmailTemplate {
            subject: format!("Insurance Requirements - {property_address}"),
            body: format!(
                "Hi {greeting},\n\n\
                 {borrower_name} is {activity} the property at {property_address} and we \
                 need an insurance binder that meets the lender's requirements:\n\
                 - Dwelling coverage at least equal to the loan amount or replacement cost\n\
                 - Liability coverage of at least $500,000\n\
                 - Rent loss coverage for rental properties\n\
                 - Mortgagee clause naming the lender, its successors and/or assigns\n\
                 - Deductible no greater than $5,000\n\n\
                 Please send the binder and an invoice for the first year's premium.\n\n\
                 Thank you,"
            ),
        },
        ContactRole::Lender => EmailTemplate {
            subject: format!("Payoff Request - {property_address}"),
            body: format!(
                "Hi {greeting},\n\n\
                 {borrower_name} is {activity} the property at {property_address}. \
                 Please provide a payoff statement good through the end of next month, \
                 including per diem interest and wiring instructions.\n\n\
                 A borrower authorization is attached if you need one on file.\n\n\
                 Thank you,"
            ),
        },
        ContactRole::Borrower => EmailTemplate {
            subject: format!("Documents Needed - {property_address}"),
            body: format!(
                "Hi {greeting},\n\n\
                 Thanks for choosing us for the loan on {property_address}. To keep things \
                 moving while you are {activity}, please upload the following when you can:\n\
                 - Government-issued ID\n\
                 - Entity documents (articles, operating agreement, EIN letter)\n\
                 - Two most recent bank statements\n\
                 - Signed purchase contract or current mortgage statement\n\n\
                 Reply here with any questions.\n\n\
                 Thank you,"
            ),
        },
        ContactRole::Analyst
        | ContactRole::Appraiser
        | ContactRole::Attorney
        | ContactRole::Other => EmailTemplate {
            subject: format!("Loan File - {property_address}"),
            body: format!(
                "Hi {greeting},\n\n\
                 I'm reaching out about the loan for {borrower_name} on the property at \
                 {property_address}. The borrower is {activity} and we are working toward \
                 closing.\n\n\
                 Please let me know what you need from us or send any updates you have.\n\n\
                 Thank you,"
            ),
        },
    }
}
