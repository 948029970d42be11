//! One-way adapters to external services: applications are pushed to a spreadsheet and
//! status signals are pulled from a mailbox. Vendor failures propagate; nothing is retried.

pub mod google;
pub mod mailbox;
pub mod sheets;

#[cfg(test)]
pub(crate) mod testing;

pub use google::{connect, GoogleGateways, GoogleSetupError};
pub use mailbox::{
    company_query, FetchedMessage, GmailClient, MailboxError, MailboxGateway, RawPart,
};
pub use sheets::{
    application_row, GoogleSheetsClient, SheetsSync, SpreadsheetError, SpreadsheetGateway,
};
