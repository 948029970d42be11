//! Construction of authenticated Google API hubs from a service-account key.

use std::path::Path;
use std::sync::Arc;

use google_gmail1::Gmail;
use google_sheets4::hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use google_sheets4::hyper_util::client::legacy::connect::HttpConnector;
use google_sheets4::hyper_util::client::legacy::Client;
use google_sheets4::hyper_util::rt::TokioExecutor;
use google_sheets4::yup_oauth2::{self, ServiceAccountAuthenticator};
use google_sheets4::Sheets;
use tracing::info;

use super::mailbox::{GmailClient, MailboxGateway};
use super::sheets::{GoogleSheetsClient, SpreadsheetGateway};

pub type GoogleConnector = HttpsConnector<HttpConnector>;

#[derive(Debug, thiserror::Error)]
pub enum GoogleSetupError {
    #[error("failed to read service account key {path}: {source}")]
    Key {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to build https connector: {0}")]
    Connector(std::io::Error),
    #[error("failed to build authenticator: {0}")]
    Authenticator(std::io::Error),
}

/// Gateways backed by the Google Sheets and Gmail APIs.
pub struct GoogleGateways {
    pub spreadsheet: Arc<dyn SpreadsheetGateway>,
    pub mailbox: Arc<dyn MailboxGateway>,
}

impl std::fmt::Debug for GoogleGateways {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleGateways").finish_non_exhaustive()
    }
}

fn connector() -> Result<GoogleConnector, GoogleSetupError> {
    Ok(HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(GoogleSetupError::Connector)?
        .https_or_http()
        .enable_http1()
        .build())
}

/// Authenticate with the service-account key at `key_path`. When `delegated_user` is set the
/// mailbox hub impersonates that user (domain-wide delegation); the spreadsheet hub always acts
/// as the service account itself.
pub async fn connect(
    key_path: &Path,
    delegated_user: Option<&str>,
) -> Result<GoogleGateways, GoogleSetupError> {
    let key = yup_oauth2::read_service_account_key(key_path)
        .await
        .map_err(|source| GoogleSetupError::Key {
            path: key_path.display().to_string(),
            source,
        })?;

    let sheets_auth = ServiceAccountAuthenticator::builder(key.clone())
        .build()
        .await
        .map_err(GoogleSetupError::Authenticator)?;

    let mut mailbox_builder = ServiceAccountAuthenticator::builder(key);
    if let Some(subject) = delegated_user {
        mailbox_builder = mailbox_builder.subject(subject);
    }
    let mailbox_auth = mailbox_builder
        .build()
        .await
        .map_err(GoogleSetupError::Authenticator)?;

    let client = Client::builder(TokioExecutor::new()).build(connector()?);

    let sheets = Sheets::new(client.clone(), sheets_auth);
    let gmail = Gmail::new(client, mailbox_auth);
    info!(
        delegated = delegated_user.is_some(),
        "google sheets and gmail clients initialized"
    );

    Ok(GoogleGateways {
        spreadsheet: Arc::new(GoogleSheetsClient::new(sheets)),
        mailbox: Arc::new(GmailClient::new(gmail)),
    })
}
