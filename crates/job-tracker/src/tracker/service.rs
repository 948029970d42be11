use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::classifier::classify;
use super::domain::{
    Application, ApplicationId, ApplicationPatch, Email, EmailId, EmailPatch, NewApplication,
    NewEmail, NewProfile, Profile, ProfileId, ProfilePatch,
};
use super::export::{applications_csv, ExportError};
use super::filter::ApplicationFilter;
use super::repository::{EntityKind, RepositoryError, TrackerRepository};
use super::stats::{AnalyticsReport, StatsSummary};
use crate::sync::mailbox::{company_query, MailboxError, MailboxGateway, DEFAULT_MAX_RESULTS};
use crate::sync::sheets::{SheetsSync, SpreadsheetError, SpreadsheetGateway};

/// Service composing the store with the optional spreadsheet and mailbox adapters.
pub struct TrackerService<R> {
    repository: Arc<R>,
    sheets: Option<SheetsSync>,
    default_spreadsheet_id: Option<String>,
    mailbox: Option<Arc<dyn MailboxGateway>>,
    mailbox_max_results: u32,
}

impl<R> TrackerService<R>
where
    R: TrackerRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            sheets: None,
            default_spreadsheet_id: None,
            mailbox: None,
            mailbox_max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Mirror applications into a spreadsheet. `default_spreadsheet_id` is used when neither
    /// the application nor the profile names one.
    pub fn with_spreadsheet(
        mut self,
        gateway: Arc<dyn SpreadsheetGateway>,
        default_spreadsheet_id: Option<String>,
    ) -> Self {
        self.sheets = Some(SheetsSync::new(gateway));
        self.default_spreadsheet_id = default_spreadsheet_id;
        self
    }

    pub fn with_mailbox(mut self, gateway: Arc<dyn MailboxGateway>, max_results: u32) -> Self {
        self.mailbox = Some(gateway);
        self.mailbox_max_results = max_results;
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, TrackerServiceError> {
        let applications = self.repository.applications()?;
        Ok(filter.apply(applications))
    }

    pub fn application(
        &self,
        id: &ApplicationId,
    ) -> Result<Application, TrackerServiceError> {
        let application = self
            .repository
            .application(id)?
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Application, id))?;
        Ok(application)
    }

    /// Store a new application and, when spreadsheet sync is enabled, append its row and
    /// remember which spreadsheet holds it.
    pub async fn create_application(
        &self,
        draft: NewApplication,
    ) -> Result<Application, TrackerServiceError> {
        let application = self.repository.create_application(draft)?;
        info!(
            application_id = %application.id,
            company = %application.company,
            status = %application.status,
            "application recorded"
        );

        let Some(sheets) = &self.sheets else {
            return Ok(application);
        };

        let profile = self.repository.profile()?;
        let target = application
            .google_sheets_id
            .clone()
            .or_else(|| profile.as_ref().and_then(|p| p.google_sheets_id.clone()))
            .or_else(|| self.default_spreadsheet_id.clone());

        let spreadsheet_id = sheets
            .push_new(&application, target.as_deref())
            .await
            .inspect_err(|err| warn!(application_id = %application.id, %err, "spreadsheet sync failed"))?;

        if let Some(profile) = profile {
            if profile.google_sheets_id.as_deref() != Some(spreadsheet_id.as_str()) {
                self.repository
                    .update_profile(&profile.id, ProfilePatch::google_sheets_id(&spreadsheet_id))?;
            }
        }

        let application = self.repository.update_application(
            &application.id,
            ApplicationPatch::google_sheets_id(spreadsheet_id),
        )?;
        Ok(application)
    }

    /// Merge `patch` into the stored application and push the result to its spreadsheet row.
    pub async fn update_application(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Application, TrackerServiceError> {
        let application = self.repository.update_application(id, patch)?;
        info!(application_id = %id, status = %application.status, "application updated");
        self.push_update(&application).await?;
        Ok(application)
    }

    pub fn delete_application(&self, id: &ApplicationId) -> Result<(), TrackerServiceError> {
        self.repository.delete_application(id)?;
        info!(application_id = %id, "application deleted");
        Ok(())
    }

    pub fn emails_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<Email>, TrackerServiceError> {
        Ok(self.repository.emails_for_application(application_id)?)
    }

    pub fn create_email(&self, draft: NewEmail) -> Result<Email, TrackerServiceError> {
        let email = self.repository.create_email(draft)?;
        debug!(email_id = %email.id, application_id = %email.application_id, "email recorded");
        Ok(email)
    }

    pub fn update_email(
        &self,
        id: &EmailId,
        patch: EmailPatch,
    ) -> Result<Email, TrackerServiceError> {
        Ok(self.repository.update_email(id, patch)?)
    }

    pub fn profile(&self) -> Result<Option<Profile>, TrackerServiceError> {
        Ok(self.repository.profile()?)
    }

    pub fn create_profile(&self, draft: NewProfile) -> Result<Profile, TrackerServiceError> {
        let profile = self.repository.create_profile(draft)?;
        info!(profile_id = %profile.id, "profile created");
        Ok(profile)
    }

    pub fn update_profile(
        &self,
        id: &ProfileId,
        patch: ProfilePatch,
    ) -> Result<Profile, TrackerServiceError> {
        Ok(self.repository.update_profile(id, patch)?)
    }

    /// Pull messages about the application's company, store them, and move the application to
    /// the first classified status that differs from its current one.
    pub async fn sync_emails(
        &self,
        id: &ApplicationId,
    ) -> Result<Vec<Email>, TrackerServiceError> {
        let application = self.application(id)?;
        let mailbox = self
            .mailbox
            .as_ref()
            .ok_or(TrackerServiceError::MailboxDisabled)?;

        let query = company_query(&application.company);
        let messages = mailbox
            .search(&query, self.mailbox_max_results)
            .await
            .inspect_err(|err| warn!(application_id = %id, %err, "mailbox sync failed"))?;

        let now = Utc::now();
        let mut stored = Vec::with_capacity(messages.len());
        for message in messages {
            stored.push(
                self.repository
                    .create_email(message.into_email(&application.id, now))?,
            );
        }
        info!(application_id = %id, fetched = stored.len(), "mailbox sync complete");

        for email in &stored {
            let Some(status) = classify(&email.subject, &email.content) else {
                continue;
            };
            debug!(email_id = %email.id, %status, "classifier matched");
            if status == application.status {
                continue;
            }

            let updated = self
                .repository
                .update_application(&application.id, ApplicationPatch::status(status))?;
            info!(
                application_id = %id,
                from = %application.status,
                to = %status,
                "status reclassified from mailbox"
            );
            self.push_update(&updated).await?;
            break;
        }

        Ok(self.repository.emails_for_application(&application.id)?)
    }

    pub fn stats(&self) -> Result<StatsSummary, TrackerServiceError> {
        let applications = self.repository.applications()?;
        Ok(StatsSummary::from_applications(&applications))
    }

    pub fn analytics(
        &self,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsReport, TrackerServiceError> {
        let applications = self.repository.applications()?;
        let mut emails = HashMap::with_capacity(applications.len());
        for application in &applications {
            emails.insert(
                application.id.clone(),
                self.repository.emails_for_application(&application.id)?,
            );
        }
        Ok(AnalyticsReport::build(&applications, &emails, window_days, now))
    }

    pub fn export_csv(&self) -> Result<Vec<u8>, TrackerServiceError> {
        let applications = self.repository.applications()?;
        Ok(applications_csv(&applications)?)
    }

    async fn push_update(&self, application: &Application) -> Result<(), TrackerServiceError> {
        if let (Some(sheets), Some(_)) = (&self.sheets, application.google_sheets_id.as_ref()) {
            sheets
                .push_update(application)
                .await
                .inspect_err(|err| warn!(application_id = %application.id, %err, "spreadsheet sync failed"))?;
        }
        Ok(())
    }
}

/// Error raised by the tracker service.
#[derive(Debug, thiserror::Error)]
pub enum TrackerServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),
    #[error(transparent)]
    Mailbox(#[from] MailboxError),
    #[error("mailbox integration is not configured")]
    MailboxDisabled,
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl TrackerServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackerServiceError::Repository(err) if err.is_not_found())
    }
}
