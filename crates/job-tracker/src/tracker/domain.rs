use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for tracked applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for stored email messages.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailId(pub String);

/// Identifier wrapper for user profiles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flat status label attached to every application. No transition rules are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Screening,
    Interview,
    Offer,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Screening => "screening",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub const fn ordered() -> [ApplicationStatus; 6] {
        [
            ApplicationStatus::Applied,
            ApplicationStatus::Screening,
            ApplicationStatus::Interview,
            ApplicationStatus::Offer,
            ApplicationStatus::Rejected,
            ApplicationStatus::Withdrawn,
        ]
    }

    /// Still in play: not rejected, withdrawn, or already at the offer stage.
    pub const fn is_active(self) -> bool {
        !matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Withdrawn | ApplicationStatus::Offer
        )
    }

    /// The employer has answered in some form.
    pub const fn is_response(self) -> bool {
        !matches!(self, ApplicationStatus::Applied)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == normalized)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A tracked job application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub company: String,
    pub title: String,
    pub location: String,
    pub salary: Option<String>,
    pub job_url: Option<String>,
    pub status: ApplicationStatus,
    pub applied_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub google_sheets_id: Option<String>,
}

/// Create payload for an application; the store assigns `id` and `appliedDate`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub company: String,
    pub title: String,
    pub location: String,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub google_sheets_id: Option<String>,
}

impl NewApplication {
    pub fn into_application(self, id: ApplicationId, applied_date: DateTime<Utc>) -> Application {
        Application {
            id,
            company: self.company,
            title: self.title,
            location: self.location,
            salary: self.salary,
            job_url: self.job_url,
            status: self.status,
            applied_date,
            notes: self.notes,
            google_sheets_id: self.google_sheets_id,
        }
    }
}

/// Partial update for an application. `id` and `appliedDate` are not writable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApplicationPatch {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub salary: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub job_url: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub google_sheets_id: Option<Option<String>>,
}

impl ApplicationPatch {
    pub fn status(status: ApplicationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn google_sheets_id(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            google_sheets_id: Some(Some(spreadsheet_id.into())),
            ..Self::default()
        }
    }

    pub fn apply(self, application: &mut Application) {
        merge(&mut application.company, self.company);
        merge(&mut application.title, self.title);
        merge(&mut application.location, self.location);
        merge(&mut application.salary, self.salary);
        merge(&mut application.job_url, self.job_url);
        merge(&mut application.status, self.status);
        merge(&mut application.notes, self.notes);
        merge(&mut application.google_sheets_id, self.google_sheets_id);
    }
}

/// An email message tied to an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub id: EmailId,
    pub application_id: ApplicationId,
    pub gmail_id: String,
    pub from: String,
    pub subject: String,
    pub preview: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_important: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmail {
    pub application_id: ApplicationId,
    pub gmail_id: String,
    pub from: String,
    pub subject: String,
    pub preview: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_important: bool,
}

impl NewEmail {
    pub fn into_email(self, id: EmailId) -> Email {
        Email {
            id,
            application_id: self.application_id,
            gmail_id: self.gmail_id,
            from: self.from,
            subject: self.subject,
            preview: self.preview,
            content: self.content,
            timestamp: self.timestamp,
            is_important: self.is_important,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EmailPatch {
    #[serde(default)]
    pub application_id: Option<ApplicationId>,
    #[serde(default)]
    pub gmail_id: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_important: Option<bool>,
}

impl EmailPatch {
    pub fn apply(self, email: &mut Email) {
        merge(&mut email.application_id, self.application_id);
        merge(&mut email.gmail_id, self.gmail_id);
        merge(&mut email.from, self.from);
        merge(&mut email.subject, self.subject);
        merge(&mut email.preview, self.preview);
        merge(&mut email.content, self.content);
        merge(&mut email.timestamp, self.timestamp);
        merge(&mut email.is_important, self.is_important);
    }
}

/// The job seeker's profile. The dashboard only ever reads the first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub full_name: String,
    pub email: String,
    pub title: String,
    pub location: String,
    pub summary: String,
    pub resume_url: Option<String>,
    pub google_sheets_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub full_name: String,
    pub email: String,
    pub title: String,
    pub location: String,
    pub summary: String,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub google_sheets_id: Option<String>,
}

impl NewProfile {
    pub fn into_profile(self, id: ProfileId) -> Profile {
        Profile {
            id,
            full_name: self.full_name,
            email: self.email,
            title: self.title,
            location: self.location,
            summary: self.summary,
            resume_url: self.resume_url,
            google_sheets_id: self.google_sheets_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfilePatch {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub resume_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub google_sheets_id: Option<Option<String>>,
}

impl ProfilePatch {
    pub fn google_sheets_id(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            google_sheets_id: Some(Some(spreadsheet_id.into())),
            ..Self::default()
        }
    }

    pub fn apply(self, profile: &mut Profile) {
        merge(&mut profile.full_name, self.full_name);
        merge(&mut profile.email, self.email);
        merge(&mut profile.title, self.title);
        merge(&mut profile.location, self.location);
        merge(&mut profile.summary, self.summary);
        merge(&mut profile.resume_url, self.resume_url);
        merge(&mut profile.google_sheets_id, self.google_sheets_id);
    }
}

fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
