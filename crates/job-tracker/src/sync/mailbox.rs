use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use google_gmail1::api::{MessagePart, Scope};
use google_gmail1::Gmail;
use tracing::debug;

use crate::tracker::domain::{ApplicationId, NewEmail};

pub const DEFAULT_MAX_RESULTS: u32 = 10;
pub const PREVIEW_LENGTH: usize = 150;

#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("mailbox operation failed: {0}")]
    Backend(String),
}

/// A MIME part as returned by the mailbox, with its body already decoded to bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPart {
    pub mime_type: Option<String>,
    pub data: Option<Vec<u8>>,
    pub parts: Vec<RawPart>,
}

impl RawPart {
    /// Plain-text body: the first `text/plain` descendant when the part is multipart,
    /// otherwise the part's own body.
    pub fn plain_text(&self) -> String {
        if self.parts.is_empty() {
            return decode(self.data.as_deref());
        }
        self.find_plain_text()
            .map(|part| decode(part.data.as_deref()))
            .unwrap_or_default()
    }

    fn find_plain_text(&self) -> Option<&RawPart> {
        self.parts.iter().find_map(|part| {
            if part.mime_type.as_deref() == Some("text/plain") && part.data.is_some() {
                Some(part)
            } else {
                part.find_plain_text()
            }
        })
    }
}

fn decode(data: Option<&[u8]>) -> String {
    data.map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .unwrap_or_default()
}

/// A message pulled from the mailbox, before it is tied to an application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedMessage {
    pub message_id: String,
    pub headers: Vec<(String, String)>,
    pub internal_date: Option<DateTime<Utc>>,
    pub payload: RawPart,
}

impl FetchedMessage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Build the email record for `application_id`; `now` stands in for a missing date.
    pub fn into_email(self, application_id: &ApplicationId, now: DateTime<Utc>) -> NewEmail {
        let from = self.header("From").unwrap_or("Unknown").to_string();
        let subject = self.header("Subject").unwrap_or("No Subject").to_string();
        let timestamp = self
            .header("Date")
            .and_then(|raw| DateTime::parse_from_rfc2822(raw.trim()).ok())
            .map(|date| date.with_timezone(&Utc))
            .or(self.internal_date)
            .unwrap_or(now);
        let content = self.payload.plain_text();

        NewEmail {
            application_id: application_id.clone(),
            gmail_id: self.message_id,
            from,
            subject,
            preview: preview(&content),
            content,
            timestamp,
            is_important: false,
        }
    }
}

/// First [`PREVIEW_LENGTH`] characters, with an ellipsis when the body was cut.
pub fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_LENGTH).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Mailbox search expression for messages about `company`.
pub fn company_query(company: &str) -> String {
    let sender: String = company
        .to_lowercase()
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();
    format!("from:{sender} OR subject:{company}")
}

/// Read-only access to a mailbox.
#[async_trait]
pub trait MailboxGateway: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<FetchedMessage>, MailboxError>;
}

/// Thin wrapper around the generated google-gmail1 client.
pub struct GmailClient<C>
where
    C: google_gmail1::common::Connector + Send + Sync + 'static,
{
    hub: Gmail<C>,
    user_id: String,
}

impl<C> GmailClient<C>
where
    C: google_gmail1::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: Gmail<C>) -> Self {
        Self::for_user(hub, "me")
    }

    pub fn for_user(hub: Gmail<C>, user_id: impl Into<String>) -> Self {
        Self {
            hub,
            user_id: user_id.into(),
        }
    }

    fn map_error<E: std::fmt::Display>(err: E) -> MailboxError {
        MailboxError::Backend(err.to_string())
    }
}

impl<C> std::fmt::Debug for GmailClient<C>
where
    C: google_gmail1::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailClient")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

fn raw_part(part: MessagePart) -> RawPart {
    RawPart {
        mime_type: part.mime_type,
        data: part.body.and_then(|body| body.data),
        parts: part
            .parts
            .unwrap_or_default()
            .into_iter()
            .map(raw_part)
            .collect(),
    }
}

fn headers(part: Option<&MessagePart>) -> Vec<(String, String)> {
    part.and_then(|part| part.headers.as_ref())
        .map(|headers| {
            headers
                .iter()
                .filter_map(|header| Some((header.name.clone()?, header.value.clone()?)))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl<C> MailboxGateway for GmailClient<C>
where
    C: google_gmail1::common::Connector + Send + Sync + 'static,
{
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<FetchedMessage>, MailboxError> {
        let (_, listing) = self
            .hub
            .users()
            .messages_list(&self.user_id)
            .q(query)
            .max_results(max_results)
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .map_err(Self::map_error)?;

        let ids: Vec<String> = listing
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|message| message.id)
            .collect();
        debug!(query, matches = ids.len(), "mailbox search complete");

        let mut fetched = Vec::with_capacity(ids.len());
        for id in ids {
            let (_, message) = self
                .hub
                .users()
                .messages_get(&self.user_id, &id)
                .format("full")
                .add_scope(Scope::Readonly)
                .doit()
                .await
                .map_err(Self::map_error)?;

            let headers = headers(message.payload.as_ref());
            let internal_date = message
                .internal_date
                .and_then(|millis| Utc.timestamp_millis_opt(millis).single());
            fetched.push(FetchedMessage {
                message_id: id,
                headers,
                internal_date,
                payload: message.payload.map(raw_part).unwrap_or_default(),
            });
        }

        Ok(fetched)
    }
}
