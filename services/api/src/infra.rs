use async_trait::async_trait;
use job_tracker::sync::{FetchedMessage, MailboxError, MailboxGateway, RawPart};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Mailbox stand-in for the demo: every search answers with the same recruiter thread.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedMailbox {
    messages: Vec<FetchedMessage>,
}

impl ScriptedMailbox {
    pub(crate) fn recruiter_thread(company: &str) -> Self {
        let sender = format!("talent@{}.example", company.to_lowercase().replace(' ', ""));
        let message = |id: &str, subject: &str, date: &str, body: &str| FetchedMessage {
            message_id: id.to_string(),
            headers: vec![
                ("From".to_string(), sender.clone()),
                ("Subject".to_string(), subject.to_string()),
                ("Date".to_string(), date.to_string()),
            ],
            internal_date: None,
            payload: RawPart {
                mime_type: Some("text/plain".to_string()),
                data: Some(body.as_bytes().to_vec()),
                parts: Vec::new(),
            },
        };

        Self {
            messages: vec![
                message(
                    "demo-1",
                    &format!("Your application to {company}"),
                    "Mon, 03 Mar 2025 16:05:00 +0000",
                    "Thanks for applying. Our team is reviewing your background.",
                ),
                message(
                    "demo-2",
                    "Next steps",
                    "Thu, 06 Mar 2025 10:30:00 +0000",
                    "We'd love to schedule an interview with the platform team next week.",
                ),
            ],
        }
    }
}

#[async_trait]
impl MailboxGateway for ScriptedMailbox {
    async fn search(
        &self,
        _query: &str,
        max_results: u32,
    ) -> Result<Vec<FetchedMessage>, MailboxError> {
        Ok(self
            .messages
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }
}
