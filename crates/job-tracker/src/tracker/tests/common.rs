use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::sync::mailbox::{FetchedMessage, RawPart};
use crate::tracker::domain::{ApplicationId, ApplicationStatus, NewApplication, NewEmail, NewProfile};
use crate::tracker::store::InMemoryTrackerStore;
use crate::tracker::TrackerService;

pub(super) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Store whose clock advances one hour per created application, so creation order is
/// observable in the applied dates.
pub(super) fn ticking_store() -> Arc<InMemoryTrackerStore> {
    let ticks = Arc::new(AtomicI64::new(0));
    Arc::new(InMemoryTrackerStore::with_clock(Arc::new(move || {
        epoch() + Duration::hours(ticks.fetch_add(1, Ordering::SeqCst))
    })))
}

/// Store that stamps every application with the same instant.
pub(super) fn frozen_store() -> Arc<InMemoryTrackerStore> {
    Arc::new(InMemoryTrackerStore::with_clock(Arc::new(epoch)))
}

pub(super) fn build_service() -> (Arc<TrackerService<InMemoryTrackerStore>>, Arc<InMemoryTrackerStore>) {
    let store = ticking_store();
    (Arc::new(TrackerService::new(store.clone())), store)
}

pub(super) fn draft(company: &str, title: &str) -> NewApplication {
    NewApplication {
        company: company.to_string(),
        title: title.to_string(),
        location: "Remote".to_string(),
        ..NewApplication::default()
    }
}

pub(super) fn draft_with_status(company: &str, status: ApplicationStatus) -> NewApplication {
    NewApplication {
        status,
        ..draft(company, "Backend Engineer")
    }
}

pub(super) fn profile_draft() -> NewProfile {
    NewProfile {
        full_name: "Avery Quinn".to_string(),
        email: "avery@example.com".to_string(),
        title: "Platform Engineer".to_string(),
        location: "Denver, CO".to_string(),
        summary: "Infrastructure and reliability.".to_string(),
        resume_url: None,
        google_sheets_id: None,
    }
}

pub(super) fn email_draft(application_id: &ApplicationId, subject: &str, hours: i64) -> NewEmail {
    NewEmail {
        application_id: application_id.clone(),
        gmail_id: format!("gm-{hours}"),
        from: "recruiting@example.com".to_string(),
        subject: subject.to_string(),
        preview: String::new(),
        content: String::new(),
        timestamp: epoch() + Duration::hours(hours),
        is_important: false,
    }
}

pub(super) fn message(id: &str, subject: &str, body: &str) -> FetchedMessage {
    FetchedMessage {
        message_id: id.to_string(),
        headers: vec![
            ("From".to_string(), "talent@acme.io".to_string()),
            ("Subject".to_string(), subject.to_string()),
            ("Date".to_string(), "Tue, 04 Mar 2025 15:30:00 +0000".to_string()),
        ],
        internal_date: None,
        payload: RawPart {
            mime_type: Some("text/plain".to_string()),
            data: Some(body.as_bytes().to_vec()),
            parts: Vec::new(),
        },
    }
}

pub(super) fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}
