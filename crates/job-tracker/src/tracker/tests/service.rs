use std::sync::Arc;

use chrono::Duration;

use super::common::*;
use crate::sync::testing::{CannedMailbox, RecordingSpreadsheet};
use crate::tracker::domain::{ApplicationId, ApplicationPatch, ApplicationStatus, NewApplication};
use crate::tracker::filter::ApplicationFilter;
use crate::tracker::repository::TrackerRepository;
use crate::tracker::{InMemoryTrackerStore, TrackerService, TrackerServiceError};

fn with_sheets(
    spreadsheet: Arc<RecordingSpreadsheet>,
    default_id: Option<&str>,
) -> (TrackerService<InMemoryTrackerStore>, Arc<InMemoryTrackerStore>) {
    let store = ticking_store();
    let service = TrackerService::new(store.clone())
        .with_spreadsheet(spreadsheet, default_id.map(str::to_string));
    (service, store)
}

fn with_mailbox(
    mailbox: Arc<CannedMailbox>,
) -> (TrackerService<InMemoryTrackerStore>, Arc<InMemoryTrackerStore>) {
    let store = ticking_store();
    let service = TrackerService::new(store.clone()).with_mailbox(mailbox, 10);
    (service, store)
}

#[tokio::test]
async fn create_without_spreadsheet_leaves_sheet_id_empty() {
    let (service, _) = build_service();
    let application = service
        .create_application(draft("Acme", "SRE"))
        .await
        .expect("create succeeds");

    assert_eq!(application.status, ApplicationStatus::Applied);
    assert!(application.google_sheets_id.is_none());
}

#[tokio::test]
async fn create_provisions_spreadsheet_and_records_it_on_profile() {
    let spreadsheet = Arc::new(RecordingSpreadsheet::default());
    let (service, store) = with_sheets(spreadsheet.clone(), None);
    let profile = store
        .create_profile(profile_draft())
        .expect("profile created");

    let first = service
        .create_application(draft("Acme", "SRE"))
        .await
        .expect("create succeeds");
    let second = service
        .create_application(draft("Globex", "SRE"))
        .await
        .expect("create succeeds");

    assert_eq!(spreadsheet.created().len(), 1);
    assert_eq!(spreadsheet.created()[0].0, "Job Applications Tracker");
    assert_eq!(first.google_sheets_id.as_deref(), Some("sheet-1"));
    assert_eq!(second.google_sheets_id.as_deref(), Some("sheet-1"));

    let rows = spreadsheet.rows("sheet-1");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "ID");
    assert_eq!(rows[1][0], first.id.0);
    assert_eq!(rows[2][1], "Globex");

    let stored = store.profile().expect("profile read").expect("profile exists");
    assert_eq!(stored.id, profile.id);
    assert_eq!(stored.google_sheets_id.as_deref(), Some("sheet-1"));
}

#[tokio::test]
async fn create_without_profile_provisions_per_application() {
    let spreadsheet = Arc::new(RecordingSpreadsheet::default());
    let (service, _) = with_sheets(spreadsheet.clone(), None);

    service
        .create_application(draft("Acme", "SRE"))
        .await
        .expect("create succeeds");
    service
        .create_application(draft("Globex", "SRE"))
        .await
        .expect("create succeeds");

    assert_eq!(spreadsheet.created().len(), 2);
}

#[tokio::test]
async fn create_appends_to_configured_spreadsheet() {
    let spreadsheet = Arc::new(RecordingSpreadsheet::with_sheet("tracker"));
    let (service, _) = with_sheets(spreadsheet.clone(), Some("tracker"));

    let application = service
        .create_application(draft("Acme", "SRE"))
        .await
        .expect("create succeeds");

    assert!(spreadsheet.created().is_empty());
    assert_eq!(application.google_sheets_id.as_deref(), Some("tracker"));
    assert_eq!(spreadsheet.rows("tracker").len(), 2);
}

#[tokio::test]
async fn spreadsheet_failure_surfaces_after_record_is_stored() {
    let spreadsheet = Arc::new(RecordingSpreadsheet::failing());
    let (service, store) = with_sheets(spreadsheet, None);

    match service.create_application(draft("Acme", "SRE")).await {
        Err(TrackerServiceError::Spreadsheet(_)) => {}
        other => panic!("expected spreadsheet error, got {other:?}"),
    }
    assert_eq!(store.applications().expect("list").len(), 1);
}

#[tokio::test]
async fn update_overwrites_the_matching_row() {
    let spreadsheet = Arc::new(RecordingSpreadsheet::with_sheet("tracker"));
    let (service, _) = with_sheets(spreadsheet.clone(), Some("tracker"));
    service
        .create_application(draft("Acme", "SRE"))
        .await
        .expect("create succeeds");
    let target = service
        .create_application(draft("Globex", "SRE"))
        .await
        .expect("create succeeds");

    let updated = service
        .update_application(&target.id, ApplicationPatch::status(ApplicationStatus::Interview))
        .await
        .expect("update succeeds");

    assert_eq!(updated.status, ApplicationStatus::Interview);
    assert_eq!(spreadsheet.updated_ranges(), ["Applications!A3:I3"]);
    let rows = spreadsheet.rows("tracker");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2][5], "interview");
}

#[tokio::test]
async fn update_appends_when_row_is_missing() {
    let spreadsheet = Arc::new(RecordingSpreadsheet::with_sheet("tracker"));
    let (service, store) = with_sheets(spreadsheet.clone(), Some("tracker"));
    let application = store
        .create_application(NewApplication {
            google_sheets_id: Some("tracker".to_string()),
            ..draft("Acme", "SRE")
        })
        .expect("create succeeds");

    service
        .update_application(&application.id, ApplicationPatch::status(ApplicationStatus::Offer))
        .await
        .expect("update succeeds");

    assert!(spreadsheet.updated_ranges().is_empty());
    let rows = spreadsheet.rows("tracker");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], application.id.0);
}

#[tokio::test]
async fn update_without_sheet_id_skips_spreadsheet() {
    let spreadsheet = Arc::new(RecordingSpreadsheet::default());
    let (service, store) = with_sheets(spreadsheet.clone(), None);
    let application = store
        .create_application(draft("Acme", "SRE"))
        .expect("create succeeds");

    service
        .update_application(&application.id, ApplicationPatch::status(ApplicationStatus::Rejected))
        .await
        .expect("update succeeds");

    assert!(spreadsheet.created().is_empty());
}

#[tokio::test]
async fn update_of_missing_application_is_not_found() {
    let (service, _) = build_service();
    let err = service
        .update_application(
            &ApplicationId("app-404".to_string()),
            ApplicationPatch::status(ApplicationStatus::Offer),
        )
        .await
        .expect_err("missing application");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn sync_stores_messages_and_reclassifies() {
    let mailbox = Arc::new(CannedMailbox::new(vec![
        message("m1", "Thanks for applying", "We received your application."),
        message("m2", "Next steps", "We'd like to schedule an interview."),
        message("m3", "Offer letter", "Congratulations!"),
    ]));
    let (service, store) = with_mailbox(mailbox.clone());
    let application = store
        .create_application(draft("Acme Corp", "SRE"))
        .expect("create succeeds");

    let emails = service
        .sync_emails(&application.id)
        .await
        .expect("sync succeeds");

    assert_eq!(mailbox.queries(), ["from:acmecorp OR subject:Acme Corp"]);
    assert_eq!(emails.len(), 3);
    assert!(emails
        .iter()
        .all(|email| email.application_id == application.id && email.from == "talent@acme.io"));
    let refreshed = service.application(&application.id).expect("fetch succeeds");
    assert_eq!(refreshed.status, ApplicationStatus::Interview);
}

#[tokio::test]
async fn sync_skips_signals_matching_current_status() {
    let mailbox = Arc::new(CannedMailbox::new(vec![
        message("m1", "Meeting follow-up", "Thanks for the meeting."),
        message("m2", "Good news", "Congratulations, we are pleased to extend an offer."),
    ]));
    let (service, store) = with_mailbox(mailbox);
    let application = store
        .create_application(draft_with_status("Acme", ApplicationStatus::Interview))
        .expect("create succeeds");

    service
        .sync_emails(&application.id)
        .await
        .expect("sync succeeds");

    let refreshed = service.application(&application.id).expect("fetch succeeds");
    assert_eq!(refreshed.status, ApplicationStatus::Offer);
}

#[tokio::test]
async fn sync_pushes_reclassified_status_to_spreadsheet() {
    let spreadsheet = Arc::new(RecordingSpreadsheet::with_sheet("tracker"));
    let mailbox = Arc::new(CannedMailbox::new(vec![message(
        "m1",
        "Update on your application",
        "Unfortunately we are not moving forward.",
    )]));
    let store = ticking_store();
    let service = TrackerService::new(store.clone())
        .with_spreadsheet(spreadsheet.clone(), Some("tracker".to_string()))
        .with_mailbox(mailbox, 10);
    let application = service
        .create_application(draft("Acme", "SRE"))
        .await
        .expect("create succeeds");

    service
        .sync_emails(&application.id)
        .await
        .expect("sync succeeds");

    assert_eq!(spreadsheet.updated_ranges(), ["Applications!A2:I2"]);
    assert_eq!(spreadsheet.rows("tracker")[1][5], "rejected");
}

#[tokio::test]
async fn sync_requires_mailbox_and_existing_application() {
    let (service, store) = build_service();
    let application = store
        .create_application(draft("Acme", "SRE"))
        .expect("create succeeds");

    match service.sync_emails(&application.id).await {
        Err(TrackerServiceError::MailboxDisabled) => {}
        other => panic!("expected disabled mailbox, got {other:?}"),
    }

    let (service, _) = with_mailbox(Arc::new(CannedMailbox::default()));
    let err = service
        .sync_emails(&ApplicationId("app-404".to_string()))
        .await
        .expect_err("missing application");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn mailbox_failure_stores_nothing() {
    let (service, store) = with_mailbox(Arc::new(CannedMailbox::failing()));
    let application = store
        .create_application(draft("Acme", "SRE"))
        .expect("create succeeds");

    match service.sync_emails(&application.id).await {
        Err(TrackerServiceError::Mailbox(_)) => {}
        other => panic!("expected mailbox error, got {other:?}"),
    }
    assert!(service
        .emails_for_application(&application.id)
        .expect("emails list")
        .is_empty());
    assert_eq!(
        service.application(&application.id).expect("fetch").status,
        ApplicationStatus::Applied
    );
}

#[tokio::test]
async fn list_applies_search_and_status_filters() {
    let (service, _) = build_service();
    for (company, status) in [
        ("Acme", ApplicationStatus::Applied),
        ("Acme Labs", ApplicationStatus::Interview),
        ("Globex", ApplicationStatus::Interview),
    ] {
        service
            .create_application(draft_with_status(company, status))
            .await
            .expect("create succeeds");
    }

    let filter = ApplicationFilter {
        search: Some("acme".to_string()),
        status: Some(ApplicationStatus::Interview),
    };
    let listed = service.list_applications(&filter).expect("list succeeds");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].company, "Acme Labs");
}

#[tokio::test]
async fn stats_and_analytics_reflect_store() {
    let (service, _) = build_service();
    let interviewing = service
        .create_application(draft_with_status("Acme", ApplicationStatus::Interview))
        .await
        .expect("create succeeds");
    service
        .create_application(draft("Globex", "SRE"))
        .await
        .expect("create succeeds");
    service
        .create_email(email_draft(&interviewing.id, "Interview", 48))
        .expect("email stored");

    let stats = service.stats().expect("stats");
    assert_eq!(stats.total_applied, 2);
    assert_eq!(stats.active, 2);
    assert_eq!(stats.interviews, 1);
    assert_eq!(stats.response_rate, "50%");

    let report = service
        .analytics(30, epoch() + Duration::days(7))
        .expect("analytics");
    assert_eq!(report.applications_in_window, 2);
    assert_eq!(report.average_response_days, Some(2.0));

    let csv = String::from_utf8(service.export_csv().expect("export")).expect("utf8");
    assert_eq!(csv.lines().count(), 3);
}
