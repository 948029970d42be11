use crate::infra::ScriptedMailbox;
use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::Args;
use job_tracker::error::AppError;
use job_tracker::tracker::{
    classify, AnalyticsReport, ApplicationFilter, ApplicationStatus, InMemoryTrackerStore,
    NewApplication, NewProfile, TrackerService,
};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Email subject line
    #[arg(long, default_value = "")]
    pub(crate) subject: String,
    /// Plain-text email body
    #[arg(long, default_value = "")]
    pub(crate) body: String,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Company whose recruiter thread is replayed through mailbox sync
    #[arg(long, default_value = "Northwind Traders")]
    pub(crate) company: String,
    /// Trailing window for the analytics section, in days
    #[arg(long, default_value_t = 30)]
    pub(crate) days: u32,
}

pub(crate) fn run_classify(args: ClassifyArgs) {
    match classify(&args.subject, &args.body) {
        Some(status) => println!("{status}"),
        None => println!("no status signal"),
    }
}

fn demo_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// One application per day starting at [`demo_start`], so the walkthrough prints the same
/// numbers on every run.
fn demo_store() -> Arc<InMemoryTrackerStore> {
    let day = Arc::new(AtomicI64::new(0));
    Arc::new(InMemoryTrackerStore::with_clock(Arc::new(move || {
        demo_start() + Duration::days(day.fetch_add(1, Ordering::Relaxed))
    })))
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { company, days } = args;

    let service = TrackerService::new(demo_store())
        .with_mailbox(Arc::new(ScriptedMailbox::recruiter_thread(&company)), 10);

    println!("Job application tracker demo");
    let profile = service.create_profile(NewProfile {
        full_name: "Jordan Example".to_string(),
        email: "jordan@example.com".to_string(),
        title: "Platform Engineer".to_string(),
        location: "Remote".to_string(),
        summary: "Infrastructure, CI/CD, and developer tooling.".to_string(),
        resume_url: None,
        google_sheets_id: None,
    })?;
    println!("- Profile {} for {}", profile.id, profile.full_name);

    let target = service
        .create_application(NewApplication {
            company: company.clone(),
            title: "Senior Platform Engineer".to_string(),
            location: "Remote".to_string(),
            salary: Some("$170k".to_string()),
            ..NewApplication::default()
        })
        .await?;
    for (other, title, status) in [
        ("Contoso", "Site Reliability Engineer", ApplicationStatus::Screening),
        ("Fabrikam", "DevOps Engineer", ApplicationStatus::Rejected),
        ("Tailspin", "Build Engineer", ApplicationStatus::Applied),
    ] {
        service
            .create_application(NewApplication {
                company: other.to_string(),
                title: title.to_string(),
                location: "Hybrid".to_string(),
                status,
                ..NewApplication::default()
            })
            .await?;
    }

    println!("\nApplications (newest first)");
    for application in service.list_applications(&ApplicationFilter::default())? {
        println!(
            "  - {} | {} at {} | {} | applied {}",
            application.id,
            application.title,
            application.company,
            application.status,
            application.applied_date.format("%Y-%m-%d")
        );
    }

    println!("\nMailbox sync for {}", target.company);
    let emails = service.sync_emails(&target.id).await?;
    for email in &emails {
        println!(
            "  - {} | {} | {}",
            email.timestamp.format("%Y-%m-%d %H:%M"),
            email.subject,
            email.preview
        );
    }
    let refreshed = service.application(&target.id)?;
    println!("  Status: {} -> {}", target.status, refreshed.status);

    let stats = service.stats()?;
    println!("\nDashboard");
    println!(
        "- {} applied | {} active | {} interviews | {} response rate",
        stats.total_applied, stats.active, stats.interviews, stats.response_rate
    );

    let as_of = demo_start() + Duration::days(10);
    let report = service.analytics(days, as_of)?;
    render_analytics(&report);

    Ok(())
}

fn render_analytics(report: &AnalyticsReport) {
    println!(
        "\nAnalytics (last {} days, {} applications)",
        report.window_days, report.applications_in_window
    );
    let distribution: Vec<String> = report
        .status_distribution
        .iter()
        .filter(|entry| entry.count > 0)
        .map(|entry| format!("{} {}", entry.status, entry.count))
        .collect();
    println!("- Status mix: {}", distribution.join(", "));
    let busiest = report
        .weekday_activity
        .iter()
        .max_by_key(|entry| entry.count)
        .map(|entry| entry.weekday)
        .unwrap_or("-");
    println!("- Busiest weekday: {busiest}");
    println!(
        "- {}% responded | {}% reached interview",
        report.response_rate_pct, report.interview_rate_pct
    );
    match report.average_response_days {
        Some(days) => println!("- Average first response after {days:.1} days"),
        None => println!("- No responses recorded yet"),
    }
    for entry in &report.response_times {
        println!("  - {}: {:.1} days", entry.company, entry.days);
    }
}
