use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use serde::Serialize;

use super::domain::{Application, ApplicationId, ApplicationStatus, Email};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Headline counters shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_applied: usize,
    pub active: usize,
    pub interviews: usize,
    /// Percentage of applications that moved past `applied`, formatted as `"NN%"`.
    pub response_rate: String,
}

impl StatsSummary {
    pub fn from_applications(applications: &[Application]) -> Self {
        let total_applied = applications.len();
        let active = applications
            .iter()
            .filter(|application| application.status.is_active())
            .count();
        let interviews = applications
            .iter()
            .filter(|application| application.status == ApplicationStatus::Interview)
            .count();
        let responded = applications
            .iter()
            .filter(|application| application.status.is_response())
            .count();

        Self {
            total_applied,
            active,
            interviews,
            response_rate: format!("{}%", percentage(responded, total_applied)),
        }
    }
}

/// Rounded share of `part` in `total`; zero when `total` is zero.
pub fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayCount {
    pub weekday: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponseTime {
    pub application_id: ApplicationId,
    pub company: String,
    pub days: f32,
}

/// Trailing-window analytics behind the dashboard's charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub window_days: u32,
    pub window_start: DateTime<Utc>,
    pub applications_in_window: usize,
    pub status_distribution: Vec<StatusCount>,
    pub weekday_activity: Vec<WeekdayCount>,
    pub response_rate_pct: u8,
    /// Share that reached an interview or an offer.
    pub interview_rate_pct: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_response_days: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_times: Vec<CompanyResponseTime>,
}

const WEEKDAYS: [(Weekday, &str); 7] = [
    (Weekday::Mon, "Mon"),
    (Weekday::Tue, "Tue"),
    (Weekday::Wed, "Wed"),
    (Weekday::Thu, "Thu"),
    (Weekday::Fri, "Fri"),
    (Weekday::Sat, "Sat"),
    (Weekday::Sun, "Sun"),
];

impl AnalyticsReport {
    pub fn build(
        applications: &[Application],
        emails: &HashMap<ApplicationId, Vec<Email>>,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Self {
        // A window reaching past chrono's range covers every application.
        let window_start = Duration::try_days(i64::from(window_days))
            .and_then(|span| now.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let in_window: Vec<&Application> = applications
            .iter()
            .filter(|application| application.applied_date >= window_start)
            .collect();
        let total = in_window.len();

        let status_distribution = ApplicationStatus::ordered()
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: in_window
                    .iter()
                    .filter(|application| application.status == status)
                    .count(),
            })
            .collect();

        let weekday_activity = WEEKDAYS
            .iter()
            .map(|(weekday, label)| WeekdayCount {
                weekday: *label,
                count: in_window
                    .iter()
                    .filter(|application| application.applied_date.weekday() == *weekday)
                    .count(),
            })
            .collect();

        let responded = in_window
            .iter()
            .filter(|application| application.status.is_response())
            .count();
        let interviewed = in_window
            .iter()
            .filter(|application| {
                matches!(
                    application.status,
                    ApplicationStatus::Interview | ApplicationStatus::Offer
                )
            })
            .count();

        let mut response_times: Vec<CompanyResponseTime> = in_window
            .iter()
            .filter_map(|application| first_response(application, emails.get(&application.id)?))
            .collect();
        response_times.sort_by(|a, b| a.days.total_cmp(&b.days));

        let average_response_days = if response_times.is_empty() {
            None
        } else {
            let sum: f32 = response_times.iter().map(|entry| entry.days).sum();
            Some(round_tenths(sum / response_times.len() as f32))
        };

        Self {
            window_days,
            window_start,
            applications_in_window: total,
            status_distribution,
            weekday_activity,
            response_rate_pct: percentage(responded, total),
            interview_rate_pct: percentage(interviewed, total),
            average_response_days,
            response_times,
        }
    }
}

fn first_response(application: &Application, emails: &[Email]) -> Option<CompanyResponseTime> {
    let first = emails
        .iter()
        .map(|email| email.timestamp)
        .filter(|timestamp| *timestamp >= application.applied_date)
        .min()?;
    let hours = (first - application.applied_date).num_minutes() as f32 / 60.0;
    Some(CompanyResponseTime {
        application_id: application.id.clone(),
        company: application.company.clone(),
        days: round_tenths(hours / 24.0),
    })
}

fn round_tenths(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
