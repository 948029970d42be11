//! Application tracking: domain model, store, classifier, service, and HTTP routes.

pub mod classifier;
pub mod domain;
pub mod export;
pub mod filter;
pub mod repository;
pub mod router;
pub mod service;
pub mod stats;
pub mod store;

#[cfg(test)]
mod tests;

pub use classifier::{classify, StatusRule, STATUS_RULES};
pub use domain::{
    Application, ApplicationId, ApplicationPatch, ApplicationStatus, Email, EmailId, EmailPatch,
    NewApplication, NewEmail, NewProfile, Profile, ProfileId, ProfilePatch,
};
pub use filter::ApplicationFilter;
pub use repository::{EntityKind, RepositoryError, TrackerRepository};
pub use router::tracker_router;
pub use service::{TrackerService, TrackerServiceError};
pub use stats::{AnalyticsReport, StatsSummary};
pub use store::{Clock, InMemoryTrackerStore};
