use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationId, ApplicationPatch, Email, EmailId, EmailPatch, NewApplication,
    NewEmail, NewProfile, Profile, ProfileId, ProfilePatch,
};
use super::repository::{EntityKind, RepositoryError, TrackerRepository};

/// Source of "now" for applied timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Process-lifetime store backed by plain hash maps. No eviction and no secondary indices;
/// list operations scan and sort.
pub struct InMemoryTrackerStore {
    applications: Mutex<HashMap<ApplicationId, Application>>,
    emails: Mutex<HashMap<EmailId, Email>>,
    profiles: Mutex<HashMap<ProfileId, Profile>>,
    application_sequence: AtomicU64,
    email_sequence: AtomicU64,
    profile_sequence: AtomicU64,
    clock: Clock,
}

impl Default for InMemoryTrackerStore {
    fn default() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }
}

impl std::fmt::Debug for InMemoryTrackerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTrackerStore").finish_non_exhaustive()
    }
}

impl InMemoryTrackerStore {
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            applications: Mutex::new(HashMap::new()),
            emails: Mutex::new(HashMap::new()),
            profiles: Mutex::new(HashMap::new()),
            application_sequence: AtomicU64::new(1),
            email_sequence: AtomicU64::new(1),
            profile_sequence: AtomicU64::new(1),
            clock,
        }
    }

    fn next_id(sequence: &AtomicU64, prefix: &str) -> String {
        let id = sequence.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}-{id:06}")
    }

    /// Continue every id sequence from `next`.
    #[cfg(test)]
    pub(crate) fn starting_at(self, next: u64) -> Self {
        self.application_sequence.store(next, Ordering::Relaxed);
        self.email_sequence.store(next, Ordering::Relaxed);
        self.profile_sequence.store(next, Ordering::Relaxed);
        self
    }
}

/// Creation order of a generated id. Ids are zero-padded to six digits, so past
/// `999999` string order no longer matches sequence order.
fn sequence_of(id: &str) -> u64 {
    id.rsplit_once('-')
        .and_then(|(_, digits)| digits.parse().ok())
        .unwrap_or(0)
}

fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    entity: EntityKind,
) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex.lock().map_err(|_| {
        RepositoryError::Unavailable(format!("{} collection lock poisoned", entity.label()))
    })
}

impl TrackerRepository for InMemoryTrackerStore {
    fn create_application(&self, draft: NewApplication) -> Result<Application, RepositoryError> {
        let id = ApplicationId(Self::next_id(&self.application_sequence, "app"));
        let record = draft.into_application(id, (self.clock)());
        let mut guard = lock(&self.applications, EntityKind::Application)?;
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = lock(&self.applications, EntityKind::Application)?;
        Ok(guard.get(id).cloned())
    }

    fn applications(&self) -> Result<Vec<Application>, RepositoryError> {
        let guard = lock(&self.applications, EntityKind::Application)?;
        let mut records: Vec<Application> = guard.values().cloned().collect();
        records.sort_by(|a, b| {
            b.applied_date
                .cmp(&a.applied_date)
                .then_with(|| sequence_of(&b.id.0).cmp(&sequence_of(&a.id.0)))
        });
        Ok(records)
    }

    fn update_application(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.applications, EntityKind::Application)?;
        let record = guard
            .get_mut(id)
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Application, id))?;
        patch.apply(record);
        Ok(record.clone())
    }

    fn delete_application(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.applications, EntityKind::Application)?;
        guard.remove(id);
        Ok(())
    }

    fn emails_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<Email>, RepositoryError> {
        let guard = lock(&self.emails, EntityKind::Email)?;
        let mut emails: Vec<Email> = guard
            .values()
            .filter(|email| &email.application_id == application_id)
            .cloned()
            .collect();
        emails.sort_by_key(|email| (Reverse(email.timestamp), Reverse(sequence_of(&email.id.0))));
        Ok(emails)
    }

    fn email(&self, id: &EmailId) -> Result<Option<Email>, RepositoryError> {
        let guard = lock(&self.emails, EntityKind::Email)?;
        Ok(guard.get(id).cloned())
    }

    fn create_email(&self, draft: NewEmail) -> Result<Email, RepositoryError> {
        let id = EmailId(Self::next_id(&self.email_sequence, "email"));
        let email = draft.into_email(id);
        let mut guard = lock(&self.emails, EntityKind::Email)?;
        guard.insert(email.id.clone(), email.clone());
        Ok(email)
    }

    fn update_email(&self, id: &EmailId, patch: EmailPatch) -> Result<Email, RepositoryError> {
        let mut guard = lock(&self.emails, EntityKind::Email)?;
        let email = guard
            .get_mut(id)
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Email, id))?;
        patch.apply(email);
        Ok(email.clone())
    }

    fn profile(&self) -> Result<Option<Profile>, RepositoryError> {
        let guard = lock(&self.profiles, EntityKind::Profile)?;
        Ok(guard
            .values()
            .min_by_key(|profile| sequence_of(&profile.id.0))
            .cloned())
    }

    fn create_profile(&self, draft: NewProfile) -> Result<Profile, RepositoryError> {
        let id = ProfileId(Self::next_id(&self.profile_sequence, "profile"));
        let profile = draft.into_profile(id);
        let mut guard = lock(&self.profiles, EntityKind::Profile)?;
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn update_profile(
        &self,
        id: &ProfileId,
        patch: ProfilePatch,
    ) -> Result<Profile, RepositoryError> {
        let mut guard = lock(&self.profiles, EntityKind::Profile)?;
        let profile = guard
            .get_mut(id)
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Profile, id))?;
        patch.apply(profile);
        Ok(profile.clone())
    }
}
