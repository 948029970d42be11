use super::domain::{
    Application, ApplicationId, ApplicationPatch, Email, EmailId, EmailPatch, NewApplication,
    NewEmail, NewProfile, Profile, ProfileId, ProfilePatch,
};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Creation assigns identifiers (and, for applications, the applied timestamp); updates merge
/// the given fields into the stored record and fail with [`RepositoryError::NotFound`] when the
/// identifier is absent. List operations return records ordered newest first.
pub trait TrackerRepository: Send + Sync {
    fn create_application(&self, draft: NewApplication) -> Result<Application, RepositoryError>;
    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn applications(&self) -> Result<Vec<Application>, RepositoryError>;
    fn update_application(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Application, RepositoryError>;
    fn delete_application(&self, id: &ApplicationId) -> Result<(), RepositoryError>;

    fn emails_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<Email>, RepositoryError>;
    fn email(&self, id: &EmailId) -> Result<Option<Email>, RepositoryError>;
    fn create_email(&self, draft: NewEmail) -> Result<Email, RepositoryError>;
    fn update_email(&self, id: &EmailId, patch: EmailPatch) -> Result<Email, RepositoryError>;

    fn profile(&self) -> Result<Option<Profile>, RepositoryError>;
    fn create_profile(&self, draft: NewProfile) -> Result<Profile, RepositoryError>;
    fn update_profile(
        &self,
        id: &ProfileId,
        patch: ProfilePatch,
    ) -> Result<Profile, RepositoryError>;
}

/// Entity kinds held by the store, used to label lookup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Application,
    Email,
    Profile,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            EntityKind::Application => "application",
            EntityKind::Email => "email",
            EntityKind::Profile => "profile",
        }
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{} {id} not found", .entity.label())]
    NotFound { entity: EntityKind, id: String },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}
