use serde::Deserialize;

use super::domain::{Application, ApplicationStatus};

/// Dashboard list filter: free-text search over company and title plus an exact status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApplicationFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &Application) -> bool {
        let matches_status = self
            .status
            .map_or(true, |status| application.status == status);

        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                application.company.to_lowercase().contains(&query)
                    || application.title.to_lowercase().contains(&query)
            }
        };

        matches_status && matches_search
    }

    /// Keep matching records, preserving their order.
    pub fn apply(&self, applications: Vec<Application>) -> Vec<Application> {
        applications
            .into_iter()
            .filter(|application| self.matches(application))
            .collect()
    }
}
