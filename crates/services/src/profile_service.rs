use std::sync::Arc;

use edu_core::model::{LearnerId, UserProfile};
use storage::repository::{IdentityRecord, ProfileRepository};

use crate::error::ProfileServiceError;
use crate::identity::SessionIdentity;

/// Keeps learner profiles in step with the identity provider.
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Upsert the identity fields of a profile from a sign-in payload.
    ///
    /// First sign-in creates the profile; later sign-ins overwrite the
    /// identity fields and leave enrollment and history untouched. The
    /// payload is trusted as given.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Identity` for a blank subject and
    /// `Storage` if the write fails.
    pub async fn save_identity(
        &self,
        identity: SessionIdentity,
    ) -> Result<LearnerId, ProfileServiceError> {
        let learner_id = LearnerId::new(identity.subject_id)?;
        self.profiles
            .upsert_identity(&IdentityRecord {
                learner_id: learner_id.clone(),
                full_name: identity.display_name,
                email: identity.email,
                image_url: identity.image_ref,
            })
            .await?;
        Ok(learner_id)
    }

    /// Fetch a learner's stored profile document.
    ///
    /// Returns `Ok(None)` when no profile exists yet.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` if repository access fails.
    pub async fn get_profile(
        &self,
        learner: &LearnerId,
    ) -> Result<Option<UserProfile>, ProfileServiceError> {
        let profile = self.profiles.get_profile(learner).await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use edu_core::model::{CourseId, ParseIdError, Score};
    use edu_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, ProfileRepository as _};

    fn identity(subject: &str) -> SessionIdentity {
        SessionIdentity {
            subject_id: subject.into(),
            display_name: Some("Rabin Bhandari".into()),
            email: Some("rabin@example.com".into()),
            image_ref: None,
        }
    }

    #[tokio::test]
    async fn sign_in_creates_then_updates_profile() {
        let repo = InMemoryRepository::new();
        let service = ProfileService::new(Arc::new(repo));

        let learner = service.save_identity(identity("u1")).await.unwrap();
        let profile = service.get_profile(&learner).await.unwrap().unwrap();
        assert_eq!(profile.full_name(), Some("Rabin Bhandari"));

        let mut renamed = identity("u1");
        renamed.display_name = Some("R. Bhandari".into());
        service.save_identity(renamed).await.unwrap();

        let profile = service.get_profile(&learner).await.unwrap().unwrap();
        assert_eq!(profile.full_name(), Some("R. Bhandari"));
    }

    #[tokio::test]
    async fn sign_in_leaves_history_untouched() {
        let repo = InMemoryRepository::new();
        let learner = LearnerId::new("u1").unwrap();
        repo.record_completion(
            &learner,
            &CourseId::generate(),
            Score::new(80).unwrap(),
            fixed_now(),
        )
        .await
        .unwrap();

        let service = ProfileService::new(Arc::new(repo));
        service.save_identity(identity("u1")).await.unwrap();

        let profile = service.get_profile(&learner).await.unwrap().unwrap();
        assert_eq!(profile.completed_courses().len(), 1);
    }

    #[tokio::test]
    async fn blank_subject_is_rejected() {
        let service = ProfileService::new(Arc::new(InMemoryRepository::new()));
        let err = service.save_identity(identity("  ")).await.unwrap_err();
        assert!(matches!(
            err,
            ProfileServiceError::Identity(ParseIdError::EmptyLearnerId)
        ));
    }
}
