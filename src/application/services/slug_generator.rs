//! Public slug generation with collision retry

use std::sync::Arc;

use tracing::{instrument, warn};

use crate::application::errors::EncounterError;
use crate::application::ports::outbound::{
    EncounterTableRepositoryPort, RepoError, SecureRandomPort,
};
use crate::domain::value_objects::{PublicSlug, SLUG_ALPHABET};

/// A fresh random slug; uniqueness is not checked
pub fn generate_slug(rng: &dyn SecureRandomPort) -> PublicSlug {
    let last = (SLUG_ALPHABET.len() - 1) as u32;
    PublicSlug::from_indices(|| rng.random_range(0, last) as usize)
}

#[derive(Clone)]
pub struct SlugGenerator {
    repository: Arc<dyn EncounterTableRepositoryPort>,
    rng: Arc<dyn SecureRandomPort>,
    max_attempts: u32,
}

impl SlugGenerator {
    pub fn new(
        repository: Arc<dyn EncounterTableRepositoryPort>,
        rng: Arc<dyn SecureRandomPort>,
        max_attempts: u32,
    ) -> Self {
        Self {
            repository,
            rng,
            max_attempts: max_attempts.max(1),
        }
    }

    /// A slug not used by any table at the time of the check
    #[instrument(skip(self))]
    pub async fn unique_slug(&self) -> Result<PublicSlug, EncounterError> {
        for attempt in 1..=self.max_attempts {
            let slug = generate_slug(self.rng.as_ref());
            if !self.repository.slug_exists(&slug).await? {
                return Ok(slug);
            }
            warn!(attempt, slug = %slug, "Public slug collision");
        }
        Err(RepoError::constraint(format!(
            "Failed to generate unique public slug after {} attempts",
            self.max_attempts
        ))
        .into())
    }
}
