use super::domain::{Campaign, CampaignId};

/// Storage abstraction owning launched campaign records.
///
/// Records move only through explicit insert/update operations so the launch
/// snapshot is never mutated in place.
pub trait CampaignRepository: Send + Sync {
    fn insert(&self, campaign: Campaign) -> Result<Campaign, RepositoryError>;
    fn update(&self, campaign: Campaign) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &CampaignId) -> Result<Option<Campaign>, RepositoryError>;
    fn list(&self) -> Result<Vec<Campaign>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("campaign already exists")]
    Conflict,
    #[error("campaign not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
