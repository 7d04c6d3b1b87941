use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::models::{CreatorFilter, CreatorRecord, SortKey};
use crate::services::repository::{CreatorRepository, RepositoryError};

/// Creator store held entirely in memory
///
/// Evaluates [`CreatorFilter`] and [`SortKey`] with the same semantics the
/// SQL repository uses. Backs local development (seeded from a JSON file)
/// and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCreatorRepository {
    creators: Vec<CreatorRecord>,
    favorites: HashMap<String, Vec<String>>,
}

/// On-disk seed format
#[derive(Debug, Deserialize)]
struct SeedFile {
    creators: Vec<CreatorRecord>,
    #[serde(default)]
    favorites: HashMap<String, Vec<String>>,
}

impl InMemoryCreatorRepository {
    pub fn new(creators: Vec<CreatorRecord>) -> Self {
        Self {
            creators,
            favorites: HashMap::new(),
        }
    }

    /// Load creators and favorites from a JSON seed file
    pub fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| RepositoryError::SeedError(format!("{}: {}", path.display(), e)))?;
        let seed: SeedFile = serde_json::from_str(&raw)
            .map_err(|e| RepositoryError::SeedError(format!("{}: {}", path.display(), e)))?;

        tracing::info!(
            "Loaded {} creators and {} favorite lists from {}",
            seed.creators.len(),
            seed.favorites.len(),
            path.display()
        );

        Ok(Self {
            creators: seed.creators,
            favorites: seed.favorites,
        })
    }

    pub fn with_favorites(mut self, user_id: &str, creator_ids: Vec<String>) -> Self {
        self.favorites.insert(user_id.to_string(), creator_ids);
        self
    }

    pub fn len(&self) -> usize {
        self.creators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }
}

#[async_trait]
impl CreatorRepository for InMemoryCreatorRepository {
    async fn find(
        &self,
        filter: &CreatorFilter,
        order: &[SortKey],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreatorRecord>, RepositoryError> {
        let mut matching: Vec<&CreatorRecord> = self
            .creators
            .iter()
            .filter(|c| filter.matches(c))
            .collect();

        matching.sort_by(|a, b| SortKey::compare_all(order, a, b));

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &CreatorFilter) -> Result<u64, RepositoryError> {
        Ok(self.creators.iter().filter(|c| filter.matches(c)).count() as u64)
    }

    async fn find_favorites(&self, user_id: &str) -> Result<Vec<CreatorRecord>, RepositoryError> {
        let Some(ids) = self.favorites.get(user_id) else {
            return Ok(Vec::new());
        };

        Ok(self
            .creators
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FraudStatus, Platform, Region};

    fn creator(id: &str, platform: Platform, followers: u64) -> CreatorRecord {
        CreatorRecord {
            id: id.to_string(),
            platform,
            username: id.to_string(),
            display_name: id.to_string(),
            followers,
            current_viewers: None,
            is_live: false,
            tags: vec!["casino".to_string()],
            current_content: None,
            recent_content: vec![],
            region: Some(Region::Mexico),
            language: Some("es".to_string()),
            uses_camera: None,
            is_vtuber: false,
            vertical_fit_score: 50.0,
            vertical_compatible: false,
            brand_safety_score: 50.0,
            total_conversions: 0,
            avg_cpa: None,
            avg_roi: 0.0,
            engagement_rate: 0.0,
            fraud_status: FraudStatus::Unchecked,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_orders_and_paginates() {
        let repo = InMemoryCreatorRepository::new(vec![
            creator("a", Platform::Twitch, 100),
            creator("b", Platform::Kick, 300),
            creator("c", Platform::YouTube, 200),
        ]);

        let page = repo
            .find(&CreatorFilter::default(), &[SortKey::FollowersDesc], 2, 1)
            .await
            .unwrap();

        let ids: Vec<&str> = page.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_count_respects_filter() {
        let repo = InMemoryCreatorRepository::new(vec![
            creator("a", Platform::Twitch, 100),
            creator("b", Platform::Kick, 300),
        ]);

        let filter = CreatorFilter {
            platforms: vec![Platform::Kick],
            ..CreatorFilter::default()
        };
        assert_eq!(repo.count(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_favorites_for_unknown_user_is_empty() {
        let repo = InMemoryCreatorRepository::new(vec![creator("a", Platform::Twitch, 100)])
            .with_favorites("u1", vec!["a".to_string()]);

        assert_eq!(repo.find_favorites("u1").await.unwrap().len(), 1);
        assert!(repo.find_favorites("nobody").await.unwrap().is_empty());
    }
}
