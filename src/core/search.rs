use std::sync::Arc;

use crate::core::mixer::PlatformMixer;
use crate::core::tags::matches_any_tag;
use crate::models::{CreatorFilter, SearchCriteria, SearchResult, SortKey};
use crate::services::repository::{CreatorRepository, RepositoryError};

/// Default cap on rows scanned in memory for tag matching
pub const DEFAULT_TAG_SCAN_CAP: usize = 5_000;

/// Result ordering for a search; always ends with the id tie-break
pub fn ordering_for(criteria: &SearchCriteria) -> Vec<SortKey> {
    if criteria.is_live == Some(true) {
        vec![SortKey::ViewersDesc, SortKey::FollowersDesc, SortKey::IdAsc]
    } else if criteria.min_followers.is_some() {
        vec![SortKey::FollowersDesc, SortKey::ViewersDesc, SortKey::IdAsc]
    } else {
        vec![
            SortKey::FollowersDesc,
            SortKey::LiveDesc,
            SortKey::ViewersDesc,
            SortKey::IdAsc,
        ]
    }
}

/// Runs validated criteria against the creator repository
#[derive(Clone)]
pub struct SearchExecutor {
    repository: Arc<dyn CreatorRepository>,
    mixer: PlatformMixer,
    tag_scan_cap: usize,
}

impl SearchExecutor {
    pub fn new(repository: Arc<dyn CreatorRepository>, mixer: PlatformMixer, tag_scan_cap: usize) -> Self {
        Self {
            repository,
            mixer,
            tag_scan_cap: tag_scan_cap.max(1),
        }
    }

    /// Execute a search
    ///
    /// # Pipeline Stages
    /// 1. Non-tag predicate, hiding fraud-flagged creators by default
    /// 2. Tag matching in memory over the id/tag projection
    /// 3. Ordering and pagination (platform-mixed when no platform is named)
    pub async fn execute(&self, criteria: &SearchCriteria) -> Result<SearchResult, RepositoryError> {
        let page = criteria.effective_page();
        let limit = criteria.effective_limit();
        let mut filter = CreatorFilter::from_criteria(criteria);

        if !criteria.tags.is_empty() {
            let projection = self.repository.find_tag_fields(&filter, self.tag_scan_cap).await?;
            if projection.len() >= self.tag_scan_cap {
                tracing::warn!("Tag scan hit the cap of {} rows; results may be incomplete", self.tag_scan_cap);
            }

            let matched: Vec<String> = projection
                .into_iter()
                .filter(|fields| matches_any_tag(fields, &criteria.tags))
                .map(|fields| fields.id)
                .collect();

            tracing::debug!("{} creators match tags {:?}", matched.len(), criteria.tags);

            if matched.is_empty() {
                return Ok(SearchResult::empty(page));
            }
            filter.ids = Some(matched);
        }

        let order = ordering_for(criteria);
        let offset = (page as usize - 1).saturating_mul(limit as usize);

        let (creators, total_count) = if criteria.platforms.is_empty() && !self.mixer.is_empty() {
            let mixed = self
                .mixer
                .fetch_page(self.repository.as_ref(), &filter, &order, limit as usize, offset)
                .await?;
            if !mixed.mixed {
                tracing::debug!("Served unmixed page after mixed fetch failure");
            }
            (mixed.creators, mixed.total_count)
        } else {
            let creators = self.repository.find(&filter, &order, limit as usize, offset).await?;
            let total_count = self.repository.count(&filter).await?;
            (creators, total_count)
        };

        tracing::debug!(
            "Search page {} returned {} of {} creators",
            page,
            creators.len(),
            total_count
        );

        Ok(SearchResult::from_page(creators, total_count, page, limit))
    }
}
