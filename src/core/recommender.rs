use futures::future::try_join_all;
use std::sync::Arc;

use crate::core::diversity::DiversitySelector;
use crate::core::scoring::RecommendationScorer;
use crate::models::{
    CampaignCriteria, CreatorFilter, CreatorRecord, RecommendedCreator, SortKey, Tier, TierCount,
};
use crate::services::repository::{CreatorRepository, RepositoryError};

/// Default number of candidates scored per request
pub const DEFAULT_CANDIDATE_POOL: usize = 1_000;

/// Result of the recommendation process
#[derive(Debug)]
pub struct RecommendationOutcome {
    pub creators: Vec<RecommendedCreator>,
    pub total_candidates: usize,
}

impl RecommendationOutcome {
    pub fn tier_counts(&self) -> Vec<TierCount> {
        Tier::ALL
            .iter()
            .map(|tier| TierCount {
                tier: *tier,
                count: self.creators.iter().filter(|c| c.tier == *tier).count(),
            })
            .collect()
    }
}

/// Campaign recommendation orchestrator
///
/// # Pipeline Stages
/// 1. Candidate fetch per tier (campaign predicate, fraud-flagged creators
///    hidden)
/// 2. User favorites lookup, once per request
/// 3. Scoring
/// 4. Tier-diversified selection
#[derive(Clone)]
pub struct Recommender {
    repository: Arc<dyn CreatorRepository>,
    scorer: RecommendationScorer,
    selector: DiversitySelector,
    candidate_pool: usize,
}

impl Recommender {
    pub fn new(
        repository: Arc<dyn CreatorRepository>,
        scorer: RecommendationScorer,
        selector: DiversitySelector,
        candidate_pool: usize,
    ) -> Self {
        Self {
            repository,
            scorer,
            selector,
            candidate_pool: candidate_pool.max(1),
        }
    }

    /// Rank creators for a campaign
    ///
    /// A failed favorites lookup only zeroes the user-history component;
    /// candidate fetch failures propagate.
    pub async fn recommend(
        &self,
        campaign: &CampaignCriteria,
        user_id: Option<&str>,
    ) -> Result<RecommendationOutcome, RepositoryError> {
        let filter = CreatorFilter::from_campaign(campaign);
        let candidates = self.fetch_candidates(&filter).await?;
        let total_candidates = candidates.len();

        let favorites = match user_id {
            Some(user_id) => self.load_favorites(user_id).await,
            None => None,
        };

        let scored: Vec<RecommendedCreator> = candidates
            .into_iter()
            .map(|creator| {
                let (score, breakdown) = self.scorer.score(&creator, campaign, favorites.as_deref());
                to_recommended(creator, score, breakdown)
            })
            .collect();

        let creators = self.selector.select(scored, campaign.count);

        tracing::debug!(
            "Selected {} of {} candidates for vertical {:?}",
            creators.len(),
            total_candidates,
            campaign.vertical
        );

        Ok(RecommendationOutcome {
            creators,
            total_candidates,
        })
    }

    /// Candidate pool split across tiers
    ///
    /// Each tier gets its diversity share of the pool; capacity a tier
    /// cannot fill goes to the other tiers in tier order. A store dominated
    /// by large creators still yields its nano and micro candidates.
    async fn fetch_candidates(&self, filter: &CreatorFilter) -> Result<Vec<CreatorRecord>, RepositoryError> {
        let tier_filters: Vec<CreatorFilter> = Tier::ALL.iter().map(|tier| filter.within_tier(*tier)).collect();

        let available: Vec<usize> = try_join_all(tier_filters.iter().map(|f| self.repository.count(f)))
            .await?
            .into_iter()
            .map(|count| usize::try_from(count).unwrap_or(usize::MAX))
            .collect();

        let quotas = self.selector.targets(self.candidate_pool);
        let mut assigned: Vec<usize> = quotas
            .iter()
            .zip(&available)
            .map(|((_, quota), available)| (*quota).min(*available))
            .collect();

        // Rounded quotas can overshoot the pool by a row or two
        let mut excess = assigned.iter().sum::<usize>().saturating_sub(self.candidate_pool);
        for slot in assigned.iter_mut().rev() {
            let cut = excess.min(*slot);
            *slot -= cut;
            excess -= cut;
        }

        let mut spare = self.candidate_pool.saturating_sub(assigned.iter().sum());
        for (slot, available) in assigned.iter_mut().zip(&available) {
            let extra = spare.min(available.saturating_sub(*slot));
            *slot += extra;
            spare -= extra;
        }

        let order = [SortKey::FollowersDesc, SortKey::IdAsc];
        let fetches = tier_filters
            .iter()
            .zip(&assigned)
            .map(|(f, limit)| self.repository.find(f, &order, *limit, 0));
        let per_tier = try_join_all(fetches).await?;

        tracing::debug!("Candidate pool per tier: {:?}", assigned);

        Ok(per_tier.into_iter().flatten().collect())
    }

    async fn load_favorites(&self, user_id: &str) -> Option<Vec<CreatorRecord>> {
        match self.repository.find_favorites(user_id).await {
            Ok(favorites) => Some(favorites),
            Err(e) => {
                tracing::warn!("Favorites lookup failed for user {}: {}", user_id, e);
                None
            }
        }
    }
}

fn to_recommended(
    creator: CreatorRecord,
    score: f64,
    breakdown: crate::models::ScoreBreakdown,
) -> RecommendedCreator {
    let tier = creator.tier();
    RecommendedCreator {
        id: creator.id,
        platform: creator.platform,
        username: creator.username,
        display_name: creator.display_name,
        followers: creator.followers,
        region: creator.region,
        score,
        tier,
        breakdown,
    }
}
