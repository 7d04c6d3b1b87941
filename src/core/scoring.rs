use crate::models::{CampaignCriteria, CreatorRecord, ScoreBreakdown, ScoringWeights, Tier};

/// Estimated cost of one campaign slot per tier, in budget currency
pub fn estimated_tier_rate(tier: Tier) -> f64 {
    match tier {
        Tier::Nano => 250.0,
        Tier::Micro => 1_000.0,
        Tier::Mid => 5_000.0,
        Tier::Macro => 25_000.0,
    }
}

/// Score a creator (0-100) for a campaign
///
/// Scoring formula:
/// score = (
///     vertical_fit * 0.30 +             # Fit for the campaign's vertical
///     historical_performance * 0.25 +   # Conversions, ROI, CPA
///     brand_safety * 0.20 +             # Safety score, fraud review
///     budget_alignment * 0.15 +         # Tier rate vs. budget
///     user_history * 0.10               # Similarity to the user's favorites
/// )
#[derive(Debug, Clone, Default)]
pub struct RecommendationScorer {
    weights: ScoringWeights,
}

impl RecommendationScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Composite score and its components
    ///
    /// `favorites` is `None` when there is no user or the lookup failed,
    /// in which case the user-history component is 0.
    pub fn score(
        &self,
        creator: &CreatorRecord,
        campaign: &CampaignCriteria,
        favorites: Option<&[CreatorRecord]>,
    ) -> (f64, ScoreBreakdown) {
        let breakdown = ScoreBreakdown {
            vertical_fit: calculate_vertical_fit(creator, campaign.vertical.as_deref()),
            historical_performance: calculate_historical_performance(creator),
            brand_safety: calculate_brand_safety(creator),
            budget_alignment: calculate_budget_alignment(creator.tier(), campaign.budget),
            user_history: favorites.map_or(0.0, |f| calculate_user_history(creator, f)),
        };

        let total = breakdown.vertical_fit * self.weights.vertical_fit
            + breakdown.historical_performance * self.weights.historical_performance
            + breakdown.brand_safety * self.weights.brand_safety
            + breakdown.budget_alignment * self.weights.budget_alignment
            + breakdown.user_history * self.weights.user_history;

        (bounded(total), breakdown)
    }
}

/// Clamp to [0, 100]; non-finite values count as 0
#[inline]
fn bounded(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Calculate vertical fit (0-100)
/// Without a vertical, engagement stands in for fit
#[inline]
pub fn calculate_vertical_fit(creator: &CreatorRecord, vertical: Option<&str>) -> f64 {
    let Some(vertical) = vertical.map(str::trim).filter(|v| !v.is_empty()) else {
        return bounded(creator.engagement_rate * 10.0);
    };

    let mut score = creator.vertical_fit_score * 0.6;
    if creator.vertical_compatible {
        score += 20.0;
    }
    if creator
        .inferred_category()
        .is_some_and(|category| category.eq_ignore_ascii_case(vertical))
    {
        score += 20.0;
    }

    bounded(score)
}

/// Calculate historical performance (0-100)
#[inline]
pub fn calculate_historical_performance(creator: &CreatorRecord) -> f64 {
    let conversions = (creator.total_conversions as f64 / 100.0).min(1.0) * 40.0;
    let roi = (creator.avg_roi / 3.0).clamp(0.0, 1.0) * 30.0;
    let cpa = match creator.avg_cpa {
        Some(cpa) => (1.0 - cpa / 100.0).clamp(0.0, 1.0) * 30.0,
        None => 15.0,
    };

    bounded(conversions + roi + cpa)
}

/// Calculate brand safety (0-100)
#[inline]
pub fn calculate_brand_safety(creator: &CreatorRecord) -> f64 {
    let bonus = if creator.fraud_status == crate::models::FraudStatus::Passed {
        10.0
    } else {
        0.0
    };
    bounded(creator.brand_safety_score + bonus)
}

/// Calculate budget alignment (0-100)
///
/// A tier costing 20-50% of the budget is ideal. Pricier creators decay to
/// 0 at the full budget; cheaper ones decay towards a floor of 40.
#[inline]
pub fn calculate_budget_alignment(tier: Tier, budget: Option<f64>) -> f64 {
    let Some(budget) = budget.filter(|b| b.is_finite() && *b > 0.0) else {
        return 50.0;
    };

    let ratio = estimated_tier_rate(tier) / budget;
    let score = if (0.2..=0.5).contains(&ratio) {
        100.0
    } else if ratio > 0.5 {
        100.0 * (1.0 - (ratio - 0.5) / 0.5)
    } else {
        40.0 + 60.0 * (ratio / 0.2)
    };

    bounded(score)
}

/// Calculate user history (0-100)
/// Average overlap with the user's favorites on platform, region and category
#[inline]
pub fn calculate_user_history(creator: &CreatorRecord, favorites: &[CreatorRecord]) -> f64 {
    if favorites.is_empty() {
        return 0.0;
    }

    let category = creator.inferred_category();
    let overlap: f64 = favorites
        .iter()
        .map(|favorite| {
            let mut similarity = 0.0;
            if favorite.platform == creator.platform {
                similarity += 0.4;
            }
            if favorite.region.is_some() && favorite.region == creator.region {
                similarity += 0.3;
            }
            if category.is_some() && favorite.inferred_category() == category {
                similarity += 0.3;
            }
            similarity
        })
        .sum();

    bounded(overlap / favorites.len() as f64 * 100.0)
}
