use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{RecommendedCreator, Tier};

/// Share of a recommendation list reserved for each tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRatios {
    pub nano: f64,
    pub micro: f64,
    pub mid: f64,
    #[serde(rename = "macro")]
    pub macro_: f64,
}

impl Default for TierRatios {
    fn default() -> Self {
        Self {
            nano: 0.30,
            micro: 0.35,
            mid: 0.30,
            macro_: 0.05,
        }
    }
}

impl TierRatios {
    pub fn ratio(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Nano => self.nano,
            Tier::Micro => self.micro,
            Tier::Mid => self.mid,
            Tier::Macro => self.macro_,
        }
    }
}

/// Best first: score desc, then followers desc, then id asc
pub fn compare_recommended(a: &RecommendedCreator, b: &RecommendedCreator) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.followers.cmp(&a.followers))
        .then_with(|| a.id.cmp(&b.id))
}

/// Picks a tier-balanced subset of scored candidates
#[derive(Debug, Clone, Default)]
pub struct DiversitySelector {
    ratios: TierRatios,
}

impl DiversitySelector {
    pub fn new(ratios: TierRatios) -> Self {
        Self { ratios }
    }

    /// Per-tier quotas for a list of `total` creators
    pub fn targets(&self, total: usize) -> Vec<(Tier, usize)> {
        Tier::ALL
            .iter()
            .map(|tier| {
                let target = (self.ratios.ratio(*tier).max(0.0) * total as f64).round();
                (*tier, target as usize)
            })
            .collect()
    }

    /// Select at most `total` creators, filling each tier's quota with its
    /// best candidates and backfilling any shortfall from the best of the
    /// rest; returned best first
    pub fn select(&self, candidates: Vec<RecommendedCreator>, total: usize) -> Vec<RecommendedCreator> {
        let mut selected: Vec<RecommendedCreator> = Vec::with_capacity(total.min(candidates.len()));

        if candidates.len() <= total {
            selected = candidates;
            selected.sort_by(compare_recommended);
            return selected;
        }

        let mut leftovers: Vec<RecommendedCreator> = Vec::new();
        for (tier, target) in self.targets(total) {
            let mut in_tier: Vec<RecommendedCreator> =
                candidates.iter().filter(|c| c.tier == tier).cloned().collect();
            in_tier.sort_by(compare_recommended);

            let rest = in_tier.split_off(target.min(in_tier.len()));
            selected.extend(in_tier);
            leftovers.extend(rest);
        }

        let shortfall = total.saturating_sub(selected.len());
        if shortfall > 0 {
            tracing::debug!("Backfilling {} recommendation slots across tiers", shortfall);
            leftovers.sort_by(compare_recommended);
            selected.extend(leftovers.into_iter().take(shortfall));
        }

        selected.sort_by(compare_recommended);
        selected.truncate(total);
        selected
    }
}
