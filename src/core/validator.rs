use regex::Regex;
use std::sync::LazyLock;

use crate::core::interpreter::extract_result_count;
use crate::models::{Region, SearchCriteria, MAX_RESULT_LIMIT};

const LATAM: &[Region] = &[
    Region::Mexico,
    Region::Guatemala,
    Region::Honduras,
    Region::ElSalvador,
    Region::Nicaragua,
    Region::CostaRica,
    Region::Panama,
    Region::Cuba,
    Region::DominicanRepublic,
    Region::PuertoRico,
    Region::Colombia,
    Region::Venezuela,
    Region::Ecuador,
    Region::Peru,
    Region::Bolivia,
    Region::Chile,
    Region::Argentina,
    Region::Uruguay,
    Region::Paraguay,
    Region::Brazil,
];

const CENTRAL_AMERICA: &[Region] = &[
    Region::Guatemala,
    Region::Honduras,
    Region::ElSalvador,
    Region::Nicaragua,
    Region::CostaRica,
    Region::Panama,
];

const SOUTH_AMERICA: &[Region] = &[
    Region::Colombia,
    Region::Venezuela,
    Region::Ecuador,
    Region::Peru,
    Region::Bolivia,
    Region::Chile,
    Region::Argentina,
    Region::Uruguay,
    Region::Paraguay,
    Region::Brazil,
];

const CARIBBEAN: &[Region] = &[Region::Cuba, Region::DominicanRepublic, Region::PuertoRico];

const NORTH_AMERICA: &[Region] = &[Region::UnitedStates, Region::Canada, Region::Mexico];

const IBERIA: &[Region] = &[Region::Spain, Region::Portugal];

const EUROPE: &[Region] = &[
    Region::Spain,
    Region::Portugal,
    Region::UnitedKingdom,
    Region::France,
    Region::Germany,
    Region::Italy,
];

const ASIA: &[Region] = &[Region::Philippines, Region::Japan, Region::SouthKorea, Region::India];

/// Broad groupings and the phrases that name them
static REGION_GROUPS: LazyLock<Vec<(Regex, &'static [Region])>> = LazyLock::new(|| {
    [
        (r"\b(latam|latin americ(a|an|ans)|latinoam[eé]rica(nos?)?|hispanoam[eé]rica|am[eé]rica latina)\b", LATAM),
        (r"\b(central americ(a|an|ans)|centroam[eé]rica)\b", CENTRAL_AMERICA),
        (r"\b(south americ(a|an|ans)|sudam[eé]rica|suram[eé]rica)\b", SOUTH_AMERICA),
        (r"\b(caribbean|caribe)\b", CARIBBEAN),
        (r"\b(north americ(a|an|ans)|norteam[eé]rica)\b", NORTH_AMERICA),
        (r"\b(iberia|iberian|ib[eé]rica)\b", IBERIA),
        (r"\b(europe|european|europa)\b", EUROPE),
        (r"\b(asia|asian|apac)\b", ASIA),
    ]
    .into_iter()
    .map(|(pattern, members)| (Regex::new(pattern).expect("valid regex"), members))
    .collect()
});

/// Member regions of every broad grouping named in the text
pub fn detect_region_groups(text: &str) -> Vec<Region> {
    let text = text.to_lowercase();
    let mut regions: Vec<Region> = Vec::new();
    for (regex, members) in REGION_GROUPS.iter() {
        if regex.is_match(&text) {
            for region in members.iter() {
                if !regions.contains(region) {
                    regions.push(*region);
                }
            }
        }
    }
    regions
}

/// Lowercase, trim and deduplicate tags, keeping first-seen order
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

/// Normalizes merged criteria before execution
#[derive(Debug, Clone)]
pub struct CriteriaValidator {
    default_language: Option<String>,
}

impl Default for CriteriaValidator {
    fn default() -> Self {
        Self::new(Some("es".to_string()))
    }
}

impl CriteriaValidator {
    pub fn new(default_language: Option<String>) -> Self {
        Self {
            default_language: default_language
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty()),
        }
    }

    /// Validate `criteria` interpreted from `text`
    ///
    /// An explicit count in the text always overrides whatever limit the
    /// criteria carry; otherwise the limit becomes "all results".
    pub fn validate(&self, mut criteria: SearchCriteria, text: &str) -> SearchCriteria {
        criteria.tags = normalize_tags(&criteria.tags);
        criteria.language = criteria
            .language
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty());

        if criteria.has_no_signal() {
            criteria.language = self.default_language.clone();
            let grouped = detect_region_groups(text);
            if !grouped.is_empty() {
                tracing::debug!("Expanded regional grouping to {} regions", grouped.len());
                criteria.regions = grouped;
            }
        }

        criteria.limit = Some(extract_result_count(text).unwrap_or(MAX_RESULT_LIMIT));
        criteria.page = criteria.page.max(1);

        if let (Some(min), Some(max)) = (criteria.min_followers, criteria.max_followers) {
            if min > max {
                criteria.min_followers = Some(max);
                criteria.max_followers = Some(min);
            }
        }

        if criteria.is_live == Some(true) {
            if let (Some(min), Some(max)) = (criteria.min_viewers, criteria.max_viewers) {
                if min > max {
                    criteria.min_viewers = Some(max);
                    criteria.max_viewers = Some(min);
                }
            }
        } else {
            criteria.min_viewers = None;
            criteria.max_viewers = None;
        }

        criteria
    }
}
