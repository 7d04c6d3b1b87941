use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Largest page size a search may request; also the "return everything" default
pub const MAX_RESULT_LIMIT: u32 = 10_000;

/// Follower boundaries between tiers (lower bound of micro, mid, macro)
pub const MICRO_TIER_MIN_FOLLOWERS: u64 = 10_000;
pub const MID_TIER_MIN_FOLLOWERS: u64 = 50_000;
pub const MACRO_TIER_MIN_FOLLOWERS: u64 = 500_000;

/// Streaming and social platforms a creator can live on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitch,
    YouTube,
    Kick,
    TikTok,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Twitch,
        Platform::YouTube,
        Platform::Kick,
        Platform::TikTok,
        Platform::Instagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitch => "twitch",
            Platform::YouTube => "youtube",
            Platform::Kick => "kick",
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown platform: {}", s))
    }
}

/// Supported creator regions (one per country/market)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    Mexico,
    Guatemala,
    Honduras,
    ElSalvador,
    Nicaragua,
    CostaRica,
    Panama,
    Cuba,
    DominicanRepublic,
    PuertoRico,
    Colombia,
    Venezuela,
    Ecuador,
    Peru,
    Bolivia,
    Chile,
    Argentina,
    Uruguay,
    Paraguay,
    Brazil,
    UnitedStates,
    Canada,
    Spain,
    Portugal,
    UnitedKingdom,
    France,
    Germany,
    Italy,
    Philippines,
    Japan,
    SouthKorea,
    India,
}

impl Region {
    pub const ALL: [Region; 32] = [
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
        Region::UnitedStates,
        Region::Canada,
        Region::Spain,
        Region::Portugal,
        Region::UnitedKingdom,
        Region::France,
        Region::Germany,
        Region::Italy,
        Region::Philippines,
        Region::Japan,
        Region::SouthKorea,
        Region::India,
    ];

    /// Identifier as stored by the repository
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Mexico => "MEXICO",
            Region::Guatemala => "GUATEMALA",
            Region::Honduras => "HONDURAS",
            Region::ElSalvador => "EL_SALVADOR",
            Region::Nicaragua => "NICARAGUA",
            Region::CostaRica => "COSTA_RICA",
            Region::Panama => "PANAMA",
            Region::Cuba => "CUBA",
            Region::DominicanRepublic => "DOMINICAN_REPUBLIC",
            Region::PuertoRico => "PUERTO_RICO",
            Region::Colombia => "COLOMBIA",
            Region::Venezuela => "VENEZUELA",
            Region::Ecuador => "ECUADOR",
            Region::Peru => "PERU",
            Region::Bolivia => "BOLIVIA",
            Region::Chile => "CHILE",
            Region::Argentina => "ARGENTINA",
            Region::Uruguay => "URUGUAY",
            Region::Paraguay => "PARAGUAY",
            Region::Brazil => "BRAZIL",
            Region::UnitedStates => "UNITED_STATES",
            Region::Canada => "CANADA",
            Region::Spain => "SPAIN",
            Region::Portugal => "PORTUGAL",
            Region::UnitedKingdom => "UNITED_KINGDOM",
            Region::France => "FRANCE",
            Region::Germany => "GERMANY",
            Region::Italy => "ITALY",
            Region::Philippines => "PHILIPPINES",
            Region::Japan => "JAPAN",
            Region::SouthKorea => "SOUTH_KOREA",
            Region::India => "INDIA",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown region: {}", s))
    }
}

/// Outcome of the enrichment pipeline's fraud review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FraudStatus {
    #[default]
    Unchecked,
    Passed,
    Suspicious,
    Flagged,
}

impl FraudStatus {
    pub const ALL: [FraudStatus; 4] = [
        FraudStatus::Unchecked,
        FraudStatus::Passed,
        FraudStatus::Suspicious,
        FraudStatus::Flagged,
    ];

    /// States hidden from searches unless explicitly requested
    pub const FLAGGED: [FraudStatus; 2] = [FraudStatus::Suspicious, FraudStatus::Flagged];

    pub fn is_flagged(&self) -> bool {
        Self::FLAGGED.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FraudStatus::Unchecked => "unchecked",
            FraudStatus::Passed => "passed",
            FraudStatus::Suspicious => "suspicious",
            FraudStatus::Flagged => "flagged",
        }
    }
}

impl FromStr for FraudStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FraudStatus::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown fraud status: {}", s))
    }
}

/// Follower-count bucket used for diversity targeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Nano,
    Micro,
    Mid,
    Macro,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Nano, Tier::Micro, Tier::Mid, Tier::Macro];

    pub fn from_followers(followers: u64) -> Self {
        if followers >= MACRO_TIER_MIN_FOLLOWERS {
            Tier::Macro
        } else if followers >= MID_TIER_MIN_FOLLOWERS {
            Tier::Mid
        } else if followers >= MICRO_TIER_MIN_FOLLOWERS {
            Tier::Micro
        } else {
            Tier::Nano
        }
    }

    /// Inclusive follower bounds; macro has no upper bound
    pub fn follower_range(&self) -> (u64, Option<u64>) {
        match self {
            Tier::Nano => (0, Some(MICRO_TIER_MIN_FOLLOWERS - 1)),
            Tier::Micro => (MICRO_TIER_MIN_FOLLOWERS, Some(MID_TIER_MIN_FOLLOWERS - 1)),
            Tier::Mid => (MID_TIER_MIN_FOLLOWERS, Some(MACRO_TIER_MIN_FOLLOWERS - 1)),
            Tier::Macro => (MACRO_TIER_MIN_FOLLOWERS, None),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Nano => "nano",
            Tier::Micro => "micro",
            Tier::Mid => "mid",
            Tier::Macro => "macro",
        }
    }
}

/// Creator as stored by the repository
///
/// Owned by the enrichment connectors; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorRecord {
    pub id: String,
    pub platform: Platform,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub current_viewers: Option<u64>,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub current_content: Option<String>,
    #[serde(default)]
    pub recent_content: Vec<String>,
    pub region: Option<Region>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub uses_camera: Option<bool>,
    #[serde(default)]
    pub is_vtuber: bool,
    /// 0-100 fit for the creator's marketing vertical
    #[serde(default)]
    pub vertical_fit_score: f64,
    #[serde(default)]
    pub vertical_compatible: bool,
    /// 0-100
    #[serde(default)]
    pub brand_safety_score: f64,
    #[serde(default)]
    pub total_conversions: u64,
    #[serde(default)]
    pub avg_cpa: Option<f64>,
    #[serde(default)]
    pub avg_roi: f64,
    /// Percent, e.g. `4.5` for 4.5%
    #[serde(default)]
    pub engagement_rate: f64,
    #[serde(default)]
    pub fraud_status: FraudStatus,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl CreatorRecord {
    pub fn tier(&self) -> Tier {
        Tier::from_followers(self.followers)
    }

    /// Category the creator is best known for: the current content label,
    /// else the first tag
    pub fn inferred_category(&self) -> Option<String> {
        self.current_content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .or_else(|| self.tags.first().map(String::as_str))
            .map(str::to_lowercase)
    }

    pub fn tag_fields(&self) -> TagFields {
        TagFields {
            id: self.id.clone(),
            tags: self.tags.clone(),
            current_content: self.current_content.clone(),
            recent_content: self.recent_content.clone(),
        }
    }
}

/// Id plus the three text fields tag phrases are matched against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagFields {
    pub id: String,
    pub tags: Vec<String>,
    pub current_content: Option<String>,
    pub recent_content: Vec<String>,
}

/// Structured search filter produced from a free-text brief
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub min_followers: Option<u64>,
    #[serde(default)]
    pub max_followers: Option<u64>,
    #[serde(default)]
    pub min_viewers: Option<u64>,
    #[serde(default)]
    pub max_viewers: Option<u64>,
    #[serde(default)]
    pub is_live: Option<bool>,
    #[serde(default)]
    pub uses_camera: Option<bool>,
    #[serde(default)]
    pub is_vtuber: Option<bool>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub fraud_statuses: Vec<FraudStatus>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            platforms: Vec::new(),
            regions: Vec::new(),
            tags: Vec::new(),
            min_followers: None,
            max_followers: None,
            min_viewers: None,
            max_viewers: None,
            is_live: None,
            uses_camera: None,
            is_vtuber: None,
            language: None,
            fraud_statuses: Vec::new(),
            limit: None,
            page: default_page(),
        }
    }
}

impl SearchCriteria {
    /// True when no platform/region/tag/follower/live/language signal is set
    pub fn has_no_signal(&self) -> bool {
        self.platforms.is_empty()
            && self.regions.is_empty()
            && self.tags.is_empty()
            && self.min_followers.is_none()
            && self.max_followers.is_none()
            && self.is_live.is_none()
            && self.language.is_none()
    }

    /// Page size actually used: the requested limit clamped to bounds,
    /// or "all" when none was requested
    pub fn effective_limit(&self) -> u32 {
        match self.limit {
            Some(0) | None => MAX_RESULT_LIMIT,
            Some(limit) => limit.min(MAX_RESULT_LIMIT),
        }
    }

    pub fn effective_page(&self) -> u32 {
        self.page.max(1)
    }

    /// Overlay `self` (fresh) on `previous`, field by field; fresh values win
    pub fn merged_over(self, previous: Option<&SearchCriteria>) -> SearchCriteria {
        let Some(prev) = previous else {
            return self;
        };

        fn pick<T: Clone>(fresh: Vec<T>, prev: &[T]) -> Vec<T> {
            if fresh.is_empty() { prev.to_vec() } else { fresh }
        }

        SearchCriteria {
            platforms: pick(self.platforms, &prev.platforms),
            regions: pick(self.regions, &prev.regions),
            tags: pick(self.tags, &prev.tags),
            min_followers: self.min_followers.or(prev.min_followers),
            max_followers: self.max_followers.or(prev.max_followers),
            min_viewers: self.min_viewers.or(prev.min_viewers),
            max_viewers: self.max_viewers.or(prev.max_viewers),
            is_live: self.is_live.or(prev.is_live),
            uses_camera: self.uses_camera.or(prev.uses_camera),
            is_vtuber: self.is_vtuber.or(prev.is_vtuber),
            language: self.language.or_else(|| prev.language.clone()),
            fraud_statuses: pick(self.fraud_statuses, &prev.fraud_statuses),
            limit: self.limit.or(prev.limit),
            page: self.page,
        }
    }
}

/// Paginated search output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub creators: Vec<CreatorRecord>,
    pub total_count: u64,
    pub page: u32,
    pub total_pages: u32,
    pub has_more: bool,
}

impl SearchResult {
    /// A valid result with no matches (not an error)
    pub fn empty(page: u32) -> Self {
        Self {
            creators: Vec::new(),
            total_count: 0,
            page,
            total_pages: 0,
            has_more: false,
        }
    }

    pub fn from_page(creators: Vec<CreatorRecord>, total_count: u64, page: u32, limit: u32) -> Self {
        let limit = u64::from(limit.max(1));
        let total_pages = u32::try_from(total_count.div_ceil(limit)).unwrap_or(u32::MAX);
        Self {
            creators,
            total_count,
            page,
            total_pages,
            has_more: page < total_pages,
        }
    }
}

/// Campaign a ranked creator list is requested for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CampaignCriteria {
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub vertical: Option<String>,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub budget: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub min_vertical_fit: Option<f64>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default = "default_campaign_count")]
    #[validate(range(min = 1, max = 100))]
    pub count: usize,
}

fn default_campaign_count() -> usize {
    20
}

impl Default for CampaignCriteria {
    fn default() -> Self {
        Self {
            vertical: None,
            region: None,
            budget: None,
            min_vertical_fit: None,
            platforms: Vec::new(),
            count: default_campaign_count(),
        }
    }
}

/// Five weighted components of a recommendation score, each 0-100
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub vertical_fit: f64,
    pub historical_performance: f64,
    pub brand_safety: f64,
    pub budget_alignment: f64,
    pub user_history: f64,
}

/// Scored creator in a campaign recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedCreator {
    pub id: String,
    pub platform: Platform,
    pub username: String,
    pub display_name: String,
    pub followers: u64,
    pub region: Option<Region>,
    pub score: f64,
    pub tier: Tier,
    pub breakdown: ScoreBreakdown,
}

/// Repository-side predicate
///
/// Empty sets and `None` bounds do not constrain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatorFilter {
    pub ids: Option<Vec<String>>,
    pub platforms: Vec<Platform>,
    pub regions: Vec<Region>,
    pub min_followers: Option<u64>,
    pub max_followers: Option<u64>,
    pub min_viewers: Option<u64>,
    pub max_viewers: Option<u64>,
    pub is_live: Option<bool>,
    pub uses_camera: Option<bool>,
    pub is_vtuber: Option<bool>,
    pub language: Option<String>,
    pub min_vertical_fit: Option<f64>,
    pub fraud_statuses: Vec<FraudStatus>,
    pub exclude_fraud_statuses: Vec<FraudStatus>,
}

impl CreatorFilter {
    /// Non-tag predicate for a search; hides flagged creators unless the
    /// criteria ask for a flagged state
    pub fn from_criteria(criteria: &SearchCriteria) -> Self {
        let wants_flagged = criteria.fraud_statuses.iter().any(FraudStatus::is_flagged);
        Self {
            ids: None,
            platforms: criteria.platforms.clone(),
            regions: criteria.regions.clone(),
            min_followers: criteria.min_followers,
            max_followers: criteria.max_followers,
            min_viewers: criteria.min_viewers,
            max_viewers: criteria.max_viewers,
            is_live: criteria.is_live,
            uses_camera: criteria.uses_camera,
            is_vtuber: criteria.is_vtuber,
            language: criteria.language.clone(),
            min_vertical_fit: None,
            fraud_statuses: criteria.fraud_statuses.clone(),
            exclude_fraud_statuses: if wants_flagged {
                Vec::new()
            } else {
                FraudStatus::FLAGGED.to_vec()
            },
        }
    }

    /// Candidate pool predicate for a campaign
    pub fn from_campaign(campaign: &CampaignCriteria) -> Self {
        Self {
            platforms: campaign.platforms.clone(),
            regions: campaign.region.into_iter().collect(),
            min_vertical_fit: campaign.min_vertical_fit,
            exclude_fraud_statuses: FraudStatus::FLAGGED.to_vec(),
            ..Self::default()
        }
    }

    pub fn with_platforms(&self, platforms: Vec<Platform>) -> Self {
        Self {
            platforms,
            ..self.clone()
        }
    }

    /// Narrow the follower range to one tier
    pub fn within_tier(&self, tier: Tier) -> Self {
        let (tier_min, tier_max) = tier.follower_range();
        let max_followers = match (self.max_followers, tier_max) {
            (Some(own), Some(tier_max)) => Some(own.min(tier_max)),
            (own, tier_max) => own.or(tier_max),
        };

        Self {
            min_followers: Some(self.min_followers.map_or(tier_min, |own| own.max(tier_min))),
            max_followers,
            ..self.clone()
        }
    }

    /// Evaluate the predicate against a record in memory
    pub fn matches(&self, creator: &CreatorRecord) -> bool {
        if let Some(ids) = &self.ids {
            if !ids.contains(&creator.id) {
                return false;
            }
        }

        if !self.platforms.is_empty() && !self.platforms.contains(&creator.platform) {
            return false;
        }

        if !self.regions.is_empty()
            && !creator.region.is_some_and(|r| self.regions.contains(&r))
        {
            return false;
        }

        if self.min_followers.is_some_and(|min| creator.followers < min)
            || self.max_followers.is_some_and(|max| creator.followers > max)
        {
            return false;
        }

        let viewers = creator.current_viewers.unwrap_or(0);
        if self.min_viewers.is_some_and(|min| creator.current_viewers.is_none() || viewers < min)
            || self.max_viewers.is_some_and(|max| viewers > max)
        {
            return false;
        }

        if self.is_live.is_some_and(|live| creator.is_live != live) {
            return false;
        }

        if let Some(camera) = self.uses_camera {
            if creator.uses_camera != Some(camera) {
                return false;
            }
        }

        if self.is_vtuber.is_some_and(|vtuber| creator.is_vtuber != vtuber) {
            return false;
        }

        if let Some(language) = &self.language {
            match &creator.language {
                Some(l) if l.eq_ignore_ascii_case(language) => {}
                _ => return false,
            }
        }

        if self.min_vertical_fit.is_some_and(|min| creator.vertical_fit_score < min) {
            return false;
        }

        if !self.fraud_statuses.is_empty() && !self.fraud_statuses.contains(&creator.fraud_status) {
            return false;
        }

        !self.exclude_fraud_statuses.contains(&creator.fraud_status)
    }
}

/// One key of a multi-key result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Current viewers, highest first, creators with no viewer count last
    ViewersDesc,
    FollowersDesc,
    /// Live creators first
    LiveDesc,
    IdAsc,
}

impl SortKey {
    pub fn compare(&self, a: &CreatorRecord, b: &CreatorRecord) -> Ordering {
        match self {
            SortKey::ViewersDesc => b.current_viewers.cmp(&a.current_viewers),
            SortKey::FollowersDesc => b.followers.cmp(&a.followers),
            SortKey::LiveDesc => b.is_live.cmp(&a.is_live),
            SortKey::IdAsc => a.id.cmp(&b.id),
        }
    }

    /// Compare by each key in turn until one breaks the tie
    pub fn compare_all(keys: &[SortKey], a: &CreatorRecord, b: &CreatorRecord) -> Ordering {
        keys.iter()
            .map(|key| key.compare(a, b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Recommendation component weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub vertical_fit: f64,
    pub historical_performance: f64,
    pub brand_safety: f64,
    pub budget_alignment: f64,
    pub user_history: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            vertical_fit: 0.30,
            historical_performance: 0.25,
            brand_safety: 0.20,
            budget_alignment: 0.15,
            user_history: 0.10,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.vertical_fit
            + self.historical_performance
            + self.brand_safety
            + self.budget_alignment
            + self.user_history
    }

    /// Weights must be non-negative and sum to 1.0
    pub fn is_normalized(&self) -> bool {
        let all_non_negative = [
            self.vertical_fit,
            self.historical_performance,
            self.brand_safety,
            self.budget_alignment,
            self.user_history,
        ]
        .iter()
        .all(|w| *w >= 0.0);

        all_non_negative && (self.sum() - 1.0).abs() < 1e-9
    }
}
