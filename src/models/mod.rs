// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CampaignCriteria, CreatorFilter, CreatorRecord, FraudStatus, Platform, RecommendedCreator,
    Region, ScoreBreakdown, ScoringWeights, SearchCriteria, SearchResult, SortKey, TagFields, Tier,
    MAX_RESULT_LIMIT,
};
pub use requests::{RecommendRequest, SearchRequest};
pub use responses::{ErrorResponse, HealthResponse, RecommendResponse, TierCount};
