use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{CampaignCriteria, SearchCriteria};

/// Free-text creator search
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub query: String,
    /// Criteria known from earlier turns of the conversation
    #[serde(default, alias = "preset_criteria", rename = "presetCriteria")]
    pub preset_criteria: Option<SearchCriteria>,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub page: Option<u32>,
}

/// Ranked creator list for a campaign
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(length(min = 1, max = 128))]
    #[serde(default, alias = "user_id", rename = "userId")]
    pub user_id: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub campaign: CampaignCriteria,
}
