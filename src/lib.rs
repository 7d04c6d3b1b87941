//! Creator Scout - creator search and campaign recommendation service
//!
//! Turns free-text marketing briefs into structured creator searches,
//! balances results across streaming platforms, and ranks creators for
//! campaigns with a weighted, tier-diversified score.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    CriteriaValidator, DiversitySelector, PlatformMixer, QueryInterpreter, RecommendationScorer,
    Recommender, SearchEngine, SearchExecutor, Taxonomy,
};
pub use models::{
    CampaignCriteria, CreatorRecord, RecommendedCreator, ScoringWeights, SearchCriteria,
    SearchResult,
};
pub use services::{CreatorRepository, InMemoryCreatorRepository, RepositoryError};
