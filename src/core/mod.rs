// Core algorithm exports
pub mod diversity;
pub mod engine;
pub mod interpreter;
pub mod mixer;
pub mod recommender;
pub mod scoring;
pub mod search;
pub mod tags;
pub mod taxonomy;
pub mod validator;

pub use diversity::{DiversitySelector, TierRatios};
pub use engine::SearchEngine;
pub use interpreter::QueryInterpreter;
pub use mixer::{PlatformMixer, PlatformShare};
pub use recommender::{RecommendationOutcome, Recommender};
pub use scoring::RecommendationScorer;
pub use search::{ordering_for, SearchExecutor};
pub use tags::{matches_any_tag, matches_tag};
pub use taxonomy::{BrandTaxonomy, Taxonomy, TaxonomyError};
pub use validator::CriteriaValidator;
