// Integration tests for Creator Scout

use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use creator_scout::core::{
    CriteriaValidator, DiversitySelector, PlatformMixer, QueryInterpreter, RecommendationScorer,
    Recommender, SearchEngine, SearchExecutor, Taxonomy,
};
use creator_scout::models::{
    CampaignCriteria, CreatorFilter, CreatorRecord, FraudStatus, HealthResponse, Platform,
    RecommendResponse, Region, SearchCriteria, SearchResult, SortKey, Tier,
};
use creator_scout::routes::{self, handle_json_payload_error, AppState};
use creator_scout::services::{
    CacheManager, CacheStats, CreatorRepository, InMemoryCreatorRepository, RepositoryError,
};

fn create_creator(
    id: &str,
    platform: Platform,
    region: Region,
    followers: u64,
    tags: &[&str],
) -> CreatorRecord {
    CreatorRecord {
        id: id.to_string(),
        platform,
        username: id.to_string(),
        display_name: format!("Creator {}", id),
        followers,
        current_viewers: None,
        is_live: false,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        current_content: None,
        recent_content: vec![],
        region: Some(region),
        language: Some("es".to_string()),
        uses_camera: None,
        is_vtuber: false,
        vertical_fit_score: 70.0,
        vertical_compatible: true,
        brand_safety_score: 80.0,
        total_conversions: 25,
        avg_cpa: Some(30.0),
        avg_roi: 2.0,
        engagement_rate: 5.0,
        fraud_status: FraudStatus::Passed,
        updated_at: None,
    }
}

/// 30 Mexican casino creators above 100k followers (12 twitch, 9 youtube,
/// 9 kick) plus creators that each miss one constraint
fn mexico_casino_store() -> Vec<CreatorRecord> {
    let mut creators = Vec::new();
    for (platform, count) in [(Platform::Twitch, 12), (Platform::YouTube, 9), (Platform::Kick, 9)] {
        for i in 0..count {
            creators.push(create_creator(
                &format!("mx-{}-{:02}", platform, i),
                platform,
                Region::Mexico,
                100_000 + i * 5_000,
                &["casino", "slots"],
            ));
        }
    }

    let mut flagged = create_creator("flagged", Platform::Kick, Region::Mexico, 400_000, &["casino"]);
    flagged.fraud_status = FraudStatus::Flagged;
    creators.push(flagged);
    creators.push(create_creator("chile", Platform::Kick, Region::Chile, 400_000, &["casino"]));
    creators.push(create_creator("small", Platform::Twitch, Region::Mexico, 50_000, &["casino"]));
    creators.push(create_creator("poker", Platform::YouTube, Region::Mexico, 300_000, &["poker"]));

    creators
}

fn build_engine(repository: Arc<dyn CreatorRepository>) -> SearchEngine {
    SearchEngine::new(
        QueryInterpreter::new(Arc::new(Taxonomy::builtin().unwrap())),
        CriteriaValidator::default(),
        SearchExecutor::new(repository, PlatformMixer::default(), 5_000),
    )
}

fn build_recommender(repository: Arc<dyn CreatorRepository>) -> Recommender {
    Recommender::new(
        repository,
        RecommendationScorer::default(),
        DiversitySelector::default(),
        1_000,
    )
}

/// Store whose per-platform queries fail, as a broken shard would
struct PlatformQueriesFail(InMemoryCreatorRepository);

#[async_trait]
impl CreatorRepository for PlatformQueriesFail {
    async fn find(
        &self,
        filter: &CreatorFilter,
        order: &[SortKey],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreatorRecord>, RepositoryError> {
        if filter.platforms.len() == 1 {
            return Err(RepositoryError::Unavailable("platform shard down".to_string()));
        }
        self.0.find(filter, order, limit, offset).await
    }

    async fn count(&self, filter: &CreatorFilter) -> Result<u64, RepositoryError> {
        self.0.count(filter).await
    }

    async fn find_favorites(&self, user_id: &str) -> Result<Vec<CreatorRecord>, RepositoryError> {
        self.0.find_favorites(user_id).await
    }
}

#[tokio::test]
async fn test_end_to_end_mexico_casino_search() {
    let repository = Arc::new(InMemoryCreatorRepository::new(mexico_casino_store()));
    let engine = build_engine(repository);

    let (criteria, result) = engine
        .search("top 50 casino streamers in Mexico with over 100k followers", None, None)
        .await
        .unwrap();

    assert_eq!(criteria.regions, vec![Region::Mexico]);
    assert_eq!(criteria.min_followers, Some(100_000));
    assert_eq!(criteria.limit, Some(50));
    assert!(criteria.tags.contains(&"casino".to_string()));

    assert_eq!(result.total_count, 30);
    assert_eq!(result.creators.len(), 30);
    assert_eq!(result.total_pages, 1);
    assert!(!result.has_more);
    assert!(result.creators.iter().all(|c| c.id.starts_with("mx-")));
}

#[tokio::test]
async fn test_mixed_page_keeps_platform_shares() {
    let mut creators = Vec::new();
    for platform in [Platform::Twitch, Platform::YouTube, Platform::Kick] {
        for i in 0..30 {
            creators.push(create_creator(
                &format!("{}-{:02}", platform, i),
                platform,
                Region::Mexico,
                20_000 + i,
                &["slots"],
            ));
        }
    }
    let engine = build_engine(Arc::new(InMemoryCreatorRepository::new(creators)));

    let (_, result) = engine.search("top 10 slots streamers", None, None).await.unwrap();

    let count = |p: Platform| result.creators.iter().filter(|c| c.platform == p).count();
    assert_eq!(result.creators.len(), 10);
    assert_eq!(count(Platform::Twitch), 4);
    assert_eq!(count(Platform::YouTube), 3);
    assert_eq!(count(Platform::Kick), 3);

    let leading: Vec<Platform> = result.creators.iter().take(3).map(|c| c.platform).collect();
    assert_eq!(leading, vec![Platform::Twitch, Platform::YouTube, Platform::Kick]);

    assert_eq!(result.total_count, 90);
    assert!(result.has_more);
}

#[tokio::test]
async fn test_mixer_failure_falls_back_to_unmixed_query() {
    let repository = PlatformQueriesFail(InMemoryCreatorRepository::new(mexico_casino_store()));
    let engine = build_engine(Arc::new(repository));

    let (_, result) = engine
        .search("top 50 casino streamers in Mexico with over 100k followers", None, None)
        .await
        .unwrap();

    assert_eq!(result.total_count, 30);
    assert_eq!(result.creators.len(), 30);
    // Unmixed ordering: followers desc
    assert!(result.creators.windows(2).all(|w| w[0].followers >= w[1].followers));
}

/// 30 Mexican casino creators split unevenly across the mixed platforms
fn skewed_casino_store(split: [(Platform, u64); 3]) -> Vec<CreatorRecord> {
    let mut creators = Vec::new();
    for (platform, count) in split {
        for i in 0..count {
            creators.push(create_creator(
                &format!("mx-{}-{:02}", platform, i),
                platform,
                Region::Mexico,
                150_000 + i * 1_000,
                &["casino"],
            ));
        }
    }
    creators
}

#[tokio::test]
async fn test_mixed_search_backfills_short_platforms() {
    let store = skewed_casino_store([(Platform::Twitch, 26), (Platform::YouTube, 2), (Platform::Kick, 2)]);
    let engine = build_engine(Arc::new(InMemoryCreatorRepository::new(store)));

    let (_, result) = engine
        .search("top 50 casino streamers in Mexico with over 100k followers", None, None)
        .await
        .unwrap();

    assert_eq!(result.total_count, 30);
    assert_eq!(result.creators.len(), 30);
    assert!(!result.has_more);

    let leading: Vec<Platform> = result.creators.iter().take(3).map(|c| c.platform).collect();
    assert_eq!(leading, vec![Platform::Twitch, Platform::YouTube, Platform::Kick]);
}

#[tokio::test]
async fn test_mixed_pages_cover_every_creator_once() {
    let store = skewed_casino_store([(Platform::Twitch, 2), (Platform::YouTube, 26), (Platform::Kick, 2)]);
    let engine = build_engine(Arc::new(InMemoryCreatorRepository::new(store)));
    let query = "top 10 casino streamers in Mexico with over 100k followers";

    let mut seen = std::collections::HashSet::new();
    for page in 1..=3 {
        let (_, result) = engine.search(query, None, Some(page)).await.unwrap();
        assert_eq!(result.total_count, 30);
        assert_eq!(result.creators.len(), 10, "page {}", page);
        assert_eq!(result.has_more, page < 3);
        for creator in result.creators {
            assert!(seen.insert(creator.id.clone()), "{} returned twice", creator.id);
        }
    }
    assert_eq!(seen.len(), 30);

    let (_, past_end) = engine.search(query, None, Some(4)).await.unwrap();
    assert!(past_end.creators.is_empty());
}

/// Slots creators on every platform, including the two outside the mix
fn all_platform_store() -> Vec<CreatorRecord> {
    let mut creators = Vec::new();
    for platform in Platform::ALL {
        for i in 0..5 {
            creators.push(create_creator(
                &format!("{}-{:02}", platform, i),
                platform,
                Region::Mexico,
                30_000 + i,
                &["slots"],
            ));
        }
    }
    creators
}

#[tokio::test]
async fn test_unlisted_platforms_are_returned_and_counted() {
    let engine = build_engine(Arc::new(InMemoryCreatorRepository::new(all_platform_store())));

    let (_, result) = engine.search("slots streamers", None, None).await.unwrap();

    assert_eq!(result.total_count, 25);
    assert_eq!(result.creators.len(), 25);
    for platform in [Platform::TikTok, Platform::Instagram] {
        assert_eq!(result.creators.iter().filter(|c| c.platform == platform).count(), 5);
    }
    // Mixed platforms come first, unlisted ones fill in after them
    assert!(result.creators[..15]
        .iter()
        .all(|c| matches!(c.platform, Platform::Twitch | Platform::YouTube | Platform::Kick)));
}

#[tokio::test]
async fn test_mixed_and_fallback_paths_agree_on_totals() {
    let mixed = build_engine(Arc::new(InMemoryCreatorRepository::new(all_platform_store())));
    let fallback = build_engine(Arc::new(PlatformQueriesFail(InMemoryCreatorRepository::new(
        all_platform_store(),
    ))));

    let (_, mixed_result) = mixed.search("top 10 slots streamers", None, None).await.unwrap();
    let (_, fallback_result) = fallback.search("top 10 slots streamers", None, None).await.unwrap();

    assert_eq!(mixed_result.total_count, 25);
    assert_eq!(fallback_result.total_count, mixed_result.total_count);
    assert_eq!(fallback_result.creators.len(), mixed_result.creators.len());
}

#[tokio::test]
async fn test_explicit_platform_is_not_mixed() {
    let engine = build_engine(Arc::new(InMemoryCreatorRepository::new(mexico_casino_store())));

    let (_, result) = engine
        .search("casino streamers on kick in Mexico with over 100k followers", None, None)
        .await
        .unwrap();

    assert_eq!(result.total_count, 9);
    assert!(result.creators.iter().all(|c| c.platform == Platform::Kick));
}

#[tokio::test]
async fn test_no_tag_match_is_an_empty_result() {
    let engine = build_engine(Arc::new(InMemoryCreatorRepository::new(mexico_casino_store())));

    let (_, result) = engine.search("cooking streamers in Mexico", None, None).await.unwrap();

    assert_eq!(result, SearchResult::empty(1));
}

#[tokio::test]
async fn test_follow_up_keeps_earlier_criteria() {
    let engine = build_engine(Arc::new(InMemoryCreatorRepository::new(mexico_casino_store())));

    let (previous, _) = engine
        .search("casino streamers in Mexico with over 100k followers", None, None)
        .await
        .unwrap();
    let (criteria, result) = engine.search("only youtube", Some(&previous), None).await.unwrap();

    assert_eq!(criteria.platforms, vec![Platform::YouTube]);
    assert_eq!(criteria.regions, vec![Region::Mexico]);
    assert_eq!(result.total_count, 9);
}

#[tokio::test]
async fn test_recommendations_are_tier_diversified() {
    let mut creators = Vec::new();
    for (tier_base, prefix) in [(1_000, "nano"), (20_000, "micro"), (100_000, "mid"), (800_000, "macro")] {
        for i in 0..12 {
            creators.push(create_creator(
                &format!("{}-{:02}", prefix, i),
                Platform::Twitch,
                Region::Mexico,
                tier_base + i,
                &["casino"],
            ));
        }
    }
    let recommender = build_recommender(Arc::new(InMemoryCreatorRepository::new(creators)));

    let campaign = CampaignCriteria {
        vertical: Some("casino".to_string()),
        budget: Some(10_000.0),
        count: 20,
        ..CampaignCriteria::default()
    };
    let outcome = recommender.recommend(&campaign, None).await.unwrap();

    let tiers: Vec<usize> = Tier::ALL
        .iter()
        .map(|t| outcome.creators.iter().filter(|c| c.tier == *t).count())
        .collect();
    assert_eq!(tiers, vec![6, 7, 6, 1]);
    assert_eq!(outcome.total_candidates, 48);
    assert!(outcome.creators.iter().all(|c| (0.0..=100.0).contains(&c.score)));
    assert!(outcome.creators.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_recommendations_over_asking_returns_pool() {
    let creators = (0..5)
        .map(|i| create_creator(&format!("c{}", i), Platform::Kick, Region::Peru, 5_000, &["slots"]))
        .collect();
    let recommender = build_recommender(Arc::new(InMemoryCreatorRepository::new(creators)));

    let campaign = CampaignCriteria {
        region: Some(Region::Peru),
        count: 50,
        ..CampaignCriteria::default()
    };
    let outcome = recommender.recommend(&campaign, Some("nobody")).await.unwrap();

    assert_eq!(outcome.creators.len(), 5);
}

fn app_state() -> AppState {
    let repository: Arc<dyn CreatorRepository> =
        Arc::new(InMemoryCreatorRepository::new(mexico_casino_store()));
    AppState {
        engine: build_engine(repository.clone()),
        recommender: build_recommender(repository.clone()),
        repository,
        cache: None,
    }
}

#[actix_web::test]
async fn test_http_search_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/creators/search")
        .set_json(json!({"query": "top 50 casino streamers in Mexico with over 100k followers"}))
        .to_request();
    let result: SearchResult = test::call_and_read_body_json(&app, req).await;

    assert_eq!(result.total_count, 30);
    assert!(!result.has_more);
}

#[actix_web::test]
async fn test_http_interpret_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/creators/interpret")
        .set_json(json!({"query": "show me 7 casino streamers"}))
        .to_request();
    let criteria: SearchCriteria = test::call_and_read_body_json(&app, req).await;

    assert_eq!(criteria.limit, Some(7));
    assert_eq!(criteria.tags[0], "casino");
}

#[actix_web::test]
async fn test_http_recommendations_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({"userId": "user-1", "campaign": {"vertical": "casino", "count": 5}}))
        .to_request();
    let response: RecommendResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(response.creators.len(), 5);
    assert!(!response.request_id.is_empty());
    assert_eq!(response.tier_counts.iter().map(|t| t.count).sum::<usize>(), 5);
}

#[actix_web::test]
async fn test_http_validation_and_payload_errors() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .set_json(json!({"campaign": {"count": 0}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/v1/creators/search")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
    assert_eq!(body["statusCode"], 400);
}

#[actix_web::test]
async fn test_http_health() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let health: HealthResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(health.status, "healthy");
}

#[tokio::test]
async fn test_seed_file_backs_the_memory_store() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/creators.json");
    let repo = InMemoryCreatorRepository::from_seed_file(path).unwrap();
    assert_eq!(repo.len(), 48);

    let favorites = repo.find_favorites("demo-user").await.unwrap();
    assert_eq!(favorites.len(), 3);

    let visible = repo.count(&CreatorFilter::default()).await.unwrap();
    assert!(visible > 0 && visible <= 48);
}

#[tokio::test]
async fn test_missing_seed_file_is_an_error() {
    let result = InMemoryCreatorRepository::from_seed_file("does/not/exist.json");
    assert!(matches!(result, Err(RepositoryError::SeedError(_))));
}

#[actix_web::test]
async fn test_http_cached_search_and_invalidation() {
    let state = AppState {
        cache: Some(Arc::new(CacheManager::memory_only(100, 60))),
        ..app_state()
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/v1/creators/search")
            .set_json(json!({"query": "casino streamers on kick in Mexico with over 100k followers"}))
            .to_request();
        let result: SearchResult = test::call_and_read_body_json(&app, req).await;
        assert_eq!(result.total_count, 9);
    }

    let req = test::TestRequest::get().uri("/api/v1/cache/stats").to_request();
    let stats: CacheStats = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats.hit_count, 1);
    assert_eq!(stats.miss_count, 1);

    let req = test::TestRequest::post().uri("/api/v1/cache/invalidate").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);
}

#[actix_web::test]
async fn test_http_cache_endpoints_without_cache() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state()))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/cache/stats").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
