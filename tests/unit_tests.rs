// Unit tests for Creator Scout

use std::sync::Arc;

use creator_scout::core::interpreter::{
    detect_camera, detect_language, detect_live, detect_min_followers, detect_platforms,
    detect_regions, detect_vtuber, extract_result_count, extract_tag_phrase,
};
use creator_scout::core::mixer::{interleave, PlatformMixer, PlatformShare};
use creator_scout::core::scoring::{calculate_budget_alignment, estimated_tier_rate};
use creator_scout::core::tags::matches_tag;
use creator_scout::core::validator::{detect_region_groups, normalize_tags};
use creator_scout::core::{CriteriaValidator, QueryInterpreter, RecommendationScorer, Taxonomy};
use creator_scout::models::{
    CampaignCriteria, CreatorFilter, CreatorRecord, FraudStatus, Platform, Region,
    SearchCriteria, SortKey, TagFields, Tier, MAX_RESULT_LIMIT,
};
use creator_scout::services::{CreatorRepository, InMemoryCreatorRepository};

fn interpreter() -> QueryInterpreter {
    QueryInterpreter::new(Arc::new(Taxonomy::builtin().unwrap()))
}

fn create_creator(id: &str, followers: u64, viewers: Option<u64>, live: bool) -> CreatorRecord {
    CreatorRecord {
        id: id.to_string(),
        platform: Platform::Twitch,
        username: id.to_string(),
        display_name: id.to_string(),
        followers,
        current_viewers: viewers,
        is_live: live,
        tags: vec!["slots".to_string()],
        current_content: Some("Slots".to_string()),
        recent_content: vec!["casino".to_string()],
        region: Some(Region::Argentina),
        language: Some("es".to_string()),
        uses_camera: Some(true),
        is_vtuber: false,
        vertical_fit_score: 55.0,
        vertical_compatible: false,
        brand_safety_score: 75.0,
        total_conversions: 120,
        avg_cpa: Some(150.0),
        avg_roi: 4.0,
        engagement_rate: 12.0,
        fraud_status: FraudStatus::Unchecked,
        updated_at: None,
    }
}

#[test]
fn test_interpreter_never_fails_on_empty_text() {
    let criteria = interpreter().interpret("");
    assert!(criteria.has_no_signal());
    assert_eq!(criteria.limit, None);
}

#[test]
fn test_gta_never_sets_guatemala() {
    for text in ["GTA streamers", "gta v roleplay", "GTA RP in Mexico"] {
        let criteria = interpreter().interpret(text);
        assert!(!criteria.regions.contains(&Region::Guatemala), "{}", text);
    }
    assert_eq!(detect_regions("gt streamers"), vec![Region::Guatemala]);
}

#[test]
fn test_latin_american_never_sets_united_states() {
    let validator = CriteriaValidator::default();

    let text = "Latin American casino streamers";
    let validated = validator.validate(interpreter().interpret(text), text);
    assert!(!validated.regions.contains(&Region::UnitedStates));
    assert_eq!(validated.tags[0], "casino");

    let text = "South American streamers";
    let validated = validator.validate(interpreter().interpret(text), text);
    assert_eq!(validated.regions.len(), 10);
    assert!(validated.regions.contains(&Region::Argentina));
    assert!(!validated.regions.contains(&Region::UnitedStates));

    let text = "streamers in Latin America";
    let validated = validator.validate(interpreter().interpret(text), text);
    assert_eq!(validated.regions.len(), 20);
}

#[test]
fn test_show_me_seven_overrides_weaker_limit() {
    let validator = CriteriaValidator::default();
    let criteria = interpreter().interpret_with_context(
        "show me 7 casino streamers",
        Some(&SearchCriteria {
            limit: Some(200),
            ..SearchCriteria::default()
        }),
    );

    let validated = validator.validate(criteria, "show me 7 casino streamers");
    assert_eq!(validated.limit, Some(7));
}

#[test]
fn test_out_of_range_counts_never_become_the_limit() {
    for text in ["I need 0 streamers", "I need 10001 streamers", "top 99999 creators"] {
        assert_eq!(extract_result_count(text), None, "{}", text);
    }
    let validated = CriteriaValidator::default().validate(
        interpreter().interpret("I need 10001 casino streamers"),
        "I need 10001 casino streamers",
    );
    assert_eq!(validated.limit, Some(MAX_RESULT_LIMIT));
}

#[test]
fn test_independent_matchers() {
    assert_eq!(detect_platforms("youtube or tiktok creators"), vec![Platform::YouTube, Platform::TikTok]);
    assert_eq!(detect_min_followers("at least 250k followers"), Some(250_000));
    assert_eq!(detect_live("streaming now"), Some(true));
    assert_eq!(detect_language("english speaking"), Some("en".to_string()));
    assert_eq!(detect_vtuber("virtual youtubers"), Some(true));
    assert_eq!(detect_camera("sin cámara"), Some(false));
    assert_eq!(extract_tag_phrase("fortnite streamers on twitch").as_deref(), Some("fortnite"));
}

#[test]
fn test_brand_taxonomy_expansion() {
    let tags = interpreter().extract_tags("creators for a Caliente campaign");
    assert!(tags.contains(&"sports betting".to_string()) || tags.contains(&"casino".to_string()));
    assert!(tags.iter().all(|t| *t == t.to_lowercase()));
}

#[test]
fn test_tag_normalization_idempotent() {
    let tags = vec!["Casino".to_string(), " SLOTS".to_string(), "casino".to_string()];
    let once = normalize_tags(&tags);
    assert_eq!(normalize_tags(&once), once);
}

#[test]
fn test_region_groupings() {
    let caribbean = detect_region_groups("caribbean creators");
    assert_eq!(caribbean, vec![Region::Cuba, Region::DominicanRepublic, Region::PuertoRico]);
    assert!(detect_region_groups("iberia").contains(&Region::Portugal));
    assert!(detect_region_groups("cooking").is_empty());
}

#[test]
fn test_tag_matching_rules() {
    let fields = TagFields {
        id: "x".to_string(),
        tags: vec!["Sports Betting".to_string()],
        current_content: None,
        recent_content: vec![],
    };
    assert!(matches_tag(&fields, "sports betting"));
    assert!(matches_tag(&fields, "betting tips"));
    assert!(!matches_tag(&fields, "poker"));
}

#[test]
fn test_mixer_allocation_and_interleave() {
    let mixer = PlatformMixer::default();
    let targets = mixer.allocate(20);
    assert_eq!(targets, vec![(Platform::Twitch, 8), (Platform::YouTube, 6), (Platform::Kick, 6)]);

    let custom = PlatformMixer::new(vec![
        PlatformShare { platform: Platform::TikTok, share: 2.0 },
        PlatformShare { platform: Platform::Instagram, share: 1.0 },
    ]);
    assert_eq!(custom.allocate(3), vec![(Platform::TikTok, 2), (Platform::Instagram, 1)]);

    assert_eq!(interleave(vec![vec!["a", "c"], vec!["b"]]), vec!["a", "b", "c"]);
}

#[test]
fn test_budget_alignment_properties() {
    let rate = estimated_tier_rate(Tier::Mid);
    assert_eq!(calculate_budget_alignment(Tier::Mid, Some(rate / 0.35)), 100.0);
    assert_eq!(calculate_budget_alignment(Tier::Mid, Some(rate / 2.0)), 0.0);
    assert_eq!(calculate_budget_alignment(Tier::Mid, Some(rate / 3.0)), 0.0);
    assert_eq!(calculate_budget_alignment(Tier::Mid, None), 50.0);
}

#[test]
fn test_composite_score_bounds() {
    let scorer = RecommendationScorer::default();
    let creator = create_creator("a", 30_000, None, false);

    for campaign in [
        CampaignCriteria::default(),
        CampaignCriteria {
            vertical: Some("slots".to_string()),
            budget: Some(1.0),
            ..CampaignCriteria::default()
        },
    ] {
        let (score, breakdown) = scorer.score(&creator, &campaign, Some(std::slice::from_ref(&creator)));
        assert!((0.0..=100.0).contains(&score));
        for component in [
            breakdown.vertical_fit,
            breakdown.historical_performance,
            breakdown.brand_safety,
            breakdown.budget_alignment,
            breakdown.user_history,
        ] {
            assert!((0.0..=100.0).contains(&component));
        }
    }
}

#[test]
fn test_memory_repository_viewer_ordering() {
    let repo = InMemoryCreatorRepository::new(vec![
        create_creator("a", 10, None, true),
        create_creator("b", 20, Some(500), true),
        create_creator("c", 30, Some(900), true),
        create_creator("d", 40, Some(900), false),
    ]);

    let filter = CreatorFilter {
        is_live: Some(true),
        ..CreatorFilter::default()
    };
    let order = [SortKey::ViewersDesc, SortKey::FollowersDesc, SortKey::IdAsc];

    let found = tokio_test::block_on(repo.find(&filter, &order, 10, 0)).unwrap();
    let ids: Vec<&str> = found.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b", "a"]);

    let count = tokio_test::block_on(repo.count(&filter)).unwrap();
    assert_eq!(count, 3);
}

#[test]
fn test_memory_repository_tag_projection() {
    let repo = InMemoryCreatorRepository::new(vec![
        create_creator("b", 10, None, false),
        create_creator("a", 20, None, false),
    ]);

    let projection = tokio_test::block_on(repo.find_tag_fields(&CreatorFilter::default(), 1)).unwrap();
    assert_eq!(projection.len(), 1);
    assert_eq!(projection[0].id, "a");
    assert_eq!(projection[0].current_content.as_deref(), Some("Slots"));
}
