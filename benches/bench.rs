// Criterion benchmarks for Creator Scout

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use creator_scout::core::tags::matches_any_tag;
use creator_scout::core::{
    CriteriaValidator, DiversitySelector, PlatformMixer, QueryInterpreter, RecommendationScorer,
    Recommender, SearchEngine, SearchExecutor, Taxonomy,
};
use creator_scout::models::{CampaignCriteria, CreatorRecord, FraudStatus, Platform, Region};
use creator_scout::services::InMemoryCreatorRepository;

const CATEGORIES: &[&str] = &["casino", "slots", "poker", "sports betting", "gta v", "just chatting"];

fn create_creator(id: usize) -> CreatorRecord {
    let platform = Platform::ALL[id % Platform::ALL.len()];
    let category = CATEGORIES[id % CATEGORIES.len()];

    CreatorRecord {
        id: format!("creator-{:05}", id),
        platform,
        username: format!("user{}", id),
        display_name: format!("Creator {}", id),
        followers: 1_000 + (id as u64 * 7_919) % 2_000_000,
        current_viewers: (id % 4 == 0).then_some((id as u64 * 31) % 20_000),
        is_live: id % 4 == 0,
        tags: vec![category.to_string()],
        current_content: Some(category.to_string()),
        recent_content: vec![CATEGORIES[(id + 1) % CATEGORIES.len()].to_string()],
        region: Some(if id % 3 == 0 { Region::Mexico } else { Region::Argentina }),
        language: Some("es".to_string()),
        uses_camera: Some(id % 2 == 0),
        is_vtuber: id % 13 == 0,
        vertical_fit_score: (id % 100) as f64,
        vertical_compatible: id % 5 == 0,
        brand_safety_score: 40.0 + (id % 60) as f64,
        total_conversions: (id % 250) as u64,
        avg_cpa: Some(20.0 + (id % 150) as f64),
        avg_roi: (id % 50) as f64 / 10.0,
        engagement_rate: (id % 15) as f64,
        fraud_status: if id % 17 == 0 { FraudStatus::Flagged } else { FraudStatus::Passed },
        updated_at: None,
    }
}

fn create_repository(size: usize) -> Arc<InMemoryCreatorRepository> {
    Arc::new(InMemoryCreatorRepository::new((0..size).map(create_creator).collect()))
}

fn bench_interpretation(c: &mut Criterion) {
    let interpreter = QueryInterpreter::new(Arc::new(Taxonomy::builtin().unwrap()));
    let validator = CriteriaValidator::default();
    let query = "Show me 25 Spanish speaking casino streamers from Mexico on Kick with over 100k followers";

    c.bench_function("interpret_and_validate", |b| {
        b.iter(|| {
            let criteria = interpreter.interpret(black_box(query));
            validator.validate(criteria, black_box(query))
        });
    });
}

fn bench_tag_matching(c: &mut Criterion) {
    let fields: Vec<_> = (0..1_000).map(|i| create_creator(i).tag_fields()).collect();
    let phrases = vec!["live casino".to_string(), "slots".to_string(), "crypto casino".to_string()];

    c.bench_function("tag_matching_1000_creators", |b| {
        b.iter(|| {
            fields
                .iter()
                .filter(|f| matches_any_tag(f, black_box(&phrases)))
                .count()
        });
    });
}

fn bench_recommendations(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let campaign = CampaignCriteria {
        vertical: Some("casino".to_string()),
        budget: Some(20_000.0),
        ..CampaignCriteria::default()
    };

    let mut group = c.benchmark_group("recommendations");

    for pool in [100usize, 500, 1000].iter() {
        let recommender = Recommender::new(
            create_repository(*pool),
            RecommendationScorer::default(),
            DiversitySelector::default(),
            *pool,
        );

        group.bench_with_input(BenchmarkId::new("recommend", pool), pool, |b, _| {
            b.to_async(&runtime)
                .iter(|| recommender.recommend(black_box(&campaign), None));
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let engine = SearchEngine::new(
        QueryInterpreter::new(Arc::new(Taxonomy::builtin().unwrap())),
        CriteriaValidator::default(),
        SearchExecutor::new(create_repository(5_000), PlatformMixer::default(), 5_000),
    );

    c.bench_function("mixed_search_5000_creators", |b| {
        b.to_async(&runtime)
            .iter(|| engine.search(black_box("top 50 casino streamers in Mexico"), None, None));
    });
}

criterion_group!(
    benches,
    bench_interpretation,
    bench_tag_matching,
    bench_recommendations,
    bench_search
);

criterion_main!(benches);
