use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use creator_scout::config::{LoggingSettings, RepositoryBackend, Settings};
use creator_scout::core::{
    CriteriaValidator, DiversitySelector, QueryInterpreter, RecommendationScorer, Recommender,
    SearchEngine, SearchExecutor, Taxonomy,
};
use creator_scout::routes::{self, handle_json_payload_error, handle_query_payload_error, AppState};
use creator_scout::services::{
    CacheManager, CreatorRepository, HttpConversationalParser, InMemoryCreatorRepository,
    PostgresCreatorRepository,
};

fn init_tracing(logging: &LoggingSettings) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if logging.is_pretty() {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, e);
    std::io::Error::other(format!("{}: {}", context, e))
}

async fn build_repository(settings: &Settings) -> std::io::Result<Arc<dyn CreatorRepository>> {
    match settings.repository.backend {
        RepositoryBackend::Memory => {
            let repository = match &settings.repository.seed_file {
                Some(path) => InMemoryCreatorRepository::from_seed_file(path)
                    .map_err(|e| startup_error("Failed to load seed file", e))?,
                None => {
                    warn!("Memory backend without a seed file; the creator store is empty");
                    InMemoryCreatorRepository::default()
                }
            };
            info!("In-memory creator store ready ({} creators)", repository.len());
            Ok(Arc::new(repository))
        }
        RepositoryBackend::Postgres => {
            let db = &settings.database;
            let url = db
                .url
                .as_deref()
                .ok_or_else(|| startup_error("Configuration error", "DATABASE_URL is not set"))?;

            let repository = PostgresCreatorRepository::from_settings(
                url,
                db.max_connections,
                db.min_connections,
                db.acquire_timeout_secs,
                db.idle_timeout_secs,
            )
            .await
            .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

            info!(
                "PostgreSQL creator store initialized (max: {} connections)",
                db.max_connections.unwrap_or(10)
            );
            Ok(Arc::new(repository))
        }
    }
}

/// Cache is optional: the service runs without it when disabled or when
/// Redis cannot be reached
async fn build_cache(settings: &Settings) -> Option<Arc<CacheManager>> {
    let cache = &settings.cache;
    if !cache.enabled {
        return None;
    }

    let ttl = cache.ttl_secs.unwrap_or(300);
    let l1_size = cache.l1_cache_size.unwrap_or(10_000);

    let manager = match &cache.redis_url {
        Some(url) => match CacheManager::new(url, l1_size, ttl).await {
            Ok(manager) => manager,
            Err(e) => {
                warn!("Failed to connect to Redis ({}), using in-process cache only", e);
                CacheManager::memory_only(l1_size, ttl)
            }
        },
        None => CacheManager::memory_only(l1_size, ttl),
    };

    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s, shared tier: {})",
        l1_size,
        ttl,
        manager.has_shared_tier()
    );
    Some(Arc::new(manager))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Logging comes from the loaded settings; a broken config still gets
    // the default subscriber so the failure is reported
    let settings = Settings::load();
    let logging = match &settings {
        Ok(settings) => settings.logging.clone(),
        Err(_) => LoggingSettings::default(),
    };
    init_tracing(&logging.with_env_overrides());

    info!("Starting creator scout service...");

    let settings = settings.map_err(|e| startup_error("Failed to load configuration", e))?;
    let weights = settings
        .scoring
        .weights
        .to_weights()
        .map_err(|e| startup_error("Invalid scoring weights", e))?;

    info!("Configuration loaded successfully");

    let taxonomy = Taxonomy::load(settings.taxonomy.path.as_deref())
        .map_err(|e| startup_error("Failed to load taxonomy", e))?;

    let repository = build_repository(&settings).await?;
    let cache = build_cache(&settings).await;

    let executor = SearchExecutor::new(
        repository.clone(),
        settings.search.mixer(),
        settings.search.tag_scan_cap,
    );
    let mut engine = SearchEngine::new(
        QueryInterpreter::new(Arc::new(taxonomy)),
        CriteriaValidator::new(settings.search.default_language.clone()),
        executor,
    );

    if settings.parser.enabled {
        match &settings.parser.endpoint {
            Some(endpoint) => {
                let parser = HttpConversationalParser::new(
                    endpoint.clone(),
                    settings.parser.api_key.clone(),
                    Duration::from_secs(settings.parser.timeout_secs.unwrap_or(10)),
                )
                .map_err(|e| startup_error("Failed to build parser client", e))?;
                engine = engine.with_parser(Arc::new(parser));
                info!("Conversational parser enabled at {}", endpoint);
            }
            None => warn!("Parser enabled without an endpoint; using the heuristic interpreter only"),
        }
    }

    let recommender = Recommender::new(
        repository.clone(),
        RecommendationScorer::new(weights),
        DiversitySelector::new(settings.recommendation.tier_ratios),
        settings.recommendation.candidate_pool,
    );

    info!("Recommender initialized with weights: {:?}", weights);

    let app_state = AppState {
        engine,
        recommender,
        repository,
        cache,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
