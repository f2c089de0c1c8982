use std::env;
use std::sync::Arc;
use tracing::info;

use osusume::config::RankingConfig;
use osusume::engine::RecommendationEngine;
use osusume::environment::get_env_var_as_vec;
use osusume::logging;
use osusume::server;
use osusume::source::HttpSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::configure_logging();

    let base_url =
        env::var("UPSTREAM_BASE_URL").unwrap_or_else(|_| "http://localhost:3000/api/".to_string());
    info!("Using upstream API at {}", base_url);

    let source = Arc::new(HttpSource::new(&base_url)?);

    let mut config = RankingConfig::default();
    let fallback_topics = get_env_var_as_vec("FALLBACK_TOPICS", ';');
    if !fallback_topics.is_empty() {
        config.fallback_topics = fallback_topics;
    }

    let engine = Arc::new(RecommendationEngine::with_config(source, config));
    server::serve(engine).await
}
