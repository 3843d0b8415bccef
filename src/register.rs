//! Component construction from configuration.

use std::sync::Arc;

use tracing::info;

use starsearch_config::{Config, ConfigError, EmbeddingConfig, SearchConfig};
use starsearch_protocols::{EmbeddingProvider, RowStore, SearchMode};
use starsearch_retrieval_hybrid::{
    EmbeddingFailurePolicy, EngineConfig, Indexer, OpenAIEmbedding, OpenAIEmbeddingConfig,
    RetrievalEngine,
};
use starsearch_store_sqlite::SqliteRowStore;
use starsearch_store_vector::{SimpleHashEmbedding, VectorArtifact, VectorStore};

/// Everything a command needs, opened once from the configuration.
pub(crate) struct Components {
    pub engine: Arc<RetrievalEngine>,
    pub indexer: Indexer,
}

/// Open both stores and build the engine and indexer over them.
pub(crate) async fn build_components(
    config: &Config,
) -> Result<Components, Box<dyn std::error::Error>> {
    let embedder = build_embedder(&config.embedding)?;

    let database = config.storage.database_path();
    let rows: Arc<dyn RowStore> = Arc::new(SqliteRowStore::open(&database).await?);

    let artifact = VectorArtifact::from_prefix(config.storage.vectors_prefix());
    let vectors = Arc::new(VectorStore::open(artifact, config.embedding.dimension)?);

    info!(
        "Opened index at {} (provider={}, dimension={}, generation={:?})",
        config.storage.data_dir().display(),
        config.embedding.provider,
        vectors.dimension(),
        vectors.generation()
    );

    let engine = RetrievalEngine::new(
        vectors.clone(),
        rows.clone(),
        embedder.clone(),
        engine_config(&config.search)?,
    );
    let indexer =
        Indexer::new(vectors, rows, embedder).with_batch_size(config.embedding.batch_size);

    Ok(Components {
        engine: Arc::new(engine),
        indexer,
    })
}

/// Consulted when `embedding.api_key` is unset or empty.
const API_KEY_ENV: &str = "OPENAI_API_KEY";

fn resolve_api_key(configured: Option<&str>, from_env: Option<String>) -> Option<String> {
    configured
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .or(from_env)
        .filter(|key| !key.is_empty())
}

/// Build the configured embedding provider.
pub(crate) fn build_embedder(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingProvider>, ConfigError> {
    match config.provider.as_str() {
        "openai" => {
            let from_env = std::env::var(API_KEY_ENV).ok();
            let api_key = resolve_api_key(config.api_key.as_deref(), from_env)
                .ok_or_else(|| ConfigError::MissingField("embedding.api_key".to_string()))?;
            let embedder = OpenAIEmbedding::new(
                OpenAIEmbeddingConfig::new(api_key)
                    .with_model(&config.model)
                    .with_base_url(&config.base_url)
                    .with_dimension(config.dimension),
            );
            Ok(Arc::new(embedder))
        }
        "hash" => Ok(Arc::new(SimpleHashEmbedding::new(config.dimension))),
        other => Err(ConfigError::InvalidValue {
            field: "embedding.provider".to_string(),
            message: format!("unknown provider '{}'", other),
        }),
    }
}

pub(crate) fn engine_config(search: &SearchConfig) -> Result<EngineConfig, ConfigError> {
    let policy = match search.on_embedding_failure.trim().to_ascii_lowercase().as_str() {
        "fail" => EmbeddingFailurePolicy::Fail,
        "degrade" => EmbeddingFailurePolicy::Degrade,
        other => {
            return Err(ConfigError::InvalidValue {
                field: "search.on_embedding_failure".to_string(),
                message: format!("expected 'fail' or 'degrade', got '{}'", other),
            });
        }
    };
    Ok(EngineConfig::default()
        .rrf_k(search.rrf_k)
        .on_embedding_failure(policy))
}

/// Resolve a requested mode and weight against the configured defaults.
pub(crate) fn resolve_mode(
    search: &SearchConfig,
    mode: Option<&str>,
    weight: Option<f32>,
) -> Result<SearchMode, starsearch_protocols::ProtocolError> {
    let name = mode.unwrap_or(&search.default_mode);
    SearchMode::parse(name, weight.unwrap_or(search.semantic_weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mode_defaults() {
        let search = SearchConfig::default();
        let mode = resolve_mode(&search, None, None).unwrap();
        assert_eq!(mode, SearchMode::Fused { semantic_weight: 0.7 });
    }

    #[test]
    fn test_resolve_mode_overrides() {
        let search = SearchConfig::default();
        assert_eq!(
            resolve_mode(&search, Some("keyword"), None).unwrap(),
            SearchMode::Lexical
        );
        assert_eq!(
            resolve_mode(&search, Some("hybrid"), Some(0.25)).unwrap(),
            SearchMode::Fused { semantic_weight: 0.25 }
        );
        assert!(resolve_mode(&search, Some("fused"), Some(2.0)).is_err());
        assert!(resolve_mode(&search, Some("fuzzy"), None).is_err());
    }

    #[test]
    fn test_engine_config_policy() {
        let mut search = SearchConfig::default();
        search.rrf_k = 30;
        search.on_embedding_failure = "Degrade".to_string();

        let config = engine_config(&search).unwrap();
        assert_eq!(config.rrf_k, 30);
        assert_eq!(config.on_embedding_failure, EmbeddingFailurePolicy::Degrade);

        search.on_embedding_failure = "retry".to_string();
        assert!(matches!(
            engine_config(&search),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_resolve_api_key() {
        assert_eq!(
            resolve_api_key(Some("sk-config"), Some("sk-env".to_string())).as_deref(),
            Some("sk-config")
        );
        assert_eq!(
            resolve_api_key(None, Some("sk-env".to_string())).as_deref(),
            Some("sk-env")
        );
        assert_eq!(
            resolve_api_key(Some(""), Some("sk-env".to_string())).as_deref(),
            Some("sk-env")
        );
        assert_eq!(resolve_api_key(None, Some(String::new())), None);
        assert_eq!(resolve_api_key(None, None), None);
    }

    #[test]
    fn test_openai_embedder_with_configured_key() {
        let config = EmbeddingConfig {
            api_key: Some("sk-test".to_string()),
            dimension: 256,
            ..EmbeddingConfig::default()
        };
        assert_eq!(build_embedder(&config).unwrap().dimension(), 256);
    }

    #[test]
    fn test_hash_embedder() {
        let config = EmbeddingConfig {
            provider: "hash".to_string(),
            dimension: 64,
            ..EmbeddingConfig::default()
        };
        let embedder = build_embedder(&config).unwrap();
        assert_eq!(embedder.dimension(), 64);
    }

    #[tokio::test]
    async fn test_build_components_on_empty_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.data_dir = dir.path().to_string_lossy().into_owned();
        config.embedding.provider = "hash".to_string();
        config.embedding.dimension = 32;

        let components = build_components(&config).await.unwrap();
        let status = components.engine.status().await.unwrap();
        assert_eq!(status.total_repos, 0);
        assert_eq!(status.generation, None);
        assert_eq!(status.dimension, 32);
        assert!(dir.path().join("stars.sqlite").exists());
    }
}
