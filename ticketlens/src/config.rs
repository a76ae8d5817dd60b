use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_or(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_opt(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub qdrant: QdrantConfig,
    pub embeddings: EmbeddingsConfig,
    pub sparse: SparseConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Serve static assets from this directory instead of the embedded bundle.
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub timeout_secs: u64,
}

/// Remote dense embedding service (OpenAI-compatible `/embeddings`).
#[derive(Debug, Clone)]
pub struct EmbeddingsConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Sent verbatim as the `model` field.
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone)]
pub struct SparseConfig {
    pub model: String,
}

/// How the prefetched candidate lists are turned into one ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingStrategy {
    /// Reciprocal rank fusion.
    Rrf,
    /// Distribution-based score fusion.
    Dbsf,
    /// Rescore the prefetched candidates with the dense query vector.
    Dense,
}

impl std::str::FromStr for RankingStrategy {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "rrf" => Ok(Self::Rrf),
            "dbsf" => Ok(Self::Dbsf),
            "dense" => Ok(Self::Dense),
            other => Err(format!(
                "unknown ranking strategy '{other}' (expected rrf, dbsf or dense)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub dense_vector: String,
    pub multi_dense_vector: String,
    pub sparse_vector: String,
    pub multi_sparse_vector: String,
    pub ranking: RankingStrategy,
    /// Points requested from the vector store before deduplication.
    pub fetch_limit: usize,
    /// Maximum hits returned after deduplication.
    pub result_limit: usize,
    pub ticket_id_field: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            dense_vector: "e5".to_string(),
            multi_dense_vector: "multi_e5".to_string(),
            sparse_vector: "bm25".to_string(),
            multi_sparse_vector: "multi_bm25".to_string(),
            ranking: RankingStrategy::Rrf,
            fetch_limit: 50,
            result_limit: 10,
            ticket_id_field: "ticket_id".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let search_defaults = SearchConfig::default();

        Self {
            server: ServerConfig {
                host: env_or("TICKETLENS_HOST", "0.0.0.0"),
                port: parse_env_or("TICKETLENS_PORT", 8000),
                static_dir: env_opt("TICKETLENS_STATIC_DIR"),
            },
            qdrant: QdrantConfig {
                url: env_or("QDRANT_URL", "http://localhost:6333"),
                api_key: env_opt("QDRANT_API_KEY"),
                collection: env_or("QDRANT_COLLECTION_NAME", "tickets"),
                timeout_secs: parse_env_or("QDRANT_TIMEOUT", 30),
            },
            embeddings: EmbeddingsConfig {
                base_url: env_or("EMBEDDING_BASE_URL", "http://localhost:11434/v1"),
                api_key: env_opt("EMBEDDING_API_KEY"),
                model: env_or("EMBEDDING_MODEL", "openai/E5"),
                timeout_secs: parse_env_or("EMBEDDING_TIMEOUT", 30),
                max_retries: parse_env_or("EMBEDDING_MAX_RETRIES", 2),
            },
            sparse: SparseConfig {
                model: env_or("SPARSE_MODEL", "Qdrant/bm25"),
            },
            search: SearchConfig {
                dense_vector: env_or("SEARCH_DENSE_VECTOR", &search_defaults.dense_vector),
                multi_dense_vector: env_or(
                    "SEARCH_MULTI_DENSE_VECTOR",
                    &search_defaults.multi_dense_vector,
                ),
                sparse_vector: env_or("SEARCH_SPARSE_VECTOR", &search_defaults.sparse_vector),
                multi_sparse_vector: env_or(
                    "SEARCH_MULTI_SPARSE_VECTOR",
                    &search_defaults.multi_sparse_vector,
                ),
                ranking: parse_env_or("SEARCH_RANKING", search_defaults.ranking),
                fetch_limit: parse_env_or("SEARCH_FETCH_LIMIT", search_defaults.fetch_limit)
                    .max(1),
                result_limit: parse_env_or("SEARCH_RESULT_LIMIT", search_defaults.result_limit)
                    .max(1),
                ticket_id_field: env_or(
                    "SEARCH_TICKET_ID_FIELD",
                    &search_defaults.ticket_id_field,
                ),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
