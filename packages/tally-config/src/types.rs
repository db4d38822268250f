use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	#[serde(default)]
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub freshness: Freshness,
	#[serde(default)]
	pub rerank: Rerank,
	#[serde(default)]
	pub resolution: Resolution,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

/// External collaborators. Both are optional: without an embedding provider the semantic index is
/// built by the local hashing embedder. Without a rerank provider an enabled rerank stage keeps the
/// fused order and reports `RerankUnavailable`; set `rerank.enabled = false` to skip it silently.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Providers {
	pub embedding: Option<EmbeddingProviderConfig>,
	pub rerank: Option<ProviderConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	/// Fused candidates kept before freshness and rerank.
	pub candidate_k: u32,
	/// Evidence chunks handed to generation.
	pub final_k: u32,
	/// One of "min_max" or "rank".
	pub normalization: String,
	pub lexical_weight: f32,
	pub semantic_weight: f32,
	/// Vector width of the local hashing embedder used when no embedding provider is configured.
	pub local_embedding_dimensions: u32,
	pub lexical: LexicalRanking,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			candidate_k: 40,
			final_k: 8,
			normalization: "min_max".to_string(),
			lexical_weight: 0.4,
			semantic_weight: 0.6,
			local_embedding_dimensions: 256,
			lexical: LexicalRanking::default(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LexicalRanking {
	pub k1: f32,
	pub b: f32,
}
impl Default for LexicalRanking {
	fn default() -> Self {
		Self { k1: 1.5, b: 0.75 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Freshness {
	pub enabled: bool,
	pub lambda_per_day: f32,
	pub floor: f32,
}
impl Default for Freshness {
	fn default() -> Self {
		Self { enabled: true, lambda_per_day: 0.01, floor: 0.2 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Rerank {
	pub enabled: bool,
	pub top_k: u32,
}
impl Default for Rerank {
	fn default() -> Self {
		Self { enabled: true, top_k: 12 }
	}
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Resolution {
	/// Lets BALANCE fall back to the last transaction's running balance when the period has no
	/// statement.
	pub allow_running_balance_fallback: bool,
}
