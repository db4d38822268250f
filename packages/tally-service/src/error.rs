use tally_domain::ChunkId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Chunk {chunk_id} not found.")]
	NotFound { chunk_id: ChunkId },
	#[error("Embedding unavailable: {message}")]
	EmbeddingUnavailable { message: String },
	#[error("Rerank unavailable: {message}")]
	RerankUnavailable { message: String },
	#[error("Unresolved fact: {missing}")]
	UnresolvedFact { missing: String },
	#[error("Ambiguous intent: {message}")]
	AmbiguousIntent { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Invalid data: {message}")]
	InvalidData { message: String },
}
