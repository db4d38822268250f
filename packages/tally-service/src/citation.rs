use std::collections::HashSet;

use serde::Serialize;

use crate::{fusion::RetrievalResult, resolve::ResolvedFact};
use tally_domain::ChunkId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Citation {
	pub number: u32,
	pub chunk_id: ChunkId,
}

/// Numbers every referenced chunk once, starting from 1. Fact support comes first in fact order,
/// then the retrieval order; a repeated chunk keeps its first number.
pub fn assemble(results: &[RetrievalResult], facts: &[ResolvedFact]) -> Vec<Citation> {
	let ordered = facts
		.iter()
		.flat_map(|fact| fact.supporting_chunk_ids.iter().copied())
		.chain(results.iter().map(|result| result.chunk_id));
	let mut seen = HashSet::new();
	let mut citations = Vec::new();

	for chunk_id in ordered {
		if seen.insert(chunk_id) {
			citations.push(Citation { number: citations.len() as u32 + 1, chunk_id });
		}
	}

	citations
}

/// Citation numbers of `chunk_ids`, in the order given. Ids absent from `citations` are skipped.
pub fn numbers_for(citations: &[Citation], chunk_ids: &[ChunkId]) -> Vec<u32> {
	chunk_ids
		.iter()
		.filter_map(|chunk_id| {
			citations.iter().find(|citation| citation.chunk_id == *chunk_id).map(|c| c.number)
		})
		.collect()
}
