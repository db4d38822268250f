//! BM25 over chunk text with a vocabulary fixed at build time.

use std::collections::{HashMap, HashSet};

use crate::{store::ChunkStore, text};
use tally_config::LexicalRanking;
use tally_domain::ChunkId;

#[derive(Clone, Debug)]
struct Document {
	chunk_id: ChunkId,
	term_counts: HashMap<String, u32>,
	len: f32,
}

#[derive(Clone, Debug)]
pub struct LexicalIndex {
	k1: f32,
	b: f32,
	avg_len: f32,
	idf: HashMap<String, f32>,
	documents: Vec<Document>,
}
impl LexicalIndex {
	pub fn build(store: &ChunkStore, cfg: &LexicalRanking) -> Self {
		let mut documents = Vec::with_capacity(store.len());
		let mut doc_freq: HashMap<String, u32> = HashMap::new();

		for chunk in store.chunks() {
			let tokens = text::tokenize(&chunk.text);
			let mut term_counts: HashMap<String, u32> = HashMap::new();

			for token in &tokens {
				*term_counts.entry(token.clone()).or_default() += 1;
			}
			for term in term_counts.keys() {
				*doc_freq.entry(term.clone()).or_default() += 1;
			}

			documents.push(Document { chunk_id: chunk.id, term_counts, len: tokens.len() as f32 });
		}

		let total = documents.len() as f32;
		let avg_len = if documents.is_empty() {
			0.0
		} else {
			documents.iter().map(|doc| doc.len).sum::<f32>() / total
		};
		// Non-negative BM25 idf, so any overlap scores above zero.
		let idf = doc_freq
			.into_iter()
			.map(|(term, df)| {
				let df = df as f32;

				(term, (1.0 + (total - df + 0.5) / (df + 0.5)).ln())
			})
			.collect();

		Self { k1: cfg.k1, b: cfg.b, avg_len, idf, documents }
	}

	/// Chunks with nonzero overlap, best first, ties by id ascending.
	pub fn score(&self, query: &str) -> Vec<(ChunkId, f32)> {
		let mut seen = HashSet::new();
		let terms = text::tokenize(query)
			.into_iter()
			.filter(|term| seen.insert(term.clone()))
			.filter_map(|term| self.idf.get(&term).map(|idf| (term, *idf)))
			.collect::<Vec<_>>();

		if terms.is_empty() {
			return Vec::new();
		}

		let mut scored = Vec::new();

		for doc in &self.documents {
			let norm = if self.avg_len > 0.0 {
				1.0 - self.b + self.b * doc.len / self.avg_len
			} else {
				1.0
			};
			let mut score = 0.0_f32;

			for (term, idf) in &terms {
				let Some(tf) = doc.term_counts.get(term) else {
					continue;
				};
				let tf = *tf as f32;

				score += idf * tf * (self.k1 + 1.0) / (tf + self.k1 * norm);
			}

			if score > 0.0 {
				scored.push((doc.chunk_id, score));
			}
		}

		scored.sort_by(|a, b| crate::cmp_f32_desc(a.1, b.1).then(a.0.cmp(&b.0)));

		scored
	}

	pub fn vocabulary_len(&self) -> usize {
		self.idf.len()
	}
}
