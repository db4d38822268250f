use unicode_segmentation::UnicodeSegmentation;

#[derive(Clone, Debug)]
pub struct SegmentConfig {
	pub max_chars: usize,
	pub overlap_chars: usize,
}
impl Default for SegmentConfig {
	fn default() -> Self {
		Self { max_chars: 1_000, overlap_chars: 200 }
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
	pub index: usize,
	pub start_offset: usize,
	pub end_offset: usize,
	pub text: String,
}

/// Cuts agreement text into sentence-bounded segments of at most `max_chars` characters, each
/// starting with up to `overlap_chars` characters carried over from the previous one.
///
/// The carried-over tail shrinks to whatever room the next piece leaves, so overlap never pushes a
/// segment past `max_chars`. A sentence longer than `max_chars` is split on word boundaries first.
/// A single word longer than the budget is kept whole.
pub fn split_text(text: &str, cfg: &SegmentConfig) -> Vec<Segment> {
	let max_chars = cfg.max_chars.max(1);
	let overlap_chars = cfg.overlap_chars.min(max_chars.saturating_sub(1));
	let mut segments = Vec::new();
	let mut current = String::new();
	let mut current_start = 0_usize;
	let mut last_end = 0_usize;

	for (idx, piece) in pieces(text, max_chars) {
		let piece_chars = piece.chars().count();
		let candidate_chars = current.chars().count() + piece_chars;

		if candidate_chars > max_chars && !current.trim().is_empty() {
			let room = max_chars.saturating_sub(piece_chars);
			let overlap = overlap_tail(&current, overlap_chars.min(room));

			segments.push(Segment {
				index: segments.len(),
				start_offset: current_start,
				end_offset: last_end,
				text: current.trim().to_string(),
			});

			current_start = last_end.saturating_sub(overlap.len());
			current = overlap;
		}
		if current.is_empty() {
			current_start = idx;
		}

		current.push_str(piece);

		last_end = idx + piece.len();
	}

	if !current.trim().is_empty() {
		segments.push(Segment {
			index: segments.len(),
			start_offset: current_start,
			end_offset: last_end,
			text: current.trim().to_string(),
		});
	}

	tracing::debug!(segments = segments.len(), chars = text.chars().count(), "Split text.");

	segments
}

fn pieces(text: &str, max_chars: usize) -> Vec<(usize, &str)> {
	let mut out = Vec::new();

	for (idx, sentence) in text.split_sentence_bound_indices() {
		if sentence.chars().count() <= max_chars {
			out.push((idx, sentence));

			continue;
		}

		let mut start = idx;
		let mut chars = 0_usize;

		for (word_idx, word) in sentence.split_word_bound_indices() {
			let word_chars = word.chars().count();
			let absolute = idx + word_idx;

			if chars + word_chars > max_chars && absolute > start {
				out.push((start, &text[start..absolute]));

				start = absolute;
				chars = 0;
			}

			chars += word_chars;
		}

		if start < idx + sentence.len() {
			out.push((start, &text[start..idx + sentence.len()]));
		}
	}

	out
}

// The tail never starts mid-word unless the whole tail is one word.
fn overlap_tail(text: &str, overlap_chars: usize) -> String {
	if overlap_chars == 0 {
		return String::new();
	}

	let Some((start, _)) = text.char_indices().rev().nth(overlap_chars - 1) else {
		return text.to_string();
	};
	let tail = &text[start..];
	let mid_word = text[..start].chars().next_back().is_some_and(|ch| !ch.is_whitespace());

	if !mid_word {
		return tail.to_string();
	}

	match tail.find(char::is_whitespace) {
		Some(pos) => tail[pos..].trim_start().to_string(),
		None => tail.to_string(),
	}
}
