use unicode_segmentation::UnicodeSegmentation;

/// Lowercase Unicode words. Compound words (`endingBalance`, `interest_from_statements_total`)
/// also contribute their parts.
pub fn tokenize(text: &str) -> Vec<String> {
	let mut out = Vec::new();

	for word in text.unicode_words() {
		let lowered = word.to_lowercase();
		let parts = split_compound(word);

		out.push(lowered);

		if parts.len() > 1 {
			out.extend(parts.into_iter().map(|part| part.to_lowercase()));
		}
	}

	out
}

fn split_compound(word: &str) -> Vec<&str> {
	let mut parts = Vec::new();

	for piece in word.split('_').filter(|piece| !piece.is_empty()) {
		let mut start = 0_usize;
		let mut prev: Option<char> = None;

		for (idx, ch) in piece.char_indices() {
			if let Some(prev) = prev
				&& ch.is_uppercase()
				&& (prev.is_lowercase() || prev.is_ascii_digit())
			{
				parts.push(&piece[start..idx]);

				start = idx;
			}

			prev = Some(ch);
		}

		parts.push(&piece[start..]);
	}

	parts
}
