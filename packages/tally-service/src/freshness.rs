//! Recency re-weighting of fused scores.

use time::OffsetDateTime;

use crate::{fusion::RetrievalResult, store::ChunkStore};
use tally_config::Freshness;
use tally_domain::{Chunk, Period, PeriodHint};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// What chunk dates are measured against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FreshnessAnchor {
	/// A named month; distance is zero inside it.
	Period(Period),
	/// A named year; distance is zero inside it.
	Year(i32),
	/// Implied recency; distance is measured to the query time.
	Instant(OffsetDateTime),
}

/// `2025-08` and "last month" anchor on a month, `2025` and "last year" on a year. "this month",
/// "this year", "latest" and "recent" anchor on the query time.
pub fn anchor_for(hint: Option<PeriodHint>, now: OffsetDateTime) -> Option<FreshnessAnchor> {
	match hint? {
		PeriodHint::Explicit(period) => Some(FreshnessAnchor::Period(period)),
		PeriodHint::Previous => Some(FreshnessAnchor::Period(Period::containing(now).previous())),
		PeriodHint::Year(year) => Some(FreshnessAnchor::Year(year)),
		PeriodHint::LastYear => Some(FreshnessAnchor::Year(Period::containing(now).year() - 1)),
		PeriodHint::Current | PeriodHint::ThisYear | PeriodHint::Latest => {
			Some(FreshnessAnchor::Instant(now))
		},
	}
}

/// Multiplies each fused score by `max(floor, exp(-lambda * distance_days))` and re-sorts.
///
/// Without an anchor, or when disabled, scores pass through and the order is left untouched.
pub fn adjust(
	mut results: Vec<RetrievalResult>,
	store: &ChunkStore,
	anchor: Option<FreshnessAnchor>,
	cfg: &Freshness,
) -> Vec<RetrievalResult> {
	let anchor = match anchor {
		Some(anchor) if cfg.enabled => anchor,
		_ => {
			for result in &mut results {
				result.freshness_adjusted_score = result.fused_score;
			}

			return results;
		},
	};

	for result in &mut results {
		let factor = store
			.get(result.chunk_id)
			.ok()
			.and_then(|chunk| distance_days(chunk, anchor))
			.map(|days| decay(days, cfg))
			.unwrap_or(1.0);

		result.freshness_adjusted_score = result.fused_score * factor;
	}

	results.sort_by(|a, b| {
		crate::cmp_f32_desc(a.freshness_adjusted_score, b.freshness_adjusted_score)
			.then(crate::cmp_f32_desc(a.fused_score, b.fused_score))
			.then(a.chunk_id.cmp(&b.chunk_id))
	});

	results
}

pub fn decay(distance_days: f64, cfg: &Freshness) -> f32 {
	let raw = (-(cfg.lambda_per_day as f64) * distance_days.max(0.0)).exp() as f32;

	raw.max(cfg.floor)
}

/// `None` for chunks with no timestamp and no period.
pub fn distance_days(chunk: &Chunk, anchor: FreshnessAnchor) -> Option<f64> {
	let at = chunk.timestamp.or_else(|| chunk.period.map(Period::start))?;
	let seconds = match anchor {
		FreshnessAnchor::Period(period) => {
			if chunk.period == Some(period) || period.contains(at) {
				0
			} else if at < period.start() {
				(period.start() - at).whole_seconds()
			} else {
				(at - period.end_exclusive()).whole_seconds()
			}
		},
		FreshnessAnchor::Year(year) => {
			let start = Period::new(year, 1).ok()?.start();
			let end = Period::new(year + 1, 1).ok()?.start();

			if at < start {
				(start - at).whole_seconds()
			} else if at >= end {
				(at - end).whole_seconds()
			} else {
				0
			}
		},
		FreshnessAnchor::Instant(now) => (now - at).whole_seconds().abs(),
	};

	Some(seconds.max(0) as f64 / SECONDS_PER_DAY)
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use time::macros::datetime;

	use tally_config::Freshness;
	use tally_domain::{Chunk, ChunkId, ChunkKind, Period, PeriodHint};

	use crate::freshness::{self, FreshnessAnchor};

	fn chunk(period: Option<&str>, timestamp: Option<time::OffsetDateTime>) -> Chunk {
		let period = period.map(|raw| raw.parse::<Period>().expect("Expected a valid period."));

		Chunk::new(ChunkId(0), ChunkKind::Transaction, period, timestamp, BTreeMap::new())
	}

	#[test]
	fn inside_explicit_month_is_zero_distance() {
		let anchor = FreshnessAnchor::Period("2025-08".parse().expect("Expected a period."));
		let inside = chunk(Some("2025-08"), Some(datetime!(2025-08-30 00:00 UTC)));
		let before = chunk(Some("2025-07"), Some(datetime!(2025-07-22 00:00 UTC)));

		assert_eq!(freshness::distance_days(&inside, anchor), Some(0.0));
		assert_eq!(freshness::distance_days(&before, anchor), Some(10.0));
	}

	#[test]
	fn inside_named_year_is_zero_distance() {
		let anchor = FreshnessAnchor::Year(2024);
		let inside = chunk(Some("2024-03"), Some(datetime!(2024-03-05 00:00 UTC)));
		let after = chunk(Some("2025-01"), Some(datetime!(2025-01-11 00:00 UTC)));

		assert_eq!(freshness::distance_days(&inside, anchor), Some(0.0));
		assert_eq!(freshness::distance_days(&after, anchor), Some(10.0));
	}

	#[test]
	fn undated_chunks_have_no_distance() {
		let anchor = FreshnessAnchor::Instant(datetime!(2025-09-15 00:00 UTC));

		assert_eq!(freshness::distance_days(&chunk(None, None), anchor), None);
	}

	#[test]
	fn period_only_chunks_use_period_start() {
		let anchor = FreshnessAnchor::Instant(datetime!(2025-09-11 00:00 UTC));

		assert_eq!(freshness::distance_days(&chunk(Some("2025-09"), None), anchor), Some(10.0));
	}

	#[test]
	fn decay_is_floored() {
		let cfg = Freshness::default();

		assert_eq!(freshness::decay(0.0, &cfg), 1.0);
		assert!((freshness::decay(10.0, &cfg) - (-0.1_f64).exp() as f32).abs() < 1e-6);
		assert_eq!(freshness::decay(10_000.0, &cfg), 0.2);
	}

	#[test]
	fn anchors_follow_hints() {
		let now = datetime!(2025-09-15 12:00 UTC);

		assert_eq!(freshness::anchor_for(None, now), None);
		assert_eq!(
			freshness::anchor_for(Some(PeriodHint::Previous), now),
			Some(FreshnessAnchor::Period("2025-08".parse().expect("Expected a period.")))
		);
		assert_eq!(
			freshness::anchor_for(Some(PeriodHint::Latest), now),
			Some(FreshnessAnchor::Instant(now))
		);
		assert_eq!(
			freshness::anchor_for(Some(PeriodHint::LastYear), now),
			Some(FreshnessAnchor::Year(2024))
		);
	}
}
