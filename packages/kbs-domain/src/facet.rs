//! Parent-path facet roll-up.
//!
//! The facet query returns a histogram keyed by `parent_path_id`, an
//! underscore-delimited chain of ancestor category ids. Every component of a
//! path is credited with that path's count, so a path contributes to every
//! ancestor level. Ancestor totals therefore overlap across levels; that is
//! the intended roll-up semantic.

use std::collections::HashMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
	pub category_id: String,
	pub count: u64,
}

pub fn roll_up<'a, I>(histogram: I) -> Vec<FacetCount>
where
	I: IntoIterator<Item = (&'a str, u64)>,
{
	let mut totals: HashMap<&str, u64> = HashMap::new();

	for (path, count) in histogram {
		for category_id in path.split('_').filter(|component| !component.is_empty()) {
			*totals.entry(category_id).or_insert(0) += count;
		}
	}

	let mut rows: Vec<FacetCount> = totals
		.into_iter()
		.map(|(category_id, count)| FacetCount { category_id: category_id.to_string(), count })
		.collect();

	// Hash-map order is not stable; sort so replies are deterministic.
	rows.sort_by(|a, b| a.category_id.cmp(&b.category_id));

	rows
}
