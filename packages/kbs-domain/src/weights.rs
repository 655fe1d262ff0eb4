//! Per-field boost weights, resolved from the search-weight settings scope.
//! A missing, blank, or unparseable value falls back to its documented
//! default; resolution never fails.

use kbs_config::Settings;

pub const TITLE_EXACT_DEFAULT: u64 = 2500;
pub const KEYWORD_EXACT_DEFAULT: u64 = 500;
pub const ABSTRACT_EXACT_DEFAULT: u64 = 300;
pub const TITLE_TOKENIZED_DEFAULT: u64 = 100;
pub const KEYWORD_TOKENIZED_DEFAULT: u64 = 70;
pub const ABSTRACT_TOKENIZED_DEFAULT: u64 = 50;
pub const CONTENT_DEFAULT: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermWeightTable {
	pub title_exact: u64,
	pub keyword_exact: u64,
	pub abstract_exact: u64,
	pub title_tokenized: u64,
	pub keyword_tokenized: u64,
	pub abstract_tokenized: u64,
	pub content: u64,
	pub business: BusinessWeights,
}

/// Boosts for the business-word pairing clause. Defaults mirror the
/// corresponding non-business weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessWeights {
	pub title_exact: u64,
	pub keyword_exact: u64,
	pub title_tokenized: u64,
	pub keyword_tokenized: u64,
}

impl TermWeightTable {
	pub fn from_settings(weights: &Settings) -> Self {
		Self {
			title_exact: resolve(weights, "doctitles_boost", TITLE_EXACT_DEFAULT),
			keyword_exact: resolve(weights, "dockeywords_boost", KEYWORD_EXACT_DEFAULT),
			abstract_exact: resolve(weights, "docabstracts_boost", ABSTRACT_EXACT_DEFAULT),
			title_tokenized: resolve(weights, "doctitle_boost", TITLE_TOKENIZED_DEFAULT),
			keyword_tokenized: resolve(weights, "dockeyword_boost", KEYWORD_TOKENIZED_DEFAULT),
			abstract_tokenized: resolve(weights, "docabstract_boost", ABSTRACT_TOKENIZED_DEFAULT),
			content: resolve(weights, "contents_boost", CONTENT_DEFAULT),
			business: BusinessWeights {
				title_exact: resolve(weights, "doctitles_bus_boost", TITLE_EXACT_DEFAULT),
				keyword_exact: resolve(weights, "dockeywords_bus_boost", KEYWORD_EXACT_DEFAULT),
				title_tokenized: resolve(weights, "doctitle_bus_boost", TITLE_TOKENIZED_DEFAULT),
				keyword_tokenized: resolve(
					weights,
					"dockeyword_bus_boost",
					KEYWORD_TOKENIZED_DEFAULT,
				),
			},
		}
	}
}

impl Default for TermWeightTable {
	fn default() -> Self {
		Self::from_settings(&Settings::default())
	}
}

fn resolve(weights: &Settings, key: &str, default: u64) -> u64 {
	let raw = weights.get(key).trim();

	if raw.is_empty() {
		return default;
	}

	raw.parse().unwrap_or(default)
}
