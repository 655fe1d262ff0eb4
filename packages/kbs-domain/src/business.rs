//! Business-domain phrase extraction.
//!
//! Configured business phrases found in the raw keyword are stripped from it
//! and accumulated; the keyword-query builder pairs the accumulated phrase
//! with the remainder in a separately boosted clause. No match, or a
//! remainder that strips to nothing, contributes nothing.

use kbs_config::Settings;

#[derive(Debug, Clone, Default)]
pub struct BusinessWordMatcher {
	phrases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessMatch {
	/// The matched phrases, concatenated in configuration order.
	pub matched: String,
	/// The keyword with every matched phrase removed.
	pub remainder: String,
}

impl BusinessWordMatcher {
	/// Reads the comma-separated `business_words` key. A blank value yields a
	/// matcher that never matches.
	pub fn from_settings(weights: &Settings) -> Self {
		let phrases = weights
			.get("business_words")
			.split(',')
			.map(|phrase| phrase.trim().to_lowercase())
			.filter(|phrase| !phrase.is_empty())
			.collect();

		Self { phrases }
	}

	pub fn split(&self, keyword: &str) -> Option<BusinessMatch> {
		let mut remainder = keyword.trim().to_lowercase();
		let mut matched = String::new();

		for phrase in &self.phrases {
			if remainder.contains(phrase.as_str()) {
				remainder = remainder.replace(phrase.as_str(), "");
				matched.push_str(phrase);
			}
		}

		if matched.is_empty() || remainder.is_empty() {
			return None;
		}

		Some(BusinessMatch { matched, remainder })
	}
}
