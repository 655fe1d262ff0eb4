//! Weighted keyword clause assembly.
//!
//! A single-word keyword produces one OR group over the exact and tokenized
//! title/keyword/abstract fields, optionally extended by the business-word
//! pairing and popularity contributions. A multi-word keyword produces one
//! such group per word, AND-ed together, without the extensions. Either way
//! the clause is AND-ed with the document-status filter.

use kbs_domain::{business::BusinessWordMatcher, query::Query, weights::TermWeightTable};

use crate::filter::status_filter;

/// Exact-title boost that pins an all-title match above everything else.
const ALL_TITLE_BOOST: u64 = 99999999;

#[derive(Debug, Clone, Copy)]
pub(crate) struct KeywordOptions {
	pub bss_selected: bool,
	pub search_content: bool,
	pub search_attach: bool,
	/// Whether an alternate summary field is configured. Flips which branch
	/// carries the `content2` fields.
	pub summary_field_configured: bool,
}

pub(crate) fn build(
	keyword: &str,
	opts: KeywordOptions,
	weights: &TermWeightTable,
	business: &BusinessWordMatcher,
	popularity: &[Query],
) -> Query {
	let clause = if opts.bss_selected {
		// BSS mode matches the whole phrase against content only.
		Query::phrase("contents", keyword)
	} else if keyword.contains(' ') {
		let groups = keyword
			.split_whitespace()
			.map(|word| Query::Or(word_group(word, opts, weights)))
			.collect();

		Query::And(groups)
	} else {
		let mut group = vec![
			Query::boosted_phrase("doctitles_all", keyword, ALL_TITLE_BOOST),
			Query::boosted_phrase("doctitles", keyword, weights.title_exact),
			Query::boosted_phrase("dockeywords", keyword, weights.keyword_exact),
			Query::boosted_phrase("docabstracts", keyword, weights.abstract_exact),
			Query::boosted_term("doctitle", keyword, weights.title_tokenized),
			Query::boosted_term("dockeyword", keyword, weights.keyword_tokenized),
			Query::boosted_term("docabstract", keyword, weights.abstract_tokenized),
		];

		if let Some(hit) = business.split(keyword) {
			let bus = weights.business;

			group.push(Query::phrase_pair("doctitles", &hit.matched, bus.title_exact, &hit.remainder));
			group.push(Query::phrase_pair(
				"docabstracts",
				&hit.matched,
				bus.keyword_exact,
				&hit.remainder,
			));
			group.push(Query::term_pair("doctitle", &hit.matched, bus.title_tokenized, &hit.remainder));
			group.push(Query::term_pair(
				"docabstract",
				&hit.matched,
				bus.keyword_tokenized,
				&hit.remainder,
			));
		}

		group.extend_from_slice(popularity);

		if opts.search_content {
			group.push(Query::boosted_phrase("contents", keyword, weights.content));
			group.push(Query::term("content", keyword));
		}
		if opts.search_attach {
			group.push(Query::phrase("attachs", keyword));
			group.push(Query::term("attach", keyword));
		}
		if opts.summary_field_configured {
			group.push(Query::boosted_phrase("content2s", keyword, weights.content));
			group.push(Query::term("content2", keyword));
		}

		Query::Or(group)
	};

	clause.and_with(status_filter())
}

fn word_group(word: &str, opts: KeywordOptions, weights: &TermWeightTable) -> Vec<Query> {
	let mut group = vec![
		Query::boosted_phrase("doctitles", word, weights.title_exact),
		Query::boosted_phrase("dockeywords", word, weights.keyword_exact),
		Query::boosted_phrase("docabstracts", word, weights.abstract_exact),
		Query::boosted_term("doctitle", word, weights.title_tokenized),
		Query::boosted_term("dockeyword", word, weights.keyword_tokenized),
		Query::boosted_term("docabstract", word, weights.abstract_tokenized),
	];

	if opts.search_content {
		group.push(Query::boosted_phrase("contents", word, weights.content));
		group.push(Query::term("content", word));
	}
	if opts.search_attach {
		group.push(Query::phrase("attachs", word));
		group.push(Query::term("attach", word));
	}
	// The alternate summary field replaces `content2` in the per-word groups
	// rather than adding to them.
	if !opts.summary_field_configured {
		group.push(Query::boosted_phrase("content2s", word, weights.content));
		group.push(Query::term("content2", word));
	}

	group
}
