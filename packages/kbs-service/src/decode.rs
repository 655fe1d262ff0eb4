//! Record decoding and post-processing.
//!
//! Gateway records arrive URL-encoded and full of transport artifacts. Each
//! record is decoded field by field, its content is substituted and truncated
//! according to what the query actually searched, and its title is annotated
//! with expiry warnings when that display feature is enabled. A record
//! without the unique key is skipped.

use kbs_domain::{expiry, snippet};
use kbs_gateway::{UNIQUE_KEY, field};
use serde::Serialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Decodes one URL-encoded field value. `+` is the legacy space encoding; an
/// undecodable value falls back to the raw text.
pub fn decode_text(raw: &str) -> String {
	let raw = raw.replace('+', " ");

	match urlencoding::decode(&raw) {
		Ok(decoded) => decoded.into_owned(),
		Err(_) => raw,
	}
}

/// One decoded knowledge record, ready for the search UI.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchRecord {
	pub solrid: String,
	pub docid: String,
	pub doctitle: String,
	pub dockeyword: String,
	pub docabstract: String,
	pub html: String,
	pub content: String,
	pub ct_id: String,
	pub ct_name: String,
	pub hitcount: String,
	pub parent_path_id: String,
	pub parent_path_name: String,
	pub crt_time: String,
	pub update_time: String,
	pub update_user_id: String,
	pub update_user_name: String,
	pub crt_user_name: String,
	pub crt_org_name: String,
	pub tp_id: String,
	pub tp_name: String,
	pub city_id: String,
	pub city_name: String,
	pub up_city_id: String,
	pub up_city_name: String,
	pub lifestatus: String,
	pub is_top: String,
	pub is_recommend: String,
	pub attach: String,
}

/// One decoded FAQ record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FaqRecord {
	pub solrid: String,
	pub docid: String,
	pub doctitle: String,
	pub question: String,
	pub answer: String,
	pub city_name: String,
	pub parent_path: String,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct DecodeContext<'a> {
	/// The normalized keyword, empty when none was searched.
	pub keyword: &'a str,
	/// Whether the query matched against the tokenized `content` field.
	pub searched_content: bool,
	/// Whether the query matched against the whole-phrase `contents` field.
	pub searched_contents: bool,
	/// The configured alternate summary field, blank when unset.
	pub summary_field: &'a str,
	pub expiry_warning: bool,
	pub now: OffsetDateTime,
}

pub(crate) fn search_record(
	record: &Map<String, Value>,
	ctx: &DecodeContext<'_>,
) -> Option<SearchRecord> {
	let solrid = decode_text(field(record, UNIQUE_KEY)?);
	let get = |name: &str| decode_text(field(record, name).unwrap_or(""));

	let mut content = get("content");

	if ctx.keyword.is_empty() {
		content = snippet::preview(&content);
	}
	// A query that only searched the whole-phrase field highlights there, so
	// show that field's value instead.
	if !ctx.searched_content && ctx.searched_contents {
		content = get("contents");
	}
	if ctx.summary_field == "content2" {
		let content2 = get("content2");

		if !content2.is_empty() {
			content = if content2.chars().count() > snippet::SNIPPET_LIMIT {
				snippet::truncate(content2.trim(), snippet::SNIPPET_LIMIT)
			} else {
				content2
			};
		}
	}

	content = snippet::strip_attachment_ids(&content);
	content = snippet::clean_content(&content);

	if !content.trim().is_empty() {
		content = snippet::clamp_highlight(&content, ctx.keyword);
	}

	let mut doctitle = get("doctitle").replace(['[', ']'], "");

	if ctx.expiry_warning {
		let counts = expiry::classify(&get("end_time"), ctx.now);

		doctitle = expiry::annotate_title(&doctitle, counts);
	}

	let parent_path_name = get("parent_path_name");
	let parent_path_name = match parent_path_name.find('_') {
		Some(cut) => parent_path_name[..cut].to_string(),
		None => parent_path_name,
	};

	Some(SearchRecord {
		solrid,
		docid: get("docid"),
		doctitle,
		dockeyword: get("dockeyword").replace(['[', ']'], ""),
		docabstract: get("docabstract"),
		html: get("html"),
		content,
		ct_id: get("ct_id"),
		ct_name: get("ct_name"),
		hitcount: get("hitcount"),
		parent_path_id: get("parent_path_id"),
		parent_path_name,
		crt_time: get("crt_time"),
		update_time: get("update_time"),
		update_user_id: get("update_user_id"),
		update_user_name: get("update_user_name"),
		crt_user_name: get("crt_user_name"),
		crt_org_name: get("crt_org_name"),
		tp_id: get("tp_id"),
		tp_name: get("tp_name"),
		city_id: get("city_ids"),
		city_name: get("city_names"),
		up_city_id: get("up_city_id"),
		up_city_name: get("up_city_name"),
		lifestatus: get("lifestatus"),
		is_top: get("is_top"),
		is_recommend: get("is_recommend"),
		attach: get("attach"),
	})
}

pub(crate) fn faq_record(record: &Map<String, Value>) -> Option<FaqRecord> {
	let solrid = decode_text(field(record, UNIQUE_KEY)?);
	let get = |name: &str| decode_text(field(record, name).unwrap_or(""));

	Some(FaqRecord {
		solrid,
		docid: get("docid"),
		doctitle: get("doctitle"),
		question: get("faq_wt2"),
		answer: get("faq_da2"),
		city_name: get("cityname"),
		parent_path: get("parentpath"),
	})
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	const NOW: OffsetDateTime = datetime!(2024-01-01 00:00:00 UTC);

	fn ctx(keyword: &'static str) -> DecodeContext<'static> {
		DecodeContext {
			keyword,
			searched_content: true,
			searched_contents: true,
			summary_field: "",
			expiry_warning: false,
			now: NOW,
		}
	}

	fn record(pairs: &[(&str, &str)]) -> Map<String, Value> {
		pairs.iter().map(|(k, v)| (k.to_string(), Value::String(v.to_string()))).collect()
	}

	#[test]
	fn decodes_url_encoded_text() {
		assert_eq!(decode_text("fiber+%E5%85%89%E7%BA%A4"), "fiber 光纤");
	}

	#[test]
	fn records_without_the_unique_key_are_skipped() {
		assert!(search_record(&record(&[("doctitle", "T")]), &ctx("kw")).is_none());
	}

	#[test]
	fn no_keyword_yields_a_short_preview() {
		let long = "x".repeat(400);
		let rec = record(&[("solrid", "a1"), ("content", &long)]);
		let decoded = search_record(&rec, &ctx("")).expect("record decodes");
		assert_eq!(decoded.content.chars().count(), snippet::PREVIEW_LIMIT);
	}

	#[test]
	fn contents_substitutes_when_only_it_was_searched() {
		let rec = record(&[("solrid", "a1"), ("content", "plain"), ("contents", "highlighted")]);
		let mut c = ctx("kw");
		c.searched_content = false;
		let decoded = search_record(&rec, &c).expect("record decodes");
		assert_eq!(decoded.content, "highlighted");
	}

	#[test]
	fn summary_field_overrides_content() {
		let rec = record(&[("solrid", "a1"), ("content", "plain"), ("content2", "summary")]);
		let mut c = ctx("kw");
		c.summary_field = "content2";
		let decoded = search_record(&rec, &c).expect("record decodes");
		assert_eq!(decoded.content, "summary");
	}

	#[test]
	fn titles_lose_brackets_and_gain_expiry_warnings() {
		let rec = record(&[
			("solrid", "a1"),
			("doctitle", "[HOT] Tariff sheet"),
			("end_time", "2024-01-21 00:00:00"),
		]);
		let mut c = ctx("kw");
		c.expiry_warning = true;
		let decoded = search_record(&rec, &c).expect("record decodes");
		assert_eq!(
			decoded.doctitle,
			"HOT Tariff sheet <font color='red'>[expiring within 1 month: 1]</font>"
		);
	}

	#[test]
	fn parent_path_name_keeps_the_first_component() {
		let rec = record(&[("solrid", "a1"), ("parent_path_name", "Root_Child_Leaf")]);
		let decoded = search_record(&rec, &ctx("kw")).expect("record decodes");
		assert_eq!(decoded.parent_path_name, "Root");
	}

	#[test]
	fn faq_records_carry_question_and_answer() {
		let rec = record(&[
			("solrid", "a1"),
			("faq_wt2", "How to activate?"),
			("faq_da2", "Dial 100."),
			("cityname", "Wuhan"),
		]);
		let decoded = faq_record(&rec).expect("record decodes");
		assert_eq!(decoded.question, "How to activate?");
		assert_eq!(decoded.answer, "Dial 100.");
		assert_eq!(decoded.city_name, "Wuhan");
	}
}
