//! The gateway's request and response wire contract.
//!
//! A request is a flat JSON object posted as the `json` form field. The
//! response is an envelope: a root object keyed by [`ENVELOPE_ROOT`] holding a
//! `head` with the total match `count` and a `body` whose `message` array
//! carries flat key→value records (or, for facet calls, single-key
//! `{path: count}` maps). The body is loosely typed on the wire, so it is
//! walked manually rather than deserialized into a rigid shape.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub const ENVELOPE_ROOT: &str = "kms";
pub const INTERFACE_QUERY: &str = "kms_query";
pub const INTERFACE_FACET: &str = "kms_facet";
/// Name of the gateway's access-check request header.
pub const HEADER_CHECK: &str = "headercheck";
/// Default search field the index falls back to for unfielded terms.
pub const DEFAULT_FIELD: &str = "doctitle";
/// The index's unique-key field.
pub const UNIQUE_KEY: &str = "solrid";

#[derive(Debug, Clone, Default, Serialize)]
pub struct GatewayQuery {
	pub req_id: String,
	pub req_time: String,
	pub start: u64,
	pub rows: u64,
	pub org_code: String,
	pub service_code: String,
	pub interface_code: String,
	pub user_name: String,
	pub pass_word: String,
	pub loginid: String,
	pub loginname: String,
	pub key_words: String,
	pub source: String,
	pub lifestatus: String,
	pub cityid: String,
	pub mm: String,
	pub bf: String,
	pub fl: String,
	pub df: String,
	pub zj: String,
	pub sort: String,
	pub q: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	pub light: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub facet_field: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Envelope {
	pub count: u64,
	pub records: Vec<Map<String, Value>>,
}

impl Envelope {
	pub fn parse(raw: &str) -> Result<Self> {
		let root: Value = serde_json::from_str(raw)?;
		let inner = root.get(ENVELOPE_ROOT).ok_or_else(|| Error::InvalidResponse {
			message: format!("Envelope is missing the {ENVELOPE_ROOT} root object."),
		})?;
		let count = inner
			.get("head")
			.and_then(|head| head.get("count"))
			.and_then(count_value)
			.ok_or_else(|| Error::InvalidResponse {
				message: "Envelope head is missing a numeric count.".to_string(),
			})?;
		let records = inner
			.get("body")
			.and_then(|body| body.get("message"))
			.and_then(Value::as_array)
			.map(|message| {
				message
					.iter()
					.filter_map(Value::as_object)
					.cloned()
					.collect()
			})
			.unwrap_or_default();

		Ok(Self { count, records })
	}

	/// Reads the records of a facet reply as `(path, count)` pairs. Each
	/// record is a single-key map; entries with a non-numeric count are
	/// skipped.
	pub fn facet_rows(&self) -> Vec<(String, u64)> {
		let mut rows = Vec::with_capacity(self.records.len());

		for record in &self.records {
			for (path, count) in record {
				let Some(count) = count_value(count) else {
					continue;
				};
				rows.push((path.clone(), count));
			}
		}

		rows
	}
}

/// Record field access: the gateway emits every field as a string, but be
/// tolerant of bare numbers.
pub fn field<'a>(record: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
	record.get(name).and_then(Value::as_str)
}

fn count_value(value: &Value) -> Option<u64> {
	match value {
		Value::Number(number) => number.as_u64(),
		Value::String(raw) => raw.trim().parse().ok(),
		_ => None,
	}
}
