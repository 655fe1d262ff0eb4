//! Boolean query expression tree.
//!
//! Queries are built as `And`/`Or`/`Not` nodes over field-match leaves and
//! serialized to the index's textual query language only at the gateway
//! boundary. Leaf constructors escape user-controlled text on entry, so a
//! built tree cannot contain an unescaped reserved character, and every
//! boolean segment with more than one child serializes parenthesized.
//!
//! Phrase quotes serialize as `\"` and ranges quote their bounds the same
//! way: the query travels inside a JSON form field and the gateway unescapes
//! it once before handing it to the index.

use crate::escape::escape_reserved;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
	And(Vec<Query>),
	Or(Vec<Query>),
	Not(Box<Query>),
	Leaf(Leaf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf {
	/// Exact (whole-phrase) match: `field:\"text\"` with an optional boost.
	Phrase { field: &'static str, text: String, boost: Option<u64> },
	/// Tokenized match: `field:text` with an optional boost.
	Term { field: &'static str, text: String, boost: Option<u64> },
	/// Substring match: `field:*pattern*`.
	Wildcard { field: &'static str, pattern: String },
	/// Inclusive range: `field:[\"start\" TO \"end\"]`. An open `*` bound is
	/// rendered unquoted; the index rejects a quoted wildcard bound.
	Range { field: &'static str, start: String, end: String },
	/// Business-word pairing against an exact field: a boosted phrase
	/// immediately followed by the keyword remainder,
	/// `field:\"phrase\"^boost<tail>`.
	PhrasePair { field: &'static str, phrase: String, boost: u64, tail: String },
	/// Business-word pairing against a tokenized field: same shape without
	/// phrase quotes, `field:phrase^boost<tail>`.
	TermPair { field: &'static str, phrase: String, boost: u64, tail: String },
}

impl Query {
	pub fn phrase(field: &'static str, text: &str) -> Self {
		Self::Leaf(Leaf::Phrase { field, text: escape_reserved(text), boost: None })
	}

	pub fn boosted_phrase(field: &'static str, text: &str, boost: u64) -> Self {
		Self::Leaf(Leaf::Phrase { field, text: escape_reserved(text), boost: Some(boost) })
	}

	pub fn term(field: &'static str, text: &str) -> Self {
		Self::Leaf(Leaf::Term { field, text: escape_reserved(text), boost: None })
	}

	pub fn boosted_term(field: &'static str, text: &str, boost: u64) -> Self {
		Self::Leaf(Leaf::Term { field, text: escape_reserved(text), boost: Some(boost) })
	}

	pub fn wildcard(field: &'static str, pattern: &str) -> Self {
		Self::Leaf(Leaf::Wildcard { field, pattern: escape_reserved(pattern) })
	}

	/// Range bounds are trusted (dates and `*`), not user keyword text, and
	/// are rendered verbatim.
	pub fn range(field: &'static str, start: &str, end: &str) -> Self {
		Self::Leaf(Leaf::Range { field, start: start.to_string(), end: end.to_string() })
	}

	pub fn phrase_pair(field: &'static str, phrase: &str, boost: u64, tail: &str) -> Self {
		Self::Leaf(Leaf::PhrasePair {
			field,
			phrase: escape_reserved(phrase),
			boost,
			tail: escape_reserved(tail),
		})
	}

	pub fn term_pair(field: &'static str, phrase: &str, boost: u64, tail: &str) -> Self {
		Self::Leaf(Leaf::TermPair {
			field,
			phrase: escape_reserved(phrase),
			boost,
			tail: escape_reserved(tail),
		})
	}

	pub fn not(self) -> Self {
		Self::Not(Box::new(self))
	}

	/// Appends `other` to an existing conjunction, or forms one.
	pub fn and_with(self, other: Self) -> Self {
		match self {
			Self::And(mut children) => {
				children.push(other);
				Self::And(children)
			},
			_ => Self::And(vec![self, other]),
		}
	}

	/// True when any leaf of the tree matches against `field`. The result
	/// decoder uses this to detect which content fields the query touched.
	pub fn mentions_field(&self, field: &str) -> bool {
		match self {
			Self::And(children) | Self::Or(children) =>
				children.iter().any(|child| child.mentions_field(field)),
			Self::Not(child) => child.mentions_field(field),
			Self::Leaf(leaf) => leaf.field() == field,
		}
	}

	pub fn serialize(&self) -> String {
		let mut out = String::new();
		self.write(&mut out);

		out
	}

	fn write(&self, out: &mut String) {
		match self {
			Self::And(children) => write_joined(out, children, " AND "),
			Self::Or(children) => write_joined(out, children, " OR "),
			Self::Not(child) => {
				out.push_str("(-");
				child.write(out);
				out.push(')');
			},
			Self::Leaf(leaf) => leaf.write(out),
		}
	}
}

impl Leaf {
	fn field(&self) -> &'static str {
		match self {
			Self::Phrase { field, .. }
			| Self::Term { field, .. }
			| Self::Wildcard { field, .. }
			| Self::Range { field, .. }
			| Self::PhrasePair { field, .. }
			| Self::TermPair { field, .. } => field,
		}
	}

	fn write(&self, out: &mut String) {
		match self {
			Self::Phrase { field, text, boost } => {
				out.push_str(field);
				out.push_str(":\\\"");
				out.push_str(text);
				out.push_str("\\\"");
				if let Some(boost) = boost {
					out.push('^');
					out.push_str(&boost.to_string());
				}
			},
			Self::Term { field, text, boost } => {
				out.push_str(field);
				out.push(':');
				out.push_str(text);
				if let Some(boost) = boost {
					out.push('^');
					out.push_str(&boost.to_string());
				}
			},
			Self::Wildcard { field, pattern } => {
				out.push_str(field);
				out.push_str(":*");
				out.push_str(pattern);
				out.push('*');
			},
			Self::Range { field, start, end } => {
				out.push_str(field);
				out.push_str(":[");
				write_bound(out, start);
				out.push_str(" TO ");
				write_bound(out, end);
				out.push(']');
			},
			Self::PhrasePair { field, phrase, boost, tail } => {
				out.push_str(field);
				out.push_str(":\\\"");
				out.push_str(phrase);
				out.push_str("\\\"^");
				out.push_str(&boost.to_string());
				out.push_str(tail);
			},
			Self::TermPair { field, phrase, boost, tail } => {
				out.push_str(field);
				out.push(':');
				out.push_str(phrase);
				out.push('^');
				out.push_str(&boost.to_string());
				out.push_str(tail);
			},
		}
	}
}

fn write_joined(out: &mut String, children: &[Query], separator: &str) {
	match children {
		[] => {},
		[only] => only.write(out),
		_ => {
			out.push('(');
			for (i, child) in children.iter().enumerate() {
				if i > 0 {
					out.push_str(separator);
				}
				child.write(out);
			}
			out.push(')');
		},
	}
}

fn write_bound(out: &mut String, bound: &str) {
	if bound == "*" {
		out.push('*');
	} else {
		out.push_str("\\\"");
		out.push_str(bound);
		out.push_str("\\\"");
	}
}
