//! Escaping and normalization of user-supplied keyword text.
//!
//! The index's query language reserves `- + / [ ] ( )`; every user-controlled
//! substring embedded in a query must pass through [`escape_reserved`] first.
//! The escape sequence on the wire is two backslashes before the reserved
//! character, because the query string travels inside a JSON form field and is
//! unescaped once by the gateway before it reaches the index.

const RESERVED: [char; 7] = ['-', '+', '/', '[', ']', '(', ')'];

/// Prefixes every reserved query character with the wire escape sequence.
pub fn escape_reserved(word: &str) -> String {
	let mut out = String::with_capacity(word.len());

	for ch in word.chars() {
		if RESERVED.contains(&ch) {
			out.push_str("\\\\");
		}
		out.push(ch);
	}

	out
}

/// Pre-escape normalization: ASCII colons collide with the query language's
/// `field:value` syntax and are folded to full-width colons; a literal
/// backslash-n pair collapses to a real newline.
pub fn normalize(word: &str) -> String {
	word.replace(':', "：").replace("\\n", "\n")
}

/// Folds ASCII double-quoted spans into full-width quotes. An unbalanced
/// quote is left untouched. Applied to the raw keyword before anything else:
/// ASCII quotes would otherwise be read as phrase syntax by the index.
pub fn fold_quoted_spans(keyword: &str) -> String {
	let mut out = String::with_capacity(keyword.len());
	let mut rest = keyword;

	while let Some(open) = rest.find('"') {
		let after_open = &rest[open + 1..];
		let Some(close) = after_open.find('"') else {
			break;
		};

		out.push_str(&rest[..open]);
		out.push('“');
		out.push_str(&after_open[..close]);
		out.push('”');
		rest = &after_open[close + 1..];
	}
	out.push_str(rest);

	out
}

/// Test helper: checks that no reserved character is left unescaped.
#[cfg(test)]
pub fn is_escaped(word: &str) -> bool {
	let mut pending_escapes = 0usize;

	for ch in word.chars() {
		if ch == '\\' {
			pending_escapes += 1;
			continue;
		}
		if RESERVED.contains(&ch) && pending_escapes == 0 {
			return false;
		}
		pending_escapes = 0;
	}

	true
}
