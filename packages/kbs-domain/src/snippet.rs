//! Content snippet post-processing: attachment-id stripping, transport
//! artifact cleanup, and highlight-aware truncation.

use regex::Regex;

/// Rendered snippets are cut at this many characters.
pub const SNIPPET_LIMIT: usize = 250;
/// Preview length used when no keyword was searched.
pub const PREVIEW_LIMIT: usize = 150;

/// Removes embedded attachment-id tokens (a 32-character hex-ish id followed
/// by underscores) from content. Best-effort; on failure the content is
/// returned unchanged.
pub fn strip_attachment_ids(content: &str) -> String {
	match Regex::new("[A-Za-z0-9]{32}_+") {
		Ok(re) => re.replace_all(content, "").into_owned(),
		Err(_) => content.to_string(),
	}
}

/// Removes transport artifacts the index leaves in content: literal `null`
/// placeholders, stray brackets, and a mangled `fontcolor` highlight tag.
pub fn clean_content(content: &str) -> String {
	content.replace("null", "").replace('[', "").replace(']', "").replace("fontcolor", "font color")
}

pub fn preview(content: &str) -> String {
	truncate_chars(content.trim(), PREVIEW_LIMIT)
}

/// Character-count truncation; never splits a character.
pub fn truncate(content: &str, limit: usize) -> String {
	truncate_chars(content, limit)
}

/// Cuts content to [`SNIPPET_LIMIT`] characters, except when that would slice
/// through the highlighted keyword span; then the cut extends to just past the
/// span's closing tag.
pub fn clamp_highlight(content: &str, keyword: &str) -> String {
	let total = content.chars().count();
	if total <= SNIPPET_LIMIT {
		return content.to_string();
	}

	let marker = format!("<font color=\"red\">{keyword}</font>");
	let marker_len = marker.chars().count();

	if let Some(byte_index) = content.find(&marker) {
		let char_index = content[..byte_index].chars().count();

		if char_index > SNIPPET_LIMIT.saturating_sub(marker_len) && char_index < SNIPPET_LIMIT {
			return truncate_chars(content, char_index + marker_len);
		}
	}

	truncate_chars(content, SNIPPET_LIMIT)
}

fn truncate_chars(content: &str, limit: usize) -> String {
	content.chars().take(limit).collect()
}
