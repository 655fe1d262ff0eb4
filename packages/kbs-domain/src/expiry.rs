//! Expiry classification for title annotation.
//!
//! A record carries a comma-separated list of item expiry timestamps. Each
//! parseable timestamp is classified by time remaining: within 30 days counts
//! toward the "red" bucket, within 90 but more than 30 days toward the
//! "orange" bucket. Already-expired items land in the red bucket. Unparseable
//! timestamps are skipped.

use time::{Duration, OffsetDateTime, PrimitiveDateTime, macros::format_description};

const RED_WINDOW: Duration = Duration::days(30);
const ORANGE_WINDOW: Duration = Duration::days(90);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiryCounts {
	pub red: u32,
	pub orange: u32,
}

impl ExpiryCounts {
	pub fn is_empty(&self) -> bool {
		self.red == 0 && self.orange == 0
	}
}

pub fn classify(end_times: &str, now: OffsetDateTime) -> ExpiryCounts {
	let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
	let mut counts = ExpiryCounts::default();

	for raw in end_times.split(',') {
		let raw = raw.trim();
		if raw.is_empty() {
			continue;
		}
		let Ok(end) = PrimitiveDateTime::parse(raw, &format) else {
			continue;
		};
		let remaining = end.assume_utc() - now;

		if remaining <= RED_WINDOW {
			counts.red += 1;
		} else if remaining <= ORANGE_WINDOW {
			counts.orange += 1;
		}
	}

	counts
}

/// Appends up to two annotation fragments, red first.
pub fn annotate_title(title: &str, counts: ExpiryCounts) -> String {
	let mut out = title.to_string();

	if counts.red > 0 {
		out.push_str(&format!(
			" <font color='red'>[expiring within 1 month: {}]</font>",
			counts.red
		));
	}
	if counts.orange > 0 {
		out.push_str(&format!(
			" <font color='orange'>[expiring within 3 months: {}]</font>",
			counts.orange
		));
	}

	out
}
