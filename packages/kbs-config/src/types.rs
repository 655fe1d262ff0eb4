use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub gateway: Gateway,
	/// Search-weight scope. Flat key→value settings consumed by the query
	/// builders. Recognized keys:
	///
	/// - `doctitles_boost`, `dockeywords_boost`, `docabstracts_boost` — exact
	///   field boosts (defaults 2500 / 500 / 300),
	/// - `doctitle_boost`, `dockeyword_boost`, `docabstract_boost` — tokenized
	///   field boosts (defaults 100 / 70 / 50),
	/// - `contents_boost` — content field boost (default 200),
	/// - `doctitles_bus_boost`, `dockeywords_bus_boost`, `doctitle_bus_boost`,
	///   `dockeyword_bus_boost` — business-word clause boosts (default to the
	///   corresponding non-business boost),
	/// - `business_words` — comma-separated business phrases,
	/// - `mm`, `bf` — index-side relevance tuning, passed through untouched.
	#[serde(default)]
	pub weights: Settings,
	/// Knowledge-management scope. Flat key→value feature settings:
	///
	/// - `nokey_time_order` (`Y`) — sort by update time when no keyword and no
	///   explicit sort mode,
	/// - `creation_date_filter` (`Y`) — enable the creation-date range filter,
	/// - `publish_date_filter` (`Y`) — enable the publish-date range filter,
	/// - `category_count` (`Y`) — enable the facet follow-up request,
	/// - `facet_by_type` (`Y`) — facet on the flat `type` field instead of the
	///   parent-path dimension,
	/// - `summary_field` — alternate summary field name (`content2`),
	/// - `display_expiry_warning` (`Y`) — annotate titles with expiry counts,
	/// - `area_scope_control` (`Y`) — scope the request to the caller's city,
	/// - `category_underscore_wrap` (`Y`) — wrap an explicit category id in
	///   underscores before use,
	/// - `role_category_filter` — JSON array of `{roleIds, ctIds}` exclusion
	///   rules.
	#[serde(default)]
	pub knowledge: Settings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Gateway {
	pub api_url: String,
	pub timeout_ms: u64,
	pub user_name: String,
	pub pass_word: String,
	/// Value of the `headercheck` request header expected by the gateway.
	pub header_token: String,
	#[serde(default = "default_org_code")]
	pub org_code: String,
}

/// A flat key→value scope. Lookups never fail: a missing or blank key reads as
/// the empty string, which every consumer treats as "use the default".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Settings {
	values: HashMap<String, String>,
}

impl Settings {
	pub fn get(&self, key: &str) -> &str {
		self.values.get(key).map(String::as_str).unwrap_or("")
	}

	pub fn flag(&self, key: &str) -> bool {
		self.get(key) == "Y"
	}

	pub fn from_pairs<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self { values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
	}
}

fn default_org_code() -> String {
	"1".to_string()
}
