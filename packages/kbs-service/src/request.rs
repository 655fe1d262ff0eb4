use serde::{Deserialize, Serialize};

/// One structured search request as bound by the (out-of-scope) endpoint
/// layer. Blank strings mean "not supplied" throughout, matching the wire
/// convention of the upstream UI.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchRequest {
	pub keyword: String,
	pub current_page: u64,
	pub page_size: u64,
	pub sort: Option<SortMode>,
	/// `false` flips the resolved sort to ascending; unset or `true` sorts
	/// descending.
	pub sort_desc: Option<bool>,
	/// Raw `field,direction` override; takes precedence over `sort`.
	pub sort_items: String,
	/// Life-status filter. Empty defaults to "1"; a comma-separated value is
	/// an "any of" set.
	pub life_status: String,
	pub city_id: String,
	/// Comma-separated explicit document ids; when present the keyword is
	/// ignored.
	pub doc_ids: String,
	pub category_id: String,
	pub dataset_belong: String,
	pub scene_id: String,
	pub scene_formal: bool,
	pub folder_label: String,
	pub faq: bool,
	pub bss_selected: bool,
	pub search_content: bool,
	pub search_attach: bool,
	/// Date-range bounds, `YYYY-MM-DD` or `YYYY-MM-DD hh:mm:ss`; either end
	/// may be blank for open-ended.
	pub start_time: String,
	pub end_time: String,
	pub is_top: String,
	pub net_type: Option<String>,
}

impl Default for SearchRequest {
	fn default() -> Self {
		Self {
			keyword: String::new(),
			current_page: 1,
			page_size: 10,
			sort: None,
			sort_desc: None,
			sort_items: String::new(),
			life_status: String::new(),
			city_id: String::new(),
			doc_ids: String::new(),
			category_id: String::new(),
			dataset_belong: String::new(),
			scene_id: String::new(),
			scene_formal: true,
			folder_label: String::new(),
			faq: false,
			bss_selected: false,
			search_content: true,
			search_attach: false,
			start_time: String::new(),
			end_time: String::new(),
			is_top: String::new(),
			net_type: None,
		}
	}
}

/// Read-only requester context supplied by the session layer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserContext {
	pub ep_id: String,
	pub user_id: String,
	pub login_name: String,
	pub org_id: String,
	pub city_id: String,
	/// Comma-separated role ids.
	pub role_ids: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
	Relevance,
	UpdateTime,
	HitCount,
	Title,
	CreationTime,
	PublishTime,
}

impl SortMode {
	pub fn index_field(self) -> &'static str {
		match self {
			Self::Relevance => "score",
			Self::UpdateTime => "update_time",
			Self::HitCount => "hitcount",
			Self::Title => "doctitle",
			Self::CreationTime => "crt_time",
			Self::PublishTime => "start_time",
		}
	}
}
