//! The search pipeline.
//!
//! One request flows through permission resolution, optional popularity
//! prefetch, keyword and filter clause assembly, the main gateway call,
//! record decoding, and an optional facet follow-up. The reply never
//! surfaces an error type: a transport failure on the main call degrades to
//! a `status: false` reply, while the best-effort sub-steps (popularity,
//! business words, role-exclusion parsing) have already degraded to empty
//! contributions further down.

use kbs_domain::{
	business::BusinessWordMatcher,
	escape,
	facet::{self, FacetCount},
	query::Query,
	weights::TermWeightTable,
};
use kbs_gateway::{DEFAULT_FIELD, GatewayQuery, INTERFACE_FACET, INTERFACE_QUERY, UNIQUE_KEY};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	SearchService, ServiceError, ServiceResult,
	decode::{self, DecodeContext, FaqRecord, SearchRecord},
	filter, keyword,
	keyword::KeywordOptions,
	permission, popularity,
	request::{SearchRequest, SortMode, UserContext},
	request_time,
};

const SEARCH_SERVICE: &str = "A001";
/// Request source marker for the desktop portal.
const SOURCE_PORTAL: &str = "1";

const KNOWLEDGE_FIELDS: &str = "solrid,docid,doctitle,doctitles,dockeyword,dockeywords,\
	docabstracts,docabstract,html,htmls,attach,attachs,content,contents,content2,content2s,\
	ct_id,ct_name,parent_path_id,parent_path_name,hitcount,crt_time,update_time,\
	update_user_id,crt_user_name,update_user_name,crt_org_id,crt_org_name,tp_id,tp_name,\
	city_id,city_name,city_ids,city_names,up_city_id,end_time,start_time,up_city_name,\
	lifestatus,is_top,is_recommend";
const FAQ_FIELDS: &str = "solrid,docid,doctitle,score,faq_da2,faq_da2_html,faq_wt2,faq_da2s,\
	faq_wt2s,parentpath,cityname,mainquestionid,answerid";
const FACET_FIELDS: &str = "parent_path_id";

const KNOWLEDGE_HIGHLIGHT: &str = "doctitle,doctitles,dockeyword,dockeywords,docabstracts,\
	docabstract,contents,content,content2s,content2";
const FAQ_HIGHLIGHT: &str = "faq_wt2s,faq_wt2";

const REPLY_OK: &str = "Request successful";
const REPLY_EMPTY: &str = "No data";
const REPLY_FAILED: &str = "Failed to fetch";

#[derive(Debug, Clone, Serialize)]
pub struct SearchReply {
	pub status: bool,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<PageResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
	pub current_page: u64,
	pub page_size: u64,
	pub total_count: u64,
	pub total_pages: u64,
	pub search_id: String,
	pub records: PageRecords,
	/// Per-category totals, present only when category counting is enabled.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub facet_counts: Option<Vec<FacetCount>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PageRecords {
	Knowledge(Vec<SearchRecord>),
	Faq(Vec<FaqRecord>),
}

impl SearchService {
	/// Runs one search. The reply always carries a status and a message; a
	/// failed main query reports `status: false` instead of erroring out.
	pub async fn search(&self, request: &SearchRequest, user: &UserContext) -> SearchReply {
		match self.run(request, user).await {
			Ok(Some(page)) =>
				SearchReply { status: true, message: REPLY_OK.to_string(), data: Some(page) },
			Ok(None) =>
				SearchReply { status: true, message: REPLY_EMPTY.to_string(), data: None },
			Err(ServiceError::InvalidRequest { message }) =>
				SearchReply { status: false, message, data: None },
			Err(error) => {
				tracing::error!("Search failed, {error}.");

				SearchReply { status: false, message: REPLY_FAILED.to_string(), data: None }
			},
		}
	}

	/// FAQ search is the same pipeline with the FAQ record shape forced on.
	pub async fn search_faq(&self, request: &SearchRequest, user: &UserContext) -> SearchReply {
		let request = SearchRequest { faq: true, ..request.clone() };

		self.search(&request, user).await
	}

	async fn run(
		&self,
		request: &SearchRequest,
		user: &UserContext,
	) -> ServiceResult<Option<PageResult>> {
		if request.current_page < 1 {
			return Err(ServiceError::InvalidRequest {
				message: "The current page must be at least 1.".to_string(),
			});
		}
		if request.page_size < 1 {
			return Err(ServiceError::InvalidRequest {
				message: "The page size must be at least 1.".to_string(),
			});
		}

		// `current_page >= 1`, so the product is at least `page_size` and the
		// subtraction cannot underflow.
		let start = request
			.current_page
			.checked_mul(request.page_size)
			.map(|rows| rows - request.page_size)
			.ok_or_else(|| ServiceError::InvalidRequest {
				message: "The requested page is out of range.".to_string(),
			})?;
		let search_id = Uuid::new_v4().simple().to_string();
		// ASCII quote pairs break the index's phrase parsing; fold them to
		// full-width quotes before anything else sees the keyword.
		let keyword = escape::fold_quoted_spans(&request.keyword.trim().to_lowercase());
		let normalized = escape::normalize(&keyword);
		let city_id = if self.cfg.knowledge.flag("area_scope_control") {
			user.city_id.clone()
		} else {
			request.city_id.trim().to_string()
		};
		let sort = resolve_sort(request, &keyword, &self.cfg.knowledge);
		let permission =
			permission::resolve(&self.cfg, &self.collaborators, request, user).await;

		let summary_field = self.cfg.knowledge.get("summary_field");
		let opts = KeywordOptions {
			bss_selected: request.bss_selected,
			search_content: request.search_content,
			search_attach: request.search_attach,
			summary_field_configured: !summary_field.is_empty(),
		};
		let doc_ids_given = !request.doc_ids.trim().is_empty();
		let boosts = if !doc_ids_given
			&& !keyword.is_empty()
			&& !request.bss_selected
			&& !normalized.contains(' ')
		{
			popularity::boost_clauses(
				&self.cfg,
				self.gateway.as_ref(),
				&search_id,
				&normalized,
				&city_id,
				user,
			)
			.await
		} else {
			Vec::new()
		};

		let keyword_clause = if keyword.is_empty() {
			None
		} else {
			let weights = TermWeightTable::from_settings(&self.cfg.weights);
			let business = BusinessWordMatcher::from_settings(&self.cfg.weights);

			Some(keyword::build(&normalized, opts, &weights, &business, &boosts))
		};
		let q = filter::assemble(&self.cfg, request, user, keyword_clause.clone(), &permission);

		let life_status = request.life_status.trim();
		let query = GatewayQuery {
			req_id: search_id.clone(),
			req_time: request_time(),
			start,
			rows: request.page_size,
			org_code: self.cfg.gateway.org_code.clone(),
			service_code: format!("{}{SEARCH_SERVICE}", user.ep_id),
			interface_code: INTERFACE_QUERY.to_string(),
			user_name: self.cfg.gateway.user_name.clone(),
			pass_word: self.cfg.gateway.pass_word.clone(),
			loginid: user.user_id.clone(),
			loginname: user.login_name.clone(),
			key_words: keyword.clone(),
			source: SOURCE_PORTAL.to_string(),
			// A multi-value life-status travels only inside the query text.
			lifestatus: if life_status.contains(',') {
				String::new()
			} else {
				life_status.to_string()
			},
			cityid: city_id,
			mm: self.cfg.weights.get("mm").to_string(),
			bf: self.cfg.weights.get("bf").to_string(),
			fl: if request.faq { FAQ_FIELDS } else { KNOWLEDGE_FIELDS }.to_string(),
			df: DEFAULT_FIELD.to_string(),
			zj: UNIQUE_KEY.to_string(),
			sort,
			q: q.serialize(),
			light: if keyword.is_empty() {
				String::new()
			} else if request.faq {
				FAQ_HIGHLIGHT.to_string()
			} else {
				KNOWLEDGE_HIGHLIGHT.to_string()
			},
			facet_field: None,
		};

		let Some(envelope) =
			self.gateway.execute(&query, &user.ep_id, request.net_type.as_deref()).await?
		else {
			return Ok(None);
		};

		let records = if request.faq {
			PageRecords::Faq(envelope.records.iter().filter_map(decode::faq_record).collect())
		} else {
			let ctx = DecodeContext {
				keyword: &keyword,
				searched_content: q.mentions_field("content"),
				searched_contents: q.mentions_field("contents"),
				summary_field,
				expiry_warning: self.cfg.knowledge.flag("display_expiry_warning"),
				now: OffsetDateTime::now_utc(),
			};

			PageRecords::Knowledge(
				envelope.records.iter().filter_map(|record| decode::search_record(record, &ctx)).collect(),
			)
		};

		let facet_counts = if self.cfg.knowledge.flag("category_count") {
			Some(self.facet_counts(request, user, &keyword, keyword_clause, &query).await?)
		} else {
			None
		};

		Ok(Some(PageResult {
			current_page: request.current_page,
			page_size: request.page_size,
			total_count: envelope.count,
			total_pages: envelope.count.div_ceil(request.page_size),
			search_id,
			records,
			facet_counts,
		}))
	}

	/// The facet follow-up reuses the main query's resolved filters, but with
	/// the explicit category cleared so counts cover everything the user may
	/// see, not just the category being browsed.
	async fn facet_counts(
		&self,
		request: &SearchRequest,
		user: &UserContext,
		keyword: &str,
		keyword_clause: Option<Query>,
		main_query: &GatewayQuery,
	) -> ServiceResult<Vec<FacetCount>> {
		if keyword.is_empty() {
			return Ok(Vec::new());
		}

		let cleared = SearchRequest { category_id: String::new(), ..request.clone() };
		let permission =
			permission::resolve(&self.cfg, &self.collaborators, &cleared, user).await;
		let q = filter::assemble(&self.cfg, &cleared, user, keyword_clause, &permission);
		let by_type = self.cfg.knowledge.flag("facet_by_type");
		let query = GatewayQuery {
			req_id: Uuid::new_v4().simple().to_string(),
			interface_code: INTERFACE_FACET.to_string(),
			start: 0,
			rows: 1,
			fl: FACET_FIELDS.to_string(),
			facet_field: Some(if by_type { "type" } else { FACET_FIELDS }.to_string()),
			q: q.serialize(),
			..main_query.clone()
		};

		let Some(envelope) = self.gateway.execute(&query, &user.ep_id, None).await? else {
			return Ok(Vec::new());
		};
		let rows = envelope.facet_rows();

		if by_type {
			// Type facets are flat already; no path to roll up.
			return Ok(rows
				.into_iter()
				.map(|(category_id, count)| FacetCount { category_id, count })
				.collect());
		}

		Ok(facet::roll_up(rows.iter().map(|(path, count)| (path.as_str(), *count))))
	}
}

fn resolve_sort(request: &SearchRequest, keyword: &str, knowledge: &kbs_config::Settings) -> String {
	if !request.sort_items.trim().is_empty() {
		return request.sort_items.trim().to_string();
	}

	let direction = if request.sort_desc.unwrap_or(true) { "desc" } else { "asc" };

	if request.sort.is_none() && keyword.is_empty() && knowledge.flag("nokey_time_order") {
		return format!("update_time,{direction}");
	}

	format!("{},{direction}", request.sort.unwrap_or(SortMode::Relevance).index_field())
}

#[cfg(test)]
mod tests {
	use kbs_config::Settings;

	use super::*;

	#[test]
	fn sort_defaults_to_score_descending() {
		let request = SearchRequest::default();
		assert_eq!(resolve_sort(&request, "kw", &Settings::default()), "score,desc");
	}

	#[test]
	fn sort_items_override_everything() {
		let request = SearchRequest {
			sort_items: "hitcount,asc".to_string(),
			sort: Some(SortMode::Title),
			..SearchRequest::default()
		};
		assert_eq!(resolve_sort(&request, "kw", &Settings::default()), "hitcount,asc");
	}

	#[test]
	fn keywordless_search_can_fall_back_to_update_time() {
		let knowledge = Settings::from_pairs([("nokey_time_order", "Y")]);
		let request = SearchRequest::default();
		assert_eq!(resolve_sort(&request, "", &knowledge), "update_time,desc");
		// An explicit sort mode still wins.
		let sorted = SearchRequest { sort: Some(SortMode::HitCount), ..SearchRequest::default() };
		assert_eq!(resolve_sort(&sorted, "", &knowledge), "hitcount,desc");
	}

	#[test]
	fn ascending_flips_the_direction() {
		let request = SearchRequest {
			sort: Some(SortMode::UpdateTime),
			sort_desc: Some(false),
			..SearchRequest::default()
		};
		assert_eq!(resolve_sort(&request, "kw", &Settings::default()), "update_time,asc");
	}
}
