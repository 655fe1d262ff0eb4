//! Non-keyword query constraints.
//!
//! Builds the base clause in strict precedence (explicit document ids, then
//! the keyword clause, then status only) and appends life-status, date-range,
//! permission, dataset, role-exclusion, pin and organization filters.

use kbs_config::Config;
use kbs_domain::query::Query;

use crate::{
	permission::{self, ResolvedPermission},
	request::{SearchRequest, UserContext},
};

/// Only published document states are searchable.
pub(crate) fn status_filter() -> Query {
	Query::Or(vec![
		Query::term("docstatus", "3"),
		Query::term("docstatus", "5"),
		Query::term("docstatus", "6"),
	])
}

pub(crate) fn assemble(
	cfg: &Config,
	request: &SearchRequest,
	user: &UserContext,
	keyword_clause: Option<Query>,
	permission: &ResolvedPermission,
) -> Query {
	let doc_ids: Vec<&str> =
		request.doc_ids.split(',').map(str::trim).filter(|id| !id.is_empty()).collect();
	let mut q = if !doc_ids.is_empty() {
		Query::Or(doc_ids.into_iter().map(|id| Query::term("docid", id)).collect())
	} else if let Some(clause) = keyword_clause {
		clause
	} else {
		status_filter()
	};

	// A comma-separated life-status is an "any of" set; a single value is an
	// equality filter defaulting to "1".
	let life_status = request.life_status.trim();

	if life_status.contains(',') {
		let statuses: Vec<Query> = life_status
			.split(',')
			.map(str::trim)
			.filter(|status| !status.is_empty())
			.map(|status| Query::term("lifestatus", status))
			.collect();

		if !statuses.is_empty() {
			q = q.and_with(Query::Or(statuses));
		}
	} else {
		let status = if life_status.is_empty() { "1" } else { life_status };

		q = q.and_with(Query::term("lifestatus", status));
	}

	// The publish filter reads the bounds as the creation filter left them,
	// so an end date normalized to end-of-day carries over.
	let mut start = request.start_time.trim().to_string();
	let mut end = request.end_time.trim().to_string();
	let has_range = !start.is_empty() || !end.is_empty();

	if has_range && cfg.knowledge.flag("creation_date_filter") {
		if start.is_empty() {
			start = "*".to_string();
		}
		end = if end.is_empty() { "*".to_string() } else { format!("{end} 23:59:59") };

		q = q.and_with(Query::range("crt_time", &start, &end));
	}
	if has_range && cfg.knowledge.flag("publish_date_filter") {
		if start.is_empty() {
			start = "*".to_string();
		}
		if end.is_empty() {
			end = "*".to_string();
		} else if end.contains(" 00:00:00") {
			end = end.replace(" 00:00:00", " 23:59:59");
		}

		q = q.and_with(Query::range("start_time", &start, &end));
	}

	for clause in permission.clauses(request.dataset_belong.trim(), &user.user_id) {
		q = q.and_with(clause);
	}
	for exclusion in permission::role_exclusions(&cfg.knowledge, &user.role_ids) {
		q = q.and_with(exclusion);
	}

	if !request.is_top.trim().is_empty() {
		q = q.and_with(Query::term("is_top", request.is_top.trim()));
	}
	if !user.org_id.is_empty() {
		q = q.and_with(Query::term("crt_org_id", &user.org_id));
	}

	q
}
