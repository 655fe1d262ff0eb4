//! Multi-source permission resolution.
//!
//! Exactly one source supplies the allowed category set, in precedence order:
//! the scene binding, an explicit category id on the request, then the
//! permission lookup. A lookup failure or an empty result denies access: the
//! rendered clause matches a sentinel category id no real document carries, so
//! the query returns nothing rather than everything.

use kbs_config::{Config, Settings};
use kbs_domain::query::Query;
use serde::Deserialize;

use crate::{
	Collaborators, PermissionLookup,
	request::{SearchRequest, UserContext},
};

/// Category id guaranteed absent from real data.
pub const NO_ACCESS_CATEGORY: &str = "0000";

/// The allowed category ids for one request. Computed once per request and
/// never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPermission {
	pub category_ids: Vec<String>,
}

impl ResolvedPermission {
	/// Renders the permission and dataset constraints. An empty category set
	/// without a dataset id yields the sentinel clause; a dataset id of "0"
	/// additionally restricts to the requester's own documents.
	pub fn clauses(&self, dataset_belong: &str, user_id: &str) -> Vec<Query> {
		let mut clauses = Vec::new();

		if self.category_ids.is_empty() {
			if dataset_belong.is_empty() {
				clauses.push(Query::term("ct_id", NO_ACCESS_CATEGORY));
			}
		} else {
			clauses.push(Query::Or(
				self.category_ids.iter().map(|id| Query::term("ct_id", id)).collect(),
			));
		}
		if !dataset_belong.is_empty() {
			clauses.push(Query::term("item_id", dataset_belong));

			if dataset_belong == "0" {
				clauses.push(Query::term("crt_user_id", user_id));
			}
		}

		clauses
	}
}

pub(crate) async fn resolve(
	cfg: &Config,
	collaborators: &Collaborators,
	request: &SearchRequest,
	user: &UserContext,
) -> ResolvedPermission {
	if !request.scene_id.trim().is_empty() {
		match collaborators.scene.scene_category_id(&request.scene_id, request.scene_formal).await {
			Ok(id) if !id.trim().is_empty() =>
				return ResolvedPermission { category_ids: vec![id.trim().to_string()] },
			// A scene without a bound category falls through to the other
			// sources.
			Ok(_) => {},
			Err(error) => {
				tracing::warn!("Unable to resolve the scene category, denying access, {error:?}.");

				return ResolvedPermission::default();
			},
		}
	}
	if !request.category_id.trim().is_empty() {
		let id = if cfg.knowledge.flag("category_underscore_wrap") {
			format!("_{}_", request.category_id.trim())
		} else {
			request.category_id.trim().to_string()
		};

		return ResolvedPermission { category_ids: vec![id] };
	}

	let lookup = PermissionLookup {
		ep_id: user.ep_id.clone(),
		user_id: user.user_id.clone(),
		category_hint: request.category_id.clone(),
		folder_label: request.folder_label.clone(),
	};

	match collaborators.permission.category_ids(&lookup).await {
		Ok(Some(ids)) => ResolvedPermission { category_ids: split_ids(&ids) },
		Ok(None) => ResolvedPermission::default(),
		Err(error) => {
			tracing::warn!("Permission lookup failed, denying access, {error:?}.");

			ResolvedPermission::default()
		},
	}
}

/// Role-based category exclusions. The `role_category_filter` setting is a
/// JSON array of rules; a user holding none of a rule's roles is denied every
/// category path under the rule's ids. Purely subtractive, and a malformed
/// configuration contributes nothing.
pub(crate) fn role_exclusions(knowledge: &Settings, user_roles: &str) -> Vec<Query> {
	let raw = knowledge.get("role_category_filter");

	if raw.trim().is_empty() {
		return Vec::new();
	}

	let rules: Vec<RoleCategoryRule> = match serde_json::from_str(raw) {
		Ok(rules) => rules,
		Err(error) => {
			tracing::warn!("Ignoring a malformed role category filter, {error:?}.");

			return Vec::new();
		},
	};
	let held: Vec<&str> =
		user_roles.split(',').map(str::trim).filter(|role| !role.is_empty()).collect();
	let mut exclusions = Vec::new();

	for rule in &rules {
		let holds_any = rule
			.role_ids
			.split(',')
			.map(str::trim)
			.filter(|role| !role.is_empty())
			.any(|role| held.contains(&role));

		if holds_any {
			continue;
		}

		for ct in rule.ct_ids.split(',').map(str::trim).filter(|ct| !ct.is_empty()) {
			exclusions.push(Query::wildcard("parent_path_id", ct).not());
		}
	}

	exclusions
}

fn split_ids(raw: &str) -> Vec<String> {
	raw.split(',').map(str::trim).filter(|id| !id.is_empty()).map(str::to_string).collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleCategoryRule {
	#[serde(default)]
	role_ids: String,
	#[serde(default)]
	ct_ids: String,
}
