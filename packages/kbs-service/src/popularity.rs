//! Best-effort popularity boosting.
//!
//! A secondary gateway query looks the keyword up in the click/evaluation
//! record set, sorted by click count descending. The top candidates (at most
//! two) map their click count into a boost tier and contribute a boosted
//! unique-key term to the main keyword clause. Every failure on this path
//! degrades to an empty contribution; relevance boosting is never worth
//! failing the request over.

use kbs_config::Config;
use kbs_domain::query::Query;
use kbs_gateway::{DEFAULT_FIELD, Envelope, GatewayQuery, INTERFACE_QUERY, UNIQUE_KEY, field};

use crate::{SearchGateway, decode::decode_text, request::UserContext, request_time};

const POPULARITY_SERVICE: &str = "A008";
const POPULARITY_FIELDS: &str = "solrid,docid,doctitle,evl_word,evl_word_all,evl_count,cityid,cityname";
/// Boost applied to the whole-phrase evaluation-word field of the lookup
/// itself.
const LOOKUP_BOOST: u64 = 60000;
/// Candidates past this index are ignored.
const CANDIDATE_CUTOFF: usize = 1;

pub(crate) async fn boost_clauses(
	cfg: &Config,
	gateway: &dyn SearchGateway,
	search_id: &str,
	keyword: &str,
	city_id: &str,
	user: &UserContext,
) -> Vec<Query> {
	let mut lookup = Query::Or(vec![
		Query::boosted_phrase("evl_word_all", keyword, LOOKUP_BOOST),
		Query::phrase("evl_words", keyword),
	]);

	if !city_id.is_empty() {
		lookup = lookup.and_with(Query::wildcard("cityid", city_id));
	}

	let query = GatewayQuery {
		req_id: search_id.to_string(),
		req_time: request_time(),
		start: 0,
		rows: 10,
		org_code: cfg.gateway.org_code.clone(),
		service_code: format!("{}{POPULARITY_SERVICE}", user.ep_id),
		interface_code: INTERFACE_QUERY.to_string(),
		user_name: cfg.gateway.user_name.clone(),
		pass_word: cfg.gateway.pass_word.clone(),
		loginid: user.user_id.clone(),
		loginname: user.login_name.clone(),
		key_words: keyword.to_string(),
		fl: POPULARITY_FIELDS.to_string(),
		df: DEFAULT_FIELD.to_string(),
		zj: UNIQUE_KEY.to_string(),
		sort: "evl_count,desc".to_string(),
		q: lookup.serialize(),
		..GatewayQuery::default()
	};

	match gateway.execute(&query, &user.ep_id, None).await {
		Ok(Some(envelope)) => clauses_from(&envelope),
		Ok(None) => Vec::new(),
		Err(error) => {
			tracing::warn!("Popularity lookup failed, skipping the boost, {error:?}.");

			Vec::new()
		},
	}
}

fn clauses_from(envelope: &Envelope) -> Vec<Query> {
	let mut clauses = Vec::new();

	for (i, record) in envelope.records.iter().enumerate() {
		if let Some(clause) = clause_from(record) {
			clauses.push(clause);
		}
		if i == CANDIDATE_CUTOFF {
			break;
		}
	}

	clauses
}

fn clause_from(record: &serde_json::Map<String, serde_json::Value>) -> Option<Query> {
	let solrid = decode_text(field(record, UNIQUE_KEY)?);
	let count: u64 = decode_text(field(record, "evl_count")?).trim().parse().ok()?;

	Some(Query::boosted_term(UNIQUE_KEY, &solrid, count * tier(count)))
}

/// Rarely clicked entries get the largest multiplier so a handful of clicks
/// can still lift a record, while heavily clicked entries keep the product in
/// the same order of magnitude.
fn tier(count: u64) -> u64 {
	match count {
		0..10 => 500000,
		10..100 => 50000,
		100..1000 => 5000,
		1000..10000 => 500,
		_ => 50,
	}
}
