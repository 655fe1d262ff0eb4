use std::{
	collections::VecDeque,
	sync::{Arc, Mutex},
};

use kbs_config::{Config, Gateway, Settings};
use kbs_gateway::{Envelope, GatewayQuery};
use kbs_service::{
	BoxFuture, Collaborators, PageRecords, PermissionLookup, PermissionProvider, SceneBinding,
	SearchGateway, SearchRequest, SearchService, UserContext,
};

struct StubGateway {
	queries: Mutex<Vec<GatewayQuery>>,
	responses: Mutex<VecDeque<kbs_gateway::Result<Option<Envelope>>>>,
}
impl StubGateway {
	fn new<I>(responses: I) -> Arc<Self>
	where
		I: IntoIterator<Item = kbs_gateway::Result<Option<Envelope>>>,
	{
		Arc::new(Self {
			queries: Mutex::new(Vec::new()),
			responses: Mutex::new(responses.into_iter().collect()),
		})
	}

	fn queries(&self) -> Vec<GatewayQuery> {
		self.queries.lock().expect("queries lock").clone()
	}
}
impl SearchGateway for StubGateway {
	fn execute<'a>(
		&'a self,
		query: &'a GatewayQuery,
		_ep_id: &'a str,
		_net_type: Option<&'a str>,
	) -> BoxFuture<'a, kbs_gateway::Result<Option<Envelope>>> {
		self.queries.lock().expect("queries lock").push(query.clone());

		let response =
			self.responses.lock().expect("responses lock").pop_front().expect("a stubbed response");

		Box::pin(async move { response })
	}
}

struct StubPermission(Option<&'static str>);
impl PermissionProvider for StubPermission {
	fn category_ids<'a>(
		&'a self,
		_lookup: &'a PermissionLookup,
	) -> BoxFuture<'a, color_eyre::Result<Option<String>>> {
		let ids = self.0.map(str::to_string);

		Box::pin(async move { Ok(ids) })
	}
}

struct FailingPermission;
impl PermissionProvider for FailingPermission {
	fn category_ids<'a>(
		&'a self,
		_lookup: &'a PermissionLookup,
	) -> BoxFuture<'a, color_eyre::Result<Option<String>>> {
		Box::pin(async move { Err(color_eyre::eyre::eyre!("permission backend offline")) })
	}
}

struct StubScene(&'static str);
impl SceneBinding for StubScene {
	fn scene_category_id<'a>(
		&'a self,
		_scene_id: &'a str,
		_formal: bool,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move { Ok(self.0.to_string()) })
	}
}

fn test_config(knowledge: Settings) -> Config {
	Config {
		gateway: Gateway {
			api_url: "http://localhost:9200/search".to_string(),
			timeout_ms: 1000,
			user_name: "kms".to_string(),
			pass_word: "secret".to_string(),
			header_token: "token".to_string(),
			org_code: "1".to_string(),
		},
		weights: Settings::default(),
		knowledge,
	}
}

fn service(
	knowledge: Settings,
	gateway: Arc<StubGateway>,
	permission: Arc<dyn PermissionProvider>,
) -> SearchService {
	let collaborators = Collaborators { permission, scene: Arc::new(StubScene("")) };

	SearchService::new(test_config(knowledge), gateway, collaborators)
}

fn user() -> UserContext {
	UserContext {
		ep_id: "ep1".to_string(),
		user_id: "u1".to_string(),
		login_name: "alice".to_string(),
		org_id: String::new(),
		city_id: String::new(),
		role_ids: String::new(),
	}
}

fn envelope(raw: &str) -> kbs_gateway::Result<Option<Envelope>> {
	Ok(Some(Envelope::parse(raw).expect("envelope parses")))
}

fn knowledge_page() -> kbs_gateway::Result<Option<Envelope>> {
	envelope(
		r#"{"kms":{"head":{"count":"23"},"body":{"message":[
			{"solrid":"s1","docid":"d1","doctitle":"Fiber+guide","content":"Install+steps",
			 "parent_path_name":"Root_Sub_Leaf"}
		]}}}"#,
	)
}

#[tokio::test]
async fn keyword_search_decodes_a_page_of_records() {
	let gateway = StubGateway::new([Ok(None), knowledge_page()]);
	let service =
		service(Settings::default(), gateway.clone(), Arc::new(StubPermission(Some("10,20"))));
	let request = SearchRequest { keyword: "Fiber ".to_string(), ..SearchRequest::default() };

	let reply = service.search(&request, &user()).await;
	assert!(reply.status);
	assert_eq!(reply.message, "Request successful");

	let page = reply.data.expect("a result page");
	assert_eq!(page.total_count, 23);
	assert_eq!(page.total_pages, 3);
	assert_eq!(page.search_id.len(), 32);

	let PageRecords::Knowledge(records) = page.records else {
		panic!("expected knowledge records");
	};
	assert_eq!(records.len(), 1);
	assert_eq!(records[0].doctitle, "Fiber guide");
	assert_eq!(records[0].parent_path_name, "Root");

	let queries = gateway.queries();
	assert_eq!(queries.len(), 2);
	// The popularity prefetch goes out first, against its own service code.
	assert_eq!(queries[0].service_code, "ep1A008");
	assert_eq!(queries[0].sort, "evl_count,desc");
	// The main query carries the weighted clause and the permission chain.
	let main = &queries[1];
	assert_eq!(main.service_code, "ep1A001");
	assert_eq!(main.key_words, "fiber");
	assert!(main.q.contains("doctitles:\\\"fiber\\\"^2500"));
	assert!(main.q.contains("(ct_id:10 OR ct_id:20)"));
	assert!(main.q.contains("AND lifestatus:1"));
	assert!(main.light.contains("doctitles"));
}

#[tokio::test]
async fn popularity_hits_are_spliced_into_the_main_query() {
	let popularity = envelope(
		r#"{"kms":{"head":{"count":1},"body":{"message":[{"solrid":"a1","evl_count":"5"}]}}}"#,
	);
	let gateway = StubGateway::new([popularity, knowledge_page()]);
	let service =
		service(Settings::default(), gateway.clone(), Arc::new(StubPermission(Some("10"))));
	let request = SearchRequest { keyword: "fiber".to_string(), ..SearchRequest::default() };

	let reply = service.search(&request, &user()).await;
	assert!(reply.status);
	assert!(gateway.queries()[1].q.contains("OR solrid:a1^2500000"));
}

#[tokio::test]
async fn a_failed_popularity_lookup_degrades_silently() {
	let gateway = StubGateway::new([
		Err(kbs_gateway::Error::InvalidResponse { message: "boom".to_string() }),
		knowledge_page(),
	]);
	let service =
		service(Settings::default(), gateway.clone(), Arc::new(StubPermission(Some("10"))));
	let request = SearchRequest { keyword: "fiber".to_string(), ..SearchRequest::default() };

	let reply = service.search(&request, &user()).await;
	assert!(reply.status);
	assert!(!gateway.queries()[1].q.contains("solrid:"));
}

#[tokio::test]
async fn multi_word_keywords_skip_the_popularity_prefetch() {
	let gateway = StubGateway::new([knowledge_page()]);
	let service =
		service(Settings::default(), gateway.clone(), Arc::new(StubPermission(Some("10"))));
	let request =
		SearchRequest { keyword: "fiber tariff".to_string(), ..SearchRequest::default() };

	let reply = service.search(&request, &user()).await;
	assert!(reply.status);

	let queries = gateway.queries();
	assert_eq!(queries.len(), 1);
	assert!(queries[0].q.contains("doctitles:\\\"fiber\\\"^2500"));
	assert!(queries[0].q.contains("doctitles:\\\"tariff\\\"^2500"));
}

#[tokio::test]
async fn a_multi_value_life_status_travels_only_in_the_query_text() {
	let gateway = StubGateway::new([knowledge_page()]);
	let service =
		service(Settings::default(), gateway.clone(), Arc::new(StubPermission(Some("10"))));
	let request = SearchRequest {
		keyword: "fiber tariff".to_string(),
		life_status: "1,4".to_string(),
		..SearchRequest::default()
	};

	service.search(&request, &user()).await;

	let main = &gateway.queries()[0];
	assert_eq!(main.lifestatus, "");
	assert!(main.q.contains("AND (lifestatus:1 OR lifestatus:4)"));
}

#[tokio::test]
async fn main_query_transport_failure_reports_a_failed_reply() {
	let gateway = StubGateway::new([Err(kbs_gateway::Error::InvalidResponse {
		message: "gateway unreachable".to_string(),
	})]);
	let service = service(Settings::default(), gateway, Arc::new(StubPermission(Some("10"))));
	let request =
		SearchRequest { keyword: "fiber tariff".to_string(), ..SearchRequest::default() };

	let reply = service.search(&request, &user()).await;
	assert!(!reply.status);
	assert_eq!(reply.message, "Failed to fetch");
	assert!(reply.data.is_none());
}

#[tokio::test]
async fn an_empty_gateway_body_means_no_data() {
	let gateway = StubGateway::new([Ok(None)]);
	let service = service(Settings::default(), gateway, Arc::new(StubPermission(Some("10"))));
	let request =
		SearchRequest { keyword: "fiber tariff".to_string(), ..SearchRequest::default() };

	let reply = service.search(&request, &user()).await;
	assert!(reply.status);
	assert_eq!(reply.message, "No data");
	assert!(reply.data.is_none());
}

#[tokio::test]
async fn a_permission_failure_fails_closed() {
	let gateway = StubGateway::new([Ok(None)]);
	let service = service(Settings::default(), gateway.clone(), Arc::new(FailingPermission));
	let request =
		SearchRequest { keyword: "fiber tariff".to_string(), ..SearchRequest::default() };

	let reply = service.search(&request, &user()).await;
	assert!(reply.status);
	assert!(gateway.queries()[0].q.contains("AND ct_id:0000"));
}

#[tokio::test]
async fn a_scene_binding_supplies_the_category() {
	let gateway = StubGateway::new([Ok(None)]);
	let collaborators = Collaborators {
		permission: Arc::new(FailingPermission),
		scene: Arc::new(StubScene("77")),
	};
	let service =
		SearchService::new(test_config(Settings::default()), gateway.clone(), collaborators);
	let request = SearchRequest {
		keyword: "fiber tariff".to_string(),
		scene_id: "scene-9".to_string(),
		..SearchRequest::default()
	};

	service.search(&request, &user()).await;
	assert!(gateway.queries()[0].q.contains("AND ct_id:77"));
}

#[tokio::test]
async fn category_counting_issues_a_facet_follow_up() {
	let facet = envelope(
		r#"{"kms":{"head":{"count":2},"body":{"message":[
			{"10_20":"5"},
			{"10_30":"2"}
		]}}}"#,
	);
	let gateway = StubGateway::new([knowledge_page(), facet]);
	let service = service(
		Settings::from_pairs([("category_count", "Y")]),
		gateway.clone(),
		Arc::new(StubPermission(Some("10"))),
	);
	let request =
		SearchRequest { keyword: "fiber tariff".to_string(), ..SearchRequest::default() };

	let reply = service.search(&request, &user()).await;
	assert!(reply.status);

	let counts = reply.data.expect("a result page").facet_counts.expect("facet counts");
	let of = |id: &str| counts.iter().find(|c| c.category_id == id).map(|c| c.count);
	assert_eq!(of("10"), Some(7));
	assert_eq!(of("20"), Some(5));
	assert_eq!(of("30"), Some(2));

	let queries = gateway.queries();
	assert_eq!(queries.len(), 2);
	assert_eq!(queries[1].interface_code, "kms_facet");
	assert_eq!(queries[1].facet_field.as_deref(), Some("parent_path_id"));
	assert_eq!(queries[1].rows, 1);
	assert_ne!(queries[1].req_id, queries[0].req_id);
}

#[tokio::test]
async fn category_counting_without_a_keyword_returns_empty_counts() {
	let gateway = StubGateway::new([knowledge_page()]);
	let service = service(
		Settings::from_pairs([("category_count", "Y")]),
		gateway.clone(),
		Arc::new(StubPermission(Some("10"))),
	);

	let reply = service.search(&SearchRequest::default(), &user()).await;
	assert!(reply.status);

	let counts = reply.data.expect("a result page").facet_counts.expect("facet counts");
	assert!(counts.is_empty());
	assert_eq!(gateway.queries().len(), 1);
}

#[tokio::test]
async fn faq_search_decodes_question_and_answer_records() {
	let faq_page = envelope(
		r#"{"kms":{"head":{"count":1},"body":{"message":[
			{"solrid":"f1","doctitle":"Activation","faq_wt2":"How+to+activate%3F",
			 "faq_da2":"Dial+100.","cityname":"Wuhan"}
		]}}}"#,
	);
	let gateway = StubGateway::new([faq_page]);
	let service =
		service(Settings::default(), gateway.clone(), Arc::new(StubPermission(Some("10"))));
	let request =
		SearchRequest { keyword: "activation steps".to_string(), ..SearchRequest::default() };

	let reply = service.search_faq(&request, &user()).await;
	assert!(reply.status);

	let PageRecords::Faq(records) = reply.data.expect("a result page").records else {
		panic!("expected faq records");
	};
	assert_eq!(records[0].question, "How to activate?");
	assert_eq!(records[0].answer, "Dial 100.");

	let main = &gateway.queries()[0];
	assert!(main.fl.contains("faq_wt2"));
	assert_eq!(main.light, "faq_wt2s,faq_wt2");
}

#[tokio::test]
async fn a_zero_page_size_is_rejected_before_any_call() {
	let gateway = StubGateway::new([]);
	let service =
		service(Settings::default(), gateway.clone(), Arc::new(StubPermission(Some("10"))));
	let request = SearchRequest { page_size: 0, ..SearchRequest::default() };

	let reply = service.search(&request, &user()).await;
	assert!(!reply.status);
	assert!(reply.message.contains("page size"));
	assert!(gateway.queries().is_empty());
}

#[tokio::test]
async fn area_scoping_overrides_the_requested_city() {
	let gateway = StubGateway::new([knowledge_page()]);
	let service = service(
		Settings::from_pairs([("area_scope_control", "Y")]),
		gateway.clone(),
		Arc::new(StubPermission(Some("10"))),
	);
	let request = SearchRequest {
		keyword: "fiber tariff".to_string(),
		city_id: "0755".to_string(),
		..SearchRequest::default()
	};
	let user = UserContext { city_id: "027".to_string(), ..user() };

	service.search(&request, &user).await;
	assert_eq!(gateway.queries()[0].cityid, "027");
}

#[tokio::test]
async fn an_explicit_category_can_be_underscore_wrapped() {
	let gateway = StubGateway::new([Ok(None)]);
	let service = service(
		Settings::from_pairs([("category_underscore_wrap", "Y")]),
		gateway.clone(),
		Arc::new(FailingPermission),
	);
	let request = SearchRequest {
		keyword: "fiber tariff".to_string(),
		category_id: "77".to_string(),
		..SearchRequest::default()
	};

	service.search(&request, &user()).await;
	assert!(gateway.queries()[0].q.contains("AND ct_id:_77_"));
}

#[tokio::test]
async fn type_facets_pass_through_without_roll_up() {
	let facet = envelope(
		r#"{"kms":{"head":{"count":2},"body":{"message":[
			{"faq_type":"5"},
			{"manual":"3"}
		]}}}"#,
	);
	let gateway = StubGateway::new([knowledge_page(), facet]);
	let service = service(
		Settings::from_pairs([("category_count", "Y"), ("facet_by_type", "Y")]),
		gateway.clone(),
		Arc::new(StubPermission(Some("10"))),
	);
	let request =
		SearchRequest { keyword: "fiber tariff".to_string(), ..SearchRequest::default() };

	let reply = service.search(&request, &user()).await;
	let counts = reply.data.expect("a result page").facet_counts.expect("facet counts");

	assert_eq!(gateway.queries()[1].facet_field.as_deref(), Some("type"));
	// An underscore in a type name is not a path separator.
	assert_eq!(counts.len(), 2);
	assert_eq!(counts[0].category_id, "faq_type");
	assert_eq!(counts[0].count, 5);
	assert_eq!(counts[1].category_id, "manual");
	assert_eq!(counts[1].count, 3);
}

#[tokio::test]
async fn absurd_pagination_is_rejected_before_any_call() {
	let gateway = StubGateway::new([]);
	let service =
		service(Settings::default(), gateway.clone(), Arc::new(StubPermission(Some("10"))));
	let request =
		SearchRequest { current_page: u64::MAX, page_size: 2, ..SearchRequest::default() };

	let reply = service.search(&request, &user()).await;
	assert!(!reply.status);
	assert!(reply.message.contains("out of range"));
	assert!(gateway.queries().is_empty());
}

#[tokio::test]
async fn explicit_document_ids_ignore_the_keyword() {
	let gateway = StubGateway::new([knowledge_page()]);
	let service =
		service(Settings::default(), gateway.clone(), Arc::new(StubPermission(Some("10"))));
	let request = SearchRequest {
		keyword: "fiber".to_string(),
		doc_ids: "d1,d2".to_string(),
		..SearchRequest::default()
	};

	let reply = service.search(&request, &user()).await;
	assert!(reply.status);

	let queries = gateway.queries();
	assert_eq!(queries.len(), 1);
	assert!(queries[0].q.starts_with("((docid:d1 OR docid:d2)"));
	assert!(!queries[0].q.contains("doctitles"));
}