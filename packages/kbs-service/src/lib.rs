pub mod decode;
pub mod request;
pub mod search;

mod filter;
mod keyword;
mod permission;
mod popularity;

use std::{future::Future, pin::Pin, sync::Arc};

pub use decode::{FaqRecord, SearchRecord};
use kbs_config::Config;
use kbs_gateway::{Envelope, GatewayClient, GatewayQuery};
pub use permission::ResolvedPermission;
pub use request::{SearchRequest, SortMode, UserContext};
pub use search::{PageRecords, PageResult, SearchReply};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The index gateway seam. The production implementation is
/// [`GatewayClient`]; tests substitute an in-process double.
pub trait SearchGateway
where
	Self: Send + Sync,
{
	fn execute<'a>(
		&'a self,
		query: &'a GatewayQuery,
		ep_id: &'a str,
		net_type: Option<&'a str>,
	) -> BoxFuture<'a, kbs_gateway::Result<Option<Envelope>>>;
}

/// Looks up the category ids a user may search, keyed by enterprise, user,
/// a category hint, and a folder label. Returns the comma-separated id list,
/// or `None` when the user has no recorded permissions.
pub trait PermissionProvider
where
	Self: Send + Sync,
{
	fn category_ids<'a>(
		&'a self,
		lookup: &'a PermissionLookup,
	) -> BoxFuture<'a, color_eyre::Result<Option<String>>>;
}

/// Resolves the knowledge-base category bound to a scene.
pub trait SceneBinding
where
	Self: Send + Sync,
{
	fn scene_category_id<'a>(
		&'a self,
		scene_id: &'a str,
		formal: bool,
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

#[derive(Debug, Clone)]
pub struct PermissionLookup {
	pub ep_id: String,
	pub user_id: String,
	pub category_hint: String,
	pub folder_label: String,
}

#[derive(Clone)]
pub struct Collaborators {
	pub permission: Arc<dyn PermissionProvider>,
	pub scene: Arc<dyn SceneBinding>,
}

pub struct SearchService {
	pub cfg: Config,
	pub gateway: Arc<dyn SearchGateway>,
	pub collaborators: Collaborators,
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	Gateway { message: String },
}

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Gateway { message } => write!(f, "Gateway error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<kbs_gateway::Error> for ServiceError {
	fn from(err: kbs_gateway::Error) -> Self {
		Self::Gateway { message: err.to_string() }
	}
}

impl SearchGateway for GatewayClient {
	fn execute<'a>(
		&'a self,
		query: &'a GatewayQuery,
		ep_id: &'a str,
		net_type: Option<&'a str>,
	) -> BoxFuture<'a, kbs_gateway::Result<Option<Envelope>>> {
		Box::pin(self.execute(query, ep_id, net_type))
	}
}

pub(crate) fn request_time() -> String {
	let format =
		time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

	time::OffsetDateTime::now_utc().format(&format).unwrap_or_default()
}

impl SearchService {
	pub fn new(cfg: Config, gateway: Arc<dyn SearchGateway>, collaborators: Collaborators) -> Self {
		Self { cfg, gateway, collaborators }
	}

	/// Builds a service backed by the production HTTP gateway client.
	pub fn with_http_gateway(cfg: Config, collaborators: Collaborators) -> ServiceResult<Self> {
		let client = GatewayClient::new(&cfg.gateway)?;

		Ok(Self::new(cfg, Arc::new(client), collaborators))
	}
}
