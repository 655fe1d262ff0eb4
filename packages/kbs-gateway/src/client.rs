use std::time::Duration;

use reqwest::Client;

use crate::{
	envelope::{Envelope, GatewayQuery, HEADER_CHECK},
	error::Result,
};

/// HTTP client for the index gateway. All calls share one bounded timeout;
/// an empty response body is the gateway's "no data" signal, not an error.
#[derive(Debug, Clone)]
pub struct GatewayClient {
	http: Client,
	api_url: String,
	header_token: String,
}

impl GatewayClient {
	pub fn new(cfg: &kbs_config::Gateway) -> Result<Self> {
		let http = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self { http, api_url: cfg.api_url.clone(), header_token: cfg.header_token.clone() })
	}

	pub async fn execute(
		&self,
		query: &GatewayQuery,
		ep_id: &str,
		net_type: Option<&str>,
	) -> Result<Option<Envelope>> {
		let json = serde_json::to_string(query)?;
		let mut form = vec![("json", json), ("epId", ep_id.to_string())];

		if let Some(net_type) = net_type {
			form.push(("netType", net_type.to_string()));
		}

		let response = self
			.http
			.post(&self.api_url)
			.header(HEADER_CHECK, &self.header_token)
			.form(&form)
			.send()
			.await?;
		let body = response.error_for_status()?.text().await?;

		if body.is_empty() {
			return Ok(None);
		}

		Ok(Some(Envelope::parse(&body)?))
	}
}
