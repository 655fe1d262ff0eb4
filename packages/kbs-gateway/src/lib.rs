mod client;
mod envelope;
mod error;

pub use client::GatewayClient;
pub use envelope::{
	DEFAULT_FIELD, ENVELOPE_ROOT, Envelope, GatewayQuery, HEADER_CHECK, INTERFACE_FACET,
	INTERFACE_QUERY, UNIQUE_KEY, field,
};
pub use error::{Error, Result};
