mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Gateway, Settings};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.gateway.api_url.trim().is_empty() {
		return Err(Error::Validation { message: "gateway.api_url must be non-empty.".to_string() });
	}
	if cfg.gateway.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "gateway.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.gateway.user_name.trim().is_empty() {
		return Err(Error::Validation {
			message: "gateway.user_name must be non-empty.".to_string(),
		});
	}
	if cfg.gateway.pass_word.trim().is_empty() {
		return Err(Error::Validation {
			message: "gateway.pass_word must be non-empty.".to_string(),
		});
	}

	Ok(())
}
