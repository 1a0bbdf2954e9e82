mod error;
mod types;

pub use error::{Error, Result};
pub use types::{ClassifierConfig, Config, Finder, FinderStrategy, Registry, Service};

use std::{env, fs, path::Path};

pub const API_KEY_ENV: &str = "COMPANIES_HOUSE_API_KEY";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.registry.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "registry.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.registry.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: format!("registry.api_key must be non-empty (or set {API_KEY_ENV})."),
		});
	}
	if cfg.registry.items_per_page == 0 {
		return Err(Error::Validation {
			message: "registry.items_per_page must be greater than zero.".to_string(),
		});
	}
	if cfg.registry.items_per_page > cfg.registry.max_results {
		return Err(Error::Validation {
			message: "registry.items_per_page must not exceed registry.max_results.".to_string(),
		});
	}
	if cfg.registry.max_attempts == 0 {
		return Err(Error::Validation {
			message: "registry.max_attempts must be greater than zero.".to_string(),
		});
	}
	if cfg.registry.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "registry.timeout_ms must be greater than zero.".to_string(),
		});
	}

	if let Some(classifier) = cfg.classifier.as_ref() {
		if classifier.batch_size == 0 {
			return Err(Error::Validation {
				message: "classifier.batch_size must be greater than zero.".to_string(),
			});
		}
		if !classifier.temperature.is_finite() {
			return Err(Error::Validation {
				message: "classifier.temperature must be a finite number.".to_string(),
			});
		}
		if !(0.0..=2.0).contains(&classifier.temperature) {
			return Err(Error::Validation {
				message: "classifier.temperature must be in the range 0.0-2.0.".to_string(),
			});
		}
		if classifier.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: "classifier.api_key must be non-empty.".to_string(),
			});
		}
	}
	if let Some(finder) = cfg.finder.as_ref() {
		if finder.output.trim().is_empty() {
			return Err(Error::Validation {
				message: "finder.output must be non-empty.".to_string(),
			});
		}
		if finder.strategies.is_empty() {
			return Err(Error::Validation {
				message: "finder.strategies must be non-empty.".to_string(),
			});
		}

		for strategy in &finder.strategies {
			if strategy.label.trim().is_empty() {
				return Err(Error::Validation {
					message: "finder.strategies.label must be non-empty.".to_string(),
				});
			}
			if strategy.sic_codes.is_empty() && strategy.include_keywords.is_empty() {
				return Err(Error::Validation {
					message: format!(
						"Strategy '{}' needs sic_codes or include_keywords.",
						strategy.label
					),
				});
			}
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.registry.api_key.trim().is_empty()
		&& let Ok(key) = env::var(API_KEY_ENV)
	{
		cfg.registry.api_key = key.trim().to_string();
	}

	cfg.registry.api_base = cfg.registry.api_base.trim_end_matches('/').to_string();

	if cfg.service.static_dir.as_deref().map(|dir| dir.trim().is_empty()).unwrap_or(false) {
		cfg.service.static_dir = None;
	}
	if let Some(finder) = cfg.finder.as_mut() {
		if finder.channel_rules.as_deref().map(|rules| rules.trim().is_empty()).unwrap_or(false) {
			finder.channel_rules = None;
		}

		for strategy in &mut finder.strategies {
			strategy.sic_codes.retain(|code| !code.trim().is_empty());
			strategy.include_keywords.retain(|kw| !kw.trim().is_empty());
			strategy.exclude_keywords.retain(|kw| !kw.trim().is_empty());
		}
	}
}
