mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cms, Config, Email, EmailApi, Outreach, Pipeline, Postgres, Providers, Scraper, Service, Sheet,
	SiteBuilder, Smtp, Storage,
};

use std::{fs, path::Path};

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
	if cfg.service.admin_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.admin_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	if let Some(sheet) = cfg.sheet.as_ref() {
		if sheet.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "sheet.api_base must be non-empty.".to_string(),
			});
		}
		if sheet.tab.trim().is_empty() {
			return Err(Error::Validation { message: "sheet.tab must be non-empty.".to_string() });
		}
		if sheet.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "sheet.timeout_ms must be greater than zero.".to_string(),
			});
		}
	}

	if cfg.providers.scraper.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.scraper.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.providers.scraper.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.scraper.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.site_builder.template_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.site_builder.template_base must be non-empty.".to_string(),
		});
	}

	if let Some(cms) = cfg.providers.site_builder.cms.as_ref() {
		for (label, value) in [
			("providers.site_builder.cms.api_base", &cms.api_base),
			("providers.site_builder.cms.api_key", &cms.api_key),
			("providers.site_builder.cms.collection_id", &cms.collection_id),
			("providers.site_builder.cms.site_base", &cms.site_base),
		] {
			if value.trim().is_empty() {
				return Err(Error::Validation { message: format!("{label} must be non-empty.") });
			}
		}
	}

	if let Some(smtp) = cfg.providers.email.smtp.as_ref() {
		if smtp.port == 0 {
			return Err(Error::Validation {
				message: "providers.email.smtp.port must be greater than zero.".to_string(),
			});
		}

		for (label, value) in [
			("providers.email.smtp.user", &smtp.user),
			("providers.email.smtp.password", &smtp.password),
			("providers.email.smtp.from", &smtp.from),
		] {
			if value.trim().is_empty() {
				return Err(Error::Validation { message: format!("{label} must be non-empty.") });
			}
		}
	}

	if let Some(api) = cfg.providers.email.api.as_ref() {
		for (label, value) in [
			("providers.email.api.api_base", &api.api_base),
			("providers.email.api.api_key", &api.api_key),
			("providers.email.api.from", &api.from),
		] {
			if value.trim().is_empty() {
				return Err(Error::Validation { message: format!("{label} must be non-empty.") });
			}
		}
	}

	if cfg.outreach.checkout_url.trim().is_empty() {
		return Err(Error::Validation {
			message: "outreach.checkout_url must be non-empty.".to_string(),
		});
	}
	if cfg.outreach.from_name.trim().is_empty() {
		return Err(Error::Validation {
			message: "outreach.from_name must be non-empty.".to_string(),
		});
	}
	if cfg.pipeline.sweep_interval_secs == 0 {
		return Err(Error::Validation {
			message: "pipeline.sweep_interval_secs must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	// A [sheet] block without a spreadsheet id means "not wired up yet". The pipeline
	// reports that at sweep time rather than refusing to boot.
	if cfg.sheet.as_ref().map(|sheet| sheet.spreadsheet_id.trim().is_empty()).unwrap_or(false) {
		cfg.sheet = None;
	}
	if cfg
		.providers
		.scraper
		.api_key
		.as_deref()
		.map(|key| key.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.scraper.api_key = None;
	}
	if cfg
		.providers
		.email
		.smtp
		.as_ref()
		.map(|smtp| smtp.host.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.email.smtp = None;
	}
	if cfg
		.providers
		.email
		.api
		.as_ref()
		.map(|api| api.api_key.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.email.api = None;
	}
}
