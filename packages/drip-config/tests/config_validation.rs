use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use drip_config::Error;

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

static FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_config(contents: &str) -> PathBuf {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("Failed to read system time.")
		.as_nanos();
	let counter = FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
	let path = env::temp_dir().join(format!("drip_config_{nanos}_{counter}.toml"));

	fs::write(&path, contents).expect("Failed to write temp config.");

	path
}

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.")
}

fn render(value: &Value) -> String {
	toml::to_string(value).expect("Failed to render template config.")
}

fn load(contents: &str) -> drip_config::Result<drip_config::Config> {
	let path = write_config(contents);
	let result = drip_config::load(&path);

	let _ = fs::remove_file(&path);

	result
}

#[test]
fn loads_sample_config() {
	let cfg = load(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Sample config should load.");

	assert_eq!(cfg.service.http_bind, "127.0.0.1:8080");
	assert!(cfg.sheet.is_some());
	assert!(cfg.providers.email.smtp.is_some());
	assert_eq!(cfg.pipeline.sweep_interval_secs, 900);
}

#[test]
fn rejects_empty_http_bind() {
	let mut value = sample_value();
	let service = value
		.as_table_mut()
		.and_then(|root| root.get_mut("service"))
		.and_then(Value::as_table_mut)
		.expect("Template config must include [service].");

	service.insert("http_bind".to_string(), Value::String(String::new()));

	let err = load(&render(&value)).expect_err("Empty http_bind must be rejected.");

	assert!(matches!(err, Error::Validation { .. }));
}

#[test]
fn blank_spreadsheet_id_normalizes_to_no_sheet() {
	let mut value = sample_value();
	let sheet = value
		.as_table_mut()
		.and_then(|root| root.get_mut("sheet"))
		.and_then(Value::as_table_mut)
		.expect("Template config must include [sheet].");

	sheet.insert("spreadsheet_id".to_string(), Value::String("  ".to_string()));

	let cfg = load(&render(&value)).expect("Config should still load.");

	assert!(cfg.sheet.is_none());
}

#[test]
fn blank_scraper_key_normalizes_to_none() {
	let mut value = sample_value();
	let scraper = value
		.as_table_mut()
		.and_then(|root| root.get_mut("providers"))
		.and_then(Value::as_table_mut)
		.and_then(|providers| providers.get_mut("scraper"))
		.and_then(Value::as_table_mut)
		.expect("Template config must include [providers.scraper].");

	scraper.insert("api_key".to_string(), Value::String(String::new()));

	let cfg = load(&render(&value)).expect("Config should still load.");

	assert!(cfg.providers.scraper.api_key.is_none());
}

#[test]
fn missing_email_sections_load_as_unconfigured() {
	let mut value = sample_value();
	let email = value
		.as_table_mut()
		.and_then(|root| root.get_mut("providers"))
		.and_then(Value::as_table_mut)
		.and_then(|providers| providers.get_mut("email"))
		.and_then(Value::as_table_mut)
		.expect("Template config must include [providers.email].");

	email.remove("smtp");
	email.remove("api");

	let cfg = load(&render(&value)).expect("Config should still load.");

	assert!(cfg.providers.email.smtp.is_none());
	assert!(cfg.providers.email.api.is_none());
}

#[test]
fn rejects_zero_sweep_interval() {
	let mut value = sample_value();
	let pipeline = value
		.as_table_mut()
		.and_then(|root| root.get_mut("pipeline"))
		.and_then(Value::as_table_mut)
		.expect("Template config must include [pipeline].");

	pipeline.insert("sweep_interval_secs".to_string(), Value::Integer(0));

	let err = load(&render(&value)).expect_err("Zero sweep interval must be rejected.");

	assert!(matches!(err, Error::Validation { .. }));
}
