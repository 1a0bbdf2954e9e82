use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub registry: Registry,
	pub classifier: Option<ClassifierConfig>,
	pub finder: Option<Finder>,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	#[serde(default = "default_cors_origins")]
	pub cors_origins: Vec<String>,
	/// Optional. Directory of a prebuilt frontend, served at `/`.
	pub static_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Registry {
	pub api_base: String,
	pub api_key: String,
	pub items_per_page: u32,
	/// Hard cap on items fetched by one paginated search; the registry refuses deeper windows.
	pub max_results: u32,
	pub timeout_ms: u64,
	pub rate_limit_delay_ms: u64,
	pub rate_limit_backoff_ms: u64,
	pub retry_delay_ms: u64,
	pub max_attempts: u32,
}
impl Default for Registry {
	fn default() -> Self {
		Self {
			api_base: "https://api.company-information.service.gov.uk".to_string(),
			api_key: String::new(),
			items_per_page: 500,
			max_results: 10_000,
			timeout_ms: 30_000,
			rate_limit_delay_ms: 200,
			rate_limit_backoff_ms: 60_000,
			retry_delay_ms: 5_000,
			max_attempts: 3,
		}
	}
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	#[serde(default = "default_max_tokens")]
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default = "default_batch_size")]
	pub batch_size: usize,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Finder {
	pub output: String,
	#[serde(default = "default_true")]
	pub active_only: bool,
	#[serde(default = "default_true")]
	pub exclude_region: bool,
	#[serde(default = "default_true")]
	pub enrich: bool,
	#[serde(default)]
	pub classify: bool,
	pub channel_rules: Option<String>,
	#[serde(default)]
	pub global_exclude_keywords: Vec<String>,
	pub strategies: Vec<FinderStrategy>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FinderStrategy {
	pub label: String,
	#[serde(default)]
	pub sic_codes: Vec<String>,
	#[serde(default)]
	pub include_keywords: Vec<String>,
	#[serde(default)]
	pub exclude_keywords: Vec<String>,
	#[serde(default)]
	pub require_relevance_keyword: bool,
}

fn default_cors_origins() -> Vec<String> {
	["http://localhost:3000", "http://127.0.0.1:3000", "http://localhost:8080"]
		.into_iter()
		.map(str::to_string)
		.collect()
}

fn default_max_tokens() -> u32 {
	4_096
}

fn default_batch_size() -> usize {
	10
}

fn default_true() -> bool {
	true
}
