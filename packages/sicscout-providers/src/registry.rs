//! Rate-limited client for the company registry's advanced search and per-company lookups.
//!
//! Searches degrade instead of failing: a sequence that runs out of retries keeps whatever pages
//! it already fetched. Calls are issued one at a time with a fixed pause between pages.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tokio::time::sleep;

use sicscout_config::Registry;
use sicscout_domain::{
	Address, CompanyRecord, ControllerSummary, OfficerSummary, company::null_as_default, filters,
};

use crate::{Error, Result};

const SEARCH_PATH: &str = "/advanced-search/companies";
const LOOKUP_PAGE_SIZE: u32 = 100;
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
	Success,
	EndOfData,
	RateLimited,
	Retry,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchPage {
	#[serde(deserialize_with = "null_as_default")]
	items: Vec<SearchItem>,
	#[serde(deserialize_with = "null_as_default")]
	hits: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchItem {
	#[serde(deserialize_with = "null_as_default")]
	company_number: String,
	#[serde(deserialize_with = "null_as_default")]
	company_name: String,
	#[serde(deserialize_with = "null_as_default")]
	company_status: String,
	#[serde(deserialize_with = "null_as_default")]
	company_type: String,
	#[serde(deserialize_with = "null_as_default")]
	date_of_creation: String,
	date_of_cessation: Option<String>,
	#[serde(deserialize_with = "null_as_default")]
	sic_codes: Vec<String>,
	#[serde(deserialize_with = "null_as_default")]
	registered_office_address: Address,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OfficerList {
	#[serde(deserialize_with = "null_as_default")]
	items: Vec<OfficerItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OfficerItem {
	#[serde(deserialize_with = "null_as_default")]
	name: String,
	#[serde(deserialize_with = "null_as_default")]
	officer_role: String,
	resigned_on: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ControllerList {
	#[serde(deserialize_with = "null_as_default")]
	items: Vec<ControllerItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ControllerItem {
	#[serde(deserialize_with = "null_as_default")]
	name: String,
	ceased_on: Option<String>,
	#[serde(deserialize_with = "null_as_default")]
	ceased: bool,
	#[serde(deserialize_with = "null_as_default")]
	natures_of_control: Vec<String>,
}

pub struct RegistryClient {
	http: Client,
	cfg: Registry,
}
impl RegistryClient {
	pub fn new(cfg: &Registry) -> Result<Self> {
		let http = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self { http, cfg: cfg.clone() })
	}

	/// Runs one paginated search per code and returns the union, first occurrence winning.
	pub async fn search_by_sic_codes(
		&self,
		codes: &[String],
		active_only: bool,
	) -> Vec<CompanyRecord> {
		let mut all = Vec::new();

		for code in codes {
			let found = self.paginate("sic_codes", code, active_only).await;
			let fetched = found.len();

			all.extend(found);
			all = filters::dedup(all);

			tracing::info!(
				sic_code = %code,
				fetched,
				total_unique = all.len(),
				"SIC code searched."
			);
		}

		all
	}

	pub async fn search_by_name(&self, term: &str, active_only: bool) -> Vec<CompanyRecord> {
		let found = self.paginate("q", term, active_only).await;

		tracing::info!(term, fetched = found.len(), "Name search finished.");

		found
	}

	/// Current directors of a company. Resigned officers and non-director roles are skipped.
	pub async fn officers(&self, company_number: &str) -> Result<OfficerSummary> {
		let path = format!("/company/{}/officers", company_number.trim());
		let Some(json) = self.get_json(&path, &self.lookup_query()).await? else {
			return Ok(OfficerSummary::default());
		};
		let list: OfficerList = serde_json::from_value(json)?;
		let names = list
			.items
			.into_iter()
			.filter(|officer| officer.resigned_on.is_none())
			.filter(|officer| officer.officer_role.to_lowercase().contains("director"))
			.map(|officer| officer.name.trim().to_string())
			.collect::<Vec<_>>();

		Ok(OfficerSummary { count: names.len(), names })
	}

	/// Current persons with significant control, with their control natures bucketed.
	pub async fn controllers(&self, company_number: &str) -> Result<ControllerSummary> {
		let path = format!("/company/{}/persons-with-significant-control", company_number.trim());
		let Some(json) = self.get_json(&path, &self.lookup_query()).await? else {
			return Ok(ControllerSummary::default());
		};
		let list: ControllerList = serde_json::from_value(json)?;
		let mut summary = ControllerSummary::default();

		for item in list.items.into_iter().filter(|item| item.ceased_on.is_none() && !item.ceased)
		{
			for category in item.natures_of_control.iter().filter_map(|raw| control_category(raw))
			{
				if !summary.control_categories.iter().any(|existing| existing == category) {
					summary.control_categories.push(category.to_string());
				}
			}

			summary.names.push(item.name.trim().to_string());
		}

		summary.count = summary.names.len();

		Ok(summary)
	}

	/// Sleeps for the configured inter-request delay.
	pub async fn pause(&self) {
		sleep(Duration::from_millis(self.cfg.rate_limit_delay_ms)).await;
	}

	fn lookup_query(&self) -> Vec<(&'static str, String)> {
		vec![("items_per_page", LOOKUP_PAGE_SIZE.to_string())]
	}

	async fn paginate(
		&self,
		param: &'static str,
		value: &str,
		active_only: bool,
	) -> Vec<CompanyRecord> {
		let mut records = Vec::new();
		let mut start_index: u64 = 0;
		let max_results = u64::from(self.cfg.max_results);

		loop {
			let mut query = vec![
				(param, value.to_string()),
				("size", self.cfg.items_per_page.to_string()),
				("start_index", start_index.to_string()),
			];

			if active_only {
				query.push(("company_status", "active".to_string()));
			}

			let json = match self.get_json(SEARCH_PATH, &query).await {
				Ok(Some(json)) => json,
				Ok(None) => break,
				Err(err) => {
					tracing::error!(
						error = %err,
						param,
						value,
						kept = records.len(),
						"Search aborted. Keeping partial results."
					);

					break;
				},
			};
			let page: SearchPage = match serde_json::from_value(json) {
				Ok(page) => page,
				Err(err) => {
					tracing::error!(error = %err, param, value, "Search page is malformed.");

					break;
				},
			};

			if page.items.is_empty() {
				break;
			}

			start_index += page.items.len() as u64;

			records.extend(page.items.into_iter().map(normalize));

			tracing::debug!(
				param,
				value,
				fetched = start_index,
				hits = page.hits,
				"Search page fetched."
			);

			if start_index >= page.hits || start_index >= max_results {
				break;
			}

			self.pause().await;
		}

		if active_only { filters::active_only(records) } else { records }
	}

	/// GET with retry. `Ok(None)` means the registry has nothing (more) for this request.
	async fn get_json(
		&self,
		path: &str,
		query: &[(&'static str, String)],
	) -> Result<Option<Value>> {
		let url = format!("{}{}", self.cfg.api_base, path);
		let retry_delay = Duration::from_millis(self.cfg.retry_delay_ms);
		let mut attempt = 0;

		loop {
			let sent = self
				.http
				.get(&url)
				.basic_auth(&self.cfg.api_key, Option::<&str>::None)
				.header("Accept", "application/json")
				.query(query)
				.send()
				.await;
			let response = match sent {
				Ok(response) => response,
				Err(err) => {
					attempt += 1;

					if attempt >= self.cfg.max_attempts {
						return Err(err.into());
					}

					tracing::warn!(error = %err, attempt, path, "Registry request failed. Retrying.");
					sleep(retry_delay).await;

					continue;
				},
			};
			let status = response.status();

			match disposition(status) {
				Disposition::Success => {
					let body = response.text().await?;

					return Ok(Some(serde_json::from_str(&body)?));
				},
				Disposition::EndOfData => {
					tracing::debug!(%status, path, "Registry has no more data.");

					return Ok(None);
				},
				Disposition::RateLimited => {
					tracing::warn!(
						backoff_ms = self.cfg.rate_limit_backoff_ms,
						path,
						"Rate limited by registry. Backing off."
					);
					sleep(Duration::from_millis(self.cfg.rate_limit_backoff_ms)).await;
				},
				Disposition::Retry => {
					let body = response.text().await.unwrap_or_default();
					let body = body.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>();

					attempt += 1;

					if attempt >= self.cfg.max_attempts {
						return Err(Error::Status { status: status.as_u16(), body });
					}

					tracing::error!(%status, attempt, path, body = %body, "Registry error. Retrying.");
					sleep(retry_delay).await;
				},
			}
		}
	}
}

fn disposition(status: StatusCode) -> Disposition {
	match status {
		StatusCode::OK => Disposition::Success,
		StatusCode::NOT_FOUND | StatusCode::RANGE_NOT_SATISFIABLE => Disposition::EndOfData,
		StatusCode::TOO_MANY_REQUESTS => Disposition::RateLimited,
		_ => Disposition::Retry,
	}
}

fn normalize(item: SearchItem) -> CompanyRecord {
	let mut record = CompanyRecord::new(item.company_number, item.company_name)
		.with_status(item.company_status)
		.with_sic_codes(item.sic_codes)
		.with_address(item.registered_office_address);

	record.company_type = item.company_type;
	record.date_of_creation = item.date_of_creation;
	record.date_of_cessation = item.date_of_cessation.filter(|date| !date.trim().is_empty());

	record
}

fn control_category(nature: &str) -> Option<&'static str> {
	let nature = nature.trim().to_ascii_lowercase();

	if nature.starts_with("ownership-of-shares-75-to-100-percent") {
		Some("Ownership 75-100%")
	} else if nature.starts_with("ownership-of-shares-50-to-75-percent") {
		Some("Ownership 50-75%")
	} else if nature.starts_with("ownership-of-shares-25-to-50-percent") {
		Some("Ownership 25-50%")
	} else if nature.starts_with("voting-rights-") {
		Some("Voting rights")
	} else if nature.starts_with("right-to-appoint-and-remove-") {
		Some("Appoints directors")
	} else if nature.starts_with("significant-influence-or-control") {
		Some("Significant influence")
	} else {
		None
	}
}
