//! Multi-strategy search: run every strategy, filter, tag, merge, and optionally enrich.

use serde::{Deserialize, Serialize};

use sicscout_config::Finder;
use sicscout_domain::{
	CompanyRecord, FlatRecord, Strategy, filters,
	strategy::{self, non_blank},
};

use crate::{Error, Result, SearchService};

/// A single ad hoc search, run as a one-strategy plan.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
	#[serde(default)]
	pub sic_codes: Vec<String>,
	#[serde(default)]
	pub include_keywords: Vec<String>,
	#[serde(default)]
	pub exclude_keywords: Vec<String>,
	#[serde(default = "default_true")]
	pub active_only: bool,
	#[serde(default = "default_true")]
	pub exclude_region: bool,
	#[serde(default)]
	pub enrich: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPlan {
	pub strategies: Vec<Strategy>,
	#[serde(default)]
	pub global_exclude_keywords: Vec<String>,
	#[serde(default = "default_true")]
	pub active_only: bool,
	#[serde(default = "default_true")]
	pub exclude_region: bool,
	#[serde(default)]
	pub enrich: bool,
}
impl SearchPlan {
	pub fn from_finder(finder: &Finder) -> Self {
		Self {
			strategies: finder.strategies.iter().map(Strategy::from).collect(),
			global_exclude_keywords: finder.global_exclude_keywords.clone(),
			active_only: finder.active_only,
			exclude_region: finder.exclude_region,
			enrich: finder.enrich,
		}
	}

	/// Rejects plans that would search for nothing. Runs before any registry call.
	pub fn validate(&self) -> Result<()> {
		if self.strategies.is_empty() {
			return Err(Error::InvalidRequest {
				message: "At least one search strategy is required.".to_string(),
			});
		}

		for strategy in &self.strategies {
			if strategy.is_empty() {
				let label =
					if strategy.label.trim().is_empty() { "unnamed" } else { strategy.label.as_str() };

				return Err(Error::InvalidRequest {
					message: format!(
						"Strategy '{label}' needs at least one SIC code or include keyword."
					),
				});
			}
		}

		Ok(())
	}

	/// Copy with every strategy normalized and blank global exclusions dropped.
	pub fn normalized(&self) -> Self {
		Self {
			strategies: self.strategies.iter().map(Strategy::normalized).collect(),
			global_exclude_keywords: non_blank(&self.global_exclude_keywords),
			active_only: self.active_only,
			exclude_region: self.exclude_region,
			enrich: self.enrich,
		}
	}
}
impl From<SearchRequest> for SearchPlan {
	fn from(req: SearchRequest) -> Self {
		let sic_codes = non_blank(&req.sic_codes);
		let include_keywords = non_blank(&req.include_keywords);
		let label = if sic_codes.is_empty() {
			format!("Keyword: {}", include_keywords.join(", "))
		} else {
			format!("SIC {}", sic_codes.join(", "))
		};

		Self {
			strategies: vec![Strategy {
				label,
				sic_codes,
				include_keywords,
				exclude_keywords: non_blank(&req.exclude_keywords),
				require_relevance_keyword: false,
			}],
			global_exclude_keywords: Vec::new(),
			active_only: req.active_only,
			exclude_region: req.exclude_region,
			enrich: req.enrich,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
	pub count: usize,
	pub companies: Vec<FlatRecord>,
}
impl From<&[CompanyRecord]> for SearchResponse {
	fn from(records: &[CompanyRecord]) -> Self {
		Self { count: records.len(), companies: records.iter().map(CompanyRecord::to_row).collect() }
	}
}

impl SearchService {
	/// Runs every strategy in order and merges the results by company number.
	///
	/// Strategies degrade to partial results on upstream failures, so the only error is an
	/// invalid plan.
	pub async fn search(&self, plan: &SearchPlan) -> Result<Vec<CompanyRecord>> {
		plan.validate()?;

		let plan = &plan.normalized();

		let mut all = Vec::new();

		for strategy in &plan.strategies {
			let found = self.run_strategy(strategy, plan).await;

			tracing::info!(strategy = %strategy.label, kept = found.len(), "Strategy finished.");

			all.extend(found);
		}

		let before = all.len();
		let mut merged = strategy::merge_sources(all);

		tracing::info!(before, unique = merged.len(), "Strategies merged.");

		if merged.is_empty() {
			tracing::warn!("Search produced no companies.");

			return Ok(merged);
		}
		if plan.enrich {
			self.enrich(&mut merged).await;
		}

		Ok(merged)
	}

	async fn run_strategy(&self, strategy: &Strategy, plan: &SearchPlan) -> Vec<CompanyRecord> {
		let mut records = if strategy.sic_codes.is_empty() {
			let mut found = Vec::new();

			for keyword in &strategy.include_keywords {
				found.extend(self.registry.search_by_name(keyword, plan.active_only).await);
				found = filters::dedup(found);
			}

			found
		} else {
			let found =
				self.registry.search_by_sic_codes(&strategy.sic_codes, plan.active_only).await;

			filters::include_keywords(found, &strategy.include_keywords)
		};

		if strategy.require_relevance_keyword {
			records = filters::require_relevance_keyword(records);
		}

		records = filters::exclude_keywords(records, &strategy.exclude_keywords);
		records = filters::exclude_keywords(records, &plan.global_exclude_keywords);

		if plan.exclude_region {
			records = filters::exclude_region(records);
		}

		for record in &mut records {
			record.add_source(&strategy.label);
		}

		records
	}
}

fn default_true() -> bool {
	true
}
