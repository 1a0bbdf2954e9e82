//! Order-preserving record filters.
//!
//! Include keywords match as case-insensitive substrings of the company name, exclude keywords
//! only as whole words. "Carlton Tyres" survives an exclude on "car" but "Car Tyres" does not.

use std::collections::HashSet;

use regex::Regex;

use crate::{company::CompanyRecord, scoring};

/// Company number prefixes issued by the Northern Ireland registry.
pub const REGION_PREFIXES: [&str; 2] = ["NI", "R0"];

pub const REGION_INDICATORS: [&str; 10] = [
	"NORTHERN IRELAND",
	"BELFAST",
	"ANTRIM",
	"ARMAGH",
	"DERRY",
	"DOWN",
	"FERMANAGH",
	"TYRONE",
	"LISBURN",
	"NEWRY",
];

pub fn include_keywords(records: Vec<CompanyRecord>, keywords: &[String]) -> Vec<CompanyRecord> {
	let keywords = lowered(keywords);

	if keywords.is_empty() {
		return records;
	}

	records
		.into_iter()
		.filter(|record| {
			let name = record.company_name.to_lowercase();

			keywords.iter().any(|keyword| name.contains(keyword.as_str()))
		})
		.collect()
}

pub fn exclude_keywords(records: Vec<CompanyRecord>, keywords: &[String]) -> Vec<CompanyRecord> {
	let Some(pattern) = whole_word_pattern(keywords) else {
		return records;
	};

	records.into_iter().filter(|record| !pattern.is_match(&record.company_name)).collect()
}

/// Keeps records whose name mentions at least one relevance keyword.
pub fn require_relevance_keyword(records: Vec<CompanyRecord>) -> Vec<CompanyRecord> {
	records
		.into_iter()
		.filter(|record| scoring::mentions_relevance_keyword(&record.company_name))
		.collect()
}

pub fn is_excluded_region(record: &CompanyRecord) -> bool {
	let number = record.company_number.to_ascii_uppercase();

	if REGION_PREFIXES.iter().any(|prefix| number.starts_with(prefix)) {
		return true;
	}

	let address = &record.address;
	let haystack = format!(
		"{} {} {} {}",
		address.full(),
		address.locality,
		address.region,
		address.country
	)
	.to_uppercase();

	REGION_INDICATORS.iter().any(|indicator| haystack.contains(indicator))
}

pub fn exclude_region(records: Vec<CompanyRecord>) -> Vec<CompanyRecord> {
	records.into_iter().filter(|record| !is_excluded_region(record)).collect()
}

pub fn active_only(records: Vec<CompanyRecord>) -> Vec<CompanyRecord> {
	records.into_iter().filter(|record| record.status.is_active()).collect()
}

/// Keeps the first record per company number. Records without a number are all kept.
pub fn dedup(records: Vec<CompanyRecord>) -> Vec<CompanyRecord> {
	let mut seen = HashSet::new();

	records
		.into_iter()
		.filter(|record| !record.has_identifier() || seen.insert(record.company_number.clone()))
		.collect()
}

fn lowered(keywords: &[String]) -> Vec<String> {
	keywords
		.iter()
		.map(|keyword| keyword.trim().to_lowercase())
		.filter(|keyword| !keyword.is_empty())
		.collect()
}

fn whole_word_pattern(keywords: &[String]) -> Option<Regex> {
	let alternatives = keywords
		.iter()
		.map(|keyword| keyword.trim())
		.filter(|keyword| !keyword.is_empty())
		.map(regex::escape)
		.collect::<Vec<_>>();

	if alternatives.is_empty() {
		return None;
	}

	Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).ok()
}
