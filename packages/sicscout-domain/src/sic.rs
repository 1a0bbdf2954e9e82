//! UK SIC 2007 condensed list, embedded as reference data.

use std::{collections::BTreeMap, sync::LazyLock};

use serde::Serialize;

pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

const SIC_CODES_TSV: &str = include_str!("../data/sic_codes.tsv");

static SIC_TABLE: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
	SIC_CODES_TSV
		.lines()
		.filter_map(|line| line.split_once('\t'))
		.map(|(code, description)| (code.trim(), description.trim()))
		.collect()
});

#[derive(Debug, Clone, Serialize)]
pub struct SicCode {
	pub code: &'static str,
	pub description: &'static str,
}

pub fn describe(code: &str) -> &'static str {
	SIC_TABLE.get(code.trim()).copied().unwrap_or(UNKNOWN_DESCRIPTION)
}

/// Every known code, sorted by code.
pub fn all() -> Vec<SicCode> {
	SIC_TABLE
		.iter()
		.map(|(code, description)| SicCode { code: *code, description: *description })
		.collect()
}
