use std::cmp::Reverse;

use sicscout_domain::{ChainLikelihood, CompanyRecord, FlatRecord};

pub const PREFERRED_COLUMNS: [&str; 18] = [
	"company_name",
	"company_number",
	"company_status",
	"likely_chain",
	"search_source",
	"sic_codes",
	"sic_descriptions",
	"full_address",
	"locality",
	"region",
	"postal_code",
	"date_of_creation",
	"directors_count",
	"directors_names",
	"psc_count",
	"psc_names",
	"psc_control",
	"companies_house_url",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainSummary {
	pub yes: usize,
	pub no: usize,
	pub unknown: usize,
}
impl ChainSummary {
	pub fn tally(records: &[CompanyRecord]) -> Self {
		records.iter().fold(Self::default(), |mut summary, record| {
			match record.chain_likelihood() {
				ChainLikelihood::Yes => summary.yes += 1,
				ChainLikelihood::No => summary.no += 1,
				ChainLikelihood::Unknown => summary.unknown += 1,
			}

			summary
		})
	}
}

/// Highest relevance first. Ties keep their merge order.
pub fn rank(records: &mut [CompanyRecord]) {
	records.sort_by_key(|record| Reverse(record.relevance_score()));
}

/// Preferred columns present in the first row, then the rest of its keys in their own order.
pub fn ordered_columns(rows: &[FlatRecord]) -> Vec<String> {
	let Some(first) = rows.first() else {
		return Vec::new();
	};
	let mut columns = PREFERRED_COLUMNS
		.iter()
		.filter(|column| first.contains_key(**column))
		.map(|column| column.to_string())
		.collect::<Vec<_>>();

	for key in first.keys() {
		if !PREFERRED_COLUMNS.contains(&key.as_str()) {
			columns.push(key.clone());
		}
	}

	columns
}
