use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::company::CompanyRecord;

/// One named search executed as a unit: codes and/or keywords plus its own exclusions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategy {
	pub label: String,
	pub sic_codes: Vec<String>,
	pub include_keywords: Vec<String>,
	pub exclude_keywords: Vec<String>,
	pub require_relevance_keyword: bool,
}
impl Strategy {
	/// True when no non-blank SIC code or include keyword is present.
	pub fn is_empty(&self) -> bool {
		self.sic_codes.iter().chain(&self.include_keywords).all(|value| value.trim().is_empty())
	}

	/// Copy with trimmed label and blank codes or keywords dropped.
	pub fn normalized(&self) -> Self {
		Self {
			label: self.label.trim().to_string(),
			sic_codes: non_blank(&self.sic_codes),
			include_keywords: non_blank(&self.include_keywords),
			exclude_keywords: non_blank(&self.exclude_keywords),
			require_relevance_keyword: self.require_relevance_keyword,
		}
	}
}
impl From<&sicscout_config::FinderStrategy> for Strategy {
	fn from(cfg: &sicscout_config::FinderStrategy) -> Self {
		Self {
			label: cfg.label.clone(),
			sic_codes: cfg.sic_codes.clone(),
			include_keywords: cfg.include_keywords.clone(),
			exclude_keywords: cfg.exclude_keywords.clone(),
			require_relevance_keyword: cfg.require_relevance_keyword,
		}
	}
}

/// Collapses records that share a company number.
///
/// The first-seen record is kept as is; later duplicates only contribute their source labels.
/// Records without a number are never merged.
pub fn merge_sources(records: Vec<CompanyRecord>) -> Vec<CompanyRecord> {
	let mut merged: Vec<CompanyRecord> = Vec::with_capacity(records.len());
	let mut index: HashMap<String, usize> = HashMap::new();

	for record in records {
		if !record.has_identifier() {
			merged.push(record);

			continue;
		}
		if let Some(&position) = index.get(&record.company_number) {
			for label in &record.sources {
				merged[position].add_source(label);
			}

			continue;
		}

		index.insert(record.company_number.clone(), merged.len());
		merged.push(record);
	}

	merged
}

pub fn non_blank(values: &[String]) -> Vec<String> {
	values
		.iter()
		.map(|value| value.trim())
		.filter(|value| !value.is_empty())
		.map(str::to_string)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tagged(number: &str, name: &str, label: &str) -> CompanyRecord {
		let mut record = CompanyRecord::new(number, name);

		record.add_source(label);

		record
	}

	#[test]
	fn merges_labels_onto_first_seen_record() {
		let merged = merge_sources(vec![
			tagged("00012345", "First Name", "A"),
			tagged("00099999", "Other", "A"),
			tagged("00012345", "Second Name", "B"),
			tagged("00012345", "Third Name", "A"),
		]);

		assert_eq!(merged.len(), 2);
		assert_eq!(merged[0].company_name, "First Name");
		assert_eq!(merged[0].sources, vec!["A".to_string(), "B".to_string()]);
		assert_eq!(merged[0].source_label(), "A; B");
	}

	#[test]
	fn blank_entries_do_not_count_as_criteria() {
		let strategy = Strategy {
			label: " blank ".to_string(),
			sic_codes: vec!["  ".to_string()],
			include_keywords: vec![String::new()],
			..Default::default()
		};

		assert!(strategy.is_empty());

		let normalized = Strategy {
			sic_codes: vec![" 22110 ".to_string(), " ".to_string()],
			exclude_keywords: vec!["car ".to_string(), String::new()],
			..strategy
		}
		.normalized();

		assert!(!normalized.is_empty());
		assert_eq!(normalized.label, "blank");
		assert_eq!(normalized.sic_codes, vec!["22110".to_string()]);
		assert!(normalized.include_keywords.is_empty());
		assert_eq!(normalized.exclude_keywords, vec!["car".to_string()]);
	}

	#[test]
	fn blank_numbers_are_not_merged() {
		let merged = merge_sources(vec![tagged("", "x", "A"), tagged("", "y", "B")]);

		assert_eq!(merged.len(), 2);
	}
}
