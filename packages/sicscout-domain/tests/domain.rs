use sicscout_domain::{
	Address, ChainLikelihood, CompanyRecord, ControllerSummary, Enrichment, filters, scoring,
	strategy,
};

fn tagged(number: &str, name: &str, label: &str) -> CompanyRecord {
	let mut record = CompanyRecord::new(number, name);

	record.add_source(label);

	record
}

#[test]
fn dedup_is_idempotent_and_never_grows() {
	let input = vec![
		CompanyRecord::new("3", "c"),
		CompanyRecord::new("1", "a"),
		CompanyRecord::new("3", "c again"),
		CompanyRecord::new("2", "b"),
		CompanyRecord::new("1", "a again"),
	];
	let once = filters::dedup(input.clone());
	let twice = filters::dedup(once.clone());

	assert!(once.len() <= input.len());
	assert_eq!(once, twice);
	assert_eq!(
		once.iter().map(|record| record.company_number.as_str()).collect::<Vec<_>>(),
		vec!["3", "1", "2"]
	);
}

#[test]
fn include_and_exclude_are_asymmetric() {
	let keyword = vec!["car".to_string()];
	let carlton = || CompanyRecord::new("1", "Carlton Tyres Ltd");

	assert_eq!(filters::include_keywords(vec![carlton()], &keyword).len(), 1);
	assert_eq!(filters::exclude_keywords(vec![carlton()], &keyword).len(), 1);
	assert!(
		filters::exclude_keywords(vec![CompanyRecord::new("2", "Car Tyres Ltd")], &keyword)
			.is_empty()
	);
	assert!(
		filters::include_keywords(vec![CompanyRecord::new("3", "Tyre Barn")], &keyword).is_empty()
	);
}

#[test]
fn region_filter_uses_prefix_or_address() {
	let records = vec![
		CompanyRecord::new("NI123456", "Prefixed").with_address(Address {
			locality: "Manchester".to_string(),
			..Default::default()
		}),
		CompanyRecord::new("00012345", "Addressed").with_address(Address {
			locality: "BELFAST".to_string(),
			..Default::default()
		}),
		CompanyRecord::new("00054321", "Kept").with_address(Address {
			locality: "Leeds".to_string(),
			..Default::default()
		}),
	];
	let kept = filters::exclude_region(records);

	assert_eq!(kept.len(), 1);
	assert_eq!(kept[0].company_name, "Kept");
}

#[test]
fn merged_record_lists_each_strategy_once() {
	let merged = strategy::merge_sources(vec![
		tagged("00012345", "Acme", "A"),
		tagged("00012345", "Acme", "B"),
		tagged("00012345", "Acme", "B"),
	]);

	assert_eq!(merged.len(), 1);

	let label = merged[0].source_label();

	assert_eq!(label.matches('A').count(), 1);
	assert_eq!(label.matches('B').count(), 1);
}

#[test]
fn chain_likelihood_reads_controller_names() {
	let mut record = CompanyRecord::new("00012345", "Acme Tyres");

	assert_eq!(record.chain_likelihood(), ChainLikelihood::Unknown);

	record.enrichment = Some(Enrichment::default());

	assert_eq!(record.chain_likelihood(), ChainLikelihood::Unknown);

	record.enrichment = Some(Enrichment {
		controllers: ControllerSummary {
			count: 2,
			names: vec!["John Smith".to_string(), "Jane Doe".to_string()],
			control_categories: Vec::new(),
		},
		..Default::default()
	});

	assert_eq!(record.chain_likelihood(), ChainLikelihood::No);
}

#[test]
fn relevance_score_counts_vertical_keywords() {
	assert_eq!(scoring::relevance_score("Acme Truck & Fleet Tyres"), 2);
	assert_eq!(scoring::relevance_score("Acme Tyres"), 0);
	assert_eq!(CompanyRecord::new("1", "HGV Coach & Trailer Tyres").relevance_score(), 3);
}
