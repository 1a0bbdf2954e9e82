use std::time::Duration;

use httpmock::prelude::*;
use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value, json};

use sicscout_config::Registry;
use sicscout_providers::RegistryClient;

const SEARCH_PATH: &str = "/advanced-search/companies";

fn registry(api_base: String) -> Registry {
	Registry {
		api_base,
		api_key: "test-key".to_string(),
		items_per_page: 2,
		max_results: 10_000,
		timeout_ms: 2_000,
		rate_limit_delay_ms: 0,
		rate_limit_backoff_ms: 0,
		retry_delay_ms: 0,
		max_attempts: 3,
	}
}

fn client(server: &MockServer) -> RegistryClient {
	RegistryClient::new(&registry(server.base_url())).expect("Failed to build client.")
}

fn item(number: &str, name: &str, status: &str) -> Value {
	json!({
		"company_number": number,
		"company_name": name,
		"company_status": status,
		"company_type": "ltd",
		"date_of_creation": "2001-02-03",
		"sic_codes": ["45320"],
		"registered_office_address": { "address_line_1": "1 Mill Lane", "locality": "Leeds" }
	})
}

fn page(items: Vec<Value>, hits: u64) -> Value {
	json!({ "items": items, "hits": hits })
}

#[test]
fn builds_bearer_auth_header() {
	let headers = sicscout_providers::auth_headers("secret", &Map::new())
		.expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn rejects_non_string_default_headers() {
	let mut headers = Map::new();

	headers.insert("x-retries".to_string(), json!(3));

	assert!(sicscout_providers::auth_headers("secret", &headers).is_err());
}

#[tokio::test]
async fn paginates_until_hits_are_reached() {
	let server = MockServer::start_async().await;
	let first = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(SEARCH_PATH)
				.query_param("sic_codes", "22110")
				.query_param("start_index", "0")
				.query_param("size", "2");
			then.status(200).json_body(page(
				vec![item("00000001", "One Tyres", "active"), item("00000002", "Two Tyres", "active")],
				3,
			));
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(SEARCH_PATH)
				.query_param("sic_codes", "22110")
				.query_param("start_index", "2");
			then.status(200).json_body(page(vec![item("00000003", "Three Tyres", "active")], 3));
		})
		.await;
	let records = client(&server).search_by_sic_codes(&["22110".to_string()], false).await;

	first.assert_calls_async(1).await;
	second.assert_calls_async(1).await;
	assert_eq!(records.len(), 3);
	assert_eq!(records[2].company_number, "00000003");
	assert_eq!(records[0].address.full(), "1 Mill Lane, Leeds");
}

#[tokio::test]
async fn empty_page_ends_the_sequence() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).query_param("q", "tyre").query_param("start_index", "0");
			then.status(200).json_body(page(
				vec![item("00000001", "One Tyres", "active"), item("00000002", "Two Tyres", "active")],
				500,
			));
		})
		.await;

	let tail = server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).query_param("q", "tyre").query_param("start_index", "2");
			then.status(200).json_body(page(Vec::new(), 500));
		})
		.await;
	let records = client(&server).search_by_name("tyre", false).await;

	tail.assert_calls_async(1).await;
	assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn range_not_satisfiable_ends_cleanly() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).query_param("start_index", "0");
			then.status(200).json_body(page(
				vec![item("00000001", "One Tyres", "active"), item("00000002", "Two Tyres", "active")],
				50,
			));
		})
		.await;

	let out_of_range = server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).query_param("start_index", "2");
			then.status(416);
		})
		.await;
	let records = client(&server).search_by_name("tyre", false).await;

	out_of_range.assert_calls_async(1).await;
	assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn server_errors_exhaust_retries_and_keep_partial_results() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).query_param("start_index", "0");
			then.status(200).json_body(page(
				vec![item("00000001", "One Tyres", "active"), item("00000002", "Two Tyres", "active")],
				50,
			));
		})
		.await;

	let failing = server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).query_param("start_index", "2");
			then.status(500).body("upstream exploded");
		})
		.await;
	let records = client(&server).search_by_sic_codes(&["45320".to_string()], false).await;

	failing.assert_calls_async(3).await;
	assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn rate_limits_back_off_without_spending_attempts() {
	let server = MockServer::start_async().await;
	let limited = server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).query_param("q", "tyre");
			then.status(429);
		})
		.await;
	let client = RegistryClient::new(&Registry {
		max_attempts: 1,
		rate_limit_backoff_ms: 5,
		..registry(server.base_url())
	})
	.expect("Failed to build client.");
	let search = tokio::spawn(async move { client.search_by_name("tyre", false).await });

	while limited.calls_async().await < 3 {
		tokio::time::sleep(Duration::from_millis(5)).await;
	}

	// The older mock keeps matching until it is deleted, so there is no unmatched gap.
	server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).query_param("q", "tyre");
			then.status(200).json_body(page(vec![item("00000001", "One Tyres", "active")], 1));
		})
		.await;
	limited.delete_async().await;

	let records = search.await.expect("Search task panicked.");

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].company_number, "00000001");
}

#[tokio::test]
async fn result_cap_stops_paging() {
	let server = MockServer::start_async().await;
	let first = server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).query_param("start_index", "0");
			then.status(200).json_body(page(
				vec![item("00000001", "One Tyres", "active"), item("00000002", "Two Tyres", "active")],
				100,
			));
		})
		.await;
	let beyond = server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).query_param("start_index", "2");
			then.status(200).json_body(page(vec![item("00000003", "Three Tyres", "active")], 100));
		})
		.await;
	let client = RegistryClient::new(&Registry { max_results: 2, ..registry(server.base_url()) })
		.expect("Failed to build client.");
	let records = client.search_by_sic_codes(&["22110".to_string()], false).await;

	first.assert_calls_async(1).await;
	beyond.assert_calls_async(0).await;
	assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn null_fields_read_as_blank_without_dropping_the_page() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).query_param("sic_codes", "22110");
			then.status(200).json_body(json!({
				"hits": 2,
				"items": [
					item("00000001", "One Tyres", "active"),
					{
						"company_number": "00000002",
						"company_name": "Two Tyres",
						"company_status": "active",
						"company_type": null,
						"date_of_creation": null,
						"sic_codes": null,
						"registered_office_address": {
							"address_line_1": "2 Mill Lane",
							"address_line_2": null,
							"region": null,
							"locality": "Leeds"
						}
					}
				]
			}));
		})
		.await;

	let records = client(&server).search_by_sic_codes(&["22110".to_string()], false).await;

	assert_eq!(records.len(), 2);
	assert_eq!(records[1].company_type, "");
	assert!(records[1].sic_codes().is_empty());
	assert_eq!(records[1].address.full(), "2 Mill Lane, Leeds");
}

#[tokio::test]
async fn active_only_is_sent_and_enforced() {
	let server = MockServer::start_async().await;
	let search = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(SEARCH_PATH)
				.query_param("company_status", "active")
				.query_param("start_index", "0");
			then.status(200).json_body(page(
				vec![item("00000001", "Live Tyres", "active"), item("00000002", "Gone Tyres", "dissolved")],
				2,
			));
		})
		.await;
	let records = client(&server).search_by_name("tyres", true).await;

	search.assert_calls_async(1).await;
	assert_eq!(records.len(), 1);
	assert_eq!(records[0].company_name, "Live Tyres");
}

#[tokio::test]
async fn codes_are_merged_without_duplicates() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).query_param("sic_codes", "45310");
			then.status(200).json_body(page(
				vec![item("00000001", "Shared Tyres", "active"), item("00000002", "Wholesale Tyres", "active")],
				2,
			));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).query_param("sic_codes", "45320");
			then.status(200).json_body(page(
				vec![item("00000001", "Shared Tyres", "active"), item("00000003", "Retail Tyres", "active")],
				2,
			));
		})
		.await;

	let records = client(&server)
		.search_by_sic_codes(&["45310".to_string(), "45320".to_string()], false)
		.await;
	let numbers = records.iter().map(|record| record.company_number.as_str()).collect::<Vec<_>>();

	assert_eq!(numbers, vec!["00000001", "00000002", "00000003"]);
}

#[tokio::test]
async fn unreachable_registry_yields_empty_results() {
	let client = RegistryClient::new(&registry("http://127.0.0.1:1".to_string()))
		.expect("Failed to build client.");

	assert!(client.search_by_name("tyre", false).await.is_empty());
	assert!(client.officers("00000001").await.is_err());
}

#[tokio::test]
async fn officers_keep_current_directors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/company/00000001/officers");
			then.status(200).json_body(json!({
				"items": [
					{ "name": "SMITH, John", "officer_role": "director" },
					{ "name": "DOE, Jane", "officer_role": "director", "resigned_on": "2020-01-01" },
					{ "name": "ROE, Rick", "officer_role": "secretary" },
					{ "name": "LEE, Ann", "officer_role": "corporate-director" }
				]
			}));
		})
		.await;

	let officers = client(&server).officers("00000001").await.expect("Officers lookup failed.");

	assert_eq!(officers.count, 2);
	assert_eq!(officers.names, vec!["SMITH, John".to_string(), "LEE, Ann".to_string()]);
}

#[tokio::test]
async fn controllers_skip_ceased_and_bucket_natures() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/company/00000001/persons-with-significant-control");
			then.status(200).json_body(json!({
				"items": [
					{
						"name": "Acme Holdings Ltd",
						"natures_of_control": [
							"ownership-of-shares-75-to-100-percent",
							"voting-rights-75-to-100-percent",
							"right-to-appoint-and-remove-directors"
						]
					},
					{
						"name": "Former Owner",
						"ceased_on": "2019-05-05",
						"natures_of_control": ["significant-influence-or-control"]
					},
					{
						"name": "Mr Sam Jones",
						"natures_of_control": ["voting-rights-25-to-50-percent", "something-new"]
					}
				]
			}));
		})
		.await;

	let controllers =
		client(&server).controllers("00000001").await.expect("Controllers lookup failed.");

	assert_eq!(controllers.count, 2);
	assert_eq!(controllers.names, vec!["Acme Holdings Ltd".to_string(), "Mr Sam Jones".to_string()]);
	assert_eq!(
		controllers.control_categories,
		vec![
			"Ownership 75-100%".to_string(),
			"Voting rights".to_string(),
			"Appoints directors".to_string()
		]
	);
}

#[tokio::test]
async fn missing_company_lookups_are_empty() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/company/00000404/persons-with-significant-control");
			then.status(404);
		})
		.await;

	let controllers =
		client(&server).controllers("00000404").await.expect("404 should not be an error.");

	assert_eq!(controllers.count, 0);
	assert!(controllers.names.is_empty());
}
