use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use sicscout_config::ClassifierConfig;
use sicscout_domain::{Classification, FlatRecord, ShopType};

use crate::{Error, Result};

const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Asks the model for one classification per row, in row order.
///
/// A reply that cannot be read as a JSON array yields `Unknown` for every row; transport and
/// HTTP failures are returned as errors so the caller can mark the whole batch.
pub async fn classify(
	cfg: &ClassifierConfig,
	rows: &[FlatRecord],
	channel_rules: Option<&str>,
) -> Result<Vec<Classification>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": [{ "role": "user", "content": build_prompt(rows, channel_rules) }],
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let content = message_content(&json).ok_or_else(|| Error::InvalidResponse {
		message: "Classifier response is missing message content.".to_string(),
	})?;

	Ok(parse_classifications(content, rows.len()))
}

pub fn build_prompt(rows: &[FlatRecord], channel_rules: Option<&str>) -> String {
	let mut companies = String::new();

	for (idx, row) in rows.iter().enumerate() {
		companies.push_str(&format!("\n### Company {}\n{}\n", idx + 1, describe_row(row)));
	}

	let channels = match channel_rules.map(str::trim).filter(|rules| !rules.is_empty()) {
		Some(rules) => format!(
			"## Channels\nAssign each company to the best matching channel below. Use \"Other\" \
			 when none fits.\n{rules}\n"
		),
		None => "## Channels\nNo channel rules were supplied. Name the channel from the \
		         company's main activity, e.g. \"Tyre Specialist\", \"Auto Parts Retailer\", \
		         \"Garage/Workshop\", \"Fast Fit Centre\", \"Vehicle Dealer\", \"General \
		         Retail\" or \"Other\".\n"
			.to_string(),
	};

	format!(
		"Classify each of the following UK companies.\n\n## Shop type\nPick exactly one of:\n- \
		 \"Chain\": part of a larger retail or franchise network, PLC owners, well-known brands.\n- \
		 \"Independent\": a single site or small family business.\n- \"Buying Group\": a member \
		 of a purchasing consortium.\n\n{channels}\n## Companies\n{companies}\n## Output\nReply \
		 with a JSON array of exactly {count} objects in the same order as the companies, each \
		 with \"shop_type\", \"channel\" and \"confidence\" (0.0 to 1.0). Reply with the array \
		 only.",
		count = rows.len()
	)
}

/// Reads a model reply into classifications. Fenced code blocks are unwrapped first.
pub fn parse_classifications(text: &str, expected: usize) -> Vec<Classification> {
	let parsed = serde_json::from_str::<Value>(&strip_code_fence(text));
	let Ok(Value::Array(items)) = parsed else {
		tracing::error!(
			reply = %text.chars().take(500).collect::<String>(),
			"Classifier reply is not a JSON array."
		);

		return vec![Classification::unknown(); expected];
	};

	items
		.iter()
		.map(|item| {
			let shop_type = item
				.get("shop_type")
				.and_then(Value::as_str)
				.map(ShopType::parse)
				.unwrap_or(ShopType::Unknown);
			let channel = item.get("channel").and_then(Value::as_str).unwrap_or("Unknown");
			let confidence =
				item.get("confidence").and_then(Value::as_f64).unwrap_or(DEFAULT_CONFIDENCE);

			Classification::new(shop_type, channel, confidence as f32)
		})
		.collect()
}

fn message_content(json: &Value) -> Option<&str> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
}

fn strip_code_fence(text: &str) -> String {
	let trimmed = text.trim();

	if !trimmed.starts_with("```") {
		return trimmed.to_string();
	}

	trimmed
		.lines()
		.skip(1)
		.take_while(|line| !line.trim_start().starts_with("```"))
		.collect::<Vec<_>>()
		.join("\n")
}

fn describe_row(row: &FlatRecord) -> String {
	let mut lines = vec![
		format!("Name: {}", cell(row, "company_name")),
		format!("Number: {}", cell(row, "company_number")),
		format!("Type: {}", cell(row, "company_type")),
		format!("Status: {}", cell(row, "company_status")),
		format!("SIC codes: {}", cell(row, "sic_codes")),
		format!("SIC descriptions: {}", cell(row, "sic_descriptions")),
		format!("Address: {}", cell(row, "full_address")),
		format!("Incorporated: {}", cell(row, "date_of_creation")),
	];

	if has_count(row, "directors_count") {
		lines.push(format!("Directors: {}", cell(row, "directors_names")));
	}
	if has_count(row, "psc_count") {
		lines.push(format!("Owners: {}", cell(row, "psc_names")));
	}

	lines.join("\n")
}

fn cell(row: &FlatRecord, key: &str) -> String {
	match row.get(key) {
		Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
		Some(Value::Null) | Some(Value::String(_)) | None => "Unknown".to_string(),
		Some(other) => other.to_string(),
	}
}

fn has_count(row: &FlatRecord, key: &str) -> bool {
	match row.get(key) {
		Some(Value::Number(count)) => count.as_u64().unwrap_or(0) > 0,
		Some(Value::String(count)) => count.trim().parse::<u64>().map(|n| n > 0).unwrap_or(false),
		_ => false,
	}
}
