use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{scoring, sic};

/// A record as handed to export and classification: ordered column name to cell value.
pub type FlatRecord = Map<String, Value>;

const PROFILE_URL_BASE: &str = "https://find-and-update.company-information.service.gov.uk/company";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompanyStatus {
	Active,
	Dissolved,
	Other(String),
}
impl CompanyStatus {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Active => "active",
			Self::Dissolved => "dissolved",
			Self::Other(raw) => raw,
		}
	}

	pub fn is_active(&self) -> bool {
		matches!(self, Self::Active)
	}
}
impl Default for CompanyStatus {
	fn default() -> Self {
		Self::Other(String::new())
	}
}
impl From<&str> for CompanyStatus {
	fn from(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"active" => Self::Active,
			"dissolved" => Self::Dissolved,
			_ => Self::Other(raw.trim().to_string()),
		}
	}
}
impl From<String> for CompanyStatus {
	fn from(raw: String) -> Self {
		Self::from(raw.as_str())
	}
}
impl From<CompanyStatus> for String {
	fn from(status: CompanyStatus) -> Self {
		status.as_str().to_string()
	}
}

/// Reads an explicit `null` as the type's default, so upstream nulls behave like missing keys.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
	#[serde(deserialize_with = "null_as_default")]
	pub address_line_1: String,
	#[serde(deserialize_with = "null_as_default")]
	pub address_line_2: String,
	#[serde(deserialize_with = "null_as_default")]
	pub locality: String,
	#[serde(deserialize_with = "null_as_default")]
	pub region: String,
	#[serde(deserialize_with = "null_as_default")]
	pub postal_code: String,
	#[serde(deserialize_with = "null_as_default")]
	pub country: String,
}
impl Address {
	/// Non-empty parts joined with `", "`.
	pub fn full(&self) -> String {
		[
			&self.address_line_1,
			&self.address_line_2,
			&self.locality,
			&self.region,
			&self.postal_code,
			&self.country,
		]
		.into_iter()
		.filter(|part| !part.trim().is_empty())
		.map(String::as_str)
		.collect::<Vec<_>>()
		.join(", ")
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OfficerSummary {
	pub count: usize,
	pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControllerSummary {
	pub count: usize,
	pub names: Vec<String>,
	pub control_categories: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Enrichment {
	pub officers: OfficerSummary,
	pub controllers: ControllerSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChainLikelihood {
	Yes,
	No,
	Unknown,
}
impl ChainLikelihood {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Yes => "Yes",
			Self::No => "No",
			Self::Unknown => "Unknown",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShopType {
	Chain,
	Independent,
	BuyingGroup,
	Unknown,
	Error,
	NotConfigured,
}
impl ShopType {
	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
			"chain" => Self::Chain,
			"independent" => Self::Independent,
			"buying group" => Self::BuyingGroup,
			_ => Self::Unknown,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Chain => "Chain",
			Self::Independent => "Independent",
			Self::BuyingGroup => "Buying Group",
			Self::Unknown => "Unknown",
			Self::Error => "Error",
			Self::NotConfigured => "N/A (API not configured)",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
	pub shop_type: ShopType,
	pub channel: String,
	pub confidence: f32,
}
impl Classification {
	pub fn new(shop_type: ShopType, channel: impl Into<String>, confidence: f32) -> Self {
		let confidence = if confidence.is_finite() { confidence.clamp(0.0, 1.0) } else { 0.0 };

		Self { shop_type, channel: channel.into(), confidence }
	}

	/// Placeholder used when a response could not be read for a record.
	pub fn unknown() -> Self {
		Self::new(ShopType::Unknown, ShopType::Unknown.as_str(), 0.0)
	}

	/// Placeholder used when the classification call for a batch failed.
	pub fn error() -> Self {
		Self::new(ShopType::Error, ShopType::Error.as_str(), 0.0)
	}

	pub fn not_configured() -> Self {
		Self::new(ShopType::NotConfigured, ShopType::NotConfigured.as_str(), 0.0)
	}

	pub fn write_into(&self, row: &mut FlatRecord) {
		row.insert("shop_type".to_string(), Value::from(self.shop_type.as_str()));
		row.insert("channel".to_string(), Value::from(self.channel.clone()));
		row.insert("ai_confidence".to_string(), Value::from(f64::from(self.confidence)));
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyRecord {
	pub company_number: String,
	pub company_name: String,
	pub status: CompanyStatus,
	pub company_type: String,
	pub date_of_creation: String,
	pub date_of_cessation: Option<String>,
	pub address: Address,
	/// Labels of the strategies that produced this record, first-seen order, no repeats.
	pub sources: Vec<String>,
	pub enrichment: Option<Enrichment>,
	pub classification: Option<Classification>,
	sic_codes: Vec<String>,
	sic_descriptions: Vec<String>,
}
impl CompanyRecord {
	pub fn new(company_number: impl Into<String>, company_name: impl Into<String>) -> Self {
		Self {
			company_number: company_number.into().trim().to_string(),
			company_name: company_name.into(),
			..Default::default()
		}
	}

	pub fn with_status(mut self, status: impl Into<CompanyStatus>) -> Self {
		self.status = status.into();

		self
	}

	pub fn with_address(mut self, address: Address) -> Self {
		self.address = address;

		self
	}

	pub fn with_sic_codes<I, S>(mut self, codes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.set_sic_codes(codes);

		self
	}

	/// Replaces the classification codes; descriptions are looked up so both lists stay aligned.
	pub fn set_sic_codes<I, S>(&mut self, codes: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.sic_codes = codes.into_iter().map(Into::into).collect();
		self.sic_descriptions =
			self.sic_codes.iter().map(|code| sic::describe(code).to_string()).collect();
	}

	pub fn sic_codes(&self) -> &[String] {
		&self.sic_codes
	}

	pub fn sic_descriptions(&self) -> &[String] {
		&self.sic_descriptions
	}

	pub fn has_identifier(&self) -> bool {
		!self.company_number.is_empty()
	}

	pub fn profile_url(&self) -> String {
		if self.has_identifier() {
			format!("{PROFILE_URL_BASE}/{}", self.company_number)
		} else {
			String::new()
		}
	}

	pub fn add_source(&mut self, label: &str) {
		if !self.sources.iter().any(|existing| existing == label) {
			self.sources.push(label.to_string());
		}
	}

	pub fn source_label(&self) -> String {
		self.sources.join("; ")
	}

	pub fn chain_likelihood(&self) -> ChainLikelihood {
		match self.enrichment.as_ref() {
			Some(enrichment) => scoring::chain_likelihood(&enrichment.controllers.names.join("; ")),
			None => ChainLikelihood::Unknown,
		}
	}

	pub fn relevance_score(&self) -> u32 {
		scoring::relevance_score(&self.company_name)
	}

	pub fn to_row(&self) -> FlatRecord {
		let mut row = Map::new();
		let mut put = |key: &str, value: Value| {
			row.insert(key.to_string(), value);
		};

		put("company_number", Value::from(self.company_number.clone()));
		put("company_name", Value::from(self.company_name.clone()));
		put("company_status", Value::from(self.status.as_str()));
		put("company_type", Value::from(self.company_type.clone()));
		put("date_of_creation", Value::from(self.date_of_creation.clone()));
		put("date_of_cessation", Value::from(self.date_of_cessation.clone().unwrap_or_default()));
		put("sic_codes", Value::from(self.sic_codes.join(", ")));
		put("sic_descriptions", Value::from(self.sic_descriptions.join(", ")));
		put("address_line_1", Value::from(self.address.address_line_1.clone()));
		put("address_line_2", Value::from(self.address.address_line_2.clone()));
		put("locality", Value::from(self.address.locality.clone()));
		put("region", Value::from(self.address.region.clone()));
		put("postal_code", Value::from(self.address.postal_code.clone()));
		put("country", Value::from(self.address.country.clone()));
		put("full_address", Value::from(self.address.full()));
		put("companies_house_url", Value::from(self.profile_url()));
		put("search_source", Value::from(self.source_label()));
		put("relevance_score", Value::from(self.relevance_score()));

		if let Some(enrichment) = self.enrichment.as_ref() {
			put("directors_count", Value::from(enrichment.officers.count));
			put("directors_names", Value::from(enrichment.officers.names.join("; ")));
			put("psc_count", Value::from(enrichment.controllers.count));
			put("psc_names", Value::from(enrichment.controllers.names.join("; ")));
			put("psc_control", Value::from(enrichment.controllers.control_categories.join("; ")));
			put("likely_chain", Value::from(self.chain_likelihood().as_str()));
		}
		if let Some(classification) = self.classification.as_ref() {
			classification.write_into(&mut row);
		}

		row
	}
}
