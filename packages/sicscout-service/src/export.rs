//! Tabular export of flat records to CSV and XLSX.
//!
//! Records may have different key sets. Columns default to the keys of the first record and a
//! missing key renders as an empty cell.

use std::collections::HashMap;

use rust_xlsxwriter::{Format, Workbook};
use serde::Deserialize;
use serde_json::Value;

use sicscout_domain::FlatRecord;

use crate::{Error, Result};

pub const SHEET_NAME: &str = "Companies";
pub const EMPTY_MESSAGE: &str = "No data to export";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const MAX_COLUMN_WIDTH: usize = 50;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportRequest {
	pub companies: Vec<FlatRecord>,
	#[serde(default)]
	pub columns: Option<Vec<String>>,
	/// Column key to display name.
	#[serde(default)]
	pub headers: Option<HashMap<String, String>>,
}
impl ExportRequest {
	pub fn new(companies: Vec<FlatRecord>) -> Self {
		Self { companies, ..Default::default() }
	}

	pub fn with_columns(mut self, columns: Vec<String>) -> Self {
		self.columns = Some(columns);

		self
	}

	pub fn columns(&self) -> Vec<String> {
		match self.columns.as_ref() {
			Some(columns) => columns.clone(),
			None => self
				.companies
				.first()
				.map(|row| row.keys().cloned().collect())
				.unwrap_or_default(),
		}
	}

	fn header_labels(&self, columns: &[String]) -> Vec<String> {
		columns
			.iter()
			.map(|column| {
				self.headers
					.as_ref()
					.and_then(|headers| headers.get(column))
					.cloned()
					.unwrap_or_else(|| column.clone())
			})
			.collect()
	}
}

/// CSV with a UTF-8 byte order mark so spreadsheet tools pick the right encoding.
pub fn export_csv(req: &ExportRequest) -> Result<Vec<u8>> {
	if req.companies.is_empty() {
		return Ok(EMPTY_MESSAGE.as_bytes().to_vec());
	}

	let columns = req.columns();
	let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());

	writer.write_record(req.header_labels(&columns))?;

	for row in &req.companies {
		writer.write_record(columns.iter().map(|column| cell_text(row.get(column))))?;
	}

	writer.into_inner().map_err(|err| Error::Export { message: err.to_string() })
}

/// Single-sheet workbook with a bold header row and widths sized to content.
pub fn export_xlsx(req: &ExportRequest) -> Result<Vec<u8>> {
	let mut workbook = Workbook::new();
	let header_format = Format::new().set_bold();
	let sheet = workbook.add_worksheet();

	sheet.set_name(SHEET_NAME)?;

	if req.companies.is_empty() {
		sheet.write_string_with_format(0, 0, "Message", &header_format)?;
		sheet.write_string(1, 0, EMPTY_MESSAGE)?;

		return Ok(workbook.save_to_buffer()?);
	}

	let columns = req.columns();

	for (col, (column, label)) in columns.iter().zip(req.header_labels(&columns)).enumerate() {
		let col = column_index(col)?;
		let mut width = label.chars().count();

		sheet.write_string_with_format(0, col, &label, &header_format)?;

		for (idx, row) in req.companies.iter().enumerate() {
			let line = row_index(idx + 1)?;
			let value = row.get(column);

			match value {
				Some(Value::Number(number)) => {
					sheet.write_number(line, col, number.as_f64().unwrap_or_default())?;
				},
				Some(Value::Bool(flag)) => {
					sheet.write_boolean(line, col, *flag)?;
				},
				_ => {
					sheet.write_string(line, col, cell_text(value))?;
				},
			}

			width = width.max(cell_text(value).chars().count());
		}

		sheet.set_column_width(col, (width + 2).min(MAX_COLUMN_WIDTH) as f64)?;
	}

	Ok(workbook.save_to_buffer()?)
}

fn cell_text(value: Option<&Value>) -> String {
	match value {
		None | Some(Value::Null) => String::new(),
		Some(Value::String(text)) => text.clone(),
		Some(other) => other.to_string(),
	}
}

fn column_index(idx: usize) -> Result<u16> {
	u16::try_from(idx)
		.map_err(|_| Error::Export { message: format!("Too many columns to export: {idx}.") })
}

fn row_index(idx: usize) -> Result<u32> {
	u32::try_from(idx)
		.map_err(|_| Error::Export { message: format!("Too many rows to export: {idx}.") })
}
