use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use url::Url;

/// Status values written back to the source spreadsheet.
pub const STATUS_PROCESSING: &str = "Processing";
pub const STATUS_SITE_READY: &str = "Site Ready";
pub const STATUS_EMAIL_SENT: &str = "Email Sent";

const NEW_LEAD_MARKER: &str = "new lead";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SheetRow {
	/// 1-based spreadsheet row; the header occupies row 1, data starts at 2.
	pub row_index: i64,
	pub name: Option<String>,
	pub email: Option<String>,
	pub phone: Option<String>,
	pub profile_url: Option<String>,
	pub business_name: Option<String>,
	pub city: Option<String>,
	pub status: Option<String>,
}
impl SheetRow {
	/// A row is importable when its status cell is blank or literally "New Lead".
	pub fn is_new(&self) -> bool {
		match self.status.as_deref().map(str::trim) {
			None | Some("") => true,
			Some(status) => status.eq_ignore_ascii_case(NEW_LEAD_MARKER),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeaderColumns {
	pub name: Option<usize>,
	pub email: Option<usize>,
	pub phone: Option<usize>,
	pub website: Option<usize>,
	pub business: Option<usize>,
	pub city: Option<usize>,
	pub status: Option<usize>,
}

/// REST spreadsheet client. One instance per configured spreadsheet; the status
/// column position is resolved from the header row and cached across calls.
pub struct SheetClient {
	cfg: drip_config::Sheet,
	client: Client,
	status_column: Mutex<Option<usize>>,
}
impl SheetClient {
	pub fn new(cfg: drip_config::Sheet) -> Result<Self> {
		let client = crate::http_client(cfg.timeout_ms)?;

		Ok(Self { cfg, client, status_column: Mutex::new(None) })
	}

	pub async fn fetch_rows(&self) -> Result<Vec<SheetRow>> {
		let url = self.values_url(&self.cfg.tab)?;
		let json: Value = self
			.client
			.get(url)
			.query(&[("key", self.cfg.api_key.as_str())])
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;
		let values = parse_values(&json);
		let Some((header, data)) = values.split_first() else {
			return Ok(Vec::new());
		};
		let columns = map_headers(header);

		if let Some(status) = columns.status {
			*self.status_column.lock().await = Some(status);
		}

		Ok(data
			.iter()
			.enumerate()
			.map(|(offset, cells)| row_from_cells(offset as i64 + 2, &columns, cells))
			.collect())
	}

	/// Writes the status cell of one row, plus an optional website link in the
	/// cell immediately to its right.
	pub async fn write_status(
		&self,
		row_index: i64,
		status: &str,
		website_link: Option<&str>,
	) -> Result<()> {
		let column = self.resolve_status_column().await?;
		let range = format!("{}!{}{row_index}", self.cfg.tab, column_letter(column));
		let url = self.values_url(&range)?;
		let mut cells = vec![status.to_string()];

		if let Some(link) = website_link {
			cells.push(link.to_string());
		}

		let body = serde_json::json!({
			"range": range,
			"majorDimension": "ROWS",
			"values": [cells],
		});

		self.client
			.put(url)
			.query(&[("valueInputOption", "RAW"), ("key", self.cfg.api_key.as_str())])
			.json(&body)
			.send()
			.await?
			.error_for_status()?;

		Ok(())
	}

	async fn resolve_status_column(&self) -> Result<usize> {
		{
			let cached = self.status_column.lock().await;

			if let Some(column) = *cached {
				return Ok(column);
			}
		}

		let range = format!("{}!1:1", self.cfg.tab);
		let url = self.values_url(&range)?;
		let json: Value = self
			.client
			.get(url)
			.query(&[("key", self.cfg.api_key.as_str())])
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;
		let values = parse_values(&json);
		let header = values.first().map(Vec::as_slice).unwrap_or(&[]);
		let column = map_headers(header)
			.status
			.ok_or_else(|| eyre::eyre!("Sheet has no status column; cannot write back."))?;

		*self.status_column.lock().await = Some(column);

		Ok(column)
	}

	fn values_url(&self, range: &str) -> Result<Url> {
		let mut url = Url::parse(&self.cfg.api_base)?;

		url.path_segments_mut()
			.map_err(|_| eyre::eyre!("sheet.api_base cannot be a base URL."))?
			.pop_if_empty()
			.extend(["spreadsheets", self.cfg.spreadsheet_id.as_str(), "values", range]);

		Ok(url)
	}
}

fn parse_values(json: &Value) -> Vec<Vec<String>> {
	json.get("values")
		.and_then(Value::as_array)
		.map(|rows| {
			rows.iter()
				.map(|row| {
					row.as_array()
						.map(|cells| {
							cells
								.iter()
								.map(|cell| cell.as_str().unwrap_or_default().to_string())
								.collect()
						})
						.unwrap_or_default()
				})
				.collect()
		})
		.unwrap_or_default()
}

/// Case-insensitive header mapping with the column aliases the agency's sheets
/// have used over time.
pub fn map_headers(header: &[String]) -> HeaderColumns {
	let mut columns = HeaderColumns::default();

	for (index, cell) in header.iter().enumerate() {
		let label = cell.trim().to_lowercase();
		let slot = match label.as_str() {
			"name" | "full name" | "agent name" => &mut columns.name,
			"email" | "e-mail" | "email address" => &mut columns.email,
			"phone" | "phone number" | "mobile" => &mut columns.phone,
			"website" | "profile" | "url" | "link" | "profile url" | "website url" =>
				&mut columns.website,
			"brokerage" | "business" | "company" | "business name" => &mut columns.business,
			"city" | "location" | "market" => &mut columns.city,
			"status" | "lead status" => &mut columns.status,
			_ => continue,
		};

		if slot.is_none() {
			*slot = Some(index);
		}
	}

	columns
}

fn row_from_cells(row_index: i64, columns: &HeaderColumns, cells: &[String]) -> SheetRow {
	let cell = |slot: Option<usize>| {
		slot.and_then(|index| cells.get(index))
			.map(|value| value.trim())
			.filter(|value| !value.is_empty())
			.map(str::to_string)
	};

	SheetRow {
		row_index,
		name: cell(columns.name),
		email: cell(columns.email),
		phone: cell(columns.phone),
		profile_url: cell(columns.website),
		business_name: cell(columns.business),
		city: cell(columns.city),
		status: columns.status.and_then(|index| cells.get(index)).map(|cell| cell.to_string()),
	}
}

/// 0-based column index to spreadsheet letters (0 -> A, 25 -> Z, 26 -> AA).
pub fn column_letter(index: usize) -> String {
	let mut remaining = index;
	let mut letters = Vec::new();

	loop {
		letters.push(b'A' + (remaining % 26) as u8);

		if remaining < 26 {
			break;
		}

		remaining = remaining / 26 - 1;
	}

	letters.reverse();

	String::from_utf8(letters).unwrap_or_else(|_| "A".to_string())
}
