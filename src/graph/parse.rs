use csv::{ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;

use super::error::ParseError;
use super::records::{ActorRecord, MovieEdgeRecord};

/// A record type read from a headed CSV table.
///
/// Field types come from the `Deserialize` impl; `COLUMNS` lists the header
/// names that must be present, matched case-sensitively.
pub trait TableSchema: DeserializeOwned {
	/// Required header names.
	const COLUMNS: &'static [&'static str];
}

/// Parses headed CSV text into typed rows.
///
/// Blank rows are skipped and short rows leave trailing fields empty. A
/// missing column or a mistyped value fails the whole parse.
pub fn parse_table<T: TableSchema>(text: &str) -> Result<Vec<T>, ParseError> {
	let mut reader = ReaderBuilder::new()
		.flexible(true)
		.from_reader(text.as_bytes());
	let headers = reader.headers().map_err(ParseError::Read)?.clone();
	if let Some(column) = T::COLUMNS
		.iter()
		.find(|column| !headers.iter().any(|h| h == **column))
	{
		return Err(ParseError::MissingColumn {
			column: (*column).to_owned(),
		});
	}

	let mut rows = Vec::new();
	for record in reader.records() {
		let record = record.map_err(ParseError::Read)?;
		if is_blank(&record) {
			continue;
		}
		let line = record.position().map_or(0, |p| p.line());
		let row = record
			.deserialize(Some(&headers))
			.map_err(|source| ParseError::Field { line, source })?;
		rows.push(row);
	}
	Ok(rows)
}

fn is_blank(record: &StringRecord) -> bool {
	record.iter().all(|field| field.trim().is_empty())
}

/// Parses the actor table.
pub fn parse_actors(text: &str) -> Result<Vec<ActorRecord>, ParseError> {
	parse_table(text)
}

/// Parses the shared-movie table.
pub fn parse_movie_edges(text: &str) -> Result<Vec<MovieEdgeRecord>, ParseError> {
	parse_table(text)
}
