use thiserror::Error;

/// A dataset resource could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
	/// The server answered with a non-OK status.
	#[error("{url} answered with status {status}")]
	Status {
		/// Requested location.
		url: String,
		/// HTTP status code.
		status: u16,
	},
	/// The request never produced a usable response.
	#[error("{url} could not be fetched: {reason}")]
	Network {
		/// Requested location.
		url: String,
		/// Browser-reported failure.
		reason: String,
	},
}

/// Tabular text did not match the declared schema.
#[derive(Debug, Error)]
pub enum ParseError {
	/// The header row lacks a required column (names are case-sensitive).
	#[error("missing required column `{column}`")]
	MissingColumn {
		/// Expected column name.
		column: String,
	},
	/// The text itself is not readable as delimited data.
	#[error("unreadable table: {0}")]
	Read(#[source] csv::Error),
	/// A field holds a value of the wrong type.
	#[error("line {line}: {source}")]
	Field {
		/// 1-based line of the offending row.
		line: u64,
		/// Underlying deserialization failure.
		#[source]
		source: csv::Error,
	},
}

/// Parsed records violate a graph-model invariant.
#[derive(Debug, Error)]
pub enum MapError {
	/// An actor row carries no id.
	#[error("actor row {row} has no id")]
	MissingNodeId {
		/// 0-based record index.
		row: usize,
	},
	/// Two actor rows share an id.
	#[error("duplicate actor id `{id}`")]
	DuplicateNodeId {
		/// The repeated id.
		id: String,
	},
	/// A movie row lacks its source or target actor.
	#[error("movie edge `{edge_id}` is missing an endpoint")]
	MissingEndpoint {
		/// Synthesized id of the offending edge.
		edge_id: String,
	},
}
