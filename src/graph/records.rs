use serde::Deserialize;

use super::parse::TableSchema;

/// One row of `nodes_<tier>.csv`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ActorRecord {
	/// Unique actor id.
	pub id: Option<String>,
	/// Display name.
	pub name: Option<String>,
	/// Category tag; not used downstream.
	#[serde(rename = "type")]
	pub kind: Option<String>,
	/// Dataset tier the actor belongs to.
	#[serde(rename = "Recognizability")]
	pub recognizability: Option<i64>,
	/// Number of movies credited.
	pub movie_count: Option<i64>,
}

impl TableSchema for ActorRecord {
	const COLUMNS: &'static [&'static str] =
		&["id", "name", "type", "Recognizability", "movie_count"];
}

/// One row of `edges_<tier>.csv`: two actors sharing a movie.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MovieEdgeRecord {
	/// Actor id on one end.
	#[serde(rename = "Source")]
	pub source: Option<String>,
	/// Actor id on the other end.
	#[serde(rename = "Target")]
	pub target: Option<String>,
	/// Relation tag; not used downstream.
	#[serde(rename = "Type")]
	pub kind: Option<String>,
	/// Relation weight; not used for rendering.
	#[serde(rename = "Weight")]
	pub weight: Option<f64>,
	/// Movie identifier.
	pub movie_id: Option<String>,
	/// Movie title, shown as the edge label.
	pub movie_title: Option<String>,
	/// Release date as written in the dataset.
	pub release_date: Option<String>,
}

impl TableSchema for MovieEdgeRecord {
	const COLUMNS: &'static [&'static str] = &[
		"Source",
		"Target",
		"Type",
		"Weight",
		"movie_id",
		"movie_title",
		"release_date",
	];
}
