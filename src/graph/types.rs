use std::collections::HashSet;

use serde::Serialize;

/// Renderer-facing projection of an actor.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeElement {
	/// Actor id, unique within one load.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Dataset tier, when known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub recognizability: Option<i64>,
	/// Movie count, when known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub movie_count: Option<i64>,
}

/// Renderer-facing projection of a shared movie.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeElement {
	/// `e<row>`, synthesized from the row position.
	pub id: String,
	/// Source actor id.
	pub source: String,
	/// Target actor id.
	pub target: String,
	/// Movie title.
	pub label: String,
	/// Movie identifier, when known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub movie_id: Option<String>,
	/// Release date, when known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub release_date: Option<String>,
}

/// Complete renderable snapshot of one load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	/// Actors, in input order.
	pub nodes: Vec<NodeElement>,
	/// Shared movies, in input order.
	pub edges: Vec<EdgeElement>,
}

/// Edges removed because an endpoint is not among the loaded nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DanglingEdges {
	/// Ids of the removed edges, in input order.
	pub edge_ids: Vec<String>,
}

impl DanglingEdges {
	/// Number of removed edges.
	pub fn count(&self) -> usize {
		self.edge_ids.len()
	}
}

impl GraphData {
	/// Splits off edges whose source or target is unknown. Kept edges retain
	/// their original ids.
	pub fn without_dangling_edges(self) -> (GraphData, DanglingEdges) {
		let known: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
		let mut dangling = DanglingEdges::default();
		let edges = self
			.edges
			.iter()
			.filter(|e| {
				let keep =
					known.contains(e.source.as_str()) && known.contains(e.target.as_str());
				if !keep {
					dangling.edge_ids.push(e.id.clone());
				}
				keep
			})
			.cloned()
			.collect();
		(
			GraphData {
				nodes: self.nodes,
				edges,
			},
			dangling,
		)
	}
}
