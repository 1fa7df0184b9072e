use std::collections::HashSet;

use super::error::MapError;
use super::records::{ActorRecord, MovieEdgeRecord};
use super::types::{EdgeElement, GraphData, NodeElement};

/// Projects parsed records onto the renderer's element model.
///
/// Order is preserved on both sides and edge `i` gets id `e{i}`. Whether
/// edge endpoints exist among the nodes is not checked here; see
/// [`GraphData::without_dangling_edges`].
pub fn map_to_graph_data(
	actors: &[ActorRecord],
	movies: &[MovieEdgeRecord],
) -> Result<GraphData, MapError> {
	let mut seen = HashSet::with_capacity(actors.len());
	let nodes = actors
		.iter()
		.enumerate()
		.map(|(row, actor)| {
			let id = actor.id.clone().ok_or(MapError::MissingNodeId { row })?;
			if !seen.insert(id.clone()) {
				return Err(MapError::DuplicateNodeId { id });
			}
			Ok(NodeElement {
				id,
				label: actor.name.clone().unwrap_or_default(),
				recognizability: actor.recognizability,
				movie_count: actor.movie_count,
			})
		})
		.collect::<Result<Vec<_>, _>>()?;

	let edges = movies
		.iter()
		.enumerate()
		.map(|(i, movie)| {
			let id = format!("e{i}");
			let (Some(source), Some(target)) = (movie.source.clone(), movie.target.clone())
			else {
				return Err(MapError::MissingEndpoint { edge_id: id });
			};
			Ok(EdgeElement {
				id,
				source,
				target,
				label: movie.movie_title.clone().unwrap_or_default(),
				movie_id: movie.movie_id.clone(),
				release_date: movie.release_date.clone(),
			})
		})
		.collect::<Result<Vec<_>, _>>()?;

	Ok(GraphData { nodes, edges })
}
