//! Actor/movie dataset: parsing and projection onto graph elements.

mod error;
mod mapper;
mod parse;
mod records;
mod types;

pub use error::{FetchError, MapError, ParseError};
pub use mapper::map_to_graph_data;
pub use parse::{TableSchema, parse_actors, parse_movie_edges, parse_table};
pub use records::{ActorRecord, MovieEdgeRecord};
pub use types::{DanglingEdges, EdgeElement, GraphData, NodeElement};
