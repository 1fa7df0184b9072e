pub mod actor_graph;
