mod component;
pub mod controller;
mod engine;
mod events;
mod host;
pub mod layout;
mod render;
mod state;

pub use component::ActorGraph;
pub use events::{EventSink, GraphEvent};
pub use host::{BrowserHost, GraphHost};
