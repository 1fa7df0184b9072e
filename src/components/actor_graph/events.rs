//! Typed interaction stream published by a mounted graph.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::state::Tap;
use crate::graph::{EdgeElement, NodeElement};

/// Something the user did to the graph. Observers only; the graph itself
/// is never changed by these.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
	/// An actor was tapped.
	NodeTapped(NodeElement),
	/// A shared movie was tapped.
	EdgeTapped(EdgeElement),
}

impl From<Tap> for GraphEvent {
	fn from(tap: Tap) -> Self {
		match tap {
			Tap::Node(node) => GraphEvent::NodeTapped(node),
			Tap::Edge(edge) => GraphEvent::EdgeTapped(edge),
		}
	}
}

/// Fan-out point shared by the controller and its engine.
#[derive(Clone, Default)]
pub struct EventSink {
	subscribers: Rc<RefCell<Vec<UnboundedSender<GraphEvent>>>>,
}

impl EventSink {
	/// Opens a new stream receiving every later event.
	pub fn subscribe(&self) -> UnboundedReceiver<GraphEvent> {
		let (tx, rx) = mpsc::unbounded();
		self.subscribers.borrow_mut().push(tx);
		rx
	}

	/// Delivers to every open stream, forgetting dropped ones.
	pub fn emit(&self, event: GraphEvent) {
		self.subscribers
			.borrow_mut()
			.retain(|tx| tx.unbounded_send(event.clone()).is_ok());
	}

	/// Ends every stream.
	pub fn close(&self) {
		self.subscribers.borrow_mut().clear();
	}
}

#[cfg(test)]
mod tests {
	use futures::StreamExt;
	use futures::executor::block_on;

	use super::*;

	fn tapped(id: &str) -> GraphEvent {
		GraphEvent::NodeTapped(NodeElement {
			id: id.into(),
			..Default::default()
		})
	}

	#[test]
	fn every_subscriber_sees_each_event() {
		let sink = EventSink::default();
		let mut first = sink.subscribe();
		let mut second = sink.subscribe();
		sink.emit(tapped("a1"));
		assert_eq!(block_on(first.next()), Some(tapped("a1")));
		assert_eq!(block_on(second.next()), Some(tapped("a1")));
	}

	#[test]
	fn dropped_subscribers_are_pruned() {
		let sink = EventSink::default();
		drop(sink.subscribe());
		let mut live = sink.subscribe();
		sink.emit(tapped("a1"));
		assert_eq!(sink.subscribers.borrow().len(), 1);
		assert_eq!(block_on(live.next()), Some(tapped("a1")));
	}

	#[test]
	fn close_ends_streams() {
		let sink = EventSink::default();
		let mut rx = sink.subscribe();
		sink.close();
		assert_eq!(block_on(rx.next()), None);
	}

	#[test]
	fn taps_convert_to_events() {
		let edge = EdgeElement {
			id: "e0".into(),
			source: "a".into(),
			target: "b".into(),
			label: "Film".into(),
			movie_id: None,
			release_date: None,
		};
		assert_eq!(
			GraphEvent::from(Tap::Edge(edge.clone())),
			GraphEvent::EdgeTapped(edge)
		);
	}
}
