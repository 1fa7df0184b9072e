//! Load lifecycle of one mounted graph: settle, fetch, parse, map, render,
//! and teardown.
//!
//! The controller is independent of the browser. It reaches the outside
//! world through [`GraphHost`] and creates its renderer through
//! [`EngineFactory`], so the whole state machine runs under a plain executor.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::channel::mpsc::UnboundedReceiver;
use futures::future::try_join;
use log::{debug, error, info, warn};
use thiserror::Error;

use super::events::{EventSink, GraphEvent};
use super::host::GraphHost;
use super::layout::{LayoutConfig, graph_config};
use crate::config::DataPaths;
use crate::graph::{
	FetchError, GraphData, MapError, ParseError, map_to_graph_data, parse_actors,
	parse_movie_edges,
};

/// Pause before touching the canvas, so it is attached when the engine
/// starts.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// The only failure text users ever see.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load graph data";

/// The render engine could not start.
#[derive(Debug, Error)]
pub enum RenderInitError {
	/// No attached container to draw into.
	#[error("no attached canvas to render into")]
	MissingContainer,
	/// The drawing context could not be obtained.
	#[error("2d context unavailable: {0}")]
	Context(String),
}

/// Why a load did not reach `Ready`. Internal diagnostics only.
#[derive(Debug, Error)]
pub enum GraphError {
	/// A dataset resource did not load.
	#[error(transparent)]
	Fetch(#[from] FetchError),
	/// A dataset resource did not match its schema.
	#[error("{table} table: {source}")]
	Parse {
		/// Which resource.
		table: &'static str,
		/// What went wrong.
		#[source]
		source: ParseError,
	},
	/// The parsed records violate a graph invariant.
	#[error(transparent)]
	Map(#[from] MapError),
	/// The renderer could not start.
	#[error(transparent)]
	RenderInit(#[from] RenderInitError),
	/// The owning view went away mid-load.
	#[error("load cancelled by teardown")]
	Cancelled,
}

/// Where one mount is in its lifecycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
	/// Mounted, load not started yet.
	#[default]
	Idle,
	/// Data or renderer still on its way.
	Loading,
	/// Graph is on screen.
	Ready,
	/// Load gave up; holds the user-facing message.
	Failed(String),
}

impl LoadState {
	/// Whether a load is in flight.
	pub fn is_loading(&self) -> bool {
		matches!(self, LoadState::Loading)
	}

	/// User-facing error, if the load failed.
	pub fn error(&self) -> Option<&str> {
		match self {
			LoadState::Failed(message) => Some(message),
			_ => None,
		}
	}
}

/// Cancellation handle checked at every suspension point of a load.
#[derive(Clone, Debug, Default)]
pub struct LoadScope {
	cancelled: Rc<Cell<bool>>,
}

impl LoadScope {
	/// Marks the scope dead. Irreversible.
	pub fn cancel(&self) {
		self.cancelled.set(true);
	}

	/// Whether [`LoadScope::cancel`] has been called.
	pub fn is_cancelled(&self) -> bool {
		self.cancelled.get()
	}

	fn ensure_live(&self) -> Result<(), GraphError> {
		if self.is_cancelled() {
			Err(GraphError::Cancelled)
		} else {
			Ok(())
		}
	}
}

/// A live renderer owning a drawing surface.
pub trait RenderEngine {
	/// Releases the surface and every listener. Must be idempotent.
	fn destroy(&mut self);
}

/// Builds the renderer once data is ready.
pub trait EngineFactory {
	/// Renderer type produced.
	type Engine: RenderEngine;

	/// Starts rendering `data`. Taps are published through `events`.
	fn create(
		&self,
		data: GraphData,
		config: LayoutConfig,
		events: EventSink,
	) -> Result<Self::Engine, RenderInitError>;
}

/// Shared slot holding the engine of one mount.
pub type EngineSlot<E> = Rc<RefCell<Option<E>>>;

/// Drives one mount from `Idle` to `Ready` or `Failed` and tears it down.
pub struct GraphController<H, F: EngineFactory> {
	host: H,
	factory: F,
	paths: DataPaths,
	settle_delay: Duration,
	scope: LoadScope,
	engine: EngineSlot<F::Engine>,
	events: EventSink,
}

impl<H: GraphHost, F: EngineFactory> GraphController<H, F> {
	/// A controller for the dataset at `paths`.
	pub fn new(host: H, factory: F, paths: DataPaths) -> Self {
		Self {
			host,
			factory,
			paths,
			settle_delay: SETTLE_DELAY,
			scope: LoadScope::default(),
			engine: Rc::new(RefCell::new(None)),
			events: EventSink::default(),
		}
	}

	/// Overrides [`SETTLE_DELAY`].
	pub fn with_settle_delay(mut self, delay: Duration) -> Self {
		self.settle_delay = delay;
		self
	}

	/// The engine slot; empty until `Ready` and again after teardown.
	pub fn engine(&self) -> EngineSlot<F::Engine> {
		self.engine.clone()
	}

	/// Stream of taps. Ends on teardown.
	pub fn subscribe(&self) -> UnboundedReceiver<GraphEvent> {
		self.events.subscribe()
	}

	/// Runs the load, reporting each transition through `on_state`.
	///
	/// Nothing is reported once [`GraphController::teardown`] has been called,
	/// whatever the load was doing at the time.
	pub async fn run(&self, mut on_state: impl FnMut(LoadState)) {
		if self.scope.is_cancelled() {
			return;
		}
		on_state(LoadState::Loading);

		match self.load().await {
			Ok(engine) => {
				*self.engine.borrow_mut() = Some(engine);
				info!("graph ready");
				on_state(LoadState::Ready);
			}
			Err(GraphError::Cancelled) => debug!("graph load abandoned after teardown"),
			Err(e) => {
				error!("failed to initialize graph: {e}");
				if !self.scope.is_cancelled() {
					on_state(LoadState::Failed(LOAD_FAILED_MESSAGE.to_owned()));
				}
			}
		}
	}

	async fn load(&self) -> Result<F::Engine, GraphError> {
		self.host.settle(self.settle_delay).await;
		self.scope.ensure_live()?;

		info!(
			"loading graph data from {} and {}",
			self.paths.nodes, self.paths.edges
		);
		let (nodes_text, edges_text) = try_join(
			self.host.fetch_text(&self.paths.nodes),
			self.host.fetch_text(&self.paths.edges),
		)
		.await?;
		self.scope.ensure_live()?;

		let actors = parse_actors(&nodes_text).map_err(|source| GraphError::Parse {
			table: "nodes",
			source,
		})?;
		let movies = parse_movie_edges(&edges_text).map_err(|source| GraphError::Parse {
			table: "edges",
			source,
		})?;
		let (data, dangling) = map_to_graph_data(&actors, &movies)?.without_dangling_edges();
		if dangling.count() > 0 {
			warn!(
				"dropped {} edges with unknown endpoints (first: {:?})",
				dangling.count(),
				dangling.edge_ids.iter().take(5).collect::<Vec<_>>()
			);
		}
		info!(
			"graph data loaded: {} nodes, {} edges",
			data.nodes.len(),
			data.edges.len()
		);

		self.scope.ensure_live()?;
		let engine = self
			.factory
			.create(data, graph_config(), self.events.clone())?;
		info!("render engine initialized");
		Ok(engine)
	}

	/// Stops any in-flight load from reporting, ends event streams and
	/// destroys the engine if one exists. Safe to call at any point, and more
	/// than once.
	pub fn teardown(&self) {
		self.scope.cancel();
		self.events.close();
		let engine = self.engine.borrow_mut().take();
		if let Some(mut engine) = engine {
			engine.destroy();
			info!("render engine destroyed");
		}
	}
}

#[cfg(test)]
mod tests {
	use futures::StreamExt;
	use futures::channel::oneshot;
	use futures::executor::{LocalPool, block_on};
	use futures::task::LocalSpawnExt;

	use super::*;
	use crate::graph::NodeElement;

	const NODES: &str = "id,name,type,Recognizability,movie_count\n\
		a1,\"Jane Doe\",Person,10,5\n\
		a2,\"John Roe\",Person,10,3\n";
	const EDGES: &str = "Source,Target,Type,Weight,movie_id,movie_title,release_date\n\
		a1,a2,ACTED_IN,1,m1,\"Film X\",2001-01-01\n\
		a1,a9,ACTED_IN,1,m2,\"Film Y\",2002-01-01\n";

	#[derive(Default)]
	struct FakeHost {
		nodes: Option<&'static str>,
		edges: Option<&'static str>,
		gate: RefCell<Option<oneshot::Receiver<()>>>,
		fetch_gate: RefCell<Option<oneshot::Receiver<()>>>,
		fetched: Cell<usize>,
	}

	impl FakeHost {
		fn serving(nodes: &'static str, edges: &'static str) -> Self {
			Self {
				nodes: Some(nodes),
				edges: Some(edges),
				..Default::default()
			}
		}

		fn gated(self) -> (Self, oneshot::Sender<()>) {
			let (tx, rx) = oneshot::channel();
			*self.gate.borrow_mut() = Some(rx);
			(self, tx)
		}

		/// Holds the first fetch open until the sender fires.
		fn gated_fetch(self) -> (Self, oneshot::Sender<()>) {
			let (tx, rx) = oneshot::channel();
			*self.fetch_gate.borrow_mut() = Some(rx);
			(self, tx)
		}
	}

	impl GraphHost for FakeHost {
		async fn settle(&self, _delay: Duration) {
			let gate = self.gate.borrow_mut().take();
			if let Some(gate) = gate {
				let _ = gate.await;
			}
		}

		async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
			self.fetched.set(self.fetched.get() + 1);
			let gate = self.fetch_gate.borrow_mut().take();
			if let Some(gate) = gate {
				let _ = gate.await;
			}
			let body = if url.contains("nodes_") { self.nodes } else { self.edges };
			body.map(str::to_owned).ok_or_else(|| FetchError::Status {
				url: url.to_owned(),
				status: 404,
			})
		}
	}

	#[derive(Default, Clone)]
	struct Tally {
		created: Rc<Cell<usize>>,
		destroyed: Rc<Cell<usize>>,
		data: Rc<RefCell<Option<GraphData>>>,
		sink: Rc<RefCell<Option<EventSink>>>,
	}

	struct FakeEngine {
		destroyed: Rc<Cell<usize>>,
		done: bool,
	}

	impl RenderEngine for FakeEngine {
		fn destroy(&mut self) {
			if !self.done {
				self.done = true;
				self.destroyed.set(self.destroyed.get() + 1);
			}
		}
	}

	struct FakeFactory {
		tally: Tally,
		fail: bool,
	}

	impl EngineFactory for FakeFactory {
		type Engine = FakeEngine;

		fn create(
			&self,
			data: GraphData,
			_config: LayoutConfig,
			events: EventSink,
		) -> Result<FakeEngine, RenderInitError> {
			if self.fail {
				return Err(RenderInitError::MissingContainer);
			}
			self.tally.created.set(self.tally.created.get() + 1);
			*self.tally.data.borrow_mut() = Some(data);
			*self.tally.sink.borrow_mut() = Some(events);
			Ok(FakeEngine {
				destroyed: self.tally.destroyed.clone(),
				done: false,
			})
		}
	}

	fn controller(host: FakeHost, fail: bool) -> (Rc<GraphController<FakeHost, FakeFactory>>, Tally) {
		let tally = Tally::default();
		let factory = FakeFactory {
			tally: tally.clone(),
			fail,
		};
		let controller = GraphController::new(host, factory, DataPaths::for_tier(10))
			.with_settle_delay(Duration::ZERO);
		(Rc::new(controller), tally)
	}

	fn run_to_end(controller: &GraphController<FakeHost, FakeFactory>) -> Vec<LoadState> {
		let mut states = Vec::new();
		block_on(controller.run(|state| states.push(state)));
		states
	}

	fn assert_failed(states: &[LoadState]) {
		assert_eq!(states.len(), 2, "{states:?}");
		assert_eq!(states[0], LoadState::Loading);
		let last = &states[1];
		assert!(!last.is_loading());
		let message = last.error().expect("failed state");
		assert_eq!(message, LOAD_FAILED_MESSAGE);
		assert!(!message.contains("404") && !message.contains(".csv"));
	}

	#[test]
	fn loads_to_ready() {
		let (controller, tally) = controller(FakeHost::serving(NODES, EDGES), false);
		let states = run_to_end(&controller);
		assert_eq!(states, [LoadState::Loading, LoadState::Ready]);
		assert!(controller.engine().borrow().is_some());
		assert_eq!(tally.created.get(), 1);

		let data = tally.data.borrow_mut().take().unwrap();
		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.nodes[0].label, "Jane Doe");
		// a9 is unknown, so e1 is pruned; e0 keeps its id.
		let edge_ids: Vec<_> = data.edges.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(edge_ids, ["e0"]);
	}

	#[test]
	fn fetches_both_resources() {
		let (controller, _) = controller(FakeHost::serving(NODES, EDGES), false);
		run_to_end(&controller);
		assert_eq!(controller.host.fetched.get(), 2);
	}

	#[test]
	fn nodes_fetch_failure_fails() {
		let host = FakeHost {
			edges: Some(EDGES),
			..Default::default()
		};
		let (controller, tally) = controller(host, false);
		assert_failed(&run_to_end(&controller));
		assert_eq!(tally.created.get(), 0);
		assert!(controller.engine().borrow().is_none());
	}

	#[test]
	fn edges_fetch_failure_fails() {
		let host = FakeHost {
			nodes: Some(NODES),
			..Default::default()
		};
		let (controller, tally) = controller(host, false);
		assert_failed(&run_to_end(&controller));
		assert_eq!(controller.host.fetched.get(), 2);
		assert_eq!(tally.created.get(), 0);
	}

	#[test]
	fn both_fetches_failing_fails() {
		let (controller, _) = controller(FakeHost::default(), false);
		assert_failed(&run_to_end(&controller));
	}

	#[test]
	fn parse_failure_fails() {
		let (controller, _) = controller(FakeHost::serving("id,name\na1,Jane\n", EDGES), false);
		assert_failed(&run_to_end(&controller));
	}

	#[test]
	fn duplicate_node_ids_fail() {
		let nodes = "id,name,type,Recognizability,movie_count\na1,A,P,10,1\na1,B,P,10,2\n";
		let (controller, _) = controller(FakeHost::serving(nodes, EDGES), false);
		assert_failed(&run_to_end(&controller));
	}

	#[test]
	fn render_init_failure_fails() {
		let (controller, _) = controller(FakeHost::serving(NODES, EDGES), true);
		assert_failed(&run_to_end(&controller));
	}

	#[test]
	fn teardown_mid_load_reports_nothing_more() {
		let (host, release) = FakeHost::serving(NODES, EDGES).gated();
		let (controller, tally) = controller(host, false);
		let states = Rc::new(RefCell::new(Vec::new()));

		let mut pool = LocalPool::new();
		let (task_controller, task_states) = (controller.clone(), states.clone());
		pool.spawner()
			.spawn_local(async move {
				task_controller
					.run(move |state| task_states.borrow_mut().push(state))
					.await;
			})
			.unwrap();

		pool.run_until_stalled();
		assert_eq!(*states.borrow(), [LoadState::Loading]);

		controller.teardown();
		let _ = release.send(());
		pool.run();

		assert_eq!(*states.borrow(), [LoadState::Loading]);
		assert_eq!(controller.host.fetched.get(), 0);
		assert_eq!(tally.created.get(), 0);
		assert!(controller.engine().borrow().is_none());
	}

	#[test]
	fn teardown_during_fetch_reports_nothing_more() {
		let (host, release) = FakeHost::serving(NODES, EDGES).gated_fetch();
		let (controller, tally) = controller(host, false);
		let states = Rc::new(RefCell::new(Vec::new()));

		let mut pool = LocalPool::new();
		let (task_controller, task_states) = (controller.clone(), states.clone());
		pool.spawner()
			.spawn_local(async move {
				task_controller
					.run(move |state| task_states.borrow_mut().push(state))
					.await;
			})
			.unwrap();

		pool.run_until_stalled();
		assert_eq!(*states.borrow(), [LoadState::Loading]);
		assert_eq!(controller.host.fetched.get(), 2);

		controller.teardown();
		let _ = release.send(());
		pool.run();

		assert_eq!(*states.borrow(), [LoadState::Loading]);
		assert_eq!(tally.created.get(), 0);
		assert!(controller.engine().borrow().is_none());
	}

	#[test]
	fn teardown_before_start_reports_nothing() {
		let (controller, tally) = controller(FakeHost::serving(NODES, EDGES), false);
		controller.teardown();
		assert!(run_to_end(&controller).is_empty());
		assert_eq!(tally.created.get(), 0);
	}

	#[test]
	fn teardown_destroys_engine_once() {
		let (controller, tally) = controller(FakeHost::serving(NODES, EDGES), false);
		run_to_end(&controller);
		controller.teardown();
		controller.teardown();
		assert_eq!(tally.destroyed.get(), 1);
		assert!(controller.engine().borrow().is_none());
	}

	#[test]
	fn taps_reach_subscribers_until_teardown() {
		let (controller, tally) = controller(FakeHost::serving(NODES, EDGES), false);
		let mut events = controller.subscribe();
		run_to_end(&controller);

		let node = NodeElement {
			id: "a1".into(),
			label: "Jane Doe".into(),
			..Default::default()
		};
		let sink = tally.sink.borrow().clone().unwrap();
		sink.emit(GraphEvent::NodeTapped(node.clone()));
		assert_eq!(block_on(events.next()), Some(GraphEvent::NodeTapped(node)));

		controller.teardown();
		assert_eq!(block_on(events.next()), None);
	}

	#[test]
	fn load_state_flags() {
		assert_eq!(LoadState::default(), LoadState::Idle);
		assert!(LoadState::Loading.is_loading());
		assert!(!LoadState::Ready.is_loading());
		assert_eq!(LoadState::Ready.error(), None);
	}
}
