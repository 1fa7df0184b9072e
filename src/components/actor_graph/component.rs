use std::rc::Rc;

use futures::StreamExt;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::info;
use send_wrapper::SendWrapper;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent};

use super::controller::{GraphController, LoadState};
use super::engine::CanvasFactory;
use super::events::GraphEvent;
use super::host::BrowserHost;
use crate::config::DataPaths;

fn log_event(event: &GraphEvent) {
	match event {
		GraphEvent::NodeTapped(node) => {
			info!("Clicked node: {}", serde_json::to_string(node).unwrap_or_default())
		}
		GraphEvent::EdgeTapped(edge) => {
			info!("Clicked edge: {}", serde_json::to_string(edge).unwrap_or_default())
		}
	}
}

/// Force-directed graph of actors linked by shared movies.
///
/// Loads both tables from `paths` shortly after mount, shows a spinner until
/// the graph is drawn and a generic message if anything fails.
#[component]
pub fn ActorGraph(
	/// Where the node and edge tables live.
	paths: DataPaths,
	/// Receives every node or edge tap.
	#[prop(optional)]
	on_event: Option<Callback<GraphEvent>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let load_state = RwSignal::new(LoadState::Idle);

	let controller = Rc::new(GraphController::new(
		BrowserHost,
		CanvasFactory::new(canvas_ref),
		paths,
	));
	let engine = controller.engine();

	let mut events = controller.subscribe();
	spawn_local(async move {
		while let Some(event) = events.next().await {
			log_event(&event);
			if let Some(on_event) = on_event {
				on_event.run(event);
			}
		}
	});

	let controller_load = controller.clone();
	spawn_local(async move {
		controller_load.run(move |state| load_state.set(state)).await;
	});

	let controller_cleanup = SendWrapper::new(controller);
	on_cleanup(move || controller_cleanup.teardown());

	let pointer = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let engine_md = engine.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(e) = engine_md.borrow().as_ref() {
			e.pointer_down(x, y);
		}
	};

	let engine_mm = engine.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(e) = engine_mm.borrow().as_ref() {
			e.pointer_move(x, y);
		}
	};

	let engine_mu = engine.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(e) = engine_mu.borrow().as_ref() {
			e.pointer_up();
		}
	};

	let engine_ml = engine.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(e) = engine_ml.borrow().as_ref() {
			e.pointer_leave();
		}
	};

	let engine_wh = engine;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = &ev;
		let Some((x, y)) = pointer(mouse) else {
			return;
		};
		if let Some(e) = engine_wh.borrow().as_ref() {
			e.wheel(x, y, ev.delta_y());
		}
	};

	let pending = move || load_state.with(|s| matches!(s, LoadState::Idle) || s.is_loading());
	let failure = move || load_state.with(|s| s.error().map(str::to_owned));

	view! {
		<div class="actor-graph" style="position: absolute; top: 0; left: 0; right: 0; bottom: 0;">
			<canvas
				node_ref=canvas_ref
				class="actor-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<Show when=pending>
				<div class="graph-status">
					<div class="spinner"></div>
					<p>"Loading graph..."</p>
				</div>
			</Show>
			{move || {
				failure()
					.map(|message| {
						view! {
							<div class="graph-status graph-error">
								<p class="error-title">"Error"</p>
								<p>{message}</p>
							</div>
						}
					})
			}}
		</div>
	}
}
