use leptos::prelude::*;

use crate::components::actor_graph::{ActorGraph, GraphEvent};
use crate::config::AppConfig;

/// Headline and detail line for the selection panel.
fn describe(event: &GraphEvent) -> (String, String) {
	match event {
		GraphEvent::NodeTapped(node) => {
			let detail = match node.movie_count {
				Some(1) => "1 movie".to_owned(),
				Some(n) => format!("{n} movies"),
				None => "Actor".to_owned(),
			};
			(node.label.clone(), detail)
		}
		GraphEvent::EdgeTapped(edge) => {
			let detail = match &edge.release_date {
				Some(date) => format!("{} & {} · released {date}", edge.source, edge.target),
				None => format!("{} & {}", edge.source, edge.target),
			};
			(edge.label.clone(), detail)
		}
	}
}

/// Default Home Page
#[component]
pub fn Home(config: AppConfig) -> impl IntoView {
	let selected = RwSignal::new(None::<GraphEvent>);
	let on_event = Callback::new(move |event: GraphEvent| selected.set(Some(event)));

	view! {
		<div class="fullscreen-graph">
			<ActorGraph paths=config.data_paths() on_event=on_event />
			<div class="graph-overlay">
				<h1>"Hollywood Actors Graph"</h1>
				<p class="subtitle">
					"Actors connected by shared movies. Drag nodes to reposition. Scroll to zoom. Drag background to pan."
				</p>
				{move || {
					selected
						.get()
						.map(|event| {
							let (title, detail) = describe(&event);
							view! {
								<div class="selection">
									<strong>{title}</strong>
									<p>{detail}</p>
								</div>
							}
						})
				}}
			</div>
		</div>
	}
}
