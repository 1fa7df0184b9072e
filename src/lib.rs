//! Hollywood actors graph: Leptos client-side app wiring and routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod components;
pub mod config;
pub mod graph;
mod pages;

pub use components::actor_graph::{
	ActorGraph, BrowserHost, EventSink, GraphEvent, GraphHost, controller, layout,
};
pub use config::{AppConfig, DataPaths};

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the actor graph and handles 404's.
///
/// `config` is resolved once by the caller and handed down from here.
#[component]
pub fn App(config: AppConfig) -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();
	info!("recognizability tier {}", config.recognizability);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Hollywood Actors Graph" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="description" content="Interactive graph of Hollywood actors connected by movies" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route
					path=path!("/")
					view=move || {
						let config = config.clone();
						view! { <Home config=config /> }
					}
				/>
			</Routes>
		</Router>
	}
}
