use actor_graph::{App, AppConfig, init_logging};
use leptos::prelude::*;

fn main() {
	init_logging();
	let config = AppConfig::from_build_env();
	leptos::mount::mount_to_body(move || view! { <App config=config /> })
}
