use std::future::Future;
use std::time::Duration;

use js_sys::Promise;
use log::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::graph::FetchError;

/// Suspension points the controller needs from its environment.
pub trait GraphHost {
	/// Resolves after `delay`.
	fn settle(&self, delay: Duration) -> impl Future<Output = ()>;

	/// Retrieves a text resource. Non-OK statuses are errors.
	fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// `setTimeout` and `fetch` from the page's window.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserHost;

fn network(url: &str, reason: impl Into<String>) -> FetchError {
	FetchError::Network {
		url: url.to_owned(),
		reason: reason.into(),
	}
}

impl GraphHost for BrowserHost {
	async fn settle(&self, delay: Duration) {
		let ms = delay.as_millis().min(i32::MAX as u128) as i32;
		let promise = Promise::new(&mut |resolve, _reject| {
			let scheduled = web_sys::window().is_some_and(|window| {
				window
					.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
					.is_ok()
			});
			if !scheduled {
				let _ = resolve.call0(&JsValue::NULL);
			}
		});
		let _ = JsFuture::from(promise).await;
	}

	async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
		let window = web_sys::window().ok_or_else(|| network(url, "no window"))?;
		let response = JsFuture::from(window.fetch_with_str(url))
			.await
			.map_err(|e| network(url, format!("{e:?}")))?;
		let response: Response = response
			.dyn_into()
			.map_err(|_| network(url, "fetch did not yield a Response"))?;
		if !response.ok() {
			return Err(FetchError::Status {
				url: url.to_owned(),
				status: response.status(),
			});
		}
		let body = response
			.text()
			.map_err(|e| network(url, format!("{e:?}")))?;
		let text = JsFuture::from(body)
			.await
			.map_err(|e| network(url, format!("{e:?}")))?
			.as_string()
			.ok_or_else(|| network(url, "body is not text"))?;
		debug!("fetched {url}: status {}, {} bytes", response.status(), text.len());
		Ok(text)
	}
}
