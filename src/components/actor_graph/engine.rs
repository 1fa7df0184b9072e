use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use super::controller::{EngineFactory, RenderEngine, RenderInitError};
use super::events::EventSink;
use super::layout::LayoutConfig;
use super::render::{self, label_font, measure_text};
use super::state::ForceGraphState;
use crate::graph::GraphData;

const FALLBACK_WIDTH: f64 = 800.0;
const FALLBACK_HEIGHT: f64 = 600.0;

fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	let parent = canvas.parent_element();
	let width = parent
		.as_ref()
		.map(|p| p.client_width() as f64)
		.filter(|w| *w > 0.0)
		.unwrap_or(FALLBACK_WIDTH);
	let height = parent
		.as_ref()
		.map(|p| p.client_height() as f64)
		.filter(|h| *h > 0.0)
		.unwrap_or(FALLBACK_HEIGHT);
	(width, height)
}

/// Creates a [`CanvasEngine`] on the component's `<canvas>`.
pub struct CanvasFactory {
	canvas: NodeRef<Canvas>,
}

impl CanvasFactory {
	pub fn new(canvas: NodeRef<Canvas>) -> Self {
		Self { canvas }
	}
}

impl EngineFactory for CanvasFactory {
	type Engine = CanvasEngine;

	fn create(
		&self,
		data: GraphData,
		config: LayoutConfig,
		events: EventSink,
	) -> Result<CanvasEngine, RenderInitError> {
		let canvas: HtmlCanvasElement = self
			.canvas
			.get_untracked()
			.ok_or(RenderInitError::MissingContainer)?
			.into();
		let window: Window = web_sys::window().ok_or(RenderInitError::MissingContainer)?;

		let (w, h) = container_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.map_err(|e| RenderInitError::Context(format!("{e:?}")))?
			.ok_or_else(|| RenderInitError::Context("canvas has no 2d context".into()))?
			.dyn_into()
			.map_err(|_| RenderInitError::Context("not a 2d context".into()))?;

		ctx.set_font(&label_font(&config.style.node));
		let state = ForceGraphState::new(&data, config, w, h, |text| measure_text(&ctx, text));
		let state = Rc::new(RefCell::new(state));

		let (state_resize, canvas_resize) = (state.clone(), canvas.clone());
		let resize_cb: Closure<dyn FnMut()> = Closure::new(move || {
			let (nw, nh) = container_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			state_resize.borrow_mut().resize(nw, nh);
		});
		let _ = window.add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());

		let frame: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
		let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
		let (state_anim, animate_inner, frame_inner, ctx_anim) =
			(state.clone(), animate.clone(), frame.clone(), ctx.clone());
		*animate.borrow_mut() = Some(Closure::new(move || {
			{
				let mut s = state_anim.borrow_mut();
				s.tick();
				render::render(&s, &ctx_anim);
			}
			frame_inner.set(None);
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				frame_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			frame.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}

		Ok(CanvasEngine {
			state,
			ctx,
			window,
			frame,
			animate,
			resize_cb: Some(resize_cb),
			events,
		})
	}
}

/// Canvas renderer: animation loop, resize tracking and pointer input.
pub struct CanvasEngine {
	state: Rc<RefCell<ForceGraphState>>,
	ctx: CanvasRenderingContext2d,
	window: Window,
	frame: Rc<Cell<Option<i32>>>,
	animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	resize_cb: Option<Closure<dyn FnMut()>>,
	events: EventSink,
}

impl CanvasEngine {
	pub fn pointer_down(&self, x: f64, y: f64) {
		self.state.borrow_mut().pointer_down(x, y);
	}

	pub fn pointer_move(&self, x: f64, y: f64) {
		self.state.borrow_mut().pointer_move(x, y);
	}

	pub fn pointer_up(&self) {
		let tap = self.state.borrow_mut().pointer_up();
		if let Some(tap) = tap {
			self.events.emit(tap.into());
		}
	}

	pub fn pointer_leave(&self) {
		self.state.borrow_mut().pointer_leave();
	}

	pub fn wheel(&self, x: f64, y: f64, delta_y: f64) {
		self.state.borrow_mut().wheel(x, y, delta_y);
	}
}

impl RenderEngine for CanvasEngine {
	fn destroy(&mut self) {
		if let Some(id) = self.frame.take() {
			let _ = self.window.cancel_animation_frame(id);
		}
		// Breaks the closure <-> slot cycle.
		self.animate.borrow_mut().take();
		if let Some(cb) = self.resize_cb.take() {
			let _ = self
				.window
				.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			let s = self.state.borrow();
			self.ctx.clear_rect(0.0, 0.0, s.width, s.height);
		}
	}
}

impl Drop for CanvasEngine {
	fn drop(&mut self) {
		self.destroy();
	}
}
