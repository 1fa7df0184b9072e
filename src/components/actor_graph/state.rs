use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::layout::{CoseLayout, CurveStyle, LayoutConfig};
use crate::graph::{EdgeElement, GraphData, NodeElement};

/// Screen-space distance a press may travel and still count as a tap.
pub const TAP_SLOP: f64 = 4.0;
/// Screen-space half-thickness used when picking edges.
pub const EDGE_HIT_TOLERANCE: f64 = 5.0;
/// Gap between parallel edges at their midpoint.
pub const FAN_SPACING: f64 = 16.0;
pub const LINE_HEIGHT: f64 = 1.2;

const FRAME_SECS: f32 = 0.016;
const FRAME_MS: f64 = 16.0;
const BASE_MASS: f32 = 10.0;
const CURVE_SAMPLES: usize = 16;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub element: NodeElement,
	pub label_lines: Vec<String>,
	pub label_width: f64,
	pub label_height: f64,
}

#[derive(Clone, Debug)]
pub struct EdgeSlot {
	pub src: DefaultNodeIdx,
	pub tgt: DefaultNodeIdx,
	pub element: EdgeElement,
	/// Signed offset of the curve midpoint from the straight line.
	pub bend: f64,
}

/// Quadratic curve in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Curve {
	pub from: (f64, f64),
	pub control: (f64, f64),
	pub to: (f64, f64),
}

impl Curve {
	pub fn point_at(&self, t: f64) -> (f64, f64) {
		let u = 1.0 - t;
		(
			u * u * self.from.0 + 2.0 * u * t * self.control.0 + t * t * self.to.0,
			u * u * self.from.1 + 2.0 * u * t * self.control.1 + t * t * self.to.1,
		)
	}

	fn distance_to(&self, px: f64, py: f64) -> f64 {
		let mut best = f64::INFINITY;
		let mut prev = self.from;
		for i in 1..=CURVE_SAMPLES {
			let next = self.point_at(i as f64 / CURVE_SAMPLES as f64);
			best = best.min(segment_distance(prev, next, (px, py)));
			prev = next;
		}
		best
	}
}

fn segment_distance(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 < 1e-12 {
		0.0
	} else {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Element under the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
	Node(DefaultNodeIdx),
	/// Index into the edge slots.
	Edge(usize),
}

#[derive(Clone, Debug)]
struct Press {
	x: f64,
	y: f64,
	hit: Option<Hit>,
	moved: bool,
}

/// Element released on without dragging.
#[derive(Clone, Debug, PartialEq)]
pub enum Tap {
	Node(NodeElement),
	Edge(EdgeElement),
}

/// Progress of the cooling schedule.
#[derive(Clone, Debug)]
pub struct LayoutRun {
	pub iteration: u32,
	pub temperature: f64,
	/// Iterations per animation frame; fractional rates carry over.
	pub per_frame: f64,
	pub done: bool,
	carry: f64,
}

impl LayoutRun {
	fn new(layout: &CoseLayout) -> Self {
		let planned = planned_iterations(layout);
		let per_frame = if layout.animate {
			let frames = (layout.animation_duration.as_secs_f64() * 1000.0 / FRAME_MS).max(1.0);
			planned as f64 / frames
		} else {
			planned as f64
		};
		Self {
			iteration: 0,
			temperature: layout.initial_temp,
			per_frame,
			done: planned == 0,
			carry: 0.0,
		}
	}

	/// Whole iterations owed to the current frame.
	fn take_frame(&mut self) -> u32 {
		self.carry += self.per_frame;
		let due = self.carry.floor();
		self.carry -= due;
		due as u32
	}
}

/// Iterations the cooling schedule runs before `min_temp` or `num_iter`
/// stops it.
pub fn planned_iterations(layout: &CoseLayout) -> u32 {
	let mut temperature = layout.initial_temp;
	let mut n = 0;
	while n < layout.num_iter {
		n += 1;
		temperature *= layout.cooling_factor;
		if temperature < layout.min_temp {
			break;
		}
	}
	n
}

pub fn simulation_parameters(layout: &CoseLayout) -> SimulationParameters {
	SimulationParameters {
		force_charge: (layout.node_repulsion / 2_000.0) as f32,
		force_spring: (layout.edge_elasticity / 2_000.0) as f32,
		force_max: (layout.initial_temp / 2.0) as f32,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

/// Greedy word wrap. A single word wider than `max_width` keeps its own line.
pub fn wrap_label(text: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
	let mut lines: Vec<String> = Vec::new();
	let mut current = String::new();
	for word in text.split_whitespace() {
		if current.is_empty() {
			current.push_str(word);
			continue;
		}
		let candidate = format!("{current} {word}");
		if measure(&candidate) <= max_width {
			current = candidate;
		} else {
			lines.push(std::mem::replace(&mut current, word.to_owned()));
		}
	}
	if !current.is_empty() {
		lines.push(current);
	}
	lines
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub config: LayoutConfig,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: Option<Hit>,
	pub width: f64,
	pub height: f64,
	pub run: LayoutRun,
	/// Set once the user pans or zooms; stops auto-fit from overriding them.
	view_pinned: bool,
	press: Option<Press>,
	edges: Vec<EdgeSlot>,
}

impl ForceGraphState {
	/// Builds the simulation. `measure` returns the rendered width of a label
	/// line; without animation the layout runs to completion here.
	pub fn new(
		data: &GraphData,
		config: LayoutConfig,
		width: f64,
		height: f64,
		measure: impl Fn(&str) -> f64,
	) -> Self {
		let cose = &config.layout;
		let node_style = &config.style.node;
		let mut graph = ForceGraph::new(simulation_parameters(cose));
		let mut id_to_idx = HashMap::new();
		let mut position = HashMap::new();

		let radius = node_style.diameter / 2.0;
		let ring = cose.ideal_edge_length * (data.nodes.len() as f64).sqrt() / 2.0;
		for (i, node) in data.nodes.iter().enumerate() {
			let label_lines = wrap_label(&node.label, node_style.text_max_width, &measure);
			let label_width = label_lines
				.iter()
				.map(|l| measure(l.as_str()))
				.fold(0.0_f64, f64::max);
			let label_height = label_lines.len() as f64 * node_style.font_size * LINE_HEIGHT;
			let footprint = if cose.node_dimensions_include_labels {
				radius.max(label_width / 2.0).max(label_height / 2.0)
			} else {
				radius
			};

			let angle = (i as f64) * 2.0 * PI / data.nodes.len() as f64;
			let (x, y) = ((ring * angle.cos()) as f32, (ring * angle.sin()) as f32);

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: BASE_MASS * (footprint / radius) as f32,
				is_anchor: false,
				user_data: NodeInfo {
					element: node.clone(),
					label_lines,
					label_width,
					label_height,
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
			position.insert(idx, i);
		}

		let mut edges = Vec::new();
		let mut lanes: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
		for edge in &data.edges {
			let (Some(&src), Some(&tgt)) = (id_to_idx.get(&edge.source), id_to_idx.get(&edge.target))
			else {
				continue;
			};
			if src != tgt {
				graph.add_edge(src, tgt, EdgeData::default());
			}
			let (a, b) = (position[&src], position[&tgt]);
			lanes.entry((a.min(b), a.max(b))).or_default().push(edges.len());
			edges.push(EdgeSlot {
				src,
				tgt,
				element: edge.clone(),
				bend: 0.0,
			});
		}
		if config.style.edge.curve == CurveStyle::Bezier {
			for ((low, _), members) in lanes {
				let mid = (members.len() as f64 - 1.0) / 2.0;
				for (k, &slot) in members.iter().enumerate() {
					let flip = if position[&edges[slot].src] == low { 1.0 } else { -1.0 };
					edges[slot].bend = (k as f64 - mid) * FAN_SPACING * flip;
				}
			}
		}

		let run = LayoutRun::new(cose);
		let mut state = Self {
			graph,
			run,
			edges,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: None,
			view_pinned: false,
			press: None,
			width,
			height,
			config,
		};
		if !state.config.layout.animate {
			while !state.run.done {
				state.step_layout();
			}
		}
		if state.config.layout.fit {
			state.fit();
		}
		state
	}

	pub fn edges(&self) -> &[EdgeSlot] {
		&self.edges
	}

	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	pub fn curve(&self, slot: &EdgeSlot, positions: &HashMap<DefaultNodeIdx, (f64, f64)>) -> Option<Curve> {
		let (&from, &to) = (positions.get(&slot.src)?, positions.get(&slot.tgt)?);
		let (dx, dy) = (to.0 - from.0, to.1 - from.1);
		let dist = (dx * dx + dy * dy).sqrt();
		let mid = ((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
		let control = if dist < 1e-3 {
			mid
		} else {
			// Quadratic midpoint sits halfway to the control point.
			let (nx, ny) = (-dy / dist, dx / dist);
			(mid.0 + nx * slot.bend * 2.0, mid.1 + ny * slot.bend * 2.0)
		};
		Some(Curve { from, control, to })
	}

	/// One cooling iteration: simulation step, edge-length and gravity
	/// corrections, then the displacement cap.
	fn step_layout(&mut self) {
		let cose = self.config.layout.clone();
		let before = self.positions();
		self.graph.update(FRAME_SECS);
		let after = self.positions();

		let mut next = after.clone();
		let elasticity = cose.edge_elasticity / 1000.0;
		for slot in &self.edges {
			if slot.src == slot.tgt {
				continue;
			}
			let (p1, p2) = (after[&slot.src], after[&slot.tgt]);
			let (dx, dy) = (p2.0 - p1.0, p2.1 - p1.1);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist < 1e-3 {
				continue;
			}
			let pull = (dist - cose.ideal_edge_length) / dist * elasticity * 0.5;
			if let Some(p) = next.get_mut(&slot.src) {
				p.0 += dx * pull;
				p.1 += dy * pull;
			}
			if let Some(p) = next.get_mut(&slot.tgt) {
				p.0 -= dx * pull;
				p.1 -= dy * pull;
			}
		}

		let gravity = cose.gravity * 1e-4;
		let count = next.len().max(1) as f64;
		let (sum_x, sum_y) = next.values().fold((0.0, 0.0), |(sx, sy), p| (sx + p.0, sy + p.1));
		let (cx, cy) = (sum_x / count, sum_y / count);
		let temperature = self.run.temperature;
		for (idx, p) in next.iter_mut() {
			p.0 -= (p.0 - cx) * gravity;
			p.1 -= (p.1 - cy) * gravity;
			let start = before[idx];
			let (dx, dy) = (p.0 - start.0, p.1 - start.1);
			let moved = (dx * dx + dy * dy).sqrt();
			if moved > temperature {
				let scale = temperature / moved;
				*p = (start.0 + dx * scale, start.1 + dy * scale);
			}
		}

		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			if let Some(&(x, y)) = next.get(&node.index()) {
				node.data.x = x as f32;
				node.data.y = y as f32;
			}
		});

		self.run.iteration += 1;
		self.run.temperature *= cose.cooling_factor;
		if self.run.iteration >= cose.num_iter || self.run.temperature < cose.min_temp {
			self.run.done = true;
			debug!(
				"{} layout settled after {} iterations",
				cose.name, self.run.iteration
			);
		}
	}

	/// Advances one animation frame. Returns whether the layout is still running.
	pub fn tick(&mut self) -> bool {
		if self.run.done {
			return false;
		}
		for _ in 0..self.run.take_frame() {
			self.step_layout();
			if self.run.done {
				break;
			}
		}
		if self.config.layout.fit && !self.view_pinned && !self.drag.active {
			self.fit();
		}
		!self.run.done
	}

	/// Zooms and centers so every node (and label, when configured) fits
	/// inside the padded viewport.
	pub fn fit(&mut self) {
		let radius = self.config.style.node.diameter / 2.0;
		let with_labels = self.config.layout.node_dimensions_include_labels;
		let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
		let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		self.graph.visit_nodes(|node| {
			let info = &node.data.user_data;
			let (hw, hh) = if with_labels {
				(
					radius.max(info.label_width / 2.0),
					radius.max(info.label_height / 2.0),
				)
			} else {
				(radius, radius)
			};
			let (x, y) = (node.x() as f64, node.y() as f64);
			min_x = min_x.min(x - hw);
			max_x = max_x.max(x + hw);
			min_y = min_y.min(y - hh);
			max_y = max_y.max(y + hh);
		});
		if !min_x.is_finite() {
			return;
		}

		let padding = self.config.layout.padding;
		let (bw, bh) = ((max_x - min_x).max(1.0), (max_y - min_y).max(1.0));
		let (aw, ah) = (
			(self.width - 2.0 * padding).max(1.0),
			(self.height - 2.0 * padding).max(1.0),
		);
		let k = self.config.viewport.clamp_zoom((aw / bw).min(ah / bh));
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let radius = self.config.style.node.diameter / 2.0;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < radius {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let positions = self.positions();
		let tolerance = (EDGE_HIT_TOLERANCE / self.transform.k).max(self.config.style.edge.width / 2.0);
		self.edges
			.iter()
			.enumerate()
			.filter_map(|(i, slot)| Some((i, self.curve(slot, &positions)?.distance_to(gx, gy))))
			.filter(|&(_, d)| d < tolerance)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(i, _)| i)
	}

	pub fn hit_at(&self, sx: f64, sy: f64) -> Option<Hit> {
		self.node_at_position(sx, sy)
			.map(Hit::Node)
			.or_else(|| self.edge_at_position(sx, sy).map(Hit::Edge))
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover == Some(Hit::Node(idx))
	}

	pub fn is_edge_hovered(&self, slot: usize) -> bool {
		self.hover == Some(Hit::Edge(slot))
	}

	fn node_element(&self, idx: DefaultNodeIdx) -> Option<NodeElement> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.element.clone());
			}
		});
		found
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) {
		let hit = self.hit_at(x, y);
		self.press = Some(Press {
			x,
			y,
			hit,
			moved: false,
		});
		if let Some(Hit::Node(idx)) = hit {
			self.drag.active = true;
			self.drag.node_idx = Some(idx);
			self.drag.start_x = x;
			self.drag.start_y = y;
			let drag = &mut self.drag;
			self.graph.visit_nodes(|node| {
				if node.index() == idx {
					drag.node_start_x = node.x();
					drag.node_start_y = node.y();
				}
			});
		} else {
			self.pan.active = true;
			self.pan.start_x = x;
			self.pan.start_y = y;
			self.pan.transform_start_x = self.transform.x;
			self.pan.transform_start_y = self.transform.y;
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if let Some(press) = self.press.as_mut() {
			if (x - press.x).hypot(y - press.y) > TAP_SLOP {
				press.moved = true;
			}
		}

		if !self.drag.active {
			self.hover = self.hit_at(x, y);
		}

		if self.drag.active {
			let moved = self.press.as_ref().is_some_and(|p| p.moved);
			if let (Some(idx), true) = (self.drag.node_idx, moved) {
				let (dx, dy) = (
					(x - self.drag.start_x) / self.transform.k,
					(y - self.drag.start_y) / self.transform.k,
				);
				let (nx, ny) = (
					self.drag.node_start_x + dx as f32,
					self.drag.node_start_y + dy as f32,
				);
				self.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.x = nx;
						node.data.y = ny;
						node.data.is_anchor = true;
					}
				});
			}
		} else if self.pan.active {
			if self.press.as_ref().is_some_and(|p| p.moved) {
				self.view_pinned = true;
			}
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// Ends a press. A press that never left the tap slop yields the element
	/// it started on.
	pub fn pointer_up(&mut self) -> Option<Tap> {
		self.drag.active = false;
		self.drag.node_idx = None;
		self.pan.active = false;
		let press = self.press.take()?;
		if press.moved {
			return None;
		}
		match press.hit? {
			Hit::Node(idx) => self.node_element(idx).map(Tap::Node),
			Hit::Edge(i) => self.edges.get(i).map(|slot| Tap::Edge(slot.element.clone())),
		}
	}

	pub fn pointer_leave(&mut self) {
		self.drag.active = false;
		self.drag.node_idx = None;
		self.pan.active = false;
		self.press = None;
		self.hover = None;
	}

	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
		let viewport = &self.config.viewport;
		let new_k = viewport.clamp_zoom(self.transform.k * viewport.wheel_factor(delta_y));
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
		self.view_pinned = true;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
