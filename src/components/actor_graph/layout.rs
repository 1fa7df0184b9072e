//! Visual encoding and force-layout constants for the actor graph.

use std::time::Duration;

/// Everything the engine needs besides the data itself.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Node and edge appearance.
	pub style: GraphStyle,
	/// Force-directed placement.
	pub layout: CoseLayout,
	/// Zoom bounds and wheel behavior.
	pub viewport: Viewport,
}

/// Styles selected by pointer-hover state.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphStyle {
	/// Resting node.
	pub node: NodeStyle,
	/// Overrides for the hovered node.
	pub node_hover: NodeHoverStyle,
	/// Resting edge.
	pub edge: EdgeStyle,
	/// Hovered edge.
	pub edge_hover: EdgeStyle,
}

/// Disc with a centered, outlined label.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	/// Disc color.
	pub fill: &'static str,
	/// Disc diameter (px).
	pub diameter: f64,
	/// Label size (px).
	pub font_size: f64,
	/// Label color.
	pub text_color: &'static str,
	/// Labels wrap onto new lines past this width (px).
	pub text_max_width: f64,
	/// Halo drawn behind the label glyphs.
	pub text_outline_color: &'static str,
	/// Halo width (px).
	pub text_outline_width: f64,
}

/// Hovered node: darker fill plus a ring.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeHoverStyle {
	/// Disc color.
	pub fill: &'static str,
	/// Ring width (px).
	pub border_width: f64,
	/// Ring color.
	pub border_color: &'static str,
}

/// How an edge is routed between its endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveStyle {
	/// Quadratic curves; parallel edges fan out instead of overlapping.
	Bezier,
	/// Straight segments; parallel edges overlap.
	Straight,
}

/// Edge line.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	/// Line width (px).
	pub width: f64,
	/// Line color.
	pub color: &'static str,
	/// Routing.
	pub curve: CurveStyle,
	/// Line opacity in `0..=1`.
	pub opacity: f64,
}

/// Resolved paint for one node in the current frame.
#[derive(Clone, Debug, PartialEq)]
pub struct NodePaint {
	/// Disc color.
	pub fill: &'static str,
	/// Ring width and color, if any.
	pub border: Option<(f64, &'static str)>,
}

impl GraphStyle {
	/// Node paint for the given hover state.
	pub fn node_paint(&self, hovered: bool) -> NodePaint {
		if hovered {
			NodePaint {
				fill: self.node_hover.fill,
				border: Some((self.node_hover.border_width, self.node_hover.border_color)),
			}
		} else {
			NodePaint {
				fill: self.node.fill,
				border: None,
			}
		}
	}

	/// Edge style for the given hover state.
	pub fn edge_paint(&self, hovered: bool) -> &EdgeStyle {
		if hovered { &self.edge_hover } else { &self.edge }
	}
}

/// Compound-spring-embedder parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct CoseLayout {
	/// Algorithm identifier.
	pub name: &'static str,
	/// Spread the iterations over `animation_duration` instead of settling
	/// before the first frame.
	pub animate: bool,
	/// Wall-clock length of the animated layout.
	pub animation_duration: Duration,
	/// Zoom and pan so the whole graph is visible.
	pub fit: bool,
	/// Viewport margin kept free when fitting (px).
	pub padding: f64,
	/// Count label boxes toward node size when spacing and fitting.
	pub node_dimensions_include_labels: bool,
	/// Rest length of an edge spring.
	pub ideal_edge_length: f64,
	/// Node-node repulsion strength.
	pub node_repulsion: f64,
	/// Edge spring stiffness.
	pub edge_elasticity: f64,
	/// Scales ideal length for edges crossing compound-node boundaries.
	/// Actor graphs are flat, so it never kicks in.
	pub nesting_factor: f64,
	/// Pull toward the layout center.
	pub gravity: f64,
	/// Iteration budget.
	pub num_iter: u32,
	/// Maximum per-iteration displacement at the start.
	pub initial_temp: f64,
	/// Temperature multiplier applied after every iteration.
	pub cooling_factor: f64,
	/// The layout stops once the temperature drops below this.
	pub min_temp: f64,
}

/// Zoom limits.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	/// Smallest zoom factor.
	pub min_zoom: f64,
	/// Largest zoom factor.
	pub max_zoom: f64,
	/// Fraction of a doubling applied per wheel notch, halved.
	pub wheel_sensitivity: f64,
}

impl Viewport {
	/// Bounds a zoom factor.
	pub fn clamp_zoom(&self, k: f64) -> f64 {
		k.clamp(self.min_zoom, self.max_zoom)
	}

	/// Multiplicative zoom step for one wheel notch.
	pub fn wheel_factor(&self, delta_y: f64) -> f64 {
		let step = 0.5 * self.wheel_sensitivity;
		if delta_y > 0.0 { 1.0 - step } else { 1.0 + step }
	}
}

/// Fresh configuration for one render. Takes no input and always yields the
/// same value.
pub fn graph_config() -> LayoutConfig {
	LayoutConfig {
		style: GraphStyle {
			node: NodeStyle {
				fill: "#4A90E2",
				diameter: 30.0,
				font_size: 12.0,
				text_color: "#333",
				text_max_width: 100.0,
				text_outline_color: "#fff",
				text_outline_width: 2.0,
			},
			node_hover: NodeHoverStyle {
				fill: "#2171D6",
				border_width: 3.0,
				border_color: "#1557B0",
			},
			edge: EdgeStyle {
				width: 2.0,
				color: "#ccc",
				curve: CurveStyle::Bezier,
				opacity: 0.6,
			},
			edge_hover: EdgeStyle {
				width: 3.0,
				color: "#888",
				curve: CurveStyle::Bezier,
				opacity: 1.0,
			},
		},
		layout: CoseLayout {
			name: "cose",
			animate: true,
			animation_duration: Duration::from_millis(1000),
			fit: true,
			padding: 50.0,
			node_dimensions_include_labels: true,
			ideal_edge_length: 100.0,
			node_repulsion: 400_000.0,
			edge_elasticity: 100.0,
			nesting_factor: 5.0,
			gravity: 80.0,
			num_iter: 1000,
			initial_temp: 200.0,
			cooling_factor: 0.95,
			min_temp: 1.0,
		},
		viewport: Viewport {
			min_zoom: 0.1,
			max_zoom: 3.0,
			wheel_sensitivity: 0.2,
		},
	}
}
