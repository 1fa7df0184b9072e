use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::layout::NodeStyle;
use super::state::{ForceGraphState, LINE_HEIGHT};

pub fn label_font(style: &NodeStyle) -> String {
	format!("{}px sans-serif", style.font_size)
}

/// Rendered width of `text` in the context's current font.
pub fn measure_text(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
	ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.clear_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let style = &state.config.style;
	let radius = style.node.diameter / 2.0;
	let positions = state.positions();

	// Hovered edge last so it sits on top.
	let (plain, hovered): (Vec<_>, Vec<_>) = state
		.edges()
		.iter()
		.enumerate()
		.partition(|(i, _)| !state.is_edge_hovered(*i));

	for (i, slot) in plain.into_iter().chain(hovered) {
		let Some(curve) = state.curve(slot, &positions) else {
			continue;
		};
		let paint = style.edge_paint(state.is_edge_hovered(i));
		ctx.set_global_alpha(paint.opacity);
		ctx.set_stroke_style_str(paint.color);
		ctx.set_line_width(paint.width);
		ctx.begin_path();
		if slot.src == slot.tgt {
			let (x, y) = curve.from;
			let _ = ctx.arc(x, y - radius, radius * 0.8, 0.0, 2.0 * PI);
		} else {
			ctx.move_to(curve.from.0, curve.from.1);
			ctx.quadratic_curve_to(curve.control.0, curve.control.1, curve.to.0, curve.to.1);
		}
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let style = &state.config.style;
	let radius = style.node.diameter / 2.0;

	state.graph.visit_nodes(|node| {
		let (x, y) = (node.x() as f64, node.y() as f64);
		let paint = style.node_paint(state.is_hovered(node.index()));

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(paint.fill);
		ctx.fill();
		if let Some((width, color)) = paint.border {
			ctx.set_stroke_style_str(color);
			ctx.set_line_width(width);
			ctx.stroke();
		}
	});

	ctx.set_font(&label_font(&style.node));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_line_join("round");
	let line_height = style.node.font_size * LINE_HEIGHT;

	state.graph.visit_nodes(|node| {
		let lines = &node.data.user_data.label_lines;
		if lines.is_empty() {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let top = y - (lines.len() as f64 - 1.0) * line_height / 2.0;
		for (i, line) in lines.iter().enumerate() {
			let ly = top + i as f64 * line_height;
			// Outline straddles the glyph edge, so stroke twice as wide.
			ctx.set_stroke_style_str(style.node.text_outline_color);
			ctx.set_line_width(style.node.text_outline_width * 2.0);
			let _ = ctx.stroke_text(line, x, ly);
			ctx.set_fill_style_str(style.node.text_color);
			let _ = ctx.fill_text(line, x, ly);
		}
	});
}
