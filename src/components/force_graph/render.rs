use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::truncate_label;
use super::state::ForceGraphState;
use super::types::Vec2;
use super::viewport::Viewport;

const BACKGROUND: &str = "#1a1a2e";
const EDGE_RGB: &str = "100, 180, 255";
const ACCENT_RGB: &str = "255, 196, 87";

/// Drawing primitives the renderer needs. World-space calls are issued
/// between `begin_world` and `end_world`.
pub trait Surface {
	/// Fill the whole canvas, ignoring the view transform.
	fn clear(&mut self, width: f64, height: f64, color: &str);
	/// Apply the viewport transform.
	fn begin_world(&mut self, viewport: &Viewport);
	/// Undo `begin_world`.
	fn end_world(&mut self);
	/// Global opacity for what follows.
	fn set_alpha(&mut self, alpha: f64);
	/// Quadratic curve; a straight line when `control` is the midpoint.
	fn stroke_curve(&mut self, from: Vec2, control: Vec2, to: Vec2, color: &str, width: f64);
	/// Closed filled polygon.
	fn fill_polygon(&mut self, points: &[Vec2], color: &str);
	/// Filled disc.
	fn fill_circle(&mut self, center: Vec2, radius: f64, color: &str);
	/// Circle outline.
	fn stroke_circle(&mut self, center: Vec2, radius: f64, color: &str, width: f64);
	/// Radial white glow fading out between `inner` and `outer`.
	fn glow(&mut self, center: Vec2, inner: f64, outer: f64, alpha: f64);
	/// Text centered horizontally on `at`.
	fn draw_text(&mut self, text: &str, at: Vec2, size: f64, color: &str);
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Point on a quadratic curve at `t`.
fn quad_point(from: Vec2, control: Vec2, to: Vec2, t: f64) -> Vec2 {
	let u = 1.0 - t;
	from * (u * u) + control * (2.0 * u * t) + to * (t * t)
}

/// Draw one frame: background, then edges, then nodes on top.
pub fn render(state: &ForceGraphState, surface: &mut impl Surface) {
	surface.clear(state.sim.width, state.sim.height, BACKGROUND);
	surface.begin_world(&state.viewport);
	draw_edges(state, surface);
	draw_nodes(state, surface);
	surface.end_world();
}

/// How strongly the current hover/selection focus applies, in [0, 1].
fn focus_t(state: &ForceGraphState) -> f64 {
	if state.selected.is_some() {
		1.0
	} else {
		ease_out_cubic(state.hover.highlight_t)
	}
}

fn is_focused(state: &ForceGraphState, idx: usize) -> bool {
	state.is_hovered(idx) || state.selected == Some(idx)
}

fn draw_edges(state: &ForceGraphState, surface: &mut impl Surface) {
	let k = state.viewport.scale;
	let (line_width, arrow_size) = (1.5 / k, 8.0 / k);
	let has_focus = state.has_active_highlight() || state.selected.is_some();
	let t = focus_t(state);
	let show_labels =
		state.config.show_edge_labels && k >= state.config.edge_label_zoom_threshold;

	for edge in &state.sim.edges {
		let (n1, n2) = (&state.sim.nodes[edge.source], &state.sim.nodes[edge.target]);
		let delta = n2.position - n1.position;
		let dist = delta.length();
		if dist < 0.001 {
			continue;
		}
		let dir = delta / dist;
		let mid = (n1.position + n2.position) / 2.0;
		// the curve apex sits halfway to the control point
		let control = mid + dir.perp() * (edge.bend * 2.0);

		let highlighted = is_focused(state, edge.source) || is_focused(state, edge.target);
		let (color, width) = if highlighted {
			(
				format!("rgba({ACCENT_RGB}, {})", 0.6 + 0.35 * t),
				line_width * (1.0 + 0.8 * t),
			)
		} else if has_focus {
			(
				format!("rgba({EDGE_RGB}, {})", 0.6 - 0.45 * t),
				line_width * (1.0 - 0.3 * t),
			)
		} else {
			(format!("rgba({EDGE_RGB}, 0.6)"), line_width)
		};

		let start_dir = (control - n1.position) / (control - n1.position).length();
		let end_dir = (n2.position - control) / (n2.position - control).length();
		let from = n1.position + start_dir * n1.radius;
		let tip = n2.position - end_dir * n2.radius;
		let to = if highlighted {
			tip - end_dir * arrow_size
		} else {
			tip
		};
		surface.stroke_curve(from, control, to, &color, width);

		if highlighted {
			let back = tip - end_dir * arrow_size;
			let side = end_dir.perp() * (arrow_size * 0.5);
			surface.fill_polygon(&[tip, back + side, back - side], &color);
		}

		if show_labels {
			if let Some(relation) = &edge.relation {
				let at = quad_point(n1.position, control, n2.position, 0.5);
				let alpha = if has_focus && !highlighted { 0.3 } else { 0.85 };
				surface.draw_text(
					relation,
					at,
					9.0 / k,
					&format!("rgba(200, 220, 255, {alpha})"),
				);
			}
		}
	}
}

fn draw_nodes(state: &ForceGraphState, surface: &mut impl Surface) {
	let k = state.viewport.scale;
	let hover_t = ease_out_cubic(state.hover.highlight_t);
	let dimming = state.has_active_highlight();
	let show_labels = state.config.show_node_labels && k >= state.config.label_zoom_threshold;
	let font = 10.0 / k.max(0.5);

	for (idx, node) in state.sim.nodes.iter().enumerate() {
		let color = state.palette.color_for(&node.category);
		let hovered = state.is_hovered(idx);
		let selected = state.selected == Some(idx);
		let dimmed = dimming && !state.is_highlighted(idx);
		let alpha = if dimmed { 1.0 - 0.7 * hover_t } else { 1.0 };
		let radius = if hovered {
			node.radius * (1.0 + 0.25 * hover_t)
		} else {
			node.radius
		};

		if hovered && hover_t > 0.01 {
			let outer = radius * (1.8 + 1.2 * hover_t);
			surface.glow(node.position, radius * 0.3, outer, 0.35 * hover_t);
		}

		surface.set_alpha(alpha);
		surface.fill_circle(node.position, radius, color);
		if selected {
			surface.stroke_circle(node.position, radius + 2.0 / k, "white", 2.5 / k);
		} else if hovered && hover_t > 0.01 {
			surface.stroke_circle(
				node.position,
				radius + 2.0 / k,
				&format!("rgba(255, 255, 255, {})", 0.7 * hover_t),
				1.5 / k,
			);
		}

		if show_labels {
			let label = truncate_label(&node.label, state.config.label_max_chars);
			let at = node.position + Vec2::new(0.0, radius + font + 2.0 / k);
			let text_color = if hovered || selected {
				"white".to_string()
			} else {
				format!("rgba(255, 255, 255, {})", 0.8 * alpha)
			};
			surface.draw_text(&label, at, font, &text_color);
		}
		surface.set_alpha(1.0);
	}
}

impl Surface for CanvasRenderingContext2d {
	fn clear(&mut self, width: f64, height: f64, color: &str) {
		self.set_fill_style_str(color);
		self.fill_rect(0.0, 0.0, width, height);
	}

	fn begin_world(&mut self, viewport: &Viewport) {
		self.save();
		let _ = self.translate(viewport.pan.x, viewport.pan.y);
		let _ = self.scale(viewport.scale, viewport.scale);
	}

	fn end_world(&mut self) {
		self.restore();
	}

	fn set_alpha(&mut self, alpha: f64) {
		self.set_global_alpha(alpha);
	}

	fn stroke_curve(&mut self, from: Vec2, control: Vec2, to: Vec2, color: &str, width: f64) {
		self.set_stroke_style_str(color);
		self.set_line_width(width);
		self.begin_path();
		self.move_to(from.x, from.y);
		self.quadratic_curve_to(control.x, control.y, to.x, to.y);
		self.stroke();
	}

	fn fill_polygon(&mut self, points: &[Vec2], color: &str) {
		let Some((first, rest)) = points.split_first() else {
			return;
		};
		self.set_fill_style_str(color);
		self.begin_path();
		self.move_to(first.x, first.y);
		for p in rest {
			self.line_to(p.x, p.y);
		}
		self.close_path();
		self.fill();
	}

	fn fill_circle(&mut self, center: Vec2, radius: f64, color: &str) {
		self.begin_path();
		let _ = self.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
		self.set_fill_style_str(color);
		self.fill();
	}

	fn stroke_circle(&mut self, center: Vec2, radius: f64, color: &str, width: f64) {
		self.begin_path();
		let _ = self.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
		self.set_stroke_style_str(color);
		self.set_line_width(width);
		self.stroke();
	}

	fn glow(&mut self, center: Vec2, inner: f64, outer: f64, alpha: f64) {
		let Ok(gradient) =
			self.create_radial_gradient(center.x, center.y, inner, center.x, center.y, outer)
		else {
			return;
		};
		let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
		let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
		let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
		self.begin_path();
		let _ = self.arc(center.x, center.y, outer, 0.0, 2.0 * PI);
		#[allow(deprecated)]
		self.set_fill_style(&gradient);
		self.fill();
	}

	fn draw_text(&mut self, text: &str, at: Vec2, size: f64, color: &str) {
		self.set_fill_style_str(color);
		self.set_font(&format!("{}px sans-serif", size));
		self.set_text_align("center");
		let _ = self.fill_text(text, at.x, at.y);
	}
}
