use std::collections::HashSet;

use log::{debug, info};

use super::config::{GraphConfig, LayoutMode};
use super::interaction::{self, Effect, InteractionState, PointerContext, PointerEvent};
use super::loader;
use super::palette::CategoryPalette;
use super::simulation::{LoopHandle, SimNode, SimulationState};
use super::types::{GraphData, Vec2};
use super::viewport::Viewport;

/// Hovered node, its neighbours, and the fade of their highlight.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	/// Node under the pointer.
	pub node: Option<usize>,
	/// Nodes adjacent to `node`.
	pub neighbors: HashSet<usize>,
	/// Highlight strength in `0.0..=1.0`.
	pub highlight_t: f64,
	/// Last hovered node while its highlight fades out.
	pub prev_node: Option<usize>,
	/// Neighbours of `prev_node`.
	pub prev_neighbors: HashSet<usize>,
	delay_t: f64,
}

/// A loaded node as the view presents it, for detail panels outside the
/// canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDetails {
	/// Entity id.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Entity type.
	pub category: String,
	/// Color the node is drawn with.
	pub color: String,
	/// Free-text summary.
	pub description: Option<String>,
	/// Reported degree, or the number of edges kept after loading.
	pub degree: u32,
}

/// Everything the canvas needs between frames: one owned handle, mutated by
/// the frame loop and the pointer handlers, read by the renderer.
pub struct ForceGraphState {
	/// Settings, including the current canvas size.
	pub config: GraphConfig,
	/// Layout of the current snapshot.
	pub sim: SimulationState,
	/// Category colors, kept across reloads.
	pub palette: CategoryPalette,
	/// Pan and zoom, kept across reloads.
	pub viewport: Viewport,
	/// Pointer gesture in progress.
	pub interaction: InteractionState,
	/// Hover highlight.
	pub hover: HoverState,
	/// Selected node.
	pub selected: Option<usize>,
	frame_loop: LoopHandle,
}

impl ForceGraphState {
	/// Load the first snapshot.
	pub fn new(data: &GraphData, config: GraphConfig) -> Self {
		let viewport = Viewport::new(config.min_scale, config.max_scale);
		let mut state = Self {
			sim: SimulationState::default(),
			palette: CategoryPalette::default(),
			viewport,
			interaction: InteractionState::default(),
			hover: HoverState::default(),
			selected: None,
			frame_loop: LoopHandle::default(),
			config,
		};
		state.install(data);
		state
	}

	/// Replace the snapshot. The viewport survives; everything that refers to
	/// node indices of the old snapshot is cleared, and the previous animation
	/// loop is cancelled so it stops touching stale data.
	pub fn load_snapshot(&mut self, data: &GraphData) {
		self.frame_loop.cancel();
		self.frame_loop = LoopHandle::default();
		self.interaction = InteractionState::default();
		self.hover = HoverState::default();
		self.selected = None;
		self.install(data);
	}

	fn install(&mut self, data: &GraphData) {
		self.sim = loader::load(data, &self.config);
		self.palette.assign(
			self.sim.nodes.iter().map(|n| n.category.as_str()),
			&self.config,
		);

		if let LayoutMode::Bounded { iterations } = self.config.layout_mode {
			self.sim.run_bounded(&self.config.forces, iterations);
			self.sim.running = false;
		}
		info!(
			"graph snapshot installed: {} nodes, {} edges",
			self.sim.nodes.len(),
			self.sim.edges.len()
		);
	}

	/// Handle for the animation loop currently allowed to drive this state.
	pub fn loop_handle(&self) -> LoopHandle {
		self.frame_loop.clone()
	}

	/// Stop the current animation loop.
	pub fn cancel_loop(&self) {
		self.frame_loop.cancel();
	}

	/// Whether a frame loop should be (re)scheduled at all.
	pub fn wants_frames(&self) -> bool {
		!self.frame_loop.is_cancelled() && !self.sim.is_empty()
	}

	/// Advance one display frame. Returns `false` once the loop must stop.
	pub fn frame(&mut self, dt: f64) -> bool {
		if !self.wants_frames() {
			return false;
		}
		if self.sim.running {
			self.sim.tick(&self.config.forces);
		}
		self.advance_highlight(dt);
		true
	}

	/// Follow a canvas size change; the gravity center moves with it.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.config.width = width;
		self.config.height = height;
		self.sim.width = width;
		self.sim.height = height;
	}

	/// Back to no pan and unit zoom.
	pub fn reset_view(&mut self) {
		self.viewport.reset();
	}

	/// Resolved node by id.
	pub fn node(&self, id: &str) -> Option<&SimNode> {
		self.sim.index_of(id).map(|idx| &self.sim.nodes[idx])
	}

	/// Resolved node with its palette color.
	pub fn details(&self, id: &str) -> Option<NodeDetails> {
		let node = self.node(id)?;
		Some(NodeDetails {
			id: node.id.clone(),
			label: node.label.clone(),
			category: node.category.clone(),
			color: self.palette.color_for(&node.category).to_string(),
			description: node.description.clone(),
			degree: node.degree,
		})
	}

	/// Id of the selected node.
	pub fn selected_id(&self) -> Option<&str> {
		self.selected.map(|idx| self.sim.nodes[idx].id.as_str())
	}

	/// Feed one pointer event through the interaction state machine.
	/// Returns `Some(selection)` when the selection changed.
	pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<Option<String>> {
		let hit = match event {
			PointerEvent::Down(p) | PointerEvent::Move(p) => interaction::hit_test(
				&self.sim.nodes,
				&self.viewport,
				p,
				self.config.hit_factor,
			)
			.map(|idx| (idx, self.sim.nodes[idx].position)),
			_ => None,
		};
		let ctx = PointerContext {
			hit,
			scale: self.viewport.scale,
			selected: self.selected,
			click_threshold: self.config.click_threshold,
		};
		let (next, effects) = interaction::transition(&self.interaction, event, &ctx);
		self.interaction = next;

		let mut selection = None;
		for effect in effects {
			match effect {
				Effect::Hover(node) => self.set_hover(node),
				Effect::Pin(idx) => {
					let node = &mut self.sim.nodes[idx];
					node.pinned = true;
					node.velocity = Vec2::ZERO;
				}
				Effect::Unpin(idx) => self.sim.nodes[idx].pinned = false,
				Effect::MoveNode { node, to } => {
					let node = &mut self.sim.nodes[node];
					node.position = to;
					node.velocity = Vec2::ZERO;
				}
				Effect::Pan(delta) => self.viewport.pan_by(delta),
				Effect::Zoom { at, delta_y } => {
					self.viewport.wheel(at, delta_y, self.config.zoom_step)
				}
				Effect::Select(idx) => {
					self.selected = idx;
					let id = idx.map(|i| self.sim.nodes[i].id.clone());
					debug!("selection changed: {:?}", id);
					selection = Some(id);
				}
			}
		}
		selection
	}

	/// Move the hover highlight, keeping the old one around to fade out.
	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			self.hover.neighbors.extend(self.sim.neighbors(idx));
		}
	}

	/// Hovered node or one of its neighbours (including a fading hover).
	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	/// Node is hovered or fading out of hover.
	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	/// Some hover highlight is showing.
	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	fn advance_highlight(&mut self, dt: f64) {
		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * (speed * dt).min(1.0);
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * (speed * dt).min(1.0);
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn pair() -> GraphData {
		GraphData {
			nodes: vec![GraphNode::new("A", "PERSON"), GraphNode::new("B", "ORGANIZATION")],
			edges: vec![GraphLink::new("A", "B")],
		}
	}

	fn config() -> GraphConfig {
		GraphConfig::default().with_size(500.0, 500.0).with_seed(1)
	}

	fn screen_of(state: &ForceGraphState, id: &str) -> Vec2 {
		let node = state.node(id).unwrap();
		state.viewport.world_to_screen(node.position)
	}

	fn click(state: &mut ForceGraphState, at: Vec2) -> Option<Option<String>> {
		assert_eq!(state.handle_pointer(PointerEvent::Down(at)), None);
		state.handle_pointer(PointerEvent::Up(at))
	}

	#[test]
	fn clicking_twice_clears_selection() {
		let mut state = ForceGraphState::new(&pair(), config());
		let a = screen_of(&state, "A");

		assert_eq!(click(&mut state, a), Some(Some("A".into())));
		assert_eq!(state.selected_id(), Some("A"));
		assert_eq!(click(&mut state, a), Some(None));
		assert_eq!(state.selected_id(), None);
	}

	#[test]
	fn long_drag_moves_node_without_selection() {
		let mut state = ForceGraphState::new(&pair(), config());
		let a = screen_of(&state, "A");
		let start = state.node("A").unwrap().position;

		state.handle_pointer(PointerEvent::Down(a));
		assert!(state.node("A").unwrap().pinned);
		state.handle_pointer(PointerEvent::Move(a + Vec2::new(30.0, 0.0)));
		let released = state.handle_pointer(PointerEvent::Up(a + Vec2::new(30.0, 0.0)));

		assert_eq!(released, None);
		let node = state.node("A").unwrap();
		assert!(node.position.distance(start + Vec2::new(30.0, 0.0)) < 1e-9);
		assert_eq!(node.velocity, Vec2::ZERO);
		assert!(!node.pinned);
		assert!(state.interaction.is_idle());
	}

	#[test]
	fn dragged_node_ignores_simulation() {
		let mut state = ForceGraphState::new(&pair(), config());
		let a = screen_of(&state, "A");
		state.handle_pointer(PointerEvent::Down(a));
		state.handle_pointer(PointerEvent::Move(a + Vec2::new(10.0, 10.0)));
		let held = state.node("A").unwrap().position;

		for _ in 0..30 {
			assert!(state.frame(0.016));
		}
		assert_eq!(state.node("A").unwrap().position, held);
		assert_eq!(state.node("A").unwrap().velocity, Vec2::ZERO);
	}

	#[test]
	fn background_drag_pans_and_wheel_zooms() {
		let mut state = ForceGraphState::new(&pair(), config());
		let empty = Vec2::new(5.0, 5.0);
		state.handle_pointer(PointerEvent::Down(empty));
		state.handle_pointer(PointerEvent::Move(Vec2::new(25.0, 15.0)));
		state.handle_pointer(PointerEvent::Up(Vec2::new(25.0, 15.0)));
		assert_eq!(state.viewport.pan, Vec2::new(20.0, 10.0));

		let anchor = Vec2::new(200.0, 120.0);
		let before = state.viewport.screen_to_world(anchor);
		state.handle_pointer(PointerEvent::Wheel {
			at: anchor,
			delta_y: -100.0,
		});
		assert!(state.viewport.scale > 1.0);
		assert!(state.viewport.screen_to_world(anchor).distance(before) < 1e-9);
		assert!(state.interaction.is_idle());
	}

	#[test]
	fn hover_marks_neighbors_and_fades_out() {
		let data = GraphData {
			nodes: vec![
				GraphNode::new("A", "X"),
				GraphNode::new("B", "X"),
				GraphNode::new("C", "X"),
			],
			edges: vec![GraphLink::new("A", "B")],
		};
		let mut state = ForceGraphState::new(&data, config());
		let a = screen_of(&state, "A");

		state.handle_pointer(PointerEvent::Move(a));
		assert!(state.is_hovered(0));
		assert!(state.is_highlighted(1));
		assert!(!state.is_highlighted(2));
		for _ in 0..120 {
			state.frame(0.016);
		}
		assert!(state.hover.highlight_t > 0.9);

		state.handle_pointer(PointerEvent::Leave);
		assert!(state.has_active_highlight());
		for _ in 0..400 {
			state.frame(0.016);
		}
		assert!(!state.has_active_highlight());
		assert_eq!(state.hover.highlight_t, 0.0);
	}

	#[test]
	fn reload_keeps_viewport_and_cancels_loop() {
		let mut state = ForceGraphState::new(&pair(), config());
		state.viewport.pan = Vec2::new(40.0, -10.0);
		state.viewport.scale = 2.0;
		state.selected = Some(0);
		let old = state.loop_handle();

		let data = GraphData {
			nodes: vec![GraphNode::new("Z", "CONCEPT")],
			edges: vec![],
		};
		state.load_snapshot(&data);

		assert!(old.is_cancelled());
		assert!(!state.loop_handle().is_cancelled());
		assert_eq!(state.viewport.pan, Vec2::new(40.0, -10.0));
		assert_eq!(state.viewport.scale, 2.0);
		assert_eq!(state.selected, None);
		assert_eq!(state.sim.nodes.len(), 1);
		assert_eq!(state.palette.color_for("CONCEPT"), state.config.palette[2]);
	}

	#[test]
	fn category_colors_survive_reload() {
		let mut state = ForceGraphState::new(&pair(), config());
		let person = state.palette.color_for("PERSON").to_string();
		let organization = state.palette.color_for("ORGANIZATION").to_string();

		let swapped = GraphData {
			nodes: vec![GraphNode::new("O", "ORGANIZATION"), GraphNode::new("P", "PERSON")],
			edges: vec![GraphLink::new("O", "P")],
		};
		state.load_snapshot(&swapped);

		assert_eq!(state.palette.color_for("ORGANIZATION"), organization);
		assert_eq!(state.palette.color_for("PERSON"), person);
	}

	#[test]
	fn details_count_only_resolved_edges() {
		let data = GraphData {
			nodes: vec![
				GraphNode::new("Difference Engine", "TECHNOLOGY"),
				GraphNode::new("Charles Babbage", "PERSON"),
			],
			edges: vec![
				GraphLink::new("Charles Babbage", "Difference Engine"),
				GraphLink::new("Difference Engine", "Science Museum"),
			],
		};
		let state = ForceGraphState::new(&data, config());

		let details = state.details("Difference Engine").unwrap();
		assert_eq!(details.degree, 1);
		assert_eq!(details.label, "Difference Engine");
		assert_eq!(details.category, "TECHNOLOGY");
		assert_eq!(details.color, state.palette.color_for("TECHNOLOGY"));
		assert_eq!(state.details("Science Museum"), None);
	}

	#[test]
	fn empty_graph_never_schedules_frames() {
		let mut state = ForceGraphState::new(&GraphData::default(), config());
		assert!(!state.wants_frames());
		assert!(!state.frame(0.016));
	}

	#[test]
	fn cancelled_loop_stops() {
		let mut state = ForceGraphState::new(&pair(), config());
		assert!(state.frame(0.016));
		state.cancel_loop();
		assert!(!state.frame(0.016));
	}

	#[test]
	fn bounded_mode_lays_out_once() {
		let mut config = config();
		config.layout_mode = LayoutMode::Bounded { iterations: 150 };
		let mut state = ForceGraphState::new(&pair(), config);
		let a = state.node("A").unwrap().position;
		let b = state.node("B").unwrap().position;
		let dist = a.distance(b);
		assert!((85.0..=115.0).contains(&dist), "distance {dist}");

		assert!(state.frame(0.016));
		assert_eq!(state.node("A").unwrap().position, a);
	}

	#[test]
	fn inverted_zoom_range_from_config_is_usable() {
		let mut config = config();
		config.min_scale = 5.0;
		config.max_scale = 0.1;
		let mut state = ForceGraphState::new(&pair(), config);
		state.handle_pointer(PointerEvent::Wheel {
			at: Vec2::new(100.0, 100.0),
			delta_y: -100.0,
		});
		assert!(state.viewport.scale > 1.0);
	}

	#[test]
	fn resize_moves_the_gravity_center() {
		let mut state = ForceGraphState::new(&pair(), config());
		state.resize(1000.0, 400.0);
		assert_eq!(state.sim.center(), Vec2::new(500.0, 200.0));
	}
}
