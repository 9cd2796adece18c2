//! Pointer state machine: drag a node, pan the background, click to select.
//!
//! `transition` is pure. It maps the current state plus one pointer event to
//! the next state and a list of effects; `ForceGraphState` applies them.

use super::simulation::SimNode;
use super::types::Vec2;
use super::viewport::Viewport;

/// Pointer input in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
	/// Primary button pressed.
	Down(Vec2),
	/// Pointer moved, pressed or not.
	Move(Vec2),
	/// Primary button released.
	Up(Vec2),
	/// Pointer left the canvas.
	Leave,
	/// Wheel scrolled over the canvas.
	Wheel {
		/// Screen position of the pointer.
		at: Vec2,
		/// Scroll amount; positive zooms out.
		delta_y: f64,
	},
}

/// What the pointer is currently doing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InteractionMode {
	/// No button held.
	#[default]
	Idle,
	/// Button held on a node.
	DraggingNode {
		/// Index of the held node.
		node: usize,
		/// Screen position of the press.
		down: Vec2,
		/// World position of the node at the press.
		node_start: Vec2,
		/// Largest screen-space distance from `down` so far.
		travelled: f64,
	},
	/// Button held on the background.
	Panning {
		/// Screen position of the press.
		down: Vec2,
	},
}

/// State carried between pointer events.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
	/// Current gesture.
	pub mode: InteractionMode,
	/// Last screen position seen, used for pan deltas.
	pub last_pointer: Option<Vec2>,
}

impl InteractionState {
	/// Node being dragged, if any.
	pub fn active_node(&self) -> Option<usize> {
		match self.mode {
			InteractionMode::DraggingNode { node, .. } => Some(node),
			_ => None,
		}
	}

	/// No gesture in progress.
	pub fn is_idle(&self) -> bool {
		self.mode == InteractionMode::Idle
	}
}

/// Change requested by a transition, applied by the owner of the scene.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
	/// Node now under the pointer.
	Hover(Option<usize>),
	/// Take the node out of the simulation and zero its velocity.
	Pin(usize),
	/// Hand the node back to the simulation.
	Unpin(usize),
	/// Place a dragged node at a world position.
	MoveNode {
		/// Index of the dragged node.
		node: usize,
		/// New world position.
		to: Vec2,
	},
	/// Shift the view by a screen-space delta.
	Pan(Vec2),
	/// One wheel step anchored at a screen point.
	Zoom {
		/// Screen anchor that stays fixed.
		at: Vec2,
		/// Scroll amount; positive zooms out.
		delta_y: f64,
	},
	/// New selection; `None` clears it.
	Select(Option<usize>),
}

/// What the state machine needs to know about the scene for one event.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerContext {
	/// Topmost node under the pointer and its world position.
	pub hit: Option<(usize, Vec2)>,
	/// Current zoom, to turn screen deltas into world deltas.
	pub scale: f64,
	/// Currently selected node.
	pub selected: Option<usize>,
	/// Screen-space travel below which a press and release is a click.
	pub click_threshold: f64,
}

/// Next state and the effects of one pointer event.
pub fn transition(
	state: &InteractionState,
	event: PointerEvent,
	ctx: &PointerContext,
) -> (InteractionState, Vec<Effect>) {
	use InteractionMode::*;

	let mut effects = Vec::new();
	let mode = match (state.mode, event) {
		(_, PointerEvent::Wheel { at, delta_y }) => {
			effects.push(Effect::Zoom { at, delta_y });
			state.mode
		}
		(current, PointerEvent::Down(pos)) => {
			if let DraggingNode { node, .. } = current {
				effects.push(Effect::Unpin(node));
			}
			match ctx.hit {
				Some((node, node_start)) => {
					effects.push(Effect::Pin(node));
					DraggingNode {
						node,
						down: pos,
						node_start,
						travelled: 0.0,
					}
				}
				None => Panning { down: pos },
			}
		}
		(
			DraggingNode {
				node,
				down,
				node_start,
				travelled,
			},
			PointerEvent::Move(pos),
		) => {
			let delta = pos - down;
			effects.push(Effect::MoveNode {
				node,
				to: node_start + delta / ctx.scale,
			});
			DraggingNode {
				node,
				down,
				node_start,
				travelled: travelled.max(delta.length()),
			}
		}
		(Panning { down }, PointerEvent::Move(pos)) => {
			let last = state.last_pointer.unwrap_or(down);
			effects.push(Effect::Pan(pos - last));
			Panning { down }
		}
		(Idle, PointerEvent::Move(_)) => {
			effects.push(Effect::Hover(ctx.hit.map(|(node, _)| node)));
			Idle
		}
		(
			DraggingNode {
				node,
				down,
				travelled,
				..
			},
			PointerEvent::Up(pos),
		) => {
			effects.push(Effect::Unpin(node));
			if travelled.max((pos - down).length()) < ctx.click_threshold {
				let selection = if ctx.selected == Some(node) {
					None
				} else {
					Some(node)
				};
				effects.push(Effect::Select(selection));
			}
			Idle
		}
		(Panning { .. } | Idle, PointerEvent::Up(_)) => Idle,
		(current, PointerEvent::Leave) => {
			if let DraggingNode { node, .. } = current {
				effects.push(Effect::Unpin(node));
			}
			effects.push(Effect::Hover(None));
			Idle
		}
	};

	let last_pointer = match event {
		PointerEvent::Down(p) | PointerEvent::Move(p) | PointerEvent::Up(p) => Some(p),
		PointerEvent::Wheel { at, .. } => Some(at),
		PointerEvent::Leave => None,
	};
	(InteractionState { mode, last_pointer }, effects)
}

/// Topmost node whose enlarged hit circle contains the screen point.
/// Later nodes are drawn on top, so they are tested first.
pub fn hit_test(
	nodes: &[SimNode],
	viewport: &Viewport,
	screen: Vec2,
	hit_factor: f64,
) -> Option<usize> {
	let world = viewport.screen_to_world(screen);
	nodes.iter().enumerate().rev().find_map(|(idx, node)| {
		let reach = node.radius * hit_factor;
		((node.position - world).length_sq() <= reach * reach).then_some(idx)
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ctx(hit: Option<(usize, Vec2)>, selected: Option<usize>) -> PointerContext {
		PointerContext {
			hit,
			scale: 1.0,
			selected,
			click_threshold: 5.0,
		}
	}

	fn run(
		state: InteractionState,
		event: PointerEvent,
		ctx: &PointerContext,
	) -> (InteractionState, Vec<Effect>) {
		transition(&state, event, ctx)
	}

	fn press(at: Vec2, ctx: &PointerContext) -> (InteractionState, Vec<Effect>) {
		run(InteractionState::default(), PointerEvent::Down(at), ctx)
	}

	#[test]
	fn click_on_node_selects_it() {
		let a = Some((3, Vec2::new(100.0, 100.0)));
		let (s, fx) = press(Vec2::new(10.0, 10.0), &ctx(a, None));
		assert_eq!(s.active_node(), Some(3));
		assert_eq!(fx, [Effect::Pin(3)]);

		let (s, _) = run(s, PointerEvent::Move(Vec2::new(12.0, 11.0)), &ctx(a, None));
		let (s, fx) = run(s, PointerEvent::Up(Vec2::new(12.0, 11.0)), &ctx(a, None));
		assert!(s.is_idle());
		let selects: Vec<_> = fx.iter().filter(|e| matches!(e, Effect::Select(_))).collect();
		assert_eq!(selects, [&Effect::Select(Some(3))]);
	}

	#[test]
	fn click_on_selected_node_deselects() {
		let a = Some((3, Vec2::new(100.0, 100.0)));
		let (s, _) = press(Vec2::new(10.0, 10.0), &ctx(a, Some(3)));
		let (_, fx) = run(s, PointerEvent::Up(Vec2::new(10.0, 10.0)), &ctx(a, Some(3)));
		assert!(fx.contains(&Effect::Select(None)));
	}

	#[test]
	fn drag_moves_node_without_selecting() {
		let a = Some((0, Vec2::new(100.0, 100.0)));
		let mut c = ctx(a, None);
		c.scale = 2.0;
		let (s, _) = press(Vec2::new(10.0, 10.0), &c);
		let (s, fx) = run(s, PointerEvent::Move(Vec2::new(30.0, 50.0)), &c);
		assert_eq!(
			fx,
			[Effect::MoveNode {
				node: 0,
				to: Vec2::new(110.0, 120.0)
			}]
		);
		let (s, fx) = run(s, PointerEvent::Up(Vec2::new(30.0, 50.0)), &c);
		assert!(s.is_idle());
		assert_eq!(fx, [Effect::Unpin(0)]);
	}

	#[test]
	fn drag_out_and_back_is_not_a_click() {
		let a = Some((0, Vec2::ZERO));
		let c = ctx(a, None);
		let (s, _) = press(Vec2::ZERO, &c);
		let (s, _) = run(s, PointerEvent::Move(Vec2::new(40.0, 0.0)), &c);
		let (s, _) = run(s, PointerEvent::Move(Vec2::new(1.0, 0.0)), &c);
		let (_, fx) = run(s, PointerEvent::Up(Vec2::new(1.0, 0.0)), &c);
		assert!(!fx.iter().any(|e| matches!(e, Effect::Select(_))));
	}

	#[test]
	fn background_drag_pans_by_deltas() {
		let c = ctx(None, None);
		let (s, fx) = press(Vec2::new(5.0, 5.0), &c);
		assert!(matches!(s.mode, InteractionMode::Panning { .. }));
		assert!(fx.is_empty());

		let (s, fx) = run(s, PointerEvent::Move(Vec2::new(15.0, 0.0)), &c);
		assert_eq!(fx, [Effect::Pan(Vec2::new(10.0, -5.0))]);
		let (s, fx) = run(s, PointerEvent::Move(Vec2::new(20.0, 2.0)), &c);
		assert_eq!(fx, [Effect::Pan(Vec2::new(5.0, 2.0))]);

		let (s, fx) = run(s, PointerEvent::Up(Vec2::new(20.0, 2.0)), &c);
		assert!(s.is_idle());
		assert!(fx.is_empty());
	}

	#[test]
	fn idle_move_only_hovers() {
		let (s, fx) = run(
			InteractionState::default(),
			PointerEvent::Move(Vec2::new(1.0, 1.0)),
			&ctx(Some((7, Vec2::ZERO)), None),
		);
		assert!(s.is_idle());
		assert_eq!(fx, [Effect::Hover(Some(7))]);
	}

	#[test]
	fn leave_resets_from_any_mode() {
		let a = Some((2, Vec2::ZERO));
		let (dragging, _) = press(Vec2::ZERO, &ctx(a, None));
		let (s, fx) = run(dragging, PointerEvent::Leave, &ctx(None, None));
		assert!(s.is_idle());
		assert_eq!(s.last_pointer, None);
		assert_eq!(fx, [Effect::Unpin(2), Effect::Hover(None)]);

		let (panning, _) = press(Vec2::ZERO, &ctx(None, None));
		let (s, fx) = run(panning, PointerEvent::Leave, &ctx(None, None));
		assert!(s.is_idle());
		assert!(!fx.iter().any(|e| matches!(e, Effect::Select(_))));
	}

	#[test]
	fn wheel_keeps_mode() {
		let (panning, _) = press(Vec2::ZERO, &ctx(None, None));
		let at = Vec2::new(3.0, 4.0);
		let wheel = PointerEvent::Wheel { at, delta_y: -1.0 };
		let (s, fx) = run(panning.clone(), wheel, &ctx(None, None));
		assert_eq!(s.mode, panning.mode);
		assert_eq!(fx, [Effect::Zoom { at, delta_y: -1.0 }]);
	}

	#[test]
	fn topmost_node_wins_hit_test() {
		let node = |x: f64| SimNode {
			position: Vec2::new(x, 0.0),
			radius: 10.0,
			..Default::default()
		};
		let nodes = vec![node(0.0), node(5.0), node(100.0)];
		let vp = Viewport::default();

		assert_eq!(hit_test(&nodes, &vp, Vec2::new(2.0, 0.0), 1.3), Some(1));
		assert_eq!(hit_test(&nodes, &vp, Vec2::new(-12.0, 0.0), 1.3), Some(0));
		assert_eq!(hit_test(&nodes, &vp, Vec2::new(50.0, 0.0), 1.3), None);
		// 12 units is outside the drawn radius but inside the forgiving hit area
		assert_eq!(hit_test(&nodes, &vp, Vec2::new(112.0, 0.0), 1.3), Some(2));
	}

	#[test]
	fn hit_test_uses_world_space() {
		let nodes = vec![SimNode {
			position: Vec2::new(100.0, 100.0),
			radius: 10.0,
			..Default::default()
		}];
		let vp = Viewport {
			pan: Vec2::new(50.0, 50.0),
			scale: 2.0,
			..Viewport::default()
		};
		assert_eq!(hit_test(&nodes, &vp, Vec2::new(250.0, 250.0), 1.0), Some(0));
		assert_eq!(hit_test(&nodes, &vp, Vec2::new(100.0, 100.0), 1.0), None);
	}
}
