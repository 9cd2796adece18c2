use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::GraphConfig;
use super::error::GraphError;
use super::interaction::PointerEvent;
use super::render;
use super::simulation::LoopHandle;
use super::state::{ForceGraphState, NodeDetails};
use super::types::{GraphData, Vec2};

/// Longest frame step fed to the hover fade, so a background tab doesn't
/// jump the animation when it resumes.
const MAX_FRAME_DT: f64 = 0.1;

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, GraphError> {
	canvas
		.get_context("2d")
		.map_err(|e| GraphError::Canvas(format!("{e:?}")))?
		.ok_or_else(|| GraphError::Canvas("no 2d context".into()))?
		.dyn_into()
		.map_err(|_| GraphError::Canvas("context is not 2d".into()))
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Vec2> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Vec2::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Interactive force-directed view of an entity graph.
#[component]
pub fn ForceGraphCanvas(
	/// Snapshot to show; a new value reloads the graph and keeps the view.
	#[prop(into)]
	data: Signal<GraphData>,
	/// Layout, physics and drawing settings.
	#[prop(optional)]
	config: GraphConfig,
	/// Receives the id of a clicked node, or `None` when the selection is
	/// cleared.
	#[prop(optional, into)]
	on_select: Option<Callback<Option<String>>>,
	/// Like `on_select`, with the loaded node's label, color and degree.
	#[prop(optional, into)]
	on_inspect: Option<Callback<Option<NodeDetails>>>,
	/// Fill the window and follow its size.
	#[prop(default = false)]
	fullscreen: bool,
	/// Fixed width; the parent's width otherwise.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed height; the parent's height otherwise.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<ForceGraphState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let frame_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let (state_init, animate_init, resize_cb_init, frame_id_init) = (
		state.clone(),
		animate.clone(),
		resize_cb.clone(),
		frame_id.clone(),
	);

	let notify = move |selection: Option<String>, details: Option<NodeDetails>| {
		if let Some(on_select) = on_select {
			on_select.run(selection);
		}
		if let Some(on_inspect) = on_inspect {
			on_inspect.run(details);
		}
	};

	// the unmount hook must be Send: the loop is reached through its atomic
	// flag, the resize listener through a thread-local stored value
	let current_loop: StoredValue<Option<LoopHandle>> = StoredValue::new(None);
	let resize_listener = StoredValue::new_local(resize_cb.clone());
	on_cleanup(move || {
		if let Some(handle) = current_loop.try_get_value().flatten() {
			debug!("graph view unmounted, stopping animation loop");
			handle.cancel();
		}
		let listener = resize_listener
			.try_with_value(|slot| slot.borrow_mut().take())
			.flatten();
		if let (Some(cb), Some(window)) = (listener, web_sys::window()) {
			let _ =
				window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	});

	Effect::new(move |_| {
		let snapshot = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((config.width, config.height))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(config.width)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(config.height)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let mut ctx = match context_2d(&canvas) {
			Ok(ctx) => ctx,
			Err(e) => {
				warn!("{e}");
				return;
			}
		};

		// Stop the previous loop before its closure is replaced.
		if let Some(id) = frame_id_init.take() {
			let _ = window.cancel_animation_frame(id);
		}
		let cleared_selection = {
			let mut slot = state_init.borrow_mut();
			match slot.as_mut() {
				Some(s) => {
					let had_selection = s.selected.is_some();
					s.resize(w, h);
					s.load_snapshot(&snapshot);
					had_selection
				}
				None => {
					*slot = Some(ForceGraphState::new(
						&snapshot,
						config.clone().with_size(w, h),
					));
					false
				}
			}
		};
		if cleared_selection {
			notify(None, None);
		}
		let Some(handle) = state_init.borrow().as_ref().map(|s| s.loop_handle()) else {
			return;
		};
		current_loop.set_value(Some(handle.clone()));

		if fullscreen && resize_cb_init.borrow().is_none() {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let wants_frames = state_init
			.borrow()
			.as_ref()
			.is_some_and(|s| s.wants_frames());
		if !wants_frames {
			// empty graph: paint the background once, no loop
			if let Some(ref s) = *state_init.borrow() {
				render::render(s, &mut ctx);
			}
			return;
		}

		let (state_anim, animate_inner, frame_id_anim) =
			(state_init.clone(), animate_init.clone(), frame_id_init.clone());
		let mut last_ts: Option<f64> = None;
		*animate_init.borrow_mut() = Some(Closure::new(move |ts: f64| {
			if handle.is_cancelled() {
				debug!("animation loop cancelled");
				return;
			}
			let dt = last_ts.map_or(1.0 / 60.0, |prev| ((ts - prev) / 1000.0).min(MAX_FRAME_DT));
			last_ts = Some(ts);

			let keep_going = match *state_anim.borrow_mut() {
				Some(ref mut s) => {
					let keep_going = s.frame(dt);
					render::render(s, &mut ctx);
					keep_going
				}
				None => false,
			};
			if !keep_going {
				return;
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				if let Ok(id) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
					frame_id_anim.set(Some(id));
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				frame_id_init.set(Some(id));
			}
		}
		debug!("animation loop started at {}x{}", w, h);
	});

	let dispatch = {
		let state = state.clone();
		move |event: PointerEvent| {
			let changed = match *state.borrow_mut() {
				Some(ref mut s) => s.handle_pointer(event).map(|selection| {
					let details = selection.as_deref().and_then(|id| s.details(id));
					(selection, details)
				}),
				None => None,
			};
			if let Some((selection, details)) = changed {
				notify(selection, details);
			}
		}
	};

	let on_mousedown = {
		let dispatch = dispatch.clone();
		move |ev: MouseEvent| {
			if ev.button() != 0 {
				return;
			}
			if let Some(p) = canvas_point(canvas_ref, &ev) {
				dispatch(PointerEvent::Down(p));
			}
		}
	};

	let on_mousemove = {
		let dispatch = dispatch.clone();
		move |ev: MouseEvent| {
			if let Some(p) = canvas_point(canvas_ref, &ev) {
				dispatch(PointerEvent::Move(p));
			}
		}
	};

	let on_mouseup = {
		let dispatch = dispatch.clone();
		move |ev: MouseEvent| {
			if let Some(p) = canvas_point(canvas_ref, &ev) {
				dispatch(PointerEvent::Up(p));
			}
		}
	};

	let on_mouseleave = {
		let dispatch = dispatch.clone();
		move |_: MouseEvent| dispatch(PointerEvent::Leave)
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(at) = canvas_point(canvas_ref, &ev) {
			dispatch(PointerEvent::Wheel {
				at,
				delta_y: ev.delta_y(),
			});
		}
	};

	let on_dblclick = move |_: MouseEvent| {
		if let Some(ref mut s) = *state.borrow_mut() {
			s.reset_view();
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:dblclick=on_dblclick
			style="display: block; cursor: grab;"
		/>
	}
}
