use super::types::Vec2;

/// Pan/zoom transform: `screen = world * scale + pan`.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	/// Screen offset of the world origin.
	pub pan: Vec2,
	/// Zoom factor.
	pub scale: f64,
	/// Lower zoom bound.
	pub min_scale: f64,
	/// Upper zoom bound.
	pub max_scale: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(DEFAULT_MIN_SCALE, DEFAULT_MAX_SCALE)
	}
}

impl Viewport {
	/// Inverted bounds are swapped; non-finite or non-positive ones fall back
	/// to the default range.
	pub fn new(min_scale: f64, max_scale: f64) -> Self {
		let (min_scale, max_scale) = normalize_range(min_scale, max_scale);
		Self {
			pan: Vec2::ZERO,
			scale: 1.0_f64.clamp(min_scale, max_scale),
			min_scale,
			max_scale,
		}
	}

	/// World point under a screen point.
	pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
		(screen - self.pan) / self.scale
	}

	/// Screen point of a world point.
	pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
		world * self.scale + self.pan
	}

	/// Zoom to `new_scale` (clamped) keeping the world point under `anchor`
	/// fixed on screen.
	pub fn zoom_at(&mut self, anchor: Vec2, new_scale: f64) {
		if !new_scale.is_finite() {
			return;
		}
		let new_scale = new_scale.clamp(self.min_scale, self.max_scale);
		let ratio = new_scale / self.scale;
		self.pan = anchor - (anchor - self.pan) * ratio;
		self.scale = new_scale;
	}

	/// Zoom by one wheel step. Positive `delta_y` (scrolling down) zooms out.
	pub fn wheel(&mut self, anchor: Vec2, delta_y: f64, step: f64) {
		let factor = if delta_y > 0.0 { 1.0 / step } else { step };
		self.zoom_at(anchor, self.scale * factor);
	}

	/// Pan is never clamped; the view can drift arbitrarily far.
	pub fn pan_by(&mut self, delta: Vec2) {
		self.pan += delta;
	}

	/// No pan, unit zoom (clamped to the range).
	pub fn reset(&mut self) {
		self.pan = Vec2::ZERO;
		self.scale = 1.0_f64.clamp(self.min_scale, self.max_scale);
	}
}

const DEFAULT_MIN_SCALE: f64 = 0.1;
const DEFAULT_MAX_SCALE: f64 = 5.0;

fn normalize_range(min_scale: f64, max_scale: f64) -> (f64, f64) {
	let usable = |s: f64| s.is_finite() && s > 0.0;
	let min_scale = if usable(min_scale) { min_scale } else { DEFAULT_MIN_SCALE };
	let max_scale = if usable(max_scale) { max_scale } else { DEFAULT_MAX_SCALE };
	if min_scale <= max_scale {
		(min_scale, max_scale)
	} else {
		(max_scale, min_scale)
	}
}
