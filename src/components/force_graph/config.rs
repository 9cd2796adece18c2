use std::collections::HashMap;

use serde::Deserialize;

/// Category colors used when the config does not supply its own.
pub const DEFAULT_PALETTE: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Physics coefficients. All forces are applied as per-tick velocity changes.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForceParams {
	/// Pull toward the canvas center, proportional to displacement.
	pub gravity: f64,
	/// Inverse-square repulsion between every node pair.
	pub repulsion: f64,
	/// Spring stiffness along edges.
	pub spring: f64,
	/// Edge length at which a spring exerts no force.
	pub rest_length: f64,
	/// Velocity multiplier per tick, must stay below 1.
	pub damping: f64,
	/// Distance kept between nodes and the canvas border.
	pub margin: f64,
	/// Above this many nodes repulsion switches to Barnes-Hut.
	pub barnes_hut_threshold: usize,
	/// Barnes-Hut opening angle; smaller is more exact.
	pub theta: f64,
}

impl Default for ForceParams {
	fn default() -> Self {
		Self {
			gravity: 0.0005,
			repulsion: 800.0,
			spring: 0.003,
			rest_length: 100.0,
			damping: 0.85,
			margin: 20.0,
			barnes_hut_threshold: 300,
			theta: 0.8,
		}
	}
}

/// How the layout is advanced.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
	/// Simulation advances once per animation frame.
	#[default]
	Continuous,
	/// Fixed number of cooled iterations computed at load time.
	Bounded {
		/// Number of cooled steps.
		iterations: usize,
	},
}

/// Everything the hosting view can tune about the graph canvas.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphConfig {
	/// Canvas width in CSS pixels.
	pub width: f64,
	/// Canvas height in CSS pixels.
	pub height: f64,
	/// Colors handed out to categories in first-seen order.
	pub palette: Vec<String>,
	/// Fixed category colors that bypass the rotating palette.
	pub palette_overrides: HashMap<String, String>,
	/// Smallest zoom factor.
	pub min_scale: f64,
	/// Largest zoom factor.
	pub max_scale: f64,
	/// Multiplicative zoom per wheel notch.
	pub zoom_step: f64,
	/// Draw node labels once zoomed past `label_zoom_threshold`.
	pub show_node_labels: bool,
	/// Draw relation labels once zoomed past `edge_label_zoom_threshold`.
	pub show_edge_labels: bool,
	/// Continuous or bounded layout.
	pub layout_mode: LayoutMode,
	/// Physics coefficients.
	pub forces: ForceParams,
	/// Hit area radius as a multiple of the drawn radius.
	pub hit_factor: f64,
	/// Screen-space travel below which a drag counts as a click.
	pub click_threshold: f64,
	/// Radius of the least connected node.
	pub min_radius: f64,
	/// Radius of the most connected node.
	pub max_radius: f64,
	/// Node labels longer than this are truncated with an ellipsis.
	pub label_max_chars: usize,
	/// Minimum zoom for node labels.
	pub label_zoom_threshold: f64,
	/// Minimum zoom for edge labels.
	pub edge_label_zoom_threshold: f64,
	/// Seed for the initial layout jitter; `None` draws from entropy.
	pub seed: Option<u64>,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 600.0,
			palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
			palette_overrides: HashMap::new(),
			min_scale: 0.1,
			max_scale: 5.0,
			zoom_step: 1.1,
			show_node_labels: true,
			show_edge_labels: true,
			layout_mode: LayoutMode::Continuous,
			forces: ForceParams::default(),
			hit_factor: 1.3,
			click_threshold: 5.0,
			min_radius: 4.0,
			max_radius: 16.0,
			label_max_chars: 18,
			label_zoom_threshold: 0.6,
			edge_label_zoom_threshold: 1.2,
			seed: None,
		}
	}
}

impl GraphConfig {
	/// Same config for a canvas of the given size.
	pub fn with_size(mut self, width: f64, height: f64) -> Self {
		self.width = width;
		self.height = height;
		self
	}

	/// Make the initial layout reproducible.
	pub fn with_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}
}
