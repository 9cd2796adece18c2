//! Force-directed layout engine.
//!
//! Each step applies, as velocity changes: a pull toward the canvas center,
//! inverse-square repulsion between node pairs, and springs along edges.
//! Velocities are then damped and integrated. A node being dragged is pinned:
//! it still pushes and pulls its neighbours but is never moved by the
//! simulation and keeps zero velocity.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use super::config::ForceParams;
use super::quadtree::QuadTree;
use super::types::Vec2;

/// Golden angle, used to spread coincident pairs in distinct directions.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// A node as the simulation sees it.
#[derive(Clone, Debug, Default)]
pub struct SimNode {
	/// Entity id from the payload.
	pub id: String,
	/// Display label, the id when the payload has none.
	pub label: String,
	/// Entity type, keys the palette.
	pub category: String,
	/// Free-text summary.
	pub description: Option<String>,
	/// Reported degree, or the number of kept edges touching the node.
	pub degree: u32,
	/// World position.
	pub position: Vec2,
	/// World units per tick.
	pub velocity: Vec2,
	/// Drawn radius in world units.
	pub radius: f64,
	/// Held by the pointer.
	pub pinned: bool,
}

/// Edge resolved to node indices.
#[derive(Clone, Debug)]
pub struct SimEdge {
	/// Index of the tail node.
	pub source: usize,
	/// Index of the head node.
	pub target: usize,
	/// Relation label.
	pub relation: Option<String>,
	/// Perpendicular offset (world units) of the curve midpoint, nonzero
	/// only when several edges join the same pair of nodes.
	pub bend: f64,
}

/// Nodes, edges and canvas bounds of one loaded snapshot.
#[derive(Clone, Debug, Default)]
pub struct SimulationState {
	/// Nodes in payload order.
	pub nodes: Vec<SimNode>,
	/// Edges whose endpoints both resolved.
	pub edges: Vec<SimEdge>,
	/// Whether frames still advance the layout.
	pub running: bool,
	/// Canvas width.
	pub width: f64,
	/// Canvas height.
	pub height: f64,
}

impl SimulationState {
	/// No nodes loaded.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Gravity target.
	pub fn center(&self) -> Vec2 {
		Vec2::new(self.width / 2.0, self.height / 2.0)
	}

	/// Index of the node with this id.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|n| n.id == id)
	}

	/// Nodes sharing an edge with `idx`.
	pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
		self.edges.iter().filter_map(move |e| {
			if e.source == idx {
				Some(e.target)
			} else if e.target == idx {
				Some(e.source)
			} else {
				None
			}
		})
	}

	/// Sum of node speeds.
	pub fn total_speed(&self) -> f64 {
		self.nodes.iter().map(|n| n.velocity.length()).sum()
	}

	/// One live animation step at full force.
	pub fn tick(&mut self, params: &ForceParams) {
		self.step(params, 1.0);
	}

	/// Fixed-iteration layout with forces cooled linearly to zero.
	/// Terminates deterministically and leaves every node at rest.
	pub fn run_bounded(&mut self, params: &ForceParams, iterations: usize) {
		for i in 0..iterations {
			let alpha = 1.0 - i as f64 / iterations as f64;
			self.step(params, alpha);
		}
		for node in &mut self.nodes {
			node.velocity = Vec2::ZERO;
		}
		debug!(
			"bounded layout finished: {} iterations over {} nodes",
			iterations,
			self.nodes.len()
		);
	}

	fn step(&mut self, params: &ForceParams, alpha: f64) {
		if self.nodes.is_empty() {
			return;
		}
		let center = self.center();

		for node in &mut self.nodes {
			node.velocity += (center - node.position) * (params.gravity * alpha);
		}

		if self.nodes.len() > params.barnes_hut_threshold {
			self.apply_approximate_repulsion(params, alpha);
		} else {
			self.apply_pairwise_repulsion(params, alpha);
		}

		for edge in &self.edges {
			if edge.source == edge.target {
				continue;
			}
			let delta = self.nodes[edge.target].position - self.nodes[edge.source].position;
			let dist = delta.length();
			if dist < 1e-9 {
				continue;
			}
			let pull = delta / dist * (params.spring * (dist - params.rest_length) * alpha);
			self.nodes[edge.source].velocity += pull;
			self.nodes[edge.target].velocity -= pull;
		}

		let (min, max) = (
			Vec2::new(params.margin, params.margin),
			Vec2::new(self.width - params.margin, self.height - params.margin),
		);
		for node in &mut self.nodes {
			if node.pinned {
				node.velocity = Vec2::ZERO;
				continue;
			}
			node.velocity = node.velocity * params.damping;
			node.position += node.velocity;
			node.position = Vec2::new(
				clamp_axis(node.position.x, min.x, max.x),
				clamp_axis(node.position.y, min.y, max.y),
			);
		}
	}

	fn apply_pairwise_repulsion(&mut self, params: &ForceParams, alpha: f64) {
		let n = self.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let delta = self.nodes[j].position - self.nodes[i].position;
				let dist_sq = delta.length_sq();
				let dir = if dist_sq > 0.0 {
					delta / dist_sq.sqrt()
				} else {
					let angle = (i + j) as f64 * GOLDEN_ANGLE;
					Vec2::new(angle.cos(), angle.sin())
				};
				let push = dir * (params.repulsion * alpha / dist_sq.max(1.0));
				self.nodes[i].velocity -= push;
				self.nodes[j].velocity += push;
			}
		}
	}

	fn apply_approximate_repulsion(&mut self, params: &ForceParams, alpha: f64) {
		let positions: Vec<Vec2> = self.nodes.iter().map(|n| n.position).collect();
		let tree = QuadTree::build(&positions);
		for (i, node) in self.nodes.iter_mut().enumerate() {
			node.velocity +=
				tree.repulsion_on(i, positions[i], params.theta, params.repulsion * alpha);
		}
	}
}

fn clamp_axis(v: f64, lo: f64, hi: f64) -> f64 {
	if lo > hi { (lo + hi) / 2.0 } else { v.clamp(lo, hi) }
}

/// Cancellation flag shared between the owner of a simulation and the
/// animation loop driving it. Once cancelled, a loop must not reschedule.
#[derive(Clone, Debug, Default)]
pub struct LoopHandle {
	cancelled: Arc<AtomicBool>,
}

impl LoopHandle {
	/// Stop every loop holding this handle.
	pub fn cancel(&self) {
		self.cancelled.store(true, Ordering::Relaxed);
	}

	/// Whether `cancel` has been called.
	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::Relaxed)
	}
}
