use std::collections::HashMap;
use std::f64::consts::PI;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::GraphConfig;
use super::scale::radius_for_degree;
use super::simulation::{SimEdge, SimNode, SimulationState};
use super::types::{GraphData, Vec2};

/// Initial circle radius as a fraction of the smaller canvas side.
const START_RADIUS: f64 = 0.2;
/// Radial jitter as a fraction of the start radius, applied in both
/// directions so symmetric starts don't stall.
const JITTER: f64 = 0.05;
/// Perpendicular spacing between parallel edges.
const BEND_SPACING: f64 = 18.0;

/// Build simulation-ready nodes and edges from a raw snapshot.
///
/// Nodes are spread evenly on a circle around the canvas center. Edges with
/// an endpoint that does not name a node are dropped.
pub fn load(data: &GraphData, config: &GraphConfig) -> SimulationState {
	let mut rng = match config.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_entropy(),
	};

	let mut id_to_idx = HashMap::with_capacity(data.nodes.len());
	let mut nodes = Vec::with_capacity(data.nodes.len());
	let mut explicit_degree = Vec::with_capacity(data.nodes.len());
	for node in &data.nodes {
		if id_to_idx.contains_key(&node.id) {
			warn!("duplicate node id {:?} ignored", node.id);
			continue;
		}
		id_to_idx.insert(node.id.clone(), nodes.len());
		explicit_degree.push(node.degree);
		nodes.push(SimNode {
			id: node.id.clone(),
			label: node.label.clone().unwrap_or_else(|| node.id.clone()),
			category: node.category.clone(),
			description: node.description.clone(),
			degree: node.degree.unwrap_or(0),
			..Default::default()
		});
	}

	let mut edges = Vec::with_capacity(data.edges.len());
	let mut dropped = 0;
	for link in &data.edges {
		match (id_to_idx.get(&link.source), id_to_idx.get(&link.target)) {
			(Some(&source), Some(&target)) => edges.push(SimEdge {
				source,
				target,
				relation: link.relation.clone(),
				bend: 0.0,
			}),
			_ => {
				dropped += 1;
				warn!(
					"dropping edge {} -> {}: endpoint not in snapshot",
					link.source, link.target
				);
			}
		}
	}
	assign_bends(&mut edges);

	let mut counted = vec![0u32; nodes.len()];
	for edge in &edges {
		counted[edge.source] += 1;
		if edge.target != edge.source {
			counted[edge.target] += 1;
		}
	}
	for ((node, explicit), count) in nodes.iter_mut().zip(explicit_degree).zip(counted) {
		if explicit.is_none() {
			node.degree = count;
		}
	}
	let max_degree = nodes.iter().map(|n| n.degree).max().unwrap_or(0);

	let center = Vec2::new(config.width / 2.0, config.height / 2.0);
	let start = config.width.min(config.height) * START_RADIUS;
	let count = nodes.len();
	for (i, node) in nodes.iter_mut().enumerate() {
		let angle = i as f64 * 2.0 * PI / count as f64;
		let r = start * (1.0 + rng.gen_range(-JITTER..=JITTER));
		node.position = center + Vec2::new(angle.cos(), angle.sin()) * r;
		node.radius =
			radius_for_degree(node.degree, max_degree, config.min_radius, config.max_radius);
	}

	debug!(
		"loaded snapshot: {} nodes, {} edges ({} dropped)",
		nodes.len(),
		edges.len(),
		dropped
	);

	SimulationState {
		running: !nodes.is_empty(),
		nodes,
		edges,
		width: config.width,
		height: config.height,
	}
}

/// Spread edges joining the same unordered pair symmetrically around the
/// straight line.
fn assign_bends(edges: &mut [SimEdge]) {
	let mut groups: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
	for (i, e) in edges.iter().enumerate() {
		groups
			.entry((e.source.min(e.target), e.source.max(e.target)))
			.or_default()
			.push(i);
	}
	for members in groups.values() {
		let mid = (members.len() as f64 - 1.0) / 2.0;
		for (k, &i) in members.iter().enumerate() {
			let offset = (k as f64 - mid) * BEND_SPACING;
			// bends are measured against the low→high index direction
			edges[i].bend = if edges[i].source <= edges[i].target {
				offset
			} else {
				-offset
			};
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn config() -> GraphConfig {
		GraphConfig::default().with_size(500.0, 500.0).with_seed(7)
	}

	#[test]
	fn dangling_edge_is_dropped() {
		let data = GraphData {
			nodes: vec![GraphNode::new("X", "PERSON")],
			edges: vec![GraphLink::new("X", "Y")],
		};
		let sim = load(&data, &config());
		assert_eq!(sim.nodes.len(), 1);
		assert!(sim.edges.is_empty());
	}

	#[test]
	fn only_resolvable_edges_survive() {
		let data = GraphData {
			nodes: ["a", "b", "c"]
				.into_iter()
				.map(|id| GraphNode::new(id, "CONCEPT"))
				.collect(),
			edges: vec![
				GraphLink::new("a", "b"),
				GraphLink::new("ghost", "b"),
				GraphLink::new("b", "c"),
				GraphLink::new("c", "nowhere"),
			],
		};
		let sim = load(&data, &config());
		let pairs: Vec<_> = sim.edges.iter().map(|e| (e.source, e.target)).collect();
		assert_eq!(pairs, [(0, 1), (1, 2)]);
	}

	#[test]
	fn degree_defaults_to_resolved_edge_count() {
		let mut hub = GraphNode::new("hub", "ORGANIZATION");
		hub.label = Some("Hub".into());
		let mut fixed = GraphNode::new("fixed", "PERSON");
		fixed.degree = Some(40);
		let data = GraphData {
			nodes: vec![hub, GraphNode::new("leaf", "PERSON"), fixed],
			edges: vec![
				GraphLink::new("hub", "leaf"),
				GraphLink::new("hub", "fixed"),
				GraphLink::new("hub", "missing"),
			],
		};
		let sim = load(&data, &config());

		assert_eq!(sim.nodes[0].degree, 2);
		assert_eq!(sim.nodes[1].degree, 1);
		assert_eq!(sim.nodes[2].degree, 40);
		assert_eq!(sim.nodes[0].label, "Hub");
		assert_eq!(sim.nodes[1].label, "leaf");
		assert!(sim.nodes[2].radius >= sim.nodes[0].radius);
		assert!(sim.nodes[0].radius >= sim.nodes[1].radius);
	}

	#[test]
	fn nodes_start_on_jittered_circle() {
		let data = GraphData {
			nodes: (0..12)
				.map(|i| GraphNode::new(i.to_string(), "CONCEPT"))
				.collect(),
			edges: vec![],
		};
		let sim = load(&data, &config());
		let center = Vec2::new(250.0, 250.0);
		for node in &sim.nodes {
			let r = node.position.distance(center);
			assert!((95.0..=105.0).contains(&r), "radius {r}");
			assert_eq!(node.velocity, Vec2::ZERO);
		}
		assert!(sim.running);
	}

	#[test]
	fn same_seed_same_layout() {
		let data = GraphData {
			nodes: (0..5)
				.map(|i| GraphNode::new(i.to_string(), "CONCEPT"))
				.collect(),
			edges: vec![],
		};
		let a = load(&data, &config());
		let b = load(&data, &config());
		for (x, y) in a.nodes.iter().zip(&b.nodes) {
			assert_eq!(x.position, y.position);
		}
	}

	#[test]
	fn empty_graph_is_not_running() {
		let sim = load(&GraphData::default(), &config());
		assert!(sim.is_empty());
		assert!(!sim.running);
	}

	#[test]
	fn parallel_edges_bend_apart() {
		let data = GraphData {
			nodes: vec![GraphNode::new("a", "X"), GraphNode::new("b", "X")],
			edges: vec![
				GraphLink::new("a", "b"),
				GraphLink::new("b", "a"),
				GraphLink::new("a", "b"),
			],
		};
		let sim = load(&data, &config());
		let canonical: Vec<f64> = sim
			.edges
			.iter()
			.map(|e| if e.source <= e.target { e.bend } else { -e.bend })
			.collect();
		assert_eq!(canonical, [-BEND_SPACING, 0.0, BEND_SPACING]);
	}
}
