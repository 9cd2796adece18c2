//! Barnes-Hut quadtree for approximate repulsion on large graphs.
//!
//! Cells far enough away (cell size / distance < theta) are treated as a
//! single body at their center of mass, giving O(n log n) per tick.

use super::types::Vec2;

/// Subdivision stops here; deeper cells keep several bodies as a bucket.
const MAX_DEPTH: usize = 24;

#[derive(Clone, Debug)]
struct Cell {
	center: Vec2,
	half: f64,
	mass: f64,
	mass_sum: Vec2,
	body: Option<usize>,
	children: Option<[usize; 4]>,
}

impl Cell {
	fn new(center: Vec2, half: f64) -> Self {
		Self {
			center,
			half,
			mass: 0.0,
			mass_sum: Vec2::ZERO,
			body: None,
			children: None,
		}
	}

	fn contains(&self, p: Vec2) -> bool {
		(p.x - self.center.x).abs() <= self.half && (p.y - self.center.y).abs() <= self.half
	}

	fn quadrant(&self, p: Vec2) -> usize {
		usize::from(p.x >= self.center.x) | (usize::from(p.y >= self.center.y) << 1)
	}
}

#[derive(Clone, Debug, Default)]
pub struct QuadTree {
	cells: Vec<Cell>,
	positions: Vec<Vec2>,
	/// Leaf cell each body ended up in.
	leaf_of: Vec<usize>,
}

impl QuadTree {
	pub fn build(positions: &[Vec2]) -> Self {
		let mut tree = Self {
			cells: Vec::with_capacity(positions.len() * 2),
			positions: positions.to_vec(),
			leaf_of: vec![0; positions.len()],
		};
		if positions.is_empty() {
			return tree;
		}

		let (mut min, mut max) = (positions[0], positions[0]);
		for p in positions {
			min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
			max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
		}
		let half = ((max.x - min.x).max(max.y - min.y) / 2.0) + 1.0;
		tree.cells.push(Cell::new((min + max) / 2.0, half));

		for (idx, &p) in positions.iter().enumerate() {
			tree.insert(idx, p);
		}
		tree
	}

	fn insert(&mut self, idx: usize, p: Vec2) {
		let mut cell = 0;
		let mut depth = 0;
		loop {
			self.cells[cell].mass += 1.0;
			self.cells[cell].mass_sum += p;

			if let Some(children) = self.cells[cell].children {
				cell = children[self.cells[cell].quadrant(p)];
				depth += 1;
				continue;
			}
			if self.cells[cell].mass == 1.0 {
				self.cells[cell].body = Some(idx);
				self.leaf_of[idx] = cell;
				return;
			}
			if depth >= MAX_DEPTH {
				self.leaf_of[idx] = cell;
				return;
			}

			// occupied leaf: split and push the resident body down one level
			let children = self.subdivide(cell);
			if let Some(resident) = self.cells[cell].body.take() {
				let rp = self.positions[resident];
				let child = children[self.cells[cell].quadrant(rp)];
				self.cells[child].mass = 1.0;
				self.cells[child].mass_sum = rp;
				self.cells[child].body = Some(resident);
				self.leaf_of[resident] = child;
			}
			cell = children[self.cells[cell].quadrant(p)];
			depth += 1;
		}
	}

	fn subdivide(&mut self, cell: usize) -> [usize; 4] {
		let (center, half) = (self.cells[cell].center, self.cells[cell].half / 2.0);
		let mut children = [0; 4];
		for (q, slot) in children.iter_mut().enumerate() {
			let dx = if q & 1 == 1 { half } else { -half };
			let dy = if q & 2 == 2 { half } else { -half };
			*slot = self.cells.len();
			self.cells.push(Cell::new(center + Vec2::new(dx, dy), half));
		}
		self.cells[cell].children = Some(children);
		children
	}

	/// Velocity change on body `idx` at `p` from every other body.
	pub fn repulsion_on(&self, idx: usize, p: Vec2, theta: f64, strength: f64) -> Vec2 {
		let mut total = Vec2::ZERO;
		if self.cells.is_empty() {
			return total;
		}
		let mut stack = vec![0];
		while let Some(ci) = stack.pop() {
			let cell = &self.cells[ci];
			if cell.mass == 0.0 {
				continue;
			}
			match cell.children {
				None => {
					let (mass, sum) = if self.leaf_of.get(idx) == Some(&ci) {
						(cell.mass - 1.0, cell.mass_sum - p)
					} else {
						(cell.mass, cell.mass_sum)
					};
					if mass > 0.0 {
						total += push(p, sum / mass, mass * strength, idx + ci);
					}
				}
				Some(children) => {
					let com = cell.mass_sum / cell.mass;
					let dist = p.distance(com);
					if !cell.contains(p) && dist > 0.0 && (cell.half * 2.0) / dist < theta {
						total += push(p, com, cell.mass * strength, idx + ci);
					} else {
						stack.extend(children);
					}
				}
			}
		}
		total
	}
}

fn push(p: Vec2, from: Vec2, strength: f64, salt: usize) -> Vec2 {
	let delta = p - from;
	let dist_sq = delta.length_sq();
	let dir = if dist_sq > 0.0 {
		delta / dist_sq.sqrt()
	} else {
		let angle = salt as f64 * 2.399_963_229_728_653;
		Vec2::new(angle.cos(), angle.sin())
	};
	dir * (strength / dist_sq.max(1.0))
}
