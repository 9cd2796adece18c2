use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

use serde::Deserialize;

use super::error::GraphError;

/// A node as delivered by the graph endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphNode {
	/// Unique entity name.
	pub id: String,
	/// Display text; the id is shown when absent.
	#[serde(default)]
	pub label: Option<String>,
	/// Entity type, `UNKNOWN` when the payload has none.
	#[serde(default = "unknown_category", alias = "type", alias = "entity_type")]
	pub category: String,
	/// Connection count reported by the backend.
	#[serde(default)]
	pub degree: Option<u32>,
	/// Free-text summary of the entity.
	#[serde(default)]
	pub description: Option<String>,
}

/// An edge as delivered by the graph endpoint, referring to nodes by id.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphLink {
	/// Id of the tail node.
	pub source: String,
	/// Id of the head node.
	pub target: String,
	/// Relation text; the LightRAG endpoint sends it as `label`.
	#[serde(default, alias = "label")]
	pub relation: Option<String>,
}

/// Raw graph snapshot: `{ nodes: [...], edges: [...] }`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	/// Entities.
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	/// Relations; accepts `links` as well.
	#[serde(default, alias = "links")]
	pub edges: Vec<GraphLink>,
}

fn unknown_category() -> String {
	"UNKNOWN".into()
}

impl GraphNode {
	/// Node with only an id and a category.
	pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			category: category.into(),
			..Default::default()
		}
	}
}

impl GraphLink {
	/// Unlabelled edge between two ids.
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			relation: None,
		}
	}
}

impl GraphData {
	/// Parse a payload as returned by the backend. Only the JSON shape is
	/// checked here; dangling edges are filtered later by the loader.
	pub fn from_json(text: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(text)?)
	}

	/// No nodes at all.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// 2D point or displacement, used for both world and screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
	/// Horizontal component.
	pub x: f64,
	/// Vertical component, growing downward.
	pub y: f64,
}

impl Vec2 {
	/// The origin.
	pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

	/// Vector from components.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Squared length, cheaper than `length`.
	pub fn length_sq(self) -> f64 {
		self.x * self.x + self.y * self.y
	}

	/// Euclidean length.
	pub fn length(self) -> f64 {
		self.length_sq().sqrt()
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Self) -> f64 {
		(other - self).length()
	}

	/// Rotated 90° counter-clockwise.
	pub fn perp(self) -> Self {
		Self::new(-self.y, self.x)
	}
}

impl Add for Vec2 {
	type Output = Self;
	fn add(self, rhs: Self) -> Self {
		Self::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl AddAssign for Vec2 {
	fn add_assign(&mut self, rhs: Self) {
		self.x += rhs.x;
		self.y += rhs.y;
	}
}

impl Sub for Vec2 {
	type Output = Self;
	fn sub(self, rhs: Self) -> Self {
		Self::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl SubAssign for Vec2 {
	fn sub_assign(&mut self, rhs: Self) {
		self.x -= rhs.x;
		self.y -= rhs.y;
	}
}

impl Mul<f64> for Vec2 {
	type Output = Self;
	fn mul(self, k: f64) -> Self {
		Self::new(self.x * k, self.y * k)
	}
}

impl Div<f64> for Vec2 {
	type Output = Self;
	fn div(self, k: f64) -> Self {
		Self::new(self.x / k, self.y / k)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_both_backend_shapes() {
		let data = GraphData::from_json(
			r#"{
				"nodes": [
					{"id": "Ada", "type": "PERSON", "degree": 3},
					{"id": "Acme", "label": "Acme Corp", "entity_type": "ORGANIZATION", "description": "widgets"},
					{"id": "bare"}
				],
				"edges": [
					{"id": "Ada->Acme", "source": "Ada", "target": "Acme", "relation": "WORKS_FOR"},
					{"source": "Acme", "target": "bare"}
				]
			}"#,
		)
		.unwrap();

		assert_eq!(data.nodes.len(), 3);
		assert_eq!(data.nodes[0].category, "PERSON");
		assert_eq!(data.nodes[0].degree, Some(3));
		assert_eq!(data.nodes[1].category, "ORGANIZATION");
		assert_eq!(data.nodes[1].label.as_deref(), Some("Acme Corp"));
		assert_eq!(data.nodes[1].description.as_deref(), Some("widgets"));
		assert_eq!(data.nodes[2].category, "UNKNOWN");
		assert_eq!(data.edges[0].relation.as_deref(), Some("WORKS_FOR"));
		assert_eq!(data.edges[1].relation, None);
	}

	#[test]
	fn lightrag_edge_label_is_the_relation() {
		let data = GraphData::from_json(
			r#"{"nodes": [], "edges": [
				{"id": "a-b", "source": "a", "target": "b", "label": "works at", "weight": 1.0}
			]}"#,
		)
		.unwrap();
		assert_eq!(data.edges[0].relation.as_deref(), Some("works at"));
	}

	#[test]
	fn missing_arrays_are_empty() {
		let data = GraphData::from_json("{}").unwrap();
		assert!(data.is_empty());
		assert!(data.edges.is_empty());
	}

	#[test]
	fn malformed_text_is_an_error() {
		assert!(matches!(
			GraphData::from_json("{\"nodes\": 4"),
			Err(GraphError::Payload(_))
		));
	}
}
