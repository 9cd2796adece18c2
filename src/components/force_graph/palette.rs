use std::collections::HashMap;

use super::config::{DEFAULT_PALETTE, GraphConfig};

/// Category → color registry.
///
/// Categories get palette entries in first-seen order and keep them for as
/// long as the registry lives, across snapshot reloads.
#[derive(Clone, Debug, Default)]
pub struct CategoryPalette {
	colors: HashMap<String, String>,
	order: Vec<String>,
	next: usize,
}

impl CategoryPalette {
	/// Fresh registry holding `categories`.
	pub fn build<'a>(categories: impl IntoIterator<Item = &'a str>, config: &GraphConfig) -> Self {
		let mut registry = Self::default();
		registry.assign(categories, config);
		registry
	}

	/// Give every category not seen before the next palette slot. Known
	/// categories keep their color.
	pub fn assign<'a>(
		&mut self,
		categories: impl IntoIterator<Item = &'a str>,
		config: &GraphConfig,
	) {
		let palette: Vec<&str> = if config.palette.is_empty() {
			DEFAULT_PALETTE.to_vec()
		} else {
			config.palette.iter().map(String::as_str).collect()
		};
		for category in categories {
			if self.colors.contains_key(category) {
				continue;
			}
			let color = match config.palette_overrides.get(category) {
				Some(color) => color.clone(),
				None => {
					let color = palette[self.next % palette.len()].to_string();
					self.next += 1;
					color
				}
			};
			self.order.push(category.to_string());
			self.colors.insert(category.to_string(), color);
		}
	}

	/// Color of a category; unknown ones get the last default color.
	pub fn color_for(&self, category: &str) -> &str {
		self.colors
			.get(category)
			.map(String::as_str)
			.unwrap_or(DEFAULT_PALETTE[DEFAULT_PALETTE.len() - 1])
	}

	/// Categories with their colors, in assignment order (for legends).
	pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
		self.order
			.iter()
			.map(|c| (c.as_str(), self.colors[c].as_str()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_seen_order_is_stable() {
		let config = GraphConfig::default();
		let palette = CategoryPalette::build(
			["PERSON", "ORGANIZATION", "PERSON", "LOCATION"],
			&config,
		);

		assert_eq!(palette.color_for("PERSON"), DEFAULT_PALETTE[0]);
		assert_eq!(palette.color_for("ORGANIZATION"), DEFAULT_PALETTE[1]);
		assert_eq!(palette.color_for("LOCATION"), DEFAULT_PALETTE[2]);
		assert_eq!(palette.color_for("PERSON"), palette.color_for("PERSON"));
		let order: Vec<_> = palette.entries().map(|(c, _)| c).collect();
		assert_eq!(order, ["PERSON", "ORGANIZATION", "LOCATION"]);
	}

	#[test]
	fn overrides_do_not_consume_palette_slots() {
		let mut config = GraphConfig::default();
		config
			.palette_overrides
			.insert("CONCEPT".into(), "#000000".into());
		let palette = CategoryPalette::build(["CONCEPT", "PERSON"], &config);

		assert_eq!(palette.color_for("CONCEPT"), "#000000");
		assert_eq!(palette.color_for("PERSON"), DEFAULT_PALETTE[0]);
	}

	#[test]
	fn palette_wraps_around() {
		let mut config = GraphConfig::default();
		config.palette = vec!["red".into(), "blue".into()];
		let palette = CategoryPalette::build(["a", "b", "c"], &config);
		assert_eq!(palette.color_for("c"), "red");
	}

	#[test]
	fn assigning_again_keeps_known_colors() {
		let config = GraphConfig::default();
		let mut palette = CategoryPalette::build(["PERSON", "ORGANIZATION"], &config);
		palette.assign(["ORGANIZATION", "LOCATION", "PERSON"], &config);

		assert_eq!(palette.color_for("PERSON"), DEFAULT_PALETTE[0]);
		assert_eq!(palette.color_for("ORGANIZATION"), DEFAULT_PALETTE[1]);
		assert_eq!(palette.color_for("LOCATION"), DEFAULT_PALETTE[2]);
	}
}
