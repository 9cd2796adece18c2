//! Size and text scaling helpers shared by the loader and the renderer.

/// Square-root radius scale so hubs stay readable without swallowing
/// their neighbours. Monotonic non-decreasing in `degree`.
pub fn radius_for_degree(degree: u32, max_degree: u32, min_radius: f64, max_radius: f64) -> f64 {
	if max_degree == 0 {
		return min_radius;
	}
	let t = (degree.min(max_degree) as f64 / max_degree as f64).sqrt();
	min_radius + (max_radius - min_radius) * t
}

/// Cut a label to `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
	if label.chars().count() <= max_chars {
		return label.to_string();
	}
	let mut out: String = label.chars().take(max_chars.saturating_sub(1)).collect();
	out.push('…');
	out
}
