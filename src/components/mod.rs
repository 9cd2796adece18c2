/// Force-directed graph canvas.
pub mod force_graph;
