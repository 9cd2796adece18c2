use thiserror::Error;

/// Failures at the edges of the graph view. The engine itself never fails:
/// dangling edges are dropped and empty graphs are valid.
#[derive(Debug, Error)]
pub enum GraphError {
	/// The payload is not valid graph JSON.
	#[error("invalid graph payload: {0}")]
	Payload(#[from] serde_json::Error),
	/// No usable 2D context.
	#[error("canvas unavailable: {0}")]
	Canvas(String),
}
