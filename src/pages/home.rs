use leptos::prelude::*;
use log::warn;

use crate::components::force_graph::{ForceGraphCanvas, GraphConfig, GraphData, NodeDetails};

/// Sample payload in the shape the graph endpoint returns. The last edge
/// points at an entity that isn't in the snapshot and is dropped on load.
const SAMPLE_PAYLOAD: &str = r#"{
	"nodes": [
		{"id": "Ada Lovelace", "type": "PERSON", "description": "Mathematician, wrote the first published algorithm"},
		{"id": "Charles Babbage", "type": "PERSON", "description": "Designed the Analytical Engine"},
		{"id": "Analytical Engine", "type": "TECHNOLOGY"},
		{"id": "Difference Engine", "type": "TECHNOLOGY"},
		{"id": "Royal Society", "type": "ORGANIZATION"},
		{"id": "London", "type": "LOCATION"},
		{"id": "Bernoulli numbers", "type": "CONCEPT"},
		{"id": "Note G", "label": "Note G (1843)", "entity_type": "PRODUCT", "description": "Ada's notes on the Analytical Engine"},
		{"id": "Luigi Menabrea", "type": "PERSON"},
		{"id": "Jacquard loom", "type": "TECHNOLOGY"}
	],
	"edges": [
		{"source": "Ada Lovelace", "target": "Charles Babbage", "relation": "RELATED_TO"},
		{"source": "Ada Lovelace", "target": "Note G", "relation": "CREATED_BY"},
		{"source": "Note G", "target": "Analytical Engine", "relation": "PART_OF"},
		{"source": "Note G", "target": "Bernoulli numbers", "relation": "USES"},
		{"source": "Charles Babbage", "target": "Analytical Engine", "relation": "CREATED_BY"},
		{"source": "Charles Babbage", "target": "Difference Engine", "relation": "CREATED_BY"},
		{"source": "Charles Babbage", "target": "Royal Society", "relation": "PART_OF"},
		{"source": "Charles Babbage", "target": "London", "relation": "LOCATED_IN"},
		{"source": "Ada Lovelace", "target": "London", "relation": "LOCATED_IN"},
		{"source": "Luigi Menabrea", "target": "Analytical Engine", "relation": "RELATED_TO"},
		{"source": "Ada Lovelace", "target": "Luigi Menabrea", "relation": "RELATED_TO"},
		{"source": "Analytical Engine", "target": "Jacquard loom", "relation": "DEPENDS_ON"},
		{"source": "Difference Engine", "target": "Science Museum", "relation": "LOCATED_IN"}
	]
}"#;

fn sample_data() -> GraphData {
	GraphData::from_json(SAMPLE_PAYLOAD).unwrap_or_else(|e| {
		warn!("{e}");
		GraphData::default()
	})
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(sample_data);
	let (inspected, set_inspected) = signal(None::<NodeDetails>);
	let on_inspect = Callback::new(move |node: Option<NodeDetails>| set_inspected.set(node));

	let details = move || {
		inspected.get().map(|node| {
			view! {
				<aside class="graph-details">
					<h2>{node.label}</h2>
					<p class="category" style=format!("color: {}", node.color)>
						{node.category}
					</p>
					<p>{format!("{} relations", node.degree)}</p>
					{node.description.map(|d| view! { <p class="description">{d}</p> })}
				</aside>
			}
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas
					data=graph_data
					config=GraphConfig::default()
					on_inspect=on_inspect
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Entity Graph"</h1>
					<p class="subtitle">
						"Click a node for details. Drag nodes to reposition. Scroll to zoom, drag background to pan, double-click to reset."
					</p>
				</div>
				{details}
			</div>
		</ErrorBoundary>
	}
}
