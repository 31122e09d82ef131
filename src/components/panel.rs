//! Detail panel and hover tooltip fed by the graphs' node events.

use std::sync::Arc;

use leptos::prelude::*;
use web_sys::MouseEvent;

use crate::components::atlas::{
	GraphKind, HierarchyData, HierarchyNode, NodeEvents, RingData, Status, with_alpha,
};

/// Child descriptions in the tooltip are cut to this many characters.
pub const TOOLTIP_DESCRIPTION_CHARS: usize = 100;

const ACCENT: &str = "#c9a84c";

/// The node whose details are open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
	pub graph: GraphKind,
	pub id: String,
}

impl Selection {
	pub fn hierarchy(id: impl Into<String>) -> Self {
		Self {
			graph: GraphKind::Hierarchy,
			id: id.into(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub x: f64,
	pub y: f64,
	pub title: String,
	pub body: String,
}

fn excerpt(text: &str, max_chars: usize) -> String {
	match text.char_indices().nth(max_chars) {
		Some((cut, _)) => format!("{}...", &text[..cut]),
		None => text.to_string(),
	}
}

/// Title and body for a hovered branch-map node.
pub fn hierarchy_tooltip(data: &HierarchyData, id: &str) -> Option<(String, String)> {
	let node = data.node(id)?;
	let body = match node {
		HierarchyNode::Branch { branch, .. } => format!("{} sub-topics", branch.children.len()),
		HierarchyNode::Child { child, .. } => excerpt(&child.description, TOOLTIP_DESCRIPTION_CHARS),
	};
	Some((node.info().label.clone(), body))
}

fn status_name(status: Status) -> &'static str {
	match status {
		Status::Scaffold => "scaffold",
		Status::Draft => "draft",
		Status::Researched => "researched",
		Status::Published => "published",
	}
}

/// Routes a graph's clicks into the shared selection and its hovers into the
/// tooltip.
#[derive(Clone)]
pub struct PanelEvents {
	graph: GraphKind,
	hierarchy: Arc<HierarchyData>,
	selection: RwSignal<Option<Selection>>,
	tooltip: RwSignal<Option<Tooltip>>,
}

impl PanelEvents {
	pub fn new(
		graph: GraphKind,
		hierarchy: Arc<HierarchyData>,
		selection: RwSignal<Option<Selection>>,
		tooltip: RwSignal<Option<Tooltip>>,
	) -> Self {
		Self {
			graph,
			hierarchy,
			selection,
			tooltip,
		}
	}
}

impl NodeEvents for PanelEvents {
	type Event = MouseEvent;

	fn node_clicked(&self, id: &str) {
		self.selection.set(Some(Selection {
			graph: self.graph,
			id: id.to_string(),
		}));
	}

	fn node_hovered(&self, id: Option<&str>, event: &MouseEvent, dragging: bool) {
		let tip = match (self.graph, id) {
			(GraphKind::Hierarchy, Some(id)) if !dragging => hierarchy_tooltip(&self.hierarchy, id)
				.map(|(title, body)| Tooltip {
					x: event.client_x() as f64 + 16.0,
					y: event.client_y() as f64 - 10.0,
					title,
					body,
				}),
			_ => None,
		};
		self.tooltip.set(tip);
	}
}

#[component]
pub fn NodeTooltip(tooltip: RwSignal<Option<Tooltip>>) -> impl IntoView {
	move || {
		tooltip.get().map(|t| {
			view! {
				<div class="tooltip visible" style:left=format!("{}px", t.x) style:top=format!("{}px", t.y)>
					<div class="tooltip-name">{t.title}</div>
					<div class="tooltip-desc">{t.body}</div>
				</div>
			}
		})
	}
}

fn section(title: String, body: AnyView) -> AnyView {
	view! {
		<div class="panel-section">
			<div class="panel-section-title">{title}</div>
			{body}
		</div>
	}
	.into_any()
}

fn hierarchy_details(
	data: &HierarchyData,
	id: &str,
	selection: RwSignal<Option<Selection>>,
) -> Option<AnyView> {
	let node = data.node(id)?;
	let info = node.info();
	let branch = node.branch();
	let color = branch.color.clone();
	let open = move |id: String| move |_: MouseEvent| selection.set(Some(Selection::hierarchy(id.clone())));

	let mut sections = vec![section(
		"Overview".into(),
		view! { <div class="panel-text">{info.description.clone()}</div> }.into_any(),
	)];

	if let HierarchyNode::Branch { branch, .. } = node {
		let researched = branch
			.children
			.iter()
			.filter(|c| c.status == Status::Researched)
			.count();
		let items = branch
			.children
			.iter()
			.map(|child| {
				let researched = child.status == Status::Researched;
				let bullet = if researched { ACCENT } else { color.as_str() };
				view! {
					<div class="sub-node-item" on:click=open(child.id.clone())>
						<div class="sub-node-bullet" style:background=bullet.to_string()></div>
						<div class="sub-node-name">{child.label.clone()}</div>
						<div class="sub-node-status" class:researched=researched>
							{format!("{} {}", if researched { "\u{25cf}" } else { "\u{25cb}" }, status_name(child.status))}
						</div>
					</div>
				}
			})
			.collect_view();
		sections.push(section(
			format!("Sub-Topics ({}), {} researched", branch.children.len(), researched),
			view! { <div class="sub-nodes-list">{items}</div> }.into_any(),
		));
	}

	let connected: Vec<_> = info
		.connections
		.iter()
		.filter_map(|c| data.node(c))
		.collect();
	if !connected.is_empty() {
		let tags = connected
			.into_iter()
			.map(|n| {
				let border = with_alpha(&n.branch().color, 0x44);
				view! {
					<div class="connection-tag" style:border-color=border on:click=open(n.info().id.clone())>
						{n.info().label.clone()}
					</div>
				}
			})
			.collect_view();
		sections.push(section(
			"Connected To".into(),
			view! { <div class="connections-list">{tags}</div> }.into_any(),
		));
	}

	if !info.key_evidence.is_empty() {
		let items = info
			.key_evidence
			.iter()
			.map(|ev| {
				view! {
					<div class="key-evidence-item">
						<span class="key-evidence-dot">{ev.classification.clone()}</span>
						<div class="key-evidence-body">
							<div class="key-evidence-claim">{ev.claim.clone()}</div>
							<div class="key-evidence-source">{ev.source.clone()}</div>
						</div>
					</div>
				}
			})
			.collect_view();
		sections.push(section(
			"Key Evidence".into(),
			view! { <div class="key-evidence-list">{items}</div> }.into_any(),
		));
	}

	if !info.sources.is_empty() {
		let items = info
			.sources
			.iter()
			.map(|src| {
				let kind = src.kind.clone().unwrap_or_default();
				let link = src.url.clone().map(|url| {
					let href = url.clone();
					view! { <a href=href target="_blank" rel="noopener">{url}</a> }
				});
				view! {
					<div class="source-item">
						<span class="source-kind">{kind}</span>
						<div>
							<div class="source-label">{src.label.clone()}</div>
							{link}
						</div>
					</div>
				}
			})
			.collect_view();
		sections.push(section(
			"Primary Sources".into(),
			view! { <div class="source-list">{items}</div> }.into_any(),
		));
	}

	let tag_background = with_alpha(&color, 0x20);
	let researched = info.status == Status::Researched;
	Some(
		view! {
			<div class="panel-branch" style:background=tag_background style:color=color.clone()>
				{branch.info.label.clone()}
			</div>
			<h2 class="panel-title">{info.label.clone()}</h2>
			<div class="panel-status" class:researched=researched>
				{info.status.describe()}
			</div>
			<div class="panel-body">{sections}</div>
		}
		.into_any(),
	)
}

fn ring_details(
	rings: &RingData,
	hierarchy: &HierarchyData,
	id: &str,
	selection: RwSignal<Option<Selection>>,
) -> Option<AnyView> {
	let (node, ring) = rings.node(id)?;
	let mut sections = Vec::new();

	if !node.description.is_empty() {
		sections.push(section(
			"Description".into(),
			view! { <div class="panel-text">{node.description.clone()}</div> }.into_any(),
		));
	}

	// Ring connections point into the branch map; opening one switches tabs.
	let connected: Vec<_> = node
		.connections
		.iter()
		.filter_map(|c| hierarchy.node(c))
		.collect();
	if !connected.is_empty() {
		let tags = connected
			.into_iter()
			.map(|n| {
				let id = n.info().id.clone();
				let border = with_alpha(&n.branch().color, 0x44);
				view! {
					<div
						class="connection-tag"
						style:border-color=border
						on:click=move |_| selection.set(Some(Selection::hierarchy(id.clone())))
					>
						{n.info().label.clone()}
					</div>
				}
			})
			.collect_view();
		sections.push(section(
			"Branch Map Connections".into(),
			view! { <div class="connections-list">{tags}</div> }.into_any(),
		));
	}

	let tag_background = with_alpha(&ring.color, 0x22);
	Some(
		view! {
			<div class="panel-branch" style:background=tag_background style:color=ring.color.clone()>
				{ring.label.clone()}
			</div>
			<h2 class="panel-title">{node.label.clone()}</h2>
			<div class="panel-status">{node.subtitle.clone().unwrap_or_default()}</div>
			<div class="panel-body">{sections}</div>
		}
		.into_any(),
	)
}

/// Side panel for the selected node of either graph.
#[component]
pub fn DetailPanel(
	selection: RwSignal<Option<Selection>>,
	hierarchy: Arc<HierarchyData>,
	rings: Arc<RingData>,
) -> impl IntoView {
	let details = move || {
		let selected = selection.get()?;
		match selected.graph {
			GraphKind::Hierarchy => hierarchy_details(&hierarchy, &selected.id, selection),
			GraphKind::Rings => ring_details(&rings, &hierarchy, &selected.id, selection),
		}
	};

	view! {
		<aside class="info-panel" class:open=move || selection.with(Option::is_some)>
			<button class="panel-close" on:click=move |_| selection.set(None)>
				"\u{00d7}"
			</button>
			{details}
		</aside>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn data() -> HierarchyData {
		serde_json::from_str(
			r##"{"branches":[{"id":"net","label":"Networking","color":"#4a7c9b",
				"description":"Moving bytes",
				"children":[
					{"id":"quic","label":"QUIC","status":"researched",
					 "description":"UDP-based multiplexed transport with built-in TLS 1.3, connection migration and stream-level flow control that avoids head-of-line blocking across streams."},
					{"id":"dns","label":"DNS","description":"Name resolution"}
				]}]}"##,
		)
		.expect("valid fixture")
	}

	#[test]
	fn branch_tooltip_counts_children() {
		let (title, body) = hierarchy_tooltip(&data(), "net").expect("branch");
		assert_eq!(title, "Networking");
		assert_eq!(body, "2 sub-topics");
	}

	#[test]
	fn child_tooltip_truncates_long_descriptions() {
		let (title, body) = hierarchy_tooltip(&data(), "quic").expect("child");
		assert_eq!(title, "QUIC");
		assert!(body.ends_with("..."));
		assert_eq!(body.chars().count(), TOOLTIP_DESCRIPTION_CHARS + 3);

		let (_, body) = hierarchy_tooltip(&data(), "dns").expect("child");
		assert_eq!(body, "Name resolution");
		assert!(hierarchy_tooltip(&data(), "missing").is_none());
	}

	#[test]
	fn excerpt_cuts_on_char_boundaries() {
		assert_eq!(excerpt("h\u{e9}llo", 2), "h\u{e9}...");
		assert_eq!(excerpt("ab", 2), "ab");
	}

	#[test]
	fn status_names_are_lowercase() {
		assert_eq!(status_name(Status::Researched), "researched");
		assert_eq!(status_name(Status::default()), "scaffold");
	}
}
