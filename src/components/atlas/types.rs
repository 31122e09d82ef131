//! Dataset model for the branch map and the ring map.
//!
//! Both datasets are parsed once and treated as read-only afterwards. Ids are
//! plain strings; references between nodes (connections) are resolved lazily
//! and silently skipped when they do not resolve.

use serde::Deserialize;

/// Research status of a node in the branch map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
	#[default]
	Scaffold,
	Draft,
	Researched,
	Published,
}

impl Status {
	/// Status line shown in the detail panel.
	pub fn describe(self) -> &'static str {
		match self {
			Status::Scaffold => "\u{25cb} SCAFFOLD \u{2014} Content pending",
			Status::Draft => "\u{25d0} DRAFT \u{2014} In progress",
			Status::Researched => "\u{25cf} RESEARCHED \u{2014} Cross-referenced with source documents",
			Status::Published => "\u{25cf} PUBLISHED",
		}
	}
}

/// A single piece of evidence attached to a node. Opaque to the canvas.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Evidence {
	#[serde(default)]
	pub classification: String,
	pub claim: String,
	#[serde(default)]
	pub source: String,
}

/// A primary source attached to a node. Opaque to the canvas.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SourceRef {
	pub label: String,
	#[serde(default)]
	pub url: Option<String>,
	#[serde(rename = "type", default)]
	pub kind: Option<String>,
}

/// Fields shared by branches and children.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub status: Status,
	#[serde(default)]
	pub connections: Vec<String>,
	#[serde(default)]
	pub key_evidence: Vec<Evidence>,
	#[serde(default)]
	pub sources: Vec<SourceRef>,
}

/// Top-level node of the branch map. Children inherit its color.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Branch {
	#[serde(flatten)]
	pub info: NodeInfo,
	pub color: String,
	#[serde(default)]
	pub children: Vec<NodeInfo>,
}

/// Ordered branches of the hierarchical graph.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct HierarchyData {
	pub branches: Vec<Branch>,
}

/// A resolved node of the branch map, tagged by kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HierarchyNode<'a> {
	Branch { branch: &'a Branch, index: usize },
	Child { child: &'a NodeInfo, branch: &'a Branch },
}

impl<'a> HierarchyNode<'a> {
	pub fn info(&self) -> &'a NodeInfo {
		match self {
			HierarchyNode::Branch { branch, .. } => &branch.info,
			HierarchyNode::Child { child, .. } => child,
		}
	}

	/// The branch that owns this node (itself for a branch).
	pub fn branch(&self) -> &'a Branch {
		match self {
			HierarchyNode::Branch { branch, .. } | HierarchyNode::Child { branch, .. } => branch,
		}
	}
}

impl HierarchyData {
	pub fn node(&self, id: &str) -> Option<HierarchyNode<'_>> {
		for (index, branch) in self.branches.iter().enumerate() {
			if branch.info.id == id {
				return Some(HierarchyNode::Branch { branch, index });
			}
			if let Some(child) = branch.children.iter().find(|c| c.id == id) {
				return Some(HierarchyNode::Child { child, branch });
			}
		}
		None
	}

	pub fn node_count(&self) -> usize {
		self.branches.iter().map(|b| 1 + b.children.len()).sum()
	}

	/// Every id in dataset order: each branch followed by its children.
	pub fn ids(&self) -> impl Iterator<Item = &str> {
		self.branches.iter().flat_map(|b| {
			std::iter::once(b.info.id.as_str()).chain(b.children.iter().map(|c| c.id.as_str()))
		})
	}

	/// Case-insensitive substring match over labels and descriptions, in
	/// dataset order. Queries shorter than two characters match nothing.
	pub fn search(&self, query: &str, limit: usize) -> Vec<HierarchyNode<'_>> {
		let query = query.trim().to_lowercase();
		if query.chars().count() < 2 {
			return Vec::new();
		}
		self.ids()
			.filter_map(|id| self.node(id))
			.filter(|node| {
				let info = node.info();
				info.label.to_lowercase().contains(&query)
					|| info.description.to_lowercase().contains(&query)
			})
			.take(limit)
			.collect()
	}
}

/// A node of the ring map.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RingNode {
	pub id: String,
	pub label: String,
	#[serde(default)]
	pub subtitle: Option<String>,
	#[serde(default)]
	pub description: String,
	/// Ids in the branch map this node relates to.
	#[serde(default)]
	pub connections: Vec<String>,
}

fn default_node_radius() -> f64 {
	12.0
}

fn default_focus_zoom() -> f64 {
	1.0
}

/// A named ring of the concentric graph.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ring {
	pub id: String,
	pub label: String,
	pub color: String,
	/// Logical radius on a 1200px reference viewport. Zero marks the center ring.
	pub radius: f64,
	/// Base node radius for members of this ring.
	#[serde(default = "default_node_radius")]
	pub node_radius: f64,
	/// Zoom applied when the legend focuses this ring.
	#[serde(default = "default_focus_zoom")]
	pub focus_zoom: f64,
	#[serde(default)]
	pub nodes: Vec<RingNode>,
}

impl Ring {
	pub fn is_center(&self) -> bool {
		self.radius == 0.0
	}
}

/// Rings of the concentric graph.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RingData {
	pub rings: Vec<Ring>,
	#[serde(default)]
	pub attribution: Option<String>,
}

impl RingData {
	/// Rings ordered inner to outer by logical radius, ties kept in input order.
	pub fn ordered(&self) -> Vec<&Ring> {
		let mut rings: Vec<&Ring> = self.rings.iter().collect();
		rings.sort_by(|a, b| a.radius.total_cmp(&b.radius));
		rings
	}

	pub fn node(&self, id: &str) -> Option<(&RingNode, &Ring)> {
		self.rings
			.iter()
			.find_map(|ring| ring.nodes.iter().find(|n| n.id == id).map(|n| (n, ring)))
	}

	pub fn ring(&self, id: &str) -> Option<&Ring> {
		self.rings.iter().find(|r| r.id == id)
	}

	pub fn node_count(&self) -> usize {
		self.rings.iter().map(|r| r.nodes.len()).sum()
	}
}

/// Appends a two-digit hex alpha to a `#rrggbb` color. Other color syntaxes
/// pass through unchanged.
pub fn with_alpha(color: &str, alpha: u8) -> String {
	if color.len() == 7 && color.starts_with('#') {
		format!("{}{:02x}", color, alpha)
	} else {
		color.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn alpha_suffix_only_for_hex_colors() {
		assert_eq!(with_alpha("#c9a84c", 0x22), "#c9a84c22");
		assert_eq!(with_alpha("#c9a84c", 0), "#c9a84c00");
		assert_eq!(with_alpha("white", 0x22), "white");
	}

	#[test]
	fn ordered_rings_sort_by_radius_stably() {
		let ring = |id: &str, radius: f64| Ring {
			id: id.into(),
			label: id.into(),
			color: "#ffffff".into(),
			radius,
			node_radius: 12.0,
			focus_zoom: 1.0,
			nodes: Vec::new(),
		};
		let data = RingData {
			rings: vec![ring("outer", 500.0), ring("center", 0.0), ring("a", 200.0), ring("b", 200.0)],
			attribution: None,
		};
		let ids: Vec<_> = data.ordered().iter().map(|r| r.id.as_str()).collect();
		assert_eq!(ids, ["center", "a", "b", "outer"]);
	}

	#[test]
	fn search_matches_labels_and_descriptions() {
		let info = |id: &str, label: &str, description: &str| NodeInfo {
			id: id.into(),
			label: label.into(),
			description: description.into(),
			..NodeInfo::default()
		};
		let data = HierarchyData {
			branches: vec![Branch {
				info: info("storage", "Storage", "Durable state"),
				color: "#4c9ac9".into(),
				children: vec![
					info("wal", "Write-Ahead Log", "Append-only journal"),
					info("lsm", "LSM Trees", "Log-structured merge"),
				],
			}],
		};
		let ids = |q: &str, limit: usize| -> Vec<String> {
			data.search(q, limit).iter().map(|n| n.info().id.clone()).collect()
		};
		assert_eq!(ids("LOG", 8), ["wal", "lsm"]);
		assert_eq!(ids("durable", 8), ["storage"]);
		assert_eq!(ids("log", 1), ["wal"]);
		assert!(ids("l", 8).is_empty());
		assert!(ids("zzz", 8).is_empty());
	}
}
