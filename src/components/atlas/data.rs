//! Parsing of the two embedded datasets.

use std::collections::HashSet;

use log::info;
use thiserror::Error;

use super::types::{HierarchyData, RingData};

pub const HIERARCHY_JSON: &str = include_str!("../../../data/hierarchy.json");
pub const RINGS_JSON: &str = include_str!("../../../data/rings.json");

#[derive(Debug, Error)]
pub enum DataError {
	#[error("failed to parse {dataset} dataset: {source}")]
	Parse {
		dataset: &'static str,
		#[source]
		source: serde_json::Error,
	},
	#[error("duplicate node id `{id}` in {dataset} dataset")]
	DuplicateId { dataset: &'static str, id: String },
}

fn check_unique<'a>(
	dataset: &'static str,
	ids: impl Iterator<Item = &'a str>,
) -> Result<(), DataError> {
	let mut seen = HashSet::new();
	for id in ids {
		if !seen.insert(id) {
			return Err(DataError::DuplicateId {
				dataset,
				id: id.to_string(),
			});
		}
	}
	Ok(())
}

pub fn parse_hierarchy(json: &str) -> Result<HierarchyData, DataError> {
	let data: HierarchyData = serde_json::from_str(json).map_err(|source| DataError::Parse {
		dataset: "hierarchy",
		source,
	})?;
	check_unique("hierarchy", data.ids())?;
	Ok(data)
}

pub fn parse_rings(json: &str) -> Result<RingData, DataError> {
	let data: RingData = serde_json::from_str(json).map_err(|source| DataError::Parse {
		dataset: "rings",
		source,
	})?;
	check_unique(
		"rings",
		data.rings.iter().flat_map(|r| r.nodes.iter().map(|n| n.id.as_str())),
	)?;
	Ok(data)
}

/// Parses both embedded datasets.
pub fn load_embedded() -> Result<(HierarchyData, RingData), DataError> {
	let hierarchy = parse_hierarchy(HIERARCHY_JSON)?;
	let rings = parse_rings(RINGS_JSON)?;
	info!(
		"Datasets loaded: {} branches / {} nodes, {} rings / {} nodes",
		hierarchy.branches.len(),
		hierarchy.node_count(),
		rings.rings.len(),
		rings.node_count()
	);
	Ok((hierarchy, rings))
}
