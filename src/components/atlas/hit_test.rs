//! Screen point to node resolution.
//!
//! Testing happens in world space against the full position table, so it is
//! unaffected by render culling.

use super::layout::{Position, PositionTable};
use super::types::{HierarchyData, RingData};
use super::viewport::{DeviceClass, Viewport};

pub const CHILD_HIT_DESKTOP: f64 = 1.5;
pub const CHILD_HIT_MOBILE: f64 = 3.0;
pub const BRANCH_HIT_DESKTOP: f64 = 1.2;
pub const BRANCH_HIT_MOBILE: f64 = 1.8;
pub const RING_NODE_HIT: f64 = 1.5;

pub trait HitTest {
	/// Node id under the screen point, if any.
	fn hit_test(&self, view: &Viewport, sx: f64, sy: f64) -> Option<&str>;
}

fn within(world: (f64, f64), pos: &Position, multiplier: f64) -> bool {
	let (dx, dy) = (world.0 - pos.x, world.1 - pos.y);
	let r = pos.radius * multiplier;
	dx * dx + dy * dy < r * r
}

/// Children are tested before branches and the first match wins, so small
/// children stay reachable inside their parent's larger circle.
pub fn hit_hierarchy<'a>(
	data: &'a HierarchyData,
	positions: &PositionTable,
	view: &Viewport,
	sx: f64,
	sy: f64,
) -> Option<&'a str> {
	let world = view.screen_to_world(sx, sy);
	let (child_mult, branch_mult) = match DeviceClass::for_hit_test(view.width) {
		DeviceClass::Desktop => (CHILD_HIT_DESKTOP, BRANCH_HIT_DESKTOP),
		DeviceClass::Mobile => (CHILD_HIT_MOBILE, BRANCH_HIT_MOBILE),
	};

	let children = data.branches.iter().flat_map(|b| b.children.iter());
	for child in children {
		if let Some(pos) = positions.get(&child.id) {
			if within(world, pos, child_mult) {
				return Some(child.id.as_str());
			}
		}
	}
	data.branches
		.iter()
		.find(|b| {
			positions
				.get(&b.info.id)
				.is_some_and(|pos| within(world, pos, branch_mult))
		})
		.map(|b| b.info.id.as_str())
}

/// Scans every node; the last match in ring/node order wins.
pub fn hit_rings<'a>(
	data: &'a RingData,
	positions: &PositionTable,
	view: &Viewport,
	sx: f64,
	sy: f64,
) -> Option<&'a str> {
	let world = view.screen_to_world(sx, sy);
	let mut found = None;
	for node in data.rings.iter().flat_map(|r| r.nodes.iter()) {
		if let Some(pos) = positions.get(&node.id) {
			if within(world, pos, RING_NODE_HIT) {
				found = Some(node.id.as_str());
			}
		}
	}
	found
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::atlas::layout::tests::{hierarchy, ring};
	use crate::components::atlas::viewport::OriginMode;

	fn view(origin: OriginMode, width: f64) -> Viewport {
		let mut v = Viewport::new(origin);
		v.resize(width, 800.0, 1.0);
		v
	}

	fn at(x: f64, y: f64, radius: f64) -> Position {
		Position { x, y, radius }
	}

	#[test]
	fn nested_child_wins_over_its_branch() {
		let data = hierarchy(&[1]);
		let mut positions = PositionTable::new();
		positions.insert("b0".into(), at(0.0, 0.0, 28.0));
		positions.insert("b0c0".into(), at(5.0, 0.0, 4.0));
		let v = view(OriginMode::Corner, 1000.0);
		let (sx, sy) = v.world_to_screen(5.0, 0.0);
		assert_eq!(hit_hierarchy(&data, &positions, &v, sx, sy), Some("b0c0"));
		let (sx, sy) = v.world_to_screen(-20.0, 0.0);
		assert_eq!(hit_hierarchy(&data, &positions, &v, sx, sy), Some("b0"));
	}

	#[test]
	fn hit_radius_is_exclusive_and_scaled_by_device() {
		let data = hierarchy(&[1]);
		let mut positions = PositionTable::new();
		positions.insert("b0c0".into(), at(0.0, 0.0, 10.0));

		let desktop = view(OriginMode::Corner, 1000.0);
		let (sx, sy) = desktop.world_to_screen(14.9, 0.0);
		assert_eq!(hit_hierarchy(&data, &positions, &desktop, sx, sy), Some("b0c0"));
		let (sx, sy) = desktop.world_to_screen(15.0, 0.0);
		assert_eq!(hit_hierarchy(&data, &positions, &desktop, sx, sy), None);

		let mobile = view(OriginMode::Corner, 400.0);
		let (sx, sy) = mobile.world_to_screen(29.0, 0.0);
		assert_eq!(hit_hierarchy(&data, &positions, &mobile, sx, sy), Some("b0c0"));
	}

	#[test]
	fn hit_test_follows_pan_and_zoom() {
		let data = hierarchy(&[0]);
		let mut positions = PositionTable::new();
		positions.insert("b0".into(), at(100.0, 50.0, 20.0));
		let mut v = view(OriginMode::Corner, 1000.0);
		v.set_zoom(2.0);
		v.set_pan(-30.0, 10.0);
		let (sx, sy) = v.world_to_screen(100.0, 50.0);
		assert_eq!(hit_hierarchy(&data, &positions, &v, sx, sy), Some("b0"));
		assert_eq!(hit_hierarchy(&data, &positions, &v, 500.0, 400.0), None);
	}

	#[test]
	fn missing_positions_are_skipped() {
		let data = hierarchy(&[2]);
		let positions = PositionTable::new();
		let v = view(OriginMode::Corner, 1000.0);
		assert_eq!(hit_hierarchy(&data, &positions, &v, 500.0, 400.0), None);
	}

	#[test]
	fn later_ring_node_wins_on_overlap() {
		let data = RingData {
			rings: vec![ring("a", 100.0, 1), ring("b", 200.0, 2)],
			attribution: None,
		};
		let mut positions = PositionTable::new();
		positions.insert("a0".into(), at(500.0, 400.0, 12.0));
		positions.insert("b0".into(), at(505.0, 400.0, 12.0));
		positions.insert("b1".into(), at(900.0, 400.0, 12.0));
		let v = view(OriginMode::Center, 1000.0);
		let (sx, sy) = v.world_to_screen(502.0, 400.0);
		assert_eq!(hit_rings(&data, &positions, &v, sx, sy), Some("b0"));
		let (sx, sy) = v.world_to_screen(485.0, 400.0);
		assert_eq!(hit_rings(&data, &positions, &v, sx, sy), Some("a0"));
	}
}
