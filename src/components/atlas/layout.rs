//! Analytic layouts for both graphs.
//!
//! Positions are computed once per viewport size and never relaxed. Each
//! layout is a pure function of the dataset and the viewport size; the
//! device class is derived from the size.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::types::{HierarchyData, Ring, RingData};
use super::viewport::DeviceClass;

/// World-space placement of one node. `radius` is in pixels at zoom 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
	pub x: f64,
	pub y: f64,
	pub radius: f64,
}

pub type PositionTable = HashMap<String, Position>;

/// Branch ring radius as a fraction of the smaller viewport dimension.
pub const BRANCH_RING_FRACTION: f64 = 0.3;

const BRANCH_RADIUS_DESKTOP: f64 = 28.0;
const BRANCH_RADIUS_MOBILE: f64 = 20.0;

const CHILD_DISTANCE_DESKTOP: f64 = 100.0;
const CHILD_ANGLE_STEP_DESKTOP: f64 = 0.3;
const CHILD_RADIUS_DESKTOP: f64 = 10.0;

pub const MOBILE_CHILDREN_PER_RING: usize = 10;
const MOBILE_SUBRING_BASE_FRACTION: f64 = 0.1;
const MOBILE_SUBRING_GAP_FRACTION: f64 = 0.06;
const MOBILE_CHILD_ARC: f64 = PI;
const CHILD_RADIUS_MOBILE: f64 = 6.0;

/// Ring radii in the dataset are expressed against this viewport size.
pub const RING_REFERENCE_PX: f64 = 1200.0;
pub const CENTER_NODE_RADIUS: f64 = 36.0;
/// Each node links to this many nearest members of the next ring out.
pub const NEAREST_OUTER_LINKS: usize = 2;

/// Angle of the `i`-th of `n` evenly spaced slots, starting at the top and
/// proceeding clockwise (screen y grows downward).
fn slot_angle(i: usize, n: usize) -> f64 {
	(i as f64 / n as f64) * TAU - FRAC_PI_2
}

/// Branches on one ring around the world origin; children around their branch.
pub fn radial_layout(data: &HierarchyData, width: f64, height: f64) -> PositionTable {
	let min_dim = width.min(height);
	let device = DeviceClass::for_layout(width, height);
	let ring_radius = min_dim * BRANCH_RING_FRACTION;
	let count = data.branches.len();
	let mut positions = PositionTable::with_capacity(data.node_count());

	for (i, branch) in data.branches.iter().enumerate() {
		let angle = slot_angle(i, count);
		let (bx, by) = (angle.cos() * ring_radius, angle.sin() * ring_radius);
		let radius = match device {
			DeviceClass::Desktop => BRANCH_RADIUS_DESKTOP,
			DeviceClass::Mobile => BRANCH_RADIUS_MOBILE,
		};
		positions.insert(branch.info.id.clone(), Position { x: bx, y: by, radius });

		let total = branch.children.len();
		for (j, child) in branch.children.iter().enumerate() {
			let (child_angle, distance, radius) = match device {
				DeviceClass::Desktop => {
					let offset = j as f64 - (total as f64 - 1.0) / 2.0;
					(
						angle + offset * CHILD_ANGLE_STEP_DESKTOP,
						CHILD_DISTANCE_DESKTOP,
						CHILD_RADIUS_DESKTOP,
					)
				}
				DeviceClass::Mobile => {
					let ring = j / MOBILE_CHILDREN_PER_RING;
					let index = j % MOBILE_CHILDREN_PER_RING;
					let in_ring = MOBILE_CHILDREN_PER_RING.min(total - ring * MOBILE_CHILDREN_PER_RING);
					let step = if in_ring > 1 {
						MOBILE_CHILD_ARC / (in_ring as f64 - 1.0)
					} else {
						0.0
					};
					let offset = index as f64 - (in_ring as f64 - 1.0) / 2.0;
					let distance = min_dim * MOBILE_SUBRING_BASE_FRACTION
						+ ring as f64 * min_dim * MOBILE_SUBRING_GAP_FRACTION;
					(angle + offset * step, distance, CHILD_RADIUS_MOBILE)
				}
			};
			positions.insert(
				child.id.clone(),
				Position {
					x: bx + child_angle.cos() * distance,
					y: by + child_angle.sin() * distance,
					radius,
				},
			);
		}
	}
	positions
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
	/// Focal node to a member of the innermost orbit ring.
	Spoke,
	/// Member of ring `i` to one of its nearest members of ring `i + 1`.
	Orbit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RingLink {
	pub from: String,
	pub to: String,
	pub color: String,
	pub kind: LinkKind,
}

/// Positions plus the links derived from them; replaced wholesale on relayout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RingLayout {
	pub positions: PositionTable,
	pub links: Vec<RingLink>,
}

/// Scaled world radius of an orbit ring for the given viewport.
pub fn ring_radius(ring: &Ring, width: f64, height: f64) -> f64 {
	ring.radius * width.min(height) / RING_REFERENCE_PX
}

/// Rings centered on `(width / 2, height / 2)`.
pub fn ring_layout(data: &RingData, width: f64, height: f64) -> RingLayout {
	let (cx, cy) = (width / 2.0, height / 2.0);
	let mut positions = PositionTable::with_capacity(data.node_count());

	for ring in &data.rings {
		let count = ring.nodes.len();
		let scaled = ring_radius(ring, width, height);
		for (i, node) in ring.nodes.iter().enumerate() {
			let position = if ring.is_center() {
				Position {
					x: cx,
					y: cy,
					radius: CENTER_NODE_RADIUS,
				}
			} else {
				let angle = slot_angle(i, count);
				Position {
					x: cx + angle.cos() * scaled,
					y: cy + angle.sin() * scaled,
					radius: ring.node_radius,
				}
			};
			positions.insert(node.id.clone(), position);
		}
	}

	let links = ring_links(data, &positions);
	RingLayout { positions, links }
}

/// The `k` candidates closest to `from`, nearest first. Equal distances keep
/// candidate order.
pub fn nearest<'a>(
	from: Position,
	candidates: impl Iterator<Item = (&'a str, Position)>,
	k: usize,
) -> Vec<&'a str> {
	let mut ranked: Vec<(&str, f64)> = candidates
		.map(|(id, p)| (id, (p.x - from.x).hypot(p.y - from.y)))
		.collect();
	ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
	ranked.into_iter().take(k).map(|(id, _)| id).collect()
}

fn ring_links(data: &RingData, positions: &PositionTable) -> Vec<RingLink> {
	let (centers, orbits): (Vec<&Ring>, Vec<&Ring>) =
		data.ordered().into_iter().partition(|r| r.is_center());
	let mut links = Vec::new();

	if let Some(first) = orbits.first() {
		for center in &centers {
			for focal in &center.nodes {
				for node in &first.nodes {
					if positions.contains_key(&focal.id) && positions.contains_key(&node.id) {
						links.push(RingLink {
							from: focal.id.clone(),
							to: node.id.clone(),
							color: center.color.clone(),
							kind: LinkKind::Spoke,
						});
					}
				}
			}
		}
	}

	for pair in orbits.windows(2) {
		let (inner, outer) = (pair[0], pair[1]);
		for node in &inner.nodes {
			let Some(&from) = positions.get(&node.id) else {
				continue;
			};
			let candidates = outer
				.nodes
				.iter()
				.filter_map(|n| positions.get(&n.id).map(|p| (n.id.as_str(), *p)));
			for to in nearest(from, candidates, NEAREST_OUTER_LINKS) {
				links.push(RingLink {
					from: node.id.clone(),
					to: to.to_string(),
					color: inner.color.clone(),
					kind: LinkKind::Orbit,
				});
			}
		}
	}
	links
}
