use super::layout::{LinkKind, Position, PositionTable, RingLayout, ring_radius};
use super::surface::{Align, Baseline, Paint, Stroke, Surface, TextStyle};
use super::types::{HierarchyData, NodeInfo, RingData, RingNode, Status, with_alpha};
use super::viewport::Viewport;

/// Nodes whose screen center lies further than this outside the canvas are not drawn.
pub const CULL_MARGIN_PX: f64 = 100.0;

pub const BRANCH_LABEL_MIN_ZOOM: f64 = 0.4;
pub const CHILD_LABEL_MIN_ZOOM: f64 = 0.7;
pub const RING_LABEL_MIN_ZOOM: f64 = 0.4;
pub const RING_SUBTITLE_MIN_ZOOM: f64 = 0.6;

const ACCENT: &str = "#c9a84c";
const PARTICLE_COUNT: usize = 40;
/// Ring animation phase advanced per frame.
const RING_PHASE_STEP: f64 = 0.005;

/// Everything a draw pass reads besides the graph itself.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
	pub view: &'a Viewport,
	pub hovered: Option<&'a str>,
	/// Monotonic frame counter of the owning graph.
	pub frame: u64,
	pub show_connections: bool,
}

/// Glow, pulse and outline of one node for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	/// Glow radius and center alpha.
	pub glow: Option<(f64, u8)>,
	/// Pulse ring radius.
	pub pulse: Option<f64>,
	pub fill_alpha: u8,
	pub stroke_width: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HierarchyKind {
	Branch { index: usize },
	Child { status: Status, seed: usize },
}

/// Visual state of a branch-map node drawn at screen radius `r`.
pub fn hierarchy_visual(kind: HierarchyKind, hovered: bool, r: f64, frame: u64) -> NodeVisual {
	let t = frame as f64;
	match kind {
		HierarchyKind::Branch { index } => NodeVisual {
			glow: Some((r * 3.0, if hovered { 0x30 } else { 0x18 })),
			pulse: Some(r * (1.4 + (t * 0.02 + index as f64 * 0.8).sin() * 0.15)),
			fill_alpha: 0xcc,
			stroke_width: if hovered { 2.0 } else { 1.0 },
		},
		HierarchyKind::Child { status, seed } => {
			let researched = status == Status::Researched;
			let glow = if hovered {
				Some((r * if researched { 2.8 } else { 2.5 }, 0x30))
			} else if researched {
				Some((r * 2.8, 0x28))
			} else {
				None
			};
			NodeVisual {
				glow,
				pulse: researched.then(|| r * (1.6 + (t * 0.03 + seed as f64 * 0.5).sin() * 0.2)),
				fill_alpha: match (researched, hovered) {
					(true, true) => 0xee,
					(true, false) => 0xaa,
					(false, true) => 0xcc,
					(false, false) => 0x66,
				},
				stroke_width: if researched || hovered { 2.0 } else { 1.0 },
			}
		}
	}
}

/// Visual state of a ring-map node drawn at screen radius `r`.
pub fn ring_visual(center: bool, hovered: bool, r: f64, frame: u64) -> NodeVisual {
	let phase = frame as f64 * RING_PHASE_STEP;
	NodeVisual {
		glow: Some((
			r * if hovered { 3.5 } else { 2.5 },
			if hovered { 0x40 } else { 0x20 },
		)),
		pulse: center.then(|| r * (1.3 + 0.2 * (phase * 2.0).sin())),
		fill_alpha: if hovered { 0xcc } else { 0x88 },
		stroke_width: if hovered { 2.0 } else { 1.0 },
	}
}

fn draw_particles(s: &mut dyn Surface, view: &Viewport, frame: u64) {
	if view.width <= 0.0 || view.height <= 0.0 {
		return;
	}
	let t = frame as f64;
	let paint = Paint::solid("rgba(201,168,76,0.03)");
	for i in 0..PARTICLE_COUNT {
		let i = i as f64;
		let x = (i * 137.508 + t * 0.1).rem_euclid(view.width);
		let y = (i * 97.31 + t * 0.07).rem_euclid(view.height);
		s.fill_circle(x, y, 1.0, &paint);
	}
}

/// Quadratic edge bent to one side of the chord by `bend` of its length.
fn draw_curve(s: &mut dyn Surface, from: (f64, f64), to: (f64, f64), bend: f64, stroke: &Stroke) {
	let (mx, my) = ((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
	let (dx, dy) = (to.0 - from.0, to.1 - from.1);
	s.stroke_quad(from, (mx - dy * bend, my + dx * bend), to, stroke);
}

fn screen_pair(
	view: &Viewport,
	positions: &PositionTable,
	from: &str,
	to: &str,
) -> Option<((f64, f64), (f64, f64))> {
	let (a, b) = (positions.get(from)?, positions.get(to)?);
	Some((view.world_to_screen(a.x, a.y), view.world_to_screen(b.x, b.y)))
}

fn draw_declared_connections<'a>(
	s: &mut dyn Surface,
	view: &Viewport,
	positions: &PositionTable,
	nodes: impl Iterator<Item = (&'a str, &'a [String])>,
	stroke: &Stroke,
) {
	for (from, targets) in nodes {
		for to in targets {
			if let Some((a, b)) = screen_pair(view, positions, from, to) {
				draw_curve(s, a, b, 0.15, stroke);
			}
		}
	}
}

/// Screen center and radius of a node, or `None` when it is culled.
fn visible(view: &Viewport, pos: &Position) -> Option<(f64, f64, f64)> {
	let (x, y) = view.world_to_screen(pos.x, pos.y);
	view.contains_screen(x, y, CULL_MARGIN_PX)
		.then(|| (x, y, pos.radius * view.zoom()))
}

fn draw_glow(s: &mut dyn Surface, x: f64, y: f64, inner: f64, glow: (f64, u8), color: &str) {
	let (radius, alpha) = glow;
	let paint = Paint::Radial {
		inner: (x, y, inner),
		outer: (x, y, radius),
		stops: vec![(0.0, with_alpha(color, alpha)), (1.0, with_alpha(color, 0))],
	};
	s.fill_circle(x, y, radius, &paint);
}

/// One pass of the branch map: particles, parent-child edges, declared
/// connections, then children and finally branches on top.
pub fn draw_hierarchy(
	s: &mut dyn Surface,
	data: &HierarchyData,
	positions: &PositionTable,
	f: &FrameContext<'_>,
) {
	let view = f.view;
	s.clear(view.width, view.height);
	draw_particles(s, view, f.frame);

	for branch in &data.branches {
		let stroke = Stroke::new(with_alpha(&branch.color, 0x22), 1.0);
		for child in &branch.children {
			if let Some((a, b)) = screen_pair(view, positions, &branch.info.id, &child.id) {
				s.stroke_line(a, b, &stroke);
			}
		}
	}

	if f.show_connections {
		let nodes = data.branches.iter().flat_map(|b| {
			std::iter::once(&b.info)
				.chain(b.children.iter())
				.map(|n| (n.id.as_str(), n.connections.as_slice()))
		});
		let stroke = Stroke::new("rgba(201,168,76,0.12)", 1.0);
		draw_declared_connections(s, view, positions, nodes, &stroke);
	}

	for branch in &data.branches {
		for child in &branch.children {
			draw_child(s, child, &branch.color, positions, f);
		}
	}
	for (index, branch) in data.branches.iter().enumerate() {
		draw_branch(s, &branch.info, index, &branch.color, positions, f);
	}
}

fn draw_branch(
	s: &mut dyn Surface,
	info: &NodeInfo,
	index: usize,
	color: &str,
	positions: &PositionTable,
	f: &FrameContext<'_>,
) {
	let Some(pos) = positions.get(&info.id) else {
		return;
	};
	let Some((x, y, r)) = visible(f.view, pos) else {
		return;
	};
	let hovered = f.hovered == Some(info.id.as_str());
	let visual = hierarchy_visual(HierarchyKind::Branch { index }, hovered, r, f.frame);

	if let Some(glow) = visual.glow {
		draw_glow(s, x, y, 0.0, glow, color);
	}
	if let Some(pulse) = visual.pulse {
		s.stroke_circle(x, y, pulse, &Stroke::new(with_alpha(color, 0x25), 1.0));
	}
	let fill = Paint::Radial {
		inner: (x - r * 0.3, y - r * 0.3, 0.0),
		outer: (x, y, r),
		stops: vec![
			(0.0, with_alpha(color, visual.fill_alpha)),
			(1.0, with_alpha(color, 0x88)),
		],
	};
	s.fill_circle(x, y, r, &fill);
	let outline = if hovered {
		color.to_string()
	} else {
		with_alpha(color, 0x55)
	};
	s.stroke_circle(x, y, r, &Stroke::new(outline, visual.stroke_width));

	let zoom = f.view.zoom();
	if zoom > BRANCH_LABEL_MIN_ZOOM {
		let style = TextStyle {
			font: format!("{}px 'Outfit', sans-serif", (13.0 * zoom).max(10.0)),
			color: if hovered { "#fff" } else { "rgba(232,230,225,0.9)" }.into(),
			align: Align::Center,
			baseline: Baseline::Middle,
		};
		match info.label.split_once(' ') {
			Some((first, rest)) if r > 15.0 => {
				s.fill_text(first, x, y - 6.0 * zoom, &style);
				s.fill_text(rest, x, y + 8.0 * zoom, &style);
			}
			_ => s.fill_text(&info.label, x, y, &style),
		}
	}
}

fn draw_child(
	s: &mut dyn Surface,
	info: &NodeInfo,
	color: &str,
	positions: &PositionTable,
	f: &FrameContext<'_>,
) {
	let Some(pos) = positions.get(&info.id) else {
		return;
	};
	let Some((x, y, r)) = visible(f.view, pos) else {
		return;
	};
	let hovered = f.hovered == Some(info.id.as_str());
	let researched = info.status == Status::Researched;
	let kind = HierarchyKind::Child {
		status: info.status,
		seed: info.id.len(),
	};
	let visual = hierarchy_visual(kind, hovered, r, f.frame);

	if let Some(glow) = visual.glow {
		draw_glow(s, x, y, 0.0, glow, color);
	}
	if let Some(pulse) = visual.pulse {
		s.stroke_circle(x, y, pulse, &Stroke::new(with_alpha(ACCENT, 0x44), 1.0));
	}
	s.fill_circle(x, y, r, &Paint::solid(with_alpha(color, visual.fill_alpha)));
	let outline = if researched {
		ACCENT.to_string()
	} else if hovered {
		color.to_string()
	} else {
		with_alpha(color, 0x55)
	};
	s.stroke_circle(x, y, r, &Stroke::new(outline, visual.stroke_width));

	let zoom = f.view.zoom();
	if zoom > CHILD_LABEL_MIN_ZOOM {
		let style = TextStyle {
			font: format!("{}px 'Outfit', sans-serif", (10.0 * zoom).max(8.0)),
			color: if hovered { "#fff" } else { "rgba(232,230,225,0.6)" }.into(),
			align: Align::Center,
			baseline: Baseline::Top,
		};
		s.fill_text(&info.label, x, y + r + 4.0, &style);
	}
}

/// One pass of the ring map: particles, ring guides, spokes and orbit links,
/// declared connections, then nodes from the outermost ring inward.
pub fn draw_rings(s: &mut dyn Surface, data: &RingData, layout: &RingLayout, f: &FrameContext<'_>) {
	let view = f.view;
	s.clear(view.width, view.height);
	draw_particles(s, view, f.frame);

	let ordered = data.ordered();
	let center = view.world_to_screen(view.width / 2.0, view.height / 2.0);
	for ring in ordered.iter().filter(|r| !r.is_center()) {
		let r = ring_radius(ring, view.width, view.height) * view.zoom();
		let guide = Stroke::new(with_alpha(&ring.color, 0x18), 1.0).dashed(&[4.0, 8.0]);
		s.stroke_circle(center.0, center.1, r, &guide);
	}

	for link in &layout.links {
		let Some((a, b)) = screen_pair(view, &layout.positions, &link.from, &link.to) else {
			continue;
		};
		match link.kind {
			LinkKind::Spoke => {
				let stroke = Stroke {
					paint: Paint::Linear {
						from: a,
						to: b,
						stops: vec![
							(0.0, with_alpha(ACCENT, 0x44)),
							(1.0, with_alpha(&link.color, 0x22)),
						],
					},
					width: 1.5,
					dash: Vec::new(),
				};
				s.stroke_line(a, b, &stroke);
			}
			LinkKind::Orbit => {
				let stroke = Stroke::new(with_alpha(&link.color, 0x12), 0.8);
				draw_curve(s, a, b, 0.1, &stroke);
			}
		}
	}

	// Ring nodes declare connections into the branch map only; nothing to draw here.

	for ring in ordered.iter().rev() {
		for node in &ring.nodes {
			draw_ring_node(s, node, ring.is_center(), &ring.color, &layout.positions, f);
		}
	}

	if let Some(attribution) = &data.attribution {
		let style = TextStyle {
			font: "300 10px \"JetBrains Mono\"".into(),
			color: "#5a5a6a44".into(),
			align: Align::Right,
			baseline: Baseline::Alphabetic,
		};
		s.fill_text(attribution, view.width - 20.0, view.height - 14.0, &style);
	}
}

fn draw_ring_node(
	s: &mut dyn Surface,
	node: &RingNode,
	center: bool,
	color: &str,
	positions: &PositionTable,
	f: &FrameContext<'_>,
) {
	let Some(pos) = positions.get(&node.id) else {
		return;
	};
	let Some((x, y, r)) = visible(f.view, pos) else {
		return;
	};
	let hovered = f.hovered == Some(node.id.as_str());
	let visual = ring_visual(center, hovered, r, f.frame);

	if let Some(glow) = visual.glow {
		draw_glow(s, x, y, r * 0.5, glow, color);
	}
	s.fill_circle(x, y, r, &Paint::solid(with_alpha(color, visual.fill_alpha)));
	s.stroke_circle(x, y, r, &Stroke::new(color, visual.stroke_width));

	if let Some(pulse) = visual.pulse {
		let wave = (f.frame as f64 * RING_PHASE_STEP * 2.0).sin();
		let alpha = (40.0 + 20.0 * wave).round() as u8;
		s.stroke_circle(x, y, pulse, &Stroke::new(with_alpha(ACCENT, alpha), 1.0));
	}

	let zoom = f.view.zoom();
	if zoom > RING_LABEL_MIN_ZOOM {
		let style = TextStyle {
			font: format!(
				"{} {}px Outfit",
				if hovered { 600 } else { 400 },
				(12.0 * zoom).max(9.0)
			),
			color: if hovered { "#fff" } else { "#e8e6e1cc" }.into(),
			align: Align::Center,
			baseline: Baseline::Alphabetic,
		};
		s.fill_text(&node.label, x, y + r + 16.0 * zoom, &style);

		if let Some(subtitle) = node.subtitle.as_deref().filter(|_| zoom > RING_SUBTITLE_MIN_ZOOM) {
			let style = TextStyle {
				font: format!("300 {}px \"JetBrains Mono\"", (9.0 * zoom).max(7.0)),
				color: "#8a8a9a88".into(),
				align: Align::Center,
				baseline: Baseline::Alphabetic,
			};
			s.fill_text(subtitle, x, y + r + 28.0 * zoom, &style);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::atlas::layout::tests::{hierarchy, ring};
	use crate::components::atlas::layout::{radial_layout, ring_layout};
	use crate::components::atlas::surface::recorder::{Op, Recorder};
	use crate::components::atlas::viewport::OriginMode;

	fn view(origin: OriginMode, zoom: f64) -> Viewport {
		let mut v = Viewport::new(origin);
		v.resize(1200.0, 900.0, 1.0);
		v.set_zoom(zoom);
		v
	}

	fn frame<'a>(view: &'a Viewport, hovered: Option<&'a str>) -> FrameContext<'a> {
		FrameContext {
			view,
			hovered,
			frame: 7,
			show_connections: true,
		}
	}

	fn is_text(op: &Op, prefix: &str) -> bool {
		matches!(op, Op::Text { text, .. } if text.starts_with(prefix))
	}

	#[test]
	fn children_draw_before_branches_and_edges_beneath_nodes() {
		let data = hierarchy(&[3, 2]);
		let positions = radial_layout(&data, 1200.0, 900.0);
		let v = view(OriginMode::Corner, 1.0);
		let mut rec = Recorder::default();
		draw_hierarchy(&mut rec, &data, &positions, &frame(&v, None));

		assert_eq!(rec.ops.first(), Some(&Op::Clear));
		let last_child = rec.rposition(|op| is_text(op, "Child")).unwrap();
		let first_branch = rec.position(|op| is_text(op, "Branch")).unwrap();
		assert!(last_child < first_branch);
		let last_edge = rec.rposition(|op| matches!(op, Op::Line { .. })).unwrap();
		assert!(last_edge < rec.position(|op| matches!(op, Op::Text { .. })).unwrap());
		assert_eq!(rec.ops.iter().filter(|op| matches!(op, Op::Line { .. })).count(), 5);
	}

	#[test]
	fn labels_are_gated_by_zoom() {
		let data = hierarchy(&[2]);
		let positions = radial_layout(&data, 1200.0, 900.0);

		let v = view(OriginMode::Corner, 0.5);
		let mut rec = Recorder::default();
		draw_hierarchy(&mut rec, &data, &positions, &frame(&v, None));
		assert!(rec.texts().iter().all(|t| !t.starts_with("Child")));
		assert!(rec.texts().iter().any(|t| t.starts_with("Branch")));

		let v = view(OriginMode::Corner, 0.35);
		let mut rec = Recorder::default();
		draw_hierarchy(&mut rec, &data, &positions, &frame(&v, None));
		assert!(rec.texts().is_empty());
	}

	#[test]
	fn offscreen_nodes_are_culled() {
		let data = hierarchy(&[0]);
		let positions = radial_layout(&data, 1200.0, 900.0);
		let mut v = view(OriginMode::Corner, 1.0);
		v.set_pan(5000.0, 0.0);
		let mut rec = Recorder::default();
		draw_hierarchy(&mut rec, &data, &positions, &frame(&v, None));
		assert!(rec.texts().is_empty());
	}

	#[test]
	fn declared_connections_follow_toggle_and_skip_unknown_ids() {
		let mut data = hierarchy(&[2]);
		data.branches[0].children[0].connections = vec!["b0c1".into(), "missing".into()];
		let positions = radial_layout(&data, 1200.0, 900.0);
		let v = view(OriginMode::Corner, 1.0);
		let quads = |show: bool| {
			let mut rec = Recorder::default();
			let f = FrameContext {
				show_connections: show,
				..frame(&v, None)
			};
			draw_hierarchy(&mut rec, &data, &positions, &f);
			rec.ops.iter().filter(|op| matches!(op, Op::Quad { .. })).count()
		};
		assert_eq!(quads(true), 1);
		assert_eq!(quads(false), 0);
	}

	#[test]
	fn rings_draw_outer_to_inner_ending_with_center() {
		let data = RingData {
			rings: vec![ring("c", 0.0, 1), ring("in", 200.0, 3), ring("out", 400.0, 5)],
			attribution: Some("credit".into()),
		};
		let layout = ring_layout(&data, 1200.0, 900.0);
		let v = view(OriginMode::Center, 1.0);
		let mut rec = Recorder::default();
		draw_rings(&mut rec, &data, &layout, &frame(&v, None));

		let texts = rec.texts();
		let pos = |p: &str| texts.iter().position(|t| t.starts_with(p)).unwrap();
		let rpos = |p: &str| texts.iter().rposition(|t| t.starts_with(p)).unwrap();
		assert!(rpos("out") < pos("in "));
		assert!(rpos("in ") < pos("c "));
		assert_eq!(texts.last(), Some(&"credit"));
		// 3 spokes straight, 6 orbit links curved, both beneath nodes.
		assert_eq!(rec.ops.iter().filter(|op| matches!(op, Op::Line { .. })).count(), 3);
		assert_eq!(rec.ops.iter().filter(|op| matches!(op, Op::Quad { .. })).count(), 6);
	}

	#[test]
	fn ring_map_ignores_the_connection_toggle() {
		let mut data = RingData {
			rings: vec![ring("c", 0.0, 1), ring("in", 200.0, 3)],
			attribution: None,
		};
		data.rings[1].nodes[0].connections = vec!["b0".into(), "in1".into()];
		let layout = ring_layout(&data, 1200.0, 900.0);
		let v = view(OriginMode::Center, 1.0);
		let ops = |show: bool| {
			let mut rec = Recorder::default();
			let f = FrameContext {
				show_connections: show,
				..frame(&v, None)
			};
			draw_rings(&mut rec, &data, &layout, &f);
			rec.ops.len()
		};
		assert_eq!(ops(true), ops(false));
	}

	#[test]
	fn subtitles_need_more_zoom_than_labels() {
		let mut data = RingData {
			rings: vec![ring("a", 200.0, 1)],
			attribution: None,
		};
		data.rings[0].nodes[0].subtitle = Some("sub".into());
		let layout = ring_layout(&data, 1200.0, 900.0);
		let v = view(OriginMode::Center, 0.5);
		let mut rec = Recorder::default();
		draw_rings(&mut rec, &data, &layout, &frame(&v, None));
		assert_eq!(rec.texts(), ["a 0"]);
	}

	#[test]
	fn hover_and_status_drive_visuals() {
		let plain = HierarchyKind::Child {
			status: Status::Draft,
			seed: 3,
		};
		assert_eq!(hierarchy_visual(plain, false, 10.0, 0).glow, None);
		assert_eq!(hierarchy_visual(plain, true, 10.0, 0).glow, Some((25.0, 0x30)));

		let researched = HierarchyKind::Child {
			status: Status::Researched,
			seed: 3,
		};
		let v = hierarchy_visual(researched, false, 10.0, 0);
		let (glow_r, glow_alpha) = v.glow.unwrap();
		assert!((glow_r - 28.0).abs() < 1e-9);
		assert_eq!(glow_alpha, 0x28);
		assert!(v.pulse.is_some());
		assert_eq!(v.stroke_width, 2.0);

		assert!(ring_visual(true, false, 10.0, 0).pulse.is_some());
		assert!(ring_visual(false, false, 10.0, 0).pulse.is_none());
		assert_eq!(ring_visual(false, true, 10.0, 0).glow, Some((35.0, 0x40)));
	}

	#[test]
	fn visuals_are_deterministic_per_frame() {
		let kind = HierarchyKind::Branch { index: 2 };
		assert_eq!(hierarchy_visual(kind, false, 20.0, 42), hierarchy_visual(kind, false, 20.0, 42));
		assert_ne!(
			hierarchy_visual(kind, false, 20.0, 0).pulse,
			hierarchy_visual(kind, false, 20.0, 40).pulse
		);
	}
}
