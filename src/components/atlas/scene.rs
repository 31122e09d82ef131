//! A graph's dataset, its derived positions and the controller driving it.

use std::rc::Rc;
use std::sync::Arc;

use log::{info, warn};

use super::controller::{ControllerConfig, NodeEvents, ViewportController};
use super::hit_test::{HitTest, hit_hierarchy, hit_rings};
use super::layout::{Position, PositionTable, RingLayout, radial_layout, ring_layout};
use super::render::{FrameContext, draw_hierarchy, draw_rings};
use super::surface::Surface;
use super::types::{HierarchyData, RingData};
use super::view_state::{GraphKind, ViewState};
use super::viewport::{DeviceClass, Viewport};

/// Hierarchy zoom applied on the first layout of a small viewport.
pub const INITIAL_MOBILE_ZOOM: f64 = 0.75;
/// Zoom used when jumping to a single node.
pub const NODE_FOCUS_ZOOM: f64 = 1.5;
/// Zoom used when jumping to a branch from the legend.
pub const BRANCH_FOCUS_ZOOM: f64 = 1.3;
/// Branch focus keeps the branch left of center, clear of the detail panel.
const BRANCH_FOCUS_SHIFT: f64 = 100.0;

pub struct HierarchyScene {
	pub data: Arc<HierarchyData>,
	positions: PositionTable,
}

impl HierarchyScene {
	pub fn new(data: Arc<HierarchyData>) -> Self {
		Self {
			data,
			positions: PositionTable::new(),
		}
	}

	fn relayout(&mut self, width: f64, height: f64) {
		self.positions = radial_layout(&self.data, width, height);
		for id in self.data.ids() {
			let Some(node) = self.data.node(id) else {
				continue;
			};
			for target in &node.info().connections {
				if !self.positions.contains_key(target) {
					warn!("hierarchy: {} connects to unknown node {}", id, target);
				}
			}
		}
	}
}

pub struct RingScene {
	pub data: Arc<RingData>,
	layout: RingLayout,
}

impl RingScene {
	pub fn new(data: Arc<RingData>) -> Self {
		Self {
			data,
			layout: RingLayout::default(),
		}
	}
}

pub enum AnyScene {
	Hierarchy(HierarchyScene),
	Rings(RingScene),
}

impl AnyScene {
	pub fn kind(&self) -> GraphKind {
		match self {
			AnyScene::Hierarchy(_) => GraphKind::Hierarchy,
			AnyScene::Rings(_) => GraphKind::Rings,
		}
	}

	fn relayout(&mut self, width: f64, height: f64) {
		match self {
			AnyScene::Hierarchy(scene) => scene.relayout(width, height),
			AnyScene::Rings(scene) => scene.layout = ring_layout(&scene.data, width, height),
		}
	}

	fn positions(&self) -> &PositionTable {
		match self {
			AnyScene::Hierarchy(scene) => &scene.positions,
			AnyScene::Rings(scene) => &scene.layout.positions,
		}
	}

	pub fn position(&self, id: &str) -> Option<&Position> {
		self.positions().get(id)
	}

	pub fn draw(&self, s: &mut dyn Surface, f: &FrameContext<'_>) {
		match self {
			AnyScene::Hierarchy(scene) => draw_hierarchy(s, &scene.data, &scene.positions, f),
			AnyScene::Rings(scene) => draw_rings(s, &scene.data, &scene.layout, f),
		}
	}
}

impl HitTest for AnyScene {
	fn hit_test(&self, view: &Viewport, sx: f64, sy: f64) -> Option<&str> {
		match self {
			AnyScene::Hierarchy(scene) => hit_hierarchy(&scene.data, &scene.positions, view, sx, sy),
			AnyScene::Rings(scene) => hit_rings(&scene.data, &scene.layout.positions, view, sx, sy),
		}
	}
}

/// One graph: scene plus controller. Layout is derived lazily from the
/// viewport size and recomputed when the size it was built for is stale.
pub struct GraphView<E> {
	pub controller: ViewportController<E>,
	scene: AnyScene,
	layout_size: Option<(f64, f64)>,
}

impl<E: NodeEvents> GraphView<E> {
	pub fn new(scene: AnyScene, view_state: Rc<ViewState>, events: E) -> Self {
		let kind = scene.kind();
		let config = match kind {
			GraphKind::Hierarchy => ControllerConfig::hierarchy(),
			GraphKind::Rings => ControllerConfig::rings(),
		};
		Self {
			controller: ViewportController::new(kind, config, view_state, events),
			scene,
			layout_size: None,
		}
	}

	pub fn scene(&self) -> &AnyScene {
		&self.scene
	}

	pub fn kind(&self) -> GraphKind {
		self.scene.kind()
	}

	pub fn is_stale(&self) -> bool {
		let view = &self.controller.view;
		self.layout_size != Some((view.width, view.height))
	}

	/// Recomputes positions if the viewport changed since the last layout.
	pub fn ensure_layout(&mut self) {
		if !self.is_stale() {
			return;
		}
		let (width, height) = (self.controller.view.width, self.controller.view.height);
		let first = self.layout_size.is_none();
		self.scene.relayout(width, height);
		self.layout_size = Some((width, height));
		let device = DeviceClass::for_layout(width, height);
		info!(
			"{:?}: layout for {:.0}x{:.0} ({:?}), {} nodes",
			self.kind(),
			width,
			height,
			device,
			self.scene.positions().len()
		);
		if first && self.kind() == GraphKind::Hierarchy && device == DeviceClass::Mobile {
			self.controller.view.set_zoom(INITIAL_MOBILE_ZOOM);
		}
	}

	/// New canvas size. Only the foreground graph relayouts immediately; a
	/// background graph catches up on its next activation.
	pub fn on_resize(&mut self, width: f64, height: f64, dpr: f64) {
		self.controller.resize(width, height, dpr);
		if self.controller.is_active() {
			self.ensure_layout();
		}
	}

	pub fn activate(&mut self) {
		info!("{:?}: activated", self.kind());
		self.ensure_layout();
	}

	/// Centers the node and applies `zoom`. Returns `false` for unknown ids.
	pub fn focus_node(&mut self, id: &str, zoom: f64) -> bool {
		self.ensure_layout();
		let Some(&pos) = self.scene.position(id) else {
			return false;
		};
		self.controller.view.center_on(pos.x, pos.y);
		self.controller.view.set_zoom(zoom);
		true
	}

	/// Legend jump: like [`Self::focus_node`] but leaves room for the panel.
	pub fn focus_branch(&mut self, id: &str) -> bool {
		if !self.focus_node(id, BRANCH_FOCUS_ZOOM) {
			return false;
		}
		let view = &mut self.controller.view;
		view.set_pan(view.pan_x + BRANCH_FOCUS_SHIFT, view.pan_y);
		true
	}

	/// Frames a ring: its node centroid at the viewport center with the
	/// ring's focus zoom. The center ring resets the pan instead and returns
	/// its focal node so the caller can open it.
	pub fn focus_ring(&mut self, ring_id: &str) -> Option<String> {
		self.ensure_layout();
		let AnyScene::Rings(scene) = &self.scene else {
			return None;
		};
		let ring = scene.data.ring(ring_id)?;
		let view = &mut self.controller.view;
		if ring.is_center() {
			view.set_pan(0.0, 0.0);
			view.set_zoom(ring.focus_zoom);
			return ring.nodes.first().map(|n| n.id.clone());
		}
		let placed: Vec<&Position> = ring
			.nodes
			.iter()
			.filter_map(|n| scene.layout.positions.get(&n.id))
			.collect();
		if placed.is_empty() {
			return None;
		}
		let n = placed.len() as f64;
		let cx = placed.iter().map(|p| p.x).sum::<f64>() / n;
		let cy = placed.iter().map(|p| p.y).sum::<f64>() / n;
		view.center_on(cx, cy);
		view.set_zoom(ring.focus_zoom);
		None
	}

	pub fn draw(&self, s: &mut dyn Surface, frame: u64, show_connections: bool) {
		let f = FrameContext {
			view: &self.controller.view,
			hovered: self.controller.hovered(),
			frame,
			show_connections,
		};
		self.scene.draw(s, &f);
	}

	pub fn mouse_move(&mut self, x: f64, y: f64, event: &E::Event) {
		self.controller.mouse_move(x, y, event, &self.scene);
	}

	pub fn mouse_up(&mut self, x: f64, y: f64, time_ms: f64) {
		self.controller.mouse_up(x, y, time_ms, &self.scene);
	}

	pub fn touch_end(&mut self, released: (f64, f64), remaining: &[(f64, f64)], time_ms: f64) {
		self.controller
			.touch_end(released, remaining, time_ms, &self.scene);
	}
}
