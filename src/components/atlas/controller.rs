//! Viewport controller: turns raw pointer, touch and wheel input into
//! pan/zoom changes and resolved node interactions.

use std::rc::Rc;

use log::debug;

use super::gesture::{GestureTracker, PointerKind};
use super::hit_test::HitTest;
use super::view_state::{GraphKind, ViewState};
use super::viewport::{OriginMode, Viewport};

/// Receives resolved interactions. Both calls happen synchronously inside
/// the input handler, after the gesture state has been updated.
pub trait NodeEvents {
	/// Raw host event passed through to hover consumers.
	type Event;

	fn node_clicked(&self, id: &str);

	fn node_hovered(&self, _id: Option<&str>, _event: &Self::Event, _dragging: bool) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
	#[default]
	Grab,
	Grabbing,
	Pointer,
}

impl Cursor {
	pub fn css(self) -> &'static str {
		match self {
			Cursor::Grab => "grab",
			Cursor::Grabbing => "grabbing",
			Cursor::Pointer => "pointer",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ControllerConfig {
	pub origin: OriginMode,
	pub zoom_in_factor: f64,
	pub zoom_out_factor: f64,
}

impl ControllerConfig {
	pub fn hierarchy() -> Self {
		Self {
			origin: OriginMode::Corner,
			zoom_in_factor: 1.08,
			zoom_out_factor: 0.92,
		}
	}

	pub fn rings() -> Self {
		Self {
			origin: OriginMode::Center,
			zoom_in_factor: 1.1,
			zoom_out_factor: 0.9,
		}
	}
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
	(a.0 - b.0).hypot(a.1 - b.1)
}

pub struct ViewportController<E> {
	graph: GraphKind,
	view_state: Rc<ViewState>,
	events: E,
	config: ControllerConfig,
	pub view: Viewport,
	gesture: GestureTracker,
	hovered: Option<String>,
	cursor: Cursor,
}

impl<E: NodeEvents> ViewportController<E> {
	pub fn new(graph: GraphKind, config: ControllerConfig, view_state: Rc<ViewState>, events: E) -> Self {
		Self {
			graph,
			view_state,
			events,
			view: Viewport::new(config.origin),
			config,
			gesture: GestureTracker::default(),
			hovered: None,
			cursor: Cursor::default(),
		}
	}

	pub fn events(&self) -> &E {
		&self.events
	}

	pub fn is_active(&self) -> bool {
		self.view_state.is_active(self.graph)
	}

	pub fn hovered(&self) -> Option<&str> {
		self.hovered.as_deref()
	}

	pub fn cursor(&self) -> Cursor {
		self.cursor
	}

	pub fn resize(&mut self, width: f64, height: f64, dpr: f64) {
		self.view.resize(width, height, dpr);
	}

	pub fn reset_view(&mut self) {
		self.view.reset();
	}

	pub fn zoom_in(&mut self) {
		self.view.zoom_by(self.config.zoom_in_factor);
	}

	pub fn zoom_out(&mut self) {
		self.view.zoom_by(self.config.zoom_out_factor);
	}

	/// Zooms about the viewport center. Returns whether the event was consumed.
	pub fn wheel(&mut self, delta_y: f64) -> bool {
		if !self.is_active() {
			return false;
		}
		if delta_y > 0.0 {
			self.zoom_out();
		} else {
			self.zoom_in();
		}
		true
	}

	/// Primary-button press.
	pub fn mouse_down(&mut self, x: f64, y: f64, time_ms: f64) {
		if !self.is_active() {
			return;
		}
		self.gesture.begin(PointerKind::Mouse, x, y, time_ms, &self.view);
		self.update_cursor();
	}

	pub fn mouse_move(&mut self, x: f64, y: f64, event: &E::Event, hit: &dyn HitTest) {
		if !self.is_active() {
			return;
		}
		self.gesture.update(x, y, &mut self.view);
		self.hovered = hit.hit_test(&self.view, x, y).map(str::to_string);
		self.update_cursor();
		self.events
			.node_hovered(self.hovered.as_deref(), event, self.gesture.is_panning());
	}

	pub fn mouse_up(&mut self, x: f64, y: f64, time_ms: f64, hit: &dyn HitTest) {
		if !self.is_active() {
			return;
		}
		let click = self.gesture.end(x, y, time_ms);
		self.update_cursor();
		if let Some((cx, cy)) = click {
			self.dispatch_click(cx, cy, hit);
		}
	}

	/// Pointer left the canvas: any pan ends and hover clears.
	pub fn mouse_leave(&mut self) {
		self.gesture.cancel();
		self.hovered = None;
		self.cursor = Cursor::Grab;
	}

	pub fn touch_start(&mut self, touches: &[(f64, f64)], time_ms: f64) {
		if !self.is_active() {
			return;
		}
		match touches {
			[(x, y)] => self.gesture.begin(PointerKind::Touch, *x, *y, time_ms, &self.view),
			[a, b] => self.gesture.begin_pinch(distance(*a, *b), &self.view),
			_ => {}
		}
	}

	pub fn touch_move(&mut self, touches: &[(f64, f64)]) {
		if !self.is_active() {
			return;
		}
		match touches {
			[(x, y)] => self.gesture.update(*x, *y, &mut self.view),
			[a, b] => self.gesture.update_pinch(distance(*a, *b), &mut self.view),
			_ => {}
		}
	}

	/// A finger lifted at `released`; `remaining` are the touches still down.
	pub fn touch_end(
		&mut self,
		released: (f64, f64),
		remaining: &[(f64, f64)],
		time_ms: f64,
		hit: &dyn HitTest,
	) {
		if !self.is_active() {
			return;
		}
		if remaining.is_empty() {
			if let Some((x, y)) = self.gesture.end(released.0, released.1, time_ms) {
				self.dispatch_click(x, y, hit);
			}
		}
		if remaining.len() < 2 {
			self.gesture
				.end_pinch(remaining.first().copied(), time_ms, &self.view);
		}
	}

	fn dispatch_click(&mut self, x: f64, y: f64, hit: &dyn HitTest) {
		if let Some(id) = hit.hit_test(&self.view, x, y) {
			debug!("{:?}: node {} selected at ({:.0}, {:.0})", self.graph, id, x, y);
			self.events.node_clicked(id);
		}
	}

	fn update_cursor(&mut self) {
		self.cursor = if self.hovered.is_some() {
			Cursor::Pointer
		} else if self.gesture.is_panning() {
			Cursor::Grabbing
		} else {
			Cursor::Grab
		};
	}
}
