//! Pointer gesture state machine shared by mouse and touch input.
//!
//! ```text
//! Idle ──begin──► Panning ──end──► Idle (+ click/tap point)
//!   ▲                │ begin_pinch
//!   │                ▼
//!   └──end_pinch── Pinching ──end_pinch(remaining finger)──► Panning (no tap)
//! ```
//!
//! The tracker only mutates the viewport; resolving the click point to a node
//! is left to the caller.

use super::viewport::Viewport;

/// Mouse releases closer than this to the press point (both axes) are clicks.
pub const CLICK_SLOP_PX: f64 = 5.0;
/// Touch moves beyond this on either axis disqualify the touch as a tap.
pub const TAP_SLOP_PX: f64 = 3.0;
/// Touches held at least this long are not taps.
pub const TAP_MAX_MS: f64 = 300.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
	Mouse,
	Touch,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanGesture {
	pub kind: PointerKind,
	pub anchor: (f64, f64),
	pub pan_start: (f64, f64),
	pub started_ms: f64,
	/// Sticky: set once a touch moves past `TAP_SLOP_PX`.
	pub moved: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchGesture {
	pub start_distance: f64,
	pub start_zoom: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	Panning(PanGesture),
	Pinching(PinchGesture),
}

#[derive(Clone, Debug, Default)]
pub struct GestureTracker {
	state: Gesture,
}

impl GestureTracker {
	pub fn state(&self) -> &Gesture {
		&self.state
	}

	pub fn is_panning(&self) -> bool {
		matches!(self.state, Gesture::Panning(_))
	}

	/// Primary press or single-finger touch start.
	pub fn begin(&mut self, kind: PointerKind, x: f64, y: f64, time_ms: f64, view: &Viewport) {
		self.state = Gesture::Panning(PanGesture {
			kind,
			anchor: (x, y),
			pan_start: (view.pan_x, view.pan_y),
			started_ms: time_ms,
			moved: false,
		});
	}

	/// Pointer moved while pressed. Pan follows the pointer at constant
	/// perceived speed regardless of zoom.
	pub fn update(&mut self, x: f64, y: f64, view: &mut Viewport) {
		let Gesture::Panning(pan) = &mut self.state else {
			return;
		};
		let (dx, dy) = (x - pan.anchor.0, y - pan.anchor.1);
		if pan.kind == PointerKind::Touch && (dx.abs() > TAP_SLOP_PX || dy.abs() > TAP_SLOP_PX) {
			pan.moved = true;
		}
		let zoom = view.zoom();
		view.set_pan(pan.pan_start.0 + dx / zoom, pan.pan_start.1 + dy / zoom);
	}

	/// Release. Returns the screen point to hit-test when the release counts
	/// as a click (mouse: release point) or a tap (touch: initial press point).
	pub fn end(&mut self, x: f64, y: f64, time_ms: f64) -> Option<(f64, f64)> {
		let Gesture::Panning(pan) = std::mem::take(&mut self.state) else {
			return None;
		};
		match pan.kind {
			PointerKind::Mouse => {
				let still = (x - pan.anchor.0).abs() < CLICK_SLOP_PX
					&& (y - pan.anchor.1).abs() < CLICK_SLOP_PX;
				still.then_some((x, y))
			}
			PointerKind::Touch => {
				let quick = time_ms - pan.started_ms < TAP_MAX_MS;
				(!pan.moved && quick).then_some(pan.anchor)
			}
		}
	}

	/// Second finger down: records the pinch baseline.
	pub fn begin_pinch(&mut self, distance: f64, view: &Viewport) {
		self.state = if distance > 0.0 {
			Gesture::Pinching(PinchGesture {
				start_distance: distance,
				start_zoom: view.zoom(),
			})
		} else {
			Gesture::Idle
		};
	}

	pub fn update_pinch(&mut self, distance: f64, view: &mut Viewport) {
		if let Gesture::Pinching(pinch) = self.state {
			view.set_zoom(pinch.start_zoom * (distance / pinch.start_distance));
		}
	}

	/// Fewer than two fingers remain. The baseline is dropped; a remaining
	/// finger keeps panning from where it is but can no longer tap.
	pub fn end_pinch(&mut self, remaining: Option<(f64, f64)>, time_ms: f64, view: &Viewport) {
		if !matches!(self.state, Gesture::Pinching(_)) {
			return;
		}
		self.state = match remaining {
			Some((x, y)) => Gesture::Panning(PanGesture {
				kind: PointerKind::Touch,
				anchor: (x, y),
				pan_start: (view.pan_x, view.pan_y),
				started_ms: time_ms,
				moved: true,
			}),
			None => Gesture::Idle,
		};
	}

	pub fn cancel(&mut self) {
		self.state = Gesture::Idle;
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::atlas::viewport::{MAX_ZOOM, MIN_ZOOM};

	fn view() -> Viewport {
		let mut v = Viewport::default();
		v.resize(800.0, 600.0, 1.0);
		v
	}

	#[test]
	fn small_mouse_displacement_is_a_click() {
		let mut v = view();
		let mut g = GestureTracker::default();
		g.begin(PointerKind::Mouse, 100.0, 100.0, 0.0, &v);
		g.update(102.0, 101.0, &mut v);
		assert_eq!(g.end(102.0, 101.0, 10.0), Some((102.0, 101.0)));
		assert_eq!(*g.state(), Gesture::Idle);
	}

	#[test]
	fn large_mouse_displacement_suppresses_click() {
		let mut v = view();
		let mut g = GestureTracker::default();
		g.begin(PointerKind::Mouse, 100.0, 100.0, 0.0, &v);
		g.update(200.0, 100.0, &mut v);
		assert_eq!(g.end(200.0, 100.0, 10.0), None);
		assert_eq!(g.end(200.0, 100.0, 10.0), None);
	}

	#[test]
	fn click_slop_is_exclusive() {
		let v = view();
		let mut g = GestureTracker::default();
		g.begin(PointerKind::Mouse, 0.0, 0.0, 0.0, &v);
		assert_eq!(g.end(5.0, 0.0, 0.0), None);
		g.begin(PointerKind::Mouse, 0.0, 0.0, 0.0, &v);
		assert!(g.end(4.9, -4.9, 0.0).is_some());
	}

	#[test]
	fn drag_speed_is_independent_of_zoom() {
		let mut v = view();
		v.set_zoom(2.0);
		v.set_pan(10.0, 10.0);
		let mut g = GestureTracker::default();
		g.begin(PointerKind::Mouse, 100.0, 100.0, 0.0, &v);
		let before = v.world_to_screen(0.0, 0.0);
		g.update(140.0, 80.0, &mut v);
		let after = v.world_to_screen(0.0, 0.0);
		assert_eq!((after.0 - before.0, after.1 - before.1), (40.0, -20.0));
		assert_eq!((v.pan_x, v.pan_y), (30.0, 0.0));
	}

	#[test]
	fn quick_still_touch_taps_at_press_point() {
		let mut v = view();
		let mut g = GestureTracker::default();
		g.begin(PointerKind::Touch, 50.0, 60.0, 0.0, &v);
		g.update(52.0, 61.0, &mut v);
		assert_eq!(g.end(52.0, 61.0, 250.0), Some((50.0, 60.0)));
	}

	#[test]
	fn slow_touch_is_not_a_tap() {
		let v = view();
		let mut g = GestureTracker::default();
		g.begin(PointerKind::Touch, 50.0, 60.0, 0.0, &v);
		assert_eq!(g.end(50.0, 60.0, 350.0), None);
	}

	#[test]
	fn moved_touch_is_not_a_tap_even_if_it_returns() {
		let mut v = view();
		let mut g = GestureTracker::default();
		g.begin(PointerKind::Touch, 50.0, 60.0, 0.0, &v);
		g.update(54.0, 60.0, &mut v);
		g.update(50.0, 60.0, &mut v);
		assert_eq!(g.end(50.0, 60.0, 100.0), None);
	}

	#[test]
	fn pinch_scales_from_baseline() {
		let mut v = view();
		v.set_zoom(1.5);
		let mut g = GestureTracker::default();
		g.begin_pinch(100.0, &v);
		g.update_pinch(150.0, &mut v);
		assert!((v.zoom() - 2.25).abs() < 1e-12);
		g.update_pinch(50.0, &mut v);
		assert!((v.zoom() - 0.75).abs() < 1e-12);
	}

	#[test]
	fn dropping_a_finger_resets_pinch_and_blocks_tap() {
		let mut v = view();
		let mut g = GestureTracker::default();
		g.begin(PointerKind::Touch, 10.0, 10.0, 0.0, &v);
		g.begin_pinch(80.0, &v);
		g.end_pinch(Some((30.0, 30.0)), 40.0, &v);
		assert!(g.is_panning());
		g.update_pinch(160.0, &mut v);
		assert_eq!(v.zoom(), 1.0);
		assert_eq!(g.end(30.0, 30.0, 60.0), None);
	}

	#[test]
	fn zero_distance_pinch_is_ignored() {
		let mut v = view();
		let mut g = GestureTracker::default();
		g.begin_pinch(0.0, &v);
		g.update_pinch(100.0, &mut v);
		assert_eq!(v.zoom(), 1.0);
	}

	proptest! {
		#[test]
		fn pinch_zoom_stays_in_bounds(
			start in 1.0..500.0f64,
			steps in prop::collection::vec(0.0..2000.0f64, 1..32),
		) {
			let mut v = view();
			let mut g = GestureTracker::default();
			g.begin_pinch(start, &v);
			for d in steps {
				g.update_pinch(d, &mut v);
				prop_assert!((MIN_ZOOM..=MAX_ZOOM).contains(&v.zoom()));
			}
		}
	}
}
