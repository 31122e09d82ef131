//! Per-graph animation loop.
//!
//! Each graph owns one chain of `requestAnimationFrame` callbacks. The chain
//! checks its graph's active flag at the top of every frame and simply stops
//! when the graph is no longer in the foreground; [`FrameGate`] guarantees a
//! graph never runs two chains at once.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::debug;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default)]
pub struct FrameGate {
	running: Cell<bool>,
	frames: Cell<u64>,
}

impl FrameGate {
	/// Marks the chain as running. Returns `false` when one already is, in
	/// which case no new chain may be started.
	pub fn start(&self) -> bool {
		!self.running.replace(true)
	}

	/// Top-of-frame check. Returns the new frame number when the frame should
	/// draw and reschedule; `None` ends the chain.
	pub fn step(&self, active: bool) -> Option<u64> {
		if !active {
			self.running.set(false);
			return None;
		}
		let frame = self.frames.get().wrapping_add(1);
		self.frames.set(frame);
		Some(frame)
	}

	pub fn is_running(&self) -> bool {
		self.running.get()
	}

	pub fn frames(&self) -> u64 {
		self.frames.get()
	}
}

fn request_frame(cb: &Closure<dyn FnMut()>) {
	if let Some(window) = web_sys::window() {
		let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
	}
}

/// Browser driver around a [`FrameGate`].
pub struct AnimationLoop {
	name: &'static str,
	gate: Rc<FrameGate>,
	callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl AnimationLoop {
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			gate: Rc::new(FrameGate::default()),
			callback: Rc::new(RefCell::new(None)),
		}
	}

	/// Sets the per-frame body. `is_active` is consulted before every frame.
	pub fn install(&self, is_active: impl Fn() -> bool + 'static, mut draw: impl FnMut(u64) + 'static) {
		let (gate, callback, name) = (self.gate.clone(), self.callback.clone(), self.name);
		*self.callback.borrow_mut() = Some(Closure::new(move || match gate.step(is_active()) {
			Some(frame) => {
				draw(frame);
				if let Some(ref cb) = *callback.borrow() {
					request_frame(cb);
				}
			}
			None => debug!("{} frame loop stopped", name),
		}));
	}

	/// Starts the chain unless it is already running.
	pub fn start(&self) {
		if !self.gate.start() {
			return;
		}
		match *self.callback.borrow() {
			Some(ref cb) => {
				debug!("{} frame loop started", self.name);
				request_frame(cb);
			}
			// Nothing installed yet; release the gate so a later start can run.
			None => {
				let _ = self.gate.step(false);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn second_start_is_refused_while_running() {
		let gate = FrameGate::default();
		assert!(gate.start());
		assert!(!gate.start());
		assert!(gate.is_running());
	}

	#[test]
	fn inactive_frame_ends_the_chain() {
		let gate = FrameGate::default();
		gate.start();
		assert_eq!(gate.step(true), Some(1));
		assert_eq!(gate.step(true), Some(2));
		assert_eq!(gate.step(false), None);
		assert!(!gate.is_running());
		assert!(gate.start());
		assert_eq!(gate.step(true), Some(3));
	}

	#[test]
	fn quick_reactivation_reuses_the_live_chain() {
		let gate = FrameGate::default();
		gate.start();
		gate.step(true);
		// Switched away and back before the next frame: the old chain is still
		// scheduled and keeps running, no second chain starts.
		assert!(!gate.start());
		assert_eq!(gate.step(true), Some(2));
		assert_eq!(gate.frames(), 2);
	}
}
