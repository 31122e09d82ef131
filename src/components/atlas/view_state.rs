//! View state shared by both graphs and their renderers.

use std::cell::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphKind {
	/// Branch/child map.
	Hierarchy,
	/// Concentric ring map.
	Rings,
}

/// Which graph owns the canvas and whether declared connections are drawn.
///
/// Shared by `Rc` between the two controllers and frame loops. Only the active
/// graph reacts to input or schedules frames.
#[derive(Debug)]
pub struct ViewState {
	active: Cell<GraphKind>,
	show_connections: Cell<bool>,
}

impl Default for ViewState {
	fn default() -> Self {
		Self::new(GraphKind::Hierarchy)
	}
}

impl ViewState {
	pub fn new(active: GraphKind) -> Self {
		Self {
			active: Cell::new(active),
			show_connections: Cell::new(true),
		}
	}

	pub fn active(&self) -> GraphKind {
		self.active.get()
	}

	pub fn is_active(&self, graph: GraphKind) -> bool {
		self.active.get() == graph
	}

	/// Returns whether the active graph changed.
	pub fn set_active(&self, graph: GraphKind) -> bool {
		self.active.replace(graph) != graph
	}

	pub fn show_connections(&self) -> bool {
		self.show_connections.get()
	}

	/// Flips the connection toggle and returns the new value.
	pub fn toggle_connections(&self) -> bool {
		let show = !self.show_connections.get();
		self.show_connections.set(show);
		show
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn exactly_one_graph_is_active() {
		let state = ViewState::default();
		assert!(state.is_active(GraphKind::Hierarchy));
		assert!(!state.is_active(GraphKind::Rings));
		assert!(state.set_active(GraphKind::Rings));
		assert!(!state.set_active(GraphKind::Rings));
		assert!(state.is_active(GraphKind::Rings));
		assert!(!state.is_active(GraphKind::Hierarchy));
	}

	#[test]
	fn connections_toggle() {
		let state = ViewState::default();
		assert!(state.show_connections());
		assert!(!state.toggle_connections());
		assert!(state.toggle_connections());
	}
}
