//! Pan/zoom state and the world <-> screen transforms.

pub const MIN_ZOOM: f64 = 0.3;
pub const MAX_ZOOM: f64 = 3.0;

/// Viewports whose smaller side (layout) or width (hit radii) falls below
/// this are treated as mobile.
pub const MOBILE_BREAKPOINT_PX: f64 = 600.0;

/// Coarse viewport-size category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceClass {
	Desktop,
	Mobile,
}

impl DeviceClass {
	/// Layout density is chosen from the smaller viewport dimension.
	pub fn for_layout(width: f64, height: f64) -> Self {
		if width.min(height) < MOBILE_BREAKPOINT_PX {
			DeviceClass::Mobile
		} else {
			DeviceClass::Desktop
		}
	}

	/// Hit radii are chosen from the viewport width alone.
	pub fn for_hit_test(width: f64) -> Self {
		if width < MOBILE_BREAKPOINT_PX {
			DeviceClass::Mobile
		} else {
			DeviceClass::Desktop
		}
	}
}

/// Where the world origin sits relative to the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OriginMode {
	/// World `(0, 0)` maps to the viewport center.
	#[default]
	Corner,
	/// World coordinates are laid out in viewport pixels; zoom pivots on the
	/// viewport center.
	Center,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	pub pan_x: f64,
	pub pan_y: f64,
	zoom: f64,
	pub width: f64,
	pub height: f64,
	pub dpr: f64,
	pub origin: OriginMode,
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(OriginMode::default())
	}
}

impl Viewport {
	pub fn new(origin: OriginMode) -> Self {
		Self {
			pan_x: 0.0,
			pan_y: 0.0,
			zoom: 1.0,
			width: 0.0,
			height: 0.0,
			dpr: 1.0,
			origin,
		}
	}

	pub fn zoom(&self) -> f64 {
		self.zoom
	}

	/// Sets zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`. Non-finite input is ignored.
	pub fn set_zoom(&mut self, zoom: f64) {
		if zoom.is_finite() {
			self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
		}
	}

	pub fn zoom_by(&mut self, factor: f64) {
		self.set_zoom(self.zoom * factor);
	}

	pub fn set_pan(&mut self, x: f64, y: f64) {
		if x.is_finite() && y.is_finite() {
			self.pan_x = x;
			self.pan_y = y;
		}
	}

	/// Updates pixel size and display scale. Idempotent.
	pub fn resize(&mut self, width: f64, height: f64, dpr: f64) {
		self.width = width.max(0.0);
		self.height = height.max(0.0);
		self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
	}

	pub fn reset(&mut self) {
		self.pan_x = 0.0;
		self.pan_y = 0.0;
		self.zoom = 1.0;
	}

	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		let (hw, hh) = (self.width / 2.0, self.height / 2.0);
		match self.origin {
			OriginMode::Corner => (
				(wx + self.pan_x) * self.zoom + hw,
				(wy + self.pan_y) * self.zoom + hh,
			),
			OriginMode::Center => (
				(wx - hw + self.pan_x) * self.zoom + hw,
				(wy - hh + self.pan_y) * self.zoom + hh,
			),
		}
	}

	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		let (hw, hh) = (self.width / 2.0, self.height / 2.0);
		match self.origin {
			OriginMode::Corner => (
				(sx - hw) / self.zoom - self.pan_x,
				(sy - hh) / self.zoom - self.pan_y,
			),
			OriginMode::Center => (
				(sx - hw) / self.zoom + hw - self.pan_x,
				(sy - hh) / self.zoom + hh - self.pan_y,
			),
		}
	}

	/// Pans so that the world point lands on the viewport center.
	pub fn center_on(&mut self, wx: f64, wy: f64) {
		match self.origin {
			OriginMode::Corner => self.set_pan(-wx, -wy),
			OriginMode::Center => self.set_pan(self.width / 2.0 - wx, self.height / 2.0 - wy),
		}
	}

	/// Whether a screen point lies within the viewport grown by `margin` on every side.
	pub fn contains_screen(&self, sx: f64, sy: f64, margin: f64) -> bool {
		sx >= -margin && sx <= self.width + margin && sy >= -margin && sy <= self.height + margin
	}
}
