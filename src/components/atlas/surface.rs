//! Minimal 2D drawing surface used by the renderer.
//!
//! The browser implementation wraps a `CanvasRenderingContext2d`; tests use a
//! recorder that keeps the operations in order.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasGradient, CanvasRenderingContext2d};

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
	Solid(String),
	/// Radial gradient between two concentric-or-offset circles.
	Radial {
		inner: (f64, f64, f64),
		outer: (f64, f64, f64),
		stops: Vec<(f64, String)>,
	},
	Linear {
		from: (f64, f64),
		to: (f64, f64),
		stops: Vec<(f64, String)>,
	},
}

impl Paint {
	pub fn solid(color: impl Into<String>) -> Self {
		Paint::Solid(color.into())
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
	pub paint: Paint,
	pub width: f64,
	pub dash: Vec<f64>,
}

impl Stroke {
	pub fn new(color: impl Into<String>, width: f64) -> Self {
		Self {
			paint: Paint::solid(color),
			width,
			dash: Vec::new(),
		}
	}

	pub fn dashed(mut self, dash: &[f64]) -> Self {
		self.dash = dash.to_vec();
		self
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
	Left,
	Center,
	Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Baseline {
	Alphabetic,
	Middle,
	Top,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
	pub font: String,
	pub color: String,
	pub align: Align,
	pub baseline: Baseline,
}

pub trait Surface {
	fn clear(&mut self, width: f64, height: f64);
	fn fill_circle(&mut self, x: f64, y: f64, r: f64, paint: &Paint);
	fn stroke_circle(&mut self, x: f64, y: f64, r: f64, stroke: &Stroke);
	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &Stroke);
	fn stroke_quad(&mut self, from: (f64, f64), ctrl: (f64, f64), to: (f64, f64), stroke: &Stroke);
	fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);
}

/// Canvas-backed surface. Coordinates are CSS pixels; the device pixel ratio
/// is applied once as the context's base transform on resize.
pub struct CanvasSurface {
	ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
	pub fn new(ctx: CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}

	pub fn set_pixel_ratio(&self, dpr: f64) {
		let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
	}

	fn gradient(&self, paint: &Paint) -> Option<CanvasGradient> {
		let (gradient, stops) = match paint {
			Paint::Solid(_) => return None,
			Paint::Radial {
				inner,
				outer,
				stops,
			} => (
				self.ctx
					.create_radial_gradient(inner.0, inner.1, inner.2, outer.0, outer.1, outer.2)
					.ok()?,
				stops,
			),
			Paint::Linear { from, to, stops } => (
				self.ctx.create_linear_gradient(from.0, from.1, to.0, to.1),
				stops,
			),
		};
		for (offset, color) in stops {
			let _ = gradient.add_color_stop(*offset as f32, color);
		}
		Some(gradient)
	}

	fn set_fill(&self, paint: &Paint) {
		match paint {
			Paint::Solid(color) => self.ctx.set_fill_style_str(color),
			_ => {
				if let Some(gradient) = self.gradient(paint) {
					#[allow(deprecated)]
					self.ctx.set_fill_style(&gradient);
				}
			}
		}
	}

	fn set_stroke(&self, stroke: &Stroke) {
		match &stroke.paint {
			Paint::Solid(color) => self.ctx.set_stroke_style_str(color),
			paint => {
				if let Some(gradient) = self.gradient(paint) {
					#[allow(deprecated)]
					self.ctx.set_stroke_style(&gradient);
				}
			}
		}
		self.ctx.set_line_width(stroke.width);
		let dash: js_sys::Array = stroke.dash.iter().map(|d| JsValue::from_f64(*d)).collect();
		let _ = self.ctx.set_line_dash(&dash);
	}
}

impl Surface for CanvasSurface {
	fn clear(&mut self, width: f64, height: f64) {
		self.ctx.clear_rect(0.0, 0.0, width, height);
	}

	fn fill_circle(&mut self, x: f64, y: f64, r: f64, paint: &Paint) {
		self.set_fill(paint);
		self.ctx.begin_path();
		let _ = self.ctx.arc(x, y, r.max(0.0), 0.0, 2.0 * PI);
		self.ctx.fill();
	}

	fn stroke_circle(&mut self, x: f64, y: f64, r: f64, stroke: &Stroke) {
		self.set_stroke(stroke);
		self.ctx.begin_path();
		let _ = self.ctx.arc(x, y, r.max(0.0), 0.0, 2.0 * PI);
		self.ctx.stroke();
	}

	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &Stroke) {
		self.set_stroke(stroke);
		self.ctx.begin_path();
		self.ctx.move_to(from.0, from.1);
		self.ctx.line_to(to.0, to.1);
		self.ctx.stroke();
	}

	fn stroke_quad(&mut self, from: (f64, f64), ctrl: (f64, f64), to: (f64, f64), stroke: &Stroke) {
		self.set_stroke(stroke);
		self.ctx.begin_path();
		self.ctx.move_to(from.0, from.1);
		self.ctx.quadratic_curve_to(ctrl.0, ctrl.1, to.0, to.1);
		self.ctx.stroke();
	}

	fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
		self.ctx.set_font(&style.font);
		self.ctx.set_fill_style_str(&style.color);
		self.ctx.set_text_align(match style.align {
			Align::Left => "left",
			Align::Center => "center",
			Align::Right => "right",
		});
		self.ctx.set_text_baseline(match style.baseline {
			Baseline::Alphabetic => "alphabetic",
			Baseline::Middle => "middle",
			Baseline::Top => "top",
		});
		let _ = self.ctx.fill_text(text, x, y);
	}
}
