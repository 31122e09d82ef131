use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, TouchList, WheelEvent,
	Window,
};

use super::controller::{Cursor, NodeEvents};
use super::frame_loop::AnimationLoop;
use super::scene::GraphView;
use super::surface::CanvasSurface;
use super::view_state::ViewState;

/// Canvas-relative position of a client point.
fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, x: i32, y: i32) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((x as f64 - rect.left(), y as f64 - rect.top()))
}

fn touch_points(canvas_ref: NodeRef<leptos::html::Canvas>, list: &TouchList) -> Vec<(f64, f64)> {
	(0..list.length())
		.filter_map(|i| list.get(i))
		.filter_map(|t| local_point(canvas_ref, t.client_x(), t.client_y()))
		.collect()
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// CSS size of the canvas: the window when fullscreen, otherwise the
/// explicit size or the parent's client box.
fn css_size(
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		if let Some(size) = web_sys::window().as_ref().and_then(window_size) {
			return size;
		}
	}
	(
		width.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0)
		}),
	)
}

/// Canvas bound to one graph. Input reaches the graph's controller only while
/// the graph is active; drawing runs on the graph's own frame loop.
#[component]
pub fn AtlasCanvas<E>(
	graph: Rc<RefCell<GraphView<E>>>,
	view_state: Rc<ViewState>,
	frames: Rc<AnimationLoop>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView
where
	E: NodeEvents<Event = MouseEvent> + 'static,
{
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let cursor = RwSignal::new(Cursor::default());
	let size = RwSignal::new((0.0_f64, 0.0_f64));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (graph_init, state_init, frames_init, resize_cb_init) =
		(graph.clone(), view_state.clone(), frames.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Ok(Some(ctx)) = canvas.get_context("2d") else {
			return;
		};
		let Ok(ctx) = ctx.dyn_into::<CanvasRenderingContext2d>() else {
			return;
		};
		let surface = Rc::new(RefCell::new(CanvasSurface::new(ctx)));

		let apply_size = {
			let (canvas, surface, graph) = (canvas.clone(), surface.clone(), graph_init.clone());
			move || {
				let (w, h) = css_size(&canvas, fullscreen, width, height);
				let dpr = web_sys::window().map_or(1.0, |win| win.device_pixel_ratio());
				canvas.set_width((w * dpr) as u32);
				canvas.set_height((h * dpr) as u32);
				size.set((w, h));
				surface.borrow().set_pixel_ratio(dpr);
				graph.borrow_mut().on_resize(w, h, dpr);
			}
		};
		apply_size();
		*resize_cb_init.borrow_mut() = Some(Closure::new(apply_size));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (graph_draw, state_draw, state_active) =
			(graph_init.clone(), state_init.clone(), state_init.clone());
		let kind = graph_init.borrow().kind();
		frames_init.install(
			move || state_active.is_active(kind),
			move |frame| {
				graph_draw.borrow().draw(
					&mut *surface.borrow_mut(),
					frame,
					state_draw.show_connections(),
				);
			},
		);
		if state_init.is_active(kind) {
			graph_init.borrow_mut().activate();
			frames_init.start();
		}
	});

	let graph_md = graph.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		let mut g = graph_md.borrow_mut();
		g.controller.mouse_down(x, y, js_sys::Date::now());
		cursor.set(g.controller.cursor());
	};

	let graph_mm = graph.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		let mut g = graph_mm.borrow_mut();
		g.mouse_move(x, y, &ev);
		cursor.set(g.controller.cursor());
	};

	let graph_mu = graph.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		let mut g = graph_mu.borrow_mut();
		g.mouse_up(x, y, js_sys::Date::now());
		cursor.set(g.controller.cursor());
	};

	let graph_ml = graph.clone();
	let on_mouseleave = move |ev: MouseEvent| {
		let mut g = graph_ml.borrow_mut();
		g.controller.mouse_leave();
		g.controller.events().node_hovered(None, &ev, false);
		cursor.set(g.controller.cursor());
	};

	let graph_wh = graph.clone();
	let on_wheel = move |ev: WheelEvent| {
		if graph_wh.borrow_mut().controller.wheel(ev.delta_y()) {
			ev.prevent_default();
		}
	};

	let graph_ts = graph.clone();
	let on_touchstart = move |ev: TouchEvent| {
		let touches = touch_points(canvas_ref, &ev.touches());
		let mut g = graph_ts.borrow_mut();
		if g.controller.is_active() {
			ev.prevent_default();
		}
		g.controller.touch_start(&touches, js_sys::Date::now());
	};

	let graph_tm = graph.clone();
	let on_touchmove = move |ev: TouchEvent| {
		let touches = touch_points(canvas_ref, &ev.touches());
		let mut g = graph_tm.borrow_mut();
		if g.controller.is_active() {
			ev.prevent_default();
		}
		g.controller.touch_move(&touches);
	};

	let graph_te = graph.clone();
	let on_touchend = move |ev: TouchEvent| {
		let Some(released) = touch_points(canvas_ref, &ev.changed_touches()).first().copied() else {
			return;
		};
		let remaining = touch_points(canvas_ref, &ev.touches());
		graph_te
			.borrow_mut()
			.touch_end(released, &remaining, js_sys::Date::now());
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="atlas-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			style:display="block"
			style:touch-action="none"
			style:cursor=move || cursor.get().css()
			style:width=move || format!("{}px", size.get().0)
			style:height=move || format!("{}px", size.get().1)
		/>
	}
}
