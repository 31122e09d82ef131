use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;

use crate::components::atlas::{
	AnimationLoop, AnyScene, AtlasCanvas, GraphKind, GraphView, HierarchyData, HierarchyScene,
	NODE_FOCUS_ZOOM, RingData, RingScene, ViewState, load_embedded,
};
use crate::components::panel::{DetailPanel, NodeTooltip, PanelEvents, Selection, Tooltip};

const SEARCH_RESULT_LIMIT: usize = 8;

type Graph = Rc<RefCell<GraphView<PanelEvents>>>;

/// Jump requests from the legend and search box.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Focus {
	Node(String),
	Branch(String),
	Ring(String),
}

/// Both graphs and their frame loops, shared by the toolbar and tabs.
#[derive(Clone)]
struct Atlas {
	view_state: Rc<ViewState>,
	hierarchy: Graph,
	rings: Graph,
	hierarchy_frames: Rc<AnimationLoop>,
	ring_frames: Rc<AnimationLoop>,
}

impl Atlas {
	fn graph(&self, kind: GraphKind) -> &Graph {
		match kind {
			GraphKind::Hierarchy => &self.hierarchy,
			GraphKind::Rings => &self.rings,
		}
	}

	fn active(&self) -> &Graph {
		self.graph(self.view_state.active())
	}

	/// Moves the canvas to `kind`: the other graph's loop stops at its next
	/// frame, this one relayouts if stale and starts its own.
	fn switch_to(&self, kind: GraphKind) {
		if !self.view_state.set_active(kind) {
			return;
		}
		self.graph(kind).borrow_mut().activate();
		match kind {
			GraphKind::Hierarchy => self.hierarchy_frames.start(),
			GraphKind::Rings => self.ring_frames.start(),
		}
	}
}

#[component]
fn AtlasPage(hierarchy: Arc<HierarchyData>, rings: Arc<RingData>) -> impl IntoView {
	let selection = RwSignal::new(None::<Selection>);
	let tooltip = RwSignal::new(None::<Tooltip>);
	let active_tab = RwSignal::new(GraphKind::Hierarchy);
	let show_connections = RwSignal::new(true);
	let focus = RwSignal::new(None::<Focus>);
	let query = RwSignal::new(String::new());

	let view_state = Rc::new(ViewState::new(GraphKind::Hierarchy));
	let events = |graph| PanelEvents::new(graph, hierarchy.clone(), selection, tooltip);
	let atlas = Atlas {
		view_state: view_state.clone(),
		hierarchy: Rc::new(RefCell::new(GraphView::new(
			AnyScene::Hierarchy(HierarchyScene::new(hierarchy.clone())),
			view_state.clone(),
			events(GraphKind::Hierarchy),
		))),
		rings: Rc::new(RefCell::new(GraphView::new(
			AnyScene::Rings(RingScene::new(rings.clone())),
			view_state.clone(),
			events(GraphKind::Rings),
		))),
		hierarchy_frames: Rc::new(AnimationLoop::new("hierarchy")),
		ring_frames: Rc::new(AnimationLoop::new("rings")),
	};

	let atlas_tab = atlas.clone();
	Effect::new(move |_| {
		let tab = active_tab.get();
		atlas_tab.switch_to(tab);
	});

	// A connection from the ring map opens a branch-map node.
	Effect::new(move |_| {
		if let Some(selected) = selection.get() {
			if selected.graph != active_tab.get_untracked() {
				active_tab.set(selected.graph);
			}
		}
	});

	let atlas_focus = atlas.clone();
	Effect::new(move |_| {
		let Some(request) = focus.get() else {
			return;
		};
		match request {
			Focus::Node(id) => {
				active_tab.set(GraphKind::Hierarchy);
				atlas_focus
					.hierarchy
					.borrow_mut()
					.focus_node(&id, NODE_FOCUS_ZOOM);
				selection.set(Some(Selection::hierarchy(id)));
			}
			Focus::Branch(id) => {
				if atlas_focus.hierarchy.borrow_mut().focus_branch(&id) {
					selection.set(Some(Selection::hierarchy(id)));
				}
			}
			Focus::Ring(id) => {
				if let Some(focal) = atlas_focus.rings.borrow_mut().focus_ring(&id) {
					selection.set(Some(Selection {
						graph: GraphKind::Rings,
						id: focal,
					}));
				}
			}
		}
	});

	let tab = move |kind: GraphKind, label: &'static str| {
		view! {
			<button
				class="tab"
				class:active=move || active_tab.get() == kind
				on:click=move |_| {
					selection.set(None);
					tooltip.set(None);
					active_tab.set(kind);
				}
			>
				{label}
			</button>
		}
	};

	let (atlas_reset, atlas_in, atlas_out, atlas_links) =
		(atlas.clone(), atlas.clone(), atlas.clone(), atlas.clone());
	let toolbar = view! {
		<div class="controls">
			<button title="Reset view" on:click=move |_| atlas_reset.active().borrow_mut().controller.reset_view()>
				"\u{27f2}"
			</button>
			<button title="Zoom in" on:click=move |_| atlas_in.active().borrow_mut().controller.zoom_in()>
				"+"
			</button>
			<button title="Zoom out" on:click=move |_| atlas_out.active().borrow_mut().controller.zoom_out()>
				"\u{2212}"
			</button>
			<button
				title="Toggle connections"
				class:active=move || show_connections.get()
				on:click=move |_| show_connections.set(atlas_links.view_state.toggle_connections())
			>
				"\u{2194}"
			</button>
		</div>
	};

	let branch_legend = hierarchy
		.branches
		.iter()
		.map(|b| {
			let id = b.info.id.clone();
			view! {
				<div class="legend-item" on:click=move |_| focus.set(Some(Focus::Branch(id.clone())))>
					<div class="legend-dot" style:background=b.color.clone()></div>
					<div class="legend-label">{b.info.label.clone()}</div>
				</div>
			}
		})
		.collect_view();

	let ring_legend = rings
		.ordered()
		.into_iter()
		.map(|r| {
			let id = r.id.clone();
			view! {
				<div class="legend-item" on:click=move |_| focus.set(Some(Focus::Ring(id.clone())))>
					<div class="legend-dot" style:background=r.color.clone()></div>
					<div class="legend-label">{r.label.clone()}</div>
				</div>
			}
		})
		.collect_view();

	let search_data = hierarchy.clone();
	let search_results = move || {
		query.with(|q| {
			search_data
				.search(q, SEARCH_RESULT_LIMIT)
				.into_iter()
				.map(|node| {
					let branch = node.branch();
					let id = node.info().id.clone();
					view! {
						<div
							class="search-result-item"
							on:click=move |_| {
								query.set(String::new());
								focus.set(Some(Focus::Node(id.clone())));
							}
						>
							<div class="search-result-dot" style:background=branch.color.clone()></div>
							<div>
								<div class="search-result-name">{node.info().label.clone()}</div>
								<div class="search-result-branch">{branch.info.label.clone()}</div>
							</div>
						</div>
					}
				})
				.collect_view()
		})
	};

	view! {
		<div class="atlas">
			<header class="atlas-header">
				<nav class="tabs">
					{tab(GraphKind::Hierarchy, "Branch Map")} {tab(GraphKind::Rings, "Ring Map")}
				</nav>
				<div class="search">
					<input
						type="search"
						placeholder="Search topics"
						prop:value=move || query.get()
						on:input=move |ev| query.set(event_target_value(&ev))
					/>
					<div class="search-results">{search_results}</div>
				</div>
				{toolbar}
			</header>

			<div class="graph-pane" class:hidden=move || active_tab.get() != GraphKind::Hierarchy>
				<AtlasCanvas
					graph=atlas.hierarchy.clone()
					view_state=view_state.clone()
					frames=atlas.hierarchy_frames.clone()
					fullscreen=true
				/>
				<div class="legend">{branch_legend}</div>
			</div>
			<div class="graph-pane" class:hidden=move || active_tab.get() != GraphKind::Rings>
				<AtlasCanvas
					graph=atlas.rings.clone()
					view_state=view_state.clone()
					frames=atlas.ring_frames.clone()
					fullscreen=true
				/>
				<div class="legend">{ring_legend}</div>
			</div>

			<NodeTooltip tooltip=tooltip />
			<DetailPanel selection=selection hierarchy=hierarchy.clone() rings=rings.clone() />
		</div>
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{move || {
				load_embedded()
					.map(|(hierarchy, rings)| {
						view! { <AtlasPage hierarchy=Arc::new(hierarchy) rings=Arc::new(rings) /> }
					})
			}}
		</ErrorBoundary>
	}
}
