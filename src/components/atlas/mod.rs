mod component;
mod controller;
mod data;
mod frame_loop;
mod gesture;
mod hit_test;
mod layout;
mod render;
mod scene;
mod surface;
mod types;
mod view_state;
mod viewport;

pub use component::AtlasCanvas;
pub use controller::NodeEvents;
pub use data::load_embedded;
pub use frame_loop::AnimationLoop;
pub use scene::{AnyScene, GraphView, HierarchyScene, NODE_FOCUS_ZOOM, RingScene};
pub use types::{HierarchyData, HierarchyNode, RingData, Status, with_alpha};
pub use view_state::{GraphKind, ViewState};
