pub mod atlas;
pub mod panel;
