pub mod animation;
pub mod asset_graph;
pub mod common;
pub mod image;
pub mod loader;
