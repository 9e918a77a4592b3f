pub mod backend;
pub mod bootstrap;
pub mod common;
pub mod error;
pub mod flat;
pub mod lod;
pub mod vfs;
