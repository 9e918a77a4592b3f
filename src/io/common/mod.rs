pub mod loader;
pub mod resource_id;
