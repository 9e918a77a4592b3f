pub mod reader;
pub mod stream;
pub mod types;
