pub mod io;
pub mod rendering;
pub mod settings;
pub mod util;
