pub mod loader;

pub use loader::{calendar_from_config, load_config, parse_config};
